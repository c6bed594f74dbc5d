//! # Graph Loader
//!
//! DOT text → AST → in-memory graph. Pure functions: no I/O, no state.
//!
//! ```text
//! digraph text ──parse_digraph──────────────────────────▶ DiGraph
//!      │
//!      └─rewrite_undirected─▶ strict graph text ─parse_undirected─▶ UnGraph
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod rewrite;

use crate::model::{DiGraph, UnGraph};
use crate::{Error, Result};
use ast::{DotGraph, GraphKind, Stmt};

pub use rewrite::rewrite_undirected;

/// Parse a DOT description into an AST.
pub fn parse(text: &str) -> Result<DotGraph> {
    let tokens = lexer::tokenize(text)?;
    parser::parse_graph(&tokens)
}

/// Parse a `digraph` description.
pub fn parse_digraph(text: &str) -> Result<DiGraph> {
    let ast = parse(text)?;
    expect_kind(&ast, GraphKind::Directed)?;
    build(&ast)
}

/// Parse a `graph` description into the simple undirected view used for
/// k-shell decomposition.
pub fn parse_undirected(text: &str) -> Result<UnGraph> {
    let ast = parse(text)?;
    expect_kind(&ast, GraphKind::Undirected)?;
    build(&ast)?.to_undirected()
}

fn expect_kind(ast: &DotGraph, kind: GraphKind) -> Result<()> {
    if ast.kind == kind {
        Ok(())
    } else {
        Err(Error::DotSyntax {
            position: 0,
            message: format!("Expected a '{}', found a '{}'", kind.keyword(), ast.kind.keyword()),
        })
    }
}

/// Materialise nodes (first-appearance order) and edges from the AST.
fn build(ast: &DotGraph) -> Result<DiGraph> {
    let mut graph = DiGraph::new();
    for stmt in &ast.stmts {
        match stmt {
            Stmt::Node { id, attrs } => {
                let idx = graph.add_node(id.as_str());
                graph.set_node_attrs(idx, attrs)?;
            }
            Stmt::Edge { chain, attrs } => {
                let ids: Vec<_> = chain.iter().map(|id| graph.add_node(id.as_str())).collect();
                for pair in ids.windows(2) {
                    graph.add_edge(pair[0], pair[1], attrs.clone())?;
                }
            }
            Stmt::Defaults { .. } | Stmt::GraphAttr { .. } => {}
        }
    }
    tracing::debug!(nodes = graph.node_count(), edges = graph.edge_count(), "graph built");
    Ok(graph)
}
