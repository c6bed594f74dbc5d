//! DOT AST.
//!
//! Pure data produced by the parser; graph construction happens in
//! `dot::build`.

use crate::model::Attrs;

/// `graph` or `digraph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphKind {
    Undirected,
    Directed,
}

impl GraphKind {
    pub fn keyword(self) -> &'static str {
        match self {
            GraphKind::Undirected => "graph",
            GraphKind::Directed => "digraph",
        }
    }
}

/// A complete graph description.
#[derive(Debug, Clone)]
pub struct DotGraph {
    pub strict: bool,
    pub kind: GraphKind,
    pub id: Option<String>,
    pub stmts: Vec<Stmt>,
}

/// Which element kind a default-attribute statement applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrTarget {
    Graph,
    Node,
    Edge,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    /// `a [label="x"]`
    Node { id: String, attrs: Attrs },
    /// `a -> b -> c [weight=2]`: one edge per consecutive pair.
    Edge { chain: Vec<String>, attrs: Attrs },
    /// `node [shape=box]`
    Defaults { target: AttrTarget, attrs: Attrs },
    /// `rankdir = LR`
    GraphAttr { name: String, value: String },
}
