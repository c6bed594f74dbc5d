//! DOT recursive descent parser.
//!
//! Supports the subset graph writers actually emit:
//! - `[strict] (graph|digraph) [id] { ... }`
//! - node statements and edge chains with attribute lists
//! - `graph|node|edge [...]` defaults and `id = id` graph attributes
//! - node ports (`a:n`), parsed and discarded
//!
//! Subgraphs are rejected.

use crate::model::Attrs;
use crate::{Error, Result};
use super::ast::*;
use super::lexer::{Token, TokenKind};

/// Parser state: wraps a token slice with cursor.
struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn advance(&mut self) -> &Token {
        let tok = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&Token> {
        let tok = self.peek();
        if tok.kind == kind {
            Ok(self.advance())
        } else {
            Err(self.error(format!("Expected {:?}, got {:?} '{}'", kind, tok.kind, tok.text)))
        }
    }

    fn expect_id(&mut self) -> Result<String> {
        if self.peek_kind().is_id() {
            Ok(self.advance().text.clone())
        } else {
            let tok = self.peek();
            Err(self.error(format!("Expected an ID, got {:?} '{}'", tok.kind, tok.text)))
        }
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error(&self, msg: String) -> Error {
        Error::DotSyntax {
            position: self.peek().span.start,
            message: msg,
        }
    }
}

/// Parse a complete graph description from tokens.
pub fn parse_graph(tokens: &[Token]) -> Result<DotGraph> {
    let mut p = Parser::new(tokens);

    let strict = p.eat(TokenKind::Strict);
    let kind = match p.peek_kind() {
        TokenKind::Graph => GraphKind::Undirected,
        TokenKind::Digraph => GraphKind::Directed,
        other => return Err(p.error(format!("Expected 'graph' or 'digraph', got {:?}", other))),
    };
    p.advance();

    let id = if p.peek_kind().is_id() { Some(p.expect_id()?) } else { None };

    p.expect(TokenKind::LBrace)?;
    let mut stmts = Vec::new();
    while !p.at(TokenKind::RBrace) {
        if p.at(TokenKind::Eof) {
            return Err(p.error("Unterminated graph body, expected '}'".into()));
        }
        stmts.push(parse_stmt(&mut p, kind)?);
        // Statement separators are optional
        if !p.eat(TokenKind::Semicolon) {
            p.eat(TokenKind::Comma);
        }
    }
    p.expect(TokenKind::RBrace)?;

    if !p.at(TokenKind::Eof) {
        return Err(p.error(format!("Unexpected token after graph body: {:?}", p.peek_kind())));
    }

    Ok(DotGraph { strict, kind, id, stmts })
}

// ============================================================================
// Statement parsers
// ============================================================================

fn parse_stmt(p: &mut Parser, kind: GraphKind) -> Result<Stmt> {
    match p.peek_kind() {
        TokenKind::Graph | TokenKind::Node | TokenKind::Edge => {
            let target = match p.advance().kind {
                TokenKind::Graph => AttrTarget::Graph,
                TokenKind::Node => AttrTarget::Node,
                _ => AttrTarget::Edge,
            };
            let attrs = parse_attr_lists(p)?;
            Ok(Stmt::Defaults { target, attrs })
        }
        TokenKind::Subgraph | TokenKind::LBrace => {
            Err(p.error("Subgraphs are not supported".into()))
        }
        k if k.is_id() => {
            let first = parse_node_id(p)?;

            if p.eat(TokenKind::Eq) {
                let value = p.expect_id()?;
                return Ok(Stmt::GraphAttr { name: first, value });
            }

            let mut chain = vec![first];
            while matches!(p.peek_kind(), TokenKind::Arrow | TokenKind::UndirectedEdge) {
                check_edge_op(p, kind)?;
                p.advance();
                if matches!(p.peek_kind(), TokenKind::Subgraph | TokenKind::LBrace) {
                    return Err(p.error("Subgraphs are not supported".into()));
                }
                chain.push(parse_node_id(p)?);
            }

            let attrs = if p.at(TokenKind::LBracket) { parse_attr_lists(p)? } else { Attrs::new() };

            if chain.len() == 1 {
                let id = chain.pop().unwrap_or_default();
                Ok(Stmt::Node { id, attrs })
            } else {
                Ok(Stmt::Edge { chain, attrs })
            }
        }
        other => Err(p.error(format!("Unexpected token {:?} at start of statement", other))),
    }
}

fn check_edge_op(p: &Parser, kind: GraphKind) -> Result<()> {
    match (kind, p.peek_kind()) {
        (GraphKind::Directed, TokenKind::UndirectedEdge) => {
            Err(p.error("'--' edge in a digraph".into()))
        }
        (GraphKind::Undirected, TokenKind::Arrow) => {
            Err(p.error("'->' edge in an undirected graph".into()))
        }
        _ => Ok(()),
    }
}

/// `ID [':' ID [':' ID]]`; the port part is dropped.
fn parse_node_id(p: &mut Parser) -> Result<String> {
    let id = p.expect_id()?;
    let mut ports = 0;
    while ports < 2 && p.eat(TokenKind::Colon) {
        p.expect_id()?;
        ports += 1;
    }
    Ok(id)
}

/// One or more `[ a=b, c=d; e ]` blocks, merged left to right.
fn parse_attr_lists(p: &mut Parser) -> Result<Attrs> {
    let mut attrs = Attrs::new();
    p.expect(TokenKind::LBracket)?;
    loop {
        while !p.at(TokenKind::RBracket) {
            let name = p.expect_id()?;
            // A bare name is shorthand for `name=true`
            let value = if p.eat(TokenKind::Eq) { p.expect_id()? } else { "true".to_string() };
            attrs.set(name, value);
            if !p.eat(TokenKind::Comma) {
                p.eat(TokenKind::Semicolon);
            }
        }
        p.expect(TokenKind::RBracket)?;
        if !p.eat(TokenKind::LBracket) {
            break;
        }
    }
    Ok(attrs)
}
