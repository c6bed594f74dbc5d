//! DOT lexer: tokenizes a graph description.

use crate::{Error, Result};

/// A token from the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

/// Source span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords (case-insensitive in DOT)
    Strict, Graph, Digraph, Node, Edge, Subgraph,

    // IDs
    Identifier, Numeral, QuotedString,

    // Punctuation
    LBrace, RBrace, LBracket, RBracket,
    Semicolon, Comma, Colon, Eq,
    Arrow,          // ->
    UndirectedEdge, // --

    Eof,
}

impl TokenKind {
    /// Any of the three ID forms.
    pub fn is_id(self) -> bool {
        matches!(self, TokenKind::Identifier | TokenKind::Numeral | TokenKind::QuotedString)
    }
}

/// Tokenize a DOT graph description.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => { chars.next(); }

            // Block comments /* ... */
            '/' if matches!(chars.clone().nth(1), Some((_, '*'))) => {
                let comment_start = pos;
                chars.next();
                chars.next();
                loop {
                    match chars.next() {
                        Some((_, '*')) => {
                            if matches!(chars.peek(), Some(&(_, '/'))) {
                                chars.next();
                                break;
                            }
                        }
                        Some(_) => {}
                        None => {
                            return Err(Error::DotSyntax {
                                position: comment_start,
                                message: "Unterminated block comment".into(),
                            });
                        }
                    }
                }
            }

            // Line comments, and `#` preprocessor-style lines
            '/' if matches!(chars.clone().nth(1), Some((_, '/'))) => skip_line(&mut chars),
            '#' => skip_line(&mut chars),

            '"' => {
                chars.next();
                let start = pos;
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some((_, '\\')) => {
                            match chars.next() {
                                Some((_, '"')) => s.push('"'),
                                // Line continuation
                                Some((_, '\n')) => {}
                                Some((_, c)) => { s.push('\\'); s.push(c); }
                                None => {}
                            }
                        }
                        Some((end, '"')) => {
                            tokens.push(Token {
                                kind: TokenKind::QuotedString,
                                span: Span { start, end: end + 1 },
                                text: s,
                            });
                            break;
                        }
                        Some((_, c)) => s.push(c),
                        None => return Err(Error::DotSyntax {
                            position: start,
                            message: "Unterminated string literal".into(),
                        }),
                    }
                }
            }

            // Edge operators and negative numerals
            '-' => {
                chars.next();
                match chars.peek() {
                    Some(&(_, '>')) => {
                        chars.next();
                        tokens.push(punct(TokenKind::Arrow, pos, "->"));
                    }
                    Some(&(_, '-')) => {
                        chars.next();
                        tokens.push(punct(TokenKind::UndirectedEdge, pos, "--"));
                    }
                    Some(&(_, c)) if c.is_ascii_digit() || c == '.' => {
                        let num = read_numeral(&mut chars, String::from("-"));
                        tokens.push(Token {
                            kind: TokenKind::Numeral,
                            span: Span { start: pos, end: pos + num.len() },
                            text: num,
                        });
                    }
                    _ => {
                        return Err(Error::DotSyntax {
                            position: pos,
                            message: "Expected '->', '--' or a numeral after '-'".into(),
                        });
                    }
                }
            }

            c if c.is_ascii_digit() || c == '.' => {
                let num = read_numeral(&mut chars, String::new());
                if num == "." {
                    return Err(Error::DotSyntax {
                        position: pos,
                        message: "Unexpected character: '.'".into(),
                    });
                }
                tokens.push(Token {
                    kind: TokenKind::Numeral,
                    span: Span { start: pos, end: pos + num.len() },
                    text: num,
                });
            }

            c if c.is_alphabetic() || c == '_' => {
                let start = pos;
                let mut ident = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let kind = keyword_or_ident(&ident);
                tokens.push(Token {
                    kind,
                    span: Span { start, end: start + ident.len() },
                    text: ident,
                });
            }

            '{' => { chars.next(); tokens.push(punct(TokenKind::LBrace, pos, "{")); }
            '}' => { chars.next(); tokens.push(punct(TokenKind::RBrace, pos, "}")); }
            '[' => { chars.next(); tokens.push(punct(TokenKind::LBracket, pos, "[")); }
            ']' => { chars.next(); tokens.push(punct(TokenKind::RBracket, pos, "]")); }
            ';' => { chars.next(); tokens.push(punct(TokenKind::Semicolon, pos, ";")); }
            ',' => { chars.next(); tokens.push(punct(TokenKind::Comma, pos, ",")); }
            ':' => { chars.next(); tokens.push(punct(TokenKind::Colon, pos, ":")); }
            '=' => { chars.next(); tokens.push(punct(TokenKind::Eq, pos, "=")); }

            other => {
                return Err(Error::DotSyntax {
                    position: pos,
                    message: format!("Unexpected character: '{other}'"),
                });
            }
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span { start: input.len(), end: input.len() },
        text: String::new(),
    });

    Ok(tokens)
}

type Chars<'a> = std::iter::Peekable<std::str::CharIndices<'a>>;

fn skip_line(chars: &mut Chars<'_>) {
    while chars.peek().is_some_and(|&(_, c)| c != '\n') {
        chars.next();
    }
}

/// `[0-9]+(.[0-9]*)?` or `.[0-9]+`, appended to `prefix`.
fn read_numeral(chars: &mut Chars<'_>, mut num: String) -> String {
    let mut seen_dot = false;
    while let Some(&(_, c)) = chars.peek() {
        if c.is_ascii_digit() {
            num.push(c);
            chars.next();
        } else if c == '.' && !seen_dot {
            seen_dot = true;
            num.push(c);
            chars.next();
        } else {
            break;
        }
    }
    num
}

fn punct(kind: TokenKind, pos: usize, text: &str) -> Token {
    Token {
        kind,
        span: Span { start: pos, end: pos + text.len() },
        text: text.to_string(),
    }
}

fn keyword_or_ident(s: &str) -> TokenKind {
    match s.to_ascii_lowercase().as_str() {
        "strict" => TokenKind::Strict,
        "graph" => TokenKind::Graph,
        "digraph" => TokenKind::Digraph,
        "node" => TokenKind::Node,
        "edge" => TokenKind::Edge,
        "subgraph" => TokenKind::Subgraph,
        _ => TokenKind::Identifier,
    }
}
