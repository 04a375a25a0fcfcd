//! Expression tree handed from the parser to the interpreter

mod span;

pub use span::*;

use serde::{Deserialize, Serialize};

/// A parsed node with its source location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

/// Node classification produced by the parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Number(i64),
    Symbol(String),
    String(String),
    /// `( ... )`
    SExpr(Vec<Node>),
    /// `{ ... }`
    QExpr(Vec<Node>),
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self { kind, span }
    }
}
