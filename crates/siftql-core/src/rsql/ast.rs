use crate::rsql::SearchOp;
use serde::{Deserialize, Serialize};

///
/// Query AST
///
/// Pure parse result; no schema or type interpretation happens here. The
/// tree is created fresh per `parse` call, is immutable, and is discarded
/// after compilation.
///

///
/// Comparison
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Comparison {
    /// Dotted domain-field path, e.g. `authors.lastName`.
    pub selector: String,
    pub op: SearchOp,
    /// Raw argument text; exactly one entry except for list operators.
    pub args: Vec<String>,
}

impl Comparison {
    #[must_use]
    pub fn new(selector: impl Into<String>, op: SearchOp, args: Vec<String>) -> Self {
        Self {
            selector: selector.into(),
            op,
            args,
        }
    }
}

///
/// Node
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Node {
    /// Conjunction; the parser only produces this with two or more children.
    And(Vec<Self>),
    /// Disjunction; the parser only produces this with two or more children.
    Or(Vec<Self>),
    Comparison(Comparison),
}

impl Node {
    #[must_use]
    pub const fn and(children: Vec<Self>) -> Self {
        Self::And(children)
    }

    #[must_use]
    pub const fn or(children: Vec<Self>) -> Self {
        Self::Or(children)
    }

    #[must_use]
    pub fn comparison(selector: impl Into<String>, op: SearchOp, args: Vec<String>) -> Self {
        Self::Comparison(Comparison::new(selector, op, args))
    }
}
