use crate::{compile::path::JoinId, value::Value};
use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr};

///
/// Compiled predicate tree
///
/// Pure boolean algebra over resolved expression references. This layer
/// carries no schema or allow-list knowledge; all checks happened during
/// compilation. The tree is owned by the caller and handed to an executor.
///

///
/// FieldRef
///
/// A physical field off the root entity (`join: None`) or off a join created
/// during compilation.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FieldRef {
    pub join: Option<JoinId>,
    pub field: String,
}

///
/// Expr
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Expr {
    Field(FieldRef),
    /// String-typed concatenation of several physical fields. The whole
    /// expression is null when any part is null or its join row is absent.
    Concat {
        parts: Vec<FieldRef>,
        separator: String,
    },
}

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    NotIn,
}

///
/// ComparePredicate
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ComparePredicate {
    pub expr: Expr,
    pub op: CompareOp,
    pub value: Value,
}

///
/// Predicate
///
/// `Not` exists for programmatic composition; the compiler itself emits the
/// dedicated negated leaves (`NotIn`, `NotLikeCi`, `IsNotNull`) so negation
/// stays null-aware at rows with absent joins.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Predicate {
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
    Compare(ComparePredicate),
    IsNull { expr: Expr },
    IsNotNull { expr: Expr },
    /// Case-insensitive substring match.
    LikeCi { expr: Expr, needle: String },
    NotLikeCi { expr: Expr, needle: String },
}

impl Predicate {
    #[must_use]
    pub const fn and(children: Vec<Self>) -> Self {
        Self::And(children)
    }

    #[must_use]
    pub const fn or(children: Vec<Self>) -> Self {
        Self::Or(children)
    }

    #[expect(clippy::should_implement_trait)]
    #[must_use]
    pub fn not(pred: Self) -> Self {
        Self::Not(Box::new(pred))
    }

    #[must_use]
    pub const fn compare(expr: Expr, op: CompareOp, value: Value) -> Self {
        Self::Compare(ComparePredicate { expr, op, value })
    }
}

impl BitAnd for Predicate {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::And(vec![self, rhs])
    }
}

impl BitOr for Predicate {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::Or(vec![self, rhs])
    }
}
