use serde::{Deserialize, Serialize};
use std::fmt;

///
/// SearchOp
///
/// The ten comparison operators of the query language. The symbol surface is
/// fixed; anything else is a parse error.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SearchOp {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    In,
    NotIn,
    Like,
    NotLike,
}

/// Declarative symbol table; absence of an entry means the symbol is not an
/// operator.
const SYMBOL_TABLE: &[(&str, SearchOp)] = &[
    ("==", SearchOp::Equal),
    ("!=", SearchOp::NotEqual),
    ("=gt=", SearchOp::GreaterThan),
    ("=ge=", SearchOp::GreaterThanOrEqual),
    ("=lt=", SearchOp::LessThan),
    ("=le=", SearchOp::LessThanOrEqual),
    ("=in=", SearchOp::In),
    ("=out=", SearchOp::NotIn),
    ("=like=", SearchOp::Like),
    ("=notlike=", SearchOp::NotLike),
];

impl SearchOp {
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        SYMBOL_TABLE
            .iter()
            .find(|(candidate, _)| *candidate == symbol)
            .map(|(_, op)| *op)
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        SYMBOL_TABLE
            .iter()
            .find(|(_, op)| *op == self)
            .map(|(symbol, _)| *symbol)
            .unwrap_or_default()
    }

    /// Operators that require an ordered field type.
    #[must_use]
    pub const fn is_ordering(self) -> bool {
        matches!(
            self,
            Self::GreaterThan | Self::GreaterThanOrEqual | Self::LessThan | Self::LessThanOrEqual
        )
    }

    /// Operators whose argument is a parenthesized list.
    #[must_use]
    pub const fn takes_list(self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }
}

impl fmt::Display for SearchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

///
/// TESTS
///
