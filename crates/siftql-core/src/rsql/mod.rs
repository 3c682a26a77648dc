//! RSQL front end: operator symbols, the query AST, and the parser.
//!
//! The grammar is the RSQL subset used by the search surface: comparisons
//! combined with `;` (AND, binds tighter) and `,` (OR), group parentheses,
//! double-quoted arguments, and parenthesized lists for `=in=`/`=out=`.

mod ast;
mod op;
mod parser;

pub use ast::{Comparison, Node};
pub use op::SearchOp;
pub use parser::{ParseError, parse};
