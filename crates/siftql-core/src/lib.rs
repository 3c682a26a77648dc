//! Core runtime for SiftQL: the value model, schema and field mappers, the
//! RSQL parser, the predicate compiler, and a reference in-memory executor.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod compile;
pub mod exec;
pub mod rsql;
pub mod schema;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, executors, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        compile::{CompiledQuery, Predicate},
        rsql::{Node, SearchOp},
        schema::{FieldMapper, FieldMapping, FieldType, Schema},
        value::Value,
    };
}
