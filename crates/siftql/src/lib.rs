//! ## Crate layout
//! - `core`: value model, schema, RSQL parser, predicate compiler, and the
//!   reference in-memory executor.
//! - `error`: the public error taxonomy with its total client/server
//!   classification.
//!
//! The `prelude` module mirrors the surface a search endpoint needs: build a
//! `Schema` and per-entity `FieldMapper`s once at startup, then call
//! [`search`] per request (or [`compile_query`](core::compile::compile_query)
//! when executing against your own store).

pub use siftql_core as core;

mod error;

pub use error::{Error, ErrorKind, ErrorOrigin, QueryErrorKind};

use siftql_core::{
    compile::compile_query,
    exec::{Page, Pageable, Record, execute},
    schema::{FieldMapper, Schema},
};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse, compile, and execute one filter query against a record set.
///
/// Every failure is classified into the public [`Error`] taxonomy with the
/// original query text attached; a failing query never silently matches all
/// rows or drops a clause.
pub fn search(
    schema: &Schema,
    mapper: &FieldMapper,
    query: &str,
    records: &[Record],
    pageable: &Pageable,
) -> Result<Page<Record>, Error> {
    let compiled = compile_query(query, schema, mapper)
        .map_err(|err| Error::from_query_error(query, &err))?;

    Ok(execute(&compiled, records, pageable))
}

///
/// Prelude
///

pub mod prelude {
    pub use crate::{Error, ErrorKind, ErrorOrigin, QueryErrorKind, search};
    pub use siftql_core::{
        compile::{CompiledQuery, Predicate, compile_query},
        exec::{Page, Pageable, Record, SortDirection, SortKey, execute},
        rsql::{Node, SearchOp, parse},
        schema::{
            EntityDef, EnumDef, FieldMapper, FieldMapping, FieldType, RelationKind, Schema,
        },
        value::Value,
    };
}
