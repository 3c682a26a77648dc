use derive_more::Display;
use serde::{Deserialize, Serialize};
use siftql_core::compile::{CompileError, QueryError};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable class + origin taxonomy. The original
/// query text is always attached so boundaries can echo it back.
///

#[derive(Clone, Debug, Deserialize, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
    pub query: String,
}

impl Error {
    pub fn new(
        kind: ErrorKind,
        origin: ErrorOrigin,
        message: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
            query: query.into(),
        }
    }

    /// Classify a compiler failure. The mapping is total: anything a client
    /// can provoke through query text is a `Query` kind (HTTP 400 at the
    /// boundary); anything else is `Internal` (HTTP 500).
    #[must_use]
    pub fn from_query_error(query: &str, err: &QueryError) -> Self {
        let (kind, origin) = classify(err);

        Self::new(kind, origin, err.to_string(), query)
    }

    /// Whether the caller can remediate this by correcting the query.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Query(_))
    }
}

fn classify(err: &QueryError) -> (ErrorKind, ErrorOrigin) {
    match err {
        QueryError::Parse(_) => (
            ErrorKind::Query(QueryErrorKind::InvalidSyntax),
            ErrorOrigin::Parser,
        ),
        QueryError::Compile(compile) => match compile {
            CompileError::FieldNotAllowed(_) => (
                ErrorKind::Query(QueryErrorKind::FieldNotAllowed),
                ErrorOrigin::Mapper,
            ),
            CompileError::Coercion(_) => (
                ErrorKind::Query(QueryErrorKind::InvalidValue),
                ErrorOrigin::Coerce,
            ),
            CompileError::OrderedComposite { .. }
            | CompileError::UnorderedField { .. }
            | CompileError::TextOperator { .. } => (
                ErrorKind::Query(QueryErrorKind::Unsupported),
                ErrorOrigin::Compile,
            ),

            // A selector reaches path resolution only through the mapper's
            // own physical mappings, so navigation failures are deployment
            // defects, never client input.
            CompileError::Navigation(_) => (ErrorKind::Internal, ErrorOrigin::Path),

            // Unreachable from parsed queries; hand-built ASTs only.
            CompileError::EmptyGroup | CompileError::ArgumentCount { .. } => {
                (ErrorKind::Internal, ErrorOrigin::Compile)
            }
        },
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers and HTTP boundaries.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Query(QueryErrorKind),

    /// The caller cannot remediate this.
    Internal,
}

///
/// QueryErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum QueryErrorKind {
    /// Malformed query text (bad syntax, unknown operator).
    InvalidSyntax,

    /// Selector is not in the entity's allow-list.
    FieldNotAllowed,

    /// Argument cannot be converted to the field's declared type.
    InvalidValue,

    /// The query is well formed but requests an unsupported combination
    /// (ordering on composite or unordered fields, LIKE on non-text).
    Unsupported,
}

///
/// ErrorOrigin
/// Subsystem that raised the failure.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Parser,
    Mapper,
    Path,
    Coerce,
    Compile,
    Executor,
}
