use crate::{schema::FieldType, value::Value};
use chrono::NaiveDate;
use thiserror::Error as ThisError;

///
/// Value coercion
///
/// Converts raw argument text into a value of the target field's declared
/// type. Text targets are verbatim and infallible; everything else fails
/// with a `CoercionError` naming the raw value and the target type.
///

///
/// CoercionError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("cannot coerce '{raw}' into {target}")]
pub struct CoercionError {
    pub raw: String,
    /// Display name of the target type.
    pub target: String,
}

impl CoercionError {
    fn new(raw: &str, target: &FieldType) -> Self {
        Self {
            raw: raw.to_string(),
            target: target.to_string(),
        }
    }
}

/// Coerce one raw argument into the target type.
pub fn coerce(raw: &str, target: &FieldType) -> Result<Value, CoercionError> {
    match target {
        FieldType::Int => raw
            .parse()
            .map(Value::Int)
            .map_err(|_| CoercionError::new(raw, target)),
        FieldType::Long => raw
            .parse()
            .map(Value::Long)
            .map_err(|_| CoercionError::new(raw, target)),
        FieldType::Float => raw
            .parse()
            .map(Value::Float)
            .map_err(|_| CoercionError::new(raw, target)),
        FieldType::Double => raw
            .parse()
            .map(Value::Double)
            .map_err(|_| CoercionError::new(raw, target)),
        FieldType::Bool => {
            if raw.eq_ignore_ascii_case("true") {
                Ok(Value::Bool(true))
            } else if raw.eq_ignore_ascii_case("false") {
                Ok(Value::Bool(false))
            } else {
                Err(CoercionError::new(raw, target))
            }
        }
        FieldType::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Value::Date)
            .map_err(|_| CoercionError::new(raw, target)),
        FieldType::Enum(def) => def
            .constant_matching(raw)
            .map(|constant| Value::Enum(constant.to_string()))
            .ok_or_else(|| CoercionError::new(raw, target)),
        FieldType::Text => Ok(Value::Text(raw.to_string())),
    }
}

///
/// TESTS
///
