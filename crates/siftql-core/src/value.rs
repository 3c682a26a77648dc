use chrono::NaiveDate;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

///
/// Runtime value model
///
/// Pure, schema-agnostic representation of field values and coerced query
/// arguments. Comparison helpers return `Option` so callers decide how an
/// undefined comparison collapses (evaluation treats it as a non-match).
///

///
/// TextMode
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextMode {
    Cs, // case-sensitive
    Ci, // case-insensitive
}

///
/// Value
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Text(String),
    Date(NaiveDate),
    /// Canonical enum constant name, as declared on the field's `EnumDef`.
    Enum(String),
    /// Argument lists for membership predicates only; never a field value.
    List(Vec<Value>),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Int(_) | Self::Long(_) | Self::Float(_) | Self::Double(_)
        )
    }

    const fn as_integral(&self) -> Option<i128> {
        match self {
            Self::Int(v) => Some(*v as i128),
            Self::Long(v) => Some(*v as i128),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => v.to_f64(),
            Self::Long(v) => v.to_f64(),
            Self::Float(v) => v.to_f64(),
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Compare two numeric values, widening across the numeric variants.
    ///
    /// Integral pairs compare exactly; mixed pairs compare through `f64`.
    /// Returns `None` if either side is non-numeric or the comparison is
    /// undefined (NaN).
    #[must_use]
    pub fn cmp_numeric(&self, other: &Self) -> Option<Ordering> {
        if let (Some(left), Some(right)) = (self.as_integral(), other.as_integral()) {
            return Some(left.cmp(&right));
        }

        let left = self.as_f64()?;
        let right = other.as_f64()?;
        left.partial_cmp(&right)
    }

    /// Equality with numeric widening; `None` when undefined.
    #[must_use]
    pub fn compare_eq(&self, other: &Self) -> Option<bool> {
        if self.is_numeric() && other.is_numeric() {
            return self.cmp_numeric(other).map(|ord| ord == Ordering::Equal);
        }

        same_variant(self, other).then(|| self == other)
    }

    /// Ordering with numeric widening; `None` when the variants differ
    /// (outside the numeric tower) or the variant does not order.
    #[must_use]
    pub fn compare_order(&self, other: &Self) -> Option<Ordering> {
        if self.is_numeric() && other.is_numeric() {
            return self.cmp_numeric(other);
        }

        match (self, other) {
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Canonical total ordering used for sorting only.
    ///
    /// Falls back to a variant rank when no strict ordering is defined, so
    /// sort output stays deterministic for mixed or non-orderable values.
    #[must_use]
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        if let Some(ordering) = self.compare_order(other) {
            return ordering;
        }

        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Enum(a), Self::Enum(b)) => a.cmp(b),
            _ => canonical_rank(self).cmp(&canonical_rank(other)),
        }
    }

    /// Case-insensitive (or sensitive) substring check over text values.
    ///
    /// Returns `None` for non-text values.
    #[must_use]
    pub fn text_contains(&self, needle: &str, mode: TextMode) -> Option<bool> {
        let Self::Text(haystack) = self else {
            return None;
        };

        Some(match mode {
            TextMode::Cs => haystack.contains(needle),
            TextMode::Ci => casefold(haystack).contains(&casefold(needle)),
        })
    }

    /// Textual rendering used for composite-field concatenation.
    ///
    /// `None` for null, lists, and anything else with no scalar text form.
    #[must_use]
    pub fn render_text(&self) -> Option<String> {
        match self {
            Self::Null | Self::List(_) => None,
            Self::Bool(v) => Some(v.to_string()),
            Self::Int(v) => Some(v.to_string()),
            Self::Long(v) => Some(v.to_string()),
            Self::Float(v) => Some(v.to_string()),
            Self::Double(v) => Some(v.to_string()),
            Self::Text(v) | Self::Enum(v) => Some(v.clone()),
            Self::Date(v) => Some(v.format("%Y-%m-%d").to_string()),
        }
    }
}

fn same_variant(left: &Value, right: &Value) -> bool {
    std::mem::discriminant(left) == std::mem::discriminant(right)
}

const fn canonical_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Int(_) => 2,
        Value::Long(_) => 3,
        Value::Float(_) => 4,
        Value::Double(_) => 5,
        Value::Text(_) => 6,
        Value::Date(_) => 7,
        Value::Enum(_) => 8,
        Value::List(_) => 9,
    }
}

/// Casefold for case-insensitive text matching.
#[must_use]
pub fn casefold(input: &str) -> String {
    if input.is_ascii() {
        return input.to_ascii_lowercase();
    }

    // Unicode fallback; matches text_contains casefold behavior.
    input.to_lowercase()
}

///
/// TESTS
///
