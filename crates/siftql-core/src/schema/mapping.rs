use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// Field mapping and allow-lists
///
/// A `FieldMapper` is the sole authorization boundary of the compiler: a
/// selector that is not registered here never reaches path resolution, so
/// clients cannot probe physical schema names. Mappers are built once at
/// startup and shared read-only across compilations.
///

///
/// FieldMapping
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum FieldMapping {
    /// Dotted navigation path to one physical field.
    Simple { path: String },

    /// Concatenation of several physical fields, joined by `separator`.
    /// The resulting expression is string-typed.
    Composite {
        paths: Vec<String>,
        separator: String,
    },
}

///
/// FieldNotAllowedError
///
/// Names exactly the rejected domain field; physical paths never leak.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("field '{field}' is not allowed for filtering")]
pub struct FieldNotAllowedError {
    pub field: String,
}

///
/// MappingError
///
/// Mapper construction defects, surfaced at startup.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum MappingError {
    #[error("mapper for '{entity}' registers field '{field}' twice")]
    DuplicateField { entity: String, field: String },

    #[error("mapper for '{entity}' registers composite field '{field}' with no paths")]
    EmptyComposite { entity: String, field: String },
}

///
/// FieldMapper
///

#[derive(Clone, Debug)]
pub struct FieldMapper {
    entity: String,
    map: BTreeMap<String, FieldMapping>,
}

impl FieldMapper {
    #[must_use]
    pub fn builder(entity: impl Into<String>) -> FieldMapperBuilder {
        FieldMapperBuilder {
            entity: entity.into(),
            map: BTreeMap::new(),
            error: None,
        }
    }

    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Look up a domain field, failing closed on anything unregistered.
    pub fn mapping(&self, field: &str) -> Result<&FieldMapping, FieldNotAllowedError> {
        self.map.get(field).ok_or_else(|| FieldNotAllowedError {
            field: field.to_string(),
        })
    }

    #[must_use]
    pub fn is_allowed(&self, field: &str) -> bool {
        self.map.contains_key(field)
    }

    pub fn allowed_fields(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }
}

///
/// FieldMapperBuilder
///

pub struct FieldMapperBuilder {
    entity: String,
    map: BTreeMap<String, FieldMapping>,
    error: Option<MappingError>,
}

impl FieldMapperBuilder {
    #[must_use]
    pub fn simple(self, field: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        self.insert(field.into(), FieldMapping::Simple { path })
    }

    #[must_use]
    pub fn composite<I, S>(
        self,
        field: impl Into<String>,
        paths: I,
        separator: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let field = field.into();
        let paths: Vec<String> = paths.into_iter().map(Into::into).collect();
        if paths.is_empty() {
            let entity = self.entity.clone();
            return self.fail(MappingError::EmptyComposite { entity, field });
        }

        self.insert(
            field,
            FieldMapping::Composite {
                paths,
                separator: separator.into(),
            },
        )
    }

    pub fn build(self) -> Result<FieldMapper, MappingError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        Ok(FieldMapper {
            entity: self.entity,
            map: self.map,
        })
    }

    fn insert(mut self, field: String, mapping: FieldMapping) -> Self {
        if self.map.contains_key(&field) {
            let entity = self.entity.clone();
            return self.fail(MappingError::DuplicateField { entity, field });
        }
        self.map.insert(field, mapping);
        self
    }

    fn fail(mut self, error: MappingError) -> Self {
        if self.error.is_none() {
            self.error = Some(error);
        }
        self
    }
}

///
/// TESTS
///
