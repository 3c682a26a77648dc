//! Module: schema
//! Responsibility: immutable entity/field/relation registry and enum
//! definitions consumed by path resolution and value coercion.
//! Does not own: domain-field allow-lists (see `mapping`), parsing, or
//! predicate semantics.

mod mapping;

pub use mapping::{FieldMapper, FieldMapperBuilder, FieldMapping, FieldNotAllowedError, MappingError};

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};
use thiserror::Error as ThisError;

///
/// FieldType
///
/// Declared type of one physical field. Ordered types (numeric, date, text)
/// admit the ordering operators; `Bool` and `Enum` admit equality and
/// membership only.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum FieldType {
    Int,
    Long,
    Float,
    Double,
    Bool,
    Text,
    Date,
    Enum(EnumDef),
}

impl FieldType {
    #[must_use]
    pub const fn is_ordered(&self) -> bool {
        !matches!(self, Self::Bool | Self::Enum(_))
    }

    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Long => write!(f, "long"),
            Self::Float => write!(f, "float"),
            Self::Double => write!(f, "double"),
            Self::Bool => write!(f, "boolean"),
            Self::Text => write!(f, "text"),
            Self::Date => write!(f, "date"),
            Self::Enum(def) => write!(f, "enum {}", def.name()),
        }
    }
}

///
/// EnumDef
///
/// Closed set of constant names for one enum-typed field. Constants keep
/// their declared casing; lookups are case-insensitive.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct EnumDef {
    name: String,
    constants: Vec<String>,
}

impl EnumDef {
    pub fn new<I, S>(name: impl Into<String>, constants: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let constants: Vec<String> = constants.into_iter().map(Into::into).collect();

        for (index, constant) in constants.iter().enumerate() {
            let clash = constants[..index]
                .iter()
                .any(|seen| seen.eq_ignore_ascii_case(constant));
            if clash {
                return Err(SchemaError::DuplicateEnumConstant {
                    name,
                    constant: constant.clone(),
                });
            }
        }

        Ok(Self { name, constants })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn constants(&self) -> &[String] {
        &self.constants
    }

    /// Case-insensitive lookup returning the canonical constant name.
    #[must_use]
    pub fn constant_matching(&self, raw: &str) -> Option<&str> {
        self.constants
            .iter()
            .find(|constant| constant.eq_ignore_ascii_case(raw))
            .map(String::as_str)
    }
}

///
/// RelationKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum RelationKind {
    ToOne,
    ToMany,
}

///
/// RelationDef
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RelationDef {
    target: String,
    kind: RelationKind,
}

impl RelationDef {
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub const fn kind(&self) -> RelationKind {
        self.kind
    }
}

///
/// EntityDef
///
/// One entity's physical surface: typed fields plus navigable relations.
/// Field and relation names share a namespace so a dotted path segment is
/// never ambiguous.
///

#[derive(Clone, Debug)]
pub struct EntityDef {
    name: String,
    fields: BTreeMap<String, FieldType>,
    relations: BTreeMap<String, RelationDef>,
}

impl EntityDef {
    #[must_use]
    pub fn builder(name: impl Into<String>) -> EntityDefBuilder {
        EntityDefBuilder {
            name: name.into(),
            fields: BTreeMap::new(),
            relations: BTreeMap::new(),
            error: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldType> {
        self.fields.get(name)
    }

    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&RelationDef> {
        self.relations.get(name)
    }

    pub fn relations(&self) -> impl Iterator<Item = (&str, &RelationDef)> {
        self.relations.iter().map(|(name, def)| (name.as_str(), def))
    }
}

///
/// EntityDefBuilder
///
/// Collects fields and relations, deferring the first registration error to
/// `build` so call sites stay chainable.
///

pub struct EntityDefBuilder {
    name: String,
    fields: BTreeMap<String, FieldType>,
    relations: BTreeMap<String, RelationDef>,
    error: Option<SchemaError>,
}

impl EntityDefBuilder {
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        let name = name.into();
        if self.taken(&name) {
            self.fail_duplicate(name);
            return self;
        }
        self.fields.insert(name, ty);
        self
    }

    #[must_use]
    pub fn to_one(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.relation(name, target, RelationKind::ToOne)
    }

    #[must_use]
    pub fn to_many(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.relation(name, target, RelationKind::ToMany)
    }

    fn relation(
        mut self,
        name: impl Into<String>,
        target: impl Into<String>,
        kind: RelationKind,
    ) -> Self {
        let name = name.into();
        if self.taken(&name) {
            self.fail_duplicate(name);
            return self;
        }
        self.relations.insert(
            name,
            RelationDef {
                target: target.into(),
                kind,
            },
        );
        self
    }

    pub fn build(self) -> Result<EntityDef, SchemaError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        Ok(EntityDef {
            name: self.name,
            fields: self.fields,
            relations: self.relations,
        })
    }

    fn taken(&self, name: &str) -> bool {
        self.fields.contains_key(name) || self.relations.contains_key(name)
    }

    fn fail_duplicate(&mut self, member: String) {
        if self.error.is_none() {
            self.error = Some(SchemaError::DuplicateMember {
                entity: self.name.clone(),
                member,
            });
        }
    }
}

///
/// Schema
///
/// Process-wide registry of entity definitions. Built once at startup and
/// shared read-only across compilations.
///

#[derive(Clone, Debug)]
pub struct Schema {
    entities: BTreeMap<String, EntityDef>,
}

impl Schema {
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder {
            entities: BTreeMap::new(),
            error: None,
        }
    }

    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&EntityDef> {
        self.entities.get(name)
    }
}

///
/// SchemaBuilder
///

pub struct SchemaBuilder {
    entities: BTreeMap<String, EntityDef>,
    error: Option<SchemaError>,
}

impl SchemaBuilder {
    #[must_use]
    pub fn entity(mut self, entity: EntityDef) -> Self {
        if self.entities.contains_key(entity.name()) {
            if self.error.is_none() {
                self.error = Some(SchemaError::DuplicateEntity {
                    entity: entity.name().to_string(),
                });
            }
            return self;
        }
        self.entities.insert(entity.name().to_string(), entity);
        self
    }

    /// Finish the schema, verifying every relation target exists.
    pub fn build(self) -> Result<Schema, SchemaError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        for entity in self.entities.values() {
            for (name, relation) in entity.relations() {
                if !self.entities.contains_key(relation.target()) {
                    return Err(SchemaError::UnknownRelationTarget {
                        entity: entity.name().to_string(),
                        relation: name.to_string(),
                        target: relation.target().to_string(),
                    });
                }
            }
        }

        Ok(Schema {
            entities: self.entities,
        })
    }
}

///
/// SchemaError
///
/// Construction-time defects. These never reach query callers; a schema that
/// fails to build is a deployment error.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("entity '{entity}' is declared twice")]
    DuplicateEntity { entity: String },

    #[error("entity '{entity}' declares member '{member}' twice")]
    DuplicateMember { entity: String, member: String },

    #[error("enum '{name}' declares constant '{constant}' twice")]
    DuplicateEnumConstant { name: String, constant: String },

    #[error("relation '{entity}.{relation}' targets unknown entity '{target}'")]
    UnknownRelationTarget {
        entity: String,
        relation: String,
        target: String,
    },
}

///
/// TESTS
///
