use crate::{
    compile::predicate::FieldRef,
    schema::{FieldType, RelationKind, Schema},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// Path resolution and the join context
///
/// Walks a dotted physical path, creating or reusing one left-outer join per
/// `(parent join, attribute)` pair within a single compilation. Reuse is what
/// makes two comparisons through the same to-many relationship constrain the
/// same related row instead of multiplying rows.
///

///
/// JoinId
///
/// Index into the compilation's join list; creation order is topological
/// (parents precede children).
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub struct JoinId(pub usize);

///
/// Join
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Join {
    pub id: JoinId,
    /// `None` when joined directly off the root entity.
    pub parent: Option<JoinId>,
    /// Relation attribute on the parent entity.
    pub attribute: String,
    /// Target entity of the relation.
    pub entity: String,
    pub kind: RelationKind,
}

///
/// NavigationError
///
/// Selectors only reach this resolver through a mapper's own physical
/// mappings, so every variant indicates a misconfigured mapper or schema,
/// not client input.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum NavigationError {
    #[error("entity '{entity}' is not defined in the schema")]
    UnknownEntity { entity: String },

    #[error("segment '{segment}' is not a navigable relationship on '{entity}'")]
    NotARelation { entity: String, segment: String },

    #[error("segment '{segment}' does not name a field on '{entity}'")]
    UnknownField { entity: String, segment: String },
}

///
/// JoinContext
///
/// Per-compilation registry of created joins. Created fresh for every
/// compile call; never shared across compilations or threads.
///

#[derive(Debug, Default)]
pub struct JoinContext {
    joins: Vec<Join>,
    index: BTreeMap<(Option<JoinId>, String), JoinId>,
}

impl JoinContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    #[must_use]
    pub fn into_joins(self) -> Vec<Join> {
        self.joins
    }

    /// Reuse the join registered for `(parent, attribute)` or create a new
    /// left-outer join and register it.
    fn join_for(
        &mut self,
        parent: Option<JoinId>,
        attribute: &str,
        entity: &str,
        kind: RelationKind,
    ) -> JoinId {
        let key = (parent, attribute.to_string());
        if let Some(existing) = self.index.get(&key) {
            return *existing;
        }

        let id = JoinId(self.joins.len());
        self.joins.push(Join {
            id,
            parent,
            attribute: attribute.to_string(),
            entity: entity.to_string(),
            kind,
        });
        self.index.insert(key, id);

        id
    }
}

///
/// ResolvedField
///
/// Terminal of a path walk: the owning join (or root), the physical field
/// name, and its declared type for coercion.
///

#[derive(Clone, Debug)]
pub struct ResolvedField {
    pub join: Option<JoinId>,
    pub field: String,
    pub field_type: FieldType,
}

impl ResolvedField {
    #[must_use]
    pub fn to_ref(&self) -> FieldRef {
        FieldRef {
            join: self.join,
            field: self.field.clone(),
        }
    }
}

/// Walk `path` from `entity`, joining through every intermediate segment.
pub fn resolve(
    schema: &Schema,
    entity: &str,
    path: &str,
    ctx: &mut JoinContext,
) -> Result<ResolvedField, NavigationError> {
    let mut current = schema
        .entity(entity)
        .ok_or_else(|| NavigationError::UnknownEntity {
            entity: entity.to_string(),
        })?;
    let mut join: Option<JoinId> = None;

    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            let field_type =
                current
                    .field(segment)
                    .ok_or_else(|| NavigationError::UnknownField {
                        entity: current.name().to_string(),
                        segment: segment.to_string(),
                    })?;

            return Ok(ResolvedField {
                join,
                field: segment.to_string(),
                field_type: field_type.clone(),
            });
        }

        let relation = current
            .relation(segment)
            .ok_or_else(|| NavigationError::NotARelation {
                entity: current.name().to_string(),
                segment: segment.to_string(),
            })?;
        let target = schema.entity(relation.target()).ok_or_else(|| {
            NavigationError::UnknownEntity {
                entity: relation.target().to_string(),
            }
        })?;

        join = Some(ctx.join_for(join, segment, target.name(), relation.kind()));
        current = target;
    }

    // `str::split` always yields at least one segment.
    Err(NavigationError::UnknownField {
        entity: entity.to_string(),
        segment: String::new(),
    })
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::catalog_schema;
    use crate::schema::FieldType;

    #[test]
    fn root_fields_resolve_without_joins() {
        let schema = catalog_schema();
        let mut ctx = JoinContext::new();

        let resolved = resolve(&schema, "Book", "title", &mut ctx).unwrap();

        assert_eq!(resolved.join, None);
        assert_eq!(resolved.field, "title");
        assert_eq!(resolved.field_type, FieldType::Text);
        assert!(ctx.joins().is_empty());
    }

    #[test]
    fn intermediate_segments_create_joins() {
        let schema = catalog_schema();
        let mut ctx = JoinContext::new();

        let resolved = resolve(&schema, "Book", "authors.firstName", &mut ctx).unwrap();

        assert_eq!(resolved.join, Some(JoinId(0)));
        let joins = ctx.joins();
        assert_eq!(joins.len(), 1);
        assert_eq!(joins[0].attribute, "authors");
        assert_eq!(joins[0].entity, "Author");
        assert_eq!(joins[0].kind, RelationKind::ToMany);
        assert_eq!(joins[0].parent, None);
    }

    #[test]
    fn repeated_paths_reuse_the_same_join() {
        let schema = catalog_schema();
        let mut ctx = JoinContext::new();

        let first = resolve(&schema, "Book", "authors.firstName", &mut ctx).unwrap();
        let last = resolve(&schema, "Book", "authors.lastName", &mut ctx).unwrap();

        assert_eq!(first.join, last.join);
        assert_eq!(ctx.joins().len(), 1);

        // A different relation still gets its own join.
        let series = resolve(&schema, "Book", "series.name", &mut ctx).unwrap();
        assert_eq!(series.join, Some(JoinId(1)));
        assert_eq!(ctx.joins().len(), 2);
    }

    #[test]
    fn non_relation_segments_are_navigation_errors() {
        let schema = catalog_schema();
        let mut ctx = JoinContext::new();

        let err = resolve(&schema, "Book", "title.length", &mut ctx).unwrap_err();
        assert_eq!(
            err,
            NavigationError::NotARelation {
                entity: "Book".into(),
                segment: "title".into(),
            }
        );

        let err = resolve(&schema, "Book", "authors.age", &mut ctx).unwrap_err();
        assert_eq!(
            err,
            NavigationError::UnknownField {
                entity: "Author".into(),
                segment: "age".into(),
            }
        );
    }
}
