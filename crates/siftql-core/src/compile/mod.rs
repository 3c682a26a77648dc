//! Module: compile
//! Responsibility: turning a parsed AST into an executable predicate tree:
//! allow-list checks, path/join resolution, value coercion, operator
//! dispatch.
//! Does not own: parsing (see `rsql`) or evaluation (see `exec`).

pub mod coerce;
pub mod path;
mod predicate;

pub use coerce::{CoercionError, coerce};
pub use path::{Join, JoinContext, JoinId, NavigationError, ResolvedField, resolve};
pub use predicate::{CompareOp, ComparePredicate, Expr, FieldRef, Predicate};

use crate::{
    rsql::{Comparison, Node, ParseError, SearchOp, parse},
    schema::{FieldMapper, FieldMapping, FieldNotAllowedError, FieldType, Schema},
    value::Value,
};
use log::debug;
use thiserror::Error as ThisError;

///
/// CompiledQuery
///
/// The opaque executable artifact: the root entity, the ordered join list
/// created during compilation, and the predicate tree over those joins.
///

#[derive(Clone, Debug)]
pub struct CompiledQuery {
    pub entity: String,
    pub joins: Vec<Join>,
    pub predicate: Predicate,
}

///
/// CompileError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CompileError {
    #[error(transparent)]
    FieldNotAllowed(#[from] FieldNotAllowedError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error(transparent)]
    Coercion(#[from] CoercionError),

    /// Only reachable through hand-built ASTs; the parser guarantees two or more
    /// children per group.
    #[error("a boolean group must have at least one operand")]
    EmptyGroup,

    /// Only reachable through hand-built ASTs; the parser guarantees arity.
    #[error("wrong number of arguments for operator '{op}' on '{selector}'")]
    ArgumentCount { selector: String, op: SearchOp },

    #[error("ordering operator '{op}' is not supported on composite field '{selector}'")]
    OrderedComposite { selector: String, op: SearchOp },

    #[error("operator '{op}' requires an ordered field and '{selector}' is not ordered")]
    UnorderedField { selector: String, op: SearchOp },

    #[error("operator '{op}' requires a text field and '{selector}' is not text")]
    TextOperator { selector: String, op: SearchOp },
}

///
/// QueryError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum QueryError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// Parse and compile a raw query string against one entity's mapper.
///
/// A fresh `JoinContext` is created per call, keeping the compiler
/// referentially transparent and safe under concurrent use.
pub fn compile_query(
    query: &str,
    schema: &Schema,
    mapper: &FieldMapper,
) -> Result<CompiledQuery, QueryError> {
    let node = parse(query)?;

    let mut ctx = JoinContext::new();
    let predicate = compile(&node, schema, mapper, &mut ctx)?;
    let joins = ctx.into_joins();

    debug!(
        "compiled query for entity '{}' with {} join(s)",
        mapper.entity(),
        joins.len()
    );

    Ok(CompiledQuery {
        entity: mapper.entity().to_string(),
        joins,
        predicate,
    })
}

/// Compile one AST node, threading the join context through the recursion.
pub fn compile(
    node: &Node,
    schema: &Schema,
    mapper: &FieldMapper,
    ctx: &mut JoinContext,
) -> Result<Predicate, CompileError> {
    match node {
        Node::And(children) => {
            if children.is_empty() {
                return Err(CompileError::EmptyGroup);
            }
            let compiled = children
                .iter()
                .map(|child| compile(child, schema, mapper, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Predicate::And(compiled))
        }
        Node::Or(children) => {
            if children.is_empty() {
                return Err(CompileError::EmptyGroup);
            }
            let compiled = children
                .iter()
                .map(|child| compile(child, schema, mapper, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Predicate::Or(compiled))
        }
        Node::Comparison(cmp) => compile_comparison(cmp, schema, mapper, ctx),
    }
}

fn compile_comparison(
    cmp: &Comparison,
    schema: &Schema,
    mapper: &FieldMapper,
    ctx: &mut JoinContext,
) -> Result<Predicate, CompileError> {
    // Fails closed: unmapped selectors never reach path resolution.
    let mapping = mapper.mapping(&cmp.selector)?;

    match mapping {
        FieldMapping::Simple { path } => {
            let resolved = resolve(schema, mapper.entity(), path, ctx)?;
            compile_simple(cmp, &resolved)
        }
        FieldMapping::Composite { paths, separator } => {
            let parts = paths
                .iter()
                .map(|path| resolve(schema, mapper.entity(), path, ctx).map(|r| r.to_ref()))
                .collect::<Result<Vec<_>, _>>()?;
            let expr = Expr::Concat {
                parts,
                separator: separator.clone(),
            };
            compile_composite(cmp, expr)
        }
    }
}

/// Literal that selects null-ness checks instead of value comparison.
/// Case-sensitive: `NULL` and `Null` are ordinary argument text.
const NULL_LITERAL: &str = "null";

fn compile_simple(cmp: &Comparison, resolved: &ResolvedField) -> Result<Predicate, CompileError> {
    let expr = Expr::Field(resolved.to_ref());
    let field_type = &resolved.field_type;

    match cmp.op {
        SearchOp::Equal => {
            let arg = single_arg(cmp)?;
            if arg == NULL_LITERAL {
                return Ok(Predicate::IsNull { expr });
            }
            let value = coerce(arg, field_type)?;
            Ok(Predicate::compare(expr, CompareOp::Eq, value))
        }
        SearchOp::NotEqual => {
            let arg = single_arg(cmp)?;
            if arg == NULL_LITERAL {
                return Ok(Predicate::IsNotNull { expr });
            }
            let value = coerce(arg, field_type)?;
            Ok(Predicate::compare(expr, CompareOp::Ne, value))
        }
        SearchOp::GreaterThan
        | SearchOp::GreaterThanOrEqual
        | SearchOp::LessThan
        | SearchOp::LessThanOrEqual => {
            if !field_type.is_ordered() {
                return Err(CompileError::UnorderedField {
                    selector: cmp.selector.clone(),
                    op: cmp.op,
                });
            }
            let value = coerce(single_arg(cmp)?, field_type)?;
            Ok(Predicate::compare(expr, ordering_op(cmp.op), value))
        }
        SearchOp::In | SearchOp::NotIn => {
            let values = list_values(cmp, field_type)?;
            let op = if cmp.op == SearchOp::In {
                CompareOp::In
            } else {
                CompareOp::NotIn
            };
            Ok(Predicate::compare(expr, op, Value::List(values)))
        }
        SearchOp::Like | SearchOp::NotLike => {
            if !field_type.is_text() {
                return Err(CompileError::TextOperator {
                    selector: cmp.selector.clone(),
                    op: cmp.op,
                });
            }
            like_predicate(cmp, expr)
        }
    }
}

/// Composite mappings are string-typed: arguments coerce as text, ordering
/// operators are rejected outright.
fn compile_composite(cmp: &Comparison, expr: Expr) -> Result<Predicate, CompileError> {
    match cmp.op {
        SearchOp::Equal => {
            let arg = single_arg(cmp)?;
            if arg == NULL_LITERAL {
                return Ok(Predicate::IsNull { expr });
            }
            Ok(Predicate::compare(
                expr,
                CompareOp::Eq,
                Value::Text(arg.to_string()),
            ))
        }
        SearchOp::NotEqual => {
            let arg = single_arg(cmp)?;
            if arg == NULL_LITERAL {
                return Ok(Predicate::IsNotNull { expr });
            }
            Ok(Predicate::compare(
                expr,
                CompareOp::Ne,
                Value::Text(arg.to_string()),
            ))
        }
        SearchOp::GreaterThan
        | SearchOp::GreaterThanOrEqual
        | SearchOp::LessThan
        | SearchOp::LessThanOrEqual => Err(CompileError::OrderedComposite {
            selector: cmp.selector.clone(),
            op: cmp.op,
        }),
        SearchOp::In | SearchOp::NotIn => {
            let values = list_values(cmp, &FieldType::Text)?;
            let op = if cmp.op == SearchOp::In {
                CompareOp::In
            } else {
                CompareOp::NotIn
            };
            Ok(Predicate::compare(expr, op, Value::List(values)))
        }
        SearchOp::Like | SearchOp::NotLike => like_predicate(cmp, expr),
    }
}

fn like_predicate(cmp: &Comparison, expr: Expr) -> Result<Predicate, CompileError> {
    let needle = single_arg(cmp)?.to_string();

    Ok(if cmp.op == SearchOp::Like {
        Predicate::LikeCi { expr, needle }
    } else {
        Predicate::NotLikeCi { expr, needle }
    })
}

fn single_arg(cmp: &Comparison) -> Result<&str, CompileError> {
    match cmp.args.as_slice() {
        [arg] => Ok(arg),
        _ => Err(CompileError::ArgumentCount {
            selector: cmp.selector.clone(),
            op: cmp.op,
        }),
    }
}

fn list_values(cmp: &Comparison, field_type: &FieldType) -> Result<Vec<Value>, CompileError> {
    if cmp.args.is_empty() {
        return Err(CompileError::ArgumentCount {
            selector: cmp.selector.clone(),
            op: cmp.op,
        });
    }

    cmp.args
        .iter()
        .map(|arg| coerce(arg, field_type).map_err(CompileError::from))
        .collect()
}

const fn ordering_op(op: SearchOp) -> CompareOp {
    match op {
        SearchOp::GreaterThan => CompareOp::Gt,
        SearchOp::GreaterThanOrEqual => CompareOp::Gte,
        SearchOp::LessThan => CompareOp::Lt,
        _ => CompareOp::Lte,
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{book_mapper, catalog_schema};

    fn compiled(query: &str) -> CompiledQuery {
        let schema = catalog_schema();
        let mapper = book_mapper();
        compile_query(query, &schema, &mapper).unwrap()
    }

    fn compile_err(query: &str) -> QueryError {
        let schema = catalog_schema();
        let mapper = book_mapper();
        compile_query(query, &schema, &mapper).unwrap_err()
    }

    #[test]
    fn null_literal_compiles_to_nullness_checks() {
        let query = compiled("description==null");
        assert!(matches!(query.predicate, Predicate::IsNull { .. }));

        let query = compiled("description!=null");
        assert!(matches!(query.predicate, Predicate::IsNotNull { .. }));

        // Case-sensitive: "NULL" is an ordinary text argument.
        let query = compiled("description==NULL");
        assert!(matches!(
            query.predicate,
            Predicate::Compare(ComparePredicate {
                op: CompareOp::Eq,
                value: Value::Text(ref text),
                ..
            }) if text == "NULL"
        ));
    }

    #[test]
    fn membership_arguments_are_coerced_to_the_field_type() {
        let query = compiled("series.volume=in=(1,2,3)");

        let Predicate::Compare(cmp) = &query.predicate else {
            panic!("expected comparison, got {:?}", query.predicate);
        };
        assert_eq!(cmp.op, CompareOp::In);
        assert_eq!(
            cmp.value,
            Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );

        let err = compile_err("series.volume=in=(1,two)");
        assert!(matches!(
            err,
            QueryError::Compile(CompileError::Coercion(CoercionError { ref raw, .. }))
                if raw == "two"
        ));
    }

    #[test]
    fn disallowed_fields_fail_closed() {
        let err = compile_err("invalidField==value");

        assert!(matches!(
            err,
            QueryError::Compile(CompileError::FieldNotAllowed(FieldNotAllowedError { ref field }))
                if field == "invalidField"
        ));
    }

    #[test]
    fn ordering_operators_require_ordered_simple_fields() {
        // Composite mapping: rejected outright.
        let err = compile_err("author.name=gt=M");
        assert!(matches!(
            err,
            QueryError::Compile(CompileError::OrderedComposite { ref selector, .. })
                if selector == "author.name"
        ));

        // Bool field: not ordered.
        let err = compile_err("available=gt=true");
        assert!(matches!(
            err,
            QueryError::Compile(CompileError::UnorderedField { ref selector, .. })
                if selector == "available"
        ));

        // Date field: ordered.
        let query = compiled("published=ge=2020-01-01");
        assert!(matches!(
            query.predicate,
            Predicate::Compare(ComparePredicate {
                op: CompareOp::Gte,
                ..
            })
        ));
    }

    #[test]
    fn like_requires_text_and_compiles_case_insensitive() {
        let query = compiled(r#"title=like="doe""#);
        assert!(matches!(
            query.predicate,
            Predicate::LikeCi { ref needle, .. } if needle == "doe"
        ));

        let query = compiled("title=notlike=draft");
        assert!(matches!(query.predicate, Predicate::NotLikeCi { .. }));

        let err = compile_err("series.volume=like=1");
        assert!(matches!(
            err,
            QueryError::Compile(CompileError::TextOperator { ref selector, .. })
                if selector == "series.volume"
        ));
    }

    #[test]
    fn composite_mappings_share_joins_with_simple_mappings() {
        let query = compiled(r#"author.name=="John Doe";authors.firstName==John"#);

        // Both sides traverse `authors`; one join serves all three refs.
        assert_eq!(query.joins.len(), 1);

        let Predicate::And(children) = &query.predicate else {
            panic!("expected conjunction, got {:?}", query.predicate);
        };
        assert!(matches!(
            children[0],
            Predicate::Compare(ComparePredicate {
                expr: Expr::Concat { ref parts, ref separator },
                op: CompareOp::Eq,
                ..
            }) if parts.len() == 2 && separator == " "
        ));
    }

    #[test]
    fn aliased_selectors_resolve_to_the_same_physical_field() {
        let bio = compiled(r#"author.bio=like=history"#);
        let description = compiled(r#"author.description=like=history"#);

        assert_eq!(bio.predicate, description.predicate);
    }

    #[test]
    fn hand_built_asts_cannot_bypass_arity_checks() {
        let schema = catalog_schema();
        let mapper = book_mapper();
        let mut ctx = JoinContext::new();

        let node = Node::comparison("title", SearchOp::Equal, vec![]);
        assert_eq!(
            compile(&node, &schema, &mapper, &mut ctx),
            Err(CompileError::ArgumentCount {
                selector: "title".into(),
                op: SearchOp::Equal,
            })
        );

        let node = Node::And(vec![]);
        assert_eq!(
            compile(&node, &schema, &mapper, &mut ctx),
            Err(CompileError::EmptyGroup)
        );
    }

    #[test]
    fn compiled_predicates_serialize_for_diagnostics() {
        let query = compiled("series.volume=in=(1,2,3)");

        let json = serde_json::to_value(&query.predicate).unwrap();
        assert!(json.get("Compare").is_some());

        let json = serde_json::to_value(&query.joins).unwrap();
        assert_eq!(json[0]["attribute"], "series");
    }

    #[test]
    fn enum_fields_accept_membership_but_not_ordering() {
        let query = compiled("genre=in=(fantasy,scifi)");
        let Predicate::Compare(cmp) = &query.predicate else {
            panic!("expected comparison, got {:?}", query.predicate);
        };
        assert_eq!(
            cmp.value,
            Value::List(vec![
                Value::Enum("FANTASY".into()),
                Value::Enum("SCIFI".into())
            ])
        );

        let err = compile_err("genre=lt=FANTASY");
        assert!(matches!(
            err,
            QueryError::Compile(CompileError::UnorderedField { .. })
        ));
    }
}
