use crate::{
    compile::{CompareOp, ComparePredicate, Expr, FieldRef, Join, Predicate},
    exec::Record,
    value::{Value, casefold},
};
use std::cmp::Ordering;

///
/// Predicate evaluation
///
/// Implements left-outer-join semantics over the compiled join list: every
/// join binds to one related row of its parent (or to an absent row when the
/// relation is empty), and a root record matches when some complete binding
/// satisfies the predicate. Because shared joins bind once, two comparisons
/// through the same path constrain the same related row.
///
/// Three-valued logic collapses at the leaves: comparisons against absent
/// rows or null values are false for positive and negated operators alike.
///

pub(crate) fn matches(root: &Record, joins: &[Join], predicate: &Predicate) -> bool {
    let mut binding: Vec<Option<&Record>> = vec![None; joins.len()];
    bind(root, joins, predicate, 0, &mut binding)
}

// Join creation order is topological, so each join's parent is already bound
// when the join is visited.
fn bind<'a>(
    root: &'a Record,
    joins: &[Join],
    predicate: &Predicate,
    index: usize,
    binding: &mut Vec<Option<&'a Record>>,
) -> bool {
    let Some(join) = joins.get(index) else {
        return eval(root, binding, predicate);
    };

    let parent = match join.parent {
        None => Some(root),
        Some(id) => binding.get(id.0).copied().flatten(),
    };
    let candidates = parent.map_or(&[] as &[Record], |record| record.related(&join.attribute));

    if candidates.is_empty() {
        binding[index] = None;
        return bind(root, joins, predicate, index + 1, binding);
    }

    for candidate in candidates {
        binding[index] = Some(candidate);
        if bind(root, joins, predicate, index + 1, binding) {
            return true;
        }
    }
    binding[index] = None;

    false
}

fn eval(root: &Record, binding: &[Option<&Record>], predicate: &Predicate) -> bool {
    match predicate {
        Predicate::And(children) => children.iter().all(|child| eval(root, binding, child)),
        Predicate::Or(children) => children.iter().any(|child| eval(root, binding, child)),
        Predicate::Not(inner) => !eval(root, binding, inner),

        Predicate::Compare(cmp) => eval_compare(root, binding, cmp),

        Predicate::IsNull { expr } => resolve_expr(root, binding, expr).is_none(),
        Predicate::IsNotNull { expr } => resolve_expr(root, binding, expr).is_some(),

        Predicate::LikeCi { expr, needle } => like(root, binding, expr, needle).unwrap_or(false),
        Predicate::NotLikeCi { expr, needle } => {
            like(root, binding, expr, needle).is_some_and(|matched| !matched)
        }
    }
}

fn eval_compare(root: &Record, binding: &[Option<&Record>], cmp: &ComparePredicate) -> bool {
    let Some(actual) = resolve_expr(root, binding, &cmp.expr) else {
        return false;
    };

    // Comparison helpers return None when undefined; eval treats that as a
    // non-match.
    match cmp.op {
        CompareOp::Eq => actual.compare_eq(&cmp.value).unwrap_or(false),
        CompareOp::Ne => actual.compare_eq(&cmp.value).is_some_and(|eq| !eq),

        CompareOp::Lt => actual
            .compare_order(&cmp.value)
            .is_some_and(Ordering::is_lt),
        CompareOp::Lte => actual
            .compare_order(&cmp.value)
            .is_some_and(Ordering::is_le),
        CompareOp::Gt => actual
            .compare_order(&cmp.value)
            .is_some_and(Ordering::is_gt),
        CompareOp::Gte => actual
            .compare_order(&cmp.value)
            .is_some_and(Ordering::is_ge),

        CompareOp::In => in_list(&actual, &cmp.value).unwrap_or(false),
        CompareOp::NotIn => in_list(&actual, &cmp.value).is_some_and(|matched| !matched),
    }
}

/// Case-insensitive substring check; `None` when the expression is null or
/// has no text rendering.
fn like(
    root: &Record,
    binding: &[Option<&Record>],
    expr: &Expr,
    needle: &str,
) -> Option<bool> {
    let haystack = resolve_expr(root, binding, expr)?.render_text()?;

    Some(casefold(&haystack).contains(&casefold(needle)))
}

/// Check whether a value equals any element in a list.
fn in_list(actual: &Value, list: &Value) -> Option<bool> {
    let Value::List(items) = list else {
        return None;
    };

    let mut saw_valid = false;
    for item in items {
        match actual.compare_eq(item) {
            Some(true) => return Some(true),
            Some(false) => saw_valid = true,
            None => {}
        }
    }

    saw_valid.then_some(false)
}

/// Resolve an expression to a non-null value; `None` means the expression is
/// null (null field value, absent join row, or null concat operand).
fn resolve_expr(root: &Record, binding: &[Option<&Record>], expr: &Expr) -> Option<Value> {
    match expr {
        Expr::Field(field) => field_value(root, binding, field)
            .filter(|value| !value.is_null())
            .cloned(),
        Expr::Concat { parts, separator } => {
            let mut rendered = Vec::with_capacity(parts.len());
            for part in parts {
                let value = field_value(root, binding, part).filter(|value| !value.is_null())?;
                rendered.push(value.render_text()?);
            }

            Some(Value::Text(rendered.join(separator)))
        }
    }
}

fn field_value<'a>(
    root: &'a Record,
    binding: &[Option<&'a Record>],
    field: &FieldRef,
) -> Option<&'a Value> {
    let row = match field.join {
        None => root,
        Some(id) => binding.get(id.0).copied().flatten()?,
    };

    row.value(&field.field)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::{JoinId, Predicate};
    use crate::schema::RelationKind;

    fn author(first: &str, last: &str) -> Record {
        Record::new()
            .field("firstName", Value::Text(first.into()))
            .field("lastName", Value::Text(last.into()))
    }

    fn authors_join() -> Join {
        Join {
            id: JoinId(0),
            parent: None,
            attribute: "authors".into(),
            entity: "Author".into(),
            kind: RelationKind::ToMany,
        }
    }

    fn field(join: Option<JoinId>, name: &str) -> Expr {
        Expr::Field(FieldRef {
            join,
            field: name.into(),
        })
    }

    #[test]
    fn shared_join_constrains_the_same_related_row() {
        let book = Record::new().relation(
            "authors",
            vec![author("John", "Doe"), author("Jane", "Smith")],
        );
        let joins = vec![authors_join()];

        // first == John AND last == Smith only holds across *different*
        // authors; a shared join must therefore not match.
        let cross = Predicate::compare(
            field(Some(JoinId(0)), "firstName"),
            CompareOp::Eq,
            Value::Text("John".into()),
        ) & Predicate::compare(
            field(Some(JoinId(0)), "lastName"),
            CompareOp::Eq,
            Value::Text("Smith".into()),
        );
        assert!(!matches(&book, &joins, &cross));

        let same = Predicate::compare(
            field(Some(JoinId(0)), "firstName"),
            CompareOp::Eq,
            Value::Text("John".into()),
        ) & Predicate::compare(
            field(Some(JoinId(0)), "lastName"),
            CompareOp::Eq,
            Value::Text("Doe".into()),
        );
        assert!(matches(&book, &joins, &same));
    }

    #[test]
    fn absent_join_rows_fail_positive_and_negated_leaves() {
        let orphan = Record::new(); // no authors relation at all
        let joins = vec![authors_join()];

        let like = Predicate::LikeCi {
            expr: field(Some(JoinId(0)), "lastName"),
            needle: "doe".into(),
        };
        let not_like = Predicate::NotLikeCi {
            expr: field(Some(JoinId(0)), "lastName"),
            needle: "doe".into(),
        };

        assert!(!matches(&orphan, &joins, &like));
        assert!(!matches(&orphan, &joins, &not_like));

        // Absent rows read as null.
        let is_null = Predicate::IsNull {
            expr: field(Some(JoinId(0)), "lastName"),
        };
        assert!(matches(&orphan, &joins, &is_null));
    }

    #[test]
    fn null_field_values_read_as_null() {
        let record = Record::new().field("description", Value::Null);

        let is_null = Predicate::IsNull {
            expr: field(None, "description"),
        };
        let ne = Predicate::compare(
            field(None, "description"),
            CompareOp::Ne,
            Value::Text("x".into()),
        );

        assert!(matches(&record, &[], &is_null));
        assert!(!matches(&record, &[], &ne));
    }

    #[test]
    fn not_negates_the_whole_subtree() {
        let record = Record::new().field("pages", Value::Int(120));

        let short = Predicate::compare(field(None, "pages"), CompareOp::Lt, Value::Int(200));
        assert!(matches(&record, &[], &short));
        assert!(!matches(&record, &[], &Predicate::not(short)));
    }

    #[test]
    fn concat_is_null_when_any_part_is_null() {
        let record = Record::new().relation("authors", vec![
            Record::new().field("firstName", Value::Text("John".into())),
        ]);
        let joins = vec![authors_join()];

        let expr = Expr::Concat {
            parts: vec![
                FieldRef { join: Some(JoinId(0)), field: "firstName".into() },
                FieldRef { join: Some(JoinId(0)), field: "lastName".into() },
            ],
            separator: " ".into(),
        };

        let is_null = Predicate::IsNull { expr: expr.clone() };
        assert!(matches(&record, &joins, &is_null));

        let like = Predicate::LikeCi { expr, needle: "john".into() };
        assert!(!matches(&record, &joins, &like));
    }
}
