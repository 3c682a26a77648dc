//! Module: exec
//! Responsibility: reference in-memory executor for compiled queries:
//! record fixtures, join-aware evaluation, sorting, pagination.
//! Does not own: compilation or any storage/indexing claims. Real deployments
//! implement the same `execute` contract against their own store.

mod eval;
mod page;

pub use page::{Page, Pageable, SortDirection, SortKey};

use crate::{compile::CompiledQuery, value::Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// Record
///
/// One row: named field values plus related rows per relation attribute.
/// To-one relations hold at most one related record.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Record {
    fields: BTreeMap<String, Value>,
    relations: BTreeMap<String, Vec<Record>>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn relation(mut self, name: impl Into<String>, related: Vec<Self>) -> Self {
        self.relations.insert(name.into(), related);
        self
    }

    /// Field value, if the record carries one.
    #[must_use]
    pub fn value(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Related rows for a relation attribute; empty when absent.
    #[must_use]
    pub fn related(&self, attribute: &str) -> &[Self] {
        self.relations
            .get(attribute)
            .map_or(&[], Vec::as_slice)
    }
}

/// Execute a compiled query over a record set.
///
/// Matching roots are distinct and keep input order before sorting; the
/// predicate alone decides membership, so join row multiplication never
/// leaks into the result.
#[must_use]
pub fn execute(query: &CompiledQuery, records: &[Record], pageable: &Pageable) -> Page<Record> {
    let mut matched: Vec<&Record> = records
        .iter()
        .filter(|record| eval::matches(record, &query.joins, &query.predicate))
        .collect();

    sort_records(&mut matched, pageable.sort());

    let total = matched.len() as u64;
    let start = (pageable.page() as usize).saturating_mul(pageable.size() as usize);
    let content: Vec<Record> = matched
        .into_iter()
        .skip(start)
        .take(pageable.size() as usize)
        .cloned()
        .collect();

    Page::new(content, pageable.page(), pageable.size(), total)
}

const NULL: Value = Value::Null;

// Stable sort over root fields; null and missing values order first.
fn sort_records(records: &mut [&Record], keys: &[SortKey]) {
    if keys.is_empty() {
        return;
    }

    records.sort_by(|left, right| {
        for key in keys {
            let lhs = left.value(&key.field).unwrap_or(&NULL);
            let rhs = right.value(&key.field).unwrap_or(&NULL);

            let ordering = match key.direction {
                SortDirection::Asc => lhs.canonical_cmp(rhs),
                SortDirection::Desc => rhs.canonical_cmp(lhs),
            };
            if ordering.is_ne() {
                return ordering;
            }
        }

        std::cmp::Ordering::Equal
    });
}

///
/// TESTS
///
