//! # Relation Candidate Pools
//!
//! Relation fields draw their ids from records of the referenced model that
//! were generated earlier in the run (or supplied by the caller). A pool holds
//! the distinct, non-null ids extracted from those items.

use indexmap::IndexMap;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::HashSet;

use crate::generate::unique::UniqueIdPool;
use crate::generate::value::{Record, Value};
use crate::schema::types::Field;

/// An already generated related item: a full record or a bare id.
#[derive(Debug, Clone, PartialEq)]
pub enum RelationItem {
    Record(Record),
    Id(Value),
}

impl RelationItem {
    /// The id this item contributes. Records are read at `key`, falling back
    /// to `id` when the record has no such field.
    pub fn id(&self, key: &str) -> Option<&Value> {
        let value = match self {
            RelationItem::Id(v) => Some(v),
            RelationItem::Record(record) => record.get(key).or_else(|| record.get("id")),
        }?;
        (!value.is_null()).then_some(value)
    }
}

impl From<Record> for RelationItem {
    fn from(record: Record) -> Self {
        RelationItem::Record(record)
    }
}

impl From<Value> for RelationItem {
    fn from(id: Value) -> Self {
        RelationItem::Id(id)
    }
}

/// Related items keyed by relation field name, relation name or model name.
pub type RelationData = IndexMap<String, Vec<RelationItem>>;

/// Field of a related record that holds the referenced id.
pub fn reference_key(field: &Field) -> &str {
    field
        .relation_references
        .as_ref()
        .and_then(|refs| refs.first())
        .map(|s| s.as_str())
        .unwrap_or("id")
}

/// Bare-id items read from finished records at `key`, skipping records
/// without a usable id.
pub fn id_items(records: &[Record], key: &str) -> Vec<RelationItem> {
    records
        .iter()
        .filter_map(|record| record.get(key).or_else(|| record.get("id")))
        .filter(|id| !id.is_null())
        .cloned()
        .map(RelationItem::Id)
        .collect()
}

/// Distinct candidate ids for one relation field.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    ids: Vec<Value>,
}

impl CandidatePool {
    pub fn from_items(items: &[RelationItem], key: &str) -> Self {
        let mut seen = HashSet::new();
        let ids = items
            .iter()
            .filter_map(|item| item.id(key))
            .filter(|id| seen.insert(id.to_unique_key()))
            .cloned()
            .collect();
        Self { ids }
    }

    pub fn from_ids(ids: Vec<Value>) -> Self {
        let items: Vec<RelationItem> = ids.into_iter().map(RelationItem::Id).collect();
        Self::from_items(&items, "id")
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn ids(&self) -> &[Value] {
        &self.ids
    }

    /// Pick one id uniformly at random (with replacement across calls).
    pub fn pick(&self, rng: &mut impl Rng) -> Option<Value> {
        self.ids.choose(rng).cloned()
    }

    /// Up to `count` distinct ids; never more than the pool holds.
    pub fn sample(&self, count: usize, rng: &mut impl Rng) -> Vec<Value> {
        self.ids
            .choose_multiple(rng, count.min(self.ids.len()))
            .cloned()
            .collect()
    }

    /// A without-replacement pool over the same ids.
    pub fn unique_pool(&self, rng: &mut impl Rng) -> UniqueIdPool {
        UniqueIdPool::new(&self.ids, rng)
    }
}
