use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};

use crate::generate::value::Value;

/// Tracks generated values for unique scalar fields and model-level
/// unique field sets.
pub struct UniqueTracker {
    /// Map from constraint key (model + fields) to set of seen values.
    constraints: HashMap<String, HashSet<String>>,
    /// Maximum regeneration attempts before a value is given up as null.
    pub max_retries: usize,
}

impl UniqueTracker {
    pub fn new() -> Self {
        Self {
            constraints: HashMap::new(),
            max_retries: 100,
        }
    }

    /// Register a unique constraint to track.
    pub fn register_constraint(&mut self, model_name: &str, fields: &[String]) {
        let key = constraint_key(model_name, fields);
        self.constraints.entry(key).or_default();
    }

    /// Check if a value (or composite value) has been seen before.
    /// If not, record it and return true. If duplicate, return false.
    pub fn try_insert(&mut self, model_name: &str, fields: &[String], values: &[&Value]) -> bool {
        let key = constraint_key(model_name, fields);

        if let Some(seen) = self.constraints.get_mut(&key) {
            seen.insert(value_key(values))
        } else {
            // Constraint not registered, allow anything
            true
        }
    }

    /// Whether a value (or composite value) was already recorded.
    pub fn contains(&self, model_name: &str, fields: &[String], values: &[&Value]) -> bool {
        self.constraints
            .get(&constraint_key(model_name, fields))
            .is_some_and(|seen| seen.contains(&value_key(values)))
    }

    /// Forget a recorded value, e.g. one from a record that was regenerated.
    pub fn remove(&mut self, model_name: &str, fields: &[String], values: &[&Value]) {
        if let Some(seen) = self.constraints.get_mut(&constraint_key(model_name, fields)) {
            seen.remove(&value_key(values));
        }
    }

    /// Check if a single-field value is unique.
    pub fn try_insert_single(&mut self, model_name: &str, field_name: &str, value: &Value) -> bool {
        self.try_insert(model_name, &[field_name.to_string()], &[value])
    }

    /// Get the number of unique values tracked for a constraint.
    pub fn count(&self, model_name: &str, fields: &[String]) -> usize {
        let key = constraint_key(model_name, fields);
        self.constraints.get(&key).map(|s| s.len()).unwrap_or(0)
    }
}

impl Default for UniqueTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn constraint_key(model_name: &str, fields: &[String]) -> String {
    format!("{}:{}", model_name, fields.join(","))
}

fn value_key(values: &[&Value]) -> String {
    values
        .iter()
        .map(|v| v.to_unique_key())
        .collect::<Vec<_>>()
        .join("|")
}

/// Distinct candidate ids handed out without replacement.
///
/// Backs unique foreign keys: the pool is shuffled once, each draw takes the
/// next id, and an exhausted pool yields `None` instead of repeating an id.
#[derive(Debug, Clone)]
pub struct UniqueIdPool {
    ids: Vec<Value>,
    next: usize,
}

impl UniqueIdPool {
    /// Build a pool from candidate ids, dropping nulls and duplicates while
    /// keeping first-seen order before the shuffle.
    pub fn new(candidates: &[Value], rng: &mut impl Rng) -> Self {
        let mut seen = HashSet::new();
        let mut ids: Vec<Value> = candidates
            .iter()
            .filter(|v| !v.is_null())
            .filter(|v| seen.insert(v.to_unique_key()))
            .cloned()
            .collect();
        ids.shuffle(rng);
        Self { ids, next: 0 }
    }

    /// Take the next unused id, or `None` once every id has been handed out.
    pub fn draw(&mut self) -> Option<Value> {
        let id = self.ids.get(self.next)?.clone();
        self.next += 1;
        Some(id)
    }

    pub fn remaining(&self) -> usize {
        self.ids.len() - self.next
    }

    pub fn capacity(&self) -> usize {
        self.ids.len()
    }
}
