use indexmap::IndexMap;
use rand::Rng;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::generate::foreign_key::{RelationData, RelationItem};
use crate::generate::preset::Preset;
use crate::generate::value::Value;

pub const DEFAULT_COUNT: usize = 10;

/// Closure of the record index.
pub type CustomFieldFn = Arc<dyn Fn(usize) -> Value + Send + Sync>;

/// A per-field override that bypasses the field resolver.
#[derive(Clone)]
pub enum CustomField {
    /// The same value on every record.
    Literal(Value),
    /// One of `values`, uniform or weighted.
    Weighted {
        values: Vec<Value>,
        weights: Option<Vec<f64>>,
    },
    /// Computed from the record index.
    Generator(CustomFieldFn),
}

impl CustomField {
    pub fn from_fn(f: impl Fn(usize) -> Value + Send + Sync + 'static) -> Self {
        CustomField::Generator(Arc::new(f))
    }

    pub fn resolve(&self, record_index: usize, rng: &mut impl Rng) -> Value {
        match self {
            CustomField::Literal(value) => value.clone(),
            CustomField::Weighted { values, weights } => match weights {
                _ if values.is_empty() => Value::Null,
                Some(w) => weighted_pick(values, w, rng),
                None => values[rng.random_range(0..values.len())].clone(),
            },
            CustomField::Generator(f) => f(record_index),
        }
    }
}

impl fmt::Debug for CustomField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomField::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            CustomField::Weighted { values, weights } => f
                .debug_struct("Weighted")
                .field("values", values)
                .field("weights", weights)
                .finish(),
            CustomField::Generator(_) => f.write_str("Generator(<fn>)"),
        }
    }
}

impl From<Value> for CustomField {
    fn from(value: Value) -> Self {
        CustomField::Literal(value)
    }
}

/// Weighted random selection from a value list.
///
/// Uses cumulative distribution for O(n) selection.
/// Edge cases:
/// - All weights zero → uniform fallback
/// - Negative weights → clamped to zero
/// - Fewer weights than values → missing weights count as zero
pub fn weighted_pick(values: &[Value], weights: &[f64], rng: &mut impl Rng) -> Value {
    let Some(last) = values.last() else {
        return Value::Null;
    };
    if values.len() == 1 {
        return last.clone();
    }

    let clamped: Vec<f64> = (0..values.len())
        .map(|i| weights.get(i).copied().unwrap_or(0.0).max(0.0))
        .collect();
    let total: f64 = clamped.iter().sum();

    if total <= 0.0 {
        return values[rng.random_range(0..values.len())].clone();
    }

    let roll: f64 = rng.random::<f64>() * total;
    let mut cumulative = 0.0;
    for (i, w) in clamped.iter().enumerate() {
        cumulative += w;
        if roll < cumulative {
            return values[i].clone();
        }
    }

    // Floating-point edge case
    last.clone()
}

/// Options for generating one model's records.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub count: usize,
    /// Overrides keyed by field name.
    pub custom_fields: IndexMap<String, CustomField>,
    /// Related items keyed by relation field name, relation name or target
    /// model name (looked up in that order).
    pub relation_data: RelationData,
    /// Flattened output: relations are not embedded, many-to-many links go
    /// to join tables, values are converted to SQL-safe form.
    pub sql_mode: bool,
    pub preset: Option<Preset>,
    /// Relation fields left as placeholders for a later backfill pass.
    pub deferred_fields: Vec<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            custom_fields: IndexMap::new(),
            relation_data: RelationData::new(),
            sql_mode: false,
            preset: None,
            deferred_fields: Vec::new(),
        }
    }
}

impl GenerationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_custom_field(mut self, field: impl Into<String>, custom: CustomField) -> Self {
        self.custom_fields.insert(field.into(), custom);
        self
    }

    pub fn with_relation_data(
        mut self,
        key: impl Into<String>,
        items: impl IntoIterator<Item = RelationItem>,
    ) -> Self {
        self.relation_data.insert(key.into(), items.into_iter().collect());
        self
    }

    pub fn with_sql_mode(mut self, sql_mode: bool) -> Self {
        self.sql_mode = sql_mode;
        self
    }

    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.preset = Some(preset);
        self
    }

    pub fn with_deferred_field(mut self, field: impl Into<String>) -> Self {
        self.deferred_fields.push(field.into());
        self
    }

    pub fn is_deferred(&self, field: &str) -> bool {
        self.deferred_fields.iter().any(|f| f == field)
    }

    /// Select a preset by name; unknown names are an error.
    pub fn with_preset_name(self, name: &str) -> Result<Self> {
        Ok(self.with_preset(name.parse()?))
    }
}
