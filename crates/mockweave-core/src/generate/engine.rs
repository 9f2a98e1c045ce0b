use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, warn};

use crate::generate::foreign_key::{reference_key, CandidatePool, RelationItem};
use crate::generate::options::GenerationOptions;
use crate::generate::providers::capitalize;
use crate::generate::resolver::{FieldResolver, GenerationContext};
use crate::generate::unique::UniqueTracker;
use crate::generate::value::{Record, Value};
use crate::schema::types::{Field, Model};

/// One many-to-many link in flattened output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinRow {
    #[serde(rename = "A")]
    pub a: Value,
    #[serde(rename = "B")]
    pub b: Value,
}

/// The records generated for one model.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedData {
    pub records: Vec<Record>,
    /// Join-table name to its rows. Only populated in SQL mode.
    pub join_table_records: IndexMap<String, Vec<JoinRow>>,
}

/// Maximum attempts to regenerate an entire record when a model-level unique
/// collision is detected.
const MAX_RECORD_RETRIES: usize = 50;

/// Upper bound of the random link count for array relations without a preset.
const DEFAULT_MAX_LINKS: usize = 2;

/// Generates records for one model at a time.
///
/// Holds the random source, so a generator built with a seed reproduces its
/// output as long as models are generated in the same order.
pub struct MockDataGenerator {
    rng: StdRng,
    resolver: FieldResolver,
}

impl MockDataGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng,
            resolver: FieldResolver::now(),
        }
    }

    /// Anchor temporal values at a fixed instant.
    pub fn with_base_time(mut self, base_time: chrono::NaiveDateTime) -> Self {
        self.resolver.set_base_time(base_time);
        self
    }

    pub fn resolver(&self) -> &FieldResolver {
        &self.resolver
    }

    /// Access to the resolver, e.g. to register custom scalar generators.
    pub fn resolver_mut(&mut self) -> &mut FieldResolver {
        &mut self.resolver
    }

    /// Generate `options.count` records for `model`.
    ///
    /// Relation fields are filled from `options.relation_data`; a relation
    /// with no candidates is left `null` (or an empty array).
    pub fn generate_mock_data(&mut self, model: &Model, options: &GenerationOptions) -> GeneratedData {
        let mut tracker = UniqueTracker::new();
        let fk_fields = model.foreign_key_fields();

        for field in &model.fields {
            if field.is_scalar && field.is_unique && !field.is_id && !fk_fields.contains(&field.name.as_str()) {
                tracker.register_constraint(&model.name, std::slice::from_ref(&field.name));
            }
        }
        let composites: Vec<&Vec<String>> = model
            .model_level_uniques
            .iter()
            .filter(|set| set.iter().all(|f| !fk_fields.contains(&f.as_str())))
            // A one-field set on a unique field is already tracked per value.
            .filter(|set| !(set.len() == 1 && model.field(&set[0]).is_some_and(|f| f.is_unique)))
            .collect();
        for set in &composites {
            tracker.register_constraint(&model.name, set);
        }

        let mut records: Vec<Record> = Vec::with_capacity(options.count);
        for record_index in 0..options.count {
            let record = self.generate_record(model, record_index, options, &records, &composites, &mut tracker);
            records.push(record);
        }

        for field in model.relation_fields() {
            if options.is_deferred(&field.name) {
                continue;
            }
            let pool = candidate_pool(field, options);
            self.assign_relation(model, field, &mut records, &pool, options, 1.0, false);
        }

        let mut data = GeneratedData {
            records,
            join_table_records: IndexMap::new(),
        };

        strip_unembedded(model, &mut data.records, options.sql_mode);
        if options.sql_mode {
            make_sql_safe(&mut data.records, &fk_fields);
            for field in model.relation_fields().filter(|f| is_join_relation(f)) {
                let pool = if options.is_deferred(&field.name) {
                    CandidatePool::default()
                } else {
                    candidate_pool(field, options)
                };
                self.append_join_rows(model, field, &mut data, &pool, 1.0);
            }
        }

        debug!(
            "Generated {} records for {} ({} join tables)",
            data.records.len(),
            model.name,
            data.join_table_records.len()
        );
        data
    }

    /// Second pass for a deferred relation field: assign it on existing
    /// records once the referenced ids exist. Only roughly a `coverage`
    /// fraction of records is touched. Returns the number of records (or join
    /// rows) that received a reference.
    pub fn backfill_relation(
        &mut self,
        model: &Model,
        field_name: &str,
        data: &mut GeneratedData,
        candidates: &[RelationItem],
        options: &GenerationOptions,
        coverage: f64,
    ) -> usize {
        let Some(field) = model.field(field_name).filter(|f| f.is_relation) else {
            warn!("{}.{} is not a relation field, nothing to backfill", model.name, field_name);
            return 0;
        };
        let pool = CandidatePool::from_items(candidates, reference_key(field));
        let coverage = coverage.clamp(0.0, 1.0);

        if options.sql_mode && is_join_relation(field) {
            return self.append_join_rows(model, field, data, &pool, coverage);
        }
        if options.sql_mode && !field.carries_foreign_key() {
            return 0;
        }
        self.assign_relation(model, field, &mut data.records, &pool, options, coverage, options.sql_mode)
    }

    /// Generate a single record, retrying the whole record when a
    /// model-level unique set collides.
    fn generate_record(
        &mut self,
        model: &Model,
        record_index: usize,
        options: &GenerationOptions,
        existing: &[Record],
        composites: &[&Vec<String>],
        tracker: &mut UniqueTracker,
    ) -> Record {
        let id_name = model.id_field().map(|f| f.name.as_str());
        let fk_fields = model.foreign_key_fields();
        // Single-field uniques a candidate commits to the tracker while it is
        // resolved; a rejected candidate gives them back.
        let committed: Vec<&String> = model
            .fields
            .iter()
            .filter(|f| {
                f.is_scalar
                    && f.is_unique
                    && !f.is_relation
                    && Some(f.name.as_str()) != id_name
                    && !fk_fields.contains(&f.name.as_str())
                    && !options.custom_fields.contains_key(&f.name)
            })
            .map(|f| &f.name)
            .collect();

        let mut attempts = 0;
        loop {
            let record = self.generate_record_candidate(model, record_index, options, existing, tracker);

            let collision = composites.iter().any(|fields| {
                set_values(&record, fields)
                    .is_some_and(|values| tracker.contains(&model.name, fields, &values))
            });
            if !collision {
                for fields in composites {
                    if let Some(values) = set_values(&record, fields) {
                        tracker.try_insert(&model.name, fields, &values);
                    }
                }
                return record;
            }

            attempts += 1;
            if attempts >= MAX_RECORD_RETRIES {
                warn!(
                    "Model-level unique on {} still colliding at record {} after {} attempts, keeping duplicate",
                    model.name, record_index, MAX_RECORD_RETRIES
                );
                return record;
            }

            for name in &committed {
                if let Some(value) = record.get(*name).filter(|v| !v.is_null()) {
                    tracker.remove(&model.name, std::slice::from_ref(*name), &[value]);
                }
            }
        }
    }

    fn generate_record_candidate(
        &mut self,
        model: &Model,
        record_index: usize,
        options: &GenerationOptions,
        existing: &[Record],
        tracker: &mut UniqueTracker,
    ) -> Record {
        let id_name = model.id_field().map(|f| f.name.as_str());
        let fk_fields = model.foreign_key_fields();
        let mut record = Record::new();

        for field in &model.fields {
            let value = if field.is_relation {
                relation_placeholder(field)
            } else if let Some(custom) = options.custom_fields.get(&field.name) {
                custom.resolve(record_index, &mut self.rng)
            } else if Some(field.name.as_str()) == id_name {
                self.resolver.generate_id(field, record_index, &mut self.rng)
            } else if fk_fields.contains(&field.name.as_str()) {
                // Filled by the relation pass.
                Value::Null
            } else if field.is_scalar {
                self.resolve_scalar(model, field, record_index, &record, existing, tracker)
            } else {
                Value::Null
            };
            record.insert(field.name.clone(), value);
        }

        record
    }

    /// Resolve a scalar field, regenerating unique fields on collision.
    fn resolve_scalar(
        &mut self,
        model: &Model,
        field: &Field,
        record_index: usize,
        record: &Record,
        existing: &[Record],
        tracker: &mut UniqueTracker,
    ) -> Value {
        let ctx = GenerationContext::new(&model.name, record_index, record).with_existing(existing);
        let mut value = self.resolver.resolve(field, &ctx, &mut self.rng);
        if !field.is_unique {
            return value;
        }

        let mut attempts = 0;
        while !value.is_null() && !tracker.try_insert_single(&model.name, &field.name, &value) {
            attempts += 1;
            if attempts >= tracker.max_retries {
                warn!(
                    "Could not find a unique value for {}.{} at record {} after {} attempts",
                    model.name, field.name, record_index, tracker.max_retries
                );
                return Value::Null;
            }
            value = self.resolver.resolve(field, &ctx, &mut self.rng);
        }
        value
    }

    /// Fill one relation field across `records`. Returns how many records
    /// received a non-null reference. `sql_null` writes a missing id as the
    /// NULL marker, for records that already went through the flattened-output
    /// pass.
    #[allow(clippy::too_many_arguments)]
    fn assign_relation(
        &mut self,
        model: &Model,
        field: &Field,
        records: &mut [Record],
        pool: &CandidatePool,
        options: &GenerationOptions,
        coverage: f64,
        sql_null: bool,
    ) -> usize {
        let mut assigned = 0;

        if let Some(carriers) = field.relation_from_fields.as_ref().filter(|f| !f.is_empty()) {
            let carrier = &carriers[0];
            let mut unique_pool = model
                .is_unique_key(carriers)
                .then(|| pool.unique_pool(&mut self.rng));

            for record in records.iter_mut() {
                if !self.covers(coverage) {
                    continue;
                }
                let id = match unique_pool.as_mut() {
                    Some(unique) => unique.draw(),
                    None => pool.pick(&mut self.rng),
                };
                if id.is_some() {
                    assigned += 1;
                }
                let value = id.unwrap_or(Value::Null);
                record.insert(carrier.clone(), emit(value, sql_null));
            }
            if unique_pool.is_some_and(|p| p.remaining() == 0) && records.len() > pool.len() {
                debug!(
                    "Unique reference pool for {}.{} exhausted: {} records, {} ids",
                    model.name,
                    field.name,
                    records.len(),
                    pool.len()
                );
            }
            return assigned;
        }

        // Embedded relations are not written in flattened output.
        if options.sql_mode {
            return 0;
        }

        if field.is_array {
            let range = options
                .preset
                .and_then(|preset| preset.range_for(&model.name, &field.name));
            for record in records.iter_mut() {
                if !self.covers(coverage) {
                    continue;
                }
                let wanted = match &range {
                    Some(range) => self.rng.random_range(range.clone()),
                    None => self.rng.random_range(0..=DEFAULT_MAX_LINKS),
                };
                let ids = pool.sample(wanted, &mut self.rng);
                if !ids.is_empty() {
                    assigned += 1;
                }
                record.insert(field.name.clone(), Value::Array(ids));
            }
        } else {
            for record in records.iter_mut() {
                if !self.covers(coverage) {
                    continue;
                }
                let id = pool.pick(&mut self.rng);
                if id.is_some() {
                    assigned += 1;
                }
                record.insert(field.name.clone(), id.unwrap_or(Value::Null));
            }
        }
        assigned
    }

    /// Append `_{Model}To{Field}` rows: zero to two distinct links per record.
    fn append_join_rows(
        &mut self,
        model: &Model,
        field: &Field,
        data: &mut GeneratedData,
        pool: &CandidatePool,
        coverage: f64,
    ) -> usize {
        let table = join_table_name(&model.name, &field.name);
        let id_name = model.id_field().map(|f| f.name.clone());
        let mut rows = Vec::new();

        for record in &data.records {
            if !self.covers(coverage) {
                continue;
            }
            let owner = id_name
                .as_ref()
                .and_then(|name| record.get(name))
                .cloned()
                .unwrap_or(Value::Null);
            let wanted = self.rng.random_range(0..=DEFAULT_MAX_LINKS);
            for related in pool.sample(wanted, &mut self.rng) {
                rows.push(JoinRow {
                    a: owner.clone(),
                    b: related,
                });
            }
        }

        let added = rows.len();
        data.join_table_records.entry(table).or_default().extend(rows);
        added
    }

    fn covers(&mut self, coverage: f64) -> bool {
        coverage >= 1.0 || (coverage > 0.0 && self.rng.random_bool(coverage))
    }
}

/// Name of the join table holding a many-to-many relation in flattened output.
pub fn join_table_name(model: &str, field: &str) -> String {
    format!("_{}To{}", model, capitalize(field))
}

/// Candidates for a relation field: looked up by field name, then relation
/// name, then target model name.
fn candidate_pool(field: &Field, options: &GenerationOptions) -> CandidatePool {
    let data = &options.relation_data;
    data.get(&field.name)
        .or_else(|| field.relation_name.as_ref().and_then(|name| data.get(name)))
        .or_else(|| field.target_model().and_then(|target| data.get(target)))
        .map(|items| CandidatePool::from_items(items, reference_key(field)))
        .unwrap_or_default()
}

fn relation_placeholder(field: &Field) -> Value {
    if field.is_array && !field.carries_foreign_key() {
        Value::Array(Vec::new())
    } else {
        Value::Null
    }
}

fn is_join_relation(field: &Field) -> bool {
    field.is_relation && field.is_array && !field.carries_foreign_key()
}

/// Drop relation fields that are not embedded: foreign-key relations (their
/// carrier fields hold the id) and, in SQL mode, every embedded relation.
fn strip_unembedded(model: &Model, records: &mut [Record], sql_mode: bool) {
    let dropped: Vec<&str> = model
        .relation_fields()
        .filter(|field| match &field.relation_from_fields {
            Some(carriers) if !carriers.is_empty() => !carriers.contains(&field.name),
            _ => sql_mode,
        })
        .map(|field| field.name.as_str())
        .collect();
    if dropped.is_empty() {
        return;
    }
    for record in records {
        for name in &dropped {
            record.shift_remove(*name);
        }
    }
}

/// Values of a model-level unique set, when the record has all of them.
fn set_values<'r>(record: &'r Record, fields: &[String]) -> Option<Vec<&'r Value>> {
    let values: Vec<&Value> = fields.iter().filter_map(|f| record.get(f)).collect();
    (values.len() == fields.len()).then_some(values)
}

/// Convert records for flattened output. Foreign-key carriers hold ids taken
/// from records that were converted when their own model was generated, so
/// only their nulls are touched.
fn make_sql_safe(records: &mut [Record], carriers: &[&str]) {
    for record in records {
        for (name, value) in record.iter_mut() {
            if value.is_null() || !carriers.contains(&name.as_str()) {
                *value = value.to_sql_safe();
            }
        }
    }
}

/// Candidate ids are written as they are; only a missing one may become the
/// NULL marker.
fn emit(value: Value, sql_null: bool) -> Value {
    if sql_null && value.is_null() {
        value.to_sql_safe()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::options::CustomField;
    use crate::generate::preset::Preset;
    use std::collections::HashSet;

    fn generator() -> MockDataGenerator {
        MockDataGenerator::new(Some(42)).with_base_time(
            chrono::NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        )
    }

    fn user_model() -> Model {
        Model::new("User")
            .with_field(Field::scalar("id", "Int").id())
            .with_field(Field::scalar("email", "String").unique())
            .with_field(Field::scalar("name", "String"))
            .with_field(Field::relation("posts", "Post").array())
    }

    fn post_model() -> Model {
        Model::new("Post")
            .with_field(Field::scalar("id", "String").id())
            .with_field(Field::scalar("authorId", "Int").unique())
            .with_field(
                Field::relation("author", "User")
                    .from_fields(&["authorId"])
                    .named("posts"),
            )
    }

    fn user_ids(n: i64) -> Vec<RelationItem> {
        (1..=n).map(|i| RelationItem::Id(Value::Int(i))).collect()
    }

    #[test]
    fn test_default_count_and_ids() {
        let data = generator().generate_mock_data(&user_model(), &GenerationOptions::default());
        assert_eq!(data.records.len(), 10);
        let ids: Vec<i64> = data.records.iter().filter_map(|r| r["id"].as_int()).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
        assert!(data.join_table_records.is_empty());
    }

    #[test]
    fn test_unique_scalar_does_not_repeat() {
        let options = GenerationOptions::new().with_count(50);
        let data = generator().generate_mock_data(&user_model(), &options);
        let emails: HashSet<String> = data
            .records
            .iter()
            .map(|r| r["email"].to_unique_key())
            .collect();
        assert_eq!(emails.len(), 50);
    }

    #[test]
    fn test_unique_foreign_key_is_permutation() {
        let options = GenerationOptions::new()
            .with_count(5)
            .with_relation_data("posts", user_ids(5));
        let data = generator().generate_mock_data(&post_model(), &options);

        let mut author_ids: Vec<i64> = data
            .records
            .iter()
            .filter_map(|r| r["authorId"].as_int())
            .collect();
        author_ids.sort();
        assert_eq!(author_ids, vec![1, 2, 3, 4, 5]);
        // The relation itself is carried by authorId, not embedded.
        assert!(data.records.iter().all(|r| !r.contains_key("author")));
    }

    #[test]
    fn test_unique_foreign_key_exhaustion_yields_null() {
        let options = GenerationOptions::new()
            .with_count(8)
            .with_relation_data("User", user_ids(3));
        let data = generator().generate_mock_data(&post_model(), &options);
        let nulls = data.records.iter().filter(|r| r["authorId"].is_null()).count();
        assert_eq!(nulls, 5);
    }

    #[test]
    fn test_non_unique_foreign_key_draws_with_replacement() {
        let model = Model::new("Comment")
            .with_field(Field::scalar("id", "Int").id())
            .with_field(Field::scalar("postId", "Int"))
            .with_field(Field::relation("post", "Post").from_fields(&["postId"]));
        let options = GenerationOptions::new()
            .with_count(20)
            .with_relation_data("post", vec![RelationItem::Id(Value::Int(7))]);
        let data = generator().generate_mock_data(&model, &options);
        assert!(data.records.iter().all(|r| r["postId"] == Value::Int(7)));
    }

    #[test]
    fn test_missing_candidates_leave_null_and_empty() {
        let data = generator().generate_mock_data(&post_model(), &GenerationOptions::new().with_count(3));
        assert!(data.records.iter().all(|r| r["authorId"].is_null()));

        let data = generator().generate_mock_data(&user_model(), &GenerationOptions::new().with_count(3));
        assert!(data
            .records
            .iter()
            .all(|r| r["posts"].as_array().is_some_and(|a| a.is_empty())));
    }

    #[test]
    fn test_embedded_array_capped_by_distinct_ids() {
        let options = GenerationOptions::new()
            .with_count(30)
            .with_relation_data("posts", vec![RelationItem::Id(Value::Int(1))]);
        let data = generator().generate_mock_data(&user_model(), &options);
        for record in &data.records {
            let posts = record["posts"].as_array().unwrap();
            assert!(posts.len() <= 1);
        }
    }

    #[test]
    fn test_preset_range_applies() {
        let ids: Vec<RelationItem> = (1..=20).map(|i| RelationItem::Id(Value::Int(i))).collect();
        let options = GenerationOptions::new()
            .with_count(30)
            .with_preset(Preset::Blog)
            .with_relation_data("posts", ids);
        let data = generator().generate_mock_data(&user_model(), &options);
        for record in &data.records {
            let len = record["posts"].as_array().unwrap().len();
            assert!((1..=5).contains(&len), "blog preset gives User.posts 1..=5, got {}", len);
        }
    }

    #[test]
    fn test_custom_field_overrides_resolver() {
        let options = GenerationOptions::new()
            .with_count(3)
            .with_custom_field("name", CustomField::from_fn(|i| Value::owned(format!("user-{}", i))));
        let data = generator().generate_mock_data(&user_model(), &options);
        assert_eq!(data.records[2]["name"], Value::from("user-2"));
    }

    #[test]
    fn test_sql_mode_join_tables() {
        let ids: Vec<RelationItem> = (1..=4).map(|i| RelationItem::Id(Value::Int(i))).collect();
        let options = GenerationOptions::new()
            .with_count(10)
            .with_sql_mode(true)
            .with_relation_data("posts", ids);
        let data = generator().generate_mock_data(&user_model(), &options);

        assert!(data.records.iter().all(|r| !r.contains_key("posts")));
        let rows = &data.join_table_records["_UserToPosts"];
        for row in rows {
            assert!(matches!(row.a, Value::Int(1..=10)));
            assert!(matches!(row.b, Value::Int(1..=4)));
        }
    }

    #[test]
    fn test_sql_mode_escapes_values() {
        let options = GenerationOptions::new()
            .with_count(2)
            .with_sql_mode(true)
            .with_custom_field("name", CustomField::Literal(Value::from("O'Brien")));
        let data = generator().generate_mock_data(&user_model(), &options);
        assert_eq!(data.records[0]["name"], Value::from("O''Brien"));
    }

    #[test]
    fn test_sql_mode_keeps_converted_reference_ids() {
        let model = Model::new("Note")
            .with_field(Field::scalar("id", "Int").id())
            .with_field(Field::scalar("ownerHandle", "String"))
            .with_field(
                Field::relation("owner", "Account")
                    .from_fields(&["ownerHandle"])
                    .references(&["handle"]),
            );
        let handles = vec![RelationItem::Id(Value::from("o''neil0"))];
        let options = GenerationOptions::new()
            .with_count(3)
            .with_sql_mode(true)
            .with_relation_data("owner", handles);
        let data = generator().generate_mock_data(&model, &options);

        for record in &data.records {
            assert_eq!(record["ownerHandle"], Value::from("o''neil0"));
        }
    }

    #[test]
    fn test_deferred_field_then_backfill() {
        let model = post_model();
        let options = GenerationOptions::new()
            .with_count(4)
            .with_relation_data("User", user_ids(4))
            .with_deferred_field("author");
        let mut generator = generator();
        let mut data = generator.generate_mock_data(&model, &options);
        assert!(data.records.iter().all(|r| r["authorId"].is_null()));

        let assigned = generator.backfill_relation(&model, "author", &mut data, &user_ids(4), &options, 1.0);
        assert_eq!(assigned, 4);
        assert!(data.records.iter().all(|r| r["authorId"].as_int().is_some()));
    }

    #[test]
    fn test_backfill_zero_coverage_touches_nothing() {
        let model = post_model();
        let mut generator = generator();
        let mut data = generator.generate_mock_data(
            &model,
            &GenerationOptions::new().with_count(4).with_deferred_field("author"),
        );
        let assigned = generator.backfill_relation(
            &model,
            "author",
            &mut data,
            &user_ids(4),
            &GenerationOptions::default(),
            0.0,
        );
        assert_eq!(assigned, 0);
    }

    #[test]
    fn test_model_level_unique_set() {
        let mut model = Model::new("Flag")
            .with_field(Field::scalar("id", "Int").id())
            .with_field(Field::scalar("enabled", "Boolean"))
            .with_field(Field::scalar("archived", "Boolean"));
        model.model_level_uniques = vec![vec!["enabled".into(), "archived".into()]];
        let data = generator().generate_mock_data(&model, &GenerationOptions::new().with_count(4));

        let combos: HashSet<String> = data
            .records
            .iter()
            .map(|r| format!("{}|{}", r["enabled"], r["archived"]))
            .collect();
        assert_eq!(combos.len(), 4);
    }

    #[test]
    fn test_rejected_record_releases_unique_values() {
        let mut model = Model::new("Flag")
            .with_field(Field::scalar("id", "Int").id())
            .with_field(Field::scalar("code", "String").unique().with_enum(&["x", "y"]))
            .with_field(Field::scalar("a", "Boolean"))
            .with_field(Field::scalar("b", "Boolean"));
        model.model_level_uniques = vec![vec!["a".into(), "b".into()]];

        for seed in 0..100 {
            let mut generator = MockDataGenerator::new(Some(seed));
            let data = generator.generate_mock_data(&model, &GenerationOptions::new().with_count(2));
            let codes: HashSet<String> = data
                .records
                .iter()
                .filter(|r| !r["code"].is_null())
                .map(|r| r["code"].to_unique_key())
                .collect();
            assert_eq!(codes.len(), 2, "seed {}", seed);
        }
    }

    #[test]
    fn test_seeded_runs_reproduce() {
        let options = GenerationOptions::new().with_count(5);
        let a = generator().generate_mock_data(&user_model(), &options);
        let b = generator().generate_mock_data(&user_model(), &options);
        assert_eq!(a.records, b.records);
    }

    #[test]
    fn test_join_table_name() {
        assert_eq!(join_table_name("Post", "tags"), "_PostToTags");
    }
}
