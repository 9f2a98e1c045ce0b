//! # Pipeline
//!
//! Runs the whole synthesis for a model map: detect implicit relations,
//! resolve the generation order, then generate each model with the finished
//! records of its dependencies as relation candidates. Models that own a
//! backfilled break point are visited twice; the second visit fills the
//! deferred relation fields in place.

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::detect::{DetectorOptions, Relation, RelationDetector};
use crate::error::{MockWeaveError, Result};
use crate::generate::engine::{GeneratedData, MockDataGenerator};
use crate::generate::foreign_key::{id_items, reference_key};
use crate::generate::options::{CustomField, GenerationOptions, DEFAULT_COUNT};
use crate::generate::preset::Preset;
use crate::graph::resolve::{CircularDependencyResolver, DependencyResolution, ResolutionStrategy};
use crate::schema::types::ModelMap;

/// Progress callback: model name, steps done, total steps.
pub type ProgressFn<'a> = &'a dyn Fn(&str, usize, usize);

/// Everything a full run needs besides the model map.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub default_count: usize,
    pub model_counts: IndexMap<String, usize>,
    pub seed: Option<u64>,
    pub sql_mode: bool,
    pub preset: Option<Preset>,
    pub strategy: ResolutionStrategy,
    pub detector: DetectorOptions,
    /// Overrides keyed by `Model.field`.
    pub custom_fields: IndexMap<String, CustomField>,
    /// Anchor for temporal values; the current time when unset.
    pub base_time: Option<NaiveDateTime>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            default_count: DEFAULT_COUNT,
            model_counts: IndexMap::new(),
            seed: None,
            sql_mode: false,
            preset: None,
            strategy: ResolutionStrategy::default(),
            detector: DetectorOptions::default(),
            custom_fields: IndexMap::new(),
            base_time: None,
        }
    }
}

impl PipelineOptions {
    pub fn count_for(&self, model: &str) -> usize {
        self.model_counts
            .get(model)
            .copied()
            .unwrap_or(self.default_count)
    }

    /// Custom fields of one model, keyed by bare field name.
    pub fn custom_fields_for(&self, model: &str) -> IndexMap<String, CustomField> {
        self.custom_fields
            .iter()
            .filter_map(|(key, custom)| {
                let (m, field) = key.split_once('.')?;
                (m == model).then(|| (field.to_string(), custom.clone()))
            })
            .collect()
    }

    /// Reject overrides that name models or fields the map does not have.
    pub fn check_against(&self, models: &ModelMap) -> Result<()> {
        for name in self.model_counts.keys() {
            if !models.contains(name) {
                return Err(MockWeaveError::Config {
                    message: format!("count override for unknown model '{}'", name),
                });
            }
        }
        for key in self.custom_fields.keys() {
            let known = key
                .split_once('.')
                .and_then(|(m, f)| models.get(m)?.field(f))
                .is_some();
            if !known {
                return Err(MockWeaveError::Config {
                    message: format!(
                        "custom values for '{}' do not match any Model.field in the schema",
                        key
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Result of a full run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutput {
    /// Detected relations; empty when the schema declared its own.
    pub relations: Vec<Relation>,
    pub resolution: DependencyResolution,
    /// Generated data per model, in generation order.
    pub data: IndexMap<String, GeneratedData>,
}

impl PipelineOutput {
    pub fn total_records(&self) -> usize {
        self.data.values().map(|d| d.records.len()).sum()
    }
}

/// Detect implicit relations, if the map has none of its own, and mark them
/// on a copy of the map.
pub fn prepare_models(models: &ModelMap, detector: &DetectorOptions) -> (ModelMap, Vec<Relation>) {
    let mut models = models.clone();
    if models.has_explicit_relations() {
        return (models, Vec::new());
    }
    let relations = RelationDetector::new(detector.clone()).detect_relations(&models);
    info!("Detected {} implicit relations", relations.len());
    models.apply_relations(&relations);
    (models, relations)
}

pub fn run_pipeline(
    models: &ModelMap,
    options: &PipelineOptions,
    progress: Option<ProgressFn<'_>>,
) -> Result<PipelineOutput> {
    options.check_against(models)?;

    let (models, relations) = prepare_models(models, &options.detector);
    let resolution = CircularDependencyResolver::with_strategy(options.strategy)
        .resolve_with_relations(&models, &relations);
    if resolution.has_cycles() {
        info!(
            "Resolved {} cycles, generation order: {}",
            resolution.cycles.len(),
            resolution.generation_order.join(" -> ")
        );
    }

    let mut generator = MockDataGenerator::new(options.seed);
    if let Some(base_time) = options.base_time {
        generator = generator.with_base_time(base_time);
    }

    let plan = resolution.resolution_plan.as_ref();
    let total = resolution.generation_order.len();
    let mut data: IndexMap<String, GeneratedData> = IndexMap::new();

    for (step, model_name) in resolution.generation_order.iter().enumerate() {
        let Some(model) = models.get(model_name) else {
            warn!("Generation order names unknown model {}", model_name);
            continue;
        };

        let mut gen_options = GenerationOptions::new()
            .with_count(options.count_for(model_name))
            .with_sql_mode(options.sql_mode);
        gen_options.preset = options.preset;
        gen_options.custom_fields = options.custom_fields_for(model_name);

        if !data.contains_key(model_name) {
            for field in model.relation_fields() {
                if plan.is_some_and(|p| p.is_break_field(model_name, &field.name)) {
                    gen_options = gen_options.with_deferred_field(field.name.clone());
                    continue;
                }
                let Some(target) = field.target_model() else {
                    continue;
                };
                if let Some(upstream) = data.get(target) {
                    gen_options = gen_options.with_relation_data(
                        field.name.clone(),
                        id_items(&upstream.records, reference_key(field)),
                    );
                }
            }
            let generated = generator.generate_mock_data(model, &gen_options);
            data.insert(model_name.clone(), generated);
        } else if let Some(plan) = plan {
            for bp in plan.backfills_for(model_name) {
                let coverage = plan.backfill_coverage(bp);
                for field_name in &bp.fields {
                    let Some(field) = model.field(field_name) else {
                        continue;
                    };
                    let candidates = data
                        .get(&bp.to)
                        .map(|d| id_items(&d.records, reference_key(field)))
                        .unwrap_or_default();
                    if let Some(own) = data.get_mut(model_name) {
                        let filled = generator.backfill_relation(
                            model,
                            field_name,
                            own,
                            &candidates,
                            &gen_options,
                            coverage,
                        );
                        debug!(
                            "Backfilled {}.{} -> {} on {} records",
                            model_name, field_name, bp.to, filled
                        );
                    }
                }
            }
        }

        if let Some(cb) = progress {
            cb(model_name, step + 1, total);
        }
    }

    Ok(PipelineOutput {
        relations,
        resolution,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::value::Value;
    use crate::schema::types::{Field, Model};

    fn fixed_time() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn options(count: usize) -> PipelineOptions {
        PipelineOptions {
            default_count: count,
            seed: Some(7),
            base_time: Some(fixed_time()),
            ..Default::default()
        }
    }

    fn user_post() -> ModelMap {
        let mut models = ModelMap::new();
        models.insert(
            Model::new("Post")
                .with_field(Field::scalar("id", "Int").id())
                .with_field(Field::scalar("title", "String"))
                .with_field(Field::scalar("authorId", "Int"))
                .with_field(Field::relation("author", "User").from_fields(&["authorId"])),
        );
        models.insert(
            Model::new("User")
                .with_field(Field::scalar("id", "Int").id())
                .with_field(Field::scalar("email", "String").unique()),
        );
        models
    }

    #[test]
    fn test_dependencies_generated_first() {
        let output = run_pipeline(&user_post(), &options(5), None).unwrap();
        assert_eq!(output.resolution.generation_order, vec!["User", "Post"]);
        assert!(output.relations.is_empty());
        for post in &output.data["Post"].records {
            let author = post["authorId"].as_int().unwrap();
            assert!((1..=5).contains(&author));
        }
    }

    #[test]
    fn test_sql_mode_references_match_escaped_keys() {
        let mut models = ModelMap::new();
        models.insert(
            Model::new("Note")
                .with_field(Field::scalar("id", "Int").id())
                .with_field(Field::scalar("ownerHandle", "String"))
                .with_field(
                    Field::relation("owner", "Account")
                        .from_fields(&["ownerHandle"])
                        .references(&["handle"]),
                ),
        );
        models.insert(
            Model::new("Account")
                .with_field(Field::scalar("id", "Int").id())
                .with_field(Field::scalar("handle", "String").unique()),
        );

        let mut opts = options(3);
        opts.sql_mode = true;
        opts.custom_fields.insert(
            "Account.handle".to_string(),
            CustomField::from_fn(|i| Value::owned(format!("o'neil{}", i))),
        );
        let output = run_pipeline(&models, &opts, None).unwrap();

        let handles: Vec<&Value> = output.data["Account"]
            .records
            .iter()
            .map(|r| &r["handle"])
            .collect();
        assert_eq!(handles[0], &Value::from("o''neil0"));
        for note in &output.data["Note"].records {
            assert!(handles.contains(&&note["ownerHandle"]));
        }
    }

    #[test]
    fn test_implicit_relations_are_detected() {
        let mut models = ModelMap::new();
        models.insert(
            Model::new("Comment")
                .with_field(Field::scalar("id", "Int").id())
                .with_field(Field::scalar("userId", "Int")),
        );
        models.insert(Model::new("User").with_field(Field::scalar("id", "Int").id()));

        let output = run_pipeline(&models, &options(3), None).unwrap();
        assert!(output.relations.iter().any(|r| r.from == "Comment" && r.to == "User"));
        assert_eq!(output.resolution.generation_order, vec!["User", "Comment"]);
        assert!(output.data["Comment"]
            .records
            .iter()
            .all(|c| c["userId"].as_int().is_some()));
    }

    #[test]
    fn test_strong_cycle_is_backfilled() {
        let mut models = ModelMap::new();
        models.insert(
            Model::new("Team")
                .with_field(Field::scalar("id", "Int").id())
                .with_field(Field::scalar("captainId", "Int"))
                .with_field(Field::relation("captain", "Player").from_fields(&["captainId"])),
        );
        models.insert(
            Model::new("Player")
                .with_field(Field::scalar("id", "Int").id())
                .with_field(Field::scalar("teamId", "Int"))
                .with_field(Field::relation("team", "Team").from_fields(&["teamId"])),
        );

        let output = run_pipeline(&models, &options(4), None).unwrap();
        assert!(output.resolution.has_cycles());
        assert_eq!(output.resolution.generation_order.len(), 3);
        for (name, key) in [("Team", "captainId"), ("Player", "teamId")] {
            assert!(
                output.data[name].records.iter().all(|r| r[key].as_int().is_some()),
                "{}.{} should be filled",
                name,
                key
            );
        }
    }

    #[test]
    fn test_lazy_loading_leaves_optional_break_empty() {
        let mut models = ModelMap::new();
        models.insert(
            Model::new("User")
                .with_field(Field::scalar("id", "Int").id())
                .with_field(Field::scalar("profileId", "Int").optional())
                .with_field(
                    Field::relation("profile", "Profile")
                        .from_fields(&["profileId"])
                        .optional(),
                ),
        );
        models.insert(
            Model::new("Profile")
                .with_field(Field::scalar("id", "Int").id())
                .with_field(Field::scalar("userId", "Int"))
                .with_field(Field::relation("user", "User").from_fields(&["userId"])),
        );
        let opts = PipelineOptions {
            strategy: ResolutionStrategy::LazyLoading,
            ..options(3)
        };

        let output = run_pipeline(&models, &opts, None).unwrap();
        assert_eq!(output.resolution.generation_order, vec!["User", "Profile"]);
        assert!(output.data["User"].records.iter().all(|r| r["profileId"].is_null()));
        assert!(output.data["Profile"]
            .records
            .iter()
            .all(|r| r["userId"].as_int().is_some()));
    }

    #[test]
    fn test_counts_and_custom_fields() {
        let mut opts = options(2);
        opts.model_counts.insert("Post".into(), 6);
        opts.custom_fields.insert(
            "Post.title".into(),
            CustomField::Literal(Value::from("Fixed title")),
        );
        let output = run_pipeline(&user_post(), &opts, None).unwrap();
        assert_eq!(output.data["User"].records.len(), 2);
        assert_eq!(output.data["Post"].records.len(), 6);
        assert!(output.data["Post"]
            .records
            .iter()
            .all(|r| r["title"] == Value::from("Fixed title")));
        assert_eq!(output.total_records(), 8);
    }

    #[test]
    fn test_unknown_override_is_config_error() {
        let mut opts = options(2);
        opts.model_counts.insert("Invoice".into(), 3);
        let err = run_pipeline(&user_post(), &opts, None).unwrap_err();
        assert!(matches!(err, MockWeaveError::Config { .. }));
    }

    #[test]
    fn test_progress_reports_every_step() {
        let steps = std::cell::RefCell::new(Vec::new());
        let cb = |name: &str, done: usize, total: usize| {
            steps.borrow_mut().push((name.to_string(), done, total));
        };
        run_pipeline(&user_post(), &options(1), Some(&cb)).unwrap();
        assert_eq!(
            steps.into_inner(),
            vec![("User".to_string(), 1, 2), ("Post".to_string(), 2, 2)]
        );
    }

    #[test]
    fn test_seeded_pipeline_reproduces() {
        let a = run_pipeline(&user_post(), &options(4), None).unwrap();
        let b = run_pipeline(&user_post(), &options(4), None).unwrap();
        assert_eq!(a.data["Post"].records, b.data["Post"].records);
    }
}
