//! # Configuration File Parser
//!
//! Reads and parses `mockweave.toml`, the optional user configuration file
//! that customizes generation without CLI flags. Supports:
//!
//! - `[generate]` — default record count, seed, SQL mode, preset
//! - `[models.<Name>]` — per-model count overrides
//! - `[fields."<Model>.<field>"]` — fixed values with optional weights
//! - `[detect]` — relation detector switches and confidence threshold
//! - `[graph]` — cycle resolution strategy
//!
//! Example `mockweave.toml`:
//!
//! ```toml
//! [generate]
//! count = 25
//! seed = 42
//! preset = "blog"
//!
//! [models.Comment]
//! count = 100
//!
//! [fields."User.role"]
//! values = ["admin", "editor", "viewer"]
//! weights = [0.1, 0.3, 0.6]
//!
//! [detect]
//! enable_inference = false
//! confidence_threshold = 0.7
//!
//! [graph]
//! strategy = "partial-references"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::detect::DetectorOptions;
use crate::error::{MockWeaveError, Result};
use crate::generate::options::CustomField;
use crate::generate::pipeline::PipelineOptions;
use crate::generate::preset::Preset;
use crate::generate::value::Value;
use crate::graph::resolve::ResolutionStrategy;
use crate::schema::types::ModelMap;

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "mockweave.toml";

/// Top-level mockweave.toml structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MockWeaveConfig {
    pub generate: GenerateConfig,
    /// Per-model overrides, keyed by model name.
    pub models: BTreeMap<String, ModelConfig>,
    /// Per-field overrides, keyed by "Model.field".
    pub fields: BTreeMap<String, FieldConfig>,
    pub detect: DetectorOptions,
    pub graph: GraphConfig,
}

/// Default generation settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Default number of records per model.
    pub count: Option<usize>,
    /// Fixed random seed for reproducible output.
    pub seed: Option<u64>,
    pub sql_mode: Option<bool>,
    pub preset: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub count: Option<usize>,
}

/// Per-field configuration override.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Fixed list of values to pick from.
    pub values: Option<Vec<serde_json::Value>>,
    /// Weights for each value (must be same length as `values`).
    pub weights: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// One of `smart-break`, `lazy-loading`, `partial-references`.
    pub strategy: Option<String>,
}

/// Read and parse a mockweave.toml file from the given directory.
///
/// Returns `None` if the file doesn't exist (config is optional).
/// Returns an error if the file exists but can't be parsed or validated.
pub fn read_config(dir: &Path) -> Result<Option<MockWeaveConfig>> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path).map_err(|e| MockWeaveError::Config {
        message: format!("Failed to read {}: {}", path.display(), e),
    })?;

    let config: MockWeaveConfig = toml::from_str(&content).map_err(|e| MockWeaveError::Config {
        message: format!("Failed to parse {}: {}", path.display(), e),
    })?;

    config.validate()?;
    tracing::debug!("Loaded {}", path.display());

    Ok(Some(config))
}

impl MockWeaveConfig {
    /// Per-model count overrides from the [models] section.
    pub fn model_count_overrides(&self) -> IndexMap<String, usize> {
        self.models
            .iter()
            .filter_map(|(name, mc)| mc.count.map(|count| (name.clone(), count)))
            .collect()
    }

    pub fn strategy(&self) -> Result<ResolutionStrategy> {
        match &self.graph.strategy {
            Some(name) => name.parse(),
            None => Ok(ResolutionStrategy::default()),
        }
    }

    pub fn preset(&self) -> Result<Option<Preset>> {
        self.generate
            .preset
            .as_deref()
            .map(str::parse)
            .transpose()
    }

    /// Field overrides as generator custom fields, keyed by "Model.field".
    pub fn custom_fields(&self) -> IndexMap<String, CustomField> {
        self.fields
            .iter()
            .filter_map(|(key, fc)| {
                let values: Vec<Value> = fc.values.as_ref()?.iter().map(Value::from_json).collect();
                Some((
                    key.clone(),
                    CustomField::Weighted {
                        values,
                        weights: fc.weights.clone(),
                    },
                ))
            })
            .collect()
    }

    /// Validate semantic constraints that serde cannot enforce.
    ///
    /// Catches configuration mistakes (mismatched `values`/`weights`, unknown
    /// strategy or preset names, thresholds outside 0..=1) before any
    /// generation runs.
    pub fn validate(&self) -> Result<()> {
        for (key, field_cfg) in &self.fields {
            if key.split_once('.').is_none() {
                return Err(MockWeaveError::Config {
                    message: format!("Field '{}' is not in 'Model.field' format", key),
                });
            }
            if let Some(ref weights) = field_cfg.weights {
                match field_cfg.values {
                    Some(ref values) => {
                        if values.len() != weights.len() {
                            return Err(MockWeaveError::Config {
                                message: format!(
                                    "Field '{}': weights has {} entries but values has {} entries. \
                                     They must be the same length.",
                                    key,
                                    weights.len(),
                                    values.len(),
                                ),
                            });
                        }
                    }
                    None => {
                        return Err(MockWeaveError::Config {
                            message: format!(
                                "Field '{}': weights provided without values. \
                                 Add a matching values list or remove the weights.",
                                key,
                            ),
                        });
                    }
                }
            }
        }

        let threshold = self.detect.confidence_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(MockWeaveError::Config {
                message: format!(
                    "detect.confidence_threshold must be between 0 and 1, got {}",
                    threshold
                ),
            });
        }

        self.strategy()?;
        self.preset()?;
        Ok(())
    }

    /// Check overrides against the loaded model map.
    ///
    /// Returns a warning per override that names a model or field the map
    /// does not have, so stale config entries are caught early.
    pub fn validate_against_models(&self, models: &ModelMap) -> Vec<String> {
        let mut warnings = Vec::new();
        for name in self.models.keys() {
            if !models.contains(name) {
                warnings.push(format!(
                    "mockweave.toml: [models.{}] does not match any model",
                    name
                ));
            }
        }
        for key in self.fields.keys() {
            let Some((model, field)) = key.split_once('.') else {
                continue;
            };
            match models.get(model) {
                Some(m) if m.field(field).is_none() => warnings.push(format!(
                    "mockweave.toml: [fields.\"{}\"] references field '{}' \
                     which does not exist on model '{}'",
                    key, field, model
                )),
                None => warnings.push(format!(
                    "mockweave.toml: [fields.\"{}\"] references model '{}' \
                     which does not exist",
                    key, model
                )),
                _ => {}
            }
        }
        warnings
    }

    /// Pipeline options from the file alone; callers layer CLI flags on top.
    pub fn to_pipeline_options(&self) -> Result<PipelineOptions> {
        let mut options = PipelineOptions {
            model_counts: self.model_count_overrides(),
            seed: self.generate.seed,
            sql_mode: self.generate.sql_mode.unwrap_or(false),
            preset: self.preset()?,
            strategy: self.strategy()?,
            detector: self.detect.clone(),
            custom_fields: self.custom_fields(),
            ..Default::default()
        };
        if let Some(count) = self.generate.count {
            options.default_count = count;
        }
        Ok(options)
    }
}
