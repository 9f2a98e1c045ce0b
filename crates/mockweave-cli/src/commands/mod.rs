pub mod detect;
pub mod generate;
pub mod graph;

use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use mockweave_core::config::{read_config, MockWeaveConfig};
use mockweave_core::schema::load::load_models;
use mockweave_core::schema::types::ModelMap;

/// Load the model map and the optional config next to it, logging config
/// entries that name models or fields the map lacks.
pub(crate) fn load_inputs(
    models_path: &Path,
    config_dir: &Path,
) -> Result<(ModelMap, Option<MockWeaveConfig>)> {
    let config = read_config(config_dir)
        .with_context(|| format!("Failed to load config from {}", config_dir.display()))?;
    let models = load_models(models_path)
        .with_context(|| format!("Failed to load models from {}", models_path.display()))?;

    if let Some(cfg) = &config {
        for warning in cfg.validate_against_models(&models) {
            tracing::warn!("{}", warning);
        }
    }
    Ok((models, config))
}

pub(crate) fn spinner(prefix: &'static str, message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} [{prefix}] {msg}")?);
    pb.set_prefix(prefix);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(pb)
}
