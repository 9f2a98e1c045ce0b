use std::fs::File;
use std::io::BufWriter;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use mockweave_core::config::MockWeaveConfig;
use mockweave_core::generate::pipeline::{run_pipeline, PipelineOptions};
use mockweave_core::generate::preset::Preset;
use mockweave_core::graph::resolve::ResolutionStrategy;
use mockweave_core::output::json::write_json;

use crate::args::GenerateArgs;
use crate::commands::{load_inputs, spinner};

pub fn run(args: &GenerateArgs) -> Result<()> {
    // Phase 1: Load
    let pb = spinner("1/3", "Loading models...")?;
    let (models, config) = load_inputs(&args.models, &args.config_dir)?;
    pb.finish_with_message(format!(
        "Loading models... ✓ {} models, {} fields",
        models.len(),
        models.field_count()
    ));

    let options = build_options(args, config.as_ref())?;

    // Phase 2: Generate
    let pb2 = ProgressBar::new(models.len() as u64);
    pb2.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [2/3] Generating {msg} {bar:40.cyan/dim} {pos}/{len}")?
            .progress_chars("█▓░"),
    );

    let output = run_pipeline(
        &models,
        &options,
        Some(&|model, step, total| {
            pb2.set_length(total as u64);
            pb2.set_position(step as u64);
            pb2.set_message(model.to_string());
        }),
    )?;

    pb2.finish_with_message(format!("✓ ({} records)", output.total_records()));

    if output.resolution.has_cycles() {
        eprintln!(
            "Resolved {} circular dependencies with {}",
            output.resolution.cycles.len(),
            options.strategy
        );
    }

    // Phase 3: Output
    let pb3 = spinner("3/3", "Writing output...")?;
    match &args.output {
        Some(path) => {
            pb3.set_message(format!("Writing to {}...", path.display()));
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_json(&mut writer, &output.data)?;
            pb3.finish_with_message(format!("Writing to {}... ✓", path.display()));
            eprintln!(
                "\n✓ Generated {} records across {} models → {}",
                output.total_records(),
                output.data.len(),
                path.display()
            );
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            write_json(&mut writer, &output.data)?;
            pb3.finish_and_clear();
        }
    }

    Ok(())
}

/// Config file values first, then command-line flags on top.
pub(crate) fn build_options(
    args: &GenerateArgs,
    config: Option<&MockWeaveConfig>,
) -> Result<PipelineOptions> {
    let mut options = match config {
        Some(cfg) => cfg.to_pipeline_options()?,
        None => PipelineOptions::default(),
    };

    if let Some(count) = args.count {
        options.default_count = count;
    }
    for (model, count) in args.parse_model_counts() {
        options.model_counts.insert(model, count);
    }
    if args.seed.is_some() {
        options.seed = args.seed;
    }
    if args.sql_mode {
        options.sql_mode = true;
    }
    if let Some(name) = &args.preset {
        options.preset = Some(name.parse::<Preset>()?);
    }
    if let Some(name) = &args.strategy {
        options.strategy = name.parse::<ResolutionStrategy>()?;
    }

    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{Cli, Command};
    use clap::Parser;

    fn generate_args(extra: &[&str]) -> GenerateArgs {
        let mut argv = vec!["mockweave", "generate", "models.json"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Generate(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_flags_override_config() {
        let config: MockWeaveConfig = toml::from_str(
            r#"
[generate]
count = 25
seed = 1
preset = "social"

[models.User]
count = 5
"#,
        )
        .unwrap();

        let args = generate_args(&["--count", "3", "--seed", "9", "--model-counts", "Post=4"]);
        let options = build_options(&args, Some(&config)).unwrap();

        assert_eq!(options.default_count, 3);
        assert_eq!(options.seed, Some(9));
        assert_eq!(options.preset, Some(Preset::Social));
        assert_eq!(options.count_for("User"), 5);
        assert_eq!(options.count_for("Post"), 4);
    }

    #[test]
    fn test_unknown_strategy_flag_is_rejected() {
        let args = generate_args(&["--strategy", "eager"]);
        let err = build_options(&args, None).unwrap_err();
        assert!(err.to_string().contains("smart-break"));
    }
}
