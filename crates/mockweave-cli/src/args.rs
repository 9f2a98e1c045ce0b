use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "mockweave",
    about = "Generate relation-consistent mock records for a graph of typed models",
    version,
    after_help = "Examples:\n  mockweave generate models.json --count 20 --output mock.json\n  mockweave generate models.json --preset blog --seed 42\n  mockweave detect models.json\n  mockweave graph models.json --format dot"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate mock records for every model in a model map
    Generate(GenerateArgs),

    /// List relations detected from field naming
    Detect(DetectArgs),

    /// Visualize the model dependency graph and its break points
    Graph(GraphArgs),
}

#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Model map JSON file
    pub models: PathBuf,

    /// Number of records per model (overrides mockweave.toml)
    #[arg(long)]
    pub count: Option<usize>,

    /// Per-model count overrides (e.g., User=5,Post=50)
    #[arg(long, value_delimiter = ',')]
    pub model_counts: Vec<String>,

    /// Random seed for deterministic generation
    #[arg(long, env = "MOCKWEAVE_SEED")]
    pub seed: Option<u64>,

    /// Emit join tables and SQL-friendly values
    #[arg(long)]
    pub sql_mode: bool,

    /// Cardinality preset (blog, ecommerce, social)
    #[arg(long)]
    pub preset: Option<String>,

    /// Cycle resolution strategy (smart-break, lazy-loading, partial-references)
    #[arg(long)]
    pub strategy: Option<String>,

    /// Output file path; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory searched for mockweave.toml
    #[arg(long, default_value = ".")]
    pub config_dir: PathBuf,
}

#[derive(Parser, Debug)]
pub struct DetectArgs {
    /// Model map JSON file
    pub models: PathBuf,

    /// Drop relations scoring below this confidence
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Output format
    #[arg(long, default_value = "table")]
    pub format: DetectFormat,

    /// Directory searched for mockweave.toml
    #[arg(long, default_value = ".")]
    pub config_dir: PathBuf,
}

#[derive(Parser, Debug)]
pub struct GraphArgs {
    /// Model map JSON file
    pub models: PathBuf,

    /// Cycle resolution strategy used to pick break points
    #[arg(long)]
    pub strategy: Option<String>,

    /// Output format for the dependency graph
    #[arg(long, default_value = "mermaid")]
    pub format: GraphFormat,

    /// Directory searched for mockweave.toml
    #[arg(long, default_value = ".")]
    pub config_dir: PathBuf,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum DetectFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum GraphFormat {
    Mermaid,
    Dot,
}

impl GenerateArgs {
    /// Parse model count overrides like "User=5,Post=50".
    /// Malformed entries are skipped.
    pub fn parse_model_counts(&self) -> Vec<(String, usize)> {
        self.model_counts
            .iter()
            .filter_map(|entry| {
                let (model, count) = entry.split_once('=')?;
                let count = count.trim().parse::<usize>().ok()?;
                Some((model.trim().to_string(), count))
            })
            .collect()
    }
}
