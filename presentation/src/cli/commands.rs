//! CLI command definitions

use chorus_domain::RequestOptions;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for orchestration results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Answer plus confidence, key points, citations, costs and stage timings
    Full,
    /// Only the final answer
    Answer,
    /// JSON output
    Json,
}

impl From<OutputFormat> for chorus_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => chorus_domain::OutputFormat::Full,
            OutputFormat::Answer => chorus_domain::OutputFormat::Answer,
            OutputFormat::Json => chorus_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for chorus
#[derive(Parser, Debug)]
#[command(name = "chorus")]
#[command(author, version, about = "Ask several LLM backends at once and get one consensus answer")]
#[command(long_about = r#"
Chorus sends your query to an ensemble of LLM backends and merges their answers
into a single, source-neutral response.

Four sliders (0.0 - 1.0) control how much work is done:
  --accuracy     more backends, fact-checking
  --speed        fewer backends and samples
  --creativity   more varied prompts, higher temperature
  --cost         cheaper runs (pulls breadth down)

Configuration files are loaded from (in priority order):
1. CHORUS_<SECTION>__<KEY>   Environment variables
2. --config <path>           Explicit config file
3. ./chorus.toml             Project-level config
4. ~/.config/chorus/config.toml   Global config

Example:
  chorus "What's the best way to handle errors in Rust?"
  chorus --accuracy 0.9 --speed 0.2 "Prove that sqrt(2) is irrational"
  echo '{"query": "Name three primes", "options": {"json_mode": true}}' | chorus --request -
"#)]
pub struct Cli {
    /// The query (not required with --request or --show-*)
    pub query: Option<String>,

    /// Accuracy slider
    #[arg(long, value_name = "0..1")]
    pub accuracy: Option<f64>,

    /// Speed slider
    #[arg(long, value_name = "0..1")]
    pub speed: Option<f64>,

    /// Creativity slider
    #[arg(long, value_name = "0..1")]
    pub creativity: Option<f64>,

    /// Cost slider
    #[arg(long, value_name = "0..1")]
    pub cost: Option<f64>,

    /// Maximum tokens per generation (64 - 4096)
    #[arg(long, value_name = "N")]
    pub max_tokens: Option<u32>,

    /// Ask backends for a single JSON object
    #[arg(long)]
    pub json_mode: bool,

    /// Read a JSON request body from a file, or from stdin with "-"
    #[arg(long, value_name = "FILE")]
    pub request: Option<String>,

    /// Output format (defaults to the configured format, then "answer")
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Show recorded backend scorecards and exit
    #[arg(long)]
    pub show_scorecards: bool,

    /// Also write logs to a daily rotated file in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    /// Layer the option flags over `base` (flags win)
    pub fn apply_options(&self, base: RequestOptions) -> RequestOptions {
        RequestOptions {
            accuracy: self.accuracy.unwrap_or(base.accuracy),
            speed: self.speed.unwrap_or(base.speed),
            creativity: self.creativity.unwrap_or(base.creativity),
            cost: self.cost.unwrap_or(base.cost),
            max_tokens: self.max_tokens.unwrap_or(base.max_tokens),
            json_mode: self.json_mode || base.json_mode,
        }
    }
}
