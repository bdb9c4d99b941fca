use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// jobshift: ask a local LLM how a job role becomes AI-augmented.
///
/// Runs five prompts in order (job description, missions and tasks,
/// technology recommendations, AI augmentation opportunities, transition
/// plan) and prints the resulting report. With no subcommand it behaves like
/// a bare `run`: it prompts for a job title straight away.
#[derive(Debug, Parser)]
#[command(name = "jobshift", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The subcommand to execute; a missing one is a `run` with defaults.
    pub fn into_command(self) -> Commands {
        self.command.unwrap_or_else(|| Commands::Run(RunArgs::default()))
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Analyze a job title (prompted interactively unless --job is given).
    Run(RunArgs),

    /// Print the five prompt templates for a job title without calling the LLM.
    Prompts(PromptsArgs),
}

/// Arguments for the `prompts` subcommand.
#[derive(Debug, Clone, clap::Args)]
pub struct PromptsArgs {
    /// Job title to render into the templates (default: "<job title>").
    #[arg(long)]
    pub job: Option<String>,

    /// Write the prompts to this file instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `run` subcommand.
///
/// Every setting can also come from env vars (`OLLAMA_URL`, `OLLAMA_MODEL`,
/// `TEMPERATURE`, `SAVE_RESULTS`, `OUTPUT_DIR`), a `.env` file, or a TOML
/// config file. Precedence: CLI > env > file > defaults.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// Job title to analyze. When omitted, it is read from stdin.
    #[arg(long)]
    pub job: Option<String>,

    /// Keep prompting for job titles until 'quit', 'exit' or 'end'.
    #[arg(long, default_value_t = false, conflicts_with = "job")]
    pub repeat: bool,

    /// Path to a TOML configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// LLM generate endpoint (default: http://localhost:11434/api/generate).
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Model name (default: "llama3").
    #[arg(long)]
    pub model: Option<String>,

    /// Sampling temperature, 0.0 to 2.0 (default: 0.7).
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Save each report as markdown under the output directory.
    #[arg(long, default_value_t = false)]
    pub save: bool,

    /// Directory for saved reports (default: "job_results").
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Log level filter (default: "warn" on stderr, "info" in the log file).
    /// Supports tracing directives (e.g. "debug", "jobshift=trace,warn").
    /// Overridden by JOBSHIFT_LOG.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to a log file. When set, structured JSON logs are appended here
    /// in addition to the human-readable stderr output.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
