//! CLI parse: clap types for fixtree. No behavior; definitions only.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Fixtree CLI - Seeded fixture generation over type catalogs
#[derive(Parser)]
#[command(name = "fixtree")]
#[command(about = "Generate reproducible test fixtures from a type catalog")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Output format for inspection commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sample instances of a type as JSON
    Sample {
        /// Catalog file (TOML)
        #[arg(long)]
        catalog: PathBuf,
        /// Type expression, e.g. "Order" or "List<Order>"
        #[arg(long = "type")]
        ty: String,
        /// Session seed (overrides configuration)
        #[arg(long)]
        seed: Option<u64>,
        /// Number of instances
        #[arg(long, default_value = "1")]
        count: usize,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// List the concrete types an abstract type resolves to
    Resolve {
        /// Catalog file (TOML)
        #[arg(long)]
        catalog: PathBuf,
        /// Type expression
        #[arg(long = "type")]
        ty: String,
        /// Output format (text or json)
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// List the child positions generated for a type
    Candidates {
        /// Catalog file (TOML)
        #[arg(long)]
        catalog: PathBuf,
        /// Type expression
        #[arg(long = "type")]
        ty: String,
        /// Output format (text or json)
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}
