//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    completions::CompletionsArgs, config::ConfigCommands, entity::EntityCommands,
    shell::ShellArgs,
};

#[derive(Parser)]
#[command(name = "catadm")]
#[command(author, version, about = "Catalog administration toolkit")]
#[command(long_about = "Browse and edit the categories, products, suppliers and customers of a REST-backed catalog.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging to stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Base URL of the catalog API (default: config file, then http://localhost:3000)
    #[arg(long, global = true, env = "CATADM_API_URL")]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Category management
    #[command(subcommand, visible_alias = "cat")]
    Category(EntityCommands),

    /// Product management
    #[command(subcommand, visible_alias = "prod")]
    Product(EntityCommands),

    /// Supplier management
    #[command(subcommand, visible_alias = "sup")]
    Supplier(EntityCommands),

    /// Customer management
    #[command(subcommand, visible_alias = "cust")]
    Customer(EntityCommands),

    /// Interactive list session for one entity
    Shell(ShellArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (table for list, detail view for show)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Aligned columns (for reading and piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}

impl OutputFormat {
    /// Resolve `auto` against the configured default, then the given fallback
    pub fn resolve(self, configured: Option<&str>, fallback: OutputFormat) -> OutputFormat {
        match self {
            OutputFormat::Auto => configured
                .and_then(|s| OutputFormat::from_str(s, true).ok())
                .filter(|f| *f != OutputFormat::Auto)
                .unwrap_or(fallback),
            f => f,
        }
    }
}
