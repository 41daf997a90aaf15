//! `catadm config` command - Configuration management
//!
//! Reads and edits the user config file. Values given through
//! `CATADM_API_URL` or `--api-url` are shown as effective but never written.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::helpers::load_config;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::{API_URL_ENV, CONFIG_PATH_ENV};
use crate::core::{Config, HttpCatalogApi};

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show(ShowArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Unset (remove) a configuration value
    Unset(UnsetArgs),

    /// Show the path to the configuration file
    Path,

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (e.g., api_url)
    pub key: String,

    /// Value to set
    pub value: String,
}

#[derive(clap::Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key to remove
    pub key: String,
}

/// Valid configuration keys
const VALID_KEYS: &[(&str, &str)] = &[
    ("api_url", "Base URL of the catalog REST API"),
    (
        "default_format",
        "Default output format (tsv, json, yaml, csv, md, id)",
    ),
];

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, global),
        ConfigCommands::Set(args) => run_set(args),
        ConfigCommands::Unset(args) => run_unset(args),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);

    // If a specific key is requested, show just that value
    if let Some(key) = &args.key {
        check_key(key)?;
        let value = match key.as_str() {
            "api_url" => Some(config.api_url()),
            other => config.get(other),
        };
        return match value {
            Some(v) => {
                println!("{}", v);
                Ok(())
            }
            None => Err(miette::miette!("Key '{}' is not set", key)),
        };
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();

    print_config_value("api_url", Some(config.api_url()));
    print_config_value("default_format", config.default_format.as_deref());

    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("  1. Command line (--api-url)");
    println!("  2. Environment variable ({})", API_URL_ENV);
    println!("  3. Config file (config path, or {})", CONFIG_PATH_ENV);
    println!("  4. Built-in defaults");

    Ok(())
}

fn run_set(args: SetArgs) -> Result<()> {
    check_key(&args.key)?;
    check_value(&args.key, &args.value)?;

    let config_path = get_config_path()?;
    let mut config_map = read_mapping(&config_path)?;

    if let serde_yml::Value::Mapping(map) = &mut config_map {
        map.insert(
            serde_yml::Value::String(args.key.clone()),
            serde_yml::Value::String(args.value.clone()),
        );
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    fs::write(&config_path, yaml).into_diagnostic()?;

    println!(
        "{} Set {} {} {}",
        style("✓").green(),
        style(&args.key).cyan(),
        style("→").dim(),
        style(&args.value).yellow(),
    );

    Ok(())
}

fn run_unset(args: UnsetArgs) -> Result<()> {
    check_key(&args.key)?;

    let config_path = get_config_path()?;
    if !config_path.exists() {
        return Err(miette::miette!(
            "Config file does not exist: {}",
            config_path.display()
        ));
    }

    let mut config_map = read_mapping(&config_path)?;
    let removed = match &mut config_map {
        serde_yml::Value::Mapping(map) => map
            .remove(&serde_yml::Value::String(args.key.clone()))
            .is_some(),
        _ => false,
    };

    if !removed {
        return Err(miette::miette!("Key '{}' not found in config", args.key));
    }

    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    fs::write(&config_path, yaml).into_diagnostic()?;

    println!(
        "{} Removed {} from config",
        style("✓").green(),
        style(&args.key).cyan()
    );

    Ok(())
}

fn run_path() -> Result<()> {
    let path = get_config_path()?;
    println!("{}", path.display());
    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();

    for (key, description) in VALID_KEYS {
        println!("  {:<20} {}", style(key).cyan(), style(description).dim());
    }

    println!();
    println!(
        "{}",
        style("Use 'catadm config set <key> <value>' to set a value.").dim()
    );

    Ok(())
}

// Helper functions

fn get_config_path() -> Result<PathBuf> {
    Config::config_path()
        .ok_or_else(|| miette::miette!("Could not determine config directory"))
}

fn check_key(key: &str) -> Result<()> {
    if VALID_KEYS.iter().any(|(k, _)| *k == key) {
        Ok(())
    } else {
        let valid: Vec<&str> = VALID_KEYS.iter().map(|(k, _)| *k).collect();
        Err(miette::miette!(
            "Unknown config key '{}'. Valid keys: {}",
            key,
            valid.join(", ")
        ))
    }
}

fn check_value(key: &str, value: &str) -> Result<()> {
    match key {
        "api_url" => HttpCatalogApi::new(value).map(|_| ()).into_diagnostic(),
        "default_format" => {
            <OutputFormat as clap::ValueEnum>::from_str(value, true)
                .map(|_| ())
                .map_err(|_| miette::miette!("'{}' is not an output format", value))
        }
        _ => Ok(()),
    }
}

/// Existing config file as a YAML mapping; a missing or empty file is an
/// empty mapping
fn read_mapping(path: &Path) -> Result<serde_yml::Value> {
    if !path.exists() {
        return Ok(serde_yml::Value::Mapping(Default::default()));
    }
    let content = fs::read_to_string(path).into_diagnostic()?;
    let parsed: serde_yml::Value = serde_yml::from_str(&content).into_diagnostic()?;
    Ok(match parsed {
        serde_yml::Value::Mapping(_) => parsed,
        _ => serde_yml::Value::Mapping(Default::default()),
    })
}

fn print_config_value(key: &str, value: Option<&str>) {
    if let Some(v) = value {
        println!("  {}: {}", style(key).cyan(), style(v).yellow());
    } else {
        println!("  {}: {}", style(key).cyan(), style("(not set)").dim());
    }
}
