//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::GlobalOpts;
use crate::core::{Config, HttpCatalogApi};

/// Load the layered configuration with command-line overrides applied
pub fn load_config(global: &GlobalOpts) -> Config {
    Config::load().with_api_url(global.api_url.clone())
}

/// Build the API client for the effective configuration
pub fn connect(config: &Config) -> Result<HttpCatalogApi> {
    HttpCatalogApi::new(config.api_url()).into_diagnostic()
}

/// Truncate a string to max_len characters, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print an error the way the UI would raise an alert, including its causes
pub fn alert(err: &(dyn std::error::Error + 'static)) {
    eprintln!("{} {}", style("✗").red().bold(), style(err).red());
    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  {} {}", style("caused by:").dim(), cause);
        source = cause.source();
    }
}

/// Pluralize an entity name for counts
pub fn count_label(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("1 {}", singular)
    } else {
        format!("{} {}", count, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("Käsespätzle", 6), "Käs...");
    }

    #[test]
    fn test_count_label() {
        assert_eq!(count_label(1, "category", "categories"), "1 category");
        assert_eq!(count_label(0, "category", "categories"), "0 categories");
        assert_eq!(count_label(12, "product", "products"), "12 products");
    }
}
