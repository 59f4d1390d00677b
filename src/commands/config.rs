use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use tracing::info;
use transport_pricing::config::{self, Config};

use super::config_path;

/// Execute the config show command
///
/// Displays the current configuration with secrets masked
pub fn show(config_file: &Path) -> Result<()> {
    println!("{}", "Loading configuration...".yellow());
    info!("Loading configuration for display");

    let cfg = config::load_config(config_path(config_file)?)?;
    let sanitized = sanitize_secrets(&cfg);

    println!("{}", "Current Configuration:".green().bold());
    println!();

    let toml_string = toml::to_string_pretty(&sanitized)?;
    println!("{}", toml_string);

    info!("Configuration displayed successfully");
    Ok(())
}

/// Execute the config validate command
pub fn validate(config_file: &Path) -> Result<()> {
    println!("{}", "Validating configuration...".yellow());
    info!("Validating configuration file");

    let cfg = config::load_config(config_path(config_file)?)?;

    println!("{}", "✓ Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!("  Carrier: {}", cfg.carrier.base_url);
    println!("  Lookup Timeout: {}s", cfg.carrier.timeout_seconds);
    println!("  Catalog: {}", cfg.catalog.path);

    info!("Configuration validation successful");
    Ok(())
}

/// Mask the carrier API key for display
fn sanitize_secrets(cfg: &Config) -> Config {
    let mut sanitized = cfg.clone();
    sanitized.carrier.api_key = sanitized.carrier.api_key.as_deref().map(mask_api_key);
    sanitized
}

/// Mask an API key for safe display
///
/// Shows first 7 and last 4 characters with asterisks in between
/// Example: "ck-1234567890abcdef" -> "ck-1234...cdef"
fn mask_api_key(key: &str) -> String {
    if key.len() <= 11 || !key.is_ascii() {
        // Too short to mask meaningfully
        return "***".to_string();
    }

    let prefix = &key[..7];
    let suffix = &key[key.len() - 4..];

    format!("{}...{}", prefix, suffix)
}
