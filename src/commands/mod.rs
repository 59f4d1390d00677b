//! Command implementations for the CLI
//!
//! - serve: Start the pricing server
//! - quote: Price a request file against the configured catalog and carrier
//! - test: Validate configuration and catalog
//! - config: Configuration display and validation

pub mod config;
pub mod quote;
pub mod serve;

use anyhow::Result;
use std::path::Path;

/// Config path as the `config` crate expects it
pub(crate) fn config_path(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| anyhow::anyhow!("Config path is not valid UTF-8: {}", path.display()))
}
