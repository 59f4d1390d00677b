use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use tracing::info;
use transport_pricing::{config, init_tracing, server};

use super::config_path;

/// Execute the serve command
///
/// Tracing is initialized here, once the configured level and format are known.
pub async fn execute(config_file: &Path) -> Result<()> {
    println!("{}", "Starting transport pricing service...".green());

    let cfg = config::load_config(config_path(config_file)?)?;
    init_tracing(&cfg.server.log_level, &cfg.server.log_format);

    info!(
        log_level = %cfg.server.log_level,
        log_format = %cfg.server.log_format,
        "Configuration loaded"
    );

    // Blocks until shutdown
    server::start_server(cfg).await?;

    Ok(())
}
