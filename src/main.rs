use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use transport_pricing::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let command = args.get_command();

    // serve initializes tracing itself from the configured level and format
    if !matches!(command, cli::Commands::Serve) {
        init_tracing("info", "text");
    }

    match command {
        cli::Commands::Serve => {
            commands::serve::execute(&args.config).await?;
        }
        cli::Commands::Quote { request, json } => {
            commands::quote::execute(&args.config, &request, json).await?;
        }
        cli::Commands::Test => {
            commands::test::execute(&args.config)?;
        }
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&args.config)?,
            cli::ConfigCommands::Validate => commands::config::validate(&args.config)?,
        },
        cli::Commands::Version => {
            println!("Transport Pricing v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
