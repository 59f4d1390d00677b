use anyhow::{Context, Result};
use colored::Colorize;
use rust_decimal::Decimal;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use transport_pricing::config;
use transport_pricing::handlers::quotes::CreateQuoteRequest;
use transport_pricing::pricing::models::Totals;
use transport_pricing::pricing::{
    CarrierClient, Catalog, PricingEngine, QuoteResult, TenantDirectory, Tier, TrailerType,
};

use super::config_path;

/// Execute the quote command
///
/// Prices a request file against the configured catalog and carrier service
pub async fn execute(config_file: &Path, request_file: &Path, as_json: bool) -> Result<()> {
    let cfg = config::load_config(config_path(config_file)?)?;
    let catalog = Arc::new(Catalog::load(&cfg.catalog.path)?);

    let content = std::fs::read_to_string(request_file)
        .with_context(|| format!("Failed to read request file {}", request_file.display()))?;
    let body: CreateQuoteRequest = serde_json::from_str(&content)
        .with_context(|| format!("Invalid quote request in {}", request_file.display()))?;

    let tenant = catalog
        .find_tenant(&body.tenant_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Tenant '{}' not found in catalog", body.tenant_id))?;

    let engine = PricingEngine::new(
        catalog.clone(),
        catalog,
        Arc::new(CarrierClient::new(cfg.carrier.clone())?),
    )
    .with_lookup_timeout(Duration::from_secs(cfg.carrier.timeout_seconds));

    info!(tenant = %tenant.id, vehicles = body.quote.vehicles.len(), "Pricing quote from file");
    let result = engine.price(&tenant, &body.quote).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_quote(&result);
    }

    Ok(())
}

fn print_quote(result: &QuoteResult) {
    println!(
        "{} {} ({})",
        "Quote".bold(),
        result.quote_id.to_string().dimmed(),
        result.strategy
    );
    println!("  Tenant: {}", result.tenant.as_str().cyan());
    println!();

    for quoted in &result.vehicle_pricings {
        println!("{}", quoted.vehicle.label().bold());
        match &quoted.pricing {
            Some(pricing) => {
                println!("  Base: {}", format_amount(pricing.base));
                print_totals(&pricing.totals);
            }
            None => println!("  {}", "not priced".yellow()),
        }
        println!();
    }

    println!("{}", "Quote Total".green().bold());
    print_totals(&result.quote_total_pricing.totals);
}

fn print_totals(totals: &Totals) {
    println!(
        "  {:<8} {:>12} {:>12} {:>14} {:>14}",
        "Tier", "Open", "Enclosed", "Open (all-in)", "Encl (all-in)"
    );
    for tier in Tier::ALL {
        let open = totals.leaf(tier, TrailerType::Open);
        let enclosed = totals.leaf(tier, TrailerType::Enclosed);
        println!(
            "  {:<8} {:>12} {:>12} {:>14} {:>14}",
            tier.to_string(),
            format_amount(open.total),
            format_amount(enclosed.total),
            format_amount(open.total_with_company_tariff_and_commission),
            format_amount(enclosed.total_with_company_tariff_and_commission),
        );
    }
    println!("  {:<8} {:>12}", "White glove", format_amount(totals.white_glove));
}

fn format_amount(amount: Decimal) -> String {
    format!("${:.2}", amount)
}
