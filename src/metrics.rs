use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the global Prometheus recorder
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    init_metric_descriptions();

    Ok(handle)
}

/// Can be called multiple times safely
fn init_metric_descriptions() {
    describe_counter!("quotes_total", "Total number of priced quotes");
    describe_counter!("quote_errors_total", "Total number of failed quotes");
    describe_counter!(
        "rate_lookups_total",
        "Carrier rate lookups by outcome"
    );
    describe_histogram!(
        "quote_duration_seconds",
        "Quote pricing duration in seconds"
    );
    describe_gauge!(
        "transport_pricing_info",
        "Service version information"
    );

    gauge!("transport_pricing_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

pub fn record_quote(tenant: &str, strategy: &str, duration: Duration) {
    counter!(
        "quotes_total",
        "tenant" => tenant.to_string(),
        "strategy" => strategy.to_string(),
    )
    .increment(1);

    histogram!("quote_duration_seconds").record(duration.as_secs_f64());
}

pub fn record_quote_error(tenant: &str, error_type: &str) {
    counter!(
        "quote_errors_total",
        "tenant" => tenant.to_string(),
        "error_type" => error_type.to_string(),
    )
    .increment(1);
}

/// `outcome` is `success`, `failure` or `timeout`
pub fn record_rate_lookup(outcome: &'static str) {
    counter!("rate_lookups_total", "outcome" => outcome).increment(1);
}
