use serde::{Deserialize, Serialize};

/// Environment variable prefix, e.g. `TRANSPORT_PRICING__CARRIER__API_KEY`
pub const ENV_PREFIX: &str = "TRANSPORT_PRICING";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub carrier: CarrierConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// `text` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

/// Carrier price-prediction service
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CarrierConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// TOML file with global modifiers, tenants and the vehicle reference table
    #[serde(default = "default_catalog_path")]
    pub path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_timeout_seconds() -> u64 {
    15
}

fn default_catalog_path() -> String {
    "catalog.toml".to_string()
}

pub fn load_config(path: &str) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::with_name(path))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.carrier.base_url.trim().is_empty() {
        anyhow::bail!("Carrier base_url cannot be empty");
    }

    if !cfg.carrier.base_url.starts_with("http://") && !cfg.carrier.base_url.starts_with("https://") {
        anyhow::bail!("Carrier base_url must start with http:// or https://");
    }

    if cfg.carrier.timeout_seconds == 0 {
        anyhow::bail!("Carrier timeout_seconds must be greater than 0");
    }

    if cfg.catalog.path.trim().is_empty() {
        anyhow::bail!("Catalog path cannot be empty");
    }

    match cfg.server.log_format.as_str() {
        "text" | "json" => {}
        other => anyhow::bail!("Invalid log_format '{}', expected 'text' or 'json'", other),
    }

    Ok(())
}
