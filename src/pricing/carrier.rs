use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::rate::{PredictionRequest, PricePredictor};
use crate::config::CarrierConfig;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    #[serde(default)]
    price: Option<Decimal>,
}

/// HTTP client for the carrier price-prediction service
#[derive(Debug, Clone)]
pub struct CarrierClient {
    client: Client,
    config: CarrierConfig,
}

impl CarrierClient {
    pub fn new(config: CarrierConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/price-prediction", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl PricePredictor for CarrierClient {
    async fn predict(&self, request: &PredictionRequest) -> Result<Decimal, AppError> {
        let mut builder = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .json(request);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::UpstreamError {
                status,
                message: error_text,
            });
        }

        let body: PredictionResponse = response.json().await.map_err(|e| {
            AppError::InvalidUpstreamResponse(format!("Failed to parse prediction: {}", e))
        })?;

        match body.price {
            Some(price) if price > Decimal::ZERO => {
                debug!(%price, "Carrier prediction succeeded");
                Ok(price)
            }
            Some(price) => Err(AppError::InvalidUpstreamResponse(format!(
                "Carrier returned non-positive price {}",
                price
            ))),
            None => Err(AppError::InvalidUpstreamResponse(
                "Carrier response has no price".to_string(),
            )),
        }
    }
}
