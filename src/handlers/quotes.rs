use arc_swap::ArcSwap;
use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::error::AppError;
use crate::pricing::{Catalog, PricePredictor, PricingEngine, QuoteRequest, QuoteResult, TenantDirectory};

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Swapped on SIGHUP
    pub catalog: Arc<ArcSwap<Catalog>>,
    pub predictor: Arc<dyn PricePredictor>,
    pub lookup_timeout: Duration,
}

impl AppState {
    /// Engine bound to the catalog currently in effect
    fn engine(&self, catalog: Arc<Catalog>) -> PricingEngine {
        PricingEngine::new(catalog.clone(), catalog, self.predictor.clone())
            .with_lookup_timeout(self.lookup_timeout)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuoteRequest {
    pub tenant_id: String,
    pub quote: QuoteRequest,
}

/// Handle POST /v1/quotes
pub async fn handle_create_quote(
    State(state): State<AppState>,
    Json(body): Json<CreateQuoteRequest>,
) -> Result<Json<QuoteResult>, AppError> {
    tracing::info!(
        tenant = %body.tenant_id,
        vehicles = body.quote.vehicles.len(),
        miles = %body.quote.miles,
        "Handling quote request"
    );

    let catalog = state.catalog.load_full();
    let tenant = catalog
        .find_tenant(&body.tenant_id)
        .await?
        .ok_or_else(|| AppError::TenantNotFound(body.tenant_id.clone()))?;

    let result = state.engine(catalog).price(&tenant, &body.quote).await?;
    Ok(Json(result))
}

#[cfg(test)]
impl AppState {
    /// State whose carrier always fails
    pub(crate) fn for_tests(catalog: Catalog) -> Self {
        struct OfflineCarrier;

        #[async_trait::async_trait]
        impl PricePredictor for OfflineCarrier {
            async fn predict(
                &self,
                _request: &crate::pricing::rate::PredictionRequest,
            ) -> Result<rust_decimal::Decimal, AppError> {
                Err(AppError::InvalidUpstreamResponse("carrier offline".to_string()))
            }
        }

        Self {
            catalog: Arc::new(ArcSwap::from_pointee(catalog)),
            predictor: Arc::new(OfflineCarrier),
            lookup_timeout: Duration::from_secs(1),
        }
    }
}
