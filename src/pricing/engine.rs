use chrono::Utc;
use futures::future::{join_all, try_join_all};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::aggregate::aggregate;
use super::calculator::{RatingStrategy, VehicleInput};
use super::models::{QuoteRequest, QuoteResult, QuotedVehicle, MAX_AMOUNT, MAX_MILES};
use super::rate::{resolve_base_rate, PricePredictor};
use super::store::{ModifierSnapshot, ModifierStore};
use super::tenant::Tenant;
use super::vehicle::{classify, ClassifiedVehicle, VehicleCatalog};
use crate::error::{error_type_name, AppError};
use crate::metrics;

const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(15);

/// Prices quote requests for a tenant
///
/// Vehicles are classified and rate-resolved concurrently. The first rate lookup
/// failure aborts the whole quote.
#[derive(Clone)]
pub struct PricingEngine {
    store: Arc<dyn ModifierStore>,
    vehicles: Arc<dyn VehicleCatalog>,
    predictor: Arc<dyn PricePredictor>,
    lookup_timeout: Duration,
}

impl PricingEngine {
    pub fn new(
        store: Arc<dyn ModifierStore>,
        vehicles: Arc<dyn VehicleCatalog>,
        predictor: Arc<dyn PricePredictor>,
    ) -> Self {
        Self {
            store,
            vehicles,
            predictor,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub async fn price(&self, tenant: &Tenant, request: &QuoteRequest) -> Result<QuoteResult, AppError> {
        let start = Instant::now();
        let strategy = RatingStrategy::for_tenant(tenant);

        match self.price_with(&strategy, tenant, request).await {
            Ok(result) => {
                let duration = start.elapsed();
                metrics::record_quote(&tenant.id, strategy.name(), duration);
                info!(
                    tenant = %tenant.id,
                    strategy = %strategy,
                    vehicles = request.vehicles.len(),
                    duration_ms = duration.as_millis() as u64,
                    "Quote priced"
                );
                Ok(result)
            }
            Err(e) => {
                metrics::record_quote_error(&tenant.id, error_type_name(&e));
                warn!(tenant = %tenant.id, strategy = %strategy, error = %e, "Quote failed");
                Err(e)
            }
        }
    }

    async fn price_with(
        &self,
        strategy: &RatingStrategy,
        tenant: &Tenant,
        request: &QuoteRequest,
    ) -> Result<QuoteResult, AppError> {
        validate_request(request)?;

        let snapshot = ModifierSnapshot::load(self.store.as_ref(), &tenant.id).await?;

        let classified: Vec<ClassifiedVehicle> = join_all(
            request
                .vehicles
                .iter()
                .map(|vehicle| classify(self.vehicles.as_ref(), vehicle)),
        )
        .await;

        let bases = try_join_all(
            classified
                .iter()
                .map(|vehicle| self.resolve_with_timeout(vehicle, tenant, request)),
        )
        .await?;

        let vehicle_pricings: Vec<QuotedVehicle> = request
            .vehicles
            .iter()
            .zip(classified.iter().zip(bases))
            .map(|(vehicle, (classified, base))| {
                let input = VehicleInput {
                    vehicle: classified,
                    base,
                    miles: request.miles,
                    origin_state: &request.origin.state,
                    dest_state: &request.destination.state,
                    commission: request.commission,
                };
                QuotedVehicle {
                    vehicle: vehicle.clone(),
                    pricing: Some(strategy.price_vehicle(&snapshot, tenant, &input)),
                }
            })
            .collect();

        let quote_total_pricing = aggregate(&vehicle_pricings);

        Ok(QuoteResult {
            quote_id: Uuid::new_v4(),
            tenant: tenant.id.clone(),
            strategy: strategy.name().to_string(),
            priced_at: Utc::now(),
            vehicle_pricings,
            quote_total_pricing,
        })
    }

    async fn resolve_with_timeout(
        &self,
        vehicle: &ClassifiedVehicle,
        tenant: &Tenant,
        request: &QuoteRequest,
    ) -> Result<Decimal, AppError> {
        let lookup = resolve_base_rate(
            self.predictor.as_ref(),
            vehicle,
            &request.origin,
            &request.destination,
            tenant,
            request.miles,
        );

        match tokio::time::timeout(self.lookup_timeout, lookup).await {
            Ok(Ok(base)) if base > MAX_AMOUNT => {
                metrics::record_rate_lookup("failure");
                Err(AppError::InvalidUpstreamResponse(format!(
                    "base rate {} exceeds the maximum of {}",
                    base, MAX_AMOUNT
                )))
            }
            Ok(Ok(base)) => {
                metrics::record_rate_lookup("success");
                debug!(make = %vehicle.make, model = %vehicle.model, %base, "Base rate resolved");
                Ok(base)
            }
            Ok(Err(e)) => {
                metrics::record_rate_lookup("failure");
                Err(e)
            }
            Err(_) => {
                metrics::record_rate_lookup("timeout");
                Err(AppError::Timeout(self.lookup_timeout.as_secs()))
            }
        }
    }
}

fn validate_request(request: &QuoteRequest) -> Result<(), AppError> {
    if request.miles.is_sign_negative() {
        return Err(AppError::InvalidRequest(format!(
            "miles must not be negative, got {}",
            request.miles
        )));
    }
    if request.miles > MAX_MILES {
        return Err(AppError::InvalidRequest(format!(
            "miles must not exceed {}, got {}",
            MAX_MILES, request.miles
        )));
    }
    if request.commission.abs() > MAX_AMOUNT {
        return Err(AppError::InvalidRequest(format!(
            "commission must be within {}, got {}",
            MAX_AMOUNT, request.commission
        )));
    }
    if request.origin.state.trim().is_empty() || request.destination.state.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "origin and destination state are required".to_string(),
        ));
    }
    Ok(())
}
