//! Base carrier rate resolution
//!
//! Three sources exist, selected per tenant:
//! - custom mileage bands held by the tenant
//! - the carrier price-prediction service ([`PricePredictor`])
//! - the fixed 11-bucket JK mileage table

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

use super::models::{bounded_amount, Location};
use super::tenant::{RateSource, Tenant};
use super::tier::TrailerType;
use super::vehicle::ClassifiedVehicle;
use crate::error::AppError;

/// Mileage band `[min_miles, max_miles]` with its rate
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MileageBand {
    pub min_miles: Decimal,
    pub max_miles: Decimal,
    #[serde(deserialize_with = "bounded_amount")]
    pub rate: Decimal,
}

impl MileageBand {
    pub fn contains(&self, miles: Decimal) -> bool {
        self.min_miles <= miles && miles <= self.max_miles
    }
}

/// First band containing `miles`, in configured order
pub fn find_band(bands: &[MileageBand], miles: Decimal) -> Option<&MileageBand> {
    bands.iter().find(|band| band.contains(miles))
}

/// Buckets of the JK mileage table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JkBucket {
    UpTo250,
    UpTo500,
    UpTo750,
    UpTo1000,
    UpTo1250,
    UpTo1500,
    UpTo2000,
    UpTo2500,
    UpTo3000,
    UpTo3500,
    Over3500,
}

impl JkBucket {
    pub const ALL: [JkBucket; 11] = [
        JkBucket::UpTo250,
        JkBucket::UpTo500,
        JkBucket::UpTo750,
        JkBucket::UpTo1000,
        JkBucket::UpTo1250,
        JkBucket::UpTo1500,
        JkBucket::UpTo2000,
        JkBucket::UpTo2500,
        JkBucket::UpTo3000,
        JkBucket::UpTo3500,
        JkBucket::Over3500,
    ];

    /// Inclusive upper bound; `None` for the open-ended last bucket
    fn upper(self) -> Option<Decimal> {
        match self {
            JkBucket::UpTo250 => Some(dec!(250)),
            JkBucket::UpTo500 => Some(dec!(500)),
            JkBucket::UpTo750 => Some(dec!(750)),
            JkBucket::UpTo1000 => Some(dec!(1000)),
            JkBucket::UpTo1250 => Some(dec!(1250)),
            JkBucket::UpTo1500 => Some(dec!(1500)),
            JkBucket::UpTo2000 => Some(dec!(2000)),
            JkBucket::UpTo2500 => Some(dec!(2500)),
            JkBucket::UpTo3000 => Some(dec!(3000)),
            JkBucket::UpTo3500 => Some(dec!(3500)),
            JkBucket::Over3500 => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            JkBucket::UpTo250 => "1-250",
            JkBucket::UpTo500 => "251-500",
            JkBucket::UpTo750 => "501-750",
            JkBucket::UpTo1000 => "751-1000",
            JkBucket::UpTo1250 => "1001-1250",
            JkBucket::UpTo1500 => "1251-1500",
            JkBucket::UpTo2000 => "1501-2000",
            JkBucket::UpTo2500 => "2001-2500",
            JkBucket::UpTo3000 => "2501-3000",
            JkBucket::UpTo3500 => "3001-3500",
            JkBucket::Over3500 => "3501+",
        }
    }

    /// Bucket `i` covers `(upper(i-1), upper(i)]`. The first bucket also takes
    /// anything below one mile; the last takes everything above 3500.
    pub fn for_miles(miles: Decimal) -> JkBucket {
        Self::ALL
            .iter()
            .copied()
            .find(|bucket| bucket.upper().map_or(true, |upper| miles <= upper))
            .unwrap_or(JkBucket::Over3500)
    }

    fn from_label(label: &str) -> Option<JkBucket> {
        let label = label.trim();
        Self::ALL.iter().copied().find(|b| b.label() == label)
    }
}

impl fmt::Display for JkBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Fixed JK mileage table, keyed by bucket label in configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "HashMap<String, Decimal>", into = "HashMap<String, Decimal>")]
pub struct JkMileageTable {
    rates: HashMap<JkBucket, Decimal>,
}

impl JkMileageTable {
    pub fn set(&mut self, bucket: JkBucket, rate: Decimal) {
        self.rates.insert(bucket, rate);
    }

    /// Rate for the bucket containing `miles`; 0 when the bucket is not configured
    pub fn rate_for(&self, miles: Decimal) -> Decimal {
        let bucket = JkBucket::for_miles(miles);
        self.rates.get(&bucket).copied().unwrap_or(Decimal::ZERO)
    }

    /// Highest configured rate; 0 for an empty table
    pub fn max_rate(&self) -> Decimal {
        self.rates.values().copied().max().unwrap_or(Decimal::ZERO)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl From<HashMap<String, Decimal>> for JkMileageTable {
    fn from(raw: HashMap<String, Decimal>) -> Self {
        let mut table = JkMileageTable::default();
        for (label, rate) in raw {
            match JkBucket::from_label(&label) {
                Some(bucket) => table.set(bucket, rate),
                None => warn!(bucket = %label, "Ignoring unknown JK mileage bucket"),
            }
        }
        table
    }
}

impl From<JkMileageTable> for HashMap<String, Decimal> {
    fn from(table: JkMileageTable) -> Self {
        table
            .rates
            .into_iter()
            .map(|(bucket, rate)| (bucket.label().to_string(), rate))
            .collect()
    }
}

/// Request to the carrier price-prediction service
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    pub pickup: PredictionLocation,
    pub delivery: PredictionLocation,
    pub trailer_type: &'static str,
    pub vehicles: Vec<PredictionVehicle>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionLocation {
    pub city: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionVehicle {
    #[serde(rename = "type")]
    pub vehicle_type: &'static str,
    pub is_inoperable: bool,
    pub make: String,
    pub model: String,
}

impl PredictionRequest {
    /// Build the open-trailer request for one vehicle
    pub fn for_vehicle(
        vehicle: &ClassifiedVehicle,
        origin: &Location,
        destination: &Location,
    ) -> Self {
        Self {
            pickup: PredictionLocation::from_location(origin),
            delivery: PredictionLocation::from_location(destination),
            trailer_type: TrailerType::Open.as_carrier_str(),
            vehicles: vec![PredictionVehicle {
                vehicle_type: vehicle.pricing_class.carrier_type(),
                is_inoperable: vehicle.is_inoperable,
                make: vehicle.make.clone(),
                model: vehicle.model.clone(),
            }],
        }
    }
}

impl PredictionLocation {
    /// The carrier network has no pricing data for Midland, MI; Freeland is the
    /// nearest city it does know.
    fn from_location(location: &Location) -> Self {
        let city = location.city.trim();
        let state = location.state.trim();
        if city.eq_ignore_ascii_case("midland") && state.eq_ignore_ascii_case("MI") {
            return Self {
                city: "Freeland".to_string(),
                state: "MI".to_string(),
            };
        }
        Self {
            city: city.to_string(),
            state: state.to_string(),
        }
    }
}

/// Carrier price-prediction collaborator
#[async_trait]
pub trait PricePredictor: Send + Sync {
    /// Predicted carrier price; any non-success outcome is an error, never zero
    async fn predict(&self, request: &PredictionRequest) -> Result<Decimal, AppError>;
}

/// Resolve the unmodified carrier base rate for one vehicle.
///
/// Custom-rate tenants fall back to the external lookup when no band matches.
/// A JK table bucket without a configured rate is reported as [`AppError::NoRateAvailable`].
pub async fn resolve_base_rate(
    predictor: &dyn PricePredictor,
    vehicle: &ClassifiedVehicle,
    origin: &Location,
    destination: &Location,
    tenant: &Tenant,
    miles: Decimal,
) -> Result<Decimal, AppError> {
    match tenant.rate_source {
        RateSource::Custom => {
            if let Some(band) = find_band(&tenant.custom_rates, miles) {
                debug!(tenant = %tenant.id, %miles, rate = %band.rate, "Custom rate band matched");
                return Ok(band.rate);
            }
            debug!(tenant = %tenant.id, %miles, "No custom rate band matched, using carrier lookup");
            external_rate(predictor, vehicle, origin, destination).await
        }
        RateSource::External => external_rate(predictor, vehicle, origin, destination).await,
        RateSource::Jk => {
            let rate = tenant
                .jk
                .as_ref()
                .map_or(Decimal::ZERO, |jk| jk.rates.rate_for(miles));
            if rate.is_zero() {
                return Err(AppError::NoRateAvailable(format!(
                    "no JK mileage rate configured for {} miles ({})",
                    miles,
                    JkBucket::for_miles(miles)
                )));
            }
            Ok(rate)
        }
    }
}

async fn external_rate(
    predictor: &dyn PricePredictor,
    vehicle: &ClassifiedVehicle,
    origin: &Location,
    destination: &Location,
) -> Result<Decimal, AppError> {
    let request = PredictionRequest::for_vehicle(vehicle, origin, destination);
    let price = predictor.predict(&request).await?;
    debug!(
        make = %vehicle.make,
        model = %vehicle.model,
        %price,
        "Carrier price prediction received"
    );
    Ok(price)
}
