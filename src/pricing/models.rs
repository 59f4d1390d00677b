use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize};
use std::ops::AddAssign;
use uuid::Uuid;

use super::modifier::round_currency;
use super::tier::{Tier, TierKey, TrailerType};
use super::vehicle::Vehicle;

/// Longest route a quote may cover
pub const MAX_MILES: Decimal = dec!(100000);

/// Ceiling for money entering a calculation: commissions and base rates.
/// Keeps every layered product well inside `Decimal` range.
pub const MAX_AMOUNT: Decimal = dec!(100000000);

/// Deserialize a configured amount, rejecting magnitudes above [`MAX_AMOUNT`]
pub(crate) fn bounded_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
    if amount.abs() > MAX_AMOUNT {
        return Err(serde::de::Error::custom(format!(
            "amount {} exceeds the maximum of {}",
            amount, MAX_AMOUNT
        )));
    }
    Ok(amount)
}

/// Pickup or delivery point
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Location {
    pub city: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
}

/// Input of one pricing request
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub vehicles: Vec<Vehicle>,
    /// Route distance, computed upstream
    pub miles: Decimal,
    pub origin: Location,
    pub destination: Location,
    #[serde(default)]
    pub commission: Decimal,
}

/// One tier/trailer price point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceLeaf {
    pub total: Decimal,
    pub company_tariff: Decimal,
    pub commission: Decimal,
    pub total_with_company_tariff_and_commission: Decimal,
}

impl PriceLeaf {
    /// Build a leaf, deriving the grand total and rounding every amount
    pub fn new(total: Decimal, company_tariff: Decimal, commission: Decimal) -> Self {
        let total = round_currency(total);
        let company_tariff = round_currency(company_tariff);
        let commission = round_currency(commission);
        Self {
            total,
            company_tariff,
            commission,
            total_with_company_tariff_and_commission: total + company_tariff + commission,
        }
    }
}

impl AddAssign<&PriceLeaf> for PriceLeaf {
    fn add_assign(&mut self, rhs: &PriceLeaf) {
        self.total += rhs.total;
        self.company_tariff += rhs.company_tariff;
        self.commission += rhs.commission;
        self.total_with_company_tariff_and_commission +=
            rhs.total_with_company_tariff_and_commission;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct TrailerTotals {
    pub open: PriceLeaf,
    pub enclosed: PriceLeaf,
}

impl TrailerTotals {
    pub fn get(&self, trailer: TrailerType) -> &PriceLeaf {
        match trailer {
            TrailerType::Open => &self.open,
            TrailerType::Enclosed => &self.enclosed,
        }
    }

    pub fn get_mut(&mut self, trailer: TrailerType) -> &mut PriceLeaf {
        match trailer {
            TrailerType::Open => &mut self.open,
            TrailerType::Enclosed => &mut self.enclosed,
        }
    }
}

/// Per-tier prices plus the separate white-glove price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub white_glove: Decimal,
    pub one: TrailerTotals,
    pub three: TrailerTotals,
    pub five: TrailerTotals,
    pub seven: TrailerTotals,
}

impl Totals {
    pub fn tier(&self, tier: Tier) -> &TrailerTotals {
        match tier {
            Tier::One => &self.one,
            Tier::Three => &self.three,
            Tier::Five => &self.five,
            Tier::Seven => &self.seven,
        }
    }

    pub fn tier_mut(&mut self, tier: Tier) -> &mut TrailerTotals {
        match tier {
            Tier::One => &mut self.one,
            Tier::Three => &mut self.three,
            Tier::Five => &mut self.five,
            Tier::Seven => &mut self.seven,
        }
    }

    pub fn leaf(&self, tier: Tier, trailer: TrailerType) -> &PriceLeaf {
        self.tier(tier).get(trailer)
    }
}

impl AddAssign<&Totals> for Totals {
    fn add_assign(&mut self, rhs: &Totals) {
        self.white_glove += rhs.white_glove;
        for tier in Tier::ALL {
            for trailer in TrailerType::ALL {
                *self.tier_mut(tier).get_mut(trailer) += rhs.leaf(tier, trailer);
            }
        }
    }
}

/// Amount attached to a tier identifier
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TierAmount {
    pub tier: TierKey,
    pub value: Decimal,
}

/// Itemized modifier amounts for one vehicle
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleModifiers {
    pub inoperable: Decimal,
    pub routes: Decimal,
    pub states: Decimal,
    pub oversize: Decimal,
    pub vehicles: Decimal,
    pub global_discount: Decimal,
    pub portal_discount: Decimal,
    pub irr: Decimal,
    pub fuel: Decimal,
    pub enclosed_flat: Decimal,
    pub enclosed_percent: Decimal,
    pub commission: Decimal,
    /// Applied per-unit markup for each tier
    pub service_levels: Vec<TierAmount>,
    /// Open-trailer company tariff for each tier
    pub company_tariffs: Vec<TierAmount>,
}

/// Output of pricing one vehicle
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct VehiclePricing {
    pub base: Decimal,
    pub modifiers: VehicleModifiers,
    pub totals: Totals,
}

/// A vehicle of a quote and its pricing, absent when it has not been priced
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotedVehicle {
    pub vehicle: Vehicle,
    #[serde(default)]
    pub pricing: Option<VehiclePricing>,
}

/// Quote-level modifier summary for display
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteModifierSummary {
    pub inoperable: Decimal,
    pub routes: Decimal,
    pub states: Decimal,
    pub oversize: Decimal,
    pub vehicles: Decimal,
    pub global_discount: Decimal,
    pub portal_discount: Decimal,
    pub irr: Decimal,
    pub fuel: Decimal,
    pub enclosed_flat: Decimal,
    pub enclosed_percent: Decimal,
    pub commission: Decimal,
    pub service_levels: Vec<TierAmount>,
    pub company_tariffs: Vec<TierAmount>,
}

/// Sum of every vehicle's pricing
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct QuoteTotalPricing {
    pub modifiers: QuoteModifierSummary,
    pub totals: Totals,
}

/// Result of [`crate::pricing::PricingEngine::price`]
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResult {
    pub quote_id: Uuid,
    pub tenant: String,
    pub strategy: String,
    pub priced_at: DateTime<Utc>,
    pub vehicle_pricings: Vec<QuotedVehicle>,
    pub quote_total_pricing: QuoteTotalPricing,
}
