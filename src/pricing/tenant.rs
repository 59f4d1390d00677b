use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::rate::{find_band, JkMileageTable, MileageBand};
use super::vehicle::PricingClass;

/// Where a tenant's base carrier rate comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    /// Carrier price-prediction service
    #[default]
    External,
    /// Tenant mileage bands, falling back to the carrier service
    Custom,
    /// Fixed JK mileage table with the tariff/carrier split algorithm
    Jk,
}

/// Receiving portal and its pricing profile
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Tenant {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rate_source: RateSource,
    /// Premium portals price white glove from their own mileage bands
    #[serde(default)]
    pub premium: bool,
    #[serde(default)]
    pub custom_rates: Vec<MileageBand>,
    #[serde(default)]
    pub jk: Option<JkSettings>,
}

impl Tenant {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            rate_source: RateSource::default(),
            premium: false,
            custom_rates: Vec::new(),
            jk: None,
        }
    }

    /// Custom-rate tenants price oversize vehicles from their own table
    pub fn uses_custom_rates(&self) -> bool {
        self.rate_source == RateSource::Custom
    }

    /// White-glove override for premium tenants whose custom-rate bands cover `miles`
    pub fn white_glove_override(&self, miles: Decimal) -> Option<Decimal> {
        if !self.premium {
            return None;
        }
        find_band(&self.custom_rates, miles).map(|band| band.rate)
    }
}

/// JK split algorithm settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct JkSettings {
    /// Share of the base kept as company tariff
    #[serde(default = "default_tariff_percent")]
    pub tariff_percent: Decimal,
    #[serde(default)]
    pub rates: JkMileageTable,
    #[serde(default)]
    pub surcharges: JkClassSurcharges,
    #[serde(default)]
    pub enclosed_over_1500: Decimal,
    #[serde(default)]
    pub enclosed_up_to_1500: Decimal,
    /// Percent of the carrier base; reported but not charged
    #[serde(default)]
    pub enclosed_modifier: Option<Decimal>,
    /// Subtracted from the company tariff, never below zero
    #[serde(default)]
    pub fixed_discount: Option<Decimal>,
}

impl Default for JkSettings {
    fn default() -> Self {
        Self {
            tariff_percent: default_tariff_percent(),
            rates: JkMileageTable::default(),
            surcharges: JkClassSurcharges::default(),
            enclosed_over_1500: Decimal::ZERO,
            enclosed_up_to_1500: Decimal::ZERO,
            enclosed_modifier: None,
            fixed_discount: None,
        }
    }
}

impl JkSettings {
    pub fn enclosed_surcharge(&self, miles: Decimal) -> Decimal {
        if miles > dec!(1500) {
            self.enclosed_over_1500
        } else {
            self.enclosed_up_to_1500
        }
    }
}

fn default_tariff_percent() -> Decimal {
    dec!(0.30)
}

/// Flat amounts added to the carrier base for larger classes
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct JkClassSurcharges {
    #[serde(default)]
    pub suv: Decimal,
    #[serde(default)]
    pub van: Decimal,
    #[serde(default)]
    pub pickup_4_door: Decimal,
}

impl JkClassSurcharges {
    pub fn for_class(&self, class: PricingClass) -> Decimal {
        match class {
            PricingClass::Suv => self.suv,
            PricingClass::Van => self.van,
            PricingClass::Pickup4Door => self.pickup_4_door,
            _ => Decimal::ZERO,
        }
    }
}
