//! Vehicle transport pricing
//!
//! A quote is priced in layers: every vehicle is classified, its base carrier rate is
//! resolved, the tenant's [`RatingStrategy`] stacks modifiers on top of it for each
//! tier and trailer type, and the per-vehicle results are summed into quote totals.

pub mod aggregate;
pub mod calculator;
pub mod carrier;
pub mod engine;
pub mod modifier;
pub mod modifier_set;
pub mod models;
pub mod rate;
pub mod store;
pub mod tenant;
pub mod tier;
pub mod vehicle;

pub use aggregate::aggregate;
pub use calculator::{RatingStrategy, VehicleInput};
pub use carrier::CarrierClient;
pub use engine::PricingEngine;
pub use modifier::{ModifierKind, ModifierValue};
pub use modifier_set::{GlobalModifiers, ModifierSet, TenantModifiers};
pub use models::{Location, QuoteRequest, QuoteResult, QuotedVehicle, VehiclePricing};
pub use rate::{resolve_base_rate, PricePredictor};
pub use store::{Catalog, ModifierSnapshot, ModifierStore, TenantDirectory};
pub use tenant::{RateSource, Tenant};
pub use tier::{Tier, TierKey, TrailerType};
pub use vehicle::{classify, PricingClass, Vehicle, VehicleCatalog};
