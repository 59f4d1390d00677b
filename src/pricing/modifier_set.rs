//! Modifier configuration documents
//!
//! Two scopes exist per calculation: exactly one [`GlobalModifiers`] document with the
//! tenant-independent defaults, and at most one [`TenantModifiers`] document with the
//! per-portal overrides. Both share the fields in [`ModifierSet`].

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use super::modifier::{ModifierKind, ModifierValue};
use super::models::bounded_amount;
use super::tier::{Tier, TierKey};
use super::vehicle::{ClassifiedVehicle, PricingClass};

/// Which leg of the trip a state modifier applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Applies when the state is the destination
    Inbound,
    /// Applies when the state is the origin
    Outbound,
    Both,
}

impl Direction {
    pub fn applies_outbound(self) -> bool {
        matches!(self, Direction::Outbound | Direction::Both)
    }

    pub fn applies_inbound(self) -> bool {
        matches!(self, Direction::Inbound | Direction::Both)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RouteModifier {
    pub origin_state: String,
    pub dest_state: String,
    #[serde(flatten)]
    pub modifier: ModifierValue,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StateModifier {
    pub direction: Direction,
    #[serde(flatten)]
    pub modifier: ModifierValue,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VehicleModifier {
    pub make: String,
    pub model: String,
    #[serde(flatten)]
    pub modifier: ModifierValue,
}

/// Oversize charges by pricing class, all sharing one kind
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct OversizeTable {
    #[serde(default)]
    pub suv: Option<Decimal>,
    #[serde(default)]
    pub van: Option<Decimal>,
    #[serde(default)]
    pub pickup_2_door: Option<Decimal>,
    #[serde(default)]
    pub pickup_4_door: Option<Decimal>,
    /// Sedans carry no oversize charge unless this is set
    #[serde(default)]
    pub sedan: Option<Decimal>,
    /// Fallback for classes without their own entry
    #[serde(default)]
    pub default: Option<Decimal>,
    #[serde(default)]
    pub kind: ModifierKind,
}

impl OversizeTable {
    /// Modifier for a class, if the table prices it
    pub fn modifier_for(&self, class: PricingClass) -> Option<ModifierValue> {
        let value = match class {
            PricingClass::Sedan => return self.sedan.map(|v| self.with_kind(v)),
            PricingClass::Suv => self.suv,
            PricingClass::Van => self.van,
            PricingClass::Pickup2Door => self.pickup_2_door,
            PricingClass::Pickup4Door => self.pickup_4_door,
            PricingClass::Other => None,
        };
        value.or(self.default).map(|v| self.with_kind(v))
    }

    fn with_kind(&self, value: Decimal) -> ModifierValue {
        ModifierValue {
            value,
            kind: self.kind,
        }
    }
}

/// Service-level markups indexed One/Three/Five/Seven.
///
/// Stored documents list them as `{tier, value, kind}` entries where `tier` may be a
/// number or a string; unrecognized tiers are logged and skipped.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(from = "Vec<ServiceLevelEntry>", into = "Vec<ServiceLevelEntry>")]
pub struct ServiceLevels {
    levels: [Option<ModifierValue>; 4],
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServiceLevelEntry {
    pub tier: TierKey,
    #[serde(flatten)]
    pub modifier: ModifierValue,
}

impl ServiceLevels {
    pub fn new(levels: [ModifierValue; 4]) -> Self {
        Self {
            levels: levels.map(Some),
        }
    }

    pub fn get(&self, tier: Tier) -> Option<&ModifierValue> {
        self.levels[tier.index()].as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(Option::is_none)
    }
}

impl From<Vec<ServiceLevelEntry>> for ServiceLevels {
    fn from(entries: Vec<ServiceLevelEntry>) -> Self {
        let mut levels = [None; 4];
        for entry in entries {
            match entry.tier.parse() {
                Some(tier) => levels[tier.index()] = Some(entry.modifier),
                None => warn!(tier = %entry.tier, "Skipping service level with unrecognized tier"),
            }
        }
        Self { levels }
    }
}

impl From<ServiceLevels> for Vec<ServiceLevelEntry> {
    fn from(levels: ServiceLevels) -> Self {
        Tier::ALL
            .iter()
            .filter_map(|tier| {
                levels.get(*tier).map(|modifier| ServiceLevelEntry {
                    tier: TierKey::from(*tier),
                    modifier: *modifier,
                })
            })
            .collect()
    }
}

/// Fields shared by the global and tenant documents
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ModifierSet {
    #[serde(default)]
    pub inoperable: Option<ModifierValue>,
    #[serde(default)]
    pub fuel: Option<ModifierValue>,
    #[serde(default)]
    pub irr: Option<ModifierValue>,
    #[serde(default)]
    pub enclosed_flat: Option<ModifierValue>,
    #[serde(default)]
    pub enclosed_percent: Option<ModifierValue>,
    #[serde(default)]
    pub discount: Option<ModifierValue>,
    #[serde(default)]
    pub oversize: Option<OversizeTable>,
    #[serde(default)]
    pub routes: Vec<RouteModifier>,
    #[serde(default)]
    pub states: HashMap<String, StateModifier>,
    #[serde(default)]
    pub vehicles: Vec<VehicleModifier>,
    #[serde(default)]
    pub service_levels: ServiceLevels,
}

impl ModifierSet {
    /// Sum of every route modifier matching the state pair exactly
    pub fn route_total(&self, origin_state: &str, dest_state: &str, base: Decimal) -> Decimal {
        self.routes
            .iter()
            .filter(|r| {
                r.origin_state.eq_ignore_ascii_case(origin_state)
                    && r.dest_state.eq_ignore_ascii_case(dest_state)
            })
            .map(|r| r.modifier.apply(base))
            .sum()
    }

    /// Origin applies on Outbound/Both, destination on Inbound/Both.
    /// The destination is skipped for intrastate moves so a state is not counted twice.
    pub fn state_total(&self, origin_state: &str, dest_state: &str, base: Decimal) -> Decimal {
        let mut total = Decimal::ZERO;

        if let Some(origin) = self.find_state(origin_state) {
            if origin.direction.applies_outbound() {
                total += origin.modifier.apply(base);
            }
        }

        if !origin_state.eq_ignore_ascii_case(dest_state) {
            if let Some(dest) = self.find_state(dest_state) {
                if dest.direction.applies_inbound() {
                    total += dest.modifier.apply(base);
                }
            }
        }

        total
    }

    /// Sum of every make/model modifier matching the vehicle
    pub fn vehicle_total(&self, vehicle: &ClassifiedVehicle, base: Decimal) -> Decimal {
        self.vehicles
            .iter()
            .filter(|v| vehicle.matches(&v.make, &v.model))
            .map(|v| v.modifier.apply(base))
            .sum()
    }

    fn find_state(&self, code: &str) -> Option<&StateModifier> {
        let code = code.trim();
        self.states.get(code).or_else(|| {
            self.states
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(code))
                .map(|(_, v)| v)
        })
    }
}

/// White-glove pricing: `miles * multiplier`, never below `minimum`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct WhiteGloveSettings {
    #[serde(
        default = "default_white_glove_multiplier",
        deserialize_with = "bounded_amount"
    )]
    pub multiplier: Decimal,
    #[serde(default = "default_white_glove_minimum", deserialize_with = "bounded_amount")]
    pub minimum: Decimal,
}

impl Default for WhiteGloveSettings {
    fn default() -> Self {
        Self {
            multiplier: default_white_glove_multiplier(),
            minimum: default_white_glove_minimum(),
        }
    }
}

impl WhiteGloveSettings {
    pub fn price(&self, miles: Decimal) -> Decimal {
        (miles * self.multiplier).max(self.minimum)
    }
}

fn default_white_glove_multiplier() -> Decimal {
    dec!(2)
}

fn default_white_glove_minimum() -> Decimal {
    dec!(1200)
}

/// Tenant-independent defaults
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct GlobalModifiers {
    #[serde(flatten)]
    pub set: ModifierSet,
    #[serde(default)]
    pub white_glove: WhiteGloveSettings,
}

/// Per-portal overrides
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct TenantModifiers {
    #[serde(flatten)]
    pub set: ModifierSet,
    #[serde(default)]
    pub company_tariff: Option<ModifierValue>,
    #[serde(default)]
    pub company_tariff_discount: Option<ModifierValue>,
    #[serde(default)]
    pub company_tariff_enclosed_fee: Option<ModifierValue>,
    #[serde(default)]
    pub portal_wide_commission: Option<ModifierValue>,
    /// Legacy commission, used only when no portal-wide commission is configured
    #[serde(default)]
    pub fixed_commission: Option<ModifierValue>,
}

impl TenantModifiers {
    /// The active commission modifier: portal-wide first, then the legacy fixed one
    pub fn commission_modifier(&self) -> Option<&ModifierValue> {
        self.portal_wide_commission
            .as_ref()
            .or(self.fixed_commission.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sedan(make: &str, model: &str) -> ClassifiedVehicle {
        ClassifiedVehicle {
            make: make.to_string(),
            model: model.to_string(),
            pricing_class: PricingClass::Sedan,
            is_inoperable: false,
            is_oversize: false,
        }
    }

    #[test]
    fn test_route_total_accumulates_all_matches() {
        let set = ModifierSet {
            routes: vec![
                RouteModifier {
                    origin_state: "CA".into(),
                    dest_state: "NY".into(),
                    modifier: ModifierValue::flat(dec!(100)),
                },
                RouteModifier {
                    origin_state: "CA".into(),
                    dest_state: "NY".into(),
                    modifier: ModifierValue::percentage(dec!(10)),
                },
                RouteModifier {
                    origin_state: "NY".into(),
                    dest_state: "CA".into(),
                    modifier: ModifierValue::flat(dec!(999)),
                },
            ],
            ..Default::default()
        };

        assert_eq!(set.route_total("CA", "NY", dec!(1000)), dec!(200));
        assert_eq!(set.route_total("ca", "ny", dec!(1000)), dec!(200));
        assert_eq!(set.route_total("TX", "NY", dec!(1000)), dec!(0));
    }

    #[test]
    fn test_state_total_respects_direction() {
        let mut states = HashMap::new();
        states.insert(
            "FL".to_string(),
            StateModifier {
                direction: Direction::Outbound,
                modifier: ModifierValue::flat(dec!(50)),
            },
        );
        states.insert(
            "TX".to_string(),
            StateModifier {
                direction: Direction::Inbound,
                modifier: ModifierValue::flat(dec!(30)),
            },
        );
        let set = ModifierSet {
            states,
            ..Default::default()
        };

        assert_eq!(set.state_total("FL", "TX", dec!(1000)), dec!(80));
        // Reversed: FL is inbound (outbound only), TX is origin (inbound only)
        assert_eq!(set.state_total("TX", "FL", dec!(1000)), dec!(0));
    }

    #[test]
    fn test_state_total_skips_destination_for_intrastate() {
        let mut states = HashMap::new();
        states.insert(
            "CA".to_string(),
            StateModifier {
                direction: Direction::Both,
                modifier: ModifierValue::flat(dec!(40)),
            },
        );
        let set = ModifierSet {
            states,
            ..Default::default()
        };

        assert_eq!(set.state_total("CA", "CA", dec!(1000)), dec!(40));
        assert_eq!(set.state_total("CA", "NV", dec!(1000)), dec!(40));
        assert_eq!(set.state_total("NV", "CA", dec!(1000)), dec!(40));
    }

    #[test]
    fn test_vehicle_total_matches_make_and_model() {
        let set = ModifierSet {
            vehicles: vec![
                VehicleModifier {
                    make: "Tesla".into(),
                    model: "Model S".into(),
                    modifier: ModifierValue::flat(dec!(75)),
                },
                VehicleModifier {
                    make: "tesla".into(),
                    model: "model s".into(),
                    modifier: ModifierValue::flat(dec!(25)),
                },
                VehicleModifier {
                    make: "Tesla".into(),
                    model: "Model 3".into(),
                    modifier: ModifierValue::flat(dec!(500)),
                },
            ],
            ..Default::default()
        };

        assert_eq!(set.vehicle_total(&sedan("Tesla", "Model S"), dec!(1000)), dec!(100));
        assert_eq!(set.vehicle_total(&sedan("Ford", "Focus"), dec!(1000)), dec!(0));
    }

    #[test]
    fn test_oversize_table_lookup() {
        let table = OversizeTable {
            suv: Some(dec!(150)),
            van: None,
            pickup_2_door: Some(dec!(200)),
            pickup_4_door: Some(dec!(250)),
            sedan: None,
            default: Some(dec!(100)),
            kind: ModifierKind::Flat,
        };

        assert_eq!(table.modifier_for(PricingClass::Suv).unwrap().value, dec!(150));
        assert_eq!(table.modifier_for(PricingClass::Van).unwrap().value, dec!(100));
        assert_eq!(table.modifier_for(PricingClass::Other).unwrap().value, dec!(100));
        assert!(table.modifier_for(PricingClass::Sedan).is_none());

        let with_sedan = OversizeTable {
            sedan: Some(dec!(40)),
            ..table
        };
        assert_eq!(with_sedan.modifier_for(PricingClass::Sedan).unwrap().value, dec!(40));
    }

    #[test]
    fn test_service_levels_skip_unknown_tiers() {
        let levels: ServiceLevels = serde_json::from_str(
            r#"[
                {"tier": 1, "value": 300},
                {"tier": "3", "value": 150},
                {"tier": "express", "value": 999},
                {"tier": 7, "value": 0}
            ]"#,
        )
        .unwrap();

        assert_eq!(levels.get(Tier::One).unwrap().value, dec!(300));
        assert_eq!(levels.get(Tier::Three).unwrap().value, dec!(150));
        assert!(levels.get(Tier::Five).is_none());
        assert_eq!(levels.get(Tier::Seven).unwrap().value, dec!(0));
    }

    #[test]
    fn test_white_glove_defaults_and_floor() {
        let wg = WhiteGloveSettings::default();
        assert_eq!(wg.multiplier, dec!(2));
        assert_eq!(wg.minimum, dec!(1200));
        assert_eq!(wg.price(dec!(100)), dec!(1200));
        assert_eq!(wg.price(dec!(1000)), dec!(2000));
    }

    #[test]
    fn test_commission_modifier_prefers_portal_wide() {
        let mut tenant = TenantModifiers {
            fixed_commission: Some(ModifierValue::flat(dec!(20))),
            ..Default::default()
        };
        assert_eq!(tenant.commission_modifier().unwrap().value, dec!(20));

        tenant.portal_wide_commission = Some(ModifierValue::flat(dec!(35)));
        assert_eq!(tenant.commission_modifier().unwrap().value, dec!(35));
    }

    #[test]
    fn test_global_document_from_toml() {
        let doc = r#"
            inoperable = { value = 150 }
            discount = { value = -2, kind = "percentage" }

            [white_glove]
            minimum = 1500

            [[routes]]
            origin_state = "CA"
            dest_state = "NY"
            value = 120

            [states.FL]
            direction = "outbound"
            value = 60

            [[service_levels]]
            tier = 1
            value = 400
        "#;
        let global: GlobalModifiers = toml::from_str(doc).unwrap();

        assert_eq!(global.set.inoperable.unwrap().value, dec!(150));
        assert_eq!(global.set.discount.unwrap().kind, ModifierKind::Percentage);
        assert_eq!(global.white_glove.minimum, dec!(1500));
        assert_eq!(global.white_glove.multiplier, dec!(2));
        assert_eq!(global.set.routes.len(), 1);
        assert_eq!(global.set.states["FL"].direction, Direction::Outbound);
        assert_eq!(global.set.service_levels.get(Tier::One).unwrap().value, dec!(400));
    }
}
