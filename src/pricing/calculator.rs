//! Per-vehicle price layering
//!
//! [`RatingStrategy::Standard`] stacks the configured modifiers on the carrier base and
//! prices each tier and trailer type separately. [`RatingStrategy::JkSplit`] splits the
//! base into a company tariff and a carrier share and prices every tier identically.

use rust_decimal::Decimal;
use std::fmt;

use super::modifier::{apply_optional, round_currency, ModifierValue};
use super::modifier_set::{ModifierSet, ServiceLevels, TenantModifiers};
use super::models::{PriceLeaf, TierAmount, Totals, VehicleModifiers, VehiclePricing};
use super::store::ModifierSnapshot;
use super::tenant::{JkSettings, RateSource, Tenant};
use super::tier::{Tier, TierKey, TrailerType};
use super::vehicle::ClassifiedVehicle;

/// Whole-vehicle pricing algorithm, chosen once per tenant
#[derive(Debug, Clone, PartialEq)]
pub enum RatingStrategy {
    Standard,
    JkSplit(JkSettings),
}

impl RatingStrategy {
    pub fn for_tenant(tenant: &Tenant) -> Self {
        match tenant.rate_source {
            RateSource::Jk => RatingStrategy::JkSplit(tenant.jk.clone().unwrap_or_default()),
            RateSource::External | RateSource::Custom => RatingStrategy::Standard,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RatingStrategy::Standard => "standard",
            RatingStrategy::JkSplit(_) => "jk_split",
        }
    }

    pub fn price_vehicle(
        &self,
        snapshot: &ModifierSnapshot,
        tenant: &Tenant,
        input: &VehicleInput<'_>,
    ) -> VehiclePricing {
        match self {
            RatingStrategy::Standard => price_standard(snapshot, tenant, input),
            RatingStrategy::JkSplit(jk) => price_jk_split(snapshot, tenant, jk, input),
        }
    }
}

impl fmt::Display for RatingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Everything a strategy needs about one vehicle of the quote
#[derive(Debug, Clone)]
pub struct VehicleInput<'a> {
    pub vehicle: &'a ClassifiedVehicle,
    pub base: Decimal,
    pub miles: Decimal,
    pub origin_state: &'a str,
    pub dest_state: &'a str,
    pub commission: Decimal,
}

fn price_standard(
    snapshot: &ModifierSnapshot,
    tenant: &Tenant,
    input: &VehicleInput<'_>,
) -> VehiclePricing {
    let global = &snapshot.global.set;
    let portal = snapshot.tenant.as_ref();
    let portal_set = portal.map(|t| &t.set);
    let base = input.base;

    let global_discount = apply_optional(global.discount.as_ref(), base);
    let portal_discount = apply_optional(portal_set.and_then(|s| s.discount.as_ref()), base);

    let inoperable = if input.vehicle.is_inoperable {
        apply_optional(global.inoperable.as_ref(), base)
    } else {
        Decimal::ZERO
    };

    // Reported in the breakdown, never charged
    let oversize = oversize_charge(snapshot, tenant, input.vehicle, base);

    let enclosed_flat = apply_optional(global.enclosed_flat.as_ref(), base);
    let enclosed_percent = apply_optional(global.enclosed_percent.as_ref(), base);

    let routes = sum_scopes(global, portal_set, |set| {
        set.route_total(input.origin_state, input.dest_state, base)
    });
    let states = sum_scopes(global, portal_set, |set| {
        set.state_total(input.origin_state, input.dest_state, base)
    });
    let vehicles = sum_scopes(global, portal_set, |set| {
        set.vehicle_total(input.vehicle, base)
    });

    let irr = apply_optional(
        portal_set.and_then(|s| s.irr.as_ref()).or(global.irr.as_ref()),
        base,
    );
    let fuel = apply_optional(
        portal_set.and_then(|s| s.fuel.as_ref()).or(global.fuel.as_ref()),
        base,
    );

    let service_levels = effective_service_levels(global, portal_set);

    let commission =
        input.commission + apply_optional(portal.and_then(|t| t.commission_modifier()), base);

    let modified_base = base
        + inoperable
        + routes
        + states
        + vehicles
        + global_discount
        + portal_discount
        + irr
        + fuel;

    let mut totals = Totals {
        white_glove: round_currency(white_glove(snapshot, tenant, input.miles)),
        ..Default::default()
    };
    let mut service_level_amounts = Vec::with_capacity(Tier::ALL.len());
    let mut company_tariffs = Vec::with_capacity(Tier::ALL.len());

    for tier in Tier::ALL {
        let service_level = apply_optional(service_levels.get(tier), base);
        service_level_amounts.push(TierAmount {
            tier: TierKey::from(tier),
            value: round_currency(service_level),
        });

        for trailer in TrailerType::ALL {
            let mut with_modifiers = modified_base + service_level;
            if trailer == TrailerType::Enclosed {
                with_modifiers += enclosed_flat + enclosed_percent;
            }

            let tariff = company_tariff(portal, with_modifiers, trailer);
            let leaf = PriceLeaf::new(with_modifiers, tariff, commission);

            if trailer == TrailerType::Open {
                company_tariffs.push(TierAmount {
                    tier: TierKey::from(tier),
                    value: leaf.company_tariff,
                });
            }
            *totals.tier_mut(tier).get_mut(trailer) = leaf;
        }
    }

    VehiclePricing {
        base: round_currency(base),
        modifiers: VehicleModifiers {
            inoperable: round_currency(inoperable),
            routes: round_currency(routes),
            states: round_currency(states),
            oversize: round_currency(oversize),
            vehicles: round_currency(vehicles),
            global_discount: round_currency(global_discount),
            portal_discount: round_currency(portal_discount),
            irr: round_currency(irr),
            fuel: round_currency(fuel),
            enclosed_flat: round_currency(enclosed_flat),
            enclosed_percent: round_currency(enclosed_percent),
            commission: round_currency(commission),
            service_levels: service_level_amounts,
            company_tariffs,
        },
        totals,
    }
}

fn price_jk_split(
    snapshot: &ModifierSnapshot,
    tenant: &Tenant,
    jk: &JkSettings,
    input: &VehicleInput<'_>,
) -> VehiclePricing {
    let base = input.base;
    let portal = snapshot.tenant.as_ref();

    let gross_tariff = (base * jk.tariff_percent).floor();
    let mc_base = base - gross_tariff;

    let class_surcharge = jk.surcharges.for_class(input.vehicle.pricing_class);
    let carrier_base = mc_base + class_surcharge;

    let inoperable = if input.vehicle.is_inoperable {
        apply_optional(snapshot.global.set.inoperable.as_ref(), carrier_base)
    } else {
        Decimal::ZERO
    };

    let company_tariff = match jk.fixed_discount {
        Some(discount) => (gross_tariff - discount).max(Decimal::ZERO),
        None => gross_tariff,
    };

    let commission =
        input.commission + apply_optional(portal.and_then(|t| t.fixed_commission.as_ref()), mc_base);

    let enclosed_flat = jk.enclosed_surcharge(input.miles);
    // Reported in the breakdown, never charged
    let enclosed_percent = jk
        .enclosed_modifier
        .map_or(Decimal::ZERO, |pct| ModifierValue::percentage(pct).apply(mc_base));

    let open_total = carrier_base + inoperable;
    let open = PriceLeaf::new(open_total, company_tariff, commission);
    let enclosed = PriceLeaf::new(open_total + enclosed_flat, company_tariff, commission);

    let mut totals = Totals {
        white_glove: round_currency(white_glove(snapshot, tenant, input.miles)),
        ..Default::default()
    };
    for tier in Tier::ALL {
        let trailers = totals.tier_mut(tier);
        trailers.open = open;
        trailers.enclosed = enclosed;
    }

    VehiclePricing {
        base: round_currency(base),
        modifiers: VehicleModifiers {
            inoperable: round_currency(inoperable),
            oversize: round_currency(class_surcharge),
            enclosed_flat: round_currency(enclosed_flat),
            enclosed_percent: round_currency(enclosed_percent),
            commission: round_currency(commission),
            service_levels: Tier::ALL
                .iter()
                .map(|tier| TierAmount {
                    tier: TierKey::from(*tier),
                    value: Decimal::ZERO,
                })
                .collect(),
            company_tariffs: Tier::ALL
                .iter()
                .map(|tier| TierAmount {
                    tier: TierKey::from(*tier),
                    value: open.company_tariff,
                })
                .collect(),
            ..Default::default()
        },
        totals,
    }
}

/// Oversize vehicles are priced from the tenant table when the tenant uses custom
/// rates and has one, otherwise from the global table
fn oversize_charge(
    snapshot: &ModifierSnapshot,
    tenant: &Tenant,
    vehicle: &ClassifiedVehicle,
    base: Decimal,
) -> Decimal {
    if !vehicle.is_oversize {
        return Decimal::ZERO;
    }

    let tenant_table = if tenant.uses_custom_rates() {
        snapshot.tenant.as_ref().and_then(|t| t.set.oversize.as_ref())
    } else {
        None
    };
    let table = tenant_table.or(snapshot.global.set.oversize.as_ref());

    table
        .and_then(|t| t.modifier_for(vehicle.pricing_class))
        .map_or(Decimal::ZERO, |m| m.apply(base))
}

fn company_tariff(portal: Option<&TenantModifiers>, with_modifiers: Decimal, trailer: TrailerType) -> Decimal {
    let Some(portal) = portal else {
        return Decimal::ZERO;
    };

    let tariff_base = with_modifiers
        + apply_optional(portal.company_tariff_discount.as_ref(), with_modifiers);
    let mut tariff = apply_optional(portal.company_tariff.as_ref(), tariff_base);

    if trailer == TrailerType::Enclosed {
        tariff += apply_optional(portal.company_tariff_enclosed_fee.as_ref(), with_modifiers);
    }
    tariff
}

fn white_glove(snapshot: &ModifierSnapshot, tenant: &Tenant, miles: Decimal) -> Decimal {
    tenant
        .white_glove_override(miles)
        .unwrap_or_else(|| snapshot.global.white_glove.price(miles))
}

fn sum_scopes<F>(global: &ModifierSet, portal: Option<&ModifierSet>, f: F) -> Decimal
where
    F: Fn(&ModifierSet) -> Decimal,
{
    f(global) + portal.map_or(Decimal::ZERO, &f)
}

/// Tenant service levels replace the global ones when the tenant defines any
fn effective_service_levels<'a>(
    global: &'a ModifierSet,
    portal: Option<&'a ModifierSet>,
) -> &'a ServiceLevels {
    match portal {
        Some(set) if !set.service_levels.is_empty() => &set.service_levels,
        _ => &global.service_levels,
    }
}
