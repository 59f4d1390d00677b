use rust_decimal::Decimal;
use tracing::warn;

use super::modifier::round_currency;
use super::models::{QuoteModifierSummary, QuoteTotalPricing, QuotedVehicle, TierAmount, VehiclePricing};
use super::tier::TierKey;

/// Combine the priced vehicles of a quote into quote-level totals.
///
/// Vehicles without pricing are ignored. Service levels are taken from the first priced
/// vehicle and scaled by the number of priced vehicles; company tariffs are reported as
/// the first priced vehicle's values. IRR and fuel are not summarized at quote level.
pub fn aggregate(vehicles: &[QuotedVehicle]) -> QuoteTotalPricing {
    let priced: Vec<&VehiclePricing> = vehicles.iter().filter_map(|v| v.pricing.as_ref()).collect();

    let Some(first) = priced.first() else {
        return QuoteTotalPricing::default();
    };

    let mut result = QuoteTotalPricing::default();
    for pricing in &priced {
        result.totals += &pricing.totals;

        let m = &pricing.modifiers;
        let summary = &mut result.modifiers;
        summary.inoperable += m.inoperable;
        summary.routes += m.routes;
        summary.states += m.states;
        summary.oversize += m.oversize;
        summary.vehicles += m.vehicles;
        summary.global_discount += m.global_discount;
        summary.portal_discount += m.portal_discount;
        summary.enclosed_flat += m.enclosed_flat;
        summary.enclosed_percent += m.enclosed_percent;
        summary.commission += m.commission;
    }

    let count = Decimal::from(priced.len());
    result.modifiers.service_levels = recognized(&first.modifiers.service_levels)
        .map(|amount| TierAmount {
            tier: amount.tier.clone(),
            value: round_currency(amount.value * count),
        })
        .collect();
    result.modifiers.company_tariffs = recognized(&first.modifiers.company_tariffs)
        .cloned()
        .collect();

    result
}

fn recognized(amounts: &[TierAmount]) -> impl Iterator<Item = &TierAmount> {
    amounts.iter().filter(|amount| {
        let known = amount.tier.parse().is_some();
        if !known {
            warn!(tier = %amount.tier, "Skipping tier amount with unrecognized tier");
        }
        known
    })
}

impl QuoteModifierSummary {
    /// Amount recorded for `tier` in the summarized service levels
    pub fn service_level(&self, tier: &TierKey) -> Option<Decimal> {
        let wanted = tier.parse()?;
        self.service_levels
            .iter()
            .find(|amount| amount.tier.parse() == Some(wanted))
            .map(|amount| amount.value)
    }
}
