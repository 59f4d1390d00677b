use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::models::bounded_amount;

/// How a modifier's value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierKind {
    /// Fixed currency amount, independent of the base
    #[default]
    Flat,
    /// Percent of the base, rounded up to the next whole unit
    Percentage,
}

/// A configured surcharge or discount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ModifierValue {
    #[serde(deserialize_with = "bounded_amount")]
    pub value: Decimal,
    #[serde(default)]
    pub kind: ModifierKind,
}

impl ModifierValue {
    pub fn flat(value: Decimal) -> Self {
        Self {
            value,
            kind: ModifierKind::Flat,
        }
    }

    pub fn percentage(value: Decimal) -> Self {
        Self {
            value,
            kind: ModifierKind::Percentage,
        }
    }

    /// Amount this modifier contributes on top of `base`
    pub fn apply(&self, base: Decimal) -> Decimal {
        match self.kind {
            ModifierKind::Flat => self.value,
            ModifierKind::Percentage => (base * self.value / Decimal::ONE_HUNDRED).ceil(),
        }
    }
}

/// Apply an optional modifier; an unset modifier contributes nothing
pub fn apply_optional(modifier: Option<&ModifierValue>, base: Decimal) -> Decimal {
    modifier.map_or(Decimal::ZERO, |m| m.apply(base))
}

/// Currency rounding used for every emitted amount: half away from zero, 2 places
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
