use serde::{Deserialize, Serialize};
use std::fmt;

/// Delivery speed level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    One,
    Three,
    Five,
    Seven,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::One, Tier::Three, Tier::Five, Tier::Seven];

    /// Position in tier-indexed arrays
    pub fn index(self) -> usize {
        match self {
            Tier::One => 0,
            Tier::Three => 1,
            Tier::Five => 2,
            Tier::Seven => 3,
        }
    }

    pub fn days(self) -> u8 {
        match self {
            Tier::One => 1,
            Tier::Three => 3,
            Tier::Five => 5,
            Tier::Seven => 7,
        }
    }

    fn from_days(days: i64) -> Option<Self> {
        match days {
            1 => Some(Tier::One),
            3 => Some(Tier::Three),
            5 => Some(Tier::Five),
            7 => Some(Tier::Seven),
            _ => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-day", self.days())
    }
}

/// Tier identifier as it appears in stored documents: `1`, `"1"`, `"one"`, `"1-day"`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TierKey {
    Number(i64),
    Text(String),
}

impl TierKey {
    pub fn parse(&self) -> Option<Tier> {
        match self {
            TierKey::Number(n) => Tier::from_days(*n),
            TierKey::Text(s) => {
                let s = s.trim().to_ascii_lowercase();
                let s = s
                    .strip_suffix("-day")
                    .or_else(|| s.strip_suffix("day"))
                    .unwrap_or(&s)
                    .trim();
                match s {
                    "one" => Some(Tier::One),
                    "three" => Some(Tier::Three),
                    "five" => Some(Tier::Five),
                    "seven" => Some(Tier::Seven),
                    other => other.parse::<i64>().ok().and_then(Tier::from_days),
                }
            }
        }
    }
}

impl From<Tier> for TierKey {
    fn from(tier: Tier) -> Self {
        TierKey::Number(tier.days() as i64)
    }
}

impl fmt::Display for TierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierKey::Number(n) => write!(f, "{}", n),
            TierKey::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Carrier equipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailerType {
    Open,
    Enclosed,
}

impl TrailerType {
    pub const ALL: [TrailerType; 2] = [TrailerType::Open, TrailerType::Enclosed];

    /// Wire name used by the carrier network
    pub fn as_carrier_str(self) -> &'static str {
        match self {
            TrailerType::Open => "OPEN",
            TrailerType::Enclosed => "ENCLOSED",
        }
    }
}
