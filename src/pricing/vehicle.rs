use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Vehicle pricing class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingClass {
    #[default]
    Sedan,
    Suv,
    Van,
    #[serde(rename = "pickup_2_door")]
    Pickup2Door,
    #[serde(rename = "pickup_4_door")]
    Pickup4Door,
    /// Anything the reference data names that is not one of the known classes
    Other,
}

impl PricingClass {
    /// Normalize free-form class names: "SUV", "Pickup (4 Doors)", "pickup_2_door", "4-door pickup"
    pub fn normalize(raw: &str) -> Self {
        let key: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match key.as_str() {
            "sedan" | "car" | "coupe" => PricingClass::Sedan,
            "suv" => PricingClass::Suv,
            "van" | "minivan" => PricingClass::Van,
            _ if key.contains("pickup") || key.contains("truck") => {
                if key.contains('4') || key.contains("four") || key.contains("crew") {
                    PricingClass::Pickup4Door
                } else {
                    PricingClass::Pickup2Door
                }
            }
            _ => PricingClass::Other,
        }
    }

    /// Classes that carry an oversize charge by default
    pub fn is_oversize_class(self) -> bool {
        matches!(
            self,
            PricingClass::Suv | PricingClass::Van | PricingClass::Pickup2Door | PricingClass::Pickup4Door
        )
    }

    /// Vehicle type sent to the carrier price-prediction service
    pub fn carrier_type(self) -> &'static str {
        match self {
            PricingClass::Sedan | PricingClass::Other => "sedan",
            PricingClass::Suv => "suv",
            PricingClass::Van => "van",
            PricingClass::Pickup2Door => "pickup_2_doors",
            PricingClass::Pickup4Door => "pickup_4_doors",
        }
    }
}

impl<'de> Deserialize<'de> for PricingClass {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(PricingClass::normalize(&raw))
    }
}

impl fmt::Display for PricingClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PricingClass::Sedan => "sedan",
            PricingClass::Suv => "suv",
            PricingClass::Van => "van",
            PricingClass::Pickup2Door => "pickup_2_door",
            PricingClass::Pickup4Door => "pickup_4_door",
            PricingClass::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Vehicle as supplied by the caller
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub make: String,
    pub model: String,
    #[serde(default)]
    pub pricing_class: Option<PricingClass>,
    #[serde(default)]
    pub is_inoperable: bool,
    #[serde(default)]
    pub is_oversize: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
}

impl Vehicle {
    pub fn new(make: &str, model: &str) -> Self {
        Self {
            make: make.to_string(),
            model: model.to_string(),
            ..Default::default()
        }
    }

    pub fn label(&self) -> String {
        match self.year {
            Some(year) => format!("{} {} {}", year, self.make, self.model),
            None => format!("{} {}", self.make, self.model),
        }
    }
}

/// Vehicle with class and oversize flag resolved, ready for pricing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedVehicle {
    pub make: String,
    pub model: String,
    pub pricing_class: PricingClass,
    pub is_inoperable: bool,
    pub is_oversize: bool,
}

impl ClassifiedVehicle {
    pub fn matches(&self, make: &str, model: &str) -> bool {
        self.make.trim().eq_ignore_ascii_case(make.trim())
            && self.model.trim().eq_ignore_ascii_case(model.trim())
    }
}

/// Make/model reference table
#[async_trait]
pub trait VehicleCatalog: Send + Sync {
    async fn lookup(&self, make: &str, model: &str) -> Option<PricingClass>;
}

/// In-memory reference table keyed by lowercase `make|model`
#[derive(Debug, Clone, Default)]
pub struct InMemoryVehicleCatalog {
    entries: HashMap<String, PricingClass>,
}

impl InMemoryVehicleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, make: &str, model: &str, class: PricingClass) {
        self.entries.insert(catalog_key(make, model), class);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl VehicleCatalog for InMemoryVehicleCatalog {
    async fn lookup(&self, make: &str, model: &str) -> Option<PricingClass> {
        self.entries.get(&catalog_key(make, model)).copied()
    }
}

fn catalog_key(make: &str, model: &str) -> String {
    format!(
        "{}|{}",
        make.trim().to_ascii_lowercase(),
        model.trim().to_ascii_lowercase()
    )
}

/// Resolve the pricing class and oversize flag for a vehicle.
///
/// A class supplied by the caller wins over the reference table. A failed lookup is
/// never fatal: the vehicle falls back to sedan. The oversize flag is only derived
/// when the caller did not set it explicitly.
pub async fn classify(catalog: &dyn VehicleCatalog, vehicle: &Vehicle) -> ClassifiedVehicle {
    let pricing_class = match vehicle.pricing_class {
        Some(class) => class,
        None => match catalog.lookup(&vehicle.make, &vehicle.model).await {
            Some(class) => class,
            None => {
                debug!(
                    make = %vehicle.make,
                    model = %vehicle.model,
                    "Vehicle not found in reference table, defaulting to sedan"
                );
                PricingClass::Sedan
            }
        },
    };

    let is_oversize = vehicle
        .is_oversize
        .unwrap_or_else(|| pricing_class.is_oversize_class());

    ClassifiedVehicle {
        make: vehicle.make.clone(),
        model: vehicle.model.clone(),
        pricing_class,
        is_inoperable: vehicle.is_inoperable,
        is_oversize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> InMemoryVehicleCatalog {
        let mut catalog = InMemoryVehicleCatalog::new();
        catalog.insert("Ford", "F-150", PricingClass::Pickup4Door);
        catalog.insert("Honda", "Odyssey", PricingClass::Van);
        catalog.insert("Toyota", "RAV4", PricingClass::Suv);
        catalog
    }

    #[test]
    fn test_normalize_class_names() {
        assert_eq!(PricingClass::normalize("SUV"), PricingClass::Suv);
        assert_eq!(PricingClass::normalize("Sedan"), PricingClass::Sedan);
        assert_eq!(PricingClass::normalize("Pickup (4 Doors)"), PricingClass::Pickup4Door);
        assert_eq!(PricingClass::normalize("pickup_2_door"), PricingClass::Pickup2Door);
        assert_eq!(PricingClass::normalize("4-door pickup"), PricingClass::Pickup4Door);
        assert_eq!(PricingClass::normalize("mini van"), PricingClass::Van);
        assert_eq!(PricingClass::normalize("motorcycle"), PricingClass::Other);
    }

    #[test]
    fn test_oversize_classes() {
        assert!(!PricingClass::Sedan.is_oversize_class());
        assert!(!PricingClass::Other.is_oversize_class());
        assert!(PricingClass::Suv.is_oversize_class());
        assert!(PricingClass::Pickup2Door.is_oversize_class());
    }

    #[tokio::test]
    async fn test_classify_uses_reference_table() {
        let vehicle = Vehicle::new("ford", " f-150 ");
        let classified = classify(&catalog(), &vehicle).await;
        assert_eq!(classified.pricing_class, PricingClass::Pickup4Door);
        assert!(classified.is_oversize);
    }

    #[tokio::test]
    async fn test_classify_keeps_supplied_values() {
        let vehicle = Vehicle {
            pricing_class: Some(PricingClass::Sedan),
            is_oversize: Some(true),
            ..Vehicle::new("Toyota", "RAV4")
        };
        let classified = classify(&catalog(), &vehicle).await;
        assert_eq!(classified.pricing_class, PricingClass::Sedan);
        assert!(classified.is_oversize);
    }

    #[tokio::test]
    async fn test_classify_lookup_miss_defaults_to_sedan() {
        let vehicle = Vehicle::new("Tesla", "Model 3");
        let classified = classify(&catalog(), &vehicle).await;
        assert_eq!(classified.pricing_class, PricingClass::Sedan);
        assert!(!classified.is_oversize);
    }

    #[tokio::test]
    async fn test_classify_explicit_oversize_false_wins() {
        let vehicle = Vehicle {
            is_oversize: Some(false),
            ..Vehicle::new("Honda", "Odyssey")
        };
        let classified = classify(&catalog(), &vehicle).await;
        assert_eq!(classified.pricing_class, PricingClass::Van);
        assert!(!classified.is_oversize);
    }

    #[test]
    fn test_vehicle_deserializes_camel_case() {
        let vehicle: Vehicle = serde_json::from_str(
            r#"{"make": "Jeep", "model": "Wrangler", "pricingClass": "SUV", "isInoperable": true}"#,
        )
        .unwrap();
        assert_eq!(vehicle.pricing_class, Some(PricingClass::Suv));
        assert!(vehicle.is_inoperable);
        assert_eq!(vehicle.is_oversize, None);
    }
}
