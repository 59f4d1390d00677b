//! Modifier, tenant and vehicle reference data
//!
//! The [`Catalog`] is the TOML-backed implementation of every lookup trait the engine
//! consumes. It is loaded at startup and swapped atomically on reload.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

use super::modifier_set::{GlobalModifiers, TenantModifiers};
use super::models::MAX_AMOUNT;
use super::rate::MileageBand;
use super::tenant::Tenant;
use super::vehicle::{InMemoryVehicleCatalog, PricingClass, VehicleCatalog};
use crate::error::AppError;

/// Source of global and per-tenant modifier documents
#[async_trait]
pub trait ModifierStore: Send + Sync {
    async fn find_global(&self) -> Result<Option<GlobalModifiers>, AppError>;

    async fn find_for_tenant(&self, tenant_id: &str) -> Result<Option<TenantModifiers>, AppError>;
}

/// Source of tenant pricing profiles
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    async fn find_tenant(&self, tenant_id: &str) -> Result<Option<Tenant>, AppError>;
}

/// Modifier documents in effect for one calculation
#[derive(Debug, Clone, Default)]
pub struct ModifierSnapshot {
    pub global: GlobalModifiers,
    /// Absent tenant documents contribute nothing
    pub tenant: Option<TenantModifiers>,
}

impl ModifierSnapshot {
    /// Fetch both scopes concurrently. A missing global document aborts the calculation.
    pub async fn load(store: &dyn ModifierStore, tenant_id: &str) -> Result<Self, AppError> {
        let (global, tenant) =
            tokio::try_join!(store.find_global(), store.find_for_tenant(tenant_id))?;

        let global = global.ok_or(AppError::MissingGlobalModifiers)?;
        if tenant.is_none() {
            debug!(tenant = %tenant_id, "No tenant modifiers configured");
        }

        Ok(Self { global, tenant })
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    global: Option<GlobalModifiers>,
    #[serde(default)]
    tenants: Vec<TenantEntry>,
    #[serde(default)]
    vehicles: Vec<VehicleReference>,
}

#[derive(Debug, Clone, Deserialize)]
struct TenantEntry {
    #[serde(flatten)]
    tenant: Tenant,
    #[serde(default)]
    modifiers: Option<TenantModifiers>,
}

#[derive(Debug, Deserialize)]
struct VehicleReference {
    make: String,
    model: String,
    class: PricingClass,
}

/// In-memory pricing catalog
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    global: Option<GlobalModifiers>,
    tenants: HashMap<String, TenantEntry>,
    vehicles: InMemoryVehicleCatalog,
}

impl Catalog {
    pub fn new(global: GlobalModifiers) -> Self {
        Self {
            global: Some(global),
            ..Default::default()
        }
    }

    pub fn with_tenant(mut self, tenant: Tenant, modifiers: Option<TenantModifiers>) -> Self {
        self.tenants
            .insert(tenant.id.clone(), TenantEntry { tenant, modifiers });
        self
    }

    pub fn with_vehicle(mut self, make: &str, model: &str, class: PricingClass) -> Self {
        self.vehicles.insert(make, model, class);
        self
    }

    pub fn global(&self) -> Option<&GlobalModifiers> {
        self.global.as_ref()
    }

    pub fn tenant(&self, tenant_id: &str) -> Option<&Tenant> {
        self.tenants.get(tenant_id).map(|entry| &entry.tenant)
    }

    /// Tenant ids in sorted order
    pub fn tenant_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.tenants.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    /// Parse and validate a catalog document
    pub fn from_toml_str(content: &str) -> Result<Self, AppError> {
        let file: CatalogFile = toml::from_str(content)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse catalog: {}", e)))?;

        let Some(global) = file.global else {
            return Err(AppError::ConfigError(
                "Catalog must contain a [global] modifier table".to_string(),
            ));
        };

        let mut seen = HashSet::new();
        let mut tenants = HashMap::with_capacity(file.tenants.len());
        for entry in file.tenants {
            validate_tenant(&entry.tenant)?;
            if !seen.insert(entry.tenant.id.clone()) {
                return Err(AppError::ConfigError(format!(
                    "Duplicate tenant id '{}' in catalog",
                    entry.tenant.id
                )));
            }
            tenants.insert(entry.tenant.id.clone(), entry);
        }

        let mut vehicles = InMemoryVehicleCatalog::new();
        for reference in &file.vehicles {
            vehicles.insert(&reference.make, &reference.model, reference.class);
        }

        Ok(Self {
            global: Some(global),
            tenants,
            vehicles,
        })
    }

    /// Read a catalog file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(format!(
                "Failed to read catalog {}: {}",
                path.display(),
                e
            ))
        })?;

        let catalog = Self::from_toml_str(&content)?;
        info!(
            path = %path.display(),
            tenants = catalog.tenants.len(),
            vehicles = catalog.vehicles.len(),
            "Loaded pricing catalog"
        );
        Ok(catalog)
    }
}

fn validate_tenant(tenant: &Tenant) -> Result<(), AppError> {
    if tenant.id.trim().is_empty() {
        return Err(AppError::ConfigError("Tenant id cannot be empty".to_string()));
    }

    validate_bands(&tenant.id, "custom_rates", &tenant.custom_rates)?;

    if let Some(jk) = &tenant.jk {
        if jk.rates.max_rate() > MAX_AMOUNT {
            return Err(AppError::ConfigError(format!(
                "Tenant '{}': jk.rates must not exceed {}",
                tenant.id, MAX_AMOUNT
            )));
        }
        if jk.tariff_percent.is_sign_negative() || jk.tariff_percent > rust_decimal::Decimal::ONE {
            return Err(AppError::ConfigError(format!(
                "Tenant '{}': jk.tariff_percent must be between 0 and 1, got {}",
                tenant.id, jk.tariff_percent
            )));
        }
    }

    Ok(())
}

fn validate_bands(tenant_id: &str, field: &str, bands: &[MileageBand]) -> Result<(), AppError> {
    for band in bands {
        if band.min_miles > band.max_miles {
            return Err(AppError::ConfigError(format!(
                "Tenant '{}': {} band {}-{} has min above max",
                tenant_id, field, band.min_miles, band.max_miles
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl ModifierStore for Catalog {
    async fn find_global(&self) -> Result<Option<GlobalModifiers>, AppError> {
        Ok(self.global.clone())
    }

    async fn find_for_tenant(&self, tenant_id: &str) -> Result<Option<TenantModifiers>, AppError> {
        Ok(self
            .tenants
            .get(tenant_id)
            .and_then(|entry| entry.modifiers.clone()))
    }
}

#[async_trait]
impl TenantDirectory for Catalog {
    async fn find_tenant(&self, tenant_id: &str) -> Result<Option<Tenant>, AppError> {
        Ok(self.tenant(tenant_id).cloned())
    }
}

#[async_trait]
impl VehicleCatalog for Catalog {
    async fn lookup(&self, make: &str, model: &str) -> Option<PricingClass> {
        self.vehicles.lookup(make, model).await
    }
}
