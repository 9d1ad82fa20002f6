//! Catalog - Plans and Add-ons
//!
//! The catalog is read-only configuration. Every way of building one runs
//! the validator, so a `Catalog` value always satisfies its invariants.

use once_cell::sync::OnceCell;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{PricingError, PricingResult};
use crate::validation::CatalogValidator;
use crate::{DEFAULT_CURRENCY, ENGINE_VERSION};

const BUILTIN_CATALOG_JSON: &str = include_str!("../catalog/default.json");

static BUILTIN_CATALOG: OnceCell<Arc<Catalog>> = OnceCell::new();

/// Closed set of licensing add-ons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AddonId {
    PaidUsage,
    Allowlisting,
}

impl AddonId {
    pub const ALL: [AddonId; 2] = [AddonId::PaidUsage, AddonId::Allowlisting];

    pub fn as_str(&self) -> &'static str {
        match self {
            AddonId::PaidUsage => "paid-usage",
            AddonId::Allowlisting => "allowlisting",
        }
    }
}

impl fmt::Display for AddonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddonId {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AddonId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| PricingError::AddonNotFound(s.to_string()))
    }
}

/// Billing unit shown next to a price. Has no effect on totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BillingUnit {
    #[serde(alias = "per product")]
    PerItem,
    OneTime,
}

impl BillingUnit {
    pub fn label(&self) -> &'static str {
        match self {
            BillingUnit::PerItem => "per product",
            BillingUnit::OneTime => "one-time",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub blurb: String,
    #[serde(alias = "price")]
    pub base_price: Decimal,
    pub unit: BillingUnit,
    #[serde(default)]
    pub cta_href: String,
    #[serde(default)]
    pub cta_label: String,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Addon {
    pub id: AddonId,
    pub name: String,
    /// Surcharge as a fraction of the base price, e.g. `0.35` for +35%.
    pub pct: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// On-disk shape of a catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_min_version: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub plans: Vec<Plan>,
    pub addons: Vec<Addon>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub faqs: Vec<FaqEntry>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CatalogFile", into = "CatalogFile")]
pub struct Catalog {
    currency: String,
    plans: Vec<Plan>,
    addons: Vec<Addon>,
    faqs: Vec<FaqEntry>,
}

impl Catalog {
    pub fn new(
        currency: impl Into<String>,
        plans: Vec<Plan>,
        addons: Vec<Addon>,
        faqs: Vec<FaqEntry>,
    ) -> PricingResult<Self> {
        let catalog = Self {
            currency: currency.into(),
            plans,
            addons,
            faqs,
        };

        let report = CatalogValidator::new().validate(&catalog);
        for violation in report.warnings() {
            warn!(
                rule = %violation.rule,
                subject = %violation.subject,
                "{}",
                violation.message
            );
        }
        if !report.valid {
            return Err(PricingError::InvalidCatalog(report.error_summary()));
        }

        debug!(
            plans = catalog.plans.len(),
            addons = catalog.addons.len(),
            currency = %catalog.currency,
            "catalog ready"
        );
        Ok(catalog)
    }

    pub fn from_json_str(json: &str) -> PricingResult<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Catalog::try_from(file)
    }

    pub fn load_from_file(path: &Path) -> PricingResult<Self> {
        let content = fs::read_to_string(path)?;
        debug!(path = %path.display(), "loading catalog");
        Self::from_json_str(&content)
    }

    /// The catalog compiled into the crate, parsed on first use.
    pub fn builtin() -> PricingResult<&'static Catalog> {
        Ok(Self::builtin_shared()?.as_ref())
    }

    /// Shared handle to the embedded catalog. Every call returns the same allocation.
    pub fn builtin_shared() -> PricingResult<&'static Arc<Catalog>> {
        BUILTIN_CATALOG.get_or_try_init(|| Self::from_json_str(BUILTIN_CATALOG_JSON).map(Arc::new))
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn list_plans(&self) -> &[Plan] {
        &self.plans
    }

    pub fn list_addons(&self) -> &[Addon] {
        &self.addons
    }

    pub fn list_faqs(&self) -> &[FaqEntry] {
        &self.faqs
    }

    pub fn get_plan(&self, id: &str) -> PricingResult<&Plan> {
        self.plans
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| PricingError::PlanNotFound(id.to_string()))
    }

    pub fn get_addon(&self, id: &str) -> PricingResult<&Addon> {
        let addon_id: AddonId = id.parse()?;
        self.addons
            .iter()
            .find(|a| a.id == addon_id)
            .ok_or_else(|| PricingError::AddonNotFound(id.to_string()))
    }
}

impl TryFrom<CatalogFile> for Catalog {
    type Error = PricingError;

    fn try_from(file: CatalogFile) -> Result<Self, Self::Error> {
        if let Some(required) = &file.engine_min_version {
            check_engine_version(required)?;
        }
        Catalog::new(file.currency, file.plans, file.addons, file.faqs)
    }
}

impl From<Catalog> for CatalogFile {
    fn from(catalog: Catalog) -> Self {
        Self {
            engine_min_version: None,
            currency: catalog.currency,
            plans: catalog.plans,
            addons: catalog.addons,
            faqs: catalog.faqs,
        }
    }
}

fn check_engine_version(required: &str) -> PricingResult<()> {
    let engine_ver = semver::Version::parse(ENGINE_VERSION)
        .map_err(|_| PricingError::InvalidCatalog("Invalid engine version".into()))?;
    let min_ver = semver::Version::parse(required).map_err(|_| {
        PricingError::InvalidCatalog(format!("Invalid engineMinVersion: {}", required))
    })?;

    if engine_ver < min_ver {
        return Err(PricingError::EngineVersionMismatch {
            required: required.to_string(),
            current: ENGINE_VERSION.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_matches_site() {
        let catalog = Catalog::builtin().unwrap();
        let ids: Vec<_> = catalog.list_plans().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["ad-kit", "pdp-pack"]);
        assert_eq!(catalog.get_plan("ad-kit").unwrap().base_price, Decimal::from(420));
        assert_eq!(catalog.get_plan("pdp-pack").unwrap().base_price, Decimal::from(260));
        assert_eq!(catalog.get_addon("paid-usage").unwrap().pct, Decimal::new(35, 2));
        assert_eq!(catalog.get_addon("allowlisting").unwrap().pct, Decimal::new(15, 2));
        assert_eq!(catalog.currency(), "USD");
        assert_eq!(catalog.list_faqs().len(), 9);
    }

    #[test]
    fn test_get_addon_not_found() {
        let catalog = Catalog::builtin().unwrap();
        let err = catalog.get_addon("rush-delivery").unwrap_err();
        assert!(matches!(err, PricingError::AddonNotFound(id) if id == "rush-delivery"));
    }

    #[test]
    fn test_addon_missing_from_catalog_is_not_found() {
        let catalog = Catalog::new(
            "USD",
            vec![],
            vec![Addon {
                id: AddonId::PaidUsage,
                name: "Paid Usage".into(),
                pct: Decimal::new(35, 2),
                description: None,
            }],
            vec![],
        )
        .unwrap();
        assert!(catalog.get_addon("paid-usage").is_ok());
        assert!(matches!(
            catalog.get_addon("allowlisting"),
            Err(PricingError::AddonNotFound(_))
        ));
    }

    #[test]
    fn test_legacy_unit_label_and_price_alias() {
        let json = r#"{
            "plans": [{"id": "p", "name": "P", "price": 99.5, "unit": "per product"}],
            "addons": []
        }"#;
        let catalog = Catalog::from_json_str(json).unwrap();
        let plan = catalog.get_plan("p").unwrap();
        assert_eq!(plan.unit, BillingUnit::PerItem);
        assert_eq!(plan.base_price, Decimal::new(995, 1));
        assert_eq!(catalog.currency(), DEFAULT_CURRENCY);
    }

    #[test]
    fn test_engine_version_mismatch() {
        let json = r#"{"engineMinVersion": "99.0.0", "plans": [], "addons": []}"#;
        let err = Catalog::from_json_str(json).unwrap_err();
        assert!(matches!(err, PricingError::EngineVersionMismatch { .. }));
        assert!(err.to_string().contains("requires engine >= 99.0.0"));
    }

    #[test]
    fn test_catalog_round_trips_through_file_shape() {
        let catalog = Catalog::builtin().unwrap();
        let json = serde_json::to_string(catalog).unwrap();
        let reloaded = Catalog::from_json_str(&json).unwrap();
        assert_eq!(&reloaded, catalog);
    }
}
