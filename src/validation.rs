//! Catalog Validation - Rule/Policy Separation
//!
//! Rules produce structured violations.
//! Policy: errors reject the catalog, warnings are logged.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::catalog::Catalog;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    /// Plan id, add-on id, or field the violation refers to.
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub violations: Vec<CatalogViolation>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == ViolationSeverity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &CatalogViolation> {
        self.violations.iter().filter(|v| v.severity == ViolationSeverity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &CatalogViolation> {
        self.violations.iter().filter(|v| v.severity == ViolationSeverity::Warning)
    }

    pub fn error_summary(&self) -> String {
        self.errors()
            .map(|v| format!("{} ({}): {}", v.rule, v.subject, v.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Catalog rule trait - produces violations
pub trait CatalogRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn check(&self, catalog: &Catalog) -> Vec<CatalogViolation>;
}

fn violation(
    rule: &dyn CatalogRule,
    severity: ViolationSeverity,
    subject: impl Into<String>,
    message: impl Into<String>,
) -> CatalogViolation {
    CatalogViolation {
        rule: rule.name().to_string(),
        severity,
        subject: subject.into(),
        message: message.into(),
    }
}

// --- Concrete Rules ---

pub struct BasePriceRule;

impl CatalogRule for BasePriceRule {
    fn name(&self) -> &'static str { "base_price" }

    fn check(&self, catalog: &Catalog) -> Vec<CatalogViolation> {
        catalog
            .list_plans()
            .iter()
            .filter(|p| p.base_price.is_sign_negative() && !p.base_price.is_zero())
            .map(|p| {
                violation(
                    self,
                    ViolationSeverity::Error,
                    &p.id,
                    format!("Base price must not be negative, got {}", p.base_price),
                )
            })
            .collect()
    }
}

pub struct AddonRateRule;

impl CatalogRule for AddonRateRule {
    fn name(&self) -> &'static str { "addon_rate" }

    fn check(&self, catalog: &Catalog) -> Vec<CatalogViolation> {
        catalog
            .list_addons()
            .iter()
            .filter(|a| a.pct <= Decimal::ZERO || a.pct > Decimal::ONE)
            .map(|a| {
                violation(
                    self,
                    ViolationSeverity::Error,
                    a.id.as_str(),
                    format!("Surcharge rate must be in (0, 1], got {}", a.pct),
                )
            })
            .collect()
    }
}

pub struct UniqueIdsRule;

impl CatalogRule for UniqueIdsRule {
    fn name(&self) -> &'static str { "unique_ids" }

    fn check(&self, catalog: &Catalog) -> Vec<CatalogViolation> {
        let mut violations = vec![];

        let mut seen_plans = HashSet::new();
        for plan in catalog.list_plans() {
            if !seen_plans.insert(plan.id.as_str()) {
                violations.push(violation(
                    self,
                    ViolationSeverity::Error,
                    &plan.id,
                    "Duplicate plan id",
                ));
            }
        }

        let mut seen_addons = HashSet::new();
        for addon in catalog.list_addons() {
            if !seen_addons.insert(addon.id) {
                violations.push(violation(
                    self,
                    ViolationSeverity::Error,
                    addon.id.as_str(),
                    "Duplicate add-on id",
                ));
            }
        }

        violations
    }
}

pub struct CurrencyCodeRule;

impl CatalogRule for CurrencyCodeRule {
    fn name(&self) -> &'static str { "currency_code" }

    fn check(&self, catalog: &Catalog) -> Vec<CatalogViolation> {
        let code = catalog.currency();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            vec![]
        } else {
            vec![violation(
                self,
                ViolationSeverity::Error,
                "currency",
                format!("Currency must be a three-letter code, got {:?}", code),
            )]
        }
    }
}

pub struct EmptyCatalogRule;

impl CatalogRule for EmptyCatalogRule {
    fn name(&self) -> &'static str { "empty_catalog" }

    fn check(&self, catalog: &Catalog) -> Vec<CatalogViolation> {
        if catalog.list_plans().is_empty() {
            vec![violation(
                self,
                ViolationSeverity::Warning,
                "plans",
                "Catalog has no plans; offer listings cannot be built",
            )]
        } else {
            vec![]
        }
    }
}

pub struct CallToActionRule;

impl CatalogRule for CallToActionRule {
    fn name(&self) -> &'static str { "call_to_action" }

    fn check(&self, catalog: &Catalog) -> Vec<CatalogViolation> {
        catalog
            .list_plans()
            .iter()
            .filter(|p| p.cta_href.trim().is_empty())
            .map(|p| {
                violation(
                    self,
                    ViolationSeverity::Warning,
                    &p.id,
                    "Plan has no call-to-action destination",
                )
            })
            .collect()
    }
}

/// Validator orchestrates rules and applies policy
pub struct CatalogValidator {
    rules: Vec<Box<dyn CatalogRule>>,
}

impl CatalogValidator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(BasePriceRule),
                Box::new(AddonRateRule),
                Box::new(UniqueIdsRule),
                Box::new(CurrencyCodeRule),
                Box::new(EmptyCatalogRule),
                Box::new(CallToActionRule),
            ],
        }
    }

    pub fn validate(&self, catalog: &Catalog) -> ValidationReport {
        let violations: Vec<_> = self
            .rules
            .iter()
            .flat_map(|rule| rule.check(catalog))
            .collect();

        let valid = !violations.iter().any(|v| v.severity == ViolationSeverity::Error);
        ValidationReport { valid, violations }
    }
}

impl Default for CatalogValidator {
    fn default() -> Self {
        Self::new()
    }
}
