//! Quote Engine
//!
//! `total = basePrice * (1 + sum of selected add-on rates)`, computed in
//! exact decimals and rounded to cents once, half away from zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::catalog::{AddonId, Catalog, Plan};
use crate::error::{PricingError, PricingResult};
use crate::money::Money;

/// Add-on ids chosen for one plan instance.
///
/// Set semantics: toggling or inserting the same id twice has no extra
/// effect, and iteration order is sorted so equal selections compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    ids: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip an add-on on or off. Returns whether it is now selected.
    pub fn toggle(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn set(&mut self, id: impl Into<String>, selected: bool) {
        let id = id.into();
        if selected {
            self.ids.insert(id);
        } else {
            self.ids.remove(&id);
        }
    }

    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.ids.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub plan_id: String,
    /// Sorted, de-duplicated.
    pub selected_addons: Vec<AddonId>,
    pub base_price: Money,
    /// Sum of the selected add-on rates.
    pub surcharge_rate: Decimal,
    pub total: Money,
    pub currency: String,
    pub formatted_total: String,
    pub fingerprint: String,
}

/// Resolve every id against the catalog. Fails on the first unknown id.
pub(crate) fn resolve_addons<I, S>(selected: I, catalog: &Catalog) -> PricingResult<BTreeSet<AddonId>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    selected
        .into_iter()
        .map(|id| {
            let id = id.as_ref();
            catalog
                .get_addon(id)
                .map(|addon| addon.id)
                .map_err(|_| PricingError::UnknownAddon(id.to_string()))
        })
        .collect()
}

pub(crate) fn surcharge_rate(addons: &BTreeSet<AddonId>, catalog: &Catalog) -> PricingResult<Decimal> {
    addons.iter().try_fold(Decimal::ZERO, |acc, id| {
        let pct = catalog.get_addon(id.as_str())?.pct;
        acc.checked_add(pct)
            .ok_or_else(|| PricingError::InvalidCatalog(format!("surcharge rate for {} overflows", id)))
    })
}

/// Total price for `plan` with the given add-ons selected.
///
/// Duplicate ids count once. Any id the catalog does not know rejects the
/// whole computation with `UnknownAddon`.
pub fn compute_total<I, S>(plan: &Plan, selected: I, catalog: &Catalog) -> PricingResult<Money>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let addons = resolve_addons(selected, catalog)?;
    let rate = surcharge_rate(&addons, catalog)?;
    total_for(plan, rate)
}

pub(crate) fn total_for(plan: &Plan, rate: Decimal) -> PricingResult<Money> {
    if plan.base_price.is_sign_negative() && !plan.base_price.is_zero() {
        return Err(PricingError::InvalidCatalog(format!(
            "plan {} has a negative base price",
            plan.id
        )));
    }

    let total = Decimal::ONE
        .checked_add(rate)
        .and_then(|multiplier| plan.base_price.checked_mul(multiplier))
        .map(Money::new)
        .ok_or_else(|| PricingError::InvalidCatalog(format!("plan {} total overflows", plan.id)))?;

    debug!(plan = %plan.id, %rate, %total, "computed total");
    Ok(total)
}
