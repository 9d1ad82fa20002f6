//! Pricing Engine - Single Entry Point
//!
//! Holds the shared read-only catalog. Every quote resolves its add-ons
//! through the catalog; there is no path that prices an unchecked selection.

use std::sync::Arc;
use tracing::info;

use crate::catalog::{Catalog, Plan};
use crate::error::PricingResult;
use crate::hashing::compute_quote_fingerprint;
use crate::listing::{build_faq_page, build_offer_listing, FaqPage, OfferCatalog};
use crate::money::Money;
use crate::quote::{resolve_addons, surcharge_rate, total_for, Quote, Selection};
use crate::ENGINE_VERSION;

/// Cheap to clone; clones share the same catalog.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    catalog: Arc<Catalog>,
}

impl PricingEngine {
    pub fn new(catalog: Catalog) -> Self {
        Self::from_shared(Arc::new(catalog))
    }

    pub fn from_shared(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Engine over the catalog compiled into the crate.
    pub fn builtin() -> PricingResult<Self> {
        Ok(Self::from_shared(Arc::clone(Catalog::builtin_shared()?)))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn shared_catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// List all plans in catalog order
    pub fn list_plans(&self) -> &[Plan] {
        self.catalog.list_plans()
    }

    pub fn get_plan(&self, id: &str) -> PricingResult<&Plan> {
        self.catalog.get_plan(id)
    }

    /// Price a plan for the caller's current selection.
    ///
    /// Re-run on every selection change; nothing is cached between calls.
    pub fn quote(&self, plan_id: &str, selection: &Selection) -> PricingResult<Quote> {
        let plan = self.catalog.get_plan(plan_id)?;
        let addons = resolve_addons(selection.iter(), &self.catalog)?;
        let surcharge_rate = surcharge_rate(&addons, &self.catalog)?;
        let total = total_for(plan, surcharge_rate)?;

        let currency = self.catalog.currency().to_string();
        let base_price = Money::new(plan.base_price);
        let selected_addons: Vec<_> = addons.into_iter().collect();

        let fingerprint = compute_quote_fingerprint(
            &plan.id,
            base_price,
            &selected_addons,
            total,
            &currency,
            ENGINE_VERSION,
        )?;

        Ok(Quote {
            plan_id: plan.id.clone(),
            selected_addons,
            base_price,
            surcharge_rate,
            total,
            formatted_total: total.format(&currency),
            currency,
            fingerprint,
        })
    }

    pub fn offer_listing(&self) -> PricingResult<OfferCatalog> {
        let listing = build_offer_listing(&self.catalog)?;
        info!(offers = listing.offers().len(), "built offer listing");
        Ok(listing)
    }

    pub fn faq_page(&self) -> PricingResult<FaqPage> {
        build_faq_page(self.catalog.list_faqs())
    }

    pub fn format(&self, amount: Money) -> String {
        amount.format(self.catalog.currency())
    }
}
