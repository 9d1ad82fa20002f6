//! Ad Kit Pricing - Quote Engine and Offer Listing Core
//!
//! # The Five Rules (Non-Negotiable)
//! 1. The Catalog Is Read-Only
//! 2. Unknown Add-ons Are Rejected, Never Ignored
//! 3. Totals Are Exact Decimals, Rounded Once
//! 4. Listings Mirror Catalog Order
//! 5. Only Display Formatting May Degrade

pub mod catalog;
pub mod engine;
pub mod error;
pub mod hashing;
pub mod listing;
pub mod money;
pub mod quote;
pub mod validation;

pub use catalog::{Addon, AddonId, BillingUnit, Catalog, FaqEntry, Plan};
pub use engine::PricingEngine;
pub use error::PricingError;
pub use hashing::{canonical_json, compute_quote_fingerprint};
pub use listing::{build_faq_page, build_offer_listing, to_script_tag, FaqPage, OfferCatalog};
pub use money::{format_money, Money};
pub use quote::{compute_total, Quote, Selection};
pub use validation::{CatalogRule, CatalogValidator, CatalogViolation, ViolationSeverity};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DEFAULT_CURRENCY: &str = "USD";
