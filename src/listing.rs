//! Offer Listings - schema.org Structured Data
//!
//! Field names and nesting follow the schema.org vocabulary that rich-result
//! parsers read (`OfferCatalog`, `Offer`, `Service`, `FAQPage`). Do not
//! rename them.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::catalog::{Addon, Catalog, FaqEntry, Plan};
use crate::error::{PricingError, PricingResult};

pub const SCHEMA_CONTEXT: &str = "https://schema.org";
pub const OFFER_CATALOG_NAME: &str = "Pricing";
pub const OFFER_CATEGORY: &str = "Service";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferCatalog {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "@type")]
    pub kind: String,
    pub name: String,
    pub item_list_element: Vec<Offer>,
}

impl OfferCatalog {
    pub fn offers(&self) -> &[Offer] {
        &self.item_list_element
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    #[serde(rename = "@type")]
    pub kind: String,
    pub price_currency: String,
    /// Plan base price. Add-ons are listed separately, never folded in.
    pub price: Number,
    pub url: String,
    pub category: String,
    pub item_offered: ServiceDescriptor,
    pub add_on: Vec<AddonOffer>,
}

impl Offer {
    pub fn name(&self) -> &str {
        &self.item_offered.name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    #[serde(rename = "@type")]
    pub kind: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonOffer {
    #[serde(rename = "@type")]
    pub kind: String,
    pub description: String,
    pub price_currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqPage {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "@type")]
    pub kind: String,
    pub main_entity: Vec<FaqQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqQuestion {
    #[serde(rename = "@type")]
    pub kind: String,
    pub name: String,
    pub accepted_answer: FaqAnswer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqAnswer {
    #[serde(rename = "@type")]
    pub kind: String,
    pub text: String,
}

/// One `Offer` per plan, in catalog order, each carrying every add-on.
pub fn build_offer_listing(catalog: &Catalog) -> PricingResult<OfferCatalog> {
    if catalog.list_plans().is_empty() {
        return Err(PricingError::InvalidCatalog(
            "cannot build an offer listing from a catalog with no plans".into(),
        ));
    }

    let currency = catalog.currency();
    let add_on: Vec<AddonOffer> = catalog
        .list_addons()
        .iter()
        .map(|addon| AddonOffer {
            kind: "Offer".into(),
            description: addon_description(addon),
            price_currency: currency.to_string(),
        })
        .collect();

    let item_list_element = catalog
        .list_plans()
        .iter()
        .map(|plan| plan_offer(plan, currency, add_on.clone()))
        .collect::<PricingResult<Vec<_>>>()?;

    Ok(OfferCatalog {
        context: SCHEMA_CONTEXT.into(),
        kind: "OfferCatalog".into(),
        name: OFFER_CATALOG_NAME.into(),
        item_list_element,
    })
}

fn plan_offer(plan: &Plan, currency: &str, add_on: Vec<AddonOffer>) -> PricingResult<Offer> {
    Ok(Offer {
        kind: "Offer".into(),
        price_currency: currency.to_string(),
        price: json_number(plan.base_price).ok_or_else(|| {
            PricingError::InvalidCatalog(format!("plan {} price is not representable", plan.id))
        })?,
        url: plan.cta_href.clone(),
        category: OFFER_CATEGORY.into(),
        item_offered: ServiceDescriptor {
            kind: "Service".into(),
            name: plan.name.clone(),
            description: plan.blurb.clone(),
        },
        add_on,
    })
}

/// `"<name> (+<whole percent>%)"`, e.g. `"Paid Usage (ads) (+35%)"`.
pub fn addon_description(addon: &Addon) -> String {
    let percent = (addon.pct * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    format!("{} (+{}%)", addon.name, percent)
}

// Integral prices stay integers (`420`, not `420.0`).
fn json_number(amount: Decimal) -> Option<Number> {
    let normalized = amount.normalize();
    if normalized.scale() == 0 {
        normalized.to_i64().map(Number::from)
    } else {
        normalized.to_f64().and_then(Number::from_f64)
    }
}

pub fn build_faq_page(entries: &[FaqEntry]) -> PricingResult<FaqPage> {
    if entries.is_empty() {
        return Err(PricingError::InvalidCatalog("no FAQ entries to publish".into()));
    }

    Ok(FaqPage {
        context: SCHEMA_CONTEXT.into(),
        kind: "FAQPage".into(),
        main_entity: entries
            .iter()
            .map(|entry| FaqQuestion {
                kind: "Question".into(),
                name: entry.question.clone(),
                accepted_answer: FaqAnswer {
                    kind: "Answer".into(),
                    text: entry.answer.clone(),
                },
            })
            .collect(),
    })
}

/// Wrap a document in a JSON-LD `<script>` element for a page head.
///
/// `<`, `>` and `&` are emitted as unicode escapes so the payload can never
/// terminate the element early.
pub fn to_script_tag<T: Serialize>(id: &str, document: &T) -> PricingResult<String> {
    let json = serde_json::to_string(document)?
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026");
    let id = id.replace('&', "&amp;").replace('"', "&quot;").replace('<', "&lt;");
    Ok(format!(
        r#"<script id="{}" type="application/ld+json">{}</script>"#,
        id, json
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AddonId;
    use serde_json::json;

    #[test]
    fn test_listing_matches_site_shape() {
        let listing = build_offer_listing(Catalog::builtin().unwrap()).unwrap();
        let value = serde_json::to_value(&listing).unwrap();

        assert_eq!(value["@context"], "https://schema.org");
        assert_eq!(value["@type"], "OfferCatalog");
        assert_eq!(value["name"], "Pricing");

        let first = &value["itemListElement"][0];
        assert_eq!(
            first,
            &json!({
                "@type": "Offer",
                "priceCurrency": "USD",
                "price": 420,
                "url": "/#intake",
                "category": "Service",
                "itemOffered": {
                    "@type": "Service",
                    "name": "Beauty TikTok Ad Kit",
                    "description": "6 ad-ready vertical variants in 24h. Caption files + thumbnails included."
                },
                "addOn": [
                    {"@type": "Offer", "description": "Paid Usage (ads) (+35%)", "priceCurrency": "USD"},
                    {"@type": "Offer", "description": "Allowlisting (Spark) (+15%)", "priceCurrency": "USD"}
                ]
            })
        );
        assert_eq!(value["itemListElement"][1]["price"], 260);
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let catalog = Catalog::new("USD", vec![], vec![], vec![]).unwrap();
        assert!(matches!(
            build_offer_listing(&catalog),
            Err(PricingError::InvalidCatalog(_))
        ));
    }

    #[test]
    fn test_addon_percent_rounding() {
        let addon = |pct: &str| Addon {
            id: AddonId::PaidUsage,
            name: "Paid".into(),
            pct: pct.parse().unwrap(),
            description: None,
        };
        assert_eq!(addon_description(&addon("0.35")), "Paid (+35%)");
        assert_eq!(addon_description(&addon("0.125")), "Paid (+13%)");
        assert_eq!(addon_description(&addon("0.1249")), "Paid (+12%)");
        assert_eq!(addon_description(&addon("1")), "Paid (+100%)");
    }

    #[test]
    fn test_fractional_price_stays_numeric() {
        assert_eq!(json_number("99.5".parse().unwrap()), Number::from_f64(99.5));
        assert_eq!(json_number("420.00".parse().unwrap()), Some(Number::from(420)));
    }

    #[test]
    fn test_faq_page_shape() {
        let page = build_faq_page(Catalog::builtin().unwrap().list_faqs()).unwrap();
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["@type"], "FAQPage");
        assert_eq!(value["mainEntity"].as_array().unwrap().len(), 9);
        assert_eq!(value["mainEntity"][0]["@type"], "Question");
        assert_eq!(value["mainEntity"][0]["name"], "Do I need to ship product?");
        assert_eq!(value["mainEntity"][0]["acceptedAnswer"]["@type"], "Answer");
        assert!(build_faq_page(&[]).is_err());
    }

    #[test]
    fn test_script_tag_escapes_payload() {
        let doc = json!({"name": "</script><b>&"});
        let tag = to_script_tag("pricing-jsonld", &doc).unwrap();
        assert!(tag.starts_with(r#"<script id="pricing-jsonld" type="application/ld+json">"#));
        assert!(tag.ends_with("</script>"));
        assert_eq!(tag.matches("</script>").count(), 1);
        assert!(tag.contains(r"\u003c/script\u003e\u003cb\u003e\u0026"));

        let inner = tag
            .trim_start_matches(r#"<script id="pricing-jsonld" type="application/ld+json">"#)
            .trim_end_matches("</script>");
        let parsed: serde_json::Value = serde_json::from_str(inner).unwrap();
        assert_eq!(parsed, doc);
    }
}
