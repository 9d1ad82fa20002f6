//! Property tests for the quote engine.

use proptest::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};

use adkit_pricing::{
    catalog::{Addon, AddonId, BillingUnit, Catalog, Plan},
    compute_total, format_money,
};

fn catalog_with(base_cents: i64, paid_bp: i64, allow_bp: i64) -> Catalog {
    Catalog::new(
        "USD",
        vec![Plan {
            id: "plan".to_string(),
            name: "Plan".to_string(),
            blurb: String::new(),
            base_price: Decimal::new(base_cents, 2),
            unit: BillingUnit::OneTime,
            cta_href: "/".to_string(),
            cta_label: String::new(),
            features: vec![],
        }],
        vec![
            Addon {
                id: AddonId::PaidUsage,
                name: "Paid".to_string(),
                pct: Decimal::new(paid_bp, 4),
                description: None,
            },
            Addon {
                id: AddonId::Allowlisting,
                name: "Allow".to_string(),
                pct: Decimal::new(allow_bp, 4),
                description: None,
            },
        ],
        vec![],
    )
    .unwrap()
}

fn subset() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(vec!["paid-usage", "allowlisting"]), 0..5)
}

proptest! {
    #[test]
    fn total_matches_formula(
        base_cents in 0i64..10_000_000,
        paid_bp in 1i64..=10_000,
        allow_bp in 1i64..=10_000,
        ids in subset(),
    ) {
        let catalog = catalog_with(base_cents, paid_bp, allow_bp);
        let plan = &catalog.list_plans()[0];

        let mut rate = Decimal::ZERO;
        if ids.contains(&"paid-usage") {
            rate += Decimal::new(paid_bp, 4);
        }
        if ids.contains(&"allowlisting") {
            rate += Decimal::new(allow_bp, 4);
        }
        let expected = (plan.base_price * (Decimal::ONE + rate))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        let total = compute_total(plan, &ids, &catalog).unwrap();
        prop_assert_eq!(total.amount(), expected);
        prop_assert!(total.amount() >= plan.base_price);
    }

    #[test]
    fn selection_order_and_repeats_do_not_matter(ids in subset()) {
        let catalog = catalog_with(42_000, 3_500, 1_500);
        let plan = &catalog.list_plans()[0];

        let mut reversed = ids.clone();
        reversed.reverse();
        let mut doubled = ids.clone();
        doubled.extend(ids.iter().copied());

        let total = compute_total(plan, &ids, &catalog).unwrap();
        prop_assert_eq!(total, compute_total(plan, &reversed, &catalog).unwrap());
        prop_assert_eq!(total, compute_total(plan, &doubled, &catalog).unwrap());
    }

    #[test]
    fn formatting_never_fails(cents in -1_000_000_000i64..1_000_000_000, code in "\\PC{0,5}") {
        let formatted = format_money(Decimal::new(cents, 2), &code);
        prop_assert!(!formatted.is_empty());
    }
}
