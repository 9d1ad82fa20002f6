//! Money - Fixed-Point Amounts and Display Formatting
//!
//! Amounts are exact decimals. The only rounding rule is half away from
//! zero to two places, applied once when a `Money` is built.
//!
//! Formatting never fails: a currency code that cannot be rendered falls
//! back to `"$"` plus the two-decimal amount.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

pub const MONEY_SCALE: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Rounds `amount` to cents, midpoints away from zero.
    pub fn new(amount: Decimal) -> Self {
        Self(round_cents(amount))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Amount in minor units. `None` only if the value does not fit in an `i64`.
    pub fn cents(&self) -> Option<i64> {
        use rust_decimal::prelude::ToPrimitive;
        self.0.checked_mul(Decimal::ONE_HUNDRED).and_then(|cents| cents.to_i64())
    }

    pub fn format(&self, currency_code: &str) -> String {
        format_money(self.0, currency_code)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money::new(amount)
    }
}

fn round_cents(amount: Decimal) -> Decimal {
    round_to(amount, MONEY_SCALE)
}

fn round_to(amount: Decimal, scale: u32) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(scale);
    rounded
}

struct CurrencyStyle {
    code: &'static str,
    symbol: &'static str,
    minor_digits: u32,
}

const CURRENCY_STYLES: &[CurrencyStyle] = &[
    CurrencyStyle { code: "USD", symbol: "$", minor_digits: 2 },
    CurrencyStyle { code: "EUR", symbol: "€", minor_digits: 2 },
    CurrencyStyle { code: "GBP", symbol: "£", minor_digits: 2 },
    CurrencyStyle { code: "JPY", symbol: "¥", minor_digits: 0 },
    CurrencyStyle { code: "CAD", symbol: "CA$", minor_digits: 2 },
    CurrencyStyle { code: "AUD", symbol: "A$", minor_digits: 2 },
    CurrencyStyle { code: "MXN", symbol: "MX$", minor_digits: 2 },
    CurrencyStyle { code: "INR", symbol: "₹", minor_digits: 2 },
];

/// Render `amount` as an en-US currency string, e.g. `"$1,234.50"`.
///
/// Unlisted but well-formed codes render as `"XYZ 1,234.50"` (no-break
/// space). Malformed codes degrade to `"$" + fixed two decimals`.
pub fn format_money(amount: Decimal, currency_code: &str) -> String {
    match localized(amount, currency_code) {
        Some(formatted) => formatted,
        None => {
            debug!(currency = currency_code, "currency not renderable, using fallback format");
            fallback_format(amount)
        }
    }
}

fn localized(amount: Decimal, currency_code: &str) -> Option<String> {
    if currency_code.len() != 3 || !currency_code.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let code = currency_code.to_ascii_uppercase();

    let (prefix, digits) = match CURRENCY_STYLES.iter().find(|s| s.code == code) {
        Some(style) => (style.symbol.to_string(), style.minor_digits),
        None => (format!("{}\u{a0}", code), MONEY_SCALE),
    };

    let rounded = round_to(amount, digits);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let text = rounded.abs().to_string();
    let (whole, fraction) = match text.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (text.as_str(), None),
    };

    let mut out = format!("{}{}{}", sign, prefix, group_thousands(whole));
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    Some(out)
}

fn fallback_format(amount: Decimal) -> String {
    format!("${}", round_cents(amount))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
