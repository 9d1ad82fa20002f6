//! Hashing - SHA-256 Quote Fingerprints
//!
//! A fingerprint lets a checkout collaborator confirm that the price it is
//! about to charge is the one this engine computed.

use serde::Serialize;
use serde_json::{to_string, Value};
use sha2::{Digest, Sha256};

use crate::catalog::AddonId;
use crate::money::Money;

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Convert to canonical JSON (sorted keys, no whitespace)
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let v: Value = serde_json::to_value(value)?;
    to_string(&sort_value(&v))
}

fn sort_value(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut sorted: Vec<_> = map.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));
            let sorted_map: serde_json::Map<String, Value> = sorted
                .into_iter()
                .map(|(k, v)| (k.clone(), sort_value(v)))
                .collect();
            Value::Object(sorted_map)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_value).collect()),
        _ => v.clone(),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FingerprintInput<'a> {
    plan_id: &'a str,
    base_price: String,
    addons: &'a [AddonId],
    total: String,
    currency: &'a str,
}

/// fingerprint = sha256(canonical quote + ":" + engine_version)
///
/// `addons` must already be sorted and de-duplicated.
pub fn compute_quote_fingerprint(
    plan_id: &str,
    base_price: Money,
    addons: &[AddonId],
    total: Money,
    currency: &str,
    engine_version: &str,
) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(&FingerprintInput {
        plan_id,
        base_price: base_price.to_string(),
        addons,
        total: total.to_string(),
        currency,
    })?;
    Ok(sha256_hex(format!("{}:{}", canonical, engine_version).as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test]
    fn test_canonical_json_sorted() {
        let obj = json!({"z": 1, "a": 2, "m": 3});
        let canonical = canonical_json(&obj).unwrap();
        assert_eq!(canonical, r#"{"a":2,"m":3,"z":1}"#);
    }

    #[test]
    fn test_hash_deterministic() {
        let h1 = sha256_hex(b"ad-kit");
        let h2 = sha256_hex(b"ad-kit");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }

    #[test]
    fn test_fingerprint_tracks_inputs() {
        let base = Money::new(Decimal::from(420));
        let total = Money::new(Decimal::from(567));
        let fp = |addons: &[AddonId], total: Money| {
            compute_quote_fingerprint("ad-kit", base, addons, total, "USD", "1.0.0").unwrap()
        };

        let one = fp(&[AddonId::PaidUsage], total);
        assert_eq!(one, fp(&[AddonId::PaidUsage], total));
        assert_ne!(one, fp(&[], base));
        assert_ne!(
            one,
            compute_quote_fingerprint("ad-kit", base, &[AddonId::PaidUsage], total, "USD", "2.0.0")
                .unwrap()
        );
    }
}
