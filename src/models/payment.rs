use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::constants::payment::{LABELS, MAX_PERCENT};
use crate::models::pricing::parse_number;

#[derive(Debug, Error, PartialEq)]
pub enum PaymentError {
    #[error("Invalid surcharge for \"{method}\": must be a number between 0 and 100")]
    InvalidPercent { method: String },

    #[error("Payment method names cannot be empty")]
    EmptyMethod,
}

/// Trimmed, lowercased method key; `None` when blank.
#[must_use]
pub fn normalize_method(method: &str) -> Option<String> {
    let key = method.trim().to_lowercase();
    (!key.is_empty()).then_some(key)
}

/// Human label for a method key, falling back to the key itself.
#[must_use]
pub fn method_label(method: &str) -> String {
    let key = normalize_method(method).unwrap_or_default();
    LABELS
        .iter()
        .find(|(k, _)| *k == key)
        .map_or_else(|| method.trim().to_string(), |(_, label)| (*label).to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaymentSettings {
    pub methods: Vec<String>,
    pub percents: BTreeMap<String, f64>,
}

impl PaymentSettings {
    /// Validates admin-supplied settings. Methods are normalized and
    /// de-duplicated in first-seen order; percents must be finite and
    /// within `0..=100`.
    pub fn from_input(
        methods: &[String],
        percents: &BTreeMap<String, Value>,
    ) -> Result<Self, PaymentError> {
        let mut normalized = Vec::with_capacity(methods.len());
        for method in methods {
            let key = normalize_method(method).ok_or(PaymentError::EmptyMethod)?;
            if !normalized.contains(&key) {
                normalized.push(key);
            }
        }

        let mut parsed = BTreeMap::new();
        for (method, raw) in percents {
            let key = normalize_method(method).ok_or(PaymentError::EmptyMethod)?;
            let pct = parse_number(raw)
                .filter(|p| (0.0..=MAX_PERCENT).contains(p))
                .ok_or_else(|| PaymentError::InvalidPercent {
                    method: method.clone(),
                })?;
            parsed.insert(key, pct);
        }

        Ok(Self {
            methods: normalized,
            percents: parsed,
        })
    }

    /// Surcharge percent for the selected method, 0 when unknown or unset.
    #[must_use]
    pub fn percent_for(&self, method: Option<&str>) -> f64 {
        method
            .and_then(normalize_method)
            .and_then(|key| self.percents.get(&key).copied())
            .unwrap_or(0.0)
    }

    /// Decodes the stored JSON columns. Corrupt values decode as empty.
    #[must_use]
    pub fn from_stored(methods_json: &str, percents_json: &str) -> Self {
        let methods: Vec<String> = serde_json::from_str(methods_json).unwrap_or_default();
        let percents: BTreeMap<String, f64> =
            serde_json::from_str(percents_json).unwrap_or_default();

        Self {
            methods,
            percents: percents
                .into_iter()
                .filter(|(_, p)| p.is_finite())
                .collect(),
        }
    }

    /// Encodes as `(methods_json, percents_json)` for storage.
    #[must_use]
    pub fn to_stored(&self) -> (String, String) {
        (
            serde_json::to_string(&self.methods).unwrap_or_else(|_| "[]".to_string()),
            serde_json::to_string(&self.percents).unwrap_or_else(|_| "{}".to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_methods_are_normalized_and_deduplicated() {
        let methods = vec![
            " Cash ".to_string(),
            "transfer".to_string(),
            "CASH".to_string(),
        ];
        let settings = PaymentSettings::from_input(&methods, &BTreeMap::new()).unwrap();
        assert_eq!(settings.methods, vec!["cash", "transfer"]);
    }

    #[test]
    fn test_percent_validation() {
        let ok = BTreeMap::from([
            ("Credit".to_string(), json!(10)),
            ("debit".to_string(), json!("2.5")),
        ]);
        let settings = PaymentSettings::from_input(&[], &ok).unwrap();
        assert_eq!(settings.percents.get("credit"), Some(&10.0));
        assert_eq!(settings.percents.get("debit"), Some(&2.5));

        for bad in [json!(-1), json!(101), json!("lots"), json!(null)] {
            let input = BTreeMap::from([("credit".to_string(), bad)]);
            assert!(PaymentSettings::from_input(&[], &input).is_err());
        }
    }

    #[test]
    fn test_percent_for_lookup() {
        let settings = PaymentSettings {
            methods: vec!["credit".to_string()],
            percents: BTreeMap::from([("credit".to_string(), 15.0)]),
        };

        assert_eq!(settings.percent_for(Some(" CREDIT")), 15.0);
        assert_eq!(settings.percent_for(Some("cash")), 0.0);
        assert_eq!(settings.percent_for(None), 0.0);
    }

    #[test]
    fn test_stored_round_trip_tolerates_corruption() {
        let settings = PaymentSettings::from_stored("not json", "{\"credit\": 5}");
        assert!(settings.methods.is_empty());
        assert_eq!(settings.percent_for(Some("credit")), 5.0);
    }

    #[test]
    fn test_method_label() {
        assert_eq!(method_label("Efectivo"), "Efectivo");
        assert_eq!(method_label("mercadopago"), "Mercado Pago");
        assert_eq!(method_label("Crypto"), "Crypto");
    }
}
