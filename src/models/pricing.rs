//! Cart arithmetic for public ordering.
//!
//! Client-supplied numbers are untrusted: every price and quantity goes
//! through [`coerce_number`] so one malformed line contributes 0 instead of
//! poisoning the whole total.

use serde::Serialize;
use serde_json::Value;

/// Reads a JSON number or numeric string. Anything else, including
/// non-finite values, becomes `0.0`.
#[must_use]
pub fn coerce_number(value: &Value) -> f64 {
    parse_number(value).unwrap_or(0.0)
}

/// Strict variant of [`coerce_number`]: `None` when the value is not a
/// finite number or numeric string.
#[must_use]
pub fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartLine {
    pub price: f64,
    pub qty: f64,
}

impl CartLine {
    #[must_use]
    pub fn new(price: f64, qty: f64) -> Self {
        let price = if price.is_finite() { price } else { 0.0 };
        let qty = if qty.is_finite() && qty > 0.0 { qty } else { 0.0 };
        Self { price, qty }
    }

    #[must_use]
    pub fn from_json(price: &Value, qty: &Value) -> Self {
        Self::new(coerce_number(price), coerce_number(qty))
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.price * self.qty
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceBreakdown {
    pub subtotal: f64,
    pub percent: f64,
    pub surcharge: f64,
    pub total: f64,
}

/// `total = subtotal * (1 + percent / 100)`, with `surcharge = total - subtotal`.
#[must_use]
pub fn compute(lines: &[CartLine], percent: f64) -> PriceBreakdown {
    let subtotal: f64 = lines.iter().map(CartLine::total).sum();
    let percent = if percent.is_finite() && percent > 0.0 {
        percent
    } else {
        0.0
    };

    let total = if percent == 0.0 {
        subtotal
    } else {
        subtotal * (1.0 + percent / 100.0)
    };

    PriceBreakdown {
        subtotal,
        percent,
        surcharge: total - subtotal,
        total,
    }
}

#[must_use]
pub fn format_money(amount: f64) -> String {
    if amount.is_finite() {
        format!("{amount:.2}")
    } else {
        "0.00".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!(12.5)), 12.5);
        assert_eq!(coerce_number(&json!(" 7 ")), 7.0);
        assert_eq!(coerce_number(&json!("abc")), 0.0);
        assert_eq!(coerce_number(&json!(null)), 0.0);
        assert_eq!(coerce_number(&json!({"price": 3})), 0.0);
        assert_eq!(coerce_number(&json!("NaN")), 0.0);
        assert_eq!(coerce_number(&json!("inf")), 0.0);
    }

    #[test]
    fn test_surcharge_applied() {
        let lines = [CartLine::new(1000.0, 2.0), CartLine::new(500.0, 1.0)];
        let breakdown = compute(&lines, 10.0);

        assert!(approx_eq(breakdown.subtotal, 2500.0));
        assert!(approx_eq(breakdown.total, 2750.0));
        assert!(approx_eq(breakdown.surcharge, 250.0));
    }

    #[test]
    fn test_zero_percent_keeps_subtotal() {
        let lines = [CartLine::new(19.99, 3.0)];
        let breakdown = compute(&lines, 0.0);

        assert_eq!(breakdown.total, breakdown.subtotal);
        assert_eq!(breakdown.surcharge, 0.0);
    }

    #[test]
    fn test_total_matches_formula_for_various_percents() {
        let lines = [CartLine::new(123.45, 3.0), CartLine::new(0.1, 7.0)];
        let subtotal = 123.45 * 3.0 + 0.1 * 7.0;

        for pct in [0.5, 3.0, 12.5, 33.3, 100.0] {
            let breakdown = compute(&lines, pct);
            assert!(approx_eq(breakdown.total, subtotal * (1.0 + pct / 100.0)));
        }
    }

    #[test]
    fn test_malformed_line_counts_as_zero() {
        let lines = [
            CartLine::from_json(&json!("garbage"), &json!(2)),
            CartLine::from_json(&json!(10), &json!("3")),
            CartLine::from_json(&json!(5), &json!(-4)),
        ];

        assert_eq!(compute(&lines, 0.0).subtotal, 30.0);
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(3.0), "3.00");
        assert_eq!(format_money(2.005_f64 + 0.001), "2.01");
        assert_eq!(format_money(f64::NAN), "0.00");
    }
}
