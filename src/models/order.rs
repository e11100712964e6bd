use serde::Serialize;

use crate::models::payment::method_label;
use crate::models::pricing::{PriceBreakdown, format_money};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteLine {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<i32>,
    pub name: String,
    pub qty: f64,
    pub unit_price: f64,
    pub line_total: f64,
}

/// Everything needed to render the order text sent through WhatsApp.
#[derive(Debug, Clone)]
pub struct OrderMessage<'a> {
    pub customer_name: Option<&'a str>,
    pub restaurant_name: &'a str,
    pub lines: &'a [QuoteLine],
    pub breakdown: PriceBreakdown,
    pub payment_method: Option<&'a str>,
}

impl OrderMessage<'_> {
    #[must_use]
    pub fn render(&self) -> String {
        let customer = self
            .customer_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("Cliente");

        let mut text = String::new();
        text.push_str("*Pedido*\n");
        text.push_str(&format!("*Nombre:* {customer}\n"));
        text.push_str(&format!("*Comercio:* {}\n\n", self.restaurant_name));
        text.push_str("*Detalle:*\n");

        for line in self.lines {
            text.push_str(&format!(
                "• {} x {} - ${} (sub: ${})\n",
                format_qty(line.qty),
                line.name,
                format_money(line.unit_price),
                format_money(line.line_total)
            ));
        }

        text.push('\n');
        text.push_str(&format!(
            "*Subtotal:* ${}\n",
            format_money(self.breakdown.subtotal)
        ));
        if self.breakdown.percent > 0.0 {
            text.push_str(&format!(
                "*Recargo ({}%):* ${}\n",
                self.breakdown.percent,
                format_money(self.breakdown.surcharge)
            ));
        }
        text.push_str(&format!("*TOTAL:* ${}\n", format_money(self.breakdown.total)));

        if let Some(method) = self.payment_method.filter(|m| !m.trim().is_empty()) {
            text.push_str(&format!("*Forma de pago:* {}\n", method_label(method)));
        }

        text
    }
}

fn format_qty(qty: f64) -> String {
    if qty.fract() == 0.0 {
        format!("{qty:.0}")
    } else {
        qty.to_string()
    }
}

/// Digits-only phone number, `None` when nothing dialable remains.
#[must_use]
pub fn whatsapp_digits(number: &str) -> Option<String> {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    (!digits.is_empty()).then_some(digits)
}

#[must_use]
pub fn whatsapp_url(number: &str, text: &str) -> Option<String> {
    whatsapp_digits(number)
        .map(|digits| format!("https://wa.me/{digits}?text={}", urlencoding::encode(text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pricing::{CartLine, compute};

    fn lines() -> Vec<QuoteLine> {
        vec![
            QuoteLine {
                item_id: Some(1),
                name: "Empanada".to_string(),
                qty: 2.0,
                unit_price: 500.0,
                line_total: 1000.0,
            },
            QuoteLine {
                item_id: Some(2),
                name: "Flan".to_string(),
                qty: 1.0,
                unit_price: 800.0,
                line_total: 800.0,
            },
        ]
    }

    #[test]
    fn test_render_with_surcharge() {
        let lines = lines();
        let breakdown = compute(
            &[CartLine::new(500.0, 2.0), CartLine::new(800.0, 1.0)],
            10.0,
        );
        let text = OrderMessage {
            customer_name: Some("Ana"),
            restaurant_name: "La Esquina",
            lines: &lines,
            breakdown,
            payment_method: Some("mercadopago"),
        }
        .render();

        assert!(text.starts_with("*Pedido*\n*Nombre:* Ana\n*Comercio:* La Esquina\n"));
        assert!(text.contains("• 2 x Empanada - $500.00 (sub: $1000.00)"));
        assert!(text.contains("*Subtotal:* $1800.00"));
        assert!(text.contains("*Recargo (10%):* $180.00"));
        assert!(text.contains("*TOTAL:* $1980.00"));
        assert!(text.contains("*Forma de pago:* Mercado Pago"));
    }

    #[test]
    fn test_render_without_surcharge_or_name() {
        let lines = lines();
        let breakdown = compute(&[CartLine::new(500.0, 2.0)], 0.0);
        let text = OrderMessage {
            customer_name: Some("  "),
            restaurant_name: "La Esquina",
            lines: &lines,
            breakdown,
            payment_method: None,
        }
        .render();

        assert!(text.contains("*Nombre:* Cliente"));
        assert!(!text.contains("Recargo"));
        assert!(!text.contains("Forma de pago"));
    }

    #[test]
    fn test_whatsapp_url() {
        assert_eq!(
            whatsapp_url("+54 9 11 1234-5678", "hola mundo").as_deref(),
            Some("https://wa.me/5491112345678?text=hola%20mundo")
        );
        assert_eq!(whatsapp_url("n/a", "x"), None);
    }
}
