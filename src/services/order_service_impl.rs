//! `SeaORM` implementation of the `OrderService` trait.

use async_trait::async_trait;
use rand::Rng;
use serde_json::Value;
use std::path::PathBuf;
use tokio::fs;
use tracing::info;

use crate::constants::limits::MAX_ORDER_LINES;
use crate::db::Store;
use crate::models::order::QuoteLine;
use crate::models::payment::{PaymentSettings, method_label, normalize_method};
use crate::models::pricing::{CartLine, compute, parse_number};
use crate::services::order_service::{OrderError, OrderReceipt, OrderRequest, OrderService};
use crate::services::pdf::{OrderDocument, render_order_pdf_blocking};

const DEFAULT_TITLE: &str = "Pedido Delivery";
const DEFAULT_LINE_NAME: &str = "Producto";

pub struct SeaOrmOrderService {
    store: Store,
    orders_dir: PathBuf,
}

impl SeaOrmOrderService {
    #[must_use]
    pub fn new(store: Store, orders_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            orders_dir: orders_dir.into(),
        }
    }

    /// Surcharge percent configured by the menu owner behind `slug`. An
    /// unknown slug simply means no surcharge.
    async fn surcharge_percent(&self, slug: &str, method: &str) -> Result<f64, OrderError> {
        let Some(menu) = self.store.get_menu_by_slug(slug.trim()).await? else {
            return Ok(0.0);
        };
        let Some(account) = self.store.get_account(menu.account_id).await? else {
            return Ok(0.0);
        };

        let payment =
            PaymentSettings::from_stored(&account.payment_methods, &account.payment_method_percents);
        Ok(payment.percent_for(Some(method)))
    }
}

/// Milliseconds since the epoch plus a random suffix, so two orders in the
/// same millisecond do not overwrite each other's file.
fn new_order_id() -> String {
    let suffix: u16 = rand::rng().random_range(0..1000);
    format!("{}{suffix:03}", chrono::Utc::now().timestamp_millis())
}

fn field<'a>(entry: &'a Value, name: &str) -> &'a Value {
    entry.get(name).unwrap_or(&Value::Null)
}

fn parse_lines(items: &[Value]) -> (Vec<QuoteLine>, Vec<CartLine>) {
    items
        .iter()
        .map(|entry| {
            let line = CartLine::from_json(field(entry, "price"), field(entry, "qty"));
            let name = field(entry, "name")
                .as_str()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .unwrap_or(DEFAULT_LINE_NAME)
                .to_string();

            (
                QuoteLine {
                    item_id: None,
                    name,
                    qty: line.qty,
                    unit_price: line.price,
                    line_total: line.total(),
                },
                line,
            )
        })
        .unzip()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[async_trait]
impl OrderService for SeaOrmOrderService {
    async fn create_order(&self, request: OrderRequest) -> Result<OrderReceipt, OrderError> {
        let address = non_blank(request.address.as_deref())
            .ok_or(OrderError::AddressRequired)?
            .to_string();

        let items = request
            .items
            .as_array()
            .filter(|items| !items.is_empty())
            .ok_or(OrderError::ItemsRequired)?;
        if items.len() > MAX_ORDER_LINES {
            return Err(OrderError::Validation(format!(
                "Orders are limited to {MAX_ORDER_LINES} lines"
            )));
        }

        let (lines, cart) = parse_lines(items);

        let method = request.payment_method.as_deref().and_then(normalize_method);
        let percent = match (non_blank(request.slug.as_deref()), method.as_deref()) {
            (Some(slug), Some(method)) => self.surcharge_percent(slug, method).await?,
            _ => 0.0,
        };

        let mut breakdown = compute(&cart, percent);
        if let Some(total) = request.total.as_ref().and_then(parse_number) {
            breakdown.total = total;
        }

        let order_id = new_order_id();
        let document = OrderDocument {
            order_id: order_id.clone(),
            title: non_blank(request.restaurant_name.as_deref())
                .unwrap_or(DEFAULT_TITLE)
                .to_string(),
            address,
            customer_name: request.customer_name,
            lines,
            breakdown,
            payment_label: method.as_deref().map(method_label),
            created_at: chrono::Local::now().format("%d/%m/%Y %H:%M").to_string(),
        };

        let bytes = render_order_pdf_blocking(document).await?;

        fs::create_dir_all(&self.orders_dir).await?;
        let filename = format!("order-{order_id}.pdf");
        let path = self.orders_dir.join(&filename);
        fs::write(&path, bytes).await?;

        info!(
            order_id = %order_id,
            lines = cart.len(),
            total = breakdown.total,
            path = %path.display(),
            "Order PDF generated"
        );
        metrics::counter!("orders_generated_total").increment(1);

        Ok(OrderReceipt {
            pdf_url: format!("/orders/{filename}"),
            order_id,
            total: breakdown.total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_lines_coerces_bad_numbers() {
        let items = json!([
            {"name": "Pizza", "price": "1000", "qty": 2},
            {"name": "Empanada", "price": "abc", "qty": 3},
            {"price": 50, "qty": "1"}
        ]);
        let (lines, cart) = parse_lines(items.as_array().unwrap());

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].line_total, 2000.0);
        assert_eq!(lines[1].line_total, 0.0);
        assert_eq!(lines[2].name, DEFAULT_LINE_NAME);
        assert_eq!(compute(&cart, 0.0).total, 2050.0);
    }

    #[test]
    fn test_order_ids_are_numeric() {
        let id = new_order_id();
        assert!(id.len() >= 16);
        assert!(id.chars().all(|c| c.is_ascii_digit()));
    }
}
