use anyhow::{Context, Result};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use crate::models::order::QuoteLine;
use crate::models::pricing::{PriceBreakdown, format_money};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const LINE_HEIGHT: f32 = 7.0;

/// Content of a printable order receipt.
#[derive(Debug, Clone)]
pub struct OrderDocument {
    pub order_id: String,
    pub title: String,
    pub address: String,
    pub customer_name: Option<String>,
    pub lines: Vec<QuoteLine>,
    pub breakdown: PriceBreakdown,
    pub payment_label: Option<String>,
    pub created_at: String,
}

/// Writes text top to bottom, starting a new page when the margin is hit.
struct Cursor<'a> {
    doc: &'a printpdf::PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl Cursor<'_> {
    fn line(&mut self, text: &str, size: f32, font: &IndirectFontRef) {
        if self.y < MARGIN {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
        self.layer.use_text(text, size, Mm(MARGIN), Mm(self.y), font);
        self.y -= LINE_HEIGHT;
    }

    fn gap(&mut self) {
        self.y -= LINE_HEIGHT / 2.0;
    }
}

pub fn render_order_pdf(order: &OrderDocument) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        format!("Pedido {}", order.order_id),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow::anyhow!("Failed to load PDF font: {e:?}"))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| anyhow::anyhow!("Failed to load PDF font: {e:?}"))?;

    let mut cursor = Cursor {
        doc: &doc,
        layer: doc.get_page(page).get_layer(layer),
        y: PAGE_HEIGHT - MARGIN,
    };

    cursor.line(&order.title, 20.0, &bold);
    cursor.gap();
    cursor.line(&format!("Pedido #{}", order.order_id), 11.0, &regular);
    cursor.line(&format!("Fecha: {}", order.created_at), 11.0, &regular);
    if let Some(name) = order.customer_name.as_deref().filter(|n| !n.trim().is_empty()) {
        cursor.line(&format!("Cliente: {}", name.trim()), 11.0, &regular);
    }
    cursor.line(&format!("Direccion: {}", order.address), 11.0, &regular);
    cursor.gap();

    cursor.line("Detalle", 13.0, &bold);
    for line in &order.lines {
        cursor.line(
            &format!(
                "{} x {} - ${} c/u",
                line.qty,
                line.name,
                format_money(line.unit_price)
            ),
            11.0,
            &regular,
        );
    }
    cursor.gap();

    let breakdown = &order.breakdown;
    if breakdown.percent > 0.0 {
        cursor.line(
            &format!("Subtotal: ${}", format_money(breakdown.subtotal)),
            11.0,
            &regular,
        );
        cursor.line(
            &format!(
                "Recargo ({}%): ${}",
                breakdown.percent,
                format_money(breakdown.surcharge)
            ),
            11.0,
            &regular,
        );
    }
    cursor.line(
        &format!("TOTAL: ${}", format_money(breakdown.total)),
        14.0,
        &bold,
    );
    if let Some(label) = &order.payment_label {
        cursor.line(&format!("Forma de pago: {label}"), 11.0, &regular);
    }

    drop(cursor);
    doc.save_to_bytes()
        .map_err(|e| anyhow::anyhow!("{e:?}"))
        .context("Failed to serialize order PDF")
}

/// PDF layout is CPU-bound; keep it off the async workers.
pub async fn render_order_pdf_blocking(order: OrderDocument) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || render_order_pdf(&order))
        .await
        .context("PDF rendering task panicked")?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pricing::{CartLine, compute};

    fn document(lines: usize) -> OrderDocument {
        let quote_lines: Vec<QuoteLine> = (0..lines)
            .map(|i| QuoteLine {
                item_id: None,
                name: format!("Producto {i}"),
                qty: 1.0,
                unit_price: 100.0,
                line_total: 100.0,
            })
            .collect();
        let cart: Vec<CartLine> = quote_lines.iter().map(|_| CartLine::new(100.0, 1.0)).collect();

        OrderDocument {
            order_id: "1700000000000123".to_string(),
            title: "Pedido Delivery".to_string(),
            address: "Calle Falsa 123".to_string(),
            customer_name: Some("Ana".to_string()),
            lines: quote_lines,
            breakdown: compute(&cart, 10.0),
            payment_label: Some("Tarjeta".to_string()),
            created_at: "2025-01-01 12:00".to_string(),
        }
    }

    #[test]
    fn test_renders_pdf_bytes() {
        let bytes = render_order_pdf(&document(3)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_long_orders_spill_onto_more_pages() {
        let short = render_order_pdf(&document(2)).unwrap();
        let long = render_order_pdf(&document(80)).unwrap();
        assert!(long.starts_with(b"%PDF"));
        assert!(long.len() > short.len());
    }
}
