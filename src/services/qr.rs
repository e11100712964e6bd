use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;
use std::io::Cursor;

const MIN_SIZE: u32 = 256;

/// Renders `content` as a PNG QR code wrapped in a `data:` URL.
pub fn qr_data_url(content: &str) -> Result<String> {
    let code = QrCode::new(content.as_bytes()).context("Failed to encode QR code")?;
    let rendered = code
        .render::<Luma<u8>>()
        .min_dimensions(MIN_SIZE, MIN_SIZE)
        .build();

    let mut png = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(rendered)
        .write_to(&mut png, ImageFormat::Png)
        .context("Failed to write QR PNG")?;

    Ok(format!(
        "data:image/png;base64,{}",
        STANDARD.encode(png.into_inner())
    ))
}

/// QR rendering is CPU-bound; keep it off the async workers.
pub async fn qr_data_url_blocking(content: String) -> Result<String> {
    tokio::task::spawn_blocking(move || qr_data_url(&content))
        .await
        .context("QR rendering task panicked")?
}

/// Public page address encoded in the QR code.
#[must_use]
pub fn public_menu_url(base: &str, slug: &str) -> String {
    format!("{}/menu/{slug}", base.trim_end_matches('/'))
}
