//! Pairing-code QR rendering.
//!
//! The external client supplies the pairing code as opaque bytes; subscribers
//! receive it as a renderable PNG data URL. Encoding is deterministic: the
//! same code always yields the same URL.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, Luma};
use qrcode::QrCode;
use thiserror::Error;

/// Failure rendering a pairing code.
#[derive(Debug, Error)]
pub enum QrError {
    /// The code does not fit in any QR version.
    #[error("pairing code does not fit in a QR code: {0}")]
    Encode(#[from] qrcode::types::QrError),

    /// PNG serialization failed.
    #[error("failed to render QR PNG: {0}")]
    Render(#[from] image::ImageError),
}

/// Render a pairing code as a `data:image/png;base64,…` URL.
pub fn encode_data_url(code: &str) -> Result<String, QrError> {
    let qr = QrCode::new(code.as_bytes())?;
    let img = qr.render::<Luma<u8>>().build();

    let mut png = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut png), ImageFormat::Png)?;

    Ok(format!("data:image/png;base64,{}", STANDARD.encode(&png)))
}
