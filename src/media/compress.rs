use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use tokio::task;

use crate::error::{CatalogError, Result};

/// Images wider than this are scaled down before storing
pub const DEFAULT_MAX_WIDTH: u32 = 800;

/// JPEG quality of stored product images (0-100)
const JPEG_QUALITY: u8 = 70;

const JPEG_DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// Compress an uploaded image into a JPEG data URL
///
/// Spawns blocking because decoding and resizing are CPU-intensive.
pub async fn compress_image(bytes: Vec<u8>, max_width: u32) -> Result<String> {
    task::spawn_blocking(move || compress_image_blocking(&bytes, max_width)).await?
}

/// Blocking implementation of image compression
///
/// Width is capped at `max_width`; height keeps the aspect ratio (rounded).
/// Smaller images are re-encoded at their original size.
fn compress_image_blocking(bytes: &[u8], max_width: u32) -> Result<String> {
    let img = image::load_from_memory(bytes)?;

    let (width, height) = (img.width(), img.height());
    let img = if width > max_width {
        let scaled_height = ((height as f64 * max_width as f64) / width as f64).round().max(1.0) as u32;
        img.resize_exact(max_width, scaled_height, FilterType::Lanczos3)
    } else {
        img
    };

    // JPEG has no alpha channel
    let rgb = img.to_rgb8();

    let mut jpeg = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY);
    encoder.encode_image(&rgb)?;

    tracing::debug!(
        "📸 Compressed image {}x{} -> {}x{} ({} KB)",
        width,
        height,
        rgb.width(),
        rgb.height(),
        jpeg.len() / 1024
    );

    Ok(format!("{}{}", JPEG_DATA_URL_PREFIX, STANDARD.encode(&jpeg)))
}

/// Extract the raw bytes from a `data:<mime>;base64,<payload>` URL
pub fn decode_data_url(url: &str) -> Result<Vec<u8>> {
    let payload = url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, payload)| payload)
        .ok_or(CatalogError::InvalidDataUrl)?;

    STANDARD
        .decode(payload)
        .map_err(|_| CatalogError::InvalidDataUrl)
}
