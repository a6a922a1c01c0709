//! Image attachments and client-side compression
//!
//! Photos taken on a phone are often several megabytes. Before upload they
//! are scaled down so the encoded file lands near a size budget.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

use crate::error::{Result, ServiceError};

/// Size budget for uploaded photos, in KiB
pub const DEFAULT_MAX_SIZE_KB: u64 = 500;

/// Encoder quality for uploaded photos
pub const DEFAULT_QUALITY: f32 = 0.6;

/// An in-memory file with its name and MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing the MIME type from its extension
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        let mime_type = ImageFormat::from_path(path)
            .map(|format| format.to_mime_type().to_string())
            .unwrap_or_else(|_| "application/octet-stream".to_string());

        Ok(Self::new(name, mime_type, bytes))
    }

    /// Size in bytes
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Shrink `file` so it lands near `max_size_kb` KiB
///
/// Files already within budget are returned unchanged. Larger ones have
/// both dimensions scaled by `sqrt(budget / size)` and are re-encoded in
/// their own format at `quality`, which must lie in `(0, 1]`. Name and
/// MIME type are preserved.
pub fn compress_image_if_needed(file: ImageFile, max_size_kb: u64, quality: f32) -> Result<ImageFile> {
    if !(quality > 0.0 && quality <= 1.0) {
        return Err(ServiceError::image(format!(
            "Quality must be in (0, 1], got {}",
            quality
        )));
    }

    let budget = max_size_kb.saturating_mul(1024);
    if file.size() <= budget {
        return Ok(file);
    }

    let format = ImageFormat::from_mime_type(&file.mime_type)
        .or_else(|| image::guess_format(&file.bytes).ok())
        .ok_or_else(|| ServiceError::image(format!("Unsupported image type: {}", file.mime_type)))?;

    let decoded = image::load_from_memory_with_format(&file.bytes, format)?;

    let ratio = (budget as f64 / file.size() as f64).sqrt();
    let (width, height) = scaled_dimensions(decoded.width(), decoded.height(), ratio);
    let resized = decoded.resize_exact(width, height, FilterType::Triangle);

    let bytes = encode(&resized, format, quality)?;

    log::debug!(
        "Compressed {} from {} to {} bytes ({}x{})",
        file.name,
        file.size(),
        bytes.len(),
        width,
        height
    );

    Ok(ImageFile {
        bytes,
        ..file
    })
}

fn scaled_dimensions(width: u32, height: u32, ratio: f64) -> (u32, u32) {
    let scale = |side: u32| ((side as f64 * ratio).floor() as u32).max(1);
    (scale(width), scale(height))
}

fn encode(image: &DynamicImage, format: ImageFormat, quality: f32) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();

    match format {
        ImageFormat::Jpeg => {
            let quality = (quality * 100.0).round().clamp(1.0, 100.0) as u8;
            let encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
            // JPEG has no alpha channel
            DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)?;
        }
        ImageFormat::Png => {
            image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        }
        other => {
            return Err(ServiceError::image(format!(
                "Cannot re-encode {:?} images",
                other
            )))
        }
    }

    Ok(bytes)
}
