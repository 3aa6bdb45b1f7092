//! Image format detection from magic bytes.

use crate::error::{Error, Result};

/// Image container formats recognized in fetched bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// PNG
    Png,
    /// JPEG
    Jpeg,
    /// GIF (87a or 89a)
    Gif,
    /// Windows bitmap
    Bmp,
    /// WebP (RIFF container)
    Webp,
    /// SVG markup (vector, not embeddable as a bitmap)
    Svg,
}

impl ImageKind {
    /// MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Gif => "image/gif",
            ImageKind::Bmp => "image/bmp",
            ImageKind::Webp => "image/webp",
            ImageKind::Svg => "image/svg+xml",
        }
    }

    /// Whether the format is a raster image the decoder can measure.
    pub fn is_raster(&self) -> bool {
        !matches!(self, ImageKind::Svg)
    }
}

impl std::fmt::Display for ImageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime_type())
    }
}

const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];

/// Detect the image format of a byte buffer.
///
/// # Returns
/// * `Ok(ImageKind)` if the header matches a known format
/// * `Err(Error::UnknownImageFormat)` otherwise
pub fn detect_image_format(data: &[u8]) -> Result<ImageKind> {
    if data.starts_with(PNG_MAGIC) {
        return Ok(ImageKind::Png);
    }
    if data.starts_with(JPEG_MAGIC) {
        return Ok(ImageKind::Jpeg);
    }
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Ok(ImageKind::Gif);
    }
    if data.starts_with(b"BM") && data.len() > 14 {
        return Ok(ImageKind::Bmp);
    }
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Ok(ImageKind::Webp);
    }
    if looks_like_svg(data) {
        return Ok(ImageKind::Svg);
    }
    Err(Error::UnknownImageFormat)
}

/// Check if bytes start with a PNG signature.
pub fn is_png(data: &[u8]) -> bool {
    data.starts_with(PNG_MAGIC)
}

fn looks_like_svg(data: &[u8]) -> bool {
    let head = &data[..data.len().min(256)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}
