//! Image media-type sniffing from magic bytes.

pub const PNG: &str = "image/png";
pub const JPEG: &str = "image/jpeg";
pub const WEBP: &str = "image/webp";
pub const GIF: &str = "image/gif";

/// Media type recognised from the leading bytes, if any.
pub fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(PNG),
        [0xFF, 0xD8, 0xFF, ..] => Some(JPEG),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some(WEBP),
        [0x47, 0x49, 0x46, 0x38, ..] => Some(GIF),
        _ => None,
    }
}

/// Like [`sniff_image_mime`] but falls back to PNG, the format image models
/// return by default.
pub fn detect_image_mime(bytes: &[u8]) -> &'static str {
    sniff_image_mime(bytes).unwrap_or_else(|| {
        tracing::warn!(
            "Unrecognized image format (first 4 bytes: {:02X?}), falling back to {}",
            &bytes[..bytes.len().min(4)],
            PNG
        );
        PNG
    })
}
