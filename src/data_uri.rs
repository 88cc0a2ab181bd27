//! `data:` URI helpers for inline image payloads.

use crate::{Error, Result};
use base64::Engine as _;

/// Decoded form of a `data:<mime>;base64,<payload>` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DataUri {
    /// Parse and decode a base64 data URI.
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| Error::DataUri("missing 'data:' scheme".to_string()))?;

        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::DataUri("missing ',' separator".to_string()))?;

        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| Error::DataUri("only base64 payloads are supported".to_string()))?;

        if mime_type.is_empty() {
            return Err(Error::DataUri("missing media type".to_string()));
        }

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| Error::DataUri(format!("invalid base64 payload: {}", e)))?;

        Ok(Self {
            mime_type: mime_type.to_string(),
            bytes,
        })
    }
}

/// Build a data URI from an already base64-encoded payload.
pub fn from_base64(mime_type: &str, base64_data: &str) -> String {
    format!("data:{};base64,{}", mime_type, base64_data)
}

/// Build a data URI from raw bytes.
pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> String {
    from_base64(
        mime_type,
        &base64::engine::general_purpose::STANDARD.encode(bytes),
    )
}
