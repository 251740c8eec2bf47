//! Image payload encoding for vision model requests.
//!
//! The MIME type is always sniffed from the bytes themselves; file names and
//! extensions are never consulted.

use base64::Engine;

/// Number of leading bytes inspected by the text heuristic.
const SNIFF_LEN: usize = 512;

/// Fallback for content that looks like text.
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Fallback for content that matches nothing.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Base64-encoded image ready to send to an LLM API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type detected from the content (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes, sniffing the MIME type.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let media_type = sniff_mime(bytes);
        tracing::trace!(len = bytes.len(), media_type, "Encoding image payload");

        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.to_string(),
        }
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// Detect a MIME type from content.
///
/// Magic numbers known to `infer` win. Otherwise content is classified as
/// plain text when its first 512 bytes hold no binary control bytes, and as
/// `application/octet-stream` when they do.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type();
    }

    let head = &bytes[..bytes.len().min(SNIFF_LEN)];
    if head.iter().any(|&b| is_binary_byte(b)) {
        OCTET_STREAM
    } else {
        TEXT_PLAIN
    }
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}
