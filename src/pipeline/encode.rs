//! Image encoding: raw image bytes -> base64 for the request body.
//!
//! The generate API accepts images as base64 strings in the JSON request.
//! The bytes are sent exactly as read from disk (the renderer already
//! produced PNG); no re-encoding happens here.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

/// Base64-encode image bytes for the `images` field of a generate request.
pub fn encode_image(bytes: &[u8]) -> String {
    let b64 = STANDARD.encode(bytes);
    debug!("Converted to base64: {}...", &b64[..b64.len().min(10)]);
    b64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_round_trips() {
        let b64 = encode_image(b"\x89PNG\r\n\x1a\n");
        let decoded = STANDARD.decode(&b64).expect("valid base64");
        assert_eq!(decoded, b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn encode_empty_input() {
        assert_eq!(encode_image(b""), "");
    }
}
