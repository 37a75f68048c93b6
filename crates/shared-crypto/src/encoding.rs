//! # Key Text Decoding
//!
//! Keys arrive either as PEM-like blocks or as a bare hex/base64 string.
//! PEM header and footer lines (`-----BEGIN ... KEY-----`) are dropped and
//! the remaining lines are base64-decoded.
//!
//! Decoded blobs are often longer than the raw key: key files carry an
//! algorithm-identifier prefix, and some private key files append the public
//! half. [`trim_to_key_length`] handles both with one rule.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

/// Decode key text into bytes, or `None` if it is neither PEM, hex nor base64.
pub fn decode_key_text(text: &str) -> Option<Vec<u8>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if text.starts_with("-----") {
        let body: String = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.starts_with("-----"))
            .collect();
        return match STANDARD.decode(body) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                debug!(reason = %err, "PEM body could not be read");
                None
            }
        };
    }

    let raw = text.strip_prefix("0x").unwrap_or(text);
    if raw.len() % 2 == 0 && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
        return hex::decode(raw).ok();
    }
    match STANDARD.decode(text) {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            debug!(reason = %err, "key text is neither hex nor base64");
            None
        }
    }
}

/// Cut a decoded blob down to `key_length` bytes.
///
/// Drops `len % key_length` leading bytes (an identifier prefix), then keeps
/// the first `key_length` bytes of what remains (the private half of a
/// private‖public blob).
pub fn trim_to_key_length(bytes: &[u8], key_length: usize) -> Option<&[u8]> {
    if key_length == 0 || bytes.len() < key_length {
        return None;
    }
    let skip = bytes.len() % key_length;
    Some(&bytes[skip..skip + key_length])
}
