//! Transport encoding of signed artifacts.
//!
//! The artifact travels as `<viewer prefix><base64>`: a URL an operator can
//! open on the online machine to inspect the transaction before broadcast,
//! or scan from the QR code drawn on the offline one.

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;

use crate::wallet::{ColdStorageError, ColdStorageResult};

/// Base64 (standard alphabet, padded) of the raw artifact bytes.
pub fn encode_artifact(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Inspection URL for an encoded artifact.
pub fn export_url(viewer_prefix: &str, encoded: &str) -> String {
    format!("{}{}", viewer_prefix, encoded)
}

/// Recover the artifact bytes from an export.
///
/// Accepts the full URL (with the given prefix or any `...#<base64>` URL)
/// or the bare base64 text, with surrounding whitespace.
pub fn decode_export(text: &str, viewer_prefix: &str) -> ColdStorageResult<Vec<u8>> {
    let text = text.trim();
    let encoded = text
        .strip_prefix(viewer_prefix)
        .or_else(|| text.rsplit_once('#').map(|(_, fragment)| fragment))
        .unwrap_or(text);
    let encoded: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();

    if encoded.is_empty() {
        return Err(ColdStorageError::Export("export contains no data".into()));
    }

    STANDARD
        .decode(&encoded)
        .or_else(|_| URL_SAFE.decode(&encoded))
        .map_err(|e| ColdStorageError::Export(format!("export is not valid base64: {}", e)))
}
