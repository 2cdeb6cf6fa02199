//! Normalization of legacy (base64) storage ids.
//!
//! Earlier repository generations stored asset ids base64-encoded. Resolution
//! results always expose the decoded form so a designer can open the asset
//! directly. Detection is a format check: an id that is valid, canonically
//! padded standard base64 is treated as legacy-encoded.

use base64::{engine::general_purpose::STANDARD, Engine};
use std::borrow::Cow;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LegacyIdError {
    #[error("legacy id {id} does not decode to UTF-8: {reason}")]
    InvalidUtf8 { id: String, reason: String },
}

/// Raw bytes of a legacy-encoded id, `None` for ids that are not legacy.
fn legacy_bytes(id: &str) -> Option<Vec<u8>> {
    if id.is_empty() {
        return None;
    }
    STANDARD.decode(id).ok()
}

/// Decode a legacy-encoded id; other ids are returned unchanged.
pub fn normalize_storage_id(id: &str) -> Result<Cow<'_, str>, LegacyIdError> {
    let Some(bytes) = legacy_bytes(id) else {
        return Ok(Cow::Borrowed(id));
    };
    String::from_utf8(bytes)
        .map(Cow::Owned)
        .map_err(|e| LegacyIdError::InvalidUtf8 {
            id: id.to_string(),
            reason: e.utf8_error().to_string(),
        })
}

/// [`normalize_storage_id`] with fallback: an undecodable legacy id is kept
/// as stored and a warning is logged.
pub fn canonical_storage_id(id: &str) -> String {
    match normalize_storage_id(id) {
        Ok(canonical) => canonical.into_owned(),
        Err(e) => {
            tracing::warn!(error = %e, "keeping stored id as-is");
            id.to_string()
        }
    }
}
