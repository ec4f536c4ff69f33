//! Opaque paging cursors
//!
//! A cursor is the URL-safe base64 of a small JSON document holding the
//! offset of the next page. Clients must treat it as opaque.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::errors::{GraphError, Result};

#[derive(Debug, Serialize, Deserialize)]
struct CursorState {
    offset: usize,
}

pub fn encode_offset(offset: usize) -> String {
    let json = serde_json::to_vec(&CursorState { offset }).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// Decode a cursor produced by [`encode_offset`]
///
/// # Errors
///
/// Returns `Validation` for anything that is not such a cursor.
pub fn decode_offset(cursor: &str) -> Result<usize> {
    let invalid = || GraphError::validation("invalid cursor");
    let bytes = URL_SAFE_NO_PAD
        .decode(cursor.trim())
        .map_err(|_| invalid())?;
    let state: CursorState = serde_json::from_slice(&bytes).map_err(|_| invalid())?;
    Ok(state.offset)
}
