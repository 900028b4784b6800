//! Opaque cursor codec.
//!
//! A cursor is the base64 form of `cursor:<canonical field value>`. The
//! prefix versions the format: anything that decodes without it was not
//! produced by this encoder and is rejected rather than being allowed to
//! silently become a wrong boundary.

use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use base64::Engine;

use crate::error::{Error, Result};
use crate::query::Value;

const CURSOR_PREFIX: &str = "cursor:";

/// Encodes a sortable field value as an opaque cursor.
pub fn encode(value: &Value) -> String {
    BASE64_ENGINE.encode(format!("{CURSOR_PREFIX}{value}"))
}

/// Decodes a cursor back to the canonical field value it was built from.
///
/// Fails with [`Error::InvalidCursor`] when the input is not base64, not
/// UTF-8, or lacks the version prefix.
pub fn decode(cursor: &str) -> Result<String> {
    let bytes = BASE64_ENGINE
        .decode(cursor)
        .map_err(|_| Error::InvalidCursor)?;
    let decoded = String::from_utf8(bytes).map_err(|_| Error::InvalidCursor)?;
    decoded
        .strip_prefix(CURSOR_PREFIX)
        .map(str::to_owned)
        .ok_or(Error::InvalidCursor)
}
