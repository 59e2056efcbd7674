use std::fmt::Display;

use crate::error::EncodingError;

/// Percent-encoded search keyword, ready to be placed in a query string
///
/// Only [`encode`] and [`encode_bytes`] produce values of this type, so the
/// search client never sees raw user text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedQuery(String);

impl EncodedQuery {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EncodedQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Turns typed search text into a query component
///
/// Everything except ASCII alphanumerics and `-._~` is escaped as `%XX` over
/// the UTF-8 bytes, control characters included. Empty or whitespace-only
/// text is a no-op search and returns `Ok(None)`.
pub fn encode(raw: &str) -> Result<Option<EncodedQuery>, EncodingError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(EncodedQuery(urlencoding::encode(raw).into_owned())))
}

/// Same as [`encode`] for text that arrives as raw bytes
pub fn encode_bytes(raw: &[u8]) -> Result<Option<EncodedQuery>, EncodingError> {
    let text = std::str::from_utf8(raw).map_err(|_| EncodingError::InvalidUtf8)?;
    encode(text)
}
