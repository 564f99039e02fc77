use std::borrow::Cow;

use super::SearchKind;
use crate::domain::DomainError;

/// A decoded search request, built once at request entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    kind: SearchKind,
    text: String,
}

impl SearchQuery {
    pub fn new(kind: SearchKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Decodes a raw, percent-encoded query string
    pub fn decode(kind: SearchKind, raw_query: &str) -> Result<Self, DomainError> {
        Ok(Self::new(kind, unescape_query(raw_query)?))
    }

    pub fn kind(&self) -> SearchKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Form-style unescape: `+` becomes a space and every `%XX` must be a valid escape
pub fn unescape_query(raw: &str) -> Result<String, DomainError> {
    let bytes = raw.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape = bytes.get(i + 1..i + 3);

            if !matches!(escape, Some(hex) if hex.iter().all(u8::is_ascii_hexdigit)) {
                return Err(DomainError::internal(format!(
                    "Invalid escape sequence at offset {} in query '{}'",
                    i, raw
                )));
            }

            i += 3;
        } else {
            i += 1;
        }
    }

    let spaced: Cow<'_, str> = if raw.contains('+') {
        Cow::Owned(raw.replace('+', " "))
    } else {
        Cow::Borrowed(raw)
    };

    urlencoding::decode(&spaced)
        .map(Cow::into_owned)
        .map_err(|e| DomainError::internal(format!("Failed to decode query '{}': {}", raw, e)))
}
