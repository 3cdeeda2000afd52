//! Resumable index-scan cursors and their opaque wire tokens.
//!
//! This module owns only the cursor state and token codec; scan semantics
//! live with the partition handle that drives the iteration.

use thiserror::Error as ThisError;

// Defensive decode bound for untrusted cursor token input.
const MAX_CURSOR_TOKEN_HEX_LEN: usize = 8 * 1024;

const OFFSET_BYTES: usize = 8;

///
/// IndexCursor
///
/// Opaque resumable position in an ordered index scan: the fragment of the
/// last emitted entity plus how many entities already emitted shared that
/// fragment. A default cursor starts at the beginning of the index.
/// Re-invoking a scan with an unchanged cursor over unchanged data
/// continues with no gaps or duplicates, even mid-bucket.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IndexCursor {
    pub key: Vec<u8>,
    pub offset: usize,
}

impl IndexCursor {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            key: Vec::new(),
            offset: 0,
        }
    }

    /// Encode as an opaque hex token: `offset(8, u64 BE) | key bytes`.
    #[must_use]
    pub fn to_token(&self) -> String {
        let offset = u64::try_from(self.offset).unwrap_or(u64::MAX);

        let mut raw = Vec::with_capacity(OFFSET_BYTES + self.key.len());
        raw.extend_from_slice(&offset.to_be_bytes());
        raw.extend_from_slice(&self.key);
        encode_hex(&raw)
    }

    /// Decode a token produced by [`Self::to_token`].
    pub fn from_token(token: &str) -> Result<Self, CursorTokenError> {
        let raw = decode_hex(token)?;

        if raw.len() < OFFSET_BYTES {
            return Err(CursorTokenError::Truncated { len: raw.len() });
        }

        let mut offset_buf = [0u8; OFFSET_BYTES];
        offset_buf.copy_from_slice(&raw[..OFFSET_BYTES]);
        let offset = usize::try_from(u64::from_be_bytes(offset_buf))
            .map_err(|_| CursorTokenError::OffsetOverflow)?;

        Ok(Self {
            key: raw[OFFSET_BYTES..].to_vec(),
            offset,
        })
    }
}

///
/// CursorTokenError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum CursorTokenError {
    #[error("cursor token is empty")]
    Empty,

    #[error("cursor token exceeds max length: {len} hex chars (max {max})")]
    TooLong { len: usize, max: usize },

    #[error("cursor token must have an even number of hex characters")]
    OddLength,

    #[error("invalid hex character at position {position}")]
    InvalidHex { position: usize },

    #[error("cursor token is truncated: {len} bytes")]
    Truncated { len: usize },

    #[error("cursor offset does not fit this platform")]
    OffsetOverflow,
}

/// Encode raw cursor bytes as a lowercase hex token.
#[must_use]
fn encode_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        use std::fmt::Write as _;
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Decode a lowercase/uppercase hex token into raw bytes.
///
/// The token may include surrounding whitespace, which is trimmed.
fn decode_hex(token: &str) -> Result<Vec<u8>, CursorTokenError> {
    let token = token.trim();

    if token.is_empty() {
        return Err(CursorTokenError::Empty);
    }

    if token.len() > MAX_CURSOR_TOKEN_HEX_LEN {
        return Err(CursorTokenError::TooLong {
            len: token.len(),
            max: MAX_CURSOR_TOKEN_HEX_LEN,
        });
    }

    if token.len() % 2 != 0 {
        return Err(CursorTokenError::OddLength);
    }

    let mut out = Vec::with_capacity(token.len() / 2);
    let bytes = token.as_bytes();

    for idx in (0..bytes.len()).step_by(2) {
        let hi = decode_hex_nibble(bytes[idx])
            .ok_or(CursorTokenError::InvalidHex { position: idx + 1 })?;

        let lo = decode_hex_nibble(bytes[idx + 1])
            .ok_or(CursorTokenError::InvalidHex { position: idx + 2 })?;

        out.push((hi << 4) | lo);
    }

    Ok(out)
}

const fn decode_hex_nibble(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip() {
        let cursor = IndexCursor {
            key: b"test title".to_vec(),
            offset: 7,
        };

        let token = cursor.to_token();
        let decoded = IndexCursor::from_token(&token).expect("decode token");

        assert_eq!(decoded, cursor);
    }

    #[test]
    fn default_cursor_round_trips() {
        let token = IndexCursor::new().to_token();
        let decoded = IndexCursor::from_token(&token).expect("decode token");

        assert_eq!(decoded, IndexCursor::new());
    }

    #[test]
    fn from_token_rejects_empty_and_whitespace() {
        assert_eq!(
            IndexCursor::from_token("").expect_err("empty"),
            CursorTokenError::Empty
        );
        assert_eq!(
            IndexCursor::from_token("  \n\t").expect_err("whitespace"),
            CursorTokenError::Empty
        );
    }

    #[test]
    fn from_token_rejects_odd_length() {
        assert_eq!(
            IndexCursor::from_token("abc").expect_err("odd length"),
            CursorTokenError::OddLength
        );
    }

    #[test]
    fn from_token_rejects_invalid_hex() {
        assert!(matches!(
            IndexCursor::from_token("zz".repeat(OFFSET_BYTES).as_str()),
            Err(CursorTokenError::InvalidHex { position: 1 })
        ));
    }

    #[test]
    fn from_token_rejects_truncated_payload() {
        assert!(matches!(
            IndexCursor::from_token("aabb"),
            Err(CursorTokenError::Truncated { len: 2 })
        ));
    }

    #[test]
    fn from_token_enforces_max_length() {
        let oversized = "aa".repeat(MAX_CURSOR_TOKEN_HEX_LEN / 2 + 1);
        assert!(matches!(
            IndexCursor::from_token(&oversized),
            Err(CursorTokenError::TooLong { .. })
        ));
    }
}
