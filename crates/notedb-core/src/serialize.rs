use crate::error::{DecodeError, EncodeError};
use serde::{Serialize, de::DeserializeOwned};
use serde_cbor::{from_slice, to_vec};
use std::panic::{AssertUnwindSafe, catch_unwind};
use thiserror::Error as ThisError;

/// Format code for CBOR payloads. Serialized values carry a single leading
/// format byte so the payload encoding can evolve without rekeying stored
/// data; this is the only format currently supported.
pub const FORMAT_CBOR: u8 = 0;

/// Decode bound for untrusted stored payloads.
const MAX_VALUE_BYTES: usize = 4 * 1024 * 1024;

///
/// SerializeError
///

#[derive(Debug, ThisError)]
pub enum SerializeError {
    #[error("serialize error: {0}")]
    Serialize(String),

    #[error("deserialize error: {0}")]
    Deserialize(String),

    #[error("unsupported format code 0x{found:02x}")]
    UnsupportedFormat { found: u8 },
}

impl From<SerializeError> for EncodeError {
    fn from(err: SerializeError) -> Self {
        Self::Value {
            message: err.to_string(),
        }
    }
}

impl From<SerializeError> for DecodeError {
    fn from(err: SerializeError) -> Self {
        match err {
            SerializeError::UnsupportedFormat { found } => Self::UnsupportedFormat { found },
            other => Self::Value {
                message: other.to_string(),
            },
        }
    }
}

/// Serialize a value into a format-tagged CBOR payload.
pub fn serialize<T>(value: &T) -> Result<Vec<u8>, SerializeError>
where
    T: Serialize,
{
    let payload = to_vec(value).map_err(|err| SerializeError::Serialize(err.to_string()))?;

    let mut out = Vec::with_capacity(1 + payload.len());
    out.push(FORMAT_CBOR);
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Deserialize a value produced by [`serialize`].
///
/// An empty byte sequence decodes to the type's zero value; a present but
/// unrecognized format byte is an error, never silently zero-valued.
///
/// Safety guarantees:
/// - Input size is bounded before decode.
/// - Any panic during decode is caught and reported as a deserialize error.
/// - No panic escapes this function.
pub fn deserialize<T>(bytes: &[u8]) -> Result<T, SerializeError>
where
    T: DeserializeOwned + Default,
{
    let Some((&format, payload)) = bytes.split_first() else {
        return Ok(T::default());
    };

    if format != FORMAT_CBOR {
        return Err(SerializeError::UnsupportedFormat { found: format });
    }

    if payload.len() > MAX_VALUE_BYTES {
        return Err(SerializeError::Deserialize(
            "payload exceeds maximum allowed size".into(),
        ));
    }

    let result = catch_unwind(AssertUnwindSafe(|| from_slice(payload)));

    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(SerializeError::Deserialize(err.to_string())),
        Err(_) => Err(SerializeError::Deserialize(
            "panic during CBOR deserialization".into(),
        )),
    }
}

///
/// TESTS
///
