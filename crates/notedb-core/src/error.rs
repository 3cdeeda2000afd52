use crate::{
    key::Partition,
    set::{EntitySetCorruption, EntitySetEncodeError},
};
use thiserror::Error as ThisError;

///
/// Error
///
/// Top-level engine error. Every failure is returned to the immediate
/// caller; the engine never logs-and-swallows and adds no retry logic.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

impl Error {
    /// Construct an `Unsupported` error for a feature the engine or a
    /// schema declines to implement. Callers handle this as a normal error
    /// path, never an abort.
    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }
}

///
/// DecodeError
/// (decode / corruption boundary)
///
/// Stored bytes do not parse as the expected type. A corrupted value is
/// surfaced, never treated as a zero value.
///

#[derive(Debug, ThisError)]
pub enum DecodeError {
    #[error("unsupported value format code 0x{found:02x}")]
    UnsupportedFormat { found: u8 },

    #[error("entity sequence decode failed: {0}")]
    EntitySet(#[from] EntitySetCorruption),

    #[error("value decode failed: {message}")]
    Value { message: String },
}

///
/// EncodeError
/// (serialize boundary)
///
/// A caller-supplied value cannot be serialized. Surfaced before any write
/// occurs.
///

#[derive(Debug, ThisError)]
pub enum EncodeError {
    #[error("entity sequence encode failed: {0}")]
    EntitySet(#[from] EntitySetEncodeError),

    #[error("value encode failed: {message}")]
    Value { message: String },
}

///
/// StoreError
///
/// Failures originating in the backing store, propagated unchanged.
///

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("entity allocation exhausted for partition {partition}")]
    AllocationExhausted { partition: Partition },

    #[error("backing store error: {message}")]
    Backend { message: String },
}
