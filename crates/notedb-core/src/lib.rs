//! Core runtime for NoteDB: a schema-driven entity/component storage engine
//! over any sorted key-value backend.
//!
//! Components are typed values attached to opaque entity ids, persisted as
//! byte-encoded key/value pairs. Every write keeps the component's secondary
//! indexes exact; reads flow through exact-match bucket lookups or
//! cursor-resumable paginated scans. The backing store is a contract
//! ([`store::Store`]), not an implementation — [`store::MemoryStore`] is the
//! reference instance for tests and embedding.
#![warn(unreachable_pub)]

pub mod cursor;
pub mod error;
pub mod key;
pub mod obs;
pub mod serialize;
pub mod set;
pub mod store;
pub mod txn;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

pub use error::Error;

///
/// Prelude
///
/// Prelude contains the vocabulary a schema crate needs to define and use
/// components. No internal key builders or sinks are re-exported here.
///

pub mod prelude {
    pub use crate::{
        cursor::IndexCursor,
        error::{DecodeError, EncodeError, Error, StoreError},
        key::{Component, Entity, Fragment, IndexId, Partition},
        set::{EntityList, EntitySet},
        store::{MemoryStore, Store},
        txn::Partitioned,
        value::{ComponentKind, IndexModel},
    };
}
