//! ## Crate layout
//! - `core`: storage engine runtime — keys, codecs, stores, index upkeep,
//!   cursors, and observability.
//! - `prelude`: the surface a schema crate needs to define components and
//!   drive the engine.
//!
//! Domain schema crates (see `schema/` in the workspace) depend on this
//! facade rather than on `notedb-core` directly.

pub use notedb_core as core;

pub use notedb_core::Error;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use notedb_core::prelude::*;
    pub use serde::{Deserialize, Serialize};
}
