//! PROVENANCE Storage
//!
//! The storage port consumed by the chain service and verifier, plus the
//! in-memory reference implementation used by tests and embedders.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;
pub mod port;

pub use memory::{MemoryStore, StoreStats};
pub use port::TrailStore;
