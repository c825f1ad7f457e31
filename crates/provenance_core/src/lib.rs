//! PROVENANCE Core Types
//!
//! This crate contains pure types and logic with no I/O.
//! Digests, identifiers, clocks and the error types shared by every
//! other crate in the workspace.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod hash;
pub mod id;
pub mod time;

// Re-exports
pub use error::{CoreError, CoreResult, VerificationError, VerificationReason};
pub use hash::{short_hex, Digest};
pub use id::{generate_id, id_from_bytes, IdSource, OsIdSource, SeededIdSource, ID_BYTES};
pub use time::{unix_nanos, Clock, FixedClock, SystemClock};
