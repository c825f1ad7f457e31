//! PROVENANCE Chain Service
//!
//! Records request → approve → execute → verify workflows as hash-chained
//! trails. Storage, redaction and transition rules are pluggable.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod policy;
pub mod sanitize;
pub mod service;

pub use config::ChainConfig;
pub use policy::{Permissive, StrictWorkflow, TransitionPolicy};
pub use sanitize::{NoopSanitizer, Sanitizer};
pub use service::{ChainService, RequestInput};
