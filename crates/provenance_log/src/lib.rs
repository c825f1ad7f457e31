//! PROVENANCE Event Log
//!
//! Change-management trails as append-only, hash-chained event sequences.
//! Events are canonically encoded so that unordered metadata never changes
//! a hash, while any edit, deletion or reordering does.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chain;
pub mod encoding;
pub mod event;
pub mod query;

pub use chain::{compute_event_hash, verify_chain, ChainValidator};
pub use encoding::{sorted_pairs, CanonicalEncode, KeyValue};
pub use event::{Actor, ActorRole, Command, Event, EventType, Evidence, Outcome, Target, Trail};
pub use query::Query;
