//! Hash chain for tamper-evident trails.
//!
//! Each event's `prev_hash` must equal the previous event's `hash`, and each
//! stored `hash` must equal the digest of the event's canonical encoding.

use crate::encoding::CanonicalEncode;
use crate::event::Event;
use provenance_core::{CoreResult, Digest, VerificationError, VerificationReason};

/// Lowercase hex SHA-256 of the event's canonical encoding.
///
/// # Errors
///
/// Returns an encoding error if any field cannot be represented
pub fn compute_event_hash(event: &Event) -> CoreResult<String> {
    let bytes = event.canonical_bytes()?;
    Ok(Digest::compute(&bytes).to_hex())
}

impl Event {
    /// Link to `prev_hash` and stamp the event's own hash
    ///
    /// # Errors
    ///
    /// Returns an encoding error if any field cannot be represented
    pub fn seal(&mut self, prev_hash: impl Into<String>) -> CoreResult<()> {
        self.prev_hash = prev_hash.into();
        self.hash = compute_event_hash(self)?;
        Ok(())
    }
}

/// Validates a trail event by event, in persisted order
#[derive(Debug, Clone)]
pub struct ChainValidator {
    trail_id: String,
    expected_prev: String,
    index: usize,
}

impl ChainValidator {
    /// Create a new validator
    #[must_use]
    pub fn new(trail_id: impl Into<String>) -> Self {
        Self {
            trail_id: trail_id.into(),
            expected_prev: String::new(),
            index: 0,
        }
    }

    /// Validate the next event
    ///
    /// # Errors
    ///
    /// Returns [`provenance_core::CoreError::Verification`] on the first broken link or
    /// altered event, or an encoding error if the event cannot be hashed
    pub fn validate(&mut self, event: &Event) -> CoreResult<()> {
        if event.prev_hash != self.expected_prev {
            let reason = if self.index == 0 {
                VerificationReason::FirstPrevHashNotEmpty {
                    actual: event.prev_hash.clone(),
                }
            } else {
                VerificationReason::PrevHashMismatch {
                    expected: self.expected_prev.clone(),
                    actual: event.prev_hash.clone(),
                }
            };
            return Err(self.failure(event, reason).into());
        }

        let expected = compute_event_hash(event)?;
        if event.hash != expected {
            let reason = VerificationReason::HashMismatch {
                expected,
                actual: event.hash.clone(),
            };
            return Err(self.failure(event, reason).into());
        }

        self.expected_prev.clone_from(&event.hash);
        self.index += 1;
        Ok(())
    }

    /// Hash the next event must link to
    #[must_use]
    pub fn expected(&self) -> &str {
        &self.expected_prev
    }

    /// Number of events validated so far
    #[must_use]
    pub fn validated(&self) -> usize {
        self.index
    }

    fn failure(&self, event: &Event, reason: VerificationReason) -> VerificationError {
        VerificationError {
            trail_id: self.trail_id.clone(),
            event_id: event.id.clone(),
            index: self.index,
            reason,
        }
    }
}

/// Verify a full trail; the first failure aborts.
///
/// # Errors
///
/// Returns [`provenance_core::CoreError::Verification`] describing the first
/// discontinuity, or an encoding error
pub fn verify_chain(trail_id: &str, events: &[Event]) -> CoreResult<()> {
    let mut validator = ChainValidator::new(trail_id);
    for event in events {
        validator.validate(event)?;
    }
    tracing::trace!(trail_id, events = events.len(), "hash chain intact");
    Ok(())
}
