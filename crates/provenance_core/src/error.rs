//! Core error types for PROVENANCE.

use std::fmt;

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// A required field is missing or malformed
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Not found
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    /// Already exists
    #[error("{kind} already exists: {id}")]
    Conflict { kind: String, id: String },

    /// Optimistic append rejected: the trail tip moved since it was read
    #[error("Stale tip for trail {trail_id}: expected {expected:?}, found {actual:?}")]
    StaleTip {
        trail_id: String,
        expected: String,
        actual: String,
    },

    /// Canonical encoding failed
    #[error("Encoding failed: {reason}")]
    Encoding { reason: String },

    /// Hash chain verification failed
    #[error(transparent)]
    Verification(#[from] VerificationError),

    /// Event type not allowed after the trail's current tip
    #[error("Transition rejected for trail {trail_id}: {from} -> {to}")]
    Transition {
        trail_id: String,
        from: String,
        to: String,
    },

    /// Pass-through failure from a storage backend
    #[error("Storage operation {operation} failed: {reason}")]
    Storage { operation: String, reason: String },
}

impl CoreError {
    /// Validation error for `field`
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Not-found error for an entity of `kind`
    #[must_use]
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Conflict error for an entity of `kind`
    #[must_use]
    pub fn conflict(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Conflict {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Wrap a backend failure with the name of the failing operation
    #[must_use]
    pub fn storage(operation: impl Into<String>, err: impl fmt::Display) -> Self {
        Self::Storage {
            operation: operation.into(),
            reason: err.to_string(),
        }
    }

    /// Whether this error reports tampering
    #[must_use]
    pub const fn is_verification(&self) -> bool {
        matches!(self, Self::Verification(_))
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encoding {
            reason: err.to_string(),
        }
    }
}

/// Where and why a persisted trail failed verification.
///
/// Terminal: never retried, never repaired.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("verification failed: trail={trail_id} event={event_id} index={index} reason={reason}")]
pub struct VerificationError {
    /// Trail being verified
    pub trail_id: String,
    /// Event at the failing position
    pub event_id: String,
    /// Position of the event in append order
    pub index: usize,
    /// What failed
    pub reason: VerificationReason,
}

/// Verification failure reasons
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationReason {
    /// Event 0 links to something
    FirstPrevHashNotEmpty { actual: String },
    /// Event links to something other than its predecessor's hash
    PrevHashMismatch { expected: String, actual: String },
    /// Stored hash differs from the recomputed one
    HashMismatch { expected: String, actual: String },
}

impl VerificationReason {
    /// Stable reason text
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FirstPrevHashNotEmpty { .. } => "first event prevHash must be empty",
            Self::PrevHashMismatch { .. } => "prevHash mismatch",
            Self::HashMismatch { .. } => "hash mismatch",
        }
    }
}

impl fmt::Display for VerificationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
