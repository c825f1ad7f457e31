//! Transition rules between workflow steps.
//!
//! The service is permissive by default: any event type may follow any
//! other. A stricter policy can be installed without touching the chain.

use provenance_log::EventType;

/// Decides whether `next` may be appended after a trail's latest event type
pub trait TransitionPolicy: Send + Sync {
    /// `previous` is `None` for a trail with no events
    fn allows(&self, previous: Option<EventType>, next: EventType) -> bool;
}

/// Treats the trail as a generic append-only log
#[derive(Debug, Clone, Copy, Default)]
pub struct Permissive;

impl TransitionPolicy for Permissive {
    fn allows(&self, _previous: Option<EventType>, _next: EventType) -> bool {
        true
    }
}

/// REQUESTED → APPROVED → EXECUTED → VERIFIED, with FAILED allowed from any
/// non-terminal step
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictWorkflow;

impl TransitionPolicy for StrictWorkflow {
    fn allows(&self, previous: Option<EventType>, next: EventType) -> bool {
        use EventType::*;
        match (previous, next) {
            (None, Requested) => true,
            (Some(Requested), Approved) => true,
            (Some(Approved), Executed) => true,
            (Some(Executed), Verified) => true,
            (Some(prev), Failed) => !prev.is_terminal(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provenance_log::EventType::*;

    #[test]
    fn test_permissive_allows_anything() {
        let policy = Permissive;
        assert!(policy.allows(None, Verified));
        assert!(policy.allows(Some(Requested), Verified));
        assert!(policy.allows(Some(Failed), Requested));
    }

    #[test]
    fn test_strict_happy_path() {
        let policy = StrictWorkflow;
        assert!(policy.allows(None, Requested));
        assert!(policy.allows(Some(Requested), Approved));
        assert!(policy.allows(Some(Approved), Executed));
        assert!(policy.allows(Some(Executed), Verified));
    }

    #[test]
    fn test_strict_rejects_skips_and_reopens() {
        let policy = StrictWorkflow;
        assert!(!policy.allows(None, Approved));
        assert!(!policy.allows(Some(Requested), Executed));
        assert!(!policy.allows(Some(Requested), Verified));
        assert!(!policy.allows(Some(Verified), Executed));
        assert!(!policy.allows(Some(Approved), Approved));
    }

    #[test]
    fn test_strict_failure_edges() {
        let policy = StrictWorkflow;
        assert!(policy.allows(Some(Requested), Failed));
        assert!(policy.allows(Some(Executed), Failed));
        assert!(!policy.allows(Some(Verified), Failed));
        assert!(!policy.allows(Some(Failed), Failed));
        assert!(!policy.allows(None, Failed));
    }
}
