//! Pre-hash redaction hook.
//!
//! Sanitizers run before an event is hashed, so the chain locks in the
//! sanitized content and the raw values never reach storage.

use provenance_log::{Command, Target};

/// Lets the host application scrub secrets from targets and commands
pub trait Sanitizer: Send + Sync {
    /// Transform targets before they are recorded
    fn sanitize_targets(&self, targets: Vec<Target>) -> Vec<Target>;

    /// Transform commands before they are recorded
    fn sanitize_commands(&self, commands: Vec<Command>) -> Vec<Command>;
}

/// Records everything as given
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSanitizer;

impl Sanitizer for NoopSanitizer {
    fn sanitize_targets(&self, targets: Vec<Target>) -> Vec<Target> {
        targets
    }

    fn sanitize_commands(&self, commands: Vec<Command>) -> Vec<Command> {
        commands
    }
}
