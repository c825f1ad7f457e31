//! Trail and event types.
//!
//! Events are immutable once sealed and part of their trail's hash chain.
//! Map-valued fields are plain `HashMap`s; ordering is imposed only by the
//! canonical encoder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Event type - one step of a change workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// A change was asked for; always first
    Requested,
    Approved,
    Executed,
    /// The change was confirmed to have taken effect
    Verified,
    /// The change did not go through
    Failed,
}

impl EventType {
    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requested => "REQUESTED",
            Self::Approved => "APPROVED",
            Self::Executed => "EXECUTED",
            Self::Verified => "VERIFIED",
            Self::Failed => "FAILED",
        }
    }

    /// Whether the workflow ends with this step
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Verified | Self::Failed)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role an actor plays in a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRole {
    Requester,
    Approver,
    Executor,
    Verifier,
}

/// Who performed a step: a user or a service account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub name: Option<String>,
    pub role: Option<ActorRole>,
    /// ip, team, auth method, ...
    pub meta: HashMap<String, String>,
}

impl Actor {
    /// Create an actor with only an id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set display name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set role
    #[must_use]
    pub fn with_role(mut self, role: ActorRole) -> Self {
        self.role = Some(role);
        self
    }

    /// Add a metadata entry
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

/// The thing being changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// e.g. "network_device", "server", "k8s_cluster"
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    /// hostname, site, vendor, ...
    pub labels: HashMap<String, String>,
}

impl Target {
    /// Create a target
    #[must_use]
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            labels: HashMap::new(),
        }
    }

    /// Add a label
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Whether this target has the given type and id
    #[must_use]
    pub fn is(&self, kind: &str, id: &str) -> bool {
        self.kind == kind && self.id == id
    }
}

/// A command issued against a target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// e.g. "cli", "netconf", "rest"
    pub kind: String,
    pub raw: String,
    pub diff: String,
    pub output: String,
    pub output_meta: HashMap<String, String>,
}

impl Command {
    /// Create a command from its kind and raw text
    #[must_use]
    pub fn new(kind: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            raw: raw.into(),
            ..Self::default()
        }
    }

    /// Set the config diff
    #[must_use]
    pub fn with_diff(mut self, diff: impl Into<String>) -> Self {
        self.diff = diff.into();
        self
    }

    /// Set the captured output
    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    /// Add an output metadata entry
    #[must_use]
    pub fn with_output_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.output_meta.insert(key.into(), value.into());
        self
    }
}

/// Result of executing a change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// "SUCCESS" / "FAILED" / "PARTIAL"
    pub status: String,
    pub message: Option<String>,
    pub exit_code: Option<i32>,
}

impl Outcome {
    /// Create an outcome with a status
    #[must_use]
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            message: None,
            exit_code: None,
        }
    }

    /// Set message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set exit code
    #[must_use]
    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }
}

/// Proof that a change had the intended effect
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    /// "show_cmd", "snapshot_hash", "ticket_link", "note"
    pub kind: String,
    #[serde(rename = "ref")]
    pub reference: String,
    pub detail: HashMap<String, String>,
}

impl Evidence {
    /// Create evidence
    #[must_use]
    pub fn new(kind: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            reference: reference.into(),
            detail: HashMap::new(),
        }
    }

    /// Add a detail entry
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.detail.insert(key.into(), value.into());
        self
    }
}

/// One immutable step of a trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub trail_id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub at: DateTime<Utc>,
    pub actor: Actor,
    pub targets: Vec<Target>,
    pub commands: Vec<Command>,
    pub result: Option<Outcome>,
    pub evidence: Vec<Evidence>,
    pub correlation_id: String,
    /// Hash of the previous event in the trail, empty for the first
    pub prev_hash: String,
    /// Digest of everything above; empty until sealed
    pub hash: String,
}

impl Event {
    /// Create an unsealed event with no payload
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        trail_id: impl Into<String>,
        event_type: EventType,
        at: DateTime<Utc>,
        actor: Actor,
    ) -> Self {
        Self {
            id: id.into(),
            trail_id: trail_id.into(),
            event_type,
            at,
            actor,
            targets: Vec::new(),
            commands: Vec::new(),
            result: None,
            evidence: Vec::new(),
            correlation_id: String::new(),
            prev_hash: String::new(),
            hash: String::new(),
        }
    }

    #[must_use]
    pub fn with_targets(mut self, targets: Vec<Target>) -> Self {
        self.targets = targets;
        self
    }

    #[must_use]
    pub fn with_commands(mut self, commands: Vec<Command>) -> Self {
        self.commands = commands;
        self
    }

    #[must_use]
    pub fn with_result(mut self, result: Outcome) -> Self {
        self.result = Some(result);
        self
    }

    #[must_use]
    pub fn with_evidence(mut self, evidence: Vec<Evidence>) -> Self {
        self.evidence = evidence;
        self
    }

    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = correlation_id.into();
        self
    }

    /// Whether any target matches type and id
    #[must_use]
    pub fn touches(&self, kind: &str, id: &str) -> bool {
        self.targets.iter().any(|t| t.is(kind, id))
    }

    /// Whether a hash has been stamped
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        !self.hash.is_empty()
    }
}

/// One logical change grouping an ordered sequence of events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trail {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub correlation_id: String,
    pub targets: Vec<Target>,
}
