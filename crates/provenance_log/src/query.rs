//! Event queries: "what changed on device X last Tuesday?"

use crate::event::{Event, EventType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Filter over all trails' events.
///
/// Empty filters match everything; `limit == 0` means unlimited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Target type and id, both required to filter
    pub target: Option<(String, String)>,
    /// Inclusive lower bound
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound
    pub to: Option<DateTime<Utc>>,
    /// Allowed event types, empty for any
    pub event_types: Vec<EventType>,
    /// Maximum results after filtering
    pub limit: usize,
}

impl Query {
    /// Create a query matching everything
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only events touching this target
    #[must_use]
    pub fn for_target(mut self, kind: impl Into<String>, id: impl Into<String>) -> Self {
        self.target = Some((kind.into(), id.into()));
        self
    }

    /// Only events in `[from, to)`
    #[must_use]
    pub fn between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    /// Only events of these types
    #[must_use]
    pub fn with_types(mut self, types: impl IntoIterator<Item = EventType>) -> Self {
        self.event_types = types.into_iter().collect();
        self
    }

    /// At most `limit` results
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Whether `event` passes every filter
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        if self.from.is_some_and(|from| event.at < from) {
            return false;
        }
        if self.to.is_some_and(|to| event.at >= to) {
            return false;
        }
        if !self.event_types.is_empty() && !self.event_types.contains(&event.event_type) {
            return false;
        }
        match &self.target {
            Some((kind, id)) => event.touches(kind, id),
            None => true,
        }
    }

    /// Filter, order newest-first and truncate.
    ///
    /// The limit is applied only after every filter, so backends that
    /// pre-filter natively can still pass their candidates through here.
    #[must_use]
    pub fn apply(&self, events: impl IntoIterator<Item = Event>) -> Vec<Event> {
        let mut out: Vec<Event> = events.into_iter().filter(|e| self.matches(e)).collect();
        out.sort_by(|a, b| b.at.cmp(&a.at).then_with(|| a.id.cmp(&b.id)));
        if self.limit > 0 {
            out.truncate(self.limit);
        }
        out
    }
}
