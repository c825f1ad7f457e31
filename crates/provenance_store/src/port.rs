//! The storage port.
//!
//! Backends persist trails and their events durably and in append order.
//! Appends are optimistic: the caller names the tip hash it chained from and
//! the backend must reject the append if the trail has moved on. Backends
//! must make the tip check and the write one atomic step, so two writers
//! racing on a trail can never fork it.
//!
//! I/O failures come back as `CoreError::storage("<method>", err)` naming the
//! trait method that failed, e.g. `"append_event"`. The service surfaces them
//! unchanged and never retries.

use async_trait::async_trait;
use provenance_core::CoreResult;
use provenance_log::{Event, Query, Trail};
use std::sync::Arc;

/// Durable, ordered, per-trail event storage
#[async_trait]
pub trait TrailStore: Send + Sync {
    /// Create a trail with no events
    ///
    /// # Errors
    ///
    /// `Conflict` if the trail id already exists
    async fn create_trail(&self, trail: Trail) -> CoreResult<()>;

    /// Append `event` if the trail's tip hash still equals `expected_tip`
    /// (`""` for a trail with no events)
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown trail, `StaleTip` if the tip moved
    async fn append_event(&self, event: Event, expected_tip: &str) -> CoreResult<()>;

    /// Most recently appended event, `None` for an empty trail
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown trail
    async fn latest_event(&self, trail_id: &str) -> CoreResult<Option<Event>>;

    /// The trail and all its events in append order
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown trail
    async fn get_trail(&self, trail_id: &str) -> CoreResult<(Trail, Vec<Event>)>;

    /// Matching events newest-first, truncated to the limit after filtering
    ///
    /// # Errors
    ///
    /// `Storage` for backend failures
    async fn query_events(&self, query: &Query) -> CoreResult<Vec<Event>>;
}

#[async_trait]
impl<T: TrailStore + ?Sized> TrailStore for Arc<T> {
    async fn create_trail(&self, trail: Trail) -> CoreResult<()> {
        (**self).create_trail(trail).await
    }

    async fn append_event(&self, event: Event, expected_tip: &str) -> CoreResult<()> {
        (**self).append_event(event, expected_tip).await
    }

    async fn latest_event(&self, trail_id: &str) -> CoreResult<Option<Event>> {
        (**self).latest_event(trail_id).await
    }

    async fn get_trail(&self, trail_id: &str) -> CoreResult<(Trail, Vec<Event>)> {
        (**self).get_trail(trail_id).await
    }

    async fn query_events(&self, query: &Query) -> CoreResult<Vec<Event>> {
        (**self).query_events(query).await
    }
}
