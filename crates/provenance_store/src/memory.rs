//! In-memory trail store.

use crate::port::TrailStore;
use async_trait::async_trait;
use provenance_core::{CoreError, CoreResult};
use provenance_log::{Event, Query, Trail};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Store statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Total number of trails
    pub trail_count: usize,
    /// Total number of events across trails
    pub event_count: usize,
    /// Appends rejected because the tip had moved
    pub stale_rejections: u64,
}

#[derive(Debug, Default)]
struct Inner {
    trails: HashMap<String, Trail>,
    /// trail id => events in append order
    events: HashMap<String, Vec<Event>>,
    stats: StoreStats,
}

/// In-memory trail store.
///
/// One write lock covers the tip check and the push of every append.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get store statistics
    pub async fn stats(&self) -> StoreStats {
        self.inner.read().await.stats.clone()
    }

    /// Rewrite a trail's persisted events in place, bypassing the chain.
    ///
    /// Simulates someone editing storage directly.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown trail
    #[cfg(feature = "test-util")]
    pub async fn rewrite_events<F>(&self, trail_id: &str, rewrite: F) -> CoreResult<()>
    where
        F: FnOnce(&mut Vec<Event>) + Send,
    {
        let mut inner = self.inner.write().await;
        let Inner { events, stats, .. } = &mut *inner;
        let trail_events = events
            .get_mut(trail_id)
            .ok_or_else(|| CoreError::not_found("Trail", trail_id))?;
        let before = trail_events.len();
        rewrite(trail_events);
        stats.event_count = stats.event_count + trail_events.len() - before;
        Ok(())
    }
}

#[async_trait]
impl TrailStore for MemoryStore {
    async fn create_trail(&self, trail: Trail) -> CoreResult<()> {
        let mut inner = self.inner.write().await;
        if inner.trails.contains_key(&trail.id) {
            return Err(CoreError::conflict("Trail", trail.id));
        }
        inner.events.insert(trail.id.clone(), Vec::new());
        inner.trails.insert(trail.id.clone(), trail);
        inner.stats.trail_count += 1;
        Ok(())
    }

    async fn append_event(&self, event: Event, expected_tip: &str) -> CoreResult<()> {
        let mut inner = self.inner.write().await;
        let Inner { events, stats, .. } = &mut *inner;

        let trail_events = events
            .get_mut(&event.trail_id)
            .ok_or_else(|| CoreError::not_found("Trail", event.trail_id.as_str()))?;

        let tip = trail_events.last().map_or("", |e| e.hash.as_str());
        if tip != expected_tip {
            let err = CoreError::StaleTip {
                trail_id: event.trail_id.clone(),
                expected: expected_tip.to_string(),
                actual: tip.to_string(),
            };
            stats.stale_rejections += 1;
            return Err(err);
        }

        trail_events.push(event);
        stats.event_count += 1;
        Ok(())
    }

    async fn latest_event(&self, trail_id: &str) -> CoreResult<Option<Event>> {
        let inner = self.inner.read().await;
        let trail_events = inner
            .events
            .get(trail_id)
            .ok_or_else(|| CoreError::not_found("Trail", trail_id))?;
        Ok(trail_events.last().cloned())
    }

    async fn get_trail(&self, trail_id: &str) -> CoreResult<(Trail, Vec<Event>)> {
        let inner = self.inner.read().await;
        let trail = inner
            .trails
            .get(trail_id)
            .ok_or_else(|| CoreError::not_found("Trail", trail_id))?;
        let trail_events = inner.events.get(trail_id).cloned().unwrap_or_default();
        Ok((trail.clone(), trail_events))
    }

    async fn query_events(&self, query: &Query) -> CoreResult<Vec<Event>> {
        let inner = self.inner.read().await;
        let candidates = inner
            .events
            .values()
            .flatten()
            .filter(|e| query.matches(e))
            .cloned();
        let out = query.apply(candidates);
        tracing::trace!(results = out.len(), limit = query.limit, "queried events");
        Ok(out)
    }
}
