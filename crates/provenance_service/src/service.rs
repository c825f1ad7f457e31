//! The chain service.
//!
//! Every append follows the same path: read the trail's tip, build the
//! event, sanitize, hash over the canonical encoding, stamp `prev_hash` and
//! `hash`, then append conditioned on the tip still being current. A moved
//! tip surfaces as `StaleTip`; nothing is retried here.

use crate::config::ChainConfig;
use crate::policy::{Permissive, TransitionPolicy};
use crate::sanitize::{NoopSanitizer, Sanitizer};
use chrono::{DateTime, Utc};
use provenance_core::{
    short_hex, Clock, CoreError, CoreResult, IdSource, OsIdSource, SystemClock,
};
use provenance_log::{
    verify_chain, Actor, ActorRole, Command, Event, EventType, Evidence, Outcome, Query, Target,
    Trail,
};
use provenance_store::TrailStore;
use std::sync::Arc;

/// Input for opening a new trail
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestInput {
    /// Required, non-blank
    pub title: String,
    /// Free-form description
    pub description: String,
    /// Caller's ticket or request id, copied onto the trail and first event
    pub correlation_id: String,
    /// Id required; role defaults to REQUESTER
    pub requester: Actor,
    /// What the change touches; sanitized before recording
    pub targets: Vec<Target>,
}

/// Builds trails and appends hash-chained events to them
pub struct ChainService<S> {
    store: S,
    sanitizer: Arc<dyn Sanitizer>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdSource>,
    policy: Arc<dyn TransitionPolicy>,
    config: ChainConfig,
}

impl<S: TrailStore> ChainService<S> {
    /// Create a service over `store` with a no-op sanitizer, the system
    /// clock, OS-random ids and permissive transitions
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            sanitizer: Arc::new(NoopSanitizer),
            clock: Arc::new(SystemClock),
            ids: Arc::new(OsIdSource),
            policy: Arc::new(Permissive),
            config: ChainConfig::default(),
        }
    }

    /// Replace the pre-hash sanitizer
    #[must_use]
    pub fn with_sanitizer(mut self, sanitizer: Arc<dyn Sanitizer>) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    /// Replace the time source
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the id source
    #[must_use]
    pub fn with_ids(mut self, ids: Arc<dyn IdSource>) -> Self {
        self.ids = ids;
        self
    }

    /// Replace the transition policy
    #[must_use]
    pub fn with_policy(mut self, policy: Arc<dyn TransitionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the configuration
    #[must_use]
    pub fn with_config(mut self, config: ChainConfig) -> Self {
        self.config = config;
        self
    }

    /// The underlying store
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Open a trail and record its REQUESTED event. Returns the trail id.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank title or requester id, `Conflict` if the
    /// generated trail id already exists, or any storage/encoding failure
    pub async fn request_change(&self, input: RequestInput) -> CoreResult<String> {
        if input.title.trim().is_empty() {
            return Err(CoreError::validation("title", "title is required"));
        }
        if input.requester.id.trim().is_empty() {
            return Err(CoreError::validation(
                "requester.id",
                "requester actor id is required",
            ));
        }
        let trail_id = self.ids.next_id();
        self.check_transition(&trail_id, None, EventType::Requested)?;

        let mut requester = input.requester;
        requester.role.get_or_insert(ActorRole::Requester);

        let now = self.clock.now();
        let targets = self.sanitizer.sanitize_targets(input.targets);

        // Seal first: nothing is written if encoding fails.
        let mut event = Event::new(
            self.ids.next_id(),
            trail_id.as_str(),
            EventType::Requested,
            now,
            requester,
        )
        .with_targets(targets.clone())
        .with_correlation_id(input.correlation_id.as_str());
        event.seal("")?;

        let trail = Trail {
            id: trail_id.clone(),
            created_at: now,
            title: input.title,
            description: input.description,
            correlation_id: input.correlation_id,
            targets,
        };
        self.store.create_trail(trail).await?;
        tracing::info!(trail_id = %trail_id, "opened trail");

        self.store.append_event(event.clone(), "").await?;
        self.log_append(&event);

        Ok(trail_id)
    }

    /// Record an APPROVED event. A non-empty `note` becomes one evidence
    /// record of the configured note kind.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown trail, `StaleTip` if another writer
    /// appended concurrently, or any storage/encoding failure
    pub async fn approve(
        &self,
        trail_id: &str,
        mut approver: Actor,
        correlation_id: &str,
        note: &str,
    ) -> CoreResult<Event> {
        approver.role = Some(ActorRole::Approver);
        let evidence = if note.is_empty() {
            Vec::new()
        } else {
            vec![Evidence::new(self.config.note_evidence_kind.as_str(), note)]
        };
        let event = self
            .draft(trail_id, EventType::Approved, approver, correlation_id)
            .with_evidence(evidence);
        self.append(event).await
    }

    /// Record an EXECUTED event. Commands are sanitized before hashing.
    ///
    /// # Errors
    ///
    /// As [`ChainService::approve`]
    pub async fn execute(
        &self,
        trail_id: &str,
        mut executor: Actor,
        correlation_id: &str,
        commands: Vec<Command>,
        result: Outcome,
    ) -> CoreResult<Event> {
        executor.role = Some(ActorRole::Executor);
        let commands = self.sanitizer.sanitize_commands(commands);
        let event = self
            .draft(trail_id, EventType::Executed, executor, correlation_id)
            .with_commands(commands)
            .with_result(result);
        self.append(event).await
    }

    /// Record a VERIFIED event carrying `evidence`
    ///
    /// # Errors
    ///
    /// As [`ChainService::approve`]
    pub async fn verify(
        &self,
        trail_id: &str,
        mut verifier: Actor,
        correlation_id: &str,
        evidence: Vec<Evidence>,
    ) -> CoreResult<Event> {
        verifier.role = Some(ActorRole::Verifier);
        let event = self
            .draft(trail_id, EventType::Verified, verifier, correlation_id)
            .with_evidence(evidence);
        self.append(event).await
    }

    /// Record a FAILED event carrying `result`. The actor's role is kept,
    /// defaulting to EXECUTOR.
    ///
    /// # Errors
    ///
    /// As [`ChainService::approve`]
    pub async fn fail(
        &self,
        trail_id: &str,
        mut actor: Actor,
        correlation_id: &str,
        result: Outcome,
    ) -> CoreResult<Event> {
        actor.role.get_or_insert(ActorRole::Executor);
        let event = self
            .draft(trail_id, EventType::Failed, actor, correlation_id)
            .with_result(result);
        self.append(event).await
    }

    /// Events touching `target` in `[from, to)`, newest first. A `limit` of
    /// 0 falls back to the configured default.
    ///
    /// # Errors
    ///
    /// Storage failures
    pub async fn what_changed(
        &self,
        target: &Target,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: usize,
    ) -> CoreResult<Vec<Event>> {
        let limit = if limit == 0 {
            self.config.default_query_limit
        } else {
            limit
        };
        let query = Query::new()
            .for_target(target.kind.as_str(), target.id.as_str())
            .between(from, to)
            .with_limit(limit);
        self.store.query_events(&query).await
    }

    /// Run an arbitrary query
    ///
    /// # Errors
    ///
    /// Storage failures
    pub async fn query_events(&self, query: &Query) -> CoreResult<Vec<Event>> {
        self.store.query_events(query).await
    }

    /// A trail and its events in append order
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown trail
    pub async fn trail(&self, trail_id: &str) -> CoreResult<(Trail, Vec<Event>)> {
        self.store.get_trail(trail_id).await
    }

    /// Replay a trail's hash chain.
    ///
    /// # Errors
    ///
    /// `Verification` at the first discontinuity, `NotFound` for an unknown
    /// trail, or an encoding failure
    pub async fn verify_trail(&self, trail_id: &str) -> CoreResult<()> {
        let (_, events) = self.store.get_trail(trail_id).await?;
        match verify_chain(trail_id, &events) {
            Ok(()) => {
                tracing::info!(trail_id, events = events.len(), "trail verified");
                Ok(())
            }
            Err(CoreError::Verification(err)) => {
                tracing::warn!(
                    trail_id,
                    event_id = %err.event_id,
                    index = err.index,
                    reason = %err.reason,
                    "trail verification failed"
                );
                Err(err.into())
            }
            Err(err) => Err(err),
        }
    }

    fn draft(
        &self,
        trail_id: &str,
        event_type: EventType,
        actor: Actor,
        correlation_id: &str,
    ) -> Event {
        Event::new(self.ids.next_id(), trail_id, event_type, self.clock.now(), actor)
            .with_correlation_id(correlation_id)
    }

    async fn append(&self, mut event: Event) -> CoreResult<Event> {
        let latest = self.store.latest_event(&event.trail_id).await?;
        self.check_transition(
            &event.trail_id,
            latest.as_ref().map(|e| e.event_type),
            event.event_type,
        )?;

        let prev_hash = latest.map(|e| e.hash).unwrap_or_default();
        event.seal(prev_hash.as_str())?;

        if let Err(err) = self.store.append_event(event.clone(), &prev_hash).await {
            if matches!(err, CoreError::StaleTip { .. }) {
                tracing::warn!(
                    trail_id = %event.trail_id,
                    event_type = %event.event_type,
                    "append lost race for trail tip"
                );
            }
            return Err(err);
        }
        self.log_append(&event);
        Ok(event)
    }

    fn check_transition(
        &self,
        trail_id: &str,
        previous: Option<EventType>,
        next: EventType,
    ) -> CoreResult<()> {
        if self.policy.allows(previous, next) {
            return Ok(());
        }
        Err(CoreError::Transition {
            trail_id: trail_id.to_string(),
            from: previous.map_or_else(|| "NONE".to_string(), |t| t.to_string()),
            to: next.to_string(),
        })
    }

    fn log_append(&self, event: &Event) {
        let len = self.config.hash_preview_len;
        tracing::debug!(
            trail_id = %event.trail_id,
            event_id = %event.id,
            event_type = %event.event_type,
            prev = short_hex(&event.prev_hash, len),
            hash = short_hex(&event.hash, len),
            "appended event"
        );
    }
}
