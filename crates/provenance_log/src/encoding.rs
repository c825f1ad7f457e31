//! Canonical encoding used as the hashing input.
//!
//! The encoding is JSON over a fixed structural shape:
//! - every map becomes a list of `{"k","v"}` pairs sorted by key bytes,
//!   and an empty map is left out entirely
//! - timestamps are integer nanoseconds since the Unix epoch
//! - lists keep caller order
//! - absent optionals are left out, never written as `null`
//! - the event's own `hash` is never encoded; `id` and `prev_hash` always are

use crate::event::{Actor, ActorRole, Command, Event, EventType, Evidence, Outcome, Target};
use provenance_core::{time::unix_nanos, CoreResult};
use serde::Serialize;
use std::collections::HashMap;

/// One map entry in canonical position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyValue<'a> {
    pub k: &'a str,
    pub v: &'a str,
}

/// Sort a map's entries by key bytes. Empty maps yield `None`.
#[must_use]
pub fn sorted_pairs(map: &HashMap<String, String>) -> Option<Vec<KeyValue<'_>>> {
    if map.is_empty() {
        return None;
    }
    let mut pairs: Vec<KeyValue<'_>> = map
        .iter()
        .map(|(k, v)| KeyValue { k, v })
        .collect();
    pairs.sort_unstable_by(|a, b| a.k.as_bytes().cmp(b.k.as_bytes()));
    Some(pairs)
}

/// Trait for canonical serialization
pub trait CanonicalEncode {
    /// Encode to canonical bytes
    ///
    /// # Errors
    ///
    /// Returns [`provenance_core::CoreError::Encoding`] if any field cannot
    /// be represented
    fn canonical_bytes(&self) -> CoreResult<Vec<u8>>;
}

impl CanonicalEncode for Event {
    fn canonical_bytes(&self) -> CoreResult<Vec<u8>> {
        let form = CanonicalEvent {
            id: &self.id,
            trail_id: &self.trail_id,
            event_type: self.event_type,
            at_unix_nano: unix_nanos(&self.at)?,
            actor: CanonicalActor::from(&self.actor),
            correlation_id: &self.correlation_id,
            prev_hash: &self.prev_hash,
            targets: self.targets.iter().map(CanonicalTarget::from).collect(),
            commands: self.commands.iter().map(CanonicalCommand::from).collect(),
            result: self.result.as_ref().map(CanonicalOutcome::from),
            evidence: self.evidence.iter().map(CanonicalEvidence::from).collect(),
        };
        Ok(serde_json::to_vec(&form)?)
    }
}

// Field order below is the wire order. Changing it changes every hash.

#[derive(Serialize)]
struct CanonicalEvent<'a> {
    id: &'a str,
    trail_id: &'a str,
    #[serde(rename = "type")]
    event_type: EventType,
    at_unix_nano: i64,
    actor: CanonicalActor<'a>,
    correlation_id: &'a str,
    prev_hash: &'a str,
    targets: Vec<CanonicalTarget<'a>>,
    commands: Vec<CanonicalCommand<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<CanonicalOutcome<'a>>,
    evidence: Vec<CanonicalEvidence<'a>>,
}

#[derive(Serialize)]
struct CanonicalActor<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<ActorRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<Vec<KeyValue<'a>>>,
}

impl<'a> From<&'a Actor> for CanonicalActor<'a> {
    fn from(actor: &'a Actor) -> Self {
        Self {
            id: &actor.id,
            name: actor.name.as_deref(),
            role: actor.role,
            meta: sorted_pairs(&actor.meta),
        }
    }
}

#[derive(Serialize)]
struct CanonicalTarget<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    labels: Option<Vec<KeyValue<'a>>>,
}

impl<'a> From<&'a Target> for CanonicalTarget<'a> {
    fn from(target: &'a Target) -> Self {
        Self {
            kind: &target.kind,
            id: &target.id,
            labels: sorted_pairs(&target.labels),
        }
    }
}

#[derive(Serialize)]
struct CanonicalCommand<'a> {
    kind: &'a str,
    raw: &'a str,
    diff: &'a str,
    output: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_meta: Option<Vec<KeyValue<'a>>>,
}

impl<'a> From<&'a Command> for CanonicalCommand<'a> {
    fn from(command: &'a Command) -> Self {
        Self {
            kind: &command.kind,
            raw: &command.raw,
            diff: &command.diff,
            output: &command.output,
            output_meta: sorted_pairs(&command.output_meta),
        }
    }
}

#[derive(Serialize)]
struct CanonicalOutcome<'a> {
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exit_code: Option<i32>,
}

impl<'a> From<&'a Outcome> for CanonicalOutcome<'a> {
    fn from(outcome: &'a Outcome) -> Self {
        Self {
            status: &outcome.status,
            message: outcome.message.as_deref(),
            exit_code: outcome.exit_code,
        }
    }
}

#[derive(Serialize)]
struct CanonicalEvidence<'a> {
    kind: &'a str,
    #[serde(rename = "ref")]
    reference: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<Vec<KeyValue<'a>>>,
}

impl<'a> From<&'a Evidence> for CanonicalEvidence<'a> {
    fn from(evidence: &'a Evidence) -> Self {
        Self {
            kind: &evidence.kind,
            reference: &evidence.reference,
            detail: sorted_pairs(&evidence.detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Actor, EventType};
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use provenance_core::CoreError;
    use std::collections::BTreeMap;

    fn base_event() -> Event {
        Event::new(
            "e-1",
            "t-1",
            EventType::Executed,
            Utc.with_ymd_and_hms(2026, 2, 3, 12, 0, 0).unwrap(),
            Actor::new("u-1").with_role(ActorRole::Executor),
        )
        .with_commands(vec![Command::new("cli", "x")])
        .with_correlation_id("corr")
    }

    fn encoded_str(event: &Event) -> String {
        String::from_utf8(event.canonical_bytes().unwrap()).unwrap()
    }

    #[test]
    fn test_sorted_pairs_orders_by_key() {
        let mut map = HashMap::new();
        map.insert("site".to_string(), "dc1".to_string());
        map.insert("host".to_string(), "sw-12".to_string());
        map.insert("Vendor".to_string(), "cisco".to_string());

        let pairs = sorted_pairs(&map).unwrap();
        let keys: Vec<&str> = pairs.iter().map(|p| p.k).collect();
        assert_eq!(keys, vec!["Vendor", "host", "site"]);
        assert_eq!(pairs[1].v, "sw-12");
    }

    #[test]
    fn test_sorted_pairs_empty_is_absent() {
        assert!(sorted_pairs(&HashMap::new()).is_none());
    }

    #[test]
    fn test_empty_map_omitted() {
        let encoded = encoded_str(&base_event());
        assert!(!encoded.contains("\"meta\""));
        assert!(!encoded.contains("\"output_meta\""));
    }

    #[test]
    fn test_timestamp_as_nanos() {
        let encoded = encoded_str(&base_event());
        assert!(encoded.contains("\"at_unix_nano\":1770120000000000000"));
    }

    #[test]
    fn test_hash_field_excluded() {
        let mut event = base_event();
        let before = event.canonical_bytes().unwrap();
        event.hash = "deadbeef".to_string();
        assert_eq!(before, event.canonical_bytes().unwrap());
    }

    #[test]
    fn test_prev_hash_and_id_included() {
        let event = base_event();
        let mut linked = event.clone();
        linked.prev_hash = "abc".to_string();
        assert_ne!(event.canonical_bytes().unwrap(), linked.canonical_bytes().unwrap());

        let mut renamed = event.clone();
        renamed.id = "e-2".to_string();
        assert_ne!(event.canonical_bytes().unwrap(), renamed.canonical_bytes().unwrap());
    }

    #[test]
    fn test_absent_and_empty_optional_differ() {
        let event = base_event();
        let mut named = event.clone();
        named.actor.name = Some(String::new());
        assert_ne!(event.canonical_bytes().unwrap(), named.canonical_bytes().unwrap());

        let mut with_result = event.clone();
        with_result.result = Some(Outcome::new("SUCCESS"));
        let mut with_message = with_result.clone();
        with_message.result = Some(Outcome::new("SUCCESS").with_message(""));
        assert_ne!(
            with_result.canonical_bytes().unwrap(),
            with_message.canonical_bytes().unwrap()
        );
        assert!(!encoded_str(&event).contains("\"result\""));
        assert!(!encoded_str(&with_result).contains("null"));
    }

    #[test]
    fn test_list_order_is_content() {
        let a = base_event().with_targets(vec![Target::new("server", "a"), Target::new("server", "b")]);
        let b = base_event().with_targets(vec![Target::new("server", "b"), Target::new("server", "a")]);
        assert_ne!(a.canonical_bytes().unwrap(), b.canonical_bytes().unwrap());
    }

    #[test]
    fn test_delimiters_unambiguous() {
        let a = base_event().with_evidence(vec![Evidence::new("a\",\"ref\":\"b", "")]);
        let b = base_event().with_evidence(vec![Evidence::new("a", "b")]);
        assert_ne!(a.canonical_bytes().unwrap(), b.canonical_bytes().unwrap());
    }

    #[test]
    fn test_out_of_range_timestamp_fails() {
        let mut event = base_event();
        event.at = Utc.with_ymd_and_hms(2300, 1, 1, 0, 0, 0).unwrap();
        assert!(matches!(event.canonical_bytes(), Err(CoreError::Encoding { .. })));
    }

    fn fill(map: &mut HashMap<String, String>, entries: &[(String, String)]) {
        for (k, v) in entries {
            map.insert(k.clone(), v.clone());
        }
    }

    proptest! {
        #[test]
        fn prop_map_insertion_order_irrelevant(
            entries in proptest::collection::btree_map("[a-zA-Z_]{1,8}", "[a-z0-9 ]{0,8}", 0..10)
        ) {
            let forward: Vec<(String, String)> = entries.clone().into_iter().collect();
            let backward: Vec<(String, String)> = forward.iter().rev().cloned().collect();

            let mut a = base_event();
            let mut b = base_event();
            fill(&mut a.actor.meta, &forward);
            fill(&mut b.actor.meta, &backward);
            a.targets = vec![Target::new("server", "web-1")];
            b.targets = vec![Target::new("server", "web-1")];
            fill(&mut a.targets[0].labels, &backward);
            fill(&mut b.targets[0].labels, &forward);
            fill(&mut a.commands[0].output_meta, &forward);
            fill(&mut b.commands[0].output_meta, &backward);
            a.evidence = vec![Evidence::new("show_cmd", "show run")];
            b.evidence = vec![Evidence::new("show_cmd", "show run")];
            fill(&mut a.evidence[0].detail, &backward);
            fill(&mut b.evidence[0].detail, &forward);

            prop_assert_eq!(a.canonical_bytes().unwrap(), b.canonical_bytes().unwrap());
        }

        #[test]
        fn prop_value_change_changes_encoding(
            entries in proptest::collection::btree_map("[a-z]{1,6}", "[a-z]{0,6}", 1..6)
        ) {
            let entries: BTreeMap<String, String> = entries;
            let mut a = base_event();
            fill(&mut a.actor.meta, &entries.clone().into_iter().collect::<Vec<_>>());
            let mut b = a.clone();
            if let Some(value) = b.actor.meta.values_mut().next() {
                value.push('!');
            }
            prop_assert_ne!(a.canonical_bytes().unwrap(), b.canonical_bytes().unwrap());
        }
    }
}
