//! Failure events emitted by the fleet generator.
//!
//! An event is frozen at creation: only its status moves, once, from
//! `failed` to `healed`. Fields are private so the store is the only place
//! that can drive that transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::FailureType;

/// Session-unique identifier of the form `evt-<counter>-<millis>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    #[must_use]
    pub fn new(counter: u64, created_at: DateTime<Utc>) -> Self {
        Self(format!("evt-{counter}-{}", created_at.timestamp_millis()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of a failure event.
///
/// The engine only ever emits `Failed` and `Healed`; `Healing` is reserved for
/// consumers that infer progress from elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Failed,
    Healing,
    Healed,
}

impl EventStatus {
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        matches!(self, Self::Healed)
    }
}

/// Severity tier derived from the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Randomized fields of an event before it is stamped with id and time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub node_id: String,
    pub city: String,
    pub failure_type: FailureType,
    pub confidence: u8,
    pub health_score_at_failure: u8,
}

/// A simulated failure tied to one node at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetEvent {
    id: EventId,
    node_id: String,
    city: String,
    failure_type: FailureType,
    confidence: u8,
    health_score_at_failure: u8,
    created_at: DateTime<Utc>,
    /// Virtual clock instant at which the generator produced the event.
    created_tick: u64,
    status: EventStatus,
    severity: Severity,
}

impl FleetEvent {
    /// Stamp a draft into a `failed` event; severity comes from the catalog.
    #[must_use]
    pub fn from_draft(
        id: EventId,
        draft: EventDraft,
        created_at: DateTime<Utc>,
        created_tick: u64,
    ) -> Self {
        let severity = draft.failure_type.severity();
        Self {
            id,
            node_id: draft.node_id,
            city: draft.city,
            failure_type: draft.failure_type,
            confidence: draft.confidence,
            health_score_at_failure: draft.health_score_at_failure,
            created_at,
            created_tick,
            status: EventStatus::Failed,
            severity,
        }
    }

    #[must_use]
    pub const fn id(&self) -> &EventId {
        &self.id
    }

    #[must_use]
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    #[must_use]
    pub const fn failure_type(&self) -> &FailureType {
        &self.failure_type
    }

    #[must_use]
    pub const fn confidence(&self) -> u8 {
        self.confidence
    }

    #[must_use]
    pub const fn health_score_at_failure(&self) -> u8 {
        self.health_score_at_failure
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn created_tick(&self) -> u64 {
        self.created_tick
    }

    #[must_use]
    pub const fn status(&self) -> EventStatus {
        self.status
    }

    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Move the event to `healed`. Returns false when it already was.
    pub(crate) fn mark_healed(&mut self) -> bool {
        if self.status.is_resolved() {
            return false;
        }
        self.status = EventStatus::Healed;
        true
    }
}
