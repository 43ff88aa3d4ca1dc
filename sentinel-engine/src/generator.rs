//! Synthetic failure generation.

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;

use crate::catalog::{CITIES, FAILURE_TYPES};
use crate::constants::{CONFIDENCE_MAX, CONFIDENCE_MIN, FAILURE_HEALTH_MAX, FAILURE_HEALTH_MIN};
use crate::event::{EventDraft, FleetEvent};
use crate::ids::{EventIdGenerator, generate_node_id};
use crate::rng::random_int;

/// Turns random draws into stamped failure events.
#[derive(Debug, Clone)]
pub struct EventGenerator {
    ids: EventIdGenerator,
    epoch: DateTime<Utc>,
    tick_millis: u64,
}

impl EventGenerator {
    /// `epoch` is the wall-clock time of virtual instant zero.
    #[must_use]
    pub const fn new(epoch: DateTime<Utc>, tick_millis: u64) -> Self {
        Self {
            ids: EventIdGenerator::new(),
            epoch,
            tick_millis,
        }
    }

    #[must_use]
    pub const fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    #[must_use]
    pub const fn issued(&self) -> u64 {
        self.ids.issued()
    }

    /// Wall-clock time of a virtual instant. Saturates at the epoch when the
    /// offset does not fit a timestamp.
    #[must_use]
    pub fn timestamp_at(&self, tick: u64) -> DateTime<Utc> {
        let millis = tick.saturating_mul(self.tick_millis);
        i64::try_from(millis)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .and_then(|offset| self.epoch.checked_add_signed(offset))
            .unwrap_or(self.epoch)
    }

    /// Random city, failure category, machine id, confidence and health.
    pub fn draft<R: Rng + ?Sized>(rng: &mut R) -> EventDraft {
        let city = &CITIES[random_int(rng, 0, CITIES.len() - 1)];
        let failure_type = FAILURE_TYPES[random_int(rng, 0, FAILURE_TYPES.len() - 1)].clone();
        EventDraft {
            node_id: generate_node_id(rng),
            city: city.name.to_string(),
            failure_type,
            confidence: random_int(rng, CONFIDENCE_MIN, CONFIDENCE_MAX),
            health_score_at_failure: random_int(rng, FAILURE_HEALTH_MIN, FAILURE_HEALTH_MAX),
        }
    }

    /// Draft and stamp a `failed` event at virtual instant `now`.
    pub fn generate<R: Rng + ?Sized>(&mut self, rng: &mut R, now: u64) -> FleetEvent {
        let draft = Self::draft(rng);
        let created_at = self.timestamp_at(now);
        let id = self.ids.next_id(created_at);
        FleetEvent::from_draft(id, draft, created_at, now)
    }

    /// Uniform random index of the machine that takes the failure.
    ///
    /// The target is unrelated to the event's own city or machine id.
    pub fn pick_target<R: Rng + ?Sized>(rng: &mut R, node_count: usize) -> Option<usize> {
        if node_count == 0 {
            return None;
        }
        Some(random_int(rng, 0, node_count - 1))
    }
}
