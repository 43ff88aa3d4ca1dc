//! Synthetic machine and event identifiers.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::constants::{FLEET_ID_SPREAD, FLEET_ID_STRIDE, NODE_ID_MAX, NODE_ID_MIN};
use crate::event::EventId;
use crate::rng::random_int;

/// Random `#NNNN` machine identifier. Collisions are accepted.
pub fn generate_node_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("#{}", random_int(rng, NODE_ID_MIN, NODE_ID_MAX))
}

/// Identifier for the `index`-th machine of the initial fleet.
///
/// Each slot owns its own band of 200 numbers, so ids of the initial fleet
/// never collide with one another. The `#NNNN` shape holds for indices below
/// [`MAX_FLEET_SIZE`](crate::constants::MAX_FLEET_SIZE), which config
/// validation enforces.
pub fn fleet_node_id<R: Rng + ?Sized>(rng: &mut R, index: usize) -> String {
    let slot = u32::try_from(index).unwrap_or(u32::MAX);
    let base = NODE_ID_MIN.saturating_add(slot.saturating_mul(FLEET_ID_STRIDE));
    format!("#{}", base.saturating_add(random_int(rng, 0, FLEET_ID_SPREAD)))
}

/// Monotonic event id source; the counter is bumped before each use and
/// never reset.
#[derive(Debug, Clone, Default)]
pub struct EventIdGenerator {
    counter: u64,
}

impl EventIdGenerator {
    #[must_use]
    pub const fn new() -> Self {
        Self { counter: 0 }
    }

    pub fn next_id(&mut self, created_at: DateTime<Utc>) -> EventId {
        self.counter = self.counter.saturating_add(1);
        EventId::new(self.counter, created_at)
    }

    /// Number of ids handed out so far.
    #[must_use]
    pub const fn issued(&self) -> u64 {
        self.counter
    }
}
