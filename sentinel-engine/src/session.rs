//! Session facade: one virtual clock, one writer, many observers.

use chrono::{DateTime, Utc};
use log::{debug, info, trace};
use std::fmt;

use crate::config::{ConfigError, EngineConfig};
use crate::event::{EventId, FleetEvent};
use crate::generator::EventGenerator;
use crate::narrative;
use crate::rng::RngBundle;
use crate::scheduler::{Action, Scheduler};
use crate::snapshot::FleetSnapshot;
use crate::store::FleetState;

/// Receives a fresh snapshot after every completed state change.
pub trait FleetObserver: Send {
    fn on_snapshot(&mut self, snapshot: &FleetSnapshot);
}

impl<F> FleetObserver for F
where
    F: FnMut(&FleetSnapshot) + Send,
{
    fn on_snapshot(&mut self, snapshot: &FleetSnapshot) {
        self(snapshot);
    }
}

/// Handle returned by [`SentinelSession::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// High-level session binding the scheduler, the generator and the fleet
/// store behind one virtual clock.
///
/// The session is the only writer of its [`FleetState`]. Observers and
/// [`SentinelSession::snapshot`] callers get owned copies.
pub struct SentinelSession {
    config: EngineConfig,
    rng: RngBundle,
    generator: EventGenerator,
    scheduler: Scheduler,
    state: FleetState,
    observers: Vec<(SubscriptionId, Box<dyn FleetObserver>)>,
    next_subscription: u64,
    revision: u64,
}

impl SentinelSession {
    /// Fresh session whose virtual instant zero is the current wall clock.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when `config` fails validation.
    pub fn new(config: EngineConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_epoch(config, seed, Utc::now())
    }

    /// Fresh session with a fixed epoch, for reproducible timestamps and ids.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when `config` fails validation.
    pub fn with_epoch(
        config: EngineConfig,
        seed: u64,
        epoch: DateTime<Utc>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = RngBundle::from_user_seed(seed);
        let state = FleetState::initialize(&config, rng.fleet());
        Ok(Self::assemble(config, rng, epoch, state))
    }

    /// Build a session around a prepared fleet.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when `config` fails validation.
    pub fn from_state(
        config: EngineConfig,
        seed: u64,
        epoch: DateTime<Utc>,
        state: FleetState,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = RngBundle::from_user_seed(seed);
        Ok(Self::assemble(config, rng, epoch, state))
    }

    fn assemble(
        config: EngineConfig,
        rng: RngBundle,
        epoch: DateTime<Utc>,
        state: FleetState,
    ) -> Self {
        Self {
            generator: EventGenerator::new(epoch, config.tick_millis),
            scheduler: Scheduler::new(config.tick_interval, config.heal_delay),
            config,
            rng,
            state,
            observers: Vec::new(),
            next_subscription: 0,
            revision: 0,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn state(&self) -> &FleetState {
        &self.state
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.rng.seed()
    }

    #[must_use]
    pub const fn rng(&self) -> &RngBundle {
        &self.rng
    }

    #[must_use]
    pub const fn now(&self) -> u64 {
        self.scheduler.now()
    }

    #[must_use]
    pub const fn epoch(&self) -> DateTime<Utc> {
        self.generator.epoch()
    }

    /// Number of completed state changes so far.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    #[must_use]
    pub fn pending_heals(&self) -> usize {
        self.scheduler.pending_heals()
    }

    /// Arm the recurring generator. Calling it again while running is a no-op.
    pub fn start(&mut self) -> bool {
        let started = self.scheduler.start();
        if started {
            info!(
                "sentinel generator started at t={} (every {} units, heal after {})",
                self.now(),
                self.scheduler.tick_interval(),
                self.scheduler.heal_delay()
            );
        }
        started
    }

    /// Stop generating events. Safe to call repeatedly. Heals already queued
    /// still fire unless the config cancels them.
    pub fn stop(&mut self) -> bool {
        let stopped = self.scheduler.stop(self.config.cancel_heals_on_stop);
        if stopped {
            info!(
                "sentinel generator stopped at t={} ({} heals pending)",
                self.now(),
                self.scheduler.pending_heals()
            );
        }
        stopped
    }

    /// Advance the virtual clock by `units`, firing everything that comes due.
    /// Returns the number of actions fired.
    pub fn advance_by(&mut self, units: u64) -> usize {
        self.advance_to(self.now().saturating_add(units))
    }

    /// Advance the virtual clock to `instant`, firing everything due on the way.
    pub fn advance_to(&mut self, instant: u64) -> usize {
        let mut fired = 0;
        while let Some(action) = self.scheduler.pop_due(instant) {
            self.dispatch(action);
            fired += 1;
        }
        self.scheduler.advance_clock(instant);
        fired
    }

    /// Fire the next queued action, whenever it is due.
    pub fn step(&mut self) -> Option<Action> {
        let action = self.scheduler.pop_due(u64::MAX)?;
        self.dispatch(action.clone());
        Some(action)
    }

    /// Fire every queued action. While the generator runs its queue never
    /// empties, so this does nothing and returns 0 until `stop` is called.
    pub fn run_until_idle(&mut self) -> usize {
        if self.is_running() {
            return 0;
        }
        let mut fired = 0;
        while self.step().is_some() {
            fired += 1;
        }
        fired
    }

    /// Generate one event right now, with its heal queued, without waiting
    /// for the cadence and without re-arming the generator.
    pub fn force_generate(&mut self) -> EventId {
        let id = self.generate();
        self.commit();
        id
    }

    /// Owned copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> FleetSnapshot {
        self.state.snapshot(self.now())
    }

    /// Remediation script for `event`. Delegates to [`narrative::resolve`];
    /// session state plays no part.
    #[must_use]
    pub fn resolve(&self, event: &FleetEvent) -> String {
        narrative::resolve(event)
    }

    pub fn subscribe(&mut self, observer: impl FleetObserver + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription = self.next_subscription.saturating_add(1);
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    /// Consume the session, returning the fleet state.
    #[must_use]
    pub fn into_state(self) -> FleetState {
        self.state
    }

    fn dispatch(&mut self, action: Action) {
        match action {
            Action::Generate => {
                if !self.is_running() {
                    trace!("dropping stale generator tick at t={}", self.now());
                    return;
                }
                self.generate();
                self.scheduler.schedule_generate();
            }
            Action::Heal(event_id) => self.heal(&event_id),
        }
        self.commit();
    }

    fn generate(&mut self) -> EventId {
        let now = self.now();
        let event = self.generator.generate(self.rng.events(), now);
        let target =
            EventGenerator::pick_target(self.rng.events(), self.state.node_count()).unwrap_or(0);
        let id = event.id().clone();
        debug!(
            "t={now} {id}: {} at {} {} ({:?}, {}% confidence) -> node slot {target}",
            event.failure_type(),
            event.node_id(),
            event.city(),
            event.severity(),
            event.confidence()
        );
        for evicted in self.state.apply_failure(event, target) {
            trace!("evicted {} from the event window", evicted.id());
        }
        self.scheduler.schedule_heal(id.clone());
        id
    }

    fn heal(&mut self, event_id: &EventId) {
        let outcome = self.state.apply_heal(event_id, self.rng.heal());
        if !outcome.event_healed {
            trace!("heal for {event_id} found no live event");
        }
        match &outcome.node_restored {
            Some(node_id) => debug!(
                "t={} {event_id} healed, {node_id} restored (+{} complaints blocked)",
                self.now(),
                outcome.complaints_added
            ),
            None => trace!("heal for {event_id} left nodes untouched; superseded or evicted"),
        }
    }

    fn commit(&mut self) {
        self.revision = self.revision.saturating_add(1);
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for (_, observer) in &mut self.observers {
            observer.on_snapshot(&snapshot);
        }
    }
}

impl fmt::Debug for SentinelSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentinelSession")
            .field("config", &self.config)
            .field("seed", &self.rng.seed())
            .field("now", &self.now())
            .field("running", &self.is_running())
            .field("revision", &self.revision)
            .field("events", &self.state.events().len())
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}
