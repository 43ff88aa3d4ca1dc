//! Sentinel Fleet Engine
//!
//! Seeded, deterministic simulation of an ATM fleet that fails at random and
//! heals itself after a fixed delay. This crate has no UI or wall-clock
//! dependency; time is a virtual clock advanced by the caller, or by the
//! tokio driver behind the `async` feature.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod event;
pub mod generator;
pub mod ids;
pub mod narrative;
pub mod node;
#[cfg(feature = "async")]
pub mod realtime;
pub mod rng;
pub mod scheduler;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod views;

// Re-export commonly used types
pub use catalog::{CITIES, City, FAILURE_TYPES, FailureType, NarrativeTemplate, city_by_name};
pub use config::{ConfigError, EngineConfig};
pub use event::{EventDraft, EventId, EventStatus, FleetEvent, Severity};
pub use generator::EventGenerator;
pub use ids::{EventIdGenerator, generate_node_id};
pub use narrative::resolve;
pub use node::{Node, NodeStatus};
#[cfg(feature = "async")]
pub use realtime::{RealtimeHandle, spawn_realtime};
pub use rng::{CountingRng, RngBundle, random_int};
pub use scheduler::{Action, Scheduler};
pub use session::{FleetObserver, SentinelSession, SubscriptionId};
pub use snapshot::FleetSnapshot;
pub use store::{FleetState, HealOutcome};
pub use views::{
    HealthBand, flagged_for_intervention, latest_narrative, lowest_health, recent_alerts,
    recent_feed, ticker_line,
};
