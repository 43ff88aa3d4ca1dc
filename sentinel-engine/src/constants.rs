//! Centralized generation ranges and baselines for the fleet simulation.
//!
//! Every random draw made by the engine is bounded by one of these pairs.
//! Keeping them together means the shape of the synthetic feed can only
//! change through a reviewed code change.

// Fleet shape ---------------------------------------------------------------
pub const FLEET_SIZE: usize = 20;
pub const TOTAL_ATMS: u32 = 134;
pub const EVENT_CAP: usize = 50;

// Scheduler cadence (virtual time units) -------------------------------------
pub const TICK_INTERVAL: u64 = 4;
pub const HEAL_DELAY: u64 = 15;
pub const TICK_MILLIS: u64 = 1_000;

// Seeded counters ------------------------------------------------------------
pub const INITIAL_HEALED: u64 = 12;
pub const INITIAL_COMPLAINTS_BLOCKED: u64 = 847;

// Event generation -----------------------------------------------------------
pub const CONFIDENCE_MIN: u8 = 78;
pub const CONFIDENCE_MAX: u8 = 99;
pub const FAILURE_HEALTH_MIN: u8 = 5;
pub const FAILURE_HEALTH_MAX: u8 = 35;
pub const NODE_ID_MIN: u32 = 1_000;
pub const NODE_ID_MAX: u32 = 9_999;

// Healing --------------------------------------------------------------------
pub const HEALED_HEALTH_MIN: u8 = 75;
pub const HEALED_HEALTH_MAX: u8 = 98;
pub const COMPLAINTS_PER_HEAL_MIN: u64 = 1;
pub const COMPLAINTS_PER_HEAL_MAX: u64 = 5;

// Initial fleet --------------------------------------------------------------
pub const INITIAL_HEALTH_MIN: u8 = 40;
pub const INITIAL_HEALTH_MAX: u8 = 100;
/// Unit draws above this value start healthy (85% of the fleet).
pub const HEALTHY_DRAW_THRESHOLD: f64 = 0.15;
/// Second draw splitting the unhealthy remainder between at-risk and failed.
pub const AT_RISK_DRAW_THRESHOLD: f64 = 0.5;
pub const COORD_JITTER_DEGREES: f64 = 1.0;
pub const FLEET_ID_STRIDE: u32 = 200;
pub const FLEET_ID_SPREAD: u32 = 199;
/// Largest fleet whose banded ids still fit `#NNNN`.
pub const MAX_FLEET_SIZE: usize = 45;

// Presentation windows -------------------------------------------------------
pub const LOWEST_HEALTH_WINDOW: usize = 10;
pub const FEED_WINDOW: usize = 20;
pub const RECENT_ALERTS_WINDOW: usize = 5;
pub const HEALTH_BAND_CRITICAL_BELOW: u8 = 30;
pub const HEALTH_BAND_DEGRADED_BELOW: u8 = 60;
