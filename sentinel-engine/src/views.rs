//! Read-only projections that dashboards derive from a snapshot.

use serde::{Deserialize, Serialize};

use crate::constants::{HEALTH_BAND_CRITICAL_BELOW, HEALTH_BAND_DEGRADED_BELOW};
use crate::event::{EventStatus, FleetEvent};
use crate::narrative::resolve;
use crate::node::Node;
use crate::snapshot::FleetSnapshot;

/// Coarse bucket for a health score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthBand {
    Critical,
    Degraded,
    Ok,
}

impl HealthBand {
    #[must_use]
    pub const fn from_score(score: u8) -> Self {
        if score < HEALTH_BAND_CRITICAL_BELOW {
            Self::Critical
        } else if score < HEALTH_BAND_DEGRADED_BELOW {
            Self::Degraded
        } else {
            Self::Ok
        }
    }
}

/// The `n` machines with the lowest health, ascending. Ties keep fleet order.
#[must_use]
pub fn lowest_health(nodes: &[Node], n: usize) -> Vec<&Node> {
    let mut sorted: Vec<&Node> = nodes.iter().collect();
    sorted.sort_by_key(|node| node.health_score);
    sorted.truncate(n);
    sorted
}

/// The newest `n` events.
#[must_use]
pub fn recent_feed(events: &[FleetEvent], n: usize) -> &[FleetEvent] {
    &events[..n.min(events.len())]
}

/// The newest `n` events still in `failed` status.
#[must_use]
pub fn recent_alerts(events: &[FleetEvent], n: usize) -> Vec<&FleetEvent> {
    events
        .iter()
        .filter(|event| event.status() == EventStatus::Failed)
        .take(n)
        .collect()
}

/// Machines that need attention: failed plus at-risk.
#[must_use]
pub const fn flagged_for_intervention(snapshot: &FleetSnapshot) -> usize {
    snapshot.failed_count + snapshot.at_risk_count
}

/// Remediation script for the newest unresolved event. `None` once every
/// retained event has healed.
#[must_use]
pub fn latest_narrative(snapshot: &FleetSnapshot) -> Option<String> {
    snapshot
        .events
        .iter()
        .find(|event| !event.status().is_resolved())
        .map(resolve)
}

/// One-line ticker of the rolling counters.
#[must_use]
pub fn ticker_line(snapshot: &FleetSnapshot) -> String {
    format!(
        "ATMs Self-Healed Today: {}   \u{25c6}   Complaints Prevented: {}   \u{25c6}   Monitored: {}",
        snapshot.healed_count, snapshot.complaints_blocked, snapshot.total_atms
    )
}
