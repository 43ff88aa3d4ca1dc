//! Monitored machines and their health.

use serde::{Deserialize, Serialize};

use crate::event::{EventId, FleetEvent};

/// Operational status of a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeStatus {
    Healthy,
    AtRisk,
    Failed,
}

impl NodeStatus {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::AtRisk => "at-risk",
            Self::Failed => "failed",
        }
    }
}

/// A simulated ATM with a fixed location and a mutable health reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub node_id: String,
    pub city: String,
    pub lat: f64,
    pub lng: f64,
    pub status: NodeStatus,
    /// Health score in `[0, 100]`.
    pub health_score: u8,
    /// Id of the latest event that touched this machine. Only compared
    /// against heal requests; the event itself may already be evicted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_event: Option<EventId>,
}

impl Node {
    #[must_use]
    pub fn new(
        node_id: impl Into<String>,
        city: impl Into<String>,
        coords: (f64, f64),
        status: NodeStatus,
        health_score: u8,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            city: city.into(),
            lat: coords.0,
            lng: coords.1,
            status,
            health_score: health_score.min(100),
            last_event: None,
        }
    }

    /// Record a failure against this machine.
    pub(crate) fn fail_with(&mut self, event: &FleetEvent) {
        self.status = NodeStatus::Failed;
        self.health_score = event.health_score_at_failure();
        self.last_event = Some(event.id().clone());
    }

    /// Bring the machine back after its latest event healed.
    pub(crate) fn restore(&mut self, health_score: u8) {
        self.status = NodeStatus::Healthy;
        self.health_score = health_score.min(100);
    }

    #[must_use]
    pub fn last_event_is(&self, event_id: &EventId) -> bool {
        self.last_event.as_ref() == Some(event_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_kebab_case() {
        let json = serde_json::to_string(&NodeStatus::AtRisk).unwrap();
        assert_eq!(json, "\"at-risk\"");
        assert_eq!(NodeStatus::AtRisk.label(), "at-risk");
    }

    #[test]
    fn constructor_clamps_health() {
        let node = Node::new("#1001", "Pune", (18.5, 73.8), NodeStatus::Healthy, 140);
        assert_eq!(node.health_score, 100);
        assert!(node.last_event.is_none());
    }
}
