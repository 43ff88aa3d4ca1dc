//! Point-in-time copy of the fleet handed to readers.

use serde::{Deserialize, Serialize};

use crate::event::FleetEvent;
use crate::node::Node;

/// Owned copy of the fleet state handed to consumers after every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    /// Virtual clock instant the snapshot was taken at.
    pub now: u64,
    /// Newest first.
    pub events: Vec<FleetEvent>,
    pub nodes: Vec<Node>,
    pub healed_count: u64,
    pub complaints_blocked: u64,
    pub healthy_count: usize,
    pub at_risk_count: usize,
    pub failed_count: usize,
    /// Reported fleet size; larger than the simulated sample.
    pub total_atms: u32,
}

impl FleetSnapshot {
    #[must_use]
    pub fn latest_event(&self) -> Option<&FleetEvent> {
        self.events.first()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
