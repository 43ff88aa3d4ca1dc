//! Fleet state store: nodes, the rolling event window and the counters.
//!
//! The store is mutated through exactly two operations, [`FleetState::apply_failure`]
//! and [`FleetState::apply_heal`]. Each takes `&mut self` and completes before
//! returning, so a snapshot never observes an event without its node update
//! or the other way round.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::catalog::CITIES;
use crate::config::EngineConfig;
use crate::constants::{
    AT_RISK_DRAW_THRESHOLD, COMPLAINTS_PER_HEAL_MAX, COMPLAINTS_PER_HEAL_MIN,
    COORD_JITTER_DEGREES, HEALED_HEALTH_MAX, HEALED_HEALTH_MIN, HEALTHY_DRAW_THRESHOLD,
    INITIAL_HEALTH_MAX, INITIAL_HEALTH_MIN,
};
use crate::event::{EventId, FleetEvent};
use crate::ids::fleet_node_id;
use crate::node::{Node, NodeStatus};
use crate::rng::{random_int, random_unit};
use crate::snapshot::FleetSnapshot;

/// What a heal request actually touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealOutcome {
    /// The event was still in the window and moved to `healed`.
    pub event_healed: bool,
    /// Id of the machine restored to `healthy`, if one still pointed at the event.
    pub node_restored: Option<String>,
    /// Amount added to `complaints_blocked`.
    pub complaints_added: u64,
}

/// In-memory aggregate of nodes, recent events and rolling counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetState {
    events: VecDeque<FleetEvent>,
    nodes: Vec<Node>,
    healed_count: u64,
    complaints_blocked: u64,
    event_cap: usize,
    total_atms: u32,
}

impl FleetState {
    /// Populate the initial fleet, cycling through the city table.
    ///
    /// Status is drawn 85% healthy with the rest split evenly between at-risk
    /// and failed. Health is drawn independently of status.
    pub fn initialize<R: Rng + ?Sized>(config: &EngineConfig, rng: &mut R) -> Self {
        let nodes = (0..config.node_count)
            .map(|index| initial_node(rng, index))
            .collect();
        Self::from_nodes(config, nodes)
    }

    /// Build a store around an explicit node list.
    #[must_use]
    pub fn from_nodes(config: &EngineConfig, nodes: Vec<Node>) -> Self {
        Self {
            events: VecDeque::with_capacity(config.event_cap.saturating_add(1)),
            nodes,
            healed_count: config.initial_healed,
            complaints_blocked: config.initial_complaints_blocked,
            event_cap: config.event_cap.max(1),
            total_atms: config.total_atms,
        }
    }

    /// Record a new failure: the event goes to the front of the window and
    /// the node at `node_index` takes its failure reading.
    ///
    /// Returns the events pushed out of the window, oldest last.
    pub fn apply_failure(&mut self, event: FleetEvent, node_index: usize) -> Vec<FleetEvent> {
        if let Some(node) = self.nodes.get_mut(node_index) {
            node.fail_with(&event);
        }
        self.events.push_front(event);
        if self.events.len() > self.event_cap {
            self.events.split_off(self.event_cap).into()
        } else {
            Vec::new()
        }
    }

    /// Resolve `event_id`.
    ///
    /// A missing event (evicted) or a node that has since failed again are
    /// skipped silently; the counters advance regardless.
    pub fn apply_heal<R: Rng + ?Sized>(&mut self, event_id: &EventId, rng: &mut R) -> HealOutcome {
        let event_healed = self
            .events
            .iter_mut()
            .find(|event| event.id() == event_id)
            .is_some_and(FleetEvent::mark_healed);

        let node_restored = self
            .nodes
            .iter_mut()
            .find(|node| node.last_event_is(event_id))
            .map(|node| {
                node.restore(random_int(rng, HEALED_HEALTH_MIN, HEALED_HEALTH_MAX));
                node.node_id.clone()
            });

        let complaints_added = random_int(rng, COMPLAINTS_PER_HEAL_MIN, COMPLAINTS_PER_HEAL_MAX);
        self.healed_count = self.healed_count.saturating_add(1);
        self.complaints_blocked = self.complaints_blocked.saturating_add(complaints_added);

        HealOutcome {
            event_healed,
            node_restored,
            complaints_added,
        }
    }

    /// Events, newest first.
    #[must_use]
    pub const fn events(&self) -> &VecDeque<FleetEvent> {
        &self.events
    }

    #[must_use]
    pub fn event(&self, event_id: &EventId) -> Option<&FleetEvent> {
        self.events.iter().find(|event| event.id() == event_id)
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn node_for_event(&self, event_id: &EventId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.last_event_is(event_id))
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub const fn healed_count(&self) -> u64 {
        self.healed_count
    }

    #[must_use]
    pub const fn complaints_blocked(&self) -> u64 {
        self.complaints_blocked
    }

    #[must_use]
    pub const fn total_atms(&self) -> u32 {
        self.total_atms
    }

    #[must_use]
    pub const fn event_cap(&self) -> usize {
        self.event_cap
    }

    #[must_use]
    pub fn count_by(&self, status: NodeStatus) -> usize {
        self.nodes.iter().filter(|node| node.status == status).count()
    }

    #[must_use]
    pub fn healthy_count(&self) -> usize {
        self.count_by(NodeStatus::Healthy)
    }

    #[must_use]
    pub fn at_risk_count(&self) -> usize {
        self.count_by(NodeStatus::AtRisk)
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count_by(NodeStatus::Failed)
    }

    /// Owned, read-only view for consumers.
    #[must_use]
    pub fn snapshot(&self, now: u64) -> FleetSnapshot {
        FleetSnapshot {
            now,
            events: self.events.iter().cloned().collect(),
            nodes: self.nodes.clone(),
            healed_count: self.healed_count,
            complaints_blocked: self.complaints_blocked,
            healthy_count: self.healthy_count(),
            at_risk_count: self.at_risk_count(),
            failed_count: self.failed_count(),
            total_atms: self.total_atms,
        }
    }
}

fn initial_node<R: Rng + ?Sized>(rng: &mut R, index: usize) -> Node {
    let city = &CITIES[index % CITIES.len()];
    let lat = city.lat + jitter(rng);
    let lng = city.lng + jitter(rng);
    let node_id = fleet_node_id(rng, index);
    let status = initial_status(rng);
    let health_score = random_int(rng, INITIAL_HEALTH_MIN, INITIAL_HEALTH_MAX);
    Node::new(node_id, city.name, (lat, lng), status, health_score)
}

fn jitter<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    (random_unit(rng) - 0.5) * 2.0 * COORD_JITTER_DEGREES
}

fn initial_status<R: Rng + ?Sized>(rng: &mut R) -> NodeStatus {
    if random_unit(rng) > HEALTHY_DRAW_THRESHOLD {
        NodeStatus::Healthy
    } else if random_unit(rng) > AT_RISK_DRAW_THRESHOLD {
        NodeStatus::AtRisk
    } else {
        NodeStatus::Failed
    }
}
