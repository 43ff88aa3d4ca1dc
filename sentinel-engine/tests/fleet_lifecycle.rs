use chrono::{DateTime, TimeZone, Utc};
use sentinel_engine::{
    CITIES, EngineConfig, EventId, EventStatus, FleetSnapshot, FleetState, Node, NodeStatus,
    SentinelSession, latest_narrative, recent_alerts,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap()
}

fn healthy_fleet(config: &EngineConfig, size: usize) -> FleetState {
    let nodes = (0..size)
        .map(|i| {
            let city = &CITIES[i % CITIES.len()];
            Node::new(
                format!("#{}", 1000 + i),
                city.name,
                (city.lat, city.lng),
                NodeStatus::Healthy,
                90,
            )
        })
        .collect();
    FleetState::from_nodes(config, nodes)
}

fn session_with_fleet(seed: u64, size: usize) -> SentinelSession {
    let config = EngineConfig::default();
    let state = healthy_fleet(&config, size);
    SentinelSession::from_state(config, seed, epoch(), state).unwrap()
}

fn recorder(session: &mut SentinelSession) -> Arc<Mutex<Vec<FleetSnapshot>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    session.subscribe(move |snapshot: &FleetSnapshot| sink.lock().unwrap().push(snapshot.clone()));
    seen
}

#[test]
fn first_tick_fails_exactly_one_machine() {
    let mut session = session_with_fleet(101, 20);
    session.start();
    session.advance_to(4);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.events.len(), 1);
    assert_eq!(snapshot.failed_count, 1);
    assert_eq!(snapshot.healthy_count, 19);

    let event = &snapshot.events[0];
    assert_eq!(event.status(), EventStatus::Failed);
    let node = snapshot
        .nodes
        .iter()
        .find(|n| n.last_event.as_ref() == Some(event.id()))
        .expect("a node carries the event");
    assert_eq!(node.status, NodeStatus::Failed);
    assert_eq!(node.health_score, event.health_score_at_failure());
}

#[test]
fn event_heals_after_delay() {
    let mut session = session_with_fleet(102, 20);
    session.start();
    session.advance_to(4);
    let id = session.snapshot().events[0].id().clone();

    session.advance_to(18);
    assert_eq!(
        session.state().event(&id).unwrap().status(),
        EventStatus::Failed
    );

    session.advance_to(19);
    let snapshot = session.snapshot();
    let event = snapshot.events.iter().find(|e| e.id() == &id).unwrap();
    assert_eq!(event.status(), EventStatus::Healed);
    assert_eq!(snapshot.healed_count, 13);
    assert!((848..=852).contains(&snapshot.complaints_blocked));

    let node = session.state().node_for_event(&id).unwrap();
    assert_eq!(node.status, NodeStatus::Healthy);
    assert!((75..=98).contains(&node.health_score));
}

#[test]
fn stale_heal_leaves_refailed_machine_alone() {
    let mut session = session_with_fleet(103, 1);
    session.start();
    session.advance_to(8);
    session.stop();

    let snapshot = session.snapshot();
    let newer = snapshot.events[0].id().clone();
    let older = snapshot.events[1].id().clone();
    assert_eq!(snapshot.nodes[0].last_event.as_ref(), Some(&newer));

    session.advance_to(19);
    assert_eq!(
        session.state().event(&older).unwrap().status(),
        EventStatus::Healed
    );
    assert_eq!(session.state().nodes()[0].status, NodeStatus::Failed);
    assert_eq!(session.state().healed_count(), 13);

    session.advance_to(23);
    assert_eq!(session.state().nodes()[0].status, NodeStatus::Healthy);
    assert_eq!(session.state().healed_count(), 14);
}

#[test]
fn window_keeps_newest_fifty_and_evicted_heals_still_count() {
    let mut session = session_with_fleet(104, 20);
    let ids: Vec<EventId> = (0..51).map(|_| session.force_generate()).collect();

    let snapshot = session.snapshot();
    assert_eq!(snapshot.events.len(), 50);
    assert_eq!(snapshot.events[0].id(), &ids[50]);
    assert!(session.state().event(&ids[0]).is_none());

    assert_eq!(session.run_until_idle(), 51);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.healed_count, 12 + 51);
    assert!(snapshot.events.iter().all(|e| e.status() == EventStatus::Healed));
    assert_eq!(snapshot.failed_count, 0);
}

#[test]
fn long_run_keeps_counters_and_counts_consistent() {
    let mut session = SentinelSession::with_epoch(EngineConfig::default(), 105, epoch()).unwrap();
    let seen = recorder(&mut session);
    session.start();
    session.advance_to(600);

    let seen = seen.lock().unwrap();
    assert!(!seen.is_empty());
    for pair in seen.windows(2) {
        assert!(pair[1].healed_count >= pair[0].healed_count);
        assert!(pair[1].complaints_blocked >= pair[0].complaints_blocked);
        assert!(pair[1].now >= pair[0].now);
    }
    for snapshot in seen.iter() {
        assert_eq!(
            snapshot.healthy_count + snapshot.at_risk_count + snapshot.failed_count,
            snapshot.node_count()
        );
        assert!(snapshot.events.len() <= 50);
        assert!(
            snapshot
                .events
                .windows(2)
                .all(|pair| pair[0].created_tick() >= pair[1].created_tick())
        );
    }
}

#[test]
fn events_move_from_failed_to_healed_once() {
    let mut session = session_with_fleet(106, 20);
    let seen = recorder(&mut session);
    session.start();
    session.advance_to(300);

    let mut last_status: HashMap<EventId, EventStatus> = HashMap::new();
    for snapshot in seen.lock().unwrap().iter() {
        for event in &snapshot.events {
            if let Some(previous) = last_status.insert(event.id().clone(), event.status()) {
                if previous == EventStatus::Healed {
                    assert_eq!(event.status(), EventStatus::Healed);
                }
            }
        }
    }
    assert!(last_status.values().any(|s| *s == EventStatus::Healed));
}

#[test]
fn stopping_drains_outstanding_heals() {
    let mut session = session_with_fleet(107, 20);
    session.start();
    session.advance_to(40);
    session.stop();
    let generated = session.snapshot().events.len();
    assert_eq!(generated, 10);

    session.advance_to(1_000);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.events.len(), generated);
    assert!(snapshot.events.iter().all(|e| e.status().is_resolved()));
    assert_eq!(snapshot.healed_count, 12 + 10);
    assert_eq!(snapshot.failed_count, 0);
}

#[test]
fn restart_resumes_cadence_from_current_instant() {
    let mut session = session_with_fleet(108, 20);
    session.start();
    session.advance_to(5);
    session.stop();
    session.advance_to(10);
    session.start();
    session.advance_to(13);
    assert_eq!(session.snapshot().events.len(), 1);
    session.advance_to(14);
    assert_eq!(session.snapshot().events.len(), 2);
}

#[test]
fn drained_fleet_has_no_current_resolution_or_alerts() {
    let mut session = session_with_fleet(109, 20);
    session.start();
    session.advance_to(8);
    let live = session.snapshot();
    assert_eq!(recent_alerts(&live.events, 5).len(), 2);
    assert!(latest_narrative(&live).is_some());

    session.stop();
    session.advance_to(100);
    let drained = session.snapshot();
    assert!(drained.events.iter().all(|e| e.status().is_resolved()));
    assert!(latest_narrative(&drained).is_none());
    assert!(recent_alerts(&drained.events, 5).is_empty());
}
