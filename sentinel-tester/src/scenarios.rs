use anyhow::{Context, Result, ensure};
use chrono::{DateTime, Utc};
use sentinel_engine::{
    CITIES, EngineConfig, EventStatus, FleetSnapshot, FleetState, Node, NodeStatus,
    SentinelSession, flagged_for_intervention, latest_narrative,
};
use std::sync::{Arc, Mutex};

type ScenarioFn = fn(&EngineConfig, u64) -> Result<()>;

/// One named check run against a fresh session per seed.
#[derive(Debug, Clone, Copy)]
pub struct FleetScenario {
    pub name: &'static str,
    pub description: &'static str,
    run: ScenarioFn,
}

impl FleetScenario {
    /// # Errors
    ///
    /// Returns the first expectation the run violated.
    pub fn run(&self, config: &EngineConfig, seed: u64) -> Result<()> {
        (self.run)(config, seed).with_context(|| format!("{} (seed {seed})", self.name))
    }
}

static SCENARIOS: [FleetScenario; 8] = [
    FleetScenario {
        name: "smoke",
        description: "Start, run a minute of virtual time, sanity-check the snapshot",
        run: smoke,
    },
    FleetScenario {
        name: "lifecycle",
        description: "One tick fails one machine; the heal restores it",
        run: lifecycle,
    },
    FleetScenario {
        name: "eviction",
        description: "Overflowing the event window drops the oldest event",
        run: eviction,
    },
    FleetScenario {
        name: "overwrite-race",
        description: "A stale heal leaves a re-failed machine alone",
        run: overwrite_race,
    },
    FleetScenario {
        name: "monotonic-counters",
        description: "Counters never decrease and status counts always add up",
        run: monotonic_counters,
    },
    FleetScenario {
        name: "stop-drain",
        description: "Stopping halts generation; queued heals follow the config",
        run: stop_drain,
    },
    FleetScenario {
        name: "determinism",
        description: "Same seed and epoch replay to identical snapshots",
        run: determinism,
    },
    FleetScenario {
        name: "narrative",
        description: "Remediation text names the machine and is stable",
        run: narrative,
    },
];

pub fn list_scenarios() -> impl Iterator<Item = (&'static str, &'static str)> {
    SCENARIOS.iter().map(|s| (s.name, s.description))
}

pub fn get_scenario(name: &str) -> Option<&'static FleetScenario> {
    SCENARIOS.iter().find(|s| s.name == name)
}

pub fn all_scenario_names() -> Vec<String> {
    SCENARIOS.iter().map(|s| s.name.to_string()).collect()
}

const fn fixed_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

fn session(config: &EngineConfig, seed: u64) -> Result<SentinelSession> {
    Ok(SentinelSession::with_epoch(
        config.clone(),
        seed,
        fixed_epoch(),
    )?)
}

fn healthy_session(config: &EngineConfig, seed: u64, size: usize) -> Result<SentinelSession> {
    let nodes = (0..size)
        .map(|i| {
            let city = &CITIES[i % CITIES.len()];
            Node::new(
                format!("#{}", 1000 + i),
                city.name,
                (city.lat, city.lng),
                NodeStatus::Healthy,
                100,
            )
        })
        .collect();
    let state = FleetState::from_nodes(config, nodes);
    Ok(SentinelSession::from_state(
        config.clone(),
        seed,
        fixed_epoch(),
        state,
    )?)
}

fn check_counts(snapshot: &FleetSnapshot, event_cap: usize) -> Result<()> {
    let total = snapshot.healthy_count + snapshot.at_risk_count + snapshot.failed_count;
    ensure!(
        total == snapshot.node_count(),
        "status counts sum to {total}, fleet has {} nodes",
        snapshot.node_count()
    );
    ensure!(
        snapshot.events.len() <= event_cap,
        "{} events retained, cap is {event_cap}",
        snapshot.events.len()
    );
    ensure!(
        flagged_for_intervention(snapshot) == snapshot.at_risk_count + snapshot.failed_count,
        "flagged count disagrees with status counts"
    );
    Ok(())
}

fn smoke(config: &EngineConfig, seed: u64) -> Result<()> {
    let mut session = session(config, seed)?;
    ensure!(session.start(), "fresh session refused to start");
    session.advance_by(config.tick_interval.saturating_mul(15));
    let snapshot = session.snapshot();
    ensure!(
        snapshot.events.len() == config.event_cap.min(15),
        "expected {} events, got {}",
        config.event_cap.min(15),
        snapshot.events.len()
    );
    ensure!(
        snapshot.node_count() == config.node_count,
        "fleet size drifted"
    );
    check_counts(&snapshot, config.event_cap)
}

fn lifecycle(config: &EngineConfig, seed: u64) -> Result<()> {
    let mut session = healthy_session(config, seed, config.node_count)?;
    session.start();
    session.advance_by(config.tick_interval);

    let snapshot = session.snapshot();
    ensure!(snapshot.events.len() == 1, "one tick produced {} events", snapshot.events.len());
    ensure!(snapshot.failed_count == 1, "{} machines failed on one tick", snapshot.failed_count);
    let event = snapshot.events[0].clone();
    ensure!(event.status() == EventStatus::Failed, "new event is {:?}", event.status());

    session.advance_by(config.heal_delay);
    let healed = session
        .state()
        .event(event.id())
        .map(|e| e.status())
        .context("event left the window before its heal")?;
    ensure!(healed == EventStatus::Healed, "event still {healed:?} after heal delay");
    if let Some(node) = session.state().node_for_event(event.id()) {
        ensure!(node.status == NodeStatus::Healthy, "{} not restored", node.node_id);
        ensure!(
            (75..=98).contains(&node.health_score),
            "restored health {} out of range",
            node.health_score
        );
    }
    ensure!(
        session.state().healed_count() > config.initial_healed,
        "healed counter did not move"
    );
    Ok(())
}

fn eviction(config: &EngineConfig, seed: u64) -> Result<()> {
    let mut session = session(config, seed)?;
    let first = session.force_generate();
    for _ in 0..config.event_cap {
        session.force_generate();
    }
    let snapshot = session.snapshot();
    ensure!(
        snapshot.events.len() == config.event_cap,
        "window holds {} events, cap is {}",
        snapshot.events.len(),
        config.event_cap
    );
    ensure!(session.state().event(&first).is_none(), "oldest event survived eviction");

    let fired = session.run_until_idle();
    let expected = u64::try_from(config.event_cap)?.saturating_add(1);
    ensure!(u64::try_from(fired)? == expected, "{fired} heals fired, expected {expected}");
    ensure!(
        session.state().healed_count() == config.initial_healed.saturating_add(expected),
        "evicted heals did not advance the counter"
    );
    Ok(())
}

fn overwrite_race(config: &EngineConfig, seed: u64) -> Result<()> {
    let mut session = healthy_session(config, seed, 1)?;
    let older = session.force_generate();
    let newer = session.force_generate();
    ensure!(
        session.state().nodes()[0].last_event_is(&newer),
        "machine does not point at the newest event"
    );

    session.step().context("first heal missing")?;
    ensure!(
        session.state().event(&older).map(|e| e.status()) == Some(EventStatus::Healed),
        "older event not healed"
    );
    ensure!(
        session.state().nodes()[0].status == NodeStatus::Failed,
        "stale heal restored a re-failed machine"
    );

    session.step().context("second heal missing")?;
    ensure!(
        session.state().nodes()[0].status == NodeStatus::Healthy,
        "current heal did not restore the machine"
    );
    Ok(())
}

fn monotonic_counters(config: &EngineConfig, seed: u64) -> Result<()> {
    let mut session = session(config, seed)?;
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    session.subscribe(move |snapshot: &FleetSnapshot| {
        if let Ok(mut seen) = sink.lock() {
            seen.push(snapshot.clone());
        }
    });
    session.start();
    session.advance_by(config.tick_interval.saturating_mul(250));

    let seen = seen
        .lock()
        .map_err(|_| anyhow::anyhow!("observer lock poisoned"))?;
    ensure!(!seen.is_empty(), "observer never notified");
    for pair in seen.windows(2) {
        ensure!(pair[1].healed_count >= pair[0].healed_count, "healed count decreased");
        ensure!(
            pair[1].complaints_blocked >= pair[0].complaints_blocked,
            "complaints blocked decreased"
        );
    }
    for snapshot in seen.iter() {
        check_counts(snapshot, config.event_cap)?;
    }
    Ok(())
}

fn stop_drain(config: &EngineConfig, seed: u64) -> Result<()> {
    let mut session = session(config, seed)?;
    session.start();
    session.advance_by(config.tick_interval.saturating_mul(5));
    ensure!(session.stop(), "running session refused to stop");
    ensure!(!session.stop(), "second stop reported a change");
    let generated = session.snapshot().events.len();
    let healed_before = session.state().healed_count();

    session.advance_by(config.heal_delay.saturating_add(config.tick_interval));
    let snapshot = session.snapshot();
    ensure!(snapshot.events.len() == generated, "events generated after stop");
    ensure!(session.pending_heals() == 0, "heals still queued");
    if config.cancel_heals_on_stop {
        ensure!(snapshot.healed_count == healed_before, "cancelled heals still fired");
    } else {
        ensure!(
            snapshot.events.iter().all(|e| e.status().is_resolved()),
            "queued heals did not drain"
        );
    }
    Ok(())
}

fn determinism(config: &EngineConfig, seed: u64) -> Result<()> {
    let replay = |seed| -> Result<FleetSnapshot> {
        let mut session = session(config, seed)?;
        session.start();
        session.advance_by(config.tick_interval.saturating_mul(40));
        Ok(session.snapshot())
    };
    let first = serde_json::to_string(&replay(seed)?)?;
    let second = serde_json::to_string(&replay(seed)?)?;
    ensure!(first == second, "replay diverged");
    Ok(())
}

fn narrative(config: &EngineConfig, seed: u64) -> Result<()> {
    let mut session = session(config, seed)?;
    for _ in 0..10 {
        session.force_generate();
        let snapshot = session.snapshot();
        let event = snapshot.latest_event().context("no event after generate")?;
        let text = latest_narrative(&snapshot).context("no narrative")?;
        ensure!(!text.is_empty(), "empty narrative for {}", event.failure_type());
        ensure!(
            text.contains(event.node_id()) && text.contains(event.city()),
            "narrative does not name the machine"
        );
        ensure!(text.contains("Current Status:"), "narrative lacks status line");
        ensure!(session.resolve(event) == text, "narrative not stable");
    }
    Ok(())
}
