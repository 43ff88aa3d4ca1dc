use anyhow::Result;
use colored::Colorize;
use sentinel_engine::constants::{FEED_WINDOW, LOWEST_HEALTH_WINDOW, RECENT_ALERTS_WINDOW};
use sentinel_engine::{
    EngineConfig, EventId, EventStatus, FleetSnapshot, HealthBand, SentinelSession,
    flagged_for_intervention, latest_narrative, lowest_health, recent_alerts, recent_feed,
    spawn_realtime, ticker_line,
};
use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

/// Prints each event the first time it is seen and again when it heals.
#[derive(Debug, Default)]
struct FeedTracker {
    seen: HashMap<EventId, EventStatus>,
}

impl FeedTracker {
    fn render(&mut self, snapshot: &FleetSnapshot, out: &mut dyn Write) -> Result<()> {
        let mut healed_any = false;
        for event in recent_feed(&snapshot.events, FEED_WINDOW).iter().rev() {
            match self.seen.insert(event.id().clone(), event.status()) {
                None => writeln!(
                    out,
                    "[t={:>5}] {} {} {} {} ({:?}, {}% confidence)",
                    snapshot.now,
                    "FAILED".red().bold(),
                    event.node_id(),
                    event.city(),
                    event.failure_type(),
                    event.severity(),
                    event.confidence()
                )?,
                Some(previous) if previous != event.status() && event.status().is_resolved() => {
                    healed_any = true;
                    writeln!(
                        out,
                        "[t={:>5}] {} {} {}",
                        snapshot.now,
                        "HEALED".green().bold(),
                        event.node_id(),
                        event.id()
                    )?;
                }
                Some(_) => {}
            }
        }
        self.seen
            .retain(|id, _| snapshot.events.iter().any(|event| event.id() == id));
        if healed_any {
            writeln!(out, "          {}", ticker_line(snapshot).dimmed())?;
        }
        Ok(())
    }
}

/// Drive a session on the wall clock for `duration`, streaming the feed to
/// `out`, then stop it, let it settle, and print a fleet summary.
pub async fn run_live(
    config: EngineConfig,
    seed: u64,
    duration: Duration,
    out: &mut dyn Write,
) -> Result<FleetSnapshot> {
    let session = SentinelSession::new(config, seed)?;
    log::info!("live session: {session:?}");
    let handle = spawn_realtime(session);
    let mut updates = handle.subscribe();
    let mut feed = FeedTracker::default();

    let deadline = tokio::time::sleep(duration);
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            () = &mut deadline => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                feed.render(&snapshot, out)?;
                out.flush()?;
            }
        }
    }

    handle.stop();
    let session = handle.shutdown().await?;
    let snapshot = session.snapshot();
    render_summary(&snapshot, out)?;
    Ok(snapshot)
}

fn render_summary(snapshot: &FleetSnapshot, out: &mut dyn Write) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "🛰️  Fleet Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "=================".cyan())?;
    writeln!(out, "{}", ticker_line(snapshot))?;
    writeln!(
        out,
        "Healthy: {}  At risk: {}  Failed: {}  Flagged for intervention: {}",
        snapshot.healthy_count.to_string().green(),
        snapshot.at_risk_count.to_string().yellow(),
        snapshot.failed_count.to_string().red(),
        flagged_for_intervention(snapshot)
    )?;

    writeln!(out)?;
    writeln!(out, "Lowest health:")?;
    for node in lowest_health(&snapshot.nodes, LOWEST_HEALTH_WINDOW) {
        let score = format!("{:>3}", node.health_score);
        let score = match HealthBand::from_score(node.health_score) {
            HealthBand::Critical => score.red(),
            HealthBand::Degraded => score.yellow(),
            HealthBand::Ok => score.green(),
        };
        writeln!(
            out,
            "  {score} {:<6} {:<10} {}",
            node.node_id,
            node.city,
            node.status.label()
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Recent alerts:")?;
    let alerts = recent_alerts(&snapshot.events, RECENT_ALERTS_WINDOW);
    if alerts.is_empty() {
        writeln!(out, "  none")?;
    }
    for event in alerts {
        writeln!(
            out,
            "  {} {:<6} {:<10} {}",
            "FAILED".red(),
            event.node_id(),
            event.city(),
            event.failure_type()
        )?;
    }

    if let Some(narrative) = latest_narrative(snapshot) {
        writeln!(out)?;
        writeln!(out, "Latest resolution:")?;
        for line in narrative.lines() {
            writeln!(out, "  {line}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn live_run_streams_failures_and_heals() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        let snapshot = run_live(EngineConfig::default(), 42, Duration::from_secs(30), &mut out)
            .await
            .unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("FAILED"));
        assert!(text.contains("HEALED"));
        assert!(text.contains("Fleet Summary"));
        assert!(text.contains("Lowest health:"));
        assert!(text.contains("Recent alerts:"));
        assert!(text.contains("Current Status:"));
        assert!(!snapshot.events.is_empty());
    }

    #[test]
    fn tracker_reports_each_transition_once() {
        colored::control::set_override(false);
        let config = EngineConfig::default();
        let mut session = SentinelSession::new(config, 5).unwrap();
        let mut tracker = FeedTracker::default();
        let mut out = Vec::new();

        session.force_generate();
        tracker.render(&session.snapshot(), &mut out).unwrap();
        tracker.render(&session.snapshot(), &mut out).unwrap();
        session.run_until_idle();
        tracker.render(&session.snapshot(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("FAILED").count(), 1);
        assert_eq!(text.matches("HEALED").count(), 1);
        assert!(text.contains("Self-Healed Today: 13"));
    }

    #[test]
    fn summary_lists_open_alerts_until_they_heal() {
        colored::control::set_override(false);
        let mut session = SentinelSession::new(EngineConfig::default(), 11).unwrap();
        for _ in 0..7 {
            session.force_generate();
        }

        let mut out = Vec::new();
        let open = session.snapshot();
        render_summary(&open, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let alerts = text
            .split("Recent alerts:")
            .nth(1)
            .and_then(|rest| rest.split("Latest resolution:").next())
            .unwrap();
        assert_eq!(alerts.matches("FAILED").count(), RECENT_ALERTS_WINDOW);
        assert!(alerts.contains(open.events[0].node_id()));
        assert!(text.contains("Latest resolution:"));

        session.run_until_idle();
        let mut out = Vec::new();
        render_summary(&session.snapshot(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Recent alerts:\n  none"));
        assert!(!text.contains("Latest resolution:"));
    }
}
