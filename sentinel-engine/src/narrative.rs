//! Remediation narrative for a failure event.
//!
//! The output depends only on the event's category, machine id, city and
//! confidence, so a presentation layer can reveal it progressively across
//! re-renders without the text drifting.

use crate::event::FleetEvent;

/// Remediation script for `event`, or an empty string when its category is
/// not in the catalog.
#[must_use]
pub fn resolve(event: &FleetEvent) -> String {
    event
        .failure_type()
        .narrative()
        .map(|template| template.render(event.node_id(), event.city(), event.confidence()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FailureType;
    use crate::event::{EventDraft, EventId};
    use chrono::{TimeZone, Utc};

    fn event(failure_type: FailureType) -> FleetEvent {
        let at = Utc.timestamp_millis_opt(42).unwrap();
        FleetEvent::from_draft(
            EventId::new(1, at),
            EventDraft {
                node_id: "#7310".into(),
                city: "Jaipur".into(),
                failure_type,
                confidence: 84,
                health_score_at_failure: 30,
            },
            at,
            0,
        )
    }

    #[test]
    fn hardware_fault_dispatches_engineer() {
        let script = resolve(&event(FailureType::HardwareFault));
        assert!(script.starts_with(
            "ATM #7310 Jaipur \u{2014} Hardware Fault detected (84% confidence).\n\n"
        ));
        assert!(script.contains("Step 2: ATM switched to maintenance mode.\n"));
        assert!(script.ends_with("Current Status: ENGINEER DISPATCHED..."));
    }

    #[test]
    fn cash_depletion_schedules_replenishment() {
        let script = resolve(&event(FailureType::CashDepletion));
        assert!(script.contains("Step 1: Cash replenishment request auto-generated."));
        assert!(script.ends_with("Current Status: REPLENISHMENT SCHEDULED..."));
    }

    #[test]
    fn self_healing_categories_share_status_line() {
        for kind in [
            FailureType::NetworkTimeout,
            FailureType::SoftwareCrash,
            FailureType::ServerOverload,
        ] {
            let script = resolve(&event(kind));
            assert!(script.ends_with("Current Status: AUTO-HEALING IN PROGRESS..."));
        }
    }

    #[test]
    fn resolution_is_stable_across_calls() {
        let failure = event(FailureType::ServerOverload);
        assert_eq!(resolve(&failure), resolve(&failure));
        assert_eq!(resolve(&failure), resolve(&failure.clone()));
    }

    #[test]
    fn unknown_category_yields_empty_script() {
        assert_eq!(resolve(&event(FailureType::Other("Paper Jam".into()))), "");
    }
}
