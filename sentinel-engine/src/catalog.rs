//! Static reference tables: cities, failure categories, severities and
//! remediation scripts. Nothing here changes for the life of the process.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::event::Severity;

/// Reference location for a monitored city.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct City {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

pub const CITIES: [City; 10] = [
    City {
        name: "Chennai",
        lat: 13.08,
        lng: 80.27,
    },
    City {
        name: "Mumbai",
        lat: 19.07,
        lng: 72.87,
    },
    City {
        name: "Delhi",
        lat: 28.61,
        lng: 77.2,
    },
    City {
        name: "Bangalore",
        lat: 12.97,
        lng: 77.59,
    },
    City {
        name: "Hyderabad",
        lat: 17.38,
        lng: 78.49,
    },
    City {
        name: "Kolkata",
        lat: 22.57,
        lng: 88.36,
    },
    City {
        name: "Pune",
        lat: 18.52,
        lng: 73.85,
    },
    City {
        name: "Ahmedabad",
        lat: 23.02,
        lng: 72.57,
    },
    City {
        name: "Jaipur",
        lat: 26.91,
        lng: 75.78,
    },
    City {
        name: "Lucknow",
        lat: 26.85,
        lng: 80.95,
    },
];

/// Look up a city by display name.
#[must_use]
pub fn city_by_name(name: &str) -> Option<&'static City> {
    CITIES.iter().find(|city| city.name == name)
}

/// Failure category attached to every event.
///
/// Serialized as its display name. Names outside the catalog survive a
/// round-trip as `Other` so foreign events stay representable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FailureType {
    NetworkTimeout,
    HardwareFault,
    SoftwareCrash,
    CashDepletion,
    ServerOverload,
    Other(String),
}

pub static FAILURE_TYPES: [FailureType; 5] = [
    FailureType::NetworkTimeout,
    FailureType::HardwareFault,
    FailureType::SoftwareCrash,
    FailureType::CashDepletion,
    FailureType::ServerOverload,
];

impl FailureType {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::NetworkTimeout => "Network Timeout",
            Self::HardwareFault => "Hardware Fault",
            Self::SoftwareCrash => "Software Crash",
            Self::CashDepletion => "Cash Depletion",
            Self::ServerOverload => "Server Overload",
            Self::Other(name) => name.as_str(),
        }
    }

    /// Parse a display name; unknown names become `Other`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        FAILURE_TYPES
            .iter()
            .find(|kind| kind.name() == name)
            .cloned()
            .unwrap_or_else(|| Self::Other(name.to_string()))
    }

    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Severity for the category; anything unmapped is a warning.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::HardwareFault | Self::SoftwareCrash => Severity::Critical,
            Self::CashDepletion => Severity::Info,
            Self::NetworkTimeout | Self::ServerOverload | Self::Other(_) => Severity::Warning,
        }
    }

    /// Remediation script for the category, if the catalog has one.
    #[must_use]
    pub const fn narrative(&self) -> Option<&'static NarrativeTemplate> {
        match self {
            Self::NetworkTimeout => Some(&NETWORK_TIMEOUT_PLAN),
            Self::HardwareFault => Some(&HARDWARE_FAULT_PLAN),
            Self::SoftwareCrash => Some(&SOFTWARE_CRASH_PLAN),
            Self::CashDepletion => Some(&CASH_DEPLETION_PLAN),
            Self::ServerOverload => Some(&SERVER_OVERLOAD_PLAN),
            Self::Other(_) => None,
        }
    }
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for FailureType {
    fn from(value: String) -> Self {
        Self::from_name(&value)
    }
}

impl From<FailureType> for String {
    fn from(value: FailureType) -> Self {
        match value {
            FailureType::Other(name) => name,
            known => known.name().to_string(),
        }
    }
}

/// Three-step remediation plan plus the status line shown under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NarrativeTemplate {
    pub headline: &'static str,
    pub steps: [&'static str; 3],
    pub status_line: &'static str,
}

const AUTO_HEALING: &str = "AUTO-HEALING IN PROGRESS...";

const NETWORK_TIMEOUT_PLAN: NarrativeTemplate = NarrativeTemplate {
    headline: "Network Timeout",
    steps: [
        "Auto-trigger remote router reset via API.",
        "Monitor response time for 15 minutes.",
        "If unresolved, dispatch Network Engineer (ETA: 45 min).",
    ],
    status_line: AUTO_HEALING,
};

const HARDWARE_FAULT_PLAN: NarrativeTemplate = NarrativeTemplate {
    headline: "Hardware Fault",
    steps: [
        "Alert dispatched to Hardware team via WhatsApp.",
        "ATM switched to maintenance mode.",
        "Nearest engineer notified \u{2014} Rajesh Kumar, 2.3km away.",
    ],
    status_line: "ENGINEER DISPATCHED...",
};

const SOFTWARE_CRASH_PLAN: NarrativeTemplate = NarrativeTemplate {
    headline: "Software Crash",
    steps: [
        "Auto-restart of ATM software service initiated.",
        "Transaction logs backed up.",
        "System health check running.",
    ],
    status_line: AUTO_HEALING,
};

const CASH_DEPLETION_PLAN: NarrativeTemplate = NarrativeTemplate {
    headline: "Cash Depletion",
    steps: [
        "Cash replenishment request auto-generated.",
        "Nearest CIT vehicle notified \u{2014} ETA: 90 min.",
        "ATM display updated with status message.",
    ],
    status_line: "REPLENISHMENT SCHEDULED...",
};

const SERVER_OVERLOAD_PLAN: NarrativeTemplate = NarrativeTemplate {
    headline: "Server Overload",
    steps: [
        "Load balancer reconfigured to redirect traffic.",
        "Secondary server activated.",
        "Performance monitoring intensified for 30 min.",
    ],
    status_line: AUTO_HEALING,
};

impl NarrativeTemplate {
    /// Fill the template for one machine.
    #[must_use]
    pub fn render(&self, node_id: &str, city: &str, confidence: u8) -> String {
        let [first, second, third] = self.steps;
        format!(
            "ATM {node_id} {city} \u{2014} {headline} detected ({confidence}% confidence).\n\n\
             Step 1: {first}\n\
             Step 2: {second}\n\
             Step 3: {third}\n\n\
             Current Status: {status}",
            headline = self.headline,
            status = self.status_line,
        )
    }
}
