//! Alert — a transient, severity-tagged notification.
//!
//! Alerts are shown for a fixed duration and then removed; they are never
//! persisted.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::AlertId;
use crate::time::SimTime;

/// How an alert should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => f.write_str("info"),
            Self::Success => f.write_str("success"),
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// A queued notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub message: String,
    pub severity: Severity,
    pub raised_at: SimTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_serialize_severity_lowercase() {
        let json = serde_json::to_string(&Severity::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
        assert_eq!(Severity::Success.to_string(), "success");
    }

    #[test]
    fn should_serialize_alert_fields() {
        let alert = Alert {
            id: AlertId::new(7),
            message: "Rain detected!".to_string(),
            severity: Severity::Error,
            raised_at: SimTime::from_millis(15_000),
        };
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "message": "Rain detected!",
                "severity": "error",
                "raised_at": 15000
            })
        );
    }
}
