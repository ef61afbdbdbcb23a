//! Roster entries as delivered by the visitor backend

use crate::domain::types::{GateId, VisitorId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Visitor lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitorStatus {
    Pending,
    Approved,
    Rejected,
    #[serde(alias = "checked-in")]
    CheckedIn,
    #[serde(alias = "checked-out")]
    CheckedOut,
}

impl VisitorStatus {
    /// Only a checked-in visitor is physically on site
    #[inline]
    pub fn is_present(&self) -> bool {
        matches!(self, VisitorStatus::CheckedIn)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VisitorStatus::Pending => "pending",
            VisitorStatus::Approved => "approved",
            VisitorStatus::Rejected => "rejected",
            VisitorStatus::CheckedIn => "checked_in",
            VisitorStatus::CheckedOut => "checked_out",
        }
    }
}

/// One visitor row from the roster feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorEntry {
    pub visitor_id: VisitorId,
    pub name: String,
    pub gate: GateId,
    #[serde(default)]
    pub host: String,
    pub allowed_until: DateTime<Utc>,
    pub status: VisitorStatus,
}

impl VisitorEntry {
    #[inline]
    pub fn is_present(&self) -> bool {
        self.status.is_present()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entry() {
        let line = r#"{"visitorId":"V-17","name":"Ada Lovelace","gate":"GATE-2","host":"C. Babbage","allowedUntil":"2026-03-01T17:00:00Z","status":"checked_in"}"#;
        let entry: VisitorEntry = serde_json::from_str(line).unwrap();

        assert_eq!(entry.visitor_id, VisitorId::from("V-17"));
        assert_eq!(entry.gate, GateId::from("GATE-2"));
        assert_eq!(entry.host, "C. Babbage");
        assert_eq!(entry.status, VisitorStatus::CheckedIn);
        assert!(entry.is_present());
    }

    #[test]
    fn test_host_defaults_to_empty() {
        let line = r#"{"visitorId":"V-1","name":"N","gate":"G","allowedUntil":"2026-03-01T17:00:00Z","status":"approved"}"#;
        let entry: VisitorEntry = serde_json::from_str(line).unwrap();
        assert_eq!(entry.host, "");
        assert!(!entry.is_present());
    }

    #[test]
    fn test_status_aliases() {
        let status: VisitorStatus = serde_json::from_str("\"checked-in\"").unwrap();
        assert_eq!(status, VisitorStatus::CheckedIn);
        let status: VisitorStatus = serde_json::from_str("\"checked-out\"").unwrap();
        assert_eq!(status, VisitorStatus::CheckedOut);
    }

    #[test]
    fn test_only_checked_in_is_present() {
        assert!(VisitorStatus::CheckedIn.is_present());
        assert!(!VisitorStatus::Pending.is_present());
        assert!(!VisitorStatus::Approved.is_present());
        assert!(!VisitorStatus::Rejected.is_present());
        assert!(!VisitorStatus::CheckedOut.is_present());
    }
}
