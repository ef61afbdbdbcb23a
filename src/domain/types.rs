//! Shared types for gate passes and overstay tracking

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Newtype wrapper for visitor IDs to provide type safety
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitorId(pub String);

impl VisitorId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VisitorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VisitorId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Newtype wrapper for gate IDs (short codes such as `GATE-1`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GateId(pub String);

impl GateId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GateId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Record carried inside a gate pass token.
///
/// `issued_at` is stamped by the encoder; callers of `encode` never supply it.
/// Unknown or missing fields are rejected on deserialization so a token only
/// decodes back into this exact shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QrPayload {
    pub visitor_id: VisitorId,
    pub gate_id: GateId,
    #[serde(serialize_with = "serialize_millis", deserialize_with = "deserialize_rfc3339")]
    pub issued_at: DateTime<Utc>,
}

fn serialize_millis<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn deserialize_rfc3339<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(serde::de::Error::custom)
}

/// Overstay at or above this many minutes is HIGH
pub const HIGH_THRESHOLD_MINUTES: u64 = 120;

/// Overstay at or above this many minutes is CRITICAL
pub const CRITICAL_THRESHOLD_MINUTES: u64 = 240;

/// Overstay severity tier, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    None,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// All tiers, least severe first
    pub const ALL: [Severity; 4] =
        [Severity::None, Severity::Medium, Severity::High, Severity::Critical];

    /// Map elapsed overstay minutes to a tier
    #[inline]
    pub fn from_minutes(overstay_minutes: u64) -> Self {
        match overstay_minutes {
            0 => Severity::None,
            m if m < HIGH_THRESHOLD_MINUTES => Severity::Medium,
            m if m < CRITICAL_THRESHOLD_MINUTES => Severity::High,
            _ => Severity::Critical,
        }
    }

    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::None => "NONE",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one visitor at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverstayRecord {
    pub allowed_until: DateTime<Utc>,
    pub now: DateTime<Utc>,
    pub overstay_minutes: u64,
    pub severity: Severity,
}

impl OverstayRecord {
    /// True if the visitor is past their window
    #[inline]
    pub fn is_overstaying(&self) -> bool {
        self.overstay_minutes > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_severity_from_minutes() {
        assert_eq!(Severity::from_minutes(0), Severity::None);
        assert_eq!(Severity::from_minutes(1), Severity::Medium);
        assert_eq!(Severity::from_minutes(119), Severity::Medium);
        assert_eq!(Severity::from_minutes(120), Severity::High);
        assert_eq!(Severity::from_minutes(239), Severity::High);
        assert_eq!(Severity::from_minutes(240), Severity::Critical);
        assert_eq!(Severity::from_minutes(u64::MAX), Severity::Critical);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::None < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
        assert!(Severity::ALL.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_severity_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Severity::Critical).unwrap(), "\"CRITICAL\"");
        let parsed: Severity = serde_json::from_str("\"MEDIUM\"").unwrap();
        assert_eq!(parsed, Severity::Medium);
    }

    #[test]
    fn test_payload_json_shape() {
        let payload = QrPayload {
            visitor_id: VisitorId::from("V1"),
            gate_id: GateId::from("GATE-1"),
            issued_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
        };

        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(
            json,
            r#"{"visitorId":"V1","gateId":"GATE-1","issuedAt":"2026-03-01T09:30:00.000Z"}"#
        );

        let back: QrPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_payload_rejects_unknown_fields() {
        let json = r#"{"visitorId":"V1","gateId":"G","issuedAt":"2026-03-01T09:30:00Z","x":1}"#;
        assert!(serde_json::from_str::<QrPayload>(json).is_err());
    }

    #[test]
    fn test_payload_rejects_missing_issued_at() {
        let json = r#"{"visitorId":"V1","gateId":"G"}"#;
        assert!(serde_json::from_str::<QrPayload>(json).is_err());
    }
}
