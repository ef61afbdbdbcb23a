//! Gate scanner - turns a scanned badge string into an entry verdict
//!
//! Decoding is delegated to a `PassCodec`. On top of that the scanner can
//! enforce two site policies:
//! - `expected_gate`: tokens issued for another gate are rejected
//! - `max_age`: tokens older than the window are rejected (off by default)
//!
//! The person at the gate only ever sees the generic "invalid code" message.

use crate::domain::types::{GateId, QrPayload};
use crate::infra::config::Config;
use crate::services::qr_codec::PassCodec;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Future-dated tokens within this allowance are tolerated (scanner clock skew)
const MAX_CLOCK_SKEW: Duration = Duration::from_secs(30);

/// Message shown to the visitor for every rejection
pub const INVALID_CODE_MESSAGE: &str = "invalid code";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPolicy {
    pub max_age: Option<Duration>,
    pub expected_gate: Option<GateId>,
}

impl ScanPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self { max_age: config.qr_max_age(), expected_gate: config.qr_expected_gate().cloned() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    InvalidCode,
    WrongGate,
    Expired,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::InvalidCode => "invalid_code",
            RejectReason::WrongGate => "wrong_gate",
            RejectReason::Expired => "expired",
        }
    }

    /// What the visitor is told. Identical for every reason.
    pub fn user_message(&self) -> &'static str {
        INVALID_CODE_MESSAGE
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanVerdict {
    Accepted(QrPayload),
    Rejected(RejectReason),
}

impl ScanVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ScanVerdict::Accepted(_))
    }
}

pub struct GateScanner {
    codec: Arc<dyn PassCodec>,
    policy: ScanPolicy,
}

impl GateScanner {
    pub fn new(codec: Arc<dyn PassCodec>, policy: ScanPolicy) -> Self {
        Self { codec, policy }
    }

    /// Scan against the system clock
    pub fn scan(&self, raw: &str) -> ScanVerdict {
        self.scan_at(raw, Utc::now())
    }

    /// Scan with an explicit clock reading
    pub fn scan_at(&self, raw: &str, now: DateTime<Utc>) -> ScanVerdict {
        let payload = match self.codec.decode(raw) {
            Ok(payload) => payload,
            Err(_) => {
                warn!(reason = RejectReason::InvalidCode.as_str(), "scan_rejected");
                return ScanVerdict::Rejected(RejectReason::InvalidCode);
            }
        };

        if let Some(reason) = self.check_policy(&payload, now) {
            warn!(
                visitor_id = %payload.visitor_id,
                gate_id = %payload.gate_id,
                reason = reason.as_str(),
                "scan_rejected"
            );
            return ScanVerdict::Rejected(reason);
        }

        info!(
            visitor_id = %payload.visitor_id,
            gate_id = %payload.gate_id,
            issued_at = %payload.issued_at,
            "scan_accepted"
        );
        ScanVerdict::Accepted(payload)
    }

    fn check_policy(&self, payload: &QrPayload, now: DateTime<Utc>) -> Option<RejectReason> {
        if let Some(expected) = &self.policy.expected_gate {
            if &payload.gate_id != expected {
                return Some(RejectReason::WrongGate);
            }
        }

        let max_age = self.policy.max_age?;
        let age = now - payload.issued_at;

        // Negative age means issued in the future according to our clock
        let skew = chrono::Duration::from_std(MAX_CLOCK_SKEW)
            .unwrap_or_else(|_| chrono::Duration::zero());
        if age < -skew {
            return Some(RejectReason::Expired);
        }

        match chrono::Duration::from_std(max_age) {
            Ok(window) if age > window => Some(RejectReason::Expired),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::VisitorId;
    use crate::infra::secret::SharedSecret;
    use crate::services::qr_codec::{PlaintextQrCodec, QrCodec};
    use chrono::TimeZone;

    fn codec() -> Arc<QrCodec> {
        Arc::new(QrCodec::new(&SharedSecret::from_bytes(b"gate-scanner-test-secret").unwrap()))
    }

    fn issued() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_accepts_valid_token() {
        let codec = codec();
        let token = codec.encode_at("V1", "GATE-1", issued()).unwrap();
        let scanner = GateScanner::new(codec, ScanPolicy::default());

        let verdict = scanner.scan_at(&token, issued() + chrono::Duration::days(30));
        let ScanVerdict::Accepted(payload) = verdict else {
            panic!("expected accepted, got {verdict:?}");
        };
        assert_eq!(payload.visitor_id, VisitorId::from("V1"));
    }

    #[test]
    fn test_rejects_garbage() {
        let scanner = GateScanner::new(codec(), ScanPolicy::default());
        assert_eq!(scanner.scan("hello"), ScanVerdict::Rejected(RejectReason::InvalidCode));
    }

    #[test]
    fn test_rejects_wrong_gate() {
        let codec = codec();
        let token = codec.encode_at("V1", "GATE-2", issued()).unwrap();
        let policy = ScanPolicy { expected_gate: Some(GateId::from("GATE-1")), max_age: None };
        let scanner = GateScanner::new(codec, policy);

        assert_eq!(
            scanner.scan_at(&token, issued()),
            ScanVerdict::Rejected(RejectReason::WrongGate)
        );
    }

    #[test]
    fn test_freshness_window() {
        let codec = codec();
        let token = codec.encode_at("V1", "GATE-1", issued()).unwrap();
        let policy = ScanPolicy { max_age: Some(Duration::from_secs(300)), expected_gate: None };
        let scanner = GateScanner::new(codec, policy);

        assert!(scanner.scan_at(&token, issued() + chrono::Duration::seconds(300)).is_accepted());
        assert_eq!(
            scanner.scan_at(&token, issued() + chrono::Duration::seconds(301)),
            ScanVerdict::Rejected(RejectReason::Expired)
        );
    }

    #[test]
    fn test_future_token_rejected_beyond_skew() {
        let codec = codec();
        let token = codec.encode_at("V1", "GATE-1", issued()).unwrap();
        let policy = ScanPolicy { max_age: Some(Duration::from_secs(300)), expected_gate: None };
        let scanner = GateScanner::new(codec, policy);

        assert!(scanner.scan_at(&token, issued() - chrono::Duration::seconds(10)).is_accepted());
        assert_eq!(
            scanner.scan_at(&token, issued() - chrono::Duration::seconds(31)),
            ScanVerdict::Rejected(RejectReason::Expired)
        );
    }

    #[test]
    fn test_user_message_is_generic() {
        for reason in [RejectReason::InvalidCode, RejectReason::WrongGate, RejectReason::Expired] {
            assert_eq!(reason.user_message(), "invalid code");
        }
    }

    #[test]
    fn test_policy_from_config() {
        let policy = ScanPolicy::from_config(&Config::default());
        assert_eq!(policy, ScanPolicy::default());
    }

    #[test]
    fn test_plaintext_codec_pluggable() {
        let token = PlaintextQrCodec.encode_at("V9", "GATE-1", issued()).unwrap();
        let scanner = GateScanner::new(Arc::new(PlaintextQrCodec), ScanPolicy::default());
        assert!(scanner.scan_at(&token, issued()).is_accepted());
    }
}
