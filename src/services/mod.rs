//! Services - gate pass and overstay logic
//!
//! This module contains the core business logic services:
//! - `qr_codec` - Sealed (and explicitly insecure plaintext) QR token codec
//! - `overstay` - Overstay minutes and severity classification
//! - `gate_scanner` - Entry verdicts for scanned badges
//! - `overstay_report` - Dashboard report, heatmap and export rows
//! - `roster_monitor` - Periodic re-evaluation and escalation logging

pub mod gate_scanner;
pub mod overstay;
pub mod overstay_report;
pub mod qr_codec;
pub mod roster_monitor;

// Re-export commonly used types
pub use gate_scanner::{GateScanner, RejectReason, ScanPolicy, ScanVerdict};
pub use overstay::{classify, classify_now, sort_by_overstay};
pub use overstay_report::OverstayReport;
pub use qr_codec::{codec_from_config, PassCodec, PlaintextQrCodec, QrCodec, QrError};
pub use roster_monitor::{Escalation, RosterMonitor};
