//! Domain models - identifiers, QR payloads, overstay records and roster entries
//!
//! This module contains the canonical data types used throughout the crate:
//! - `VisitorId` / `GateId` - opaque identifiers assigned upstream
//! - `QrPayload` - the record carried inside a gate pass token
//! - `Severity` - overstay tier (NONE, MEDIUM, HIGH, CRITICAL)
//! - `OverstayRecord` - result of classifying one visitor
//! - `VisitorEntry` - roster row supplied by the backend

pub mod types;
pub mod visitor;

// Re-export commonly used types at module level
pub use types::{GateId, OverstayRecord, QrPayload, Severity, VisitorId};
pub use visitor::{VisitorEntry, VisitorStatus};
