//! Overstay classification
//!
//! Maps "how far past their window is this visitor" to a severity tier:
//! - 0 minutes: NONE
//! - 1..120 minutes: MEDIUM
//! - 120..240 minutes: HIGH
//! - 240+ minutes: CRITICAL
//!
//! Pure and total over all timestamps. Thresholds live in
//! `Severity::from_minutes` and nowhere else.

use crate::domain::types::{OverstayRecord, Severity};
use chrono::{DateTime, Utc};

/// Classify one visitor at `now`
pub fn classify(allowed_until: DateTime<Utc>, now: DateTime<Utc>) -> OverstayRecord {
    // num_minutes truncates toward zero; negatives clamp to 0 so floor is preserved
    let overstay_minutes = u64::try_from((now - allowed_until).num_minutes()).unwrap_or(0);

    OverstayRecord {
        allowed_until,
        now,
        overstay_minutes,
        severity: Severity::from_minutes(overstay_minutes),
    }
}

/// Classify against the system clock
pub fn classify_now(allowed_until: DateTime<Utc>) -> OverstayRecord {
    classify(allowed_until, Utc::now())
}

/// Order records most severe first. Stable, so ties keep input order.
pub fn sort_by_overstay<T, F>(items: &mut [T], minutes: F)
where
    F: Fn(&T) -> u64,
{
    items.sort_by(|a, b| minutes(b).cmp(&minutes(a)));
}
