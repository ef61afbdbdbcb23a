//! Roster ingest - reads the visitor roster exported by the backend
//!
//! Roster files are JSONL (one `VisitorEntry` per line). Blank lines are
//! skipped; a malformed line is logged and skipped so one bad row does not
//! hide every other visitor from the dashboard.

use crate::domain::visitor::VisitorEntry;
use anyhow::Context;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Read and parse a roster file
pub fn read_roster<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<VisitorEntry>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read roster file {}", path.display()))?;

    let entries = parse_roster(&content);
    debug!(file = %path.display(), visitors = entries.len(), "roster_loaded");
    Ok(entries)
}

/// Parse roster text, skipping blank and malformed lines
pub fn parse_roster(content: &str) -> Vec<VisitorEntry> {
    let mut entries = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<VisitorEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                warn!(line = idx + 1, error = %e, "roster_line_skipped");
            }
        }
    }

    entries
}
