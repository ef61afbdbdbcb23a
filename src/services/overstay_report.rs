//! Overstay report - what the security dashboard and CSV export consume
//!
//! Takes a roster snapshot, keeps checked-in visitors, classifies each one
//! and keeps those past their window, most severe first.

use crate::domain::types::{GateId, OverstayRecord, Severity, VisitorId};
use crate::domain::visitor::VisitorEntry;
use crate::services::overstay::{classify, sort_by_overstay};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// CSV column names, in order
pub const CSV_HEADER: [&str; 5] = ["name", "gate", "host", "overstayMinutes", "severity"];

/// One overstaying visitor
#[derive(Debug, Clone, PartialEq)]
pub struct OverstayEntry {
    pub visitor_id: VisitorId,
    pub name: String,
    pub gate: GateId,
    pub host: String,
    pub record: OverstayRecord,
}

impl OverstayEntry {
    #[inline]
    pub fn severity(&self) -> Severity {
        self.record.severity
    }

    /// Export row matching `CSV_HEADER`
    pub fn csv_row(&self) -> [String; 5] {
        [
            self.name.clone(),
            self.gate.to_string(),
            self.host.clone(),
            self.record.overstay_minutes.to_string(),
            self.record.severity.to_string(),
        ]
    }
}

/// Record counts per severity tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

impl SeverityCounts {
    fn add(&mut self, severity: Severity) {
        match severity {
            Severity::None => {}
            Severity::Medium => self.medium += 1,
            Severity::High => self.high += 1,
            Severity::Critical => self.critical += 1,
        }
    }

    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::None => 0,
            Severity::Medium => self.medium,
            Severity::High => self.high,
            Severity::Critical => self.critical,
        }
    }

    pub fn total(&self) -> usize {
        Severity::ALL.iter().map(|s| self.get(*s)).sum()
    }
}

#[derive(Debug, Clone)]
pub struct OverstayReport {
    generated_at: DateTime<Utc>,
    entries: Vec<OverstayEntry>,
}

impl OverstayReport {
    /// Build a report from a roster snapshot at `now`
    pub fn build(roster: &[VisitorEntry], now: DateTime<Utc>) -> Self {
        let mut entries: Vec<OverstayEntry> = roster
            .iter()
            .filter(|v| v.is_present())
            .map(|v| OverstayEntry {
                visitor_id: v.visitor_id.clone(),
                name: v.name.clone(),
                gate: v.gate.clone(),
                host: v.host.clone(),
                record: classify(v.allowed_until, now),
            })
            .filter(|e| e.record.is_overstaying())
            .collect();

        sort_by_overstay(&mut entries, |e| e.record.overstay_minutes);

        Self { generated_at: now, entries }
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Overstaying visitors, most severe first
    pub fn entries(&self) -> &[OverstayEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn rows(&self) -> impl Iterator<Item = [String; 5]> + '_ {
        self.entries.iter().map(OverstayEntry::csv_row)
    }

    pub fn severity_counts(&self) -> SeverityCounts {
        let mut counts = SeverityCounts::default();
        for entry in &self.entries {
            counts.add(entry.severity());
        }
        counts
    }

    /// Per-gate severity counts, gates in name order
    pub fn heatmap(&self) -> BTreeMap<GateId, SeverityCounts> {
        let mut map: BTreeMap<GateId, SeverityCounts> = BTreeMap::new();
        for entry in &self.entries {
            map.entry(entry.gate.clone()).or_default().add(entry.severity());
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::visitor::VisitorStatus;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 18, 0, 0).unwrap()
    }

    fn visitor(id: &str, gate: &str, minutes_over: i64, status: VisitorStatus) -> VisitorEntry {
        VisitorEntry {
            visitor_id: VisitorId::from(id),
            name: format!("Visitor {id}"),
            gate: GateId::from(gate),
            host: "Reception".to_string(),
            allowed_until: now() - Duration::minutes(minutes_over),
            status,
        }
    }

    fn sample_roster() -> Vec<VisitorEntry> {
        vec![
            visitor("A", "GATE-1", 30, VisitorStatus::CheckedIn),
            visitor("B", "GATE-2", 250, VisitorStatus::CheckedIn),
            visitor("C", "GATE-1", 500, VisitorStatus::CheckedOut),
            visitor("D", "GATE-1", 130, VisitorStatus::CheckedIn),
            visitor("E", "GATE-2", -15, VisitorStatus::CheckedIn),
            visitor("F", "GATE-2", 30, VisitorStatus::CheckedIn),
            visitor("G", "GATE-3", 999, VisitorStatus::Approved),
        ]
    }

    #[test]
    fn test_only_present_overstayers() {
        let report = OverstayReport::build(&sample_roster(), now());
        let ids: Vec<&str> = report.entries().iter().map(|e| e.visitor_id.as_str()).collect();
        assert_eq!(ids, vec!["B", "D", "A", "F"]);
        assert_eq!(report.len(), 4);
        assert_eq!(report.generated_at(), now());
    }

    #[test]
    fn test_rows_match_header() {
        let report = OverstayReport::build(&sample_roster(), now());
        let first = report.rows().next().unwrap();
        assert_eq!(first, [
            "Visitor B".to_string(),
            "GATE-2".to_string(),
            "Reception".to_string(),
            "250".to_string(),
            "CRITICAL".to_string(),
        ]);
        assert_eq!(CSV_HEADER.len(), first.len());
    }

    #[test]
    fn test_severity_counts() {
        let counts = OverstayReport::build(&sample_roster(), now()).severity_counts();
        assert_eq!(counts.get(Severity::Medium), 2);
        assert_eq!(counts.get(Severity::High), 1);
        assert_eq!(counts.get(Severity::Critical), 1);
        assert_eq!(counts.get(Severity::None), 0);
        assert_eq!(counts.total(), 4);
        assert_eq!(counts.total(), report_total(&counts));
    }

    fn report_total(counts: &SeverityCounts) -> usize {
        counts.medium + counts.high + counts.critical
    }

    #[test]
    fn test_heatmap_by_gate() {
        let heatmap = OverstayReport::build(&sample_roster(), now()).heatmap();
        let gates: Vec<&str> = heatmap.keys().map(|g| g.as_str()).collect();
        assert_eq!(gates, vec!["GATE-1", "GATE-2"]);

        let gate1 = heatmap[&GateId::from("GATE-1")];
        assert_eq!(gate1, SeverityCounts { medium: 1, high: 1, critical: 0 });

        let gate2 = heatmap[&GateId::from("GATE-2")];
        assert_eq!(gate2, SeverityCounts { medium: 1, high: 0, critical: 1 });
    }

    #[test]
    fn test_empty_roster() {
        let report = OverstayReport::build(&[], now());
        assert!(report.is_empty());
        assert!(report.heatmap().is_empty());
        assert_eq!(report.severity_counts().total(), 0);
    }
}
