//! Roster monitor - periodic overstay re-evaluation
//!
//! Re-reads the roster on a fixed interval, rebuilds the overstay report and
//! logs every visitor whose severity rose since the previous pass. Visitors
//! who drop out of the report (checked out, window extended) are forgotten,
//! so a later overstay is reported again from scratch.

use crate::domain::types::{GateId, Severity, VisitorId};
use crate::infra::config::Config;
use crate::io::roster::read_roster;
use crate::services::overstay_report::OverstayReport;
use chrono::Utc;
use rustc_hash::FxHashMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{error, info, warn};

/// A visitor whose severity went up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Escalation {
    pub visitor_id: VisitorId,
    pub name: String,
    pub gate: GateId,
    pub from: Severity,
    pub to: Severity,
    pub overstay_minutes: u64,
}

pub struct RosterMonitor {
    roster_file: PathBuf,
    poll_interval: Duration,
    last_seen: FxHashMap<VisitorId, Severity>,
}

impl RosterMonitor {
    pub fn new(config: &Config) -> Self {
        Self::with_roster(config.roster_file(), Duration::from_secs(config.monitor_interval_secs()))
    }

    pub fn with_roster(roster_file: impl Into<PathBuf>, poll_interval: Duration) -> Self {
        Self {
            roster_file: roster_file.into(),
            // tokio interval panics on zero
            poll_interval: poll_interval.max(Duration::from_secs(1)),
            last_seen: FxHashMap::default(),
        }
    }

    /// Compare a fresh report with the previous pass
    pub fn observe(&mut self, report: &OverstayReport) -> Vec<Escalation> {
        let mut escalations = Vec::new();
        let mut current = FxHashMap::default();

        for entry in report.entries() {
            let previous = self.last_seen.get(&entry.visitor_id).copied().unwrap_or(Severity::None);
            if entry.severity() > previous {
                escalations.push(Escalation {
                    visitor_id: entry.visitor_id.clone(),
                    name: entry.name.clone(),
                    gate: entry.gate.clone(),
                    from: previous,
                    to: entry.severity(),
                    overstay_minutes: entry.record.overstay_minutes,
                });
            }
            // Never downgrade within one stay
            current.insert(entry.visitor_id.clone(), entry.severity().max(previous));
        }

        self.last_seen = current;
        escalations
    }

    /// Number of visitors currently tracked as overstaying
    pub fn tracked(&self) -> usize {
        self.last_seen.len()
    }

    /// One pass: read, classify, log escalations
    pub fn poll_once(&mut self) -> anyhow::Result<Vec<Escalation>> {
        let roster = read_roster(&self.roster_file)?;
        let report = OverstayReport::build(&roster, Utc::now());
        let escalations = self.observe(&report);

        for esc in &escalations {
            warn!(
                visitor_id = %esc.visitor_id,
                name = %esc.name,
                gate = %esc.gate,
                from = %esc.from,
                to = %esc.to,
                overstay_minutes = esc.overstay_minutes,
                "overstay_escalated"
            );
        }

        let counts = report.severity_counts();
        info!(
            visitors = roster.len(),
            overstaying = report.len(),
            critical = counts.critical,
            high = counts.high,
            medium = counts.medium,
            "roster_evaluated"
        );

        Ok(escalations)
    }

    /// Start the polling loop
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            roster_file = %self.roster_file.display(),
            poll_interval_secs = %self.poll_interval.as_secs(),
            "roster_monitor_started"
        );

        let mut poll_timer = interval(self.poll_interval);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("roster_monitor_shutdown");
                        return;
                    }
                }
                _ = poll_timer.tick() => {
                    if let Err(e) = self.poll_once() {
                        error!(error = %e, "roster_poll_failed");
                    }
                }
            }
        }
    }
}
