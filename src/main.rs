//! gatepass - visitor gate pass and overstay tool
//!
//! Issues and verifies sealed QR gate passes, classifies overstaying
//! visitors and exports the overstay report for the security desk.
//!
//! Module structure:
//! - `domain/` - Core types (QrPayload, Severity, VisitorEntry)
//! - `io/` - Roster ingest and CSV export
//! - `services/` - Codec, classifier, scanner, report, monitor
//! - `infra/` - Config and shared secret

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use gatepass::infra::Config;
use gatepass::io::{read_roster, write_csv};
use gatepass::services::{
    classify, codec_from_config, GateScanner, OverstayReport, RosterMonitor, ScanPolicy,
    ScanVerdict,
};
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// gatepass - visitor gate passes and overstay tracking
#[derive(Parser, Debug)]
#[command(name = "gatepass", version, about)]
struct Args {
    /// Path to TOML configuration file (falls back to CONFIG_FILE, then config/dev.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Issue a gate pass token for a visitor
    Encode {
        #[arg(long)]
        visitor: String,
        #[arg(long)]
        gate: String,
        /// Emit an unsealed JSON token (INSECURE, legacy printers only)
        #[arg(long)]
        insecure_plaintext: bool,
    },
    /// Decode a token and print its payload
    Decode {
        token: String,
        #[arg(long)]
        insecure_plaintext: bool,
    },
    /// Decode a token and apply the site's scan policy
    Scan {
        token: String,
        #[arg(long)]
        insecure_plaintext: bool,
    },
    /// Classify one visitor's overstay
    Classify {
        /// End of the authorized window (RFC 3339)
        #[arg(long, value_parser = parse_timestamp)]
        allowed_until: DateTime<Utc>,
        /// Evaluation time (RFC 3339), defaults to now
        #[arg(long, value_parser = parse_timestamp)]
        now: Option<DateTime<Utc>>,
    },
    /// Build the overstay report from a roster and export it as CSV
    Report {
        /// Roster JSONL (defaults to monitor.roster_file)
        #[arg(long)]
        roster: Option<String>,
        /// CSV output (defaults to overstay.export_file)
        #[arg(long)]
        out: Option<String>,
    },
    /// Re-evaluate the roster periodically and log escalations
    Monitor {
        #[arg(long)]
        roster: Option<String>,
        #[arg(long)]
        interval_secs: Option<u64>,
    },
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| format!("expected RFC 3339 timestamp: {e}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with configurable level via RUST_LOG env var.
    // Logs go to stderr so tokens and reports on stdout stay pipeable.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // Same argv clap saw, so --config/-c and CONFIG_FILE resolve identically
    let config = Config::load(&std::env::args().collect::<Vec<_>>());

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        config_arg = ?args.config,
        config_file = %config.config_file(),
        site_id = %config.site_id(),
        qr_max_age_secs = %config.qr_max_age_secs(),
        expected_gate = ?config.qr_expected_gate(),
        "config_loaded"
    );

    match args.command {
        Command::Encode { visitor, gate, insecure_plaintext } => {
            let codec = codec_from_config(&config, insecure_plaintext)?;
            let token = codec.encode(&visitor, &gate)?;
            info!(visitor_id = %visitor, gate_id = %gate, "gate_pass_issued");
            println!("{token}");
        }
        Command::Decode { token, insecure_plaintext } => {
            let codec = codec_from_config(&config, insecure_plaintext)?;
            match codec.decode(&token) {
                Ok(payload) => println!("{}", serde_json::to_string_pretty(&payload)?),
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(1);
                }
            }
        }
        Command::Scan { token, insecure_plaintext } => {
            let codec = codec_from_config(&config, insecure_plaintext)?;
            let scanner = GateScanner::new(codec, ScanPolicy::from_config(&config));
            match scanner.scan(&token) {
                ScanVerdict::Accepted(payload) => {
                    println!("accepted {} at {}", payload.visitor_id, payload.gate_id);
                }
                ScanVerdict::Rejected(reason) => {
                    eprintln!("{}", reason.user_message());
                    std::process::exit(1);
                }
            }
        }
        Command::Classify { allowed_until, now } => {
            let record = classify(allowed_until, now.unwrap_or_else(Utc::now));
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Report { roster, out } => {
            let roster_path = roster.unwrap_or_else(|| config.roster_file().to_string());
            let out_path = out.unwrap_or_else(|| config.export_file().to_string());

            let entries = read_roster(&roster_path)?;
            let report = OverstayReport::build(&entries, Utc::now());

            for (gate, counts) in report.heatmap() {
                info!(
                    gate = %gate,
                    critical = counts.critical,
                    high = counts.high,
                    medium = counts.medium,
                    "overstay_heatmap"
                );
            }

            let rows = write_csv(&out_path, &report)
                .with_context(|| format!("Export for site {} failed", config.site_id()))?;
            println!("{rows} overstaying visitors written to {out_path}");
        }
        Command::Monitor { roster, interval_secs } => {
            let roster_path = roster.unwrap_or_else(|| config.roster_file().to_string());
            let interval =
                Duration::from_secs(interval_secs.unwrap_or(config.monitor_interval_secs()));
            let monitor = RosterMonitor::with_roster(roster_path, interval);

            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            tokio::spawn(async move {
                tokio::signal::ctrl_c().await.ok();
                info!("shutdown_signal_received");
                let _ = shutdown_tx.send(true);
            });

            monitor.run(shutdown_rx).await;
            info!("gatepass monitor shutdown complete");
        }
    }

    Ok(())
}
