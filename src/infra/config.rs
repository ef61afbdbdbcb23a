//! Configuration loading from TOML files
//!
//! Config file is selected via:
//! 1. --config <path> (or -c <path>) command line argument
//! 2. CONFIG_FILE environment variable
//! 3. Default: config/dev.toml
//!
//! The QR shared secret itself never lives in the file. The file only names
//! the environment variable it is read from.

use crate::domain::types::GateId;
use crate::infra::secret::{SharedSecret, DEFAULT_SECRET_ENV};
use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Unique site identifier (e.g., "hq", "plant-2")
    #[serde(default = "default_site_id")]
    pub id: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self { id: default_site_id() }
    }
}

fn default_site_id() -> String {
    "gatepass".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct QrConfig {
    /// Environment variable holding the pre-shared secret
    #[serde(default = "default_secret_env")]
    pub secret_env: String,
    /// Scanner freshness window in seconds (0 disables)
    #[serde(default)]
    pub max_age_secs: u64,
    /// Gate this scanner is installed at; tokens for other gates are rejected
    #[serde(default)]
    pub expected_gate: Option<String>,
}

impl Default for QrConfig {
    fn default() -> Self {
        Self { secret_env: default_secret_env(), max_age_secs: 0, expected_gate: None }
    }
}

fn default_secret_env() -> String {
    DEFAULT_SECRET_ENV.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverstayConfig {
    /// CSV export path
    #[serde(default = "default_export_file")]
    pub export_file: String,
}

impl Default for OverstayConfig {
    fn default() -> Self {
        Self { export_file: default_export_file() }
    }
}

fn default_export_file() -> String {
    "overstay.csv".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Roster feed in JSONL format
    #[serde(default = "default_roster_file")]
    pub roster_file: String,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self { roster_file: default_roster_file(), interval_secs: default_interval_secs() }
    }
}

fn default_roster_file() -> String {
    "roster.jsonl".to_string()
}

fn default_interval_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub qr: QrConfig,
    #[serde(default)]
    pub overstay: OverstayConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    site_id: String,
    qr_secret_env: String,
    qr_max_age_secs: u64,
    qr_expected_gate: Option<GateId>,
    export_file: String,
    roster_file: String,
    monitor_interval_secs: u64,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), "default".to_string())
    }
}

impl Config {
    /// Determine config file path from args or environment
    pub fn resolve_config_path(args: &[String]) -> String {
        for (i, arg) in args.iter().enumerate() {
            if arg == "--config" || arg == "-c" {
                if let Some(path) = args.get(i + 1) {
                    return path.clone();
                }
            }
            if let Some(path) = arg.strip_prefix("--config=") {
                return path.to_string();
            }
        }

        if let Ok(path) = env::var("CONFIG_FILE") {
            return path;
        }

        "config/dev.toml".to_string()
    }

    fn from_toml(toml_config: TomlConfig, config_file: String) -> Self {
        let expected_gate = toml_config
            .qr
            .expected_gate
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .map(GateId);

        Self {
            site_id: toml_config.site.id,
            qr_secret_env: toml_config.qr.secret_env,
            qr_max_age_secs: toml_config.qr.max_age_secs,
            qr_expected_gate: expected_gate,
            export_file: toml_config.overstay.export_file,
            roster_file: toml_config.monitor.roster_file,
            monitor_interval_secs: toml_config.monitor.interval_secs,
            config_file,
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(Self::from_toml(toml_config, path.display().to_string()))
    }

    /// Load configuration - tries TOML file first, falls back to defaults
    pub fn load(args: &[String]) -> Self {
        Self::load_from_path(&Self::resolve_config_path(args))
    }

    /// Load from an explicit path, falling back to defaults
    pub fn load_from_path(path: &str) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "config_load_failed_using_defaults");
                Self::default()
            }
        }
    }

    /// Read the shared secret from the configured environment variable
    pub fn shared_secret(&self) -> anyhow::Result<SharedSecret> {
        SharedSecret::from_env(&self.qr_secret_env)
            .with_context(|| format!("Cannot load QR secret for site {}", self.site_id))
    }

    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    pub fn qr_secret_env(&self) -> &str {
        &self.qr_secret_env
    }

    pub fn qr_max_age_secs(&self) -> u64 {
        self.qr_max_age_secs
    }

    /// Freshness window, `None` when disabled
    pub fn qr_max_age(&self) -> Option<Duration> {
        (self.qr_max_age_secs > 0).then(|| Duration::from_secs(self.qr_max_age_secs))
    }

    pub fn qr_expected_gate(&self) -> Option<&GateId> {
        self.qr_expected_gate.as_ref()
    }

    pub fn export_file(&self) -> &str {
        &self.export_file
    }

    pub fn roster_file(&self) -> &str {
        &self.roster_file
    }

    pub fn monitor_interval_secs(&self) -> u64 {
        self.monitor_interval_secs
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Builder method for tests to point at a different secret variable
    #[cfg(test)]
    pub fn with_qr_secret_env(mut self, var: &str) -> Self {
        self.qr_secret_env = var.to_string();
        self
    }
}
