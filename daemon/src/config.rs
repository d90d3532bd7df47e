use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

fn default_scan_interval_secs() -> u64 {
    5
}

fn default_reconnect_retry_secs() -> u64 {
    5
}

fn default_remap_enabled() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

/// GPIO push-button wiring. Board Component Numbering (BCM) pin numbers;
/// `None` leaves that button unbound. Out of the core's scope (see
/// [`crate::gpio`]) but still loaded here so the daemon has one
/// configuration surface.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GpioConfig {
    pub toggle_remap_pin: Option<u8>,
    pub email_macro_pin: Option<u8>,
    pub shutdown_pin: Option<u8>,
    #[serde(default)]
    pub email_macro_text: String,
}

/// Everything the daemon needs that isn't part of the core translation
/// engine: endpoint paths, device-match patterns, timing, and the ambient
/// boundary glue (logging level, GPIO wiring).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub keyboard_endpoints: Vec<PathBuf>,
    pub mouse_endpoints: Vec<PathBuf>,
    pub keyboard_pattern: String,
    pub mouse_pattern: String,

    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
    #[serde(default = "default_reconnect_retry_secs")]
    pub reconnect_retry_secs: u64,
    #[serde(default = "default_remap_enabled")]
    pub remap_enabled: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub gpio: GpioConfig,
}

impl Config {
    /// Load and parse the TOML configuration file. A missing file or a
    /// parse error is fatal at startup.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Config = toml::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }
}
