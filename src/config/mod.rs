//! Configuration management for scurry.
//!
//! Settings are merged from three layers, lowest priority first: the
//! embedded `default-config.toml`, an optional TOML file, and
//! `SCURRY_`-prefixed environment variables (nested keys separated by
//! double underscores, e.g. `SCURRY_POOL__CAPACITY`).

use std::time::Duration;

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};

use crate::pool::FeedbackConfig;

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

/// Main configuration structure for scurry.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScurryConfig {
    /// Worker pool sizing
    #[serde(default)]
    pub pool: PoolSettings,

    /// Feedback controller tuning
    #[serde(default)]
    pub feedback: FeedbackSettings,

    /// HTTP probe behavior
    #[serde(default)]
    pub probe: ProbeSettings,

    /// Result persistence
    #[serde(default)]
    pub report: ReportSettings,
}

impl ScurryConfig {
    /// Load configuration: embedded defaults, then an optional file, then
    /// environment variables.
    pub fn load(custom_config: Option<&str>) -> Result<Self> {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));

        if let Some(path) = custom_config {
            figment = figment.merge(Toml::file(path));
        } else {
            figment = figment.merge(Toml::file("scurry.toml"));
        }

        // Environment variables always have highest priority
        figment = figment.merge(Env::prefixed("SCURRY_").split("__"));

        figment.extract().context("invalid configuration")
    }
}

/// Worker pool sizing and controller switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSettings {
    /// Initial worker count (0 = auto-detect from CPU count)
    pub initial_workers: usize,

    /// Capacity bound: queue length and the hard worker-count ceiling
    pub capacity: usize,

    /// Enable the throughput feedback controller
    pub feedback: bool,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            initial_workers: 0,
            capacity: 4096,
            feedback: false,
        }
    }
}

impl PoolSettings {
    /// Resolve the auto-detect sentinel to a concrete worker count.
    pub fn effective_initial_workers(&self) -> usize {
        if self.initial_workers == 0 {
            num_cpus::get().min(self.capacity)
        } else {
            self.initial_workers
        }
    }
}

/// Feedback controller gains and tick periods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackSettings {
    /// Control window length in seconds
    pub window_secs: u64,

    /// Telemetry tick period in seconds
    pub telemetry_secs: u64,

    /// Workers added per unit of throughput gained
    pub growth_gain: f64,

    /// Fraction of previous throughput pulled back on a falling window
    pub shrink_fraction: f64,
}

impl Default for FeedbackSettings {
    fn default() -> Self {
        Self {
            window_secs: 10,
            telemetry_secs: 1,
            growth_gain: 2.0,
            shrink_fraction: 0.5,
        }
    }
}

impl FeedbackSettings {
    pub fn to_config(&self) -> FeedbackConfig {
        FeedbackConfig {
            window: Duration::from_secs(self.window_secs.max(1)),
            telemetry_interval: Duration::from_secs(self.telemetry_secs.max(1)),
            growth_gain: self.growth_gain,
            shrink_fraction: self.shrink_fraction,
        }
    }
}

/// HTTP probe behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeSettings {
    /// TCP connect timeout in seconds
    pub connect_timeout_secs: u64,

    /// Whole-request timeout in seconds
    pub request_timeout_secs: u64,

    /// User-Agent header sent with every probe
    pub user_agent: String,

    /// Path appended to `http://<host>`
    pub path: String,

    /// Query string marker appended to every probe URL
    pub query_marker: String,

    /// Body signature regex with exactly one capture group
    pub signature: String,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 20,
            request_timeout_secs: 25,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_12_1) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/54.0.2840.98 Safari/537.36"
                .to_string(),
            path: "/".to_string(),
            query_marker: "scurry=0.1.0".to_string(),
            signature: r"vul_function\(\) in <b>(.+?)</b>".to_string(),
        }
    }
}

/// Result persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Append-only result file path
    pub output: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            output: "result.txt".to_string(),
        }
    }
}
