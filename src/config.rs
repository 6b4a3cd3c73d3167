use crate::scheduler::DEFAULT_INTERVAL;
use crate::ui::{AbsentPolicy, DisplayKind};
use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Root of the TOML configuration file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub global: GlobalConfig,
}

impl Config {
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.global.validate()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    /// Sampling period in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default)]
    pub display: DisplayKind,
    #[serde(default)]
    pub absent: AbsentPolicy,
    /// Default filter directive; RUST_LOG wins when set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl GlobalConfig {
    pub fn validate(&self) -> Result<()> {
        if self.interval_ms < 200 {
            anyhow::bail!("Sampling interval must be at least 200 ms");
        }
        if let Err(e) = EnvFilter::try_new(&self.log_level) {
            anyhow::bail!("Invalid log_level {:?}: {}", self.log_level, e);
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            display: DisplayKind::default(),
            absent: AbsentPolicy::default(),
            log_level: default_log_level(),
        }
    }
}

fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL.as_millis() as u64
}

fn default_log_level() -> String {
    "info".to_string()
}
