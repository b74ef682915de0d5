use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_STALE_AFTER_SECS: u64 = 600;

/// Optional `<home>/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct AppConfig {
    #[serde(default)]
    pub(crate) guard: GuardConfig,
    #[serde(default)]
    pub(crate) output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct GuardConfig {
    /// Age after which a transaction lock is treated as abandoned. `0` disables recovery.
    #[serde(default = "default_stale_after_secs")]
    pub(crate) stale_after_secs: u64,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            stale_after_secs: default_stale_after_secs(),
        }
    }
}

impl GuardConfig {
    pub(crate) fn stale_after(&self) -> Option<Duration> {
        (self.stale_after_secs > 0).then(|| Duration::from_secs(self.stale_after_secs))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct OutputConfig {
    #[serde(default)]
    pub(crate) color: ColorChoice,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl AppConfig {
    pub(crate) fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse plugdeck config")
    }

    /// Missing files load as the default configuration.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read config: {}", path.display()));
            }
        };
        Self::from_toml_str(&content)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }
}

fn default_stale_after_secs() -> u64 {
    DEFAULT_STALE_AFTER_SECS
}
