use std::path::{Path, PathBuf};

use plugdeck_core::{ProfileError, Result};

/// Paths under the plugdeck home directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateLayout {
    home: PathBuf,
}

impl StateLayout {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn state_path(&self) -> PathBuf {
        self.home.join("lock.json")
    }

    pub fn transaction_lock_path(&self) -> PathBuf {
        self.home.join("trx.lock")
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }
}

pub fn default_home() -> Result<PathBuf> {
    let missing = |name: &str| {
        ProfileError::io(
            format!("{name} is not set; cannot resolve plugdeck home"),
            std::io::Error::from(std::io::ErrorKind::NotFound),
        )
    };

    if cfg!(windows) {
        let app_data = std::env::var("LOCALAPPDATA").map_err(|_| missing("LOCALAPPDATA"))?;
        return Ok(PathBuf::from(app_data).join("Plugdeck"));
    }

    let home = std::env::var("HOME").map_err(|_| missing("HOME"))?;
    Ok(PathBuf::from(home).join(".plugdeck"))
}
