use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use plugdeck_core::{ProfileError, Result};

use crate::remove_file_if_exists;

pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(600);

/// Cross-process exclusivity for mutating commands.
///
/// `create` is a non-blocking test-and-set: it fails with
/// [`ProfileError::AlreadyLocked`] while another holder owns the marker.
/// `remove` is idempotent and never fails.
pub trait TransactionGuard {
    fn create(&self) -> Result<()>;
    fn remove(&self);
}

/// Scoped ownership of a [`TransactionGuard`]; dropping it releases the guard.
#[must_use = "the transaction guard is released as soon as the lease is dropped"]
pub struct GuardLease<'a> {
    guard: &'a dyn TransactionGuard,
}

impl fmt::Debug for GuardLease<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardLease").finish_non_exhaustive()
    }
}

impl Drop for GuardLease<'_> {
    fn drop(&mut self) {
        self.guard.remove();
        tracing::debug!("released transaction guard");
    }
}

pub fn acquire(guard: &dyn TransactionGuard) -> Result<GuardLease<'_>> {
    guard.create()?;
    tracing::debug!("claimed transaction guard");
    Ok(GuardLease { guard })
}

/// Who wrote the marker and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerHolder {
    pub pid: u32,
    pub started_at_unix: u64,
}

impl MarkerHolder {
    pub fn current() -> Self {
        Self {
            pid: std::process::id(),
            started_at_unix: current_unix_timestamp(),
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let mut pid = None;
        let mut started_at_unix = None;
        for line in raw.lines().map(str::trim).filter(|line| !line.is_empty()) {
            let (key, value) = line.split_once('=')?;
            match key.trim() {
                "pid" => pid = value.trim().parse().ok(),
                "started_at_unix" => started_at_unix = value.trim().parse().ok(),
                _ => {}
            }
        }
        Some(Self {
            pid: pid?,
            started_at_unix: started_at_unix?,
        })
    }

    fn to_marker_string(self) -> String {
        format!("pid={}\nstarted_at_unix={}\n", self.pid, self.started_at_unix)
    }
}

impl fmt::Display for MarkerHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pid={}, started_at_unix={}",
            self.pid, self.started_at_unix
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardStatus {
    Free,
    Held(MarkerHolder),
    Stale(MarkerHolder),
    Unreadable,
}

/// A guard backed by an exclusively-created marker file.
#[derive(Debug, Clone)]
pub struct MarkerFileGuard {
    path: PathBuf,
    stale_after: Option<Duration>,
}

impl MarkerFileGuard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            stale_after: Some(DEFAULT_STALE_AFTER),
        }
    }

    /// `None` disables stale-marker recovery entirely.
    pub fn with_stale_after(mut self, stale_after: Option<Duration>) -> Self {
        self.stale_after = stale_after;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn inspect(&self) -> Result<GuardStatus> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(GuardStatus::Free),
            Err(err) => {
                return Err(ProfileError::io(
                    format!("failed to read transaction lock: {}", self.path.display()),
                    err,
                ));
            }
        };

        let Some(holder) = MarkerHolder::parse(&raw) else {
            return Ok(GuardStatus::Unreadable);
        };
        if self.is_stale(holder, current_unix_timestamp()) {
            Ok(GuardStatus::Stale(holder))
        } else {
            Ok(GuardStatus::Held(holder))
        }
    }

    fn is_stale(&self, holder: MarkerHolder, now_unix: u64) -> bool {
        match self.stale_after {
            Some(threshold) => now_unix.saturating_sub(holder.started_at_unix) > threshold.as_secs(),
            None => false,
        }
    }

    fn try_claim(&self) -> Result<bool> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                ProfileError::io(format!("failed to create {}", parent.display()), err)
            })?;
        }

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
            Err(err) => {
                return Err(ProfileError::io(
                    format!("failed to claim transaction lock: {}", self.path.display()),
                    err,
                ));
            }
        };

        let written = file
            .write_all(MarkerHolder::current().to_marker_string().as_bytes())
            .and_then(|()| file.flush());
        if let Err(err) = written {
            drop(file);
            let _ = remove_file_if_exists(&self.path);
            return Err(ProfileError::io(
                format!("failed to write transaction lock: {}", self.path.display()),
                err,
            ));
        }
        Ok(true)
    }

    fn reclaim_stale(&self, holder: MarkerHolder) -> Result<bool> {
        // Only drop the marker if it still belongs to the stale holder we saw.
        let current = fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| MarkerHolder::parse(&raw));
        if current != Some(holder) {
            return Ok(false);
        }

        tracing::warn!(
            path = %self.path.display(),
            pid = holder.pid,
            started_at_unix = holder.started_at_unix,
            "removing stale transaction lock"
        );
        remove_file_if_exists(&self.path).map_err(|err| {
            ProfileError::io(
                format!("failed to remove stale transaction lock: {}", self.path.display()),
                err,
            )
        })?;
        self.try_claim()
    }

    fn already_locked(&self, holder: Option<MarkerHolder>) -> ProfileError {
        ProfileError::AlreadyLocked {
            path: self.path.clone(),
            detail: holder
                .map(|holder| format!(" ({holder})"))
                .unwrap_or_default(),
        }
    }
}

impl TransactionGuard for MarkerFileGuard {
    fn create(&self) -> Result<()> {
        if self.try_claim()? {
            return Ok(());
        }

        match self.inspect()? {
            GuardStatus::Free | GuardStatus::Unreadable => Err(self.already_locked(None)),
            GuardStatus::Stale(holder) => {
                if self.reclaim_stale(holder)? {
                    return Ok(());
                }
                Err(self.already_locked(Some(holder)))
            }
            GuardStatus::Held(holder) => Err(self.already_locked(Some(holder))),
        }
    }

    fn remove(&self) {
        if let Err(err) = remove_file_if_exists(&self.path) {
            tracing::warn!(
                path = %self.path.display(),
                error = %err,
                "failed to remove transaction lock"
            );
        }
    }
}

pub fn current_unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Writes a marker for `holder` regardless of current state. Test seeding only.
#[cfg(test)]
pub(crate) fn seed_marker(path: &Path, holder: MarkerHolder) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, holder.to_marker_string())
}
