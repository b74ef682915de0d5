use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while reading, guarding or mutating the profile state.
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("profile '{0}' does not exist")]
    NotFound(String),

    #[error("profile '{0}' already exists")]
    AlreadyExists(String),

    /// The active profile cannot be destroyed; switch to another one first.
    #[error("cannot destroy active profile '{0}' (run 'profile set' to switch first)")]
    ActiveProfile(String),

    #[error("invalid profile name '{name}': {reason}")]
    InvalidProfileName { name: String, reason: &'static str },

    #[error("invalid format of repository: {0}")]
    InvalidRepository(String),

    /// Another mutating invocation holds the transaction marker.
    #[error("another transaction is in progress{detail} (lock: {})", path.display())]
    AlreadyLocked { path: PathBuf, detail: String },

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },
}

impl ProfileError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProfileError>;
