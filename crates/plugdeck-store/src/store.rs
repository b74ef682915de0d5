use std::fs;
use std::io;
use std::path::PathBuf;

use plugdeck_core::{ProfileError, Result, StateDocument};

use crate::write_atomic;

/// Persistence for the state document. `write` must be atomic.
pub trait StateStore {
    fn read(&self) -> Result<StateDocument>;
    fn write(&self, document: &StateDocument) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StateStore for JsonStateStore {
    fn read(&self) -> Result<StateDocument> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "lock.json missing; using initial state");
                return Ok(StateDocument::default());
            }
            Err(err) => {
                return Err(ProfileError::io(
                    format!("failed to read lock.json: {}", self.path.display()),
                    err,
                ));
            }
        };

        let document = StateDocument::from_json_str(&content, &self.path)?;
        tracing::debug!(
            path = %self.path.display(),
            trx_id = document.trx_id,
            profiles = document.profiles.len(),
            "read lock.json"
        );
        Ok(document)
    }

    fn write(&self, document: &StateDocument) -> Result<()> {
        let content = document.to_json_string()?;
        write_atomic(&self.path, content.as_bytes()).map_err(|err| {
            ProfileError::io(
                format!("failed to write lock.json: {}", self.path.display()),
                err,
            )
        })?;
        tracing::debug!(
            path = %self.path.display(),
            trx_id = document.trx_id,
            "wrote lock.json"
        );
        Ok(())
    }
}
