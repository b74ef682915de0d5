use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Profile, ProfileError, Result};

pub const STATE_FILE_VERSION: u32 = 1;
pub const DEFAULT_PROFILE_NAME: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryKind {
    Git,
    Static,
}

/// An installed repository. Written by the fetcher; profiles only carry it through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    #[serde(rename = "type")]
    pub kind: RepositoryKind,
    #[serde(default)]
    pub trx_id: u64,
    pub path: String,
    #[serde(default)]
    pub version: String,
}

/// The persisted `lock.json` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDocument {
    pub version: u32,
    #[serde(default)]
    pub trx_id: u64,
    #[serde(default, rename = "repos")]
    pub repositories: Vec<RepositoryRecord>,
    #[serde(default)]
    pub profiles: Vec<Profile>,
    pub active_profile: String,
}

impl Default for StateDocument {
    fn default() -> Self {
        Self {
            version: STATE_FILE_VERSION,
            trx_id: 0,
            repositories: Vec::new(),
            profiles: vec![Profile::new(DEFAULT_PROFILE_NAME)],
            active_profile: DEFAULT_PROFILE_NAME.to_string(),
        }
    }
}

impl StateDocument {
    /// Parses and validates a document read from `source`.
    pub fn from_json_str(input: &str, source: &Path) -> Result<Self> {
        let document: Self = serde_json::from_str(input)
            .map_err(|err| ProfileError::parse(source, err.to_string()))?;
        if document.version != STATE_FILE_VERSION {
            return Err(ProfileError::parse(
                source,
                format!(
                    "unsupported lock.json version {} (expected {})",
                    document.version, STATE_FILE_VERSION
                ),
            ));
        }
        document
            .validate()
            .map_err(|reason| ProfileError::parse(source, reason))?;
        Ok(document)
    }

    pub fn to_json_string(&self) -> Result<String> {
        let mut content = serde_json::to_string_pretty(self).map_err(|err| {
            ProfileError::io("failed serializing lock.json", std::io::Error::other(err))
        })?;
        content.push('\n');
        Ok(content)
    }

    pub fn find_profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|profile| profile.name == name)
    }

    pub fn find_profile_mut(&mut self, name: &str) -> Option<&mut Profile> {
        self.profiles.iter_mut().find(|profile| profile.name == name)
    }

    pub fn profile_position(&self, name: &str) -> Option<usize> {
        self.profiles.iter().position(|profile| profile.name == name)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        let mut seen = HashSet::new();
        for profile in &self.profiles {
            if profile.name.is_empty() {
                return Err("profile name must not be empty".to_string());
            }
            if !seen.insert(profile.name.as_str()) {
                return Err(format!("duplicate profile '{}'", profile.name));
            }

            let mut seen_repos = HashSet::new();
            for repos_path in &profile.repos_path {
                if !seen_repos.insert(repos_path.as_str()) {
                    return Err(format!(
                        "duplicate repository '{}' in profile '{}'",
                        repos_path, profile.name
                    ));
                }
            }
        }

        if self.find_profile(&self.active_profile).is_none() {
            return Err(format!(
                "active profile '{}' does not exist",
                self.active_profile
            ));
        }
        Ok(())
    }
}
