use serde::{Deserialize, Serialize};

use crate::{ProfileError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default = "default_load_init")]
    pub load_init: bool,
    #[serde(default)]
    pub repos_path: Vec<String>,
}

impl Profile {
    /// A freshly created profile: no repositories, loaded on startup.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            load_init: true,
            repos_path: Vec::new(),
        }
    }

    pub fn contains_repository(&self, repos_path: &str) -> bool {
        self.repos_path.iter().any(|existing| existing == repos_path)
    }

    pub fn view(&self) -> ProfileView<'_> {
        ProfileView {
            name: &self.name,
            load_init: self.load_init,
            repos_path: &self.repos_path,
        }
    }
}

/// Read-only projection used by `profile show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileView<'a> {
    pub name: &'a str,
    pub load_init: bool,
    pub repos_path: &'a [String],
}

impl ProfileView<'_> {
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.repos_path.len() + 3);
        lines.push(format!("name: {}", self.name));
        lines.push(format!("load_init: {}", self.load_init));
        lines.push("repos_path:".to_string());
        lines.extend(self.repos_path.iter().map(|path| format!("  {path}")));
        lines
    }
}

pub fn validate_profile_name(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        Some("must not be empty")
    } else if name.starts_with('-') {
        Some("must not start with '-'")
    } else if name.chars().any(char::is_whitespace) {
        Some("must not contain whitespace")
    } else if name.contains('/') || name.contains('\\') {
        Some("must not contain path separators")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ProfileError::InvalidProfileName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

fn default_load_init() -> bool {
    true
}
