use crate::{validate_profile_name, Profile, ProfileError, ProfileView, Result, StateDocument};

/// Whether an operation modified the document and therefore needs a guarded write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change<T> {
    Unchanged(T),
    Changed(T),
}

impl<T> Change<T> {
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Unchanged(value) | Self::Changed(value) => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetOutcome {
    AlreadyActive,
    Switched { previous: String },
}

/// Per-item result of an `add`/`rm` batch. Skipped items are warnings, not errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub applied: Vec<String>,
    pub skipped: Vec<String>,
}

/// In-memory view over a [`StateDocument`] that applies profile operations.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    document: StateDocument,
}

impl ProfileRegistry {
    pub fn new(document: StateDocument) -> Self {
        Self { document }
    }

    #[cfg(test)]
    pub(crate) fn document(&self) -> &StateDocument {
        &self.document
    }

    pub fn into_document(self) -> StateDocument {
        self.document
    }

    pub fn active_profile(&self) -> &str {
        &self.document.active_profile
    }

    pub fn show(&self, name: &str) -> Result<ProfileView<'_>> {
        self.document
            .find_profile(name)
            .map(Profile::view)
            .ok_or_else(|| ProfileError::NotFound(name.to_string()))
    }

    pub fn set_active(&mut self, name: &str) -> Result<Change<SetOutcome>> {
        if self.document.find_profile(name).is_none() {
            return Err(ProfileError::NotFound(name.to_string()));
        }
        if self.document.active_profile == name {
            return Ok(Change::Unchanged(SetOutcome::AlreadyActive));
        }

        let previous = std::mem::replace(&mut self.document.active_profile, name.to_string());
        Ok(Change::Changed(SetOutcome::Switched { previous }))
    }

    pub fn create(&mut self, name: &str) -> Result<Change<()>> {
        validate_profile_name(name)?;
        if self.document.find_profile(name).is_some() {
            return Err(ProfileError::AlreadyExists(name.to_string()));
        }

        self.document.profiles.push(Profile::new(name));
        Ok(Change::Changed(()))
    }

    /// Removes the first profile named `name`. The active profile is never removed.
    pub fn destroy(&mut self, name: &str) -> Result<Change<Profile>> {
        let index = self
            .document
            .profile_position(name)
            .ok_or_else(|| ProfileError::NotFound(name.to_string()))?;
        if self.document.active_profile == name {
            return Err(ProfileError::ActiveProfile(name.to_string()));
        }

        Ok(Change::Changed(self.document.profiles.remove(index)))
    }

    /// Appends already-normalized repositories, skipping ones the profile already has.
    pub fn add_repositories(
        &mut self,
        name: &str,
        repos_paths: &[String],
    ) -> Result<Change<BatchReport>> {
        let profile = self.profile_mut(name)?;

        let mut report = BatchReport::default();
        for repos_path in repos_paths {
            if profile.contains_repository(repos_path) {
                report.skipped.push(repos_path.clone());
            } else {
                profile.repos_path.push(repos_path.clone());
                report.applied.push(repos_path.clone());
            }
        }
        Ok(Change::Changed(report))
    }

    /// Removes the first exact match of each repository; order of the rest is kept.
    pub fn remove_repositories(
        &mut self,
        name: &str,
        repos_paths: &[String],
    ) -> Result<Change<BatchReport>> {
        let profile = self.profile_mut(name)?;

        let mut report = BatchReport::default();
        for repos_path in repos_paths {
            match profile
                .repos_path
                .iter()
                .position(|existing| existing == repos_path)
            {
                Some(index) => {
                    profile.repos_path.remove(index);
                    report.applied.push(repos_path.clone());
                }
                None => report.skipped.push(repos_path.clone()),
            }
        }
        Ok(Change::Changed(report))
    }

    fn profile_mut(&mut self, name: &str) -> Result<&mut Profile> {
        self.document
            .find_profile_mut(name)
            .ok_or_else(|| ProfileError::NotFound(name.to_string()))
    }
}
