mod error;
mod profile;
mod registry;
mod repository;
mod state;

pub use error::{ProfileError, Result};
pub use profile::{validate_profile_name, Profile, ProfileView};
pub use registry::{BatchReport, Change, ProfileRegistry, SetOutcome};
pub use repository::{
    normalize_repositories, normalize_repository, RepositoryIdentifier, RepositoryNormalizer,
};
pub use state::{
    RepositoryKind, RepositoryRecord, StateDocument, DEFAULT_PROFILE_NAME, STATE_FILE_VERSION,
};
