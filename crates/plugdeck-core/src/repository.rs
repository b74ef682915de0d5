use crate::{ProfileError, Result};

const DEFAULT_HOST: &str = "github.com";

/// Turns a user-supplied repository reference into the canonical `host/user/name` form.
pub trait RepositoryIdentifier {
    fn normalize(&self, raw: &str) -> Result<String>;
}

/// The stock normalizer: bare `user/name` references resolve to GitHub.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepositoryNormalizer;

impl RepositoryIdentifier for RepositoryNormalizer {
    fn normalize(&self, raw: &str) -> Result<String> {
        normalize_repository(raw)
    }
}

pub fn normalize_repository(raw: &str) -> Result<String> {
    let invalid = || ProfileError::InvalidRepository(raw.to_string());

    let slashed = raw.trim().replace('\\', "/");
    let trimmed = slashed.trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

    let (is_url, rest) = match trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
    {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let segments = rest.split('/').collect::<Vec<_>>();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(invalid());
    }

    match (is_url, segments.as_slice()) {
        (false, [user, name]) => Ok(format!("{DEFAULT_HOST}/{user}/{name}")),
        (false, [host, user, name]) => Ok(format!("{host}/{user}/{name}")),
        (true, [.., host, user, name]) => Ok(format!("{host}/{user}/{name}")),
        _ => Err(invalid()),
    }
}

/// Normalizes a whole batch up front; the first invalid entry fails the batch.
pub fn normalize_repositories(
    identifier: &dyn RepositoryIdentifier,
    raw: &[String],
) -> Result<Vec<String>> {
    raw.iter().map(|entry| identifier.normalize(entry)).collect()
}
