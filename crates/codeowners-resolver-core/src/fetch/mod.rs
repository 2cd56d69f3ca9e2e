//! Retrieval of the CODEOWNERS file from a repository.
//!
//! GitHub accepts a CODEOWNERS file in three places. [`fetch_ownership_file`]
//! tries each of them in [`CANDIDATE_PATHS`] order through an
//! [`OwnershipFileSource`] and returns the first one that can be read.

mod local;

pub use local::LocalRepository;

use async_trait::async_trait;
use log::{debug, warn};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Candidate locations of the CODEOWNERS file, in lookup order.
pub const CANDIDATE_PATHS: [&str; 3] = ["CODEOWNERS", "docs/CODEOWNERS", ".github/CODEOWNERS"];

/// Errors that can occur when reading a single file from a source.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// The file does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Insufficient authorization to read the file.
    #[error("unauthorized to read {path}: {message}")]
    Unauthorized {
        /// The path that was requested.
        path: String,
        /// The message from the source.
        message: String,
    },

    /// The file exists but could not be read.
    #[error("failed to read {path}: {message}")]
    Read {
        /// The path that was requested.
        path: String,
        /// What went wrong.
        message: String,
    },
}

/// All candidate locations failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to fetch CODEOWNERS from {location} (tried {}): {last}", .attempts.join(", "))]
pub struct FetchError {
    /// Where the file was looked for.
    pub location: String,
    /// The paths that were tried, in order.
    pub attempts: Vec<String>,
    /// The error from the last candidate.
    #[source]
    pub last: SourceError,
}

/// A place CODEOWNERS files can be read from.
///
/// A source is bound to one repository; `read` takes paths relative to the
/// repository root.
#[async_trait]
pub trait OwnershipFileSource: Send + Sync {
    /// Describes the repository for log and error messages.
    fn describe(&self) -> String;

    /// Reads the file at `path` as UTF-8 text.
    async fn read(&self, path: &str) -> Result<String, SourceError>;
}

/// Fetches the CODEOWNERS file from the first candidate location that works.
///
/// Each failed candidate is logged as a warning; if none can be read the
/// error of the last one is returned.
pub async fn fetch_ownership_file<S>(source: &S) -> Result<String, FetchError>
where
    S: OwnershipFileSource + ?Sized,
{
    let mut attempts = Vec::with_capacity(CANDIDATE_PATHS.len());
    let mut last = None;

    for path in CANDIDATE_PATHS {
        attempts.push(path.to_string());
        match source.read(path).await {
            Ok(content) => {
                debug!("Read {} from {}", path, source.describe());
                return Ok(content);
            }
            Err(e) => {
                warn!("Error fetching {} from {}: {}", path, source.describe(), e);
                last = Some(e);
            }
        }
    }

    Err(FetchError {
        location: source.describe(),
        attempts,
        last: last.unwrap_or_else(|| SourceError::NotFound("CODEOWNERS".to_string())),
    })
}

/// Coordinates of a hosted repository (`owner/repo`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryRef {
    /// The owning user or organization.
    pub owner: String,
    /// The repository name.
    pub repo: String,
}

impl RepositoryRef {
    /// Creates a repository reference.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// A string that is not of the form `owner/repo`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid repository {0:?}: expected owner/repo")]
pub struct ParseRepositoryError(pub String);

impl FromStr for RepositoryRef {
    type Err = ParseRepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseRepositoryError(s.to_string());
        let (owner, repo) = s.trim().split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return Err(invalid());
        }
        Ok(Self::new(owner, repo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// An in-memory source recording the paths it is asked for.
    struct MockSource {
        files: HashMap<&'static str, Result<&'static str, SourceError>>,
        requested: Mutex<Vec<String>>,
    }

    impl MockSource {
        fn new(files: Vec<(&'static str, Result<&'static str, SourceError>)>) -> Self {
            Self {
                files: files.into_iter().collect(),
                requested: Mutex::new(Vec::new()),
            }
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OwnershipFileSource for MockSource {
        fn describe(&self) -> String {
            "mock".to_string()
        }

        async fn read(&self, path: &str) -> Result<String, SourceError> {
            self.requested.lock().unwrap().push(path.to_string());
            match self.files.get(path) {
                Some(Ok(content)) => Ok(content.to_string()),
                Some(Err(e)) => Err(e.clone()),
                None => Err(SourceError::NotFound(path.to_string())),
            }
        }
    }

    #[tokio::test]
    async fn root_file_wins() {
        let source = MockSource::new(vec![
            ("CODEOWNERS", Ok("* @root")),
            (".github/CODEOWNERS", Ok("* @github")),
        ]);
        assert_eq!(fetch_ownership_file(&source).await.unwrap(), "* @root");
        assert_eq!(source.requested(), vec!["CODEOWNERS"]);
    }

    #[tokio::test]
    async fn candidates_are_tried_in_order() {
        let source = MockSource::new(vec![(".github/CODEOWNERS", Ok("* @github"))]);
        assert_eq!(fetch_ownership_file(&source).await.unwrap(), "* @github");
        assert_eq!(source.requested(), CANDIDATE_PATHS.to_vec());
    }

    #[tokio::test]
    async fn docs_before_github() {
        let source = MockSource::new(vec![
            ("docs/CODEOWNERS", Ok("* @docs")),
            (".github/CODEOWNERS", Ok("* @github")),
        ]);
        assert_eq!(fetch_ownership_file(&source).await.unwrap(), "* @docs");
    }

    #[tokio::test]
    async fn total_failure_carries_last_error() {
        let denied = SourceError::Unauthorized {
            path: ".github/CODEOWNERS".to_string(),
            message: "bad credentials".to_string(),
        };
        let source = MockSource::new(vec![(".github/CODEOWNERS", Err(denied.clone()))]);

        let err = fetch_ownership_file(&source).await.unwrap_err();
        assert_eq!(err.last, denied);
        assert_eq!(err.attempts, CANDIDATE_PATHS.to_vec());
        assert_eq!(err.location, "mock");
        assert!(err.to_string().contains("bad credentials"));
    }

    #[tokio::test]
    async fn works_through_trait_object() {
        let source: Box<dyn OwnershipFileSource> =
            Box::new(MockSource::new(vec![("CODEOWNERS", Ok("* @dyn"))]));
        assert_eq!(fetch_ownership_file(source.as_ref()).await.unwrap(), "* @dyn");
    }

    #[test]
    fn parse_repository_ref() {
        let repo: RepositoryRef = "octo-org/hello-world".parse().unwrap();
        assert_eq!(repo, RepositoryRef::new("octo-org", "hello-world"));
        assert_eq!(repo.to_string(), "octo-org/hello-world");
    }

    #[test]
    fn reject_invalid_repository_refs() {
        for input in ["", "noslash", "/repo", "owner/", "a/b/c"] {
            assert_eq!(
                input.parse::<RepositoryRef>(),
                Err(ParseRepositoryError(input.to_string())),
                "input {:?}",
                input
            );
        }
    }
}
