//! CODEOWNERS files from a local checkout.

use super::{OwnershipFileSource, SourceError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A repository checked out on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    /// Creates a source reading from the checkout at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the checkout's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl OwnershipFileSource for LocalRepository {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    async fn read(&self, path: &str) -> Result<String, SourceError> {
        let full_path = self.root.join(path);
        tokio::fs::read_to_string(&full_path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => SourceError::NotFound(full_path.display().to_string()),
                ErrorKind::PermissionDenied => SourceError::Unauthorized {
                    path: full_path.display().to_string(),
                    message: e.to_string(),
                },
                _ => SourceError::Read {
                    path: full_path.display().to_string(),
                    message: e.to_string(),
                },
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::fetch_ownership_file;
    use std::fs;
    use tempfile::TempDir;

    fn setup_repo(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (path, content) in files {
            let full = dir.path().join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(full, content).unwrap();
        }
        dir
    }

    #[test]
    fn reads_github_dir() {
        let dir = setup_repo(&[(".github/CODEOWNERS", "* @owner\n")]);
        let repo = LocalRepository::new(dir.path());
        let content = tokio_test::block_on(fetch_ownership_file(&repo)).unwrap();
        assert_eq!(content, "* @owner\n");
    }

    #[test]
    fn root_takes_precedence() {
        let dir = setup_repo(&[
            ("CODEOWNERS", "* @root\n"),
            ("docs/CODEOWNERS", "* @docs\n"),
        ]);
        let repo = LocalRepository::new(dir.path());
        let content = tokio_test::block_on(fetch_ownership_file(&repo)).unwrap();
        assert_eq!(content, "* @root\n");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = setup_repo(&[]);
        let repo = LocalRepository::new(dir.path());

        assert!(matches!(
            repo.read("CODEOWNERS").await,
            Err(SourceError::NotFound(_))
        ));

        let err = fetch_ownership_file(&repo).await.unwrap_err();
        assert_eq!(err.attempts.len(), 3);
        assert!(matches!(err.last, SourceError::NotFound(ref p) if p.ends_with(".github/CODEOWNERS")));
    }

    #[tokio::test]
    async fn directory_in_place_of_file_is_a_read_error() {
        let dir = setup_repo(&[]);
        fs::create_dir_all(dir.path().join("CODEOWNERS")).unwrap();
        let repo = LocalRepository::new(dir.path());

        assert!(matches!(
            repo.read("CODEOWNERS").await,
            Err(SourceError::Read { .. })
        ));
    }
}
