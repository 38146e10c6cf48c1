//! Git repository discovery.

use std::path::{Path, PathBuf};

use thiserror::Error;

use git2::Repository;

/// Errors from repository discovery.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RepoError {
    /// Path is not inside a git repository.
    #[error("not inside a git repository")]
    NotARepo,
}

/// Canonicalized path to a git repository's working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRoot(PathBuf);

impl RepoRoot {
    /// Discover the git repository containing the given path.
    ///
    /// Walks up the directory tree to find a `.git` directory. Bare
    /// repositories are rejected; there is no worktree to operate on.
    #[must_use = "this returns a Result that should be checked"]
    pub fn discover(path: &Path) -> Result<Self, RepoError> {
        let repo = Repository::discover(path).map_err(|_| RepoError::NotARepo)?;
        let root = repo
            .workdir()
            .ok_or(RepoError::NotARepo)?
            .canonicalize()
            .map_err(|_| RepoError::NotARepo)?;
        Ok(Self(root))
    }

    /// The repository root path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discover_fails_outside_a_repo() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            RepoRoot::discover(dir.path()),
            Err(RepoError::NotARepo)
        ));
    }

    #[test]
    fn discover_finds_repo_from_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        git2::Repository::init(dir.path()).unwrap();
        let sub = dir.path().join("deep/nested");
        std::fs::create_dir_all(&sub).unwrap();
        let root = RepoRoot::discover(&sub).unwrap();
        assert_eq!(root.path(), dir.path().canonicalize().unwrap());
    }
}
