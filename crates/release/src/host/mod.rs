//! Hosted-VCS collaborator interface.
//!
//! The [`GitHost`] trait abstracts the repository, branch, file, release and
//! pull-request operations the update workflow consumes, so that the decision
//! logic can run without a direct `octocrab` dependency. The GitHub
//! implementation lives in `tapbump-github`. With the `test-util` feature,
//! `memory::InMemoryHost` is an in-process implementation for tests.
//!
//! Implementations report failures through [`Error::Host`](crate::Error::Host)
//! and never retry.

#[cfg(any(test, feature = "test-util"))]
pub mod memory;

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

/// An `owner/name` repository coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    /// Repository owner (user or organisation)
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepoRef {
    /// Creates a repository coordinate.
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse an `owner/name` string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when either side of the `/` is missing.
    pub fn parse(full_name: &str) -> Result<Self> {
        match full_name.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() => {
                Ok(Self::new(owner, name))
            }
            _ => Err(Error::invalid_input_with_help(
                format!("Invalid repository '{full_name}'"),
                "Expected the form 'owner/repo'",
            )),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A fetched repository together with the caller's permissions on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Owner and name
    pub repo: RepoRef,
    /// Name of the default branch
    pub default_branch: String,
    /// Whether the authenticated caller may push to the repository
    pub can_push: bool,
}

impl Repository {
    /// Repository owner.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.repo.owner
    }
}

/// A branch head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    /// Branch name
    pub name: String,
    /// SHA of the branch tip
    pub sha: String,
    /// Whether branch protection is enabled
    pub protected: bool,
}

/// File content fetched from a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Path within the repository
    pub path: String,
    /// Decoded UTF-8 content
    pub content: String,
    /// Blob SHA of the fetched content
    pub blob: Option<String>,
}

/// A file attached to a hosted release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAsset {
    /// Asset file name
    pub name: String,
    /// Public download URL
    pub download_url: String,
    /// Provider-specific extra data (e.g. the asset label)
    pub extra: Option<String>,
}

impl ReleaseAsset {
    /// Creates a release asset.
    #[must_use]
    pub fn new(name: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            download_url: download_url.into(),
            extra: None,
        }
    }
}

/// A single-file commit to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCommit {
    /// Branch to commit onto
    pub branch: String,
    /// Path of the file
    pub path: String,
    /// New file content
    pub content: String,
    /// Commit message
    pub message: String,
    /// Blob SHA of the content the change was based on
    pub blob: Option<String>,
}

/// A pull request to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    /// Branch the change should be merged into
    pub base: String,
    /// Branch carrying the change
    pub head: String,
    /// Owner of the repository holding `head`
    pub head_owner: String,
    /// Title
    pub title: String,
    /// Body
    pub body: String,
}

/// A created commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    /// Commit SHA
    pub sha: String,
    /// Web URL of the commit
    pub url: String,
}

/// A created pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequest {
    /// Pull request number
    pub id: u64,
    /// Web URL of the pull request
    pub url: String,
}

/// Operations consumed from a hosted-VCS provider.
#[async_trait]
pub trait GitHost: Send + Sync {
    /// Fetch a repository and the caller's push permission.
    async fn repository(&self, repo: &RepoRef) -> Result<Repository>;

    /// Fetch a branch of a repository.
    async fn branch(&self, repo: &RepoRef, name: &str) -> Result<Branch>;

    /// Create a branch pointing at `sha`.
    async fn create_branch(&self, repo: &RepoRef, name: &str, sha: &str) -> Result<Branch>;

    /// Fetch the caller's fork of `repo`, creating it if needed.
    ///
    /// `owner` selects an organisation to fork into instead of the caller.
    async fn fork(&self, repo: &RepoRef, owner: Option<&str>) -> Result<Repository>;

    /// Fetch a file and its blob reference at a branch.
    async fn file(&self, repo: &RepoRef, path: &str, branch: &str) -> Result<RemoteFile>;

    /// List the assets of the release tagged `tag`.
    async fn release_assets(&self, repo: &RepoRef, tag: &str) -> Result<Vec<ReleaseAsset>>;

    /// Commit new content for one file.
    async fn commit_file(&self, repo: &RepoRef, commit: FileCommit) -> Result<Commit>;

    /// Open a pull request against `repo`.
    async fn create_pull_request(
        &self,
        repo: &RepoRef,
        pull_request: NewPullRequest,
    ) -> Result<PullRequest>;
}
