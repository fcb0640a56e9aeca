//! Tap repositories and the publish strategy.
//!
//! Publishing chooses one of three strategies from the caller's push
//! permission, the target branch's protection and the caller's wish for a
//! pull request:
//!
//! | can push | protected | force PR | strategy |
//! |---|---|---|---|
//! | yes | no | no | commit directly onto the target branch |
//! | yes | yes / any | any / yes | new branch in the tap, then a pull request |
//! | no | any | any | commit onto a fork, then a pull request |
//!
//! Nothing is retried or rolled back: a branch or fork created before a
//! failing commit, or a commit made before a failing pull request, stays in
//! place.

use crate::package::{Package, PackageType};
use chrono::Utc;
use serde::Serialize;
use std::fmt;
use tapbump_release::{
    Branch, Commit, Error, FileCommit, GitHost, NewPullRequest, PullRequest, RepoRef, Repository,
    Result,
};
use tracing::{debug, info};

/// Prefix Homebrew requires on tap repository names.
pub const TAP_REPO_PREFIX: &str = "homebrew-";

/// A tap repository and optional branch, as given on input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapRef {
    /// Tap repository, always carrying the `homebrew-` prefix
    pub repo: RepoRef,
    /// Target branch; the default branch when absent
    pub branch: Option<String>,
}

impl TapRef {
    /// Parse `owner/repo[:branch]`, adding the `homebrew-` prefix to the
    /// repository name when missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for malformed input.
    pub fn parse(tap: &str) -> Result<Self> {
        let (full_name, branch) = match tap.split_once(':') {
            Some((name, branch)) if !branch.is_empty() => (name, Some(branch.to_string())),
            Some((name, _)) => (name, None),
            None => (tap, None),
        };
        let mut repo = RepoRef::parse(full_name)?;
        if !repo.name.starts_with(TAP_REPO_PREFIX) {
            repo.name = format!("{TAP_REPO_PREFIX}{}", repo.name);
        }
        Ok(Self { repo, branch })
    }

    /// Sets the branch unless one was given in the tap string.
    #[must_use]
    pub fn or_branch(mut self, branch: Option<String>) -> Self {
        if self.branch.is_none() {
            self.branch = branch.filter(|b| !b.is_empty());
        }
        self
    }
}

impl fmt::Display for TapRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.branch {
            Some(branch) => write!(f, "{}:{branch}", self.repo),
            None => write!(f, "{}", self.repo),
        }
    }
}

/// How an update reaches the tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Commit onto the target branch of the tap.
    DirectCommit,
    /// Commit onto a new branch of the tap and open a pull request.
    BranchPullRequest,
    /// Commit onto the default branch of a fork and open a pull request.
    ForkPullRequest,
}

impl Strategy {
    /// Choose the strategy from live permission and protection state.
    #[must_use]
    pub const fn decide(can_push: bool, protected: bool, force_pull_request: bool) -> Self {
        match (can_push, protected || force_pull_request) {
            (true, false) => Self::DirectCommit,
            (true, true) => Self::BranchPullRequest,
            (false, _) => Self::ForkPullRequest,
        }
    }
}

/// Where the commit goes and whether a pull request follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTarget {
    /// Repository receiving the commit
    pub commit_repository: RepoRef,
    /// Branch receiving the commit
    pub commit_branch: String,
    /// Whether a pull request must be opened afterwards
    pub requires_pull_request: bool,
}

/// Options controlling publication.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishOptions {
    /// Always go through a pull request, even when a direct commit is allowed
    pub force_pull_request: bool,
    /// Organisation to fork into when the caller cannot push
    pub fork_owner: Option<String>,
}

/// The terminal outcome of publishing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PublishOutcome {
    /// The change was committed directly.
    Commit(Commit),
    /// A pull request was opened.
    PullRequest(PullRequest),
}

impl PublishOutcome {
    /// The outcome's tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Commit(_) => "commit",
            Self::PullRequest(_) => "pull_request",
        }
    }

    /// Web URL of the commit or pull request.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Commit(commit) => &commit.url,
            Self::PullRequest(pull) => &pull.url,
        }
    }
}

impl fmt::Display for PublishOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Commit(commit) => write!(f, "Created commit '{}': {}", commit.sha, commit.url),
            Self::PullRequest(pull) => {
                write!(f, "Created pull request '{}': {}", pull.id, pull.url)
            }
        }
    }
}

/// Split a commit message into a pull request title and body at the first
/// newline. An empty message falls back to `Update <file_path>`.
#[must_use]
pub fn split_message(message: &str, file_path: &str) -> (String, String) {
    if message.is_empty() {
        return (format!("Update {file_path}"), String::new());
    }
    match message.split_once('\n') {
        Some((title, body)) => (title.to_string(), body.to_string()),
        None => (message.to_string(), String::new()),
    }
}

fn update_branch_name() -> String {
    format!("update-{}", Utc::now().timestamp_millis())
}

/// A tap repository opened at its target branch.
pub struct Tap<'a, H: GitHost + ?Sized> {
    host: &'a H,
    repository: Repository,
    branch: Branch,
}

impl<'a, H: GitHost + ?Sized> Tap<'a, H> {
    /// Fetch the tap repository and its target branch.
    ///
    /// # Errors
    ///
    /// Propagates host failures.
    pub async fn open(host: &'a H, tap: &TapRef) -> Result<Self> {
        let repository = host.repository(&tap.repo).await?;
        let branch_name = tap
            .branch
            .clone()
            .unwrap_or_else(|| repository.default_branch.clone());
        let branch = host.branch(&tap.repo, &branch_name).await?;
        debug!(
            tap = %tap.repo,
            branch = %branch.name,
            sha = %branch.sha,
            "Opened tap"
        );
        Ok(Self {
            host,
            repository,
            branch,
        })
    }

    /// The tap repository.
    #[must_use]
    pub const fn repository(&self) -> &Repository {
        &self.repository
    }

    /// The target branch.
    #[must_use]
    pub const fn branch(&self) -> &Branch {
        &self.branch
    }

    /// Fetch the manifest of package `name`.
    ///
    /// # Errors
    ///
    /// Propagates host failures, including a missing manifest.
    pub async fn package(&self, package_type: PackageType, name: &str) -> Result<Package> {
        let path = package_type.manifest_path(name);
        let file = self
            .host
            .file(&self.repository.repo, &path, &self.branch.name)
            .await?;
        Ok(Package::from_fetched_file(file))
    }

    /// Decide the strategy and prepare its branch or fork.
    ///
    /// # Errors
    ///
    /// Propagates failures creating the branch or fork.
    pub async fn target(&self, options: &PublishOptions) -> Result<PublishTarget> {
        let strategy = Strategy::decide(
            self.repository.can_push,
            self.branch.protected,
            options.force_pull_request,
        );
        debug!(
            can_push = self.repository.can_push,
            is_protected = self.branch.protected,
            force_pull_request = options.force_pull_request,
            ?strategy,
            "Selected publish strategy"
        );

        match strategy {
            Strategy::DirectCommit => Ok(PublishTarget {
                commit_repository: self.repository.repo.clone(),
                commit_branch: self.branch.name.clone(),
                requires_pull_request: false,
            }),
            Strategy::BranchPullRequest => {
                let branch = self
                    .host
                    .create_branch(&self.repository.repo, &update_branch_name(), &self.branch.sha)
                    .await?;
                Ok(PublishTarget {
                    commit_repository: self.repository.repo.clone(),
                    commit_branch: branch.name,
                    requires_pull_request: true,
                })
            }
            Strategy::ForkPullRequest => {
                let fork = self
                    .host
                    .fork(&self.repository.repo, options.fork_owner.as_deref())
                    .await?;
                Ok(PublishTarget {
                    commit_branch: fork.default_branch,
                    commit_repository: fork.repo,
                    requires_pull_request: true,
                })
            }
        }
    }

    /// Commit the package and, when the strategy requires it, open a pull
    /// request back to the target branch.
    ///
    /// # Errors
    ///
    /// Propagates host failures unchanged. Earlier side effects are kept: a
    /// pull request failure leaves the branch and commit in place.
    pub async fn publish(
        &self,
        package: &Package,
        message: &str,
        options: &PublishOptions,
    ) -> Result<PublishOutcome> {
        if package.file_path().is_empty() {
            return Err(Error::invalid_input("package has no file path"));
        }
        let target = self.target(options).await?;

        debug!(
            repo = %target.commit_repository,
            branch = %target.commit_branch,
            path = %package.file_path(),
            "Creating commit"
        );
        let commit = self
            .host
            .commit_file(
                &target.commit_repository,
                FileCommit {
                    branch: target.commit_branch.clone(),
                    path: package.file_path().to_string(),
                    content: package.content().to_string(),
                    message: message.to_string(),
                    blob: package.blob().map(str::to_string),
                },
            )
            .await?;
        info!(sha = %commit.sha, url = %commit.url, "Committed package update");

        if !target.requires_pull_request {
            return Ok(PublishOutcome::Commit(commit));
        }

        let (title, body) = split_message(message, package.file_path());
        debug!(%title, "Creating pull request");
        let pull = self
            .host
            .create_pull_request(
                &self.repository.repo,
                NewPullRequest {
                    base: self.branch.name.clone(),
                    head: target.commit_branch,
                    head_owner: target.commit_repository.owner,
                    title,
                    body,
                },
            )
            .await?;
        info!(id = pull.id, url = %pull.url, "Opened pull request");
        Ok(PublishOutcome::PullRequest(pull))
    }
}
