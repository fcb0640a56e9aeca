//! In-memory [`GitHost`] for tests.
//!
//! Holds repositories, branches, files and releases in process memory and
//! records every mutating call so tests can assert on the publish strategy.

use super::{
    Branch, Commit, FileCommit, GitHost, NewPullRequest, PullRequest, ReleaseAsset, RemoteFile,
    RepoRef, Repository,
};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A mutating call observed by [`InMemoryHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    /// A branch was created.
    CreateBranch {
        /// Repository the branch was created in
        repo: RepoRef,
        /// Branch name
        name: String,
        /// Commit the branch points at
        sha: String,
    },
    /// A fork was requested.
    Fork {
        /// Repository being forked
        repo: RepoRef,
        /// Organisation requested for the fork
        owner: Option<String>,
    },
    /// A file was committed.
    Commit {
        /// Repository committed to
        repo: RepoRef,
        /// The commit request
        commit: FileCommit,
    },
    /// A pull request was opened.
    PullRequest {
        /// Repository the pull request targets
        repo: RepoRef,
        /// The pull request request
        pull_request: NewPullRequest,
    },
}

#[derive(Debug, Default)]
struct State {
    repositories: HashMap<RepoRef, Repository>,
    branches: HashMap<(RepoRef, String), Branch>,
    /// Keyed by repository, branch and path.
    files: HashMap<(RepoRef, String, String), RemoteFile>,
    releases: HashMap<(RepoRef, String), Vec<ReleaseAsset>>,
    calls: Vec<HostCall>,
    failing: Vec<&'static str>,
    next_id: u64,
}

/// A [`GitHost`] backed by process memory.
#[derive(Debug)]
pub struct InMemoryHost {
    user: String,
    state: Mutex<State>,
}

impl InMemoryHost {
    /// Creates an empty host for the authenticated `user`.
    #[must_use]
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            state: Mutex::new(State::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a repository and a branch for its default branch.
    #[must_use]
    pub fn with_repository(self, repo: &str, default_branch: &str, can_push: bool) -> Self {
        let repo_ref = parse_fixture(repo);
        {
            let mut state = self.state();
            state.repositories.insert(
                repo_ref.clone(),
                Repository {
                    repo: repo_ref.clone(),
                    default_branch: default_branch.to_string(),
                    can_push,
                },
            );
            state.branches.insert(
                (repo_ref, default_branch.to_string()),
                Branch {
                    name: default_branch.to_string(),
                    sha: format!("{default_branch}-tip"),
                    protected: false,
                },
            );
        }
        self
    }

    /// Adds or replaces a branch.
    #[must_use]
    pub fn with_branch(self, repo: &str, name: &str, protected: bool) -> Self {
        self.state().branches.insert(
            (parse_fixture(repo), name.to_string()),
            Branch {
                name: name.to_string(),
                sha: format!("{name}-tip"),
                protected,
            },
        );
        self
    }

    /// Adds a file on the repository's default branch.
    #[must_use]
    pub fn with_file(self, repo: &str, path: &str, content: &str) -> Self {
        let repo_ref = parse_fixture(repo);
        let mut state = self.state();
        let branch = state
            .repositories
            .get(&repo_ref)
            .map_or_else(|| "main".to_string(), |r| r.default_branch.clone());
        state.files.insert(
            (repo_ref, branch, path.to_string()),
            RemoteFile {
                path: path.to_string(),
                content: content.to_string(),
                blob: Some(format!("blob-{}", content.len())),
            },
        );
        drop(state);
        self
    }

    /// Adds a release with the given asset names; download URLs are derived.
    #[must_use]
    pub fn with_release(self, repo: &str, tag: &str, assets: &[&str]) -> Self {
        let assets = assets
            .iter()
            .map(|name| {
                ReleaseAsset::new(
                    *name,
                    format!("https://github.com/{repo}/releases/download/{tag}/{name}"),
                )
            })
            .collect();
        self.state()
            .releases
            .insert((parse_fixture(repo), tag.to_string()), assets);
        self
    }

    /// Makes the named operation (e.g. `"create_pull_request"`) fail.
    #[must_use]
    pub fn failing(self, operation: &'static str) -> Self {
        self.state().failing.push(operation);
        self
    }

    /// Returns every mutating call in order.
    #[must_use]
    pub fn calls(&self) -> Vec<HostCall> {
        self.state().calls.clone()
    }

    /// Returns the current content of a file on `branch`.
    #[must_use]
    pub fn file_content(&self, repo: &str, branch: &str, path: &str) -> Option<String> {
        self.state()
            .files
            .get(&(parse_fixture(repo), branch.to_string(), path.to_string()))
            .map(|f| f.content.clone())
    }

    fn check(state: &State, operation: &'static str) -> Result<()> {
        if state.failing.contains(&operation) {
            return Err(Error::host(operation, format!("{operation} rejected")));
        }
        Ok(())
    }
}

fn parse_fixture(repo: &str) -> RepoRef {
    let (owner, name) = repo.split_once('/').unwrap_or(("", repo));
    RepoRef::new(owner, name)
}

/// Copies every file of the `from` branch onto the `to` branch.
fn copy_files(state: &mut State, from: (&RepoRef, &str), to: (&RepoRef, &str)) {
    let copied: Vec<_> = state
        .files
        .iter()
        .filter(|((repo, branch, _), _)| repo == from.0 && branch == from.1)
        .map(|((_, _, path), file)| {
            ((to.0.clone(), to.1.to_string(), path.clone()), file.clone())
        })
        .collect();
    state.files.extend(copied);
}

fn not_found(operation: &str, what: String) -> Error {
    Error::host(operation, format!("{what} not found"))
}

#[async_trait]
impl GitHost for InMemoryHost {
    async fn repository(&self, repo: &RepoRef) -> Result<Repository> {
        let state = self.state();
        Self::check(&state, "repository")?;
        state
            .repositories
            .get(repo)
            .cloned()
            .ok_or_else(|| not_found("repository", format!("repository {repo}")))
    }

    async fn branch(&self, repo: &RepoRef, name: &str) -> Result<Branch> {
        let state = self.state();
        Self::check(&state, "branch")?;
        state
            .branches
            .get(&(repo.clone(), name.to_string()))
            .cloned()
            .ok_or_else(|| not_found("branch", format!("branch {name} of {repo}")))
    }

    async fn create_branch(&self, repo: &RepoRef, name: &str, sha: &str) -> Result<Branch> {
        let mut state = self.state();
        Self::check(&state, "create_branch")?;
        let branch = Branch {
            name: name.to_string(),
            sha: sha.to_string(),
            protected: false,
        };
        let source = state
            .branches
            .iter()
            .find(|((owner_repo, _), tip)| owner_repo == repo && tip.sha == sha)
            .map(|((_, source), _)| source.clone());
        if let Some(source) = source {
            copy_files(&mut state, (repo, &source), (repo, name));
        }
        state
            .branches
            .insert((repo.clone(), name.to_string()), branch.clone());
        state.calls.push(HostCall::CreateBranch {
            repo: repo.clone(),
            name: name.to_string(),
            sha: sha.to_string(),
        });
        Ok(branch)
    }

    async fn fork(&self, repo: &RepoRef, owner: Option<&str>) -> Result<Repository> {
        let mut state = self.state();
        Self::check(&state, "fork")?;
        state.calls.push(HostCall::Fork {
            repo: repo.clone(),
            owner: owner.map(str::to_string),
        });
        let upstream = state
            .repositories
            .get(repo)
            .cloned()
            .ok_or_else(|| not_found("fork", format!("repository {repo}")))?;
        let fork_ref = RepoRef::new(owner.unwrap_or(&self.user), repo.name.clone());
        if let Some(existing) = state.repositories.get(&fork_ref) {
            return Ok(existing.clone());
        }

        let fork = Repository {
            repo: fork_ref.clone(),
            default_branch: upstream.default_branch.clone(),
            can_push: true,
        };
        let tip = state
            .branches
            .get(&(repo.clone(), upstream.default_branch.clone()))
            .cloned();
        if let Some(tip) = tip {
            state
                .branches
                .insert((fork_ref.clone(), tip.name.clone()), Branch { protected: false, ..tip });
        }
        let default_branch = upstream.default_branch.as_str();
        copy_files(
            &mut state,
            (repo, default_branch),
            (&fork_ref, default_branch),
        );
        state.repositories.insert(fork_ref, fork.clone());
        Ok(fork)
    }

    async fn file(&self, repo: &RepoRef, path: &str, branch: &str) -> Result<RemoteFile> {
        let state = self.state();
        Self::check(&state, "file")?;
        if !state.branches.contains_key(&(repo.clone(), branch.to_string())) {
            return Err(not_found("file", format!("branch {branch} of {repo}")));
        }
        state
            .files
            .get(&(repo.clone(), branch.to_string(), path.to_string()))
            .cloned()
            .ok_or_else(|| not_found("file", format!("{path} in {repo}")))
    }

    async fn release_assets(&self, repo: &RepoRef, tag: &str) -> Result<Vec<ReleaseAsset>> {
        let state = self.state();
        Self::check(&state, "release_assets")?;
        state
            .releases
            .get(&(repo.clone(), tag.to_string()))
            .cloned()
            .ok_or_else(|| not_found("release_assets", format!("release {tag} of {repo}")))
    }

    async fn commit_file(&self, repo: &RepoRef, commit: FileCommit) -> Result<Commit> {
        let mut state = self.state();
        Self::check(&state, "commit_file")?;
        if !state
            .branches
            .contains_key(&(repo.clone(), commit.branch.clone()))
        {
            return Err(not_found(
                "commit_file",
                format!("branch {} of {repo}", commit.branch),
            ));
        }
        let key = (repo.clone(), commit.branch.clone(), commit.path.clone());
        let current_blob = state.files.get(&key).and_then(|f| f.blob.clone());
        if commit.blob.is_some() && commit.blob != current_blob {
            return Err(Error::host(
                "commit_file",
                format!("{} does not match the expected blob", commit.path),
            ));
        }

        state.next_id += 1;
        let sha = format!("commit-{}", state.next_id);
        state.files.insert(
            key,
            RemoteFile {
                path: commit.path.clone(),
                content: commit.content.clone(),
                blob: Some(format!("blob-{sha}")),
            },
        );
        if let Some(tip) = state
            .branches
            .get_mut(&(repo.clone(), commit.branch.clone()))
        {
            tip.sha.clone_from(&sha);
        }
        state.calls.push(HostCall::Commit {
            repo: repo.clone(),
            commit,
        });
        Ok(Commit {
            url: format!("https://github.com/{repo}/commit/{sha}"),
            sha,
        })
    }

    async fn create_pull_request(
        &self,
        repo: &RepoRef,
        pull_request: NewPullRequest,
    ) -> Result<PullRequest> {
        let mut state = self.state();
        Self::check(&state, "create_pull_request")?;
        state.next_id += 1;
        let id = state.next_id;
        state.calls.push(HostCall::PullRequest {
            repo: repo.clone(),
            pull_request,
        });
        Ok(PullRequest {
            id,
            url: format!("https://github.com/{repo}/pull/{id}"),
        })
    }
}
