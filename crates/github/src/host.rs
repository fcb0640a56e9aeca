//! [`GitHost`] over the GitHub REST API.

use crate::models::{
    BranchModel, ContentModel, ContentUpdateModel, CreateFork, CreatePull, CreateRef, PullModel,
    RefModel, RefQuery, ReleaseModel, RepositoryModel, UpdateContent,
};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use octocrab::Octocrab;
use octocrab::service::middleware::retry::RetryConfig;
use tapbump_release::{
    Branch, Commit, Error, FileCommit, GitHost, NewPullRequest, PullRequest, ReleaseAsset,
    RemoteFile, RepoRef, Repository, Result,
};
use tracing::debug;

/// GitHub implementation of [`GitHost`].
///
/// Every call is a single REST request. Clients built by [`GitHubHost::new`]
/// and [`GitHubHost::with_base_uri`] have octocrab's retry layer switched
/// off, and errors are passed through as [`Error::Host`].
#[derive(Debug, Clone)]
pub struct GitHubHost {
    client: Octocrab,
}

impl GitHubHost {
    /// Creates a host authenticated with a personal or workflow token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when the token is empty, and
    /// [`Error::Host`] when the client cannot be built.
    pub fn new(token: &str) -> Result<Self> {
        check_token(token)?;
        Octocrab::builder()
            .add_retry_config(RetryConfig::None)
            .personal_token(token.to_string())
            .build()
            .map(Self::from_client)
            .map_err(|e| Error::host("client", e))
    }

    /// Creates a host against a different API root, such as GitHub
    /// Enterprise.
    ///
    /// # Errors
    ///
    /// As [`GitHubHost::new`], plus [`Error::Host`] for an unparsable URI.
    pub fn with_base_uri(token: &str, base_uri: &str) -> Result<Self> {
        check_token(token)?;
        let client = Octocrab::builder()
            .add_retry_config(RetryConfig::None)
            .personal_token(token.to_string())
            .base_uri(base_uri)
            .map_err(|e| Error::host("client", e))?
            .build()
            .map_err(|e| Error::host("client", e))?;
        Ok(Self::from_client(client))
    }

    /// Wraps an existing client.
    #[must_use]
    pub const fn from_client(client: Octocrab) -> Self {
        Self { client }
    }
}

fn check_token(token: &str) -> Result<()> {
    if token.trim().is_empty() {
        return Err(Error::invalid_input_with_help(
            "GitHub token is not set or empty",
            "Pass --token or set GITHUB_TOKEN",
        ));
    }
    Ok(())
}

fn repo_route(repo: &RepoRef) -> String {
    format!("/repos/{}/{}", repo.owner, repo.name)
}

#[async_trait]
impl GitHost for GitHubHost {
    async fn repository(&self, repo: &RepoRef) -> Result<Repository> {
        let model: RepositoryModel = self
            .client
            .get(repo_route(repo), None::<&()>)
            .await
            .map_err(|e| Error::host("repository", e))?;
        Ok(model.into_repository(false))
    }

    async fn branch(&self, repo: &RepoRef, name: &str) -> Result<Branch> {
        let route = format!("{}/branches/{name}", repo_route(repo));
        let model: BranchModel = self
            .client
            .get(route, None::<&()>)
            .await
            .map_err(|e| Error::host("branch", e))?;
        Ok(model.into())
    }

    async fn create_branch(&self, repo: &RepoRef, name: &str, sha: &str) -> Result<Branch> {
        debug!(repo = %repo, branch = %name, %sha, "Creating branch");
        let route = format!("{}/git/refs", repo_route(repo));
        let body = CreateRef {
            reference: format!("refs/heads/{name}"),
            sha,
        };
        let model: RefModel = self
            .client
            .post(route, Some(&body))
            .await
            .map_err(|e| Error::host("create_branch", e))?;
        let name = model
            .reference
            .strip_prefix("refs/heads/")
            .unwrap_or(name)
            .to_string();
        Ok(Branch {
            name,
            sha: model.object.sha,
            protected: false,
        })
    }

    async fn fork(&self, repo: &RepoRef, owner: Option<&str>) -> Result<Repository> {
        debug!(repo = %repo, owner = ?owner, "Forking repository");
        let route = format!("{}/forks", repo_route(repo));
        let model: RepositoryModel = self
            .client
            .post(route, Some(&CreateFork { organization: owner }))
            .await
            .map_err(|e| Error::host("fork", e))?;
        Ok(model.into_repository(true))
    }

    async fn file(&self, repo: &RepoRef, path: &str, branch: &str) -> Result<RemoteFile> {
        let route = format!("{}/contents/{path}", repo_route(repo));
        let model: ContentModel = self
            .client
            .get(route, Some(&RefQuery { reference: branch }))
            .await
            .map_err(|e| Error::host("file", e))?;
        // The API wraps base64 content at 60 columns.
        let encoded: String = model
            .content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| Error::host("file", e))?;
        let content = String::from_utf8(bytes).map_err(|e| Error::host("file", e))?;
        Ok(RemoteFile {
            path: model.path,
            content,
            blob: Some(model.sha),
        })
    }

    async fn release_assets(&self, repo: &RepoRef, tag: &str) -> Result<Vec<ReleaseAsset>> {
        let route = format!("{}/releases/tags/{tag}", repo_route(repo));
        let model: ReleaseModel = self
            .client
            .get(route, None::<&()>)
            .await
            .map_err(|e| Error::host("release_assets", e))?;
        Ok(model.assets.into_iter().map(ReleaseAsset::from).collect())
    }

    async fn commit_file(&self, repo: &RepoRef, commit: FileCommit) -> Result<Commit> {
        let route = format!("{}/contents/{}", repo_route(repo), commit.path);
        let body = UpdateContent {
            message: &commit.message,
            content: STANDARD.encode(commit.content.as_bytes()),
            branch: &commit.branch,
            sha: commit.blob.as_deref(),
        };
        let model: ContentUpdateModel = self
            .client
            .put(route, Some(&body))
            .await
            .map_err(|e| Error::host("commit_file", e))?;
        Ok(Commit {
            sha: model.commit.sha,
            url: model.commit.html_url,
        })
    }

    async fn create_pull_request(
        &self,
        repo: &RepoRef,
        pull_request: NewPullRequest,
    ) -> Result<PullRequest> {
        let route = format!("{}/pulls", repo_route(repo));
        let body = CreatePull {
            title: &pull_request.title,
            body: &pull_request.body,
            head: format!("{}:{}", pull_request.head_owner, pull_request.head),
            base: &pull_request.base,
        };
        let model: PullModel = self
            .client
            .post(route, Some(&body))
            .await
            .map_err(|e| Error::host("create_pull_request", e))?;
        Ok(PullRequest {
            id: model.number,
            url: model.html_url,
        })
    }
}
