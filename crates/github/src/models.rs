//! Wire models for the GitHub REST routes used by [`GitHubHost`](crate::GitHubHost).
//!
//! Only the fields the update workflow reads are modelled; everything else
//! in the responses is ignored.

use serde::{Deserialize, Serialize};
use tapbump_release::{Branch, ReleaseAsset, RepoRef, Repository};

#[derive(Debug, Deserialize)]
pub struct RepositoryModel {
    pub name: String,
    pub owner: OwnerModel,
    pub default_branch: String,
    #[serde(default)]
    pub permissions: Option<PermissionsModel>,
}

#[derive(Debug, Deserialize)]
pub struct OwnerModel {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct PermissionsModel {
    #[serde(default)]
    pub push: bool,
}

impl RepositoryModel {
    /// Convert, using `push_fallback` when the response carries no
    /// permissions block.
    pub fn into_repository(self, push_fallback: bool) -> Repository {
        Repository {
            repo: RepoRef::new(self.owner.login, self.name),
            default_branch: self.default_branch,
            can_push: self.permissions.map_or(push_fallback, |p| p.push),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BranchModel {
    pub name: String,
    pub commit: ShaModel,
    #[serde(default)]
    pub protected: bool,
}

impl From<BranchModel> for Branch {
    fn from(model: BranchModel) -> Self {
        Self {
            name: model.name,
            sha: model.commit.sha,
            protected: model.protected,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ShaModel {
    pub sha: String,
}

#[derive(Debug, Deserialize)]
pub struct RefModel {
    #[serde(rename = "ref")]
    pub reference: String,
    pub object: ShaModel,
}

#[derive(Debug, Serialize)]
pub struct CreateRef<'a> {
    #[serde(rename = "ref")]
    pub reference: String,
    pub sha: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CreateFork<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct RefQuery<'a> {
    #[serde(rename = "ref")]
    pub reference: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ContentModel {
    pub path: String,
    #[serde(default)]
    pub content: String,
    pub sha: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateContent<'a> {
    pub message: &'a str,
    pub content: String,
    pub branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub struct ContentUpdateModel {
    pub commit: CommitModel,
}

#[derive(Debug, Deserialize)]
pub struct CommitModel {
    pub sha: String,
    pub html_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ReleaseModel {
    #[serde(default)]
    pub assets: Vec<AssetModel>,
}

#[derive(Debug, Deserialize)]
pub struct AssetModel {
    pub name: String,
    pub browser_download_url: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl From<AssetModel> for ReleaseAsset {
    fn from(model: AssetModel) -> Self {
        Self {
            name: model.name,
            download_url: model.browser_download_url,
            extra: model.label.filter(|label| !label.is_empty()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatePull<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub head: String,
    pub base: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct PullModel {
    pub number: u64,
    pub html_url: String,
}
