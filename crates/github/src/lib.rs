//! GitHub host for tapbump.
//!
//! Provides [`GitHubHost`], the [`GitHost`](tapbump_release::GitHost)
//! implementation backed by the GitHub REST API through `octocrab`.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

mod host;
mod models;

pub use host::GitHubHost;
