//! Release resolution for tapbump.
//!
//! This crate turns a hosted release into the values a package manifest
//! needs: the new [`Version`] and one checksum per release asset.
//!
//! # Architecture
//!
//! - [`host`] - the [`GitHost`] collaborator trait and its value types
//! - [`version`] - raw version values and template rendering
//! - [`hash`] - streaming SHA-256 of remote content
//! - [`assets`] - regex-based release asset matching and version extraction
//! - [`checksum`] - checksum precedence (explicit value, explicit URL, asset URLs)
//! - [`error`] - the shared error taxonomy
//!
//! # Example
//!
//! ```rust,ignore
//! use tapbump_release::{AssetResolver, ChecksumOverrides, ChecksumResolver, RepoRef};
//!
//! let map = AssetResolver::new(&host)
//!     .resolve(&RepoRef::new("octo", "app"), "v1.2.3", &patterns)
//!     .await?;
//! let version = map.version()?;
//! let assets: Vec<_> = map.assets().cloned().collect();
//! let checksums = ChecksumResolver::new(&hasher)
//!     .resolve(&assets, &ChecksumOverrides::default(), &version, "app")
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod assets;
pub mod checksum;
pub mod error;
pub mod hash;
pub mod host;
pub mod version;

pub use assets::{AssetMap, AssetResolver, ResolvedAsset};
pub use checksum::{ChecksumOverrides, ChecksumResolver, ChecksumSet};
pub use error::{Error, Result};
pub use hash::{ContentHasher, HttpContentHasher};
pub use host::{
    Branch, Commit, FileCommit, GitHost, NewPullRequest, PullRequest, ReleaseAsset, RemoteFile,
    RepoRef, Repository,
};
pub use version::Version;
