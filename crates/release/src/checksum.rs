//! Checksum resolution.
//!
//! Produces one checksum per resolved asset, by precedence:
//!
//! 1. a single asset slot with an explicit checksum uses it verbatim;
//! 2. a single asset slot with an explicit URL hashes the rendered URL;
//! 3. otherwise every resolved asset's own download URL is hashed, one at a
//!    time, in resolution order.
//!
//! With no assets resolved at all, the single slot is named after the
//! package, so an explicit checksum or URL can still be supplied on its own.

use crate::error::{Error, Result};
use crate::hash::ContentHasher;
use crate::host::ReleaseAsset;
use crate::version::Version;
use tracing::{debug, warn};

/// Explicit checksum inputs supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumOverrides {
    /// Checksum to use verbatim
    pub checksum: Option<String>,
    /// URL template to download and hash
    pub url: Option<String>,
}

/// Insertion-ordered mapping from asset name to checksum.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumSet {
    entries: Vec<(String, String)>,
}

impl ChecksumSet {
    fn insert(&mut self, name: impl Into<String>, checksum: impl Into<String>) {
        self.entries.push((name.into(), checksum.into()));
    }

    /// Checksums in resolution order.
    pub fn checksums(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, c)| c.as_str())
    }

    /// `(asset name, checksum)` pairs in resolution order.
    #[must_use]
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Look up the checksum of an asset.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c.as_str())
    }

    /// Number of checksums.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves checksums through a [`ContentHasher`].
pub struct ChecksumResolver<'a, C: ContentHasher + ?Sized> {
    hasher: &'a C,
}

impl<'a, C: ContentHasher + ?Sized> ChecksumResolver<'a, C> {
    /// Creates a resolver over the given hasher.
    #[must_use]
    pub const fn new(hasher: &'a C) -> Self {
        Self { hasher }
    }

    /// Resolve one checksum per asset slot.
    ///
    /// `default_slot` names the single slot used when `assets` is empty.
    ///
    /// # Errors
    ///
    /// Propagates hashing failures, and returns [`Error::ChecksumResolution`]
    /// when no checksum could be produced.
    pub async fn resolve(
        &self,
        assets: &[ReleaseAsset],
        overrides: &ChecksumOverrides,
        version: &Version,
        default_slot: &str,
    ) -> Result<ChecksumSet> {
        let mut set = ChecksumSet::default();
        let single_slot = match assets {
            [] => Some(default_slot),
            [asset] => Some(asset.name.as_str()),
            _ => None,
        };

        match (single_slot, &overrides.checksum, &overrides.url) {
            (Some(slot), Some(checksum), _) => {
                debug!(asset = %slot, "Using explicit checksum");
                set.insert(slot, checksum.clone());
            }
            (Some(slot), None, Some(template)) => {
                let url = version.render(template);
                debug!(asset = %slot, %url, "Hashing explicit URL");
                let checksum = self.hasher.digest(&url).await?;
                set.insert(slot, checksum);
            }
            _ => {
                if overrides.checksum.is_some() || overrides.url.is_some() {
                    warn!(
                        asset_count = assets.len(),
                        "Explicit checksum/URL ignored: more than one asset resolved"
                    );
                }
                for asset in assets {
                    debug!(asset = %asset.name, url = %asset.download_url, "Hashing release asset");
                    let checksum = self.hasher.digest(&asset.download_url).await?;
                    set.insert(asset.name.clone(), checksum);
                }
            }
        }

        if set.is_empty() {
            return Err(Error::ChecksumResolution);
        }
        Ok(set)
    }
}
