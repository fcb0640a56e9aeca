//! Release asset resolution.
//!
//! Matches caller-supplied regular expressions against the assets of a
//! release. Every pattern must match exactly one asset; the first pattern is
//! the designated one from which the new version is extracted.

use crate::error::{Error, Result};
use crate::host::{GitHost, ReleaseAsset, RepoRef};
use crate::version::Version;
use regex::Regex;
use tracing::debug;

/// Name of the capture group preferred for version extraction.
pub const VERSION_GROUP: &str = "version";

/// A compiled asset pattern paired with the asset it matched.
#[derive(Debug, Clone)]
pub struct ResolvedAsset {
    /// The pattern that selected the asset
    pub pattern: Regex,
    /// The matched asset
    pub asset: ReleaseAsset,
}

/// Ordered pattern→asset mapping, in the order the patterns were supplied.
#[derive(Debug, Clone)]
pub struct AssetMap {
    entries: Vec<ResolvedAsset>,
}

impl AssetMap {
    /// The resolved entries in pattern order.
    #[must_use]
    pub fn entries(&self) -> &[ResolvedAsset] {
        &self.entries
    }

    /// The matched assets in pattern order.
    pub fn assets(&self) -> impl Iterator<Item = &ReleaseAsset> {
        self.entries.iter().map(|e| &e.asset)
    }

    /// Number of resolved assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no asset was resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Extract the version from the designated (first) pattern's match.
    ///
    /// A capture group named `version` wins; otherwise the first unnamed
    /// capture group is used. Other entries never contribute.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoAssetsResolved`] for an empty map and
    /// [`Error::VersionExtraction`] when neither group captured anything.
    pub fn version(&self) -> Result<Version> {
        let designated = self.entries.first().ok_or(Error::NoAssetsResolved)?;
        let raw = extract_version(&designated.pattern, &designated.asset.name).ok_or_else(|| {
            Error::version_extraction(&designated.asset.name, designated.pattern.as_str())
        })?;
        Version::parse(raw)
            .map_err(|_| Error::version_extraction(&designated.asset.name, designated.pattern.as_str()))
    }
}

/// Pull the version out of `name` using `pattern`'s capture groups.
fn extract_version<'a>(pattern: &Regex, name: &'a str) -> Option<&'a str> {
    let captures = pattern.captures(name)?;
    if let Some(named) = captures.name(VERSION_GROUP) {
        return Some(named.as_str());
    }
    pattern
        .capture_names()
        .enumerate()
        .skip(1)
        .find(|(_, group_name)| group_name.is_none())
        .and_then(|(index, _)| captures.get(index))
        .map(|m| m.as_str())
}

/// Compile asset patterns.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for the first pattern that is not a valid
/// regular expression.
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| {
                Error::invalid_input_with_help(
                    format!("Invalid asset pattern '{p}'"),
                    e.to_string(),
                )
            })
        })
        .collect()
}

/// Match compiled patterns against a fetched asset list.
///
/// # Errors
///
/// - [`Error::AmbiguousAsset`] when a pattern matches more than one asset
/// - [`Error::AssetNotFound`] listing every pattern that matched nothing
/// - [`Error::NoAssetsResolved`] when no patterns were supplied
pub fn match_assets(patterns: Vec<Regex>, assets: &[ReleaseAsset]) -> Result<AssetMap> {
    let mut entries = Vec::with_capacity(patterns.len());
    let mut unmatched = Vec::new();

    for pattern in patterns {
        let matches: Vec<&ReleaseAsset> = assets
            .iter()
            .filter(|asset| pattern.is_match(&asset.name))
            .collect();
        match matches.as_slice() {
            [] => unmatched.push(pattern.as_str().to_string()),
            [asset] => {
                debug!(pattern = %pattern, asset = %asset.name, "Matched release asset");
                entries.push(ResolvedAsset {
                    asset: (*asset).clone(),
                    pattern,
                });
            }
            many => {
                return Err(Error::AmbiguousAsset {
                    pattern: pattern.as_str().to_string(),
                    assets: many.iter().map(|a| a.name.clone()).collect(),
                });
            }
        }
    }

    if !unmatched.is_empty() {
        return Err(Error::AssetNotFound {
            patterns: unmatched,
        });
    }
    if entries.is_empty() {
        return Err(Error::NoAssetsResolved);
    }
    Ok(AssetMap { entries })
}

/// Resolves asset patterns against a hosted release.
pub struct AssetResolver<'a, H: GitHost + ?Sized> {
    host: &'a H,
}

impl<'a, H: GitHost + ?Sized> AssetResolver<'a, H> {
    /// Creates a resolver over the given host.
    #[must_use]
    pub const fn new(host: &'a H) -> Self {
        Self { host }
    }

    /// Fetch the assets of `repo`'s release `tag` and match `patterns`.
    ///
    /// # Errors
    ///
    /// Propagates host failures and the errors of [`compile_patterns`] and
    /// [`match_assets`].
    pub async fn resolve(&self, repo: &RepoRef, tag: &str, patterns: &[String]) -> Result<AssetMap> {
        let compiled = compile_patterns(patterns)?;
        let assets = self.host.release_assets(repo, tag).await?;
        debug!(
            repo = %repo,
            tag = %tag,
            asset_count = assets.len(),
            "Fetched release assets"
        );
        match_assets(compiled, &assets)
    }
}
