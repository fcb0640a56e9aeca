//! Update configuration.
//!
//! [`UpdateConfig`] carries every input of one invocation. It is built once
//! by the caller (the CLI reads flags and the environment) and handed to the
//! [`Updater`](crate::Updater); nothing below it reads process state.

use crate::message::DEFAULT_MESSAGE;
use crate::package::PackageType;
use crate::tap::{PublishOptions, TapRef};
use tapbump_release::{ChecksumOverrides, Error, RepoRef, Result};

/// Configuration for one package update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateConfig {
    /// Tap repository and branch
    pub tap: TapRef,
    /// Package name
    pub package: String,
    /// Formula or cask
    pub package_type: PackageType,
    /// Explicit version; derived from the first asset pattern when absent
    pub version: Option<String>,
    /// Explicit checksum
    pub checksum: Option<String>,
    /// Explicit download URL template
    pub url: Option<String>,
    /// Asset name patterns; the first one carries the version
    pub asset_patterns: Vec<String>,
    /// Repository holding the release
    pub release_repo: Option<RepoRef>,
    /// Tag of the release
    pub release_tag: Option<String>,
    /// Commit message template
    pub message: String,
    /// Always publish through a pull request
    pub force_pull_request: bool,
    /// Organisation to fork into when the caller cannot push
    pub fork_owner: Option<String>,
    /// Resolve and patch, but do not publish
    pub dry_run: bool,
}

impl UpdateConfig {
    /// Creates a configuration with defaults for everything but the target.
    #[must_use]
    pub fn new(tap: TapRef, package: impl Into<String>, package_type: PackageType) -> Self {
        Self {
            tap,
            package: package.into(),
            package_type,
            version: None,
            checksum: None,
            url: None,
            asset_patterns: Vec::new(),
            release_repo: None,
            release_tag: None,
            message: DEFAULT_MESSAGE.to_string(),
            force_pull_request: false,
            fork_owner: None,
            dry_run: false,
        }
    }

    /// Sets the explicit version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the explicit checksum.
    #[must_use]
    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    /// Sets the download URL template.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the asset patterns.
    #[must_use]
    pub fn with_asset_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.asset_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the release repository and tag.
    #[must_use]
    pub fn with_release(mut self, repo: RepoRef, tag: impl Into<String>) -> Self {
        self.release_repo = Some(repo);
        self.release_tag = Some(tag.into());
        self
    }

    /// Sets the commit message template.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Sets whether a pull request is always used.
    #[must_use]
    pub const fn with_force_pull_request(mut self, force: bool) -> Self {
        self.force_pull_request = force;
        self
    }

    /// Sets the organisation to fork into.
    #[must_use]
    pub fn with_fork_owner(mut self, owner: impl Into<String>) -> Self {
        self.fork_owner = Some(owner.into());
        self
    }

    /// Sets the dry-run flag.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// The checksum overrides.
    #[must_use]
    pub fn checksum_overrides(&self) -> ChecksumOverrides {
        ChecksumOverrides {
            checksum: self.checksum.clone(),
            url: self.url.clone(),
        }
    }

    /// The publish options.
    #[must_use]
    pub fn publish_options(&self) -> PublishOptions {
        PublishOptions {
            force_pull_request: self.force_pull_request,
            fork_owner: self.fork_owner.clone(),
        }
    }

    /// Check for missing or contradictory inputs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when the package name is empty, when
    /// neither a version nor asset patterns are given, or when asset patterns
    /// are given without a release repository and tag.
    pub fn validate(&self) -> Result<()> {
        if self.package.trim().is_empty() {
            return Err(Error::invalid_input("package name is required"));
        }
        if self.version.is_none() && self.asset_patterns.is_empty() {
            return Err(Error::invalid_input_with_help(
                "no version to update to",
                "Supply a version, or asset patterns to derive it from the release",
            ));
        }
        if !self.asset_patterns.is_empty()
            && (self.release_repo.is_none() || self.release_tag.is_none())
        {
            return Err(Error::invalid_input_with_help(
                "asset patterns need a release repository and tag",
                "Set the release repository and tag, or run from a tag build",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> UpdateConfig {
        UpdateConfig::new(
            TapRef::parse("octo/tap").unwrap(),
            "foo",
            PackageType::Formula,
        )
    }

    #[test]
    fn test_defaults() {
        let config = base();
        assert_eq!(config.message, DEFAULT_MESSAGE);
        assert!(!config.force_pull_request);
        assert!(!config.dry_run);
        assert!(config.asset_patterns.is_empty());
    }

    #[test]
    fn test_builder_chain() {
        let config = base()
            .with_version("1.2.3")
            .with_checksum("abc")
            .with_url("https://x/{{version}}")
            .with_message("m")
            .with_force_pull_request(true)
            .with_fork_owner("org")
            .with_dry_run(true);

        assert_eq!(config.version.as_deref(), Some("1.2.3"));
        assert_eq!(
            config.checksum_overrides(),
            ChecksumOverrides {
                checksum: Some("abc".to_string()),
                url: Some("https://x/{{version}}".to_string()),
            }
        );
        assert_eq!(
            config.publish_options(),
            PublishOptions {
                force_pull_request: true,
                fork_owner: Some("org".to_string()),
            }
        );
        assert!(config.dry_run);
    }

    #[test]
    fn test_validate_requires_version_or_patterns() {
        let err = base().validate().unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
        assert!(base().with_version("1").validate().is_ok());
    }

    #[test]
    fn test_validate_patterns_need_release() {
        let config = base().with_asset_patterns(["linux"]);
        assert!(config.validate().is_err());
        let config = config.with_release(RepoRef::new("octo", "app"), "v1");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_package() {
        let config = UpdateConfig::new(
            TapRef::parse("octo/tap").unwrap(),
            " ",
            PackageType::Cask,
        )
        .with_version("1");
        assert!(config.validate().is_err());
    }
}
