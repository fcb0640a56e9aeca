//! End-to-end package update.
//!
//! Wires the release resolution, the manifest patch and the publish step
//! together. Errors surface unchanged; nothing is retried.

use crate::config::UpdateConfig;
use crate::message::format_message;
use crate::package::Package;
use crate::tap::{PublishOutcome, Tap};
use tapbump_release::{
    AssetResolver, ChecksumResolver, ChecksumSet, ContentHasher, Error, GitHost, ReleaseAsset,
    Result, Version,
};
use tracing::{debug, info, warn};

/// Result of an update run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// No field changed; nothing was published.
    Unchanged,
    /// Dry run: the patched package was not published.
    DryRun {
        /// The patched package
        package: Package,
        /// The rendered commit message
        message: String,
    },
    /// The change was published.
    Published(PublishOutcome),
}

/// Updates one package in a tap.
pub struct Updater<'a, H: GitHost + ?Sized, C: ContentHasher + ?Sized> {
    config: UpdateConfig,
    host: &'a H,
    hasher: &'a C,
}

impl<'a, H: GitHost + ?Sized, C: ContentHasher + ?Sized> Updater<'a, H, C> {
    /// Creates an updater.
    #[must_use]
    pub const fn new(config: UpdateConfig, host: &'a H, hasher: &'a C) -> Self {
        Self {
            config,
            host,
            hasher,
        }
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &UpdateConfig {
        &self.config
    }

    /// Run the update.
    ///
    /// # Errors
    ///
    /// Returns the first error of validation, resolution or publishing. A
    /// failure before publishing leaves the tap untouched; a failure while
    /// publishing keeps whatever branch, fork or commit was already created.
    pub async fn run(&self) -> Result<UpdateOutcome> {
        self.config.validate()?;
        let config = &self.config;

        let tap = Tap::open(self.host, &config.tap).await?;
        let mut package = tap.package(config.package_type, &config.package).await?;

        let (version, assets) = self.resolve_release().await?;
        let checksums = ChecksumResolver::new(self.hasher)
            .resolve(
                &assets,
                &config.checksum_overrides(),
                &version,
                &config.package,
            )
            .await?;

        self.patch(&mut package, &version, assets.len(), &checksums);

        if !package.is_dirty() {
            warn!(
                path = %package.file_path(),
                "no changes were made to the package file"
            );
            return Ok(UpdateOutcome::Unchanged);
        }

        let message = format_message(
            &config.message,
            &config.package,
            package.file_path(),
            config.package_type,
            &version,
        );

        if config.dry_run {
            info!(
                path = %package.file_path(),
                version = %version,
                "Dry run: skipping publish"
            );
            return Ok(UpdateOutcome::DryRun { package, message });
        }

        debug!("publishing updated package");
        let outcome = tap
            .publish(&package, &message, &config.publish_options())
            .await?;
        info!(kind = outcome.kind(), url = %outcome.url(), "{outcome}");
        Ok(UpdateOutcome::Published(outcome))
    }

    /// Determine the version and the resolved assets.
    async fn resolve_release(&self) -> Result<(Version, Vec<ReleaseAsset>)> {
        let config = &self.config;
        let explicit = config.version.clone().map(Version::parse).transpose()?;

        if config.asset_patterns.is_empty() {
            let version = explicit.ok_or_else(|| Error::invalid_input("no version to update to"))?;
            return Ok((version, Vec::new()));
        }

        let (Some(repo), Some(tag)) = (&config.release_repo, &config.release_tag) else {
            return Err(Error::invalid_input(
                "asset patterns need a release repository and tag",
            ));
        };
        let map = AssetResolver::new(self.host)
            .resolve(repo, tag, &config.asset_patterns)
            .await?;
        let version = match explicit {
            Some(version) => version,
            None => map.version()?,
        };
        debug!(%version, asset_count = map.len(), "Resolved release");
        Ok((version, map.assets().cloned().collect()))
    }

    /// Write url, checksums and version into the manifest.
    fn patch(
        &self,
        package: &mut Package,
        version: &Version,
        asset_count: usize,
        checksums: &ChecksumSet,
    ) {
        if let Some(template) = self.config.url.as_deref().filter(|_| asset_count <= 1) {
            let url = version.render(template);
            debug!(%url, "updating url");
            package.set_field("url", &url, 0);
        }
        for (index, checksum) in checksums.checksums().enumerate() {
            debug!(index, %checksum, "updating sha256");
            package.set_field("sha256", checksum, index);
        }
        debug!(%version, "updating version");
        package.set_field("version", version.as_str(), 0);
    }
}
