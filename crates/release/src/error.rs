//! Error types for release resolution and publishing operations.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for tapbump operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed collaborator error, kept verbatim as the `source` of [`Error::Host`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while resolving a release or updating a tap.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// A required input is missing or inputs contradict each other.
    #[error("Invalid input: {message}")]
    #[diagnostic(code(tapbump::invalid_input))]
    InvalidInput {
        /// The error message
        message: String,
        /// Help text for the user
        #[help]
        help: Option<String>,
    },

    /// A version string could not be parsed.
    #[error("Invalid version: '{version}'")]
    #[diagnostic(
        code(tapbump::invalid_version),
        help("Supply a non-empty version, or an asset pattern with a version capture group")
    )]
    InvalidVersion {
        /// The rejected version string
        version: String,
    },

    /// A download URL uses a scheme other than `http` or `https`.
    #[error("Unknown scheme type in URL '{url}'")]
    #[diagnostic(
        code(tapbump::unsupported_scheme),
        help("Only http:// and https:// URLs can be downloaded")
    )]
    UnsupportedScheme {
        /// The rejected URL
        url: String,
    },

    /// The server answered a download with a non-2xx status.
    #[error("Download failed with status {status}: {url}")]
    #[diagnostic(code(tapbump::download))]
    Download {
        /// The URL being downloaded
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The connection failed while downloading.
    #[error("Download of '{url}' failed: {source}")]
    #[diagnostic(code(tapbump::transport))]
    Transport {
        /// The URL being downloaded
        url: String,
        /// The underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// One or more asset patterns matched no release asset.
    #[error("No release asset matched: {}", patterns.join(", "))]
    #[diagnostic(
        code(tapbump::asset_not_found),
        help("Check the asset patterns against the asset names of the release")
    )]
    AssetNotFound {
        /// Every pattern that failed to match
        patterns: Vec<String>,
    },

    /// An asset pattern matched more than one release asset.
    #[error("Asset pattern '{pattern}' matched more than one asset: {}", assets.join(", "))]
    #[diagnostic(
        code(tapbump::ambiguous_asset),
        help("Make the pattern specific enough to match exactly one asset")
    )]
    AmbiguousAsset {
        /// The ambiguous pattern
        pattern: String,
        /// Names of all matching assets
        assets: Vec<String>,
    },

    /// Asset resolution produced no assets at all.
    #[error("No release assets were resolved")]
    #[diagnostic(code(tapbump::no_assets_resolved))]
    NoAssetsResolved,

    /// The version could not be extracted from the designated asset name.
    #[error("Could not extract a version from asset '{asset_name}' using pattern '{pattern}'")]
    #[diagnostic(
        code(tapbump::version_extraction),
        help("Add a capture group named 'version', or an unnamed capture group, to the first asset pattern")
    )]
    VersionExtraction {
        /// Name of the matched asset
        asset_name: String,
        /// The designated pattern
        pattern: String,
    },

    /// No checksum could be resolved from the supplied inputs.
    #[error("Unable to resolve a checksum")]
    #[diagnostic(
        code(tapbump::checksum_resolution),
        help(
            "Supply an explicit checksum for a single asset, an explicit URL for a single asset, or one or more asset patterns without overrides"
        )
    )]
    ChecksumResolution,

    /// A hosted-VCS operation failed.
    ///
    /// Side effects of earlier operations in the same run (a created branch,
    /// fork or commit) are not rolled back.
    #[error("{operation} failed: {source}")]
    #[diagnostic(code(tapbump::host))]
    Host {
        /// The operation that failed
        operation: String,
        /// The collaborator error, unmodified
        #[source]
        source: BoxError,
    },
}

impl Error {
    /// Create a new invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new invalid input error with help text.
    #[must_use]
    pub fn invalid_input_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a new invalid version error.
    #[must_use]
    pub fn invalid_version(version: impl Into<String>) -> Self {
        Self::InvalidVersion {
            version: version.into(),
        }
    }

    /// Create a new unsupported scheme error.
    #[must_use]
    pub fn unsupported_scheme(url: impl Into<String>) -> Self {
        Self::UnsupportedScheme { url: url.into() }
    }

    /// Create a new download error.
    #[must_use]
    pub fn download(url: impl Into<String>, status: u16) -> Self {
        Self::Download {
            url: url.into(),
            status,
        }
    }

    /// Create a new transport error.
    #[must_use]
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Create a new version extraction error.
    #[must_use]
    pub fn version_extraction(asset_name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::VersionExtraction {
            asset_name: asset_name.into(),
            pattern: pattern.into(),
        }
    }

    /// Wrap a collaborator failure.
    #[must_use]
    pub fn host(operation: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Host {
            operation: operation.into(),
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_error() {
        let err = Error::invalid_input("missing tap");
        assert!(err.to_string().contains("missing tap"));
    }

    #[test]
    fn test_invalid_input_with_help() {
        let err = Error::invalid_input_with_help("bad type", "use formula or cask");
        let help = err.help().map(|h| h.to_string());
        assert_eq!(help.as_deref(), Some("use formula or cask"));
    }

    #[test]
    fn test_download_error_carries_status() {
        let err = Error::download("https://example.com/a.tgz", 404);
        assert!(matches!(err, Error::Download { status: 404, .. }));
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_asset_not_found_lists_every_pattern() {
        let err = Error::AssetNotFound {
            patterns: vec!["linux".to_string(), "mac".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("linux"));
        assert!(msg.contains("mac"));
    }

    #[test]
    fn test_checksum_resolution_help_names_combinations() {
        let help = Error::ChecksumResolution
            .help()
            .map(|h| h.to_string())
            .unwrap_or_default();
        assert!(help.contains("explicit checksum"));
        assert!(help.contains("explicit URL"));
        assert!(help.contains("asset patterns"));
    }

    #[test]
    fn test_host_error_keeps_source() {
        let io = std::io::Error::other("connection reset");
        let err = Error::host("create pull request", io);
        assert!(err.to_string().starts_with("create pull request failed"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_error_debug() {
        let err = Error::NoAssetsResolved;
        let debug = format!("{err:?}");
        assert!(debug.contains("NoAssetsResolved"));
    }
}
