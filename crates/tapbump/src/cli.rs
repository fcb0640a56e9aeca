//! Command-line interface.
//!
//! Every option falls back to the matching GitHub Actions input variable
//! (`INPUT_<NAME>`), so the binary runs unchanged as an action step. Empty
//! values count as unset, the way the Actions runner passes omitted inputs.

use crate::logging::{LogLevel, TracingConfig, TracingFormat};
use clap::Parser;
use tapbump_homebrew::{PackageType, TapRef, UpdateConfig};
use tapbump_release::{Error, RepoRef, Result};

const TAG_REF_PREFIX: &str = "refs/tags/";

/// Update a Homebrew formula or cask to a new release.
#[derive(Parser, Debug)]
#[command(name = "tapbump")]
#[command(about = "Update a Homebrew formula or cask to a new release")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// Tap as `owner/repo[:branch]`; `homebrew-` is prefixed to the repo when missing.
    #[arg(long, env = "INPUT_TAP")]
    pub tap: String,

    /// Tap branch, when not given in `--tap`.
    #[arg(long, env = "INPUT_BRANCH")]
    pub branch: Option<String>,

    /// Formula or cask name.
    #[arg(long, env = "INPUT_NAME")]
    pub name: String,

    /// Package type: `formula` or `cask`.
    #[arg(long = "type", env = "INPUT_TYPE", default_value = "formula")]
    pub package_type: String,

    /// Version to update to; derived from the first asset when omitted.
    #[arg(id = "release_version", long = "release-version", env = "INPUT_VERSION")]
    pub version: Option<String>,

    /// Checksum to write, skipping the download.
    #[arg(long = "sha256", env = "INPUT_SHA256")]
    pub checksum: Option<String>,

    /// Download URL template, e.g. `https://example.com/foo-{{version}}.tgz`.
    #[arg(long, env = "INPUT_URL")]
    pub url: Option<String>,

    /// Release asset name pattern (repeatable, or newline separated).
    #[arg(long = "asset", env = "INPUT_ASSETS", value_delimiter = '\n')]
    pub assets: Vec<String>,

    /// Repository holding the release, as `owner/repo`.
    #[arg(long, env = "INPUT_RELEASE_REPO")]
    pub release_repo: Option<String>,

    /// Tag of the release.
    #[arg(long, env = "INPUT_RELEASE_TAG")]
    pub release_tag: Option<String>,

    /// Commit message template.
    #[arg(long, env = "INPUT_MESSAGE")]
    pub message: Option<String>,

    /// Always publish through a pull request.
    #[arg(long = "force-pr", env = "INPUT_FORCE_PR")]
    pub force_pull_request: bool,

    /// Organisation to fork the tap into when the token cannot push.
    #[arg(long, env = "INPUT_FORK_OWNER")]
    pub fork_owner: Option<String>,

    /// GitHub token.
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Resolve and patch, print the result, but do not publish.
    #[arg(long, env = "TAPBUMP_DRY_RUN")]
    pub dry_run: bool,

    /// Log output format.
    #[arg(long, env = "TAPBUMP_LOG_FORMAT", default_value = "compact", value_enum)]
    pub log_format: TracingFormat,

    /// Logging verbosity level.
    #[arg(long, env = "TAPBUMP_LOG_LEVEL", default_value = "info", value_enum)]
    pub log_level: LogLevel,

    #[arg(long, env = "GITHUB_REPOSITORY", hide = true)]
    pub github_repository: Option<String>,

    #[arg(long, env = "GITHUB_REF", hide = true)]
    pub github_ref: Option<String>,

    #[arg(long, env = "GITHUB_TOKEN", hide = true, hide_env_values = true)]
    pub github_token: Option<String>,
}

/// `Some` only for a value with non-whitespace content.
fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl Cli {
    /// Tracing settings from the log flags.
    #[must_use]
    pub fn tracing_config(&self) -> TracingConfig {
        TracingConfig {
            format: self.log_format,
            level: self.log_level.into(),
        }
    }

    /// The token, preferring `--token` over `GITHUB_TOKEN`.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        non_empty(self.token.as_deref()).or_else(|| non_empty(self.github_token.as_deref()))
    }

    /// Release repository, falling back to the workflow's repository.
    fn release_repository(&self) -> Result<Option<RepoRef>> {
        non_empty(self.release_repo.as_deref())
            .or_else(|| non_empty(self.github_repository.as_deref()))
            .map(|repo| RepoRef::parse(&repo))
            .transpose()
    }

    /// Release tag, falling back to the tag of a tag-triggered workflow.
    fn release_tag(&self) -> Option<String> {
        non_empty(self.release_tag.as_deref()).or_else(|| {
            self.github_ref
                .as_deref()
                .and_then(|r| r.strip_prefix(TAG_REF_PREFIX))
                .and_then(|tag| non_empty(Some(tag)))
        })
    }

    /// Convert the parsed arguments into an update configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a malformed tap, package type or
    /// release repository.
    pub fn into_config(&self) -> Result<UpdateConfig> {
        let tap = TapRef::parse(self.tap.trim())?.or_branch(non_empty(self.branch.as_deref()));
        let package_type: PackageType = self.package_type.trim().parse()?;
        let name = non_empty(Some(self.name.as_str()))
            .ok_or_else(|| Error::invalid_input("package name is required"))?;

        let mut config = UpdateConfig::new(tap, name, package_type)
            .with_asset_patterns(
                self.assets
                    .iter()
                    .filter_map(|pattern| non_empty(Some(pattern.as_str()))),
            )
            .with_force_pull_request(self.force_pull_request)
            .with_dry_run(self.dry_run);

        if let Some(version) = non_empty(self.version.as_deref()) {
            config = config.with_version(version);
        }
        if let Some(checksum) = non_empty(self.checksum.as_deref()) {
            config = config.with_checksum(checksum);
        }
        if let Some(url) = non_empty(self.url.as_deref()) {
            config = config.with_url(url);
        }
        if let Some(message) = non_empty(self.message.as_deref()) {
            config = config.with_message(message);
        }
        if let Some(owner) = non_empty(self.fork_owner.as_deref()) {
            config = config.with_fork_owner(owner);
        }
        config.release_repo = self.release_repository()?;
        config.release_tag = self.release_tag();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, error::ErrorKind};
    use tapbump_homebrew::DEFAULT_MESSAGE;

    const ENV_VARS: [&str; 16] = [
        "INPUT_TAP",
        "INPUT_BRANCH",
        "INPUT_NAME",
        "INPUT_TYPE",
        "INPUT_VERSION",
        "INPUT_SHA256",
        "INPUT_URL",
        "INPUT_ASSETS",
        "INPUT_RELEASE_REPO",
        "INPUT_RELEASE_TAG",
        "INPUT_MESSAGE",
        "INPUT_FORCE_PR",
        "INPUT_FORK_OWNER",
        "INPUT_TOKEN",
        "GITHUB_REPOSITORY",
        "GITHUB_REF",
    ];

    /// Run `f` with every input variable cleared, then `vars` applied.
    fn with_env<R>(vars: &[(&str, &str)], f: impl FnOnce() -> R) -> R {
        let cleared = ENV_VARS.iter().chain(&[
            "GITHUB_TOKEN",
            "TAPBUMP_DRY_RUN",
            "TAPBUMP_LOG_FORMAT",
            "TAPBUMP_LOG_LEVEL",
        ]);
        let mut all: Vec<(&str, Option<&str>)> = cleared
            .filter(|key| !vars.iter().any(|(k, _)| k == *key))
            .map(|key| (*key, None))
            .collect();
        all.extend(vars.iter().map(|(k, v)| (*k, Some(*v))));
        temp_env::with_vars(all, f)
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tapbump").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_command_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_flag_prints_program_version() {
        with_env(&[], || {
            let err = Cli::try_parse_from(["tapbump", "--version"]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::DisplayVersion);
        });
    }

    #[test]
    fn test_flags_build_config() {
        with_env(&[], || {
            let cli = parse(&[
                "--tap",
                "octo/tap:stable",
                "--name",
                "foo",
                "--type",
                "Cask",
                "--release-version",
                "1.2.3",
                "--sha256",
                "abc",
                "--force-pr",
            ]);
            let config = cli.into_config().unwrap();

            assert_eq!(config.tap.repo, RepoRef::new("octo", "homebrew-tap"));
            assert_eq!(config.tap.branch.as_deref(), Some("stable"));
            assert_eq!(config.package_type, PackageType::Cask);
            assert_eq!(config.version.as_deref(), Some("1.2.3"));
            assert_eq!(config.checksum.as_deref(), Some("abc"));
            assert_eq!(config.message, DEFAULT_MESSAGE);
            assert!(config.force_pull_request);
            assert!(config.validate().is_ok());
        });
    }

    #[test]
    fn test_action_inputs_from_env() {
        with_env(
            &[
                ("INPUT_TAP", "octo/homebrew-tap"),
                ("INPUT_BRANCH", "develop"),
                ("INPUT_NAME", "foo"),
                ("INPUT_TYPE", "formula"),
                ("INPUT_VERSION", ""),
                ("INPUT_SHA256", ""),
                ("INPUT_URL", ""),
                ("INPUT_ASSETS", "linux-(?<version>[0-9.]+)\n\nmacos"),
                ("INPUT_FORCE_PR", "false"),
                ("INPUT_MESSAGE", ""),
                ("GITHUB_REPOSITORY", "octo/foo"),
                ("GITHUB_REF", "refs/tags/v1.0.0"),
            ],
            || {
                let config = parse(&[]).into_config().unwrap();

                assert_eq!(config.tap.branch.as_deref(), Some("develop"));
                assert_eq!(config.version, None);
                assert_eq!(config.checksum, None);
                assert_eq!(config.url, None);
                assert_eq!(config.asset_patterns, ["linux-(?<version>[0-9.]+)", "macos"]);
                assert_eq!(config.release_repo, Some(RepoRef::new("octo", "foo")));
                assert_eq!(config.release_tag.as_deref(), Some("v1.0.0"));
                assert!(!config.force_pull_request);
                assert_eq!(config.message, DEFAULT_MESSAGE);
                assert!(config.validate().is_ok());
            },
        );
    }

    #[test]
    fn test_tap_branch_wins_over_branch_input() {
        with_env(&[("INPUT_BRANCH", "develop")], || {
            let config = parse(&["--tap", "octo/tap:main", "--name", "foo", "--release-version", "1"])
                .into_config()
                .unwrap();
            assert_eq!(config.tap.branch.as_deref(), Some("main"));
        });
    }

    #[test]
    fn test_explicit_release_wins_over_workflow() {
        with_env(
            &[
                ("GITHUB_REPOSITORY", "octo/tap-ci"),
                ("GITHUB_REF", "refs/tags/v0.0.1"),
            ],
            || {
                let config = parse(&[
                    "--tap",
                    "octo/tap",
                    "--name",
                    "foo",
                    "--asset",
                    "linux",
                    "--release-repo",
                    "octo/foo",
                    "--release-tag",
                    "v2",
                ])
                .into_config()
                .unwrap();
                assert_eq!(config.release_repo, Some(RepoRef::new("octo", "foo")));
                assert_eq!(config.release_tag.as_deref(), Some("v2"));
            },
        );
    }

    #[test]
    fn test_branch_ref_is_not_a_tag() {
        with_env(&[("GITHUB_REF", "refs/heads/main")], || {
            let cli = parse(&["--tap", "octo/tap", "--name", "foo", "--asset", "x"]);
            let config = cli.into_config().unwrap();
            assert_eq!(config.release_tag, None);
            assert!(config.validate().is_err());
        });
    }

    #[test]
    fn test_token_fallback() {
        with_env(&[("GITHUB_TOKEN", "gh-token")], || {
            let cli = parse(&["--tap", "o/t", "--name", "foo"]);
            assert_eq!(cli.token().as_deref(), Some("gh-token"));
            let cli = parse(&["--tap", "o/t", "--name", "foo", "--token", "mine"]);
            assert_eq!(cli.token().as_deref(), Some("mine"));
        });
    }

    #[test]
    fn test_invalid_type_rejected() {
        with_env(&[], || {
            let err = parse(&["--tap", "o/t", "--name", "foo", "--type", "bottle"])
                .into_config()
                .unwrap_err();
            assert!(matches!(err, Error::InvalidInput { .. }));
        });
    }

    #[test]
    fn test_malformed_tap_rejected() {
        with_env(&[], || {
            let err = parse(&["--tap", "just-a-name", "--name", "foo"])
                .into_config()
                .unwrap_err();
            assert!(matches!(err, Error::InvalidInput { .. }));
        });
    }

    #[test]
    fn test_log_flags() {
        with_env(&[("TAPBUMP_LOG_FORMAT", "json")], || {
            let cli = parse(&["--tap", "o/t", "--name", "foo", "--log-level", "debug"]);
            let config = cli.tracing_config();
            assert_eq!(config.format, TracingFormat::Json);
            assert_eq!(config.level, tracing::Level::DEBUG);
        });
    }
}
