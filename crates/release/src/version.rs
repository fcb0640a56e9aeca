//! Release version values and template rendering.
//!
//! A [`Version`] keeps the raw string exactly as the user or the asset
//! pattern supplied it. No semantic-version grammar is enforced; the dotted
//! components are only consulted for the optional `{{major}}`, `{{minor}}`
//! and `{{patch}}` placeholders.

use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Placeholder replaced by the full version in templates.
pub const VERSION_PLACEHOLDER: &str = "{{version}}";

const PART_PLACEHOLDERS: [&str; 3] = ["{{major}}", "{{minor}}", "{{patch}}"];

/// A release version identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Version {
    raw: String,
}

impl Version {
    /// Parse a version string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidVersion`] if `raw` is empty.
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(Error::invalid_version(raw));
        }
        Ok(Self { raw })
    }

    /// The version exactly as supplied.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Dotted components after an optional leading `v`, cut at the first
    /// pre-release or build separator.
    fn parts(&self) -> Vec<&str> {
        let trimmed = self.raw.strip_prefix('v').unwrap_or(&self.raw);
        let core = trimmed.split(['-', '+']).next().unwrap_or(trimmed);
        core.split('.').filter(|p| !p.is_empty()).collect()
    }

    /// Render a template, substituting the version placeholders.
    ///
    /// Part placeholders with no corresponding component are left in place.
    /// The template is treated as plain text.
    #[must_use]
    pub fn render(&self, template: &str) -> String {
        let mut rendered = template.replace(VERSION_PLACEHOLDER, &self.raw);
        for (placeholder, part) in PART_PLACEHOLDERS.iter().zip(self.parts()) {
            rendered = rendered.replace(placeholder, part);
        }
        rendered
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_empty_is_rejected() {
        let err = Version::parse("").unwrap_err();
        assert!(matches!(err, Error::InvalidVersion { .. }));
    }

    #[test]
    fn test_parse_keeps_raw_form() {
        let version = Version::parse("v1.2.3-beta.1").unwrap();
        assert_eq!(version.to_string(), "v1.2.3-beta.1");
        assert_eq!(version.as_str(), "v1.2.3-beta.1");
    }

    #[test]
    fn test_parse_accepts_non_semver() {
        let version: Version = "2024-06-01_nightly".parse().unwrap();
        assert_eq!(version.to_string(), "2024-06-01_nightly");
    }

    #[test]
    fn test_render_replaces_every_placeholder() {
        let version = Version::parse("1.2.3").unwrap();
        assert_eq!(
            version.render("https://x.io/{{version}}/app-{{version}}.tgz"),
            "https://x.io/1.2.3/app-1.2.3.tgz"
        );
    }

    #[test]
    fn test_render_without_placeholder_is_unchanged() {
        let version = Version::parse("1.2.3").unwrap();
        assert_eq!(version.render("plain text"), "plain text");
    }

    #[test]
    fn test_render_parts() {
        let version = Version::parse("v10.4.1-rc1").unwrap();
        assert_eq!(version.render("{{major}}.{{minor}}/{{patch}}"), "10.4/1");
        assert_eq!(version.render("{{version}}"), "v10.4.1-rc1");
    }

    #[test]
    fn test_render_missing_part_left_in_place() {
        let version = Version::parse("7").unwrap();
        assert_eq!(version.render("{{major}}.{{minor}}"), "7.{{minor}}");
    }

    #[test]
    fn test_render_does_not_interpret_template() {
        let version = Version::parse("1.0").unwrap();
        assert_eq!(version.render("#{version} $(rm -rf /)"), "#{version} $(rm -rf /)");
    }

    #[test]
    fn test_serializes_as_string() {
        let version = Version::parse("3.1.4").unwrap();
        assert_eq!(serde_json::to_string(&version).unwrap(), "\"3.1.4\"");
    }

    proptest! {
        /// Property: parsing preserves any non-empty string verbatim
        #[test]
        fn parse_round_trips(raw in ".+") {
            let version = Version::parse(raw.clone()).unwrap();
            prop_assert_eq!(version.to_string(), raw);
        }

        /// Property: rendering a template without placeholders is idempotent
        #[test]
        fn render_is_idempotent_without_placeholders(
            raw in "[0-9a-z.]{1,12}",
            template in "[^{}]*",
        ) {
            let version = Version::parse(raw).unwrap();
            let once = version.render(&template);
            prop_assert_eq!(version.render(&once), once.clone());
            prop_assert_eq!(once, template);
        }
    }
}
