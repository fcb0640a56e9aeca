//! Homebrew package manifests.
//!
//! A [`Package`] holds the text of a formula or cask file. The text is never
//! parsed as Ruby; only lines of the form `<field> "<value>"` (or with single
//! quotes) are recognised, and a field patch rewrites just the quoted value.

use regex::Regex;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use tapbump_release::{Error, RemoteFile, Result};

/// The two package kinds a tap can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageType {
    /// A formula under `Formula/`
    Formula,
    /// A cask under `Casks/`
    Cask,
}

impl PackageType {
    /// Lowercase name, as used in commit messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Formula => "formula",
            Self::Cask => "cask",
        }
    }

    /// Path of the manifest for package `name` within the tap.
    #[must_use]
    pub fn manifest_path(self, name: &str) -> String {
        match self {
            Self::Formula => format!("Formula/{name}.rb"),
            Self::Cask => format!("Casks/{name}.rb"),
        }
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "formula" => Ok(Self::Formula),
            "cask" => Ok(Self::Cask),
            _ => Err(Error::invalid_input_with_help(
                format!("unknown type '{s}'"),
                "Expected 'formula' or 'cask'",
            )),
        }
    }
}

/// In-memory manifest text with dirtiness tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    file_path: String,
    original_content: String,
    content: String,
    blob: Option<String>,
}

impl Package {
    /// Creates a package from a path and its content.
    #[must_use]
    pub fn from_path(file_path: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            file_path: file_path.into(),
            original_content: content.clone(),
            content,
            blob: None,
        }
    }

    /// Creates a package from a file fetched from the tap, keeping its blob
    /// reference for the later commit.
    #[must_use]
    pub fn from_fetched_file(file: RemoteFile) -> Self {
        Self {
            file_path: file.path,
            original_content: file.content.clone(),
            content: file.content,
            blob: file.blob,
        }
    }

    /// Path of the manifest within the tap.
    #[must_use]
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// Current content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Blob reference of the fetched content, if any.
    #[must_use]
    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }

    /// Whether the content differs from what was loaded.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.content != self.original_content
    }

    /// Value of the first `name "<value>"` line, or an empty string.
    #[must_use]
    pub fn field(&self, name: &str) -> String {
        self.value_span(name, 0)
            .and_then(|span| self.content.get(span))
            .unwrap_or_default()
            .to_string()
    }

    /// Replace the quoted value of the `occurrence`-th (0-based) `name` line.
    ///
    /// Indentation, spacing and the quote character are kept. A missing
    /// occurrence leaves the content unchanged.
    pub fn set_field(&mut self, name: &str, value: &str, occurrence: usize) {
        if let Some(span) = self.value_span(name, occurrence) {
            self.content.replace_range(span, value);
        }
    }

    /// Byte range of the quoted value on the `occurrence`-th `name` line.
    fn value_span(&self, name: &str, occurrence: usize) -> Option<Range<usize>> {
        let regex = field_regex(name)?;
        let captures = regex.captures_iter(&self.content).nth(occurrence)?;
        captures
            .get(1)
            .or_else(|| captures.get(2))
            .map(|m| m.range())
    }
}

/// Line pattern: indentation, the field name, one or more spaces, then a
/// single- or double-quoted value without embedded quotes.
fn field_regex(name: &str) -> Option<Regex> {
    // The name is escaped, so compilation cannot fail on user input.
    Regex::new(&format!(
        r#"(?m)^[ \t]*{} +(?:"([^'"\n]+)"|'([^'"\n]+)')"#,
        regex::escape(name)
    ))
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FORMULA: &str = r#"class Foo < Formula
  desc "Foo tool"
  homepage "https://foo.dev"
  url "https://foo.dev/foo-1.2.2.tar.gz"
  version "1.2.2"
  sha256 "OLDHASH"
  license "MIT"
end
"#;

    const MULTI: &str = r#"class Foo < Formula
  on_macos do
    url "https://foo.dev/mac.zip"
    sha256 'MACHASH'
  end
  on_linux do
    url "https://foo.dev/linux.tgz"
    sha256  "LINUXHASH"
  end
end
"#;

    #[test]
    fn test_package_type_paths() {
        assert_eq!(PackageType::Formula.manifest_path("foo"), "Formula/foo.rb");
        assert_eq!(PackageType::Cask.manifest_path("foo"), "Casks/foo.rb");
    }

    #[test]
    fn test_package_type_parse() {
        assert_eq!("Formula".parse::<PackageType>().unwrap(), PackageType::Formula);
        assert_eq!("CASK".parse::<PackageType>().unwrap(), PackageType::Cask);
        assert!("bottle".parse::<PackageType>().is_err());
    }

    #[test]
    fn test_new_package_is_clean() {
        let package = Package::from_path("Formula/foo.rb", FORMULA);
        assert!(!package.is_dirty());
        assert!(package.blob().is_none());
    }

    #[test]
    fn test_from_fetched_file_keeps_blob() {
        let package = Package::from_fetched_file(RemoteFile {
            path: "Casks/foo.rb".to_string(),
            content: FORMULA.to_string(),
            blob: Some("abc".to_string()),
        });
        assert_eq!(package.file_path(), "Casks/foo.rb");
        assert_eq!(package.blob(), Some("abc"));
        assert!(!package.is_dirty());
    }

    #[test]
    fn test_field() {
        let package = Package::from_path("Formula/foo.rb", FORMULA);
        assert_eq!(package.field("version"), "1.2.2");
        assert_eq!(package.field("sha256"), "OLDHASH");
        assert_eq!(package.field("bottle"), "");
    }

    #[test]
    fn test_field_single_quotes() {
        let package = Package::from_path("Formula/foo.rb", MULTI);
        assert_eq!(package.field("sha256"), "MACHASH");
    }

    #[test]
    fn test_field_requires_space_after_name() {
        let package = Package::from_path("f.rb", "  version_scheme \"2\"\n  version \"1\"\n");
        assert_eq!(package.field("version"), "1");
    }

    #[test]
    fn test_set_field_changes_only_value() {
        let mut package = Package::from_path("Formula/foo.rb", FORMULA);
        package.set_field("sha256", "NEWHASH", 0);

        assert!(package.is_dirty());
        assert_eq!(package.content(), FORMULA.replace("OLDHASH", "NEWHASH"));
    }

    #[test]
    fn test_set_field_preserves_quote_and_spacing() {
        let mut package = Package::from_path("Formula/foo.rb", MULTI);
        package.set_field("sha256", "A", 0);
        package.set_field("sha256", "B", 1);

        assert!(package.content().contains("    sha256 'A'\n"));
        assert!(package.content().contains("    sha256  \"B\"\n"));
    }

    #[test]
    fn test_set_field_missing_occurrence_is_noop() {
        let mut package = Package::from_path("Formula/foo.rb", FORMULA);
        package.set_field("sha256", "NEWHASH", 1);
        package.set_field("bottle", "x", 0);
        assert!(!package.is_dirty());
        assert_eq!(package.content(), FORMULA);
    }

    #[test]
    fn test_set_same_value_stays_clean() {
        let mut package = Package::from_path("Formula/foo.rb", FORMULA);
        package.set_field("version", "1.2.2", 0);
        assert!(!package.is_dirty());
    }

    #[test]
    fn test_field_name_is_not_a_regex() {
        let mut package = Package::from_path("f.rb", "  a.b \"1\"\n  axb \"2\"\n");
        package.set_field("a.b", "9", 0);
        assert_eq!(package.content(), "  a.b \"9\"\n  axb \"2\"\n");
    }

    #[test]
    fn test_quoted_value_does_not_span_lines() {
        let package = Package::from_path("f.rb", "  url \"broken\n  url \"ok\"\n");
        assert_eq!(package.field("url"), "ok");
    }

    proptest! {
        /// Property: patching occurrence k leaves every other line byte-identical
        #[test]
        fn set_field_touches_only_target_line(
            values in prop::collection::vec("[A-Za-z0-9+/=]{1,16}", 1..6),
            filler in prop::collection::vec("[a-z ]{0,20}", 1..6),
            target in 0usize..6,
            replacement in "[A-Za-z0-9]{1,16}",
        ) {
            let mut lines = Vec::new();
            for (i, value) in values.iter().enumerate() {
                lines.push(format!("  # {}", filler[i % filler.len()]));
                lines.push(format!("  sha256 \"{value}\""));
            }
            let content = lines.join("\n");
            let mut package = Package::from_path("f.rb", content.clone());
            package.set_field("sha256", &replacement, target);

            let before: Vec<&str> = content.lines().collect();
            let after: Vec<&str> = package.content().lines().collect();
            prop_assert_eq!(before.len(), after.len());
            for (index, (old, new)) in before.iter().zip(&after).enumerate() {
                if target < values.len() && index == target * 2 + 1 {
                    prop_assert_eq!(new.to_string(), format!("  sha256 \"{replacement}\""));
                } else {
                    prop_assert_eq!(old, new);
                }
            }
        }
    }
}
