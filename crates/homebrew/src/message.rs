//! Commit message templating.

use crate::package::PackageType;
use tapbump_release::Version;

/// Default commit message template.
pub const DEFAULT_MESSAGE: &str = "Update {{name}} to {{version}}";

/// Render a commit message template.
///
/// Supports `{{name}}`, `{{file}}` and `{{type}}` in addition to the
/// version placeholders understood by [`Version::render`].
#[must_use]
pub fn format_message(
    template: &str,
    name: &str,
    file_path: &str,
    package_type: PackageType,
    version: &Version,
) -> String {
    version
        .render(template)
        .replace("{{name}}", name)
        .replace("{{file}}", file_path)
        .replace("{{type}}", package_type.as_str())
}
