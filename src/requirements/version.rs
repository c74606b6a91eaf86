//! Version extraction and constraint checks.

use regex::Regex;
use semver::{Version, VersionReq};
use std::sync::LazyLock;

/// First dotted version number in tool output.
static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").expect("VERSION_REGEX must compile")
});

/// Extract the first `major.minor[.patch]` version from command output.
pub fn extract_version(output: &str) -> Option<String> {
    VERSION_REGEX
        .find(output)
        .map(|m| m.as_str().to_string())
}

/// Parse a tool version leniently: missing patch becomes 0, leading zeros are dropped.
pub fn parse_lenient(version: &str) -> Option<Version> {
    let caps = VERSION_REGEX.captures(version)?;
    let part = |i: usize| -> Option<u64> {
        caps.get(i)
            .map(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(Some(0))
    };
    Some(Version::new(part(1)?, part(2)?, part(3)?))
}

/// Whether `found` satisfies `required`.
///
/// No constraint always matches. A version that cannot be parsed is
/// accepted: the tool runs, and refusing it would trigger a reinstall loop.
pub fn satisfies(found: Option<&str>, required: Option<&VersionReq>) -> bool {
    let Some(required) = required else {
        return true;
    };
    match found.and_then(parse_lenient) {
        Some(version) => required.matches(&version),
        None => {
            tracing::debug!("Version unknown, accepting against {}", required);
            true
        }
    }
}
