use crate::error::{ReleaseError, Result};
use regex::Regex;
use std::fmt;

/// Pattern shared by version-file values and command-line version overrides.
///
/// The suffix group is deliberately open-ended so pre-release markers like
/// `-SNAPSHOT` or `-r` survive a round trip untouched.
pub const VERSION_PATTERN: &str = r"(\d+)\.(\d+)\.(\d+)(.*)";

/// The development suffix appended after a release is finalized.
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// A semantic version whose components are kept as the original text.
///
/// Components are stored as the digit sequences that were matched, not as
/// numbers, so saving a version never reformats what the user wrote
/// (`01.2.3` stays `01.2.3` until a bump touches that component).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionString {
    major: String,
    minor: String,
    patch: String,
    suffix: String,
}

impl VersionString {
    /// Parses a version from text matching `major.minor.patch[suffix]`.
    ///
    /// # Arguments
    /// * `text` - Version text (e.g., "1.2.3" or "0.0.1-SNAPSHOT")
    ///
    /// # Returns
    /// * `Ok(VersionString)` - Successfully parsed version
    /// * `Err` - If the text does not match the version pattern
    pub fn parse(text: &str) -> Result<Self> {
        let re = version_regex()?;
        let captures = re.captures(text).ok_or_else(|| {
            ReleaseError::version(format!(
                "The version of {} does not match the pattern {}",
                text, VERSION_PATTERN
            ))
        })?;

        Ok(VersionString {
            major: captures[1].to_string(),
            minor: captures[2].to_string(),
            patch: captures[3].to_string(),
            suffix: captures[4].to_string(),
        })
    }

    pub fn major(&self) -> &str {
        &self.major
    }

    pub fn minor(&self) -> &str {
        &self.minor
    }

    pub fn patch(&self) -> &str {
        &self.patch
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Numeric value of the major component.
    pub fn major_number(&self) -> Result<u64> {
        parse_component("major", &self.major)
    }

    /// Numeric value of the minor component.
    pub fn minor_number(&self) -> Result<u64> {
        parse_component("minor", &self.minor)
    }

    /// Numeric value of the patch component.
    pub fn patch_number(&self) -> Result<u64> {
        parse_component("patch", &self.patch)
    }

    /// Replace the major component. No other component is touched.
    pub fn replace_major(&mut self, value: impl Into<String>) {
        self.major = value.into();
    }

    /// Replace the minor component. No other component is touched.
    pub fn replace_minor(&mut self, value: impl Into<String>) {
        self.minor = value.into();
    }

    /// Replace the patch component. No other component is touched.
    pub fn replace_patch(&mut self, value: impl Into<String>) {
        self.patch = value.into();
    }

    /// Replace the suffix. The value must carry its own separator
    /// (e.g., "-SNAPSHOT"), or be empty to clear it.
    pub fn replace_suffix(&mut self, value: impl Into<String>) {
        self.suffix = value.into();
    }

    /// Wholesale replacement of all four components from another parsed
    /// version. Used by MANUAL releases and finalize overrides.
    pub fn replace_all(&mut self, other: &VersionString) {
        self.major = other.major.clone();
        self.minor = other.minor.clone();
        self.patch = other.patch.clone();
        self.suffix = other.suffix.clone();
    }
}

impl fmt::Display for VersionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}{}", self.major, self.minor, self.patch, self.suffix)
    }
}

/// Compiles the shared version pattern, anchored at the start of the text.
pub fn version_regex() -> Result<Regex> {
    Regex::new(&format!("^{}", VERSION_PATTERN))
        .map_err(|e| ReleaseError::version(format!("Invalid version pattern: {}", e)))
}

fn parse_component(name: &str, value: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .map_err(|_| ReleaseError::version(format!("Invalid {} version: {}", name, value)))
}

/// The category of version bump requested for a prepared release.
///
/// There is no default: the caller must supply one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReleaseType {
    Major,
    Minor,
    Patch,
    Manual,
}
