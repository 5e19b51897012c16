use crate::error::{ReleaseError, Result};
use crate::version::VersionString;
use regex::Regex;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// A version value bound to its location inside a tracked text file.
///
/// Loading records the byte span of the version text only, so saving can
/// splice the new version over that span and leave every other byte of the
/// file untouched, including quotes, spacing, and line structure.
#[derive(Debug)]
pub struct VersionFile {
    path: PathBuf,
    contents: String,
    span: Range<usize>,
    version: VersionString,
}

impl VersionFile {
    /// Loads a version file by scanning for a `key = value` line.
    ///
    /// The key may be separated from the value by `=` with arbitrary
    /// surrounding whitespace, and the value may be bare (`key=1.2.3`) or
    /// wrapped in single quotes (`key = '1.2.3'`). Only the version text
    /// itself is recorded for replacement, never the quote characters.
    ///
    /// # Arguments
    /// * `path` - Location of the file containing the version entry
    /// * `key` - The label preceding the version value (e.g., "version")
    ///
    /// # Returns
    /// * `Ok(VersionFile)` - File loaded and version parsed
    /// * `Err` - If the file cannot be read, no line matches the key, or
    ///   the matched value is not a valid version
    pub fn load(path: &Path, key: &str) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            ReleaseError::version_file(format!(
                "Unable to read version file {}: {}",
                path.display(),
                e
            ))
        })?;

        let pattern = format!(
            r"(?m)^\s*{}\s*=\s*'?(?P<version>\d+\.\d+\.\d+[^'\r\n]*?)'?\s*$",
            regex::escape(key)
        );
        let re = Regex::new(&pattern)
            .map_err(|e| ReleaseError::config(format!("Invalid version key '{}': {}", key, e)))?;

        let matched = re
            .captures(&contents)
            .and_then(|c| c.name("version"))
            .ok_or_else(|| {
                ReleaseError::version_file(format!(
                    "No version entry with key '{}' found in {}",
                    key,
                    path.display()
                ))
            })?;

        let span = matched.start()..matched.end();
        let version = VersionString::parse(matched.as_str())?;

        Ok(VersionFile {
            path: path.to_path_buf(),
            contents,
            span,
            version,
        })
    }

    /// The current in-memory version value.
    pub fn version(&self) -> &VersionString {
        &self.version
    }

    /// Mutable access for the release engine's bump rules.
    pub fn version_mut(&mut self) -> &mut VersionString {
        &mut self.version
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the file back with only the version substring replaced.
    pub fn save(&self) -> Result<()> {
        let mut updated = self.contents.clone();
        updated.replace_range(self.span.clone(), &self.version.to_string());
        fs::write(&self.path, updated).map_err(|e| {
            ReleaseError::version_file(format!(
                "Unable to write version file {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_bare_value() {
        let file = write_file("version=1.2.3\n");
        let vf = VersionFile::load(file.path(), "version").unwrap();
        assert_eq!(vf.version().to_string(), "1.2.3");
    }

    #[test]
    fn test_load_spaced_value() {
        let file = write_file("version = 1.2.3-SNAPSHOT\n");
        let vf = VersionFile::load(file.path(), "version").unwrap();
        assert_eq!(vf.version().to_string(), "1.2.3-SNAPSHOT");
    }

    #[test]
    fn test_load_single_quoted_value() {
        let file = write_file("version = '0.0.1'\n");
        let vf = VersionFile::load(file.path(), "version").unwrap();
        assert_eq!(vf.version().to_string(), "0.0.1");
    }

    #[test]
    fn test_load_custom_key() {
        let file = write_file("myProjectVersion = 2.0.0\n");
        let vf = VersionFile::load(file.path(), "myProjectVersion").unwrap();
        assert_eq!(vf.version().to_string(), "2.0.0");
    }

    #[test]
    fn test_load_missing_key() {
        let file = write_file("name=demo\n");
        let err = VersionFile::load(file.path(), "version").unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn test_load_invalid_value() {
        let file = write_file("version=abc\n");
        assert!(VersionFile::load(file.path(), "version").is_err());
    }

    #[test]
    fn test_save_replaces_only_version_text() {
        let file = write_file("some stuff\nversion=0.0.1\nsome other stuff\n");
        let mut vf = VersionFile::load(file.path(), "version").unwrap();
        vf.version_mut().replace_patch("2");
        vf.version_mut().replace_suffix("-SNAPSHOT");
        vf.save().unwrap();

        let contents = fs::read_to_string(file.path()).unwrap();
        assert_eq!(contents, "some stuff\nversion=0.0.2-SNAPSHOT\nsome other stuff\n");
    }

    #[test]
    fn test_save_preserves_quotes() {
        let file = write_file("key = '0.0.1'\ntrailing line\n");
        let mut vf = VersionFile::load(file.path(), "key").unwrap();
        vf.version_mut().replace_patch("2");
        vf.save().unwrap();

        let contents = fs::read_to_string(file.path()).unwrap();
        assert_eq!(contents, "key = '0.0.2'\ntrailing line\n");
    }

    #[test]
    fn test_save_preserves_surrounding_whitespace() {
        let file = write_file("  version   =   1.0.0   \n");
        let mut vf = VersionFile::load(file.path(), "version").unwrap();
        vf.version_mut().replace_minor("1");
        vf.save().unwrap();

        let contents = fs::read_to_string(file.path()).unwrap();
        assert_eq!(contents, "  version   =   1.1.0   \n");
    }

    #[test]
    fn test_key_must_match_whole_label() {
        // "version" must not match a line keyed "otherVersion"
        let file = write_file("otherVersion=9.9.9\nversion=1.0.0\n");
        let vf = VersionFile::load(file.path(), "version").unwrap();
        assert_eq!(vf.version().to_string(), "1.0.0");
    }
}
