use crate::auth::AuthConfig;
use crate::error::{ReleaseError, Result};
use crate::gate::DEFAULT_BRANCH_PATTERN;
use crate::version::ReleaseType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File the version entry lives in when nothing else is configured.
pub const DEFAULT_VERSION_FILE: &str = "gradle.properties";

/// Key of the version entry when nothing else is configured.
pub const DEFAULT_VERSION_KEY: &str = "version";

/// Remote pushed to during finalize when nothing else is configured.
pub const DEFAULT_REMOTE: &str = "origin";

const CONFIG_FILE_NAME: &str = "gitrelease.toml";

/// On-disk configuration (`gitrelease.toml`).
///
/// Every field is optional; the resolver layers these values between the
/// command line and the built-in defaults.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub release: ReleaseSection,

    #[serde(default)]
    pub auth: AuthSection,
}

/// `[release]` table of the config file.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ReleaseSection {
    pub version_file: Option<PathBuf>,
    pub version_key: Option<String>,
    pub required_branch_regex: Option<String>,
    pub tag_prefix: Option<String>,
    pub remote: Option<String>,
}

/// `[auth]` table of the config file.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AuthSection {
    pub username: Option<String>,
    pub password: Option<String>,
    pub ssh_private_key: Option<String>,
    pub ssh_private_key_file: Option<PathBuf>,
    pub ssh_passphrase: Option<String>,
}

/// Loads configuration from file or returns defaults.
///
/// Search order:
/// 1. Custom path provided as parameter
/// 2. `gitrelease.toml` in the current directory
/// 3. `gitrelease.toml` in the user config directory
/// 4. Default (empty) configuration if no file is found
pub fn load_config(config_path: Option<&Path>) -> Result<FileConfig> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        fs::read_to_string(CONFIG_FILE_NAME)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(FileConfig::default());
        }
    } else {
        return Ok(FileConfig::default());
    };

    toml::from_str(&config_str)
        .map_err(|e| ReleaseError::config(format!("Invalid configuration file: {}", e)))
}

/// Per-invocation overrides shared by both phases (usually CLI flags).
#[derive(Debug, Clone, Default)]
pub struct CommonOverrides {
    pub version_file: Option<PathBuf>,
    pub version_key: Option<String>,
    pub required_branch_regex: Option<String>,
}

/// Settings both phases need, resolved first-match-wins:
/// invocation override > config file > built-in default.
#[derive(Debug, Clone)]
pub struct CommonOptions {
    pub version_file: PathBuf,
    pub version_key: String,
    pub branch_pattern: String,
}

/// Resolved settings for the prepare phase.
#[derive(Debug, Clone)]
pub struct PrepareOptions {
    pub common: CommonOptions,
    pub release_type: ReleaseType,
    pub release_version: Option<String>,
    pub tag_prefix: String,
}

/// Resolved settings for the finalize phase.
#[derive(Debug, Clone)]
pub struct FinalizeOptions {
    pub common: CommonOptions,
    pub new_version: Option<String>,
    pub remote: String,
    pub auth: AuthConfig,
}

fn resolve_common(overrides: CommonOverrides, file: &FileConfig) -> CommonOptions {
    CommonOptions {
        version_file: overrides
            .version_file
            .or_else(|| file.release.version_file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_VERSION_FILE)),
        version_key: overrides
            .version_key
            .or_else(|| file.release.version_key.clone())
            .unwrap_or_else(|| DEFAULT_VERSION_KEY.to_string()),
        branch_pattern: overrides
            .required_branch_regex
            .or_else(|| file.release.required_branch_regex.clone())
            .unwrap_or_else(|| DEFAULT_BRANCH_PATTERN.to_string()),
    }
}

/// Resolves the prepare-phase options. `release_type` has no default and
/// must come from the invocation itself.
pub fn resolve_prepare(
    overrides: CommonOverrides,
    release_type: ReleaseType,
    release_version: Option<String>,
    tag_prefix: Option<String>,
    file: &FileConfig,
) -> PrepareOptions {
    PrepareOptions {
        common: resolve_common(overrides, file),
        release_type,
        release_version,
        tag_prefix: tag_prefix
            .or_else(|| file.release.tag_prefix.clone())
            .unwrap_or_default(),
    }
}

/// Resolves the finalize-phase options. Credential fields merge per-field:
/// an invocation value wins over the config file; there is no default.
pub fn resolve_finalize(
    overrides: CommonOverrides,
    new_version: Option<String>,
    remote: Option<String>,
    auth: AuthConfig,
    file: &FileConfig,
) -> FinalizeOptions {
    FinalizeOptions {
        common: resolve_common(overrides, file),
        new_version,
        remote: remote
            .or_else(|| file.release.remote.clone())
            .unwrap_or_else(|| DEFAULT_REMOTE.to_string()),
        auth: AuthConfig {
            username: auth.username.or_else(|| file.auth.username.clone()),
            password: auth.password.or_else(|| file.auth.password.clone()),
            ssh_private_key: auth
                .ssh_private_key
                .or_else(|| file.auth.ssh_private_key.clone()),
            ssh_private_key_file: auth
                .ssh_private_key_file
                .or_else(|| file.auth.ssh_private_key_file.clone()),
            ssh_passphrase: auth
                .ssh_passphrase
                .or_else(|| file.auth.ssh_passphrase.clone()),
        },
    }
}
