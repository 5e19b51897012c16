use crate::error::{ReleaseError, Result};
use std::path::PathBuf;
use std::process::Command;

/// Raw authentication parameters as supplied by the CLI or config file.
///
/// The fields are mutually constrained: validation derives exactly one
/// [AuthMode] or rejects the combination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub ssh_private_key: Option<String>,
    pub ssh_private_key_file: Option<PathBuf>,
    pub ssh_passphrase: Option<String>,
}

/// Authentication mode derived from a validated [AuthConfig].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// No credentials; anonymous or default transport
    None,
    /// HTTPS username/password credentials
    UsernamePassword { username: String, password: String },
    /// SSH with inline private key material
    SshKey {
        key: String,
        passphrase: Option<String>,
    },
    /// SSH with a private key loaded from a file
    SshKeyFile {
        path: PathBuf,
        passphrase: Option<String>,
    },
}

impl AuthConfig {
    /// Validates the credential combination and derives the transport mode.
    ///
    /// Exactly one of username/password, inline key, or key file may be in
    /// effect; a passphrase requires one of the key forms. Every rejected
    /// combination names the conflicting parameters.
    pub fn validate(&self) -> Result<AuthMode> {
        if let Some(username) = &self.username {
            let password = self.password.as_ref().ok_or_else(|| {
                ReleaseError::auth("Git repository username is set but not Git password")
            })?;

            if self.ssh_private_key.is_some()
                || self.ssh_private_key_file.is_some()
                || self.ssh_passphrase.is_some()
            {
                return Err(ReleaseError::auth(
                    "Both username/password and SSH authentication parameters cannot be set",
                ));
            }

            return Ok(AuthMode::UsernamePassword {
                username: username.clone(),
                password: password.clone(),
            });
        }

        if self.password.is_some() {
            return Err(ReleaseError::auth(
                "Git repository password is set but not Git username",
            ));
        }

        if self.ssh_passphrase.is_some()
            && self.ssh_private_key.is_none()
            && self.ssh_private_key_file.is_none()
        {
            return Err(ReleaseError::auth(
                "SSH passphrase is set but not the SSH private key",
            ));
        }

        if let Some(key) = &self.ssh_private_key {
            if self.ssh_private_key_file.is_some() {
                return Err(ReleaseError::auth(
                    "Both SSH private key and SSH private key file parameters cannot be set",
                ));
            }

            return Ok(AuthMode::SshKey {
                key: key.clone(),
                passphrase: self.ssh_passphrase.clone(),
            });
        }

        if let Some(path) = &self.ssh_private_key_file {
            return Ok(AuthMode::SshKeyFile {
                path: path.clone(),
                passphrase: self.ssh_passphrase.clone(),
            });
        }

        Ok(AuthMode::None)
    }
}

/// Source of known-hosts data for SSH host-key checks.
///
/// The push step consults this when the transport presents a host key. If
/// no data can be produced the push fails with a transport error; the data
/// itself is trusted as returned, with no further anchor.
pub trait KnownHostsSource: Send + Sync {
    /// Fetch known-hosts entries for `host`.
    fn scan(&self, host: &str) -> Result<String>;
}

/// Obtains known-hosts data by shelling out to `ssh-keyscan`.
pub struct SshKeyscan;

impl KnownHostsSource for SshKeyscan {
    fn scan(&self, host: &str) -> Result<String> {
        let output = Command::new("ssh-keyscan")
            .arg("-H")
            .arg(host)
            .output()
            .map_err(|e| {
                ReleaseError::auth(format!("Failed to execute ssh-keyscan for {}: {}", host, e))
            })?;

        if !output.status.success() {
            return Err(ReleaseError::auth(format!(
                "ssh-keyscan for {} failed with exit code {}",
                host,
                output.status.code().unwrap_or(-1)
            )));
        }

        let data = String::from_utf8_lossy(&output.stdout).to_string();
        if data.trim().is_empty() {
            return Err(ReleaseError::auth(format!(
                "ssh-keyscan produced no host keys for {}",
                host
            )));
        }

        Ok(data)
    }
}
