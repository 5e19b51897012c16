use thiserror::Error;

/// Unified error type for git-release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Version file error: {0}")]
    VersionFile(String),

    #[error("Unable to release with uncommitted changes")]
    UncommittedChanges,

    #[error("Expected branch name to match pattern {pattern} but was {branch}")]
    BranchPolicy { pattern: String, branch: String },

    #[error("releaseVersion must be specified with a MANUAL release type")]
    MissingReleaseVersion,

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-release
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        ReleaseError::Version(msg.into())
    }

    /// Create a version file error with context
    pub fn version_file(msg: impl Into<String>) -> Self {
        ReleaseError::VersionFile(msg.into())
    }

    /// Create an authentication error with context
    pub fn auth(msg: impl Into<String>) -> Self {
        ReleaseError::Auth(msg.into())
    }
}
