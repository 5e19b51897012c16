//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the git operations
//! the release engine needs, allowing for multiple implementations
//! including real repositories and recording fakes for contract tests.
//!
//! The primary abstraction is the [Repository] trait. Concrete
//! implementations:
//!
//! - [repository::Git2Repository]: a real implementation using the `git2` crate
//! - [mock::MockRepository]: an in-memory implementation for testing
//!
//! Engine code depends on the trait only, so the prepare/finalize state
//! machines can be exercised without touching a working tree or a network.

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::auth::AuthMode;
use crate::error::Result;
use std::path::Path;

/// Outcome of a single push invocation, kept for result logging.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PushSummary {
    /// URL of the remote that was pushed to
    pub remote_url: String,
    /// The refspecs that were sent
    pub refspecs: Vec<String>,
    /// Per-ref results: (refname, server status message if rejected)
    pub ref_updates: Vec<(String, Option<String>)>,
    /// Sideband/progress messages reported by the server, if any
    pub messages: Vec<String>,
}

/// Common git operation trait for the release workflow.
///
/// Implementations must be `Send + Sync`. All methods return
/// [crate::error::Result] so git-level failures surface as
/// [crate::error::ReleaseError::Git] with the failing operation's context.
pub trait Repository: Send + Sync {
    /// Name of the currently checked-out branch (e.g., "main").
    fn current_branch(&self) -> Result<String>;

    /// Whether the working tree has any staged or unstaged change to a
    /// tracked file. Untracked files do not count.
    fn has_uncommitted_changes(&self) -> Result<bool>;

    /// Stage a single path. Absolute paths are resolved against the
    /// repository working directory.
    fn stage(&self, path: &Path) -> Result<()>;

    /// Commit the index with the given message using the default signature.
    fn commit(&self, message: &str) -> Result<()>;

    /// Create an annotated tag on HEAD with the given name and message.
    fn tag_annotated(&self, name: &str, message: &str) -> Result<()>;

    /// Configure upstream tracking for `branch`: sets the branch's remote
    /// and its merge ref to `refs/heads/<branch>`.
    fn set_upstream(&self, branch: &str, remote: &str) -> Result<()>;

    /// Push `branch` to `remote` (never forced) using the given credentials.
    fn push_branch(&self, branch: &str, remote: &str, auth: &AuthMode) -> Result<PushSummary>;

    /// Push all tags to `remote`. When `force` is set the tag refspecs are
    /// forced so re-running a release can overwrite an existing tag.
    fn push_tags(&self, remote: &str, auth: &AuthMode, force: bool) -> Result<PushSummary>;

    /// URL configured for `remote`, if the remote exists.
    fn remote_url(&self, remote: &str) -> Result<Option<String>>;
}
