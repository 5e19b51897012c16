use crate::auth::AuthMode;
use crate::error::{ReleaseError, Result};
use crate::git::{PushSummary, Repository};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// Mock repository for testing without actual git operations.
///
/// Records every mutating call in order, so contract tests can assert the
/// exact sequence of staged paths, commit messages, tag names, and pushes
/// the release engine performs. A single operation can be armed to fail to
/// exercise the abort-without-rollback paths.
pub struct MockRepository {
    branch: String,
    dirty: bool,
    remote_urls: HashMap<String, String>,
    fail_on: Option<String>,
    log: Mutex<Vec<String>>,
}

impl MockRepository {
    /// Create a clean mock repository on branch "main"
    pub fn new() -> Self {
        MockRepository {
            branch: "main".to_string(),
            dirty: false,
            remote_urls: HashMap::new(),
            fail_on: None,
            log: Mutex::new(Vec::new()),
        }
    }

    /// Set the current branch name
    pub fn set_branch(&mut self, branch: impl Into<String>) {
        self.branch = branch.into();
    }

    /// Mark the working tree as having uncommitted changes
    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    /// Configure a remote URL
    pub fn add_remote(&mut self, name: impl Into<String>, url: impl Into<String>) {
        self.remote_urls.insert(name.into(), url.into());
    }

    /// Arm a single operation ("commit", "tag", "push-branch", ...) to fail
    pub fn fail_on(&mut self, operation: impl Into<String>) {
        self.fail_on = Some(operation.into());
    }

    /// The ordered log of mutating operations performed so far
    pub fn operations(&self) -> Vec<String> {
        self.lock_log().clone()
    }

    fn lock_log(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.log.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, operation: &str, entry: String) -> Result<()> {
        if self.fail_on.as_deref() == Some(operation) {
            return Err(ReleaseError::Git(git2::Error::from_str(&format!(
                "simulated {} failure",
                operation
            ))));
        }

        self.lock_log().push(entry);
        Ok(())
    }

    fn describe_auth(auth: &AuthMode) -> &'static str {
        match auth {
            AuthMode::None => "none",
            AuthMode::UsernamePassword { .. } => "userpass",
            AuthMode::SshKey { .. } => "ssh-key",
            AuthMode::SshKeyFile { .. } => "ssh-key-file",
        }
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn current_branch(&self) -> Result<String> {
        Ok(self.branch.clone())
    }

    fn has_uncommitted_changes(&self) -> Result<bool> {
        Ok(self.dirty)
    }

    fn stage(&self, path: &Path) -> Result<()> {
        self.record("stage", format!("stage:{}", path.display()))
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.record("commit", format!("commit:{}", message))
    }

    fn tag_annotated(&self, name: &str, message: &str) -> Result<()> {
        self.record("tag", format!("tag:{}:{}", name, message))
    }

    fn set_upstream(&self, branch: &str, remote: &str) -> Result<()> {
        self.record("set-upstream", format!("set-upstream:{}:{}", branch, remote))
    }

    fn push_branch(&self, branch: &str, remote: &str, auth: &AuthMode) -> Result<PushSummary> {
        self.record(
            "push-branch",
            format!(
                "push-branch:{}:{}:auth={}",
                branch,
                remote,
                Self::describe_auth(auth)
            ),
        )?;

        Ok(PushSummary {
            remote_url: self.remote_urls.get(remote).cloned().unwrap_or_default(),
            refspecs: vec![format!("refs/heads/{}:refs/heads/{}", branch, branch)],
            ref_updates: vec![(format!("refs/heads/{}", branch), None)],
            messages: Vec::new(),
        })
    }

    fn push_tags(&self, remote: &str, auth: &AuthMode, force: bool) -> Result<PushSummary> {
        self.record(
            "push-tags",
            format!(
                "push-tags:{}:force={}:auth={}",
                remote,
                force,
                Self::describe_auth(auth)
            ),
        )?;

        Ok(PushSummary {
            remote_url: self.remote_urls.get(remote).cloned().unwrap_or_default(),
            refspecs: vec!["+refs/tags/*:refs/tags/*".to_string()],
            ref_updates: Vec::new(),
            messages: Vec::new(),
        })
    }

    fn remote_url(&self, remote: &str) -> Result<Option<String>> {
        Ok(self.remote_urls.get(remote).cloned())
    }
}
