use crate::auth::{AuthMode, KnownHostsSource, SshKeyscan};
use crate::error::{ReleaseError, Result};
use crate::git::PushSummary;
use git2::{
    CertificateCheckStatus, ErrorCode, PushOptions, RemoteCallbacks, Repository as Git2Repo,
    StatusOptions,
};
use std::cell::RefCell;
use std::path::Path;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
    known_hosts: Box<dyn KnownHostsSource>,
}

impl std::fmt::Debug for Git2Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git2Repository")
            .field("repo", &self.repo.path())
            .finish_non_exhaustive()
    }
}

impl Git2Repository {
    /// Open or discover a git repository at or above `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)
            .map_err(|e| ReleaseError::config(format!("Unable to find .git directory: {}", e)))?;

        Ok(Git2Repository {
            repo,
            known_hosts: Box::new(SshKeyscan),
        })
    }

    /// Replace the known-hosts source used for SSH host-key checks
    pub fn with_known_hosts(mut self, source: Box<dyn KnownHostsSource>) -> Self {
        self.known_hosts = source;
        self
    }

    fn relative_to_workdir<'a>(&self, path: &'a Path) -> Result<&'a Path> {
        if !path.is_absolute() {
            return Ok(path);
        }

        let workdir = self.repo.workdir().ok_or_else(|| {
            ReleaseError::config("Repository has no working directory".to_string())
        })?;

        path.strip_prefix(workdir).map_err(|_| {
            ReleaseError::config(format!(
                "Path {} is outside the repository working directory",
                path.display()
            ))
        })
    }

    fn push_refspecs(
        &self,
        remote_name: &str,
        refspecs: Vec<String>,
        auth: &AuthMode,
    ) -> Result<PushSummary> {
        let mut remote = self.repo.find_remote(remote_name).map_err(|e| {
            ReleaseError::config(format!("Remote '{}' not found: {}", remote_name, e))
        })?;
        let remote_url = remote.url().unwrap_or_default().to_string();

        let ref_updates: RefCell<Vec<(String, Option<String>)>> = RefCell::new(Vec::new());
        let messages: RefCell<Vec<String>> = RefCell::new(Vec::new());

        let mut callbacks = RemoteCallbacks::new();

        let mode = auth.clone();
        callbacks.credentials(move |_url, username_from_url, _allowed_types| match &mode {
            AuthMode::UsernamePassword { username, password } => {
                git2::Cred::userpass_plaintext(username, password)
            }
            AuthMode::SshKey { key, passphrase } => git2::Cred::ssh_key_from_memory(
                username_from_url.unwrap_or("git"),
                None,
                key,
                passphrase.as_deref(),
            ),
            AuthMode::SshKeyFile { path, passphrase } => git2::Cred::ssh_key(
                username_from_url.unwrap_or("git"),
                None,
                path,
                passphrase.as_deref(),
            ),
            AuthMode::None => git2::Cred::default(),
        });

        // Host keys come from the known-hosts source as-is. No data means
        // the push fails; data is not checked against any trust anchor.
        let known_hosts = &self.known_hosts;
        callbacks.certificate_check(move |_cert, host| match known_hosts.scan(host) {
            Ok(_) => Ok(CertificateCheckStatus::CertificateOk),
            Err(e) => Err(git2::Error::from_str(&format!(
                "Host key verification failed for {}: {}",
                host, e
            ))),
        });

        callbacks.push_update_reference(|refname, status| {
            ref_updates
                .borrow_mut()
                .push((refname.to_string(), status.map(|s| s.to_string())));

            if let Some(status) = status {
                Err(git2::Error::from_str(&format!(
                    "Push rejected for {}: {}",
                    refname, status
                )))
            } else {
                Ok(())
            }
        });

        callbacks.sideband_progress(|data| {
            messages
                .borrow_mut()
                .push(String::from_utf8_lossy(data).to_string());
            true
        });

        {
            let mut options = PushOptions::new();
            options.remote_callbacks(callbacks);

            let refspec_strs: Vec<&str> = refspecs.iter().map(|s| s.as_str()).collect();
            remote.push(&refspec_strs, Some(&mut options))?;
        }

        Ok(PushSummary {
            remote_url,
            refspecs,
            ref_updates: ref_updates.into_inner(),
            messages: messages.into_inner(),
        })
    }
}

impl super::Repository for Git2Repository {
    fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;

        if !head.is_branch() {
            return Err(ReleaseError::config(
                "HEAD is not on a branch".to_string(),
            ));
        }

        head.shorthand()
            .map(|s| s.to_string())
            .ok_or_else(|| ReleaseError::config("Branch name is not valid UTF-8".to_string()))
    }

    fn has_uncommitted_changes(&self) -> Result<bool> {
        let mut options = StatusOptions::new();
        options.include_untracked(false).include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(!statuses.is_empty())
    }

    fn stage(&self, path: &Path) -> Result<()> {
        let relative = self.relative_to_workdir(path)?;

        let mut index = self.repo.index()?;
        index.add_path(relative)?;
        index.write()?;

        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        let mut index = self.repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let signature = self.repo.signature()?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                None
            }
            Err(e) => return Err(e.into()),
        };
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;

        Ok(())
    }

    fn tag_annotated(&self, name: &str, message: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        let signature = self.repo.signature()?;

        self.repo
            .tag(name, head.as_object(), &signature, message, false)?;

        Ok(())
    }

    fn set_upstream(&self, branch: &str, remote: &str) -> Result<()> {
        let mut config = self.repo.config()?;
        config.set_str(&format!("branch.{}.remote", branch), remote)?;
        config.set_str(
            &format!("branch.{}.merge", branch),
            &format!("refs/heads/{}", branch),
        )?;

        Ok(())
    }

    fn push_branch(&self, branch: &str, remote: &str, auth: &AuthMode) -> Result<PushSummary> {
        let refspec = format!("refs/heads/{}:refs/heads/{}", branch, branch);
        self.push_refspecs(remote, vec![refspec], auth)
    }

    fn push_tags(&self, remote: &str, auth: &AuthMode, force: bool) -> Result<PushSummary> {
        let refspec = if force {
            "+refs/tags/*:refs/tags/*".to_string()
        } else {
            "refs/tags/*:refs/tags/*".to_string()
        };
        self.push_refspecs(remote, vec![refspec], auth)
    }

    fn remote_url(&self, remote: &str) -> Result<Option<String>> {
        match self.repo.find_remote(remote) {
            Ok(r) => Ok(r.url().map(|s| s.to_string())),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

// SAFETY: Git2Repository wraps git2::Repository which is Send + Sync.
// git2 library is thread-safe for read operations via libgit2's thread-safe design.
unsafe impl Sync for Git2Repository {}
