use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use regex::Regex;

/// The branch pattern in effect when neither the invocation nor the
/// configuration supplies one. Releases happen from master or main.
pub const DEFAULT_BRANCH_PATTERN: &str = "^(master)|(main)$";

/// Fails when the working tree has any staged or unstaged change.
///
/// Runs before any mutation in both phases so a release never lands on top
/// of unresolved local edits.
pub fn verify_clean(repo: &dyn Repository) -> Result<()> {
    if repo.has_uncommitted_changes()? {
        return Err(ReleaseError::UncommittedChanges);
    }

    Ok(())
}

/// Fails unless the current branch name matches `pattern` as a whole.
///
/// The pattern is anchored before matching, so `release` does not accept
/// `my-release-branch`.
pub fn verify_branch(repo: &dyn Repository, pattern: &str) -> Result<()> {
    let re = Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| {
        ReleaseError::config(format!("Invalid branch pattern '{}': {}", pattern, e))
    })?;

    let branch = repo.current_branch()?;
    if !re.is_match(&branch) {
        return Err(ReleaseError::BranchPolicy {
            pattern: pattern.to_string(),
            branch,
        });
    }

    Ok(())
}
