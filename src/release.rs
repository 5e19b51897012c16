//! The prepare/finalize release state transitions.
//!
//! Both phases run a single pass: load the version file, run the gates,
//! mutate the version, persist, then perform the git side effects. Every
//! check is fail-fast; validation failures happen before any mutation, and
//! a git failure after mutation aborts the remaining steps without rolling
//! back what already completed.

use crate::config::{CommonOptions, FinalizeOptions, PrepareOptions};
use crate::error::{ReleaseError, Result};
use crate::gate;
use crate::git::{PushSummary, Repository};
use crate::version::{ReleaseType, VersionString, SNAPSHOT_SUFFIX};
use crate::version_file::VersionFile;

/// Result of a successful prepare phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareOutcome {
    /// The released version as written to the version file
    pub version: String,
    /// Message of the release commit
    pub commit_message: String,
    /// Name of the created annotated tag
    pub tag: String,
}

/// Result of a successful finalize phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeOutcome {
    /// The next development version as written to the version file
    pub version: String,
    /// Message of the post-release commit
    pub commit_message: String,
    /// Branch that was pushed
    pub branch: String,
    /// Result of the branch push
    pub branch_push: PushSummary,
    /// Result of the forced tag push
    pub tags_push: PushSummary,
}

/// Shared pre-flight: load the version file, then verify the working tree
/// is clean and the branch is eligible. Any failure leaves the repository
/// and the file untouched.
fn preflight(repo: &dyn Repository, common: &CommonOptions) -> Result<VersionFile> {
    let file = VersionFile::load(&common.version_file, &common.version_key)?;

    gate::verify_clean(repo)?;
    gate::verify_branch(repo, &common.branch_pattern)?;

    Ok(file)
}

/// Applies the prepare-phase mutation rule for `release_type`.
///
/// MAJOR and MINOR reset the lower components and clear the suffix. PATCH
/// promotes a `-SNAPSHOT` in place (the snapshot becomes the release) and
/// only increments when there is no snapshot to strip. MANUAL replaces all
/// four components from the override.
fn apply_release_type(
    version: &mut VersionString,
    release_type: ReleaseType,
    release_version: Option<&str>,
) -> Result<()> {
    match release_type {
        ReleaseType::Major => {
            let major = version.major_number()? + 1;
            version.replace_major(major.to_string());
            version.replace_minor("0");
            version.replace_patch("0");
            version.replace_suffix("");
        }
        ReleaseType::Minor => {
            let minor = version.minor_number()? + 1;
            version.replace_minor(minor.to_string());
            version.replace_patch("0");
            version.replace_suffix("");
        }
        ReleaseType::Patch => {
            if version.suffix() != SNAPSHOT_SUFFIX {
                let patch = version.patch_number()? + 1;
                version.replace_patch(patch.to_string());
            }
            version.replace_suffix("");
        }
        ReleaseType::Manual => {
            let text = release_version.ok_or(ReleaseError::MissingReleaseVersion)?;
            let parsed = VersionString::parse(text)?;
            version.replace_all(&parsed);
        }
    }

    Ok(())
}

/// The prepare phase: gate, bump, persist, commit, tag.
pub fn prepare(repo: &dyn Repository, options: &PrepareOptions) -> Result<PrepareOutcome> {
    let mut file = preflight(repo, &options.common)?;

    apply_release_type(
        file.version_mut(),
        options.release_type,
        options.release_version.as_deref(),
    )?;
    file.save()?;

    repo.stage(file.path())?;

    let version = file.version().to_string();
    let commit_message = format!("Set version for release to {}", version);
    repo.commit(&commit_message)?;

    let tag = format!("{}{}", options.tag_prefix, version);
    repo.tag_annotated(&tag, &tag)?;

    Ok(PrepareOutcome {
        version,
        commit_message,
        tag,
    })
}

/// The finalize phase: gate, validate credentials, move to the next
/// development version, commit, and push branch then tags.
pub fn finalize(repo: &dyn Repository, options: &FinalizeOptions) -> Result<FinalizeOutcome> {
    let mut file = preflight(repo, &options.common)?;

    let auth = options.auth.validate()?;

    match options.new_version.as_deref() {
        Some(text) => {
            let parsed = VersionString::parse(text)?;
            file.version_mut().replace_all(&parsed);
        }
        None => {
            let patch = file.version().patch_number()? + 1;
            file.version_mut().replace_patch(patch.to_string());
            file.version_mut().replace_suffix(SNAPSHOT_SUFFIX);
        }
    }
    file.save()?;

    repo.stage(file.path())?;

    let version = file.version().to_string();
    let commit_message = format!("Set version after release to {}", version);
    repo.commit(&commit_message)?;

    let branch = repo.current_branch()?;
    repo.set_upstream(&branch, &options.remote)?;

    let branch_push = repo.push_branch(&branch, &options.remote, &auth)?;
    let tags_push = repo.push_tags(&options.remote, &auth, true)?;

    Ok(FinalizeOutcome {
        version,
        commit_message,
        branch,
        branch_push,
        tags_push,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthConfig;
    use crate::gate::DEFAULT_BRANCH_PATTERN;
    use crate::git::MockRepository;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn version_file_in(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("gradle.properties");
        fs::write(&path, contents).unwrap();
        path
    }

    fn common(path: PathBuf) -> CommonOptions {
        CommonOptions {
            version_file: path,
            version_key: "version".to_string(),
            branch_pattern: DEFAULT_BRANCH_PATTERN.to_string(),
        }
    }

    fn prepare_options(path: PathBuf, release_type: ReleaseType) -> PrepareOptions {
        PrepareOptions {
            common: common(path),
            release_type,
            release_version: None,
            tag_prefix: String::new(),
        }
    }

    fn finalize_options(path: PathBuf) -> FinalizeOptions {
        FinalizeOptions {
            common: common(path),
            new_version: None,
            remote: "origin".to_string(),
            auth: AuthConfig::default(),
        }
    }

    fn parsed(text: &str) -> VersionString {
        VersionString::parse(text).unwrap()
    }

    #[test]
    fn test_major_bump_rule() {
        let mut v = parsed("1.2.3-SNAPSHOT");
        apply_release_type(&mut v, ReleaseType::Major, None).unwrap();
        assert_eq!(v.to_string(), "2.0.0");
    }

    #[test]
    fn test_minor_bump_rule() {
        let mut v = parsed("1.2.3");
        apply_release_type(&mut v, ReleaseType::Minor, None).unwrap();
        assert_eq!(v.to_string(), "1.3.0");
    }

    #[test]
    fn test_patch_bump_strips_snapshot_without_increment() {
        let mut v = parsed("1.2.3-SNAPSHOT");
        apply_release_type(&mut v, ReleaseType::Patch, None).unwrap();
        assert_eq!(v.to_string(), "1.2.3");
    }

    #[test]
    fn test_patch_bump_increments_without_snapshot() {
        let mut v = parsed("0.0.1");
        apply_release_type(&mut v, ReleaseType::Patch, None).unwrap();
        assert_eq!(v.to_string(), "0.0.2");
    }

    #[test]
    fn test_patch_bump_other_suffix_increments_and_clears() {
        let mut v = parsed("1.2.3-rc1");
        apply_release_type(&mut v, ReleaseType::Patch, None).unwrap();
        assert_eq!(v.to_string(), "1.2.4");
    }

    #[test]
    fn test_manual_replaces_wholesale() {
        let mut v = parsed("0.0.1-SNAPSHOT");
        apply_release_type(&mut v, ReleaseType::Manual, Some("1.2.3-r")).unwrap();
        assert_eq!(v.to_string(), "1.2.3-r");
    }

    #[test]
    fn test_manual_without_version_fails() {
        let mut v = parsed("0.0.1");
        let err = apply_release_type(&mut v, ReleaseType::Manual, None).unwrap_err();
        assert!(matches!(err, ReleaseError::MissingReleaseVersion));
        assert_eq!(v.to_string(), "0.0.1");
    }

    #[test]
    fn test_manual_with_invalid_version_fails_before_mutation() {
        let mut v = parsed("0.0.1");
        assert!(apply_release_type(&mut v, ReleaseType::Manual, Some("nope")).is_err());
        assert_eq!(v.to_string(), "0.0.1");
    }

    #[test]
    fn test_prepare_contract_sequence() {
        let dir = TempDir::new().unwrap();
        let path = version_file_in(&dir, "version=0.0.1-SNAPSHOT\n");
        let repo = MockRepository::new();

        let outcome = prepare(&repo, &prepare_options(path.clone(), ReleaseType::Major)).unwrap();

        assert_eq!(outcome.version, "1.0.0");
        assert_eq!(outcome.tag, "1.0.0");
        assert_eq!(
            repo.operations(),
            vec![
                format!("stage:{}", path.display()),
                "commit:Set version for release to 1.0.0".to_string(),
                "tag:1.0.0:1.0.0".to_string(),
            ]
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), "version=1.0.0\n");
    }

    #[test]
    fn test_prepare_tag_prefix() {
        let dir = TempDir::new().unwrap();
        let path = version_file_in(&dir, "version=0.0.1\n");
        let repo = MockRepository::new();

        let mut options = prepare_options(path, ReleaseType::Patch);
        options.tag_prefix = "v".to_string();

        let outcome = prepare(&repo, &options).unwrap();
        assert_eq!(outcome.tag, "v0.0.2");
    }

    #[test]
    fn test_prepare_dirty_tree_has_no_side_effects() {
        let dir = TempDir::new().unwrap();
        let path = version_file_in(&dir, "version=0.0.1\n");
        let mut repo = MockRepository::new();
        repo.set_dirty(true);

        let err = prepare(&repo, &prepare_options(path.clone(), ReleaseType::Patch)).unwrap_err();

        assert!(matches!(err, ReleaseError::UncommittedChanges));
        assert!(repo.operations().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "version=0.0.1\n");
    }

    #[test]
    fn test_prepare_wrong_branch_has_no_side_effects() {
        let dir = TempDir::new().unwrap();
        let path = version_file_in(&dir, "version=0.0.1\n");
        let mut repo = MockRepository::new();
        repo.set_branch("develop");

        let err = prepare(&repo, &prepare_options(path.clone(), ReleaseType::Patch)).unwrap_err();

        assert!(matches!(err, ReleaseError::BranchPolicy { .. }));
        assert!(repo.operations().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "version=0.0.1\n");
    }

    #[test]
    fn test_prepare_tag_failure_keeps_earlier_steps() {
        let dir = TempDir::new().unwrap();
        let path = version_file_in(&dir, "version=0.0.1\n");
        let mut repo = MockRepository::new();
        repo.fail_on("tag");

        let err = prepare(&repo, &prepare_options(path.clone(), ReleaseType::Patch)).unwrap_err();

        assert!(matches!(err, ReleaseError::Git(_)));
        // commit already happened and is not rolled back
        assert_eq!(
            repo.operations(),
            vec![
                format!("stage:{}", path.display()),
                "commit:Set version for release to 0.0.2".to_string(),
            ]
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), "version=0.0.2\n");
    }

    #[test]
    fn test_finalize_contract_sequence() {
        let dir = TempDir::new().unwrap();
        let path = version_file_in(&dir, "version=1.0.0\n");
        let repo = MockRepository::new();

        let outcome = finalize(&repo, &finalize_options(path.clone())).unwrap();

        assert_eq!(outcome.version, "1.0.1-SNAPSHOT");
        assert_eq!(outcome.branch, "main");
        assert_eq!(
            repo.operations(),
            vec![
                format!("stage:{}", path.display()),
                "commit:Set version after release to 1.0.1-SNAPSHOT".to_string(),
                "set-upstream:main:origin".to_string(),
                "push-branch:main:origin:auth=none".to_string(),
                "push-tags:origin:force=true:auth=none".to_string(),
            ]
        );
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "version=1.0.1-SNAPSHOT\n"
        );
    }

    #[test]
    fn test_finalize_new_version_override() {
        let dir = TempDir::new().unwrap();
        let path = version_file_in(&dir, "version=1.0.0\n");
        let repo = MockRepository::new();

        let mut options = finalize_options(path.clone());
        options.new_version = Some("1.2.3-r".to_string());

        let outcome = finalize(&repo, &options).unwrap();
        assert_eq!(outcome.version, "1.2.3-r");
        assert_eq!(fs::read_to_string(&path).unwrap(), "version=1.2.3-r\n");
    }

    #[test]
    fn test_finalize_credentials_attached_to_both_pushes() {
        let dir = TempDir::new().unwrap();
        let path = version_file_in(&dir, "version=1.0.0\n");
        let repo = MockRepository::new();

        let mut options = finalize_options(path);
        options.auth = AuthConfig {
            username: Some("user".to_string()),
            password: Some("pw".to_string()),
            ..AuthConfig::default()
        };

        finalize(&repo, &options).unwrap();

        let operations = repo.operations();
        assert!(operations.contains(&"push-branch:main:origin:auth=userpass".to_string()));
        assert!(operations.contains(&"push-tags:origin:force=true:auth=userpass".to_string()));
    }

    #[test]
    fn test_finalize_invalid_auth_has_no_side_effects() {
        let dir = TempDir::new().unwrap();
        let path = version_file_in(&dir, "version=1.0.0\n");
        let repo = MockRepository::new();

        let mut options = finalize_options(path.clone());
        options.auth = AuthConfig {
            username: Some("user".to_string()),
            ..AuthConfig::default()
        };

        let err = finalize(&repo, &options).unwrap_err();

        assert!(matches!(err, ReleaseError::Auth(_)));
        assert!(repo.operations().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "version=1.0.0\n");
    }

    #[test]
    fn test_finalize_invalid_override_has_no_side_effects() {
        let dir = TempDir::new().unwrap();
        let path = version_file_in(&dir, "version=1.0.0\n");
        let repo = MockRepository::new();

        let mut options = finalize_options(path.clone());
        options.new_version = Some("not-a-version".to_string());

        assert!(finalize(&repo, &options).is_err());
        assert!(repo.operations().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "version=1.0.0\n");
    }

    #[test]
    fn test_finalize_push_failure_keeps_commit() {
        let dir = TempDir::new().unwrap();
        let path = version_file_in(&dir, "version=1.0.0\n");
        let mut repo = MockRepository::new();
        repo.fail_on("push-branch");

        let err = finalize(&repo, &finalize_options(path.clone())).unwrap_err();

        assert!(matches!(err, ReleaseError::Git(_)));
        let operations = repo.operations();
        assert!(operations.contains(&"commit:Set version after release to 1.0.1-SNAPSHOT".to_string()));
        assert!(!operations.iter().any(|op| op.starts_with("push-tags")));
    }
}
