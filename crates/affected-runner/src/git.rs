//! Change set computation from git.

use std::path::{Path, PathBuf};
use std::process::Command;

use affected_core::{AffectedError, ChangeSet, Result, DEFAULT_UPSTREAM};
use tracing::{debug, warn};

/// Lists files modified relative to the upstream of the current branch.
#[derive(Debug, Clone)]
pub struct GitChangeSource {
    repo_dir: PathBuf,
    default_upstream: String,
}

impl GitChangeSource {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            default_upstream: DEFAULT_UPSTREAM.to_string(),
        }
    }

    /// Upstream used when the branch has no tracking ref.
    pub fn with_default_upstream(mut self, upstream: impl Into<String>) -> Self {
        self.default_upstream = upstream.into();
        self
    }

    /// Tracking ref of the current branch, or the default upstream.
    pub fn upstream(&self) -> String {
        match self.git_stdout(&["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{u}"]) {
            Ok(upstream) if !upstream.is_empty() => upstream,
            _ => {
                debug!(default = %self.default_upstream, "No tracking ref, using default upstream");
                self.default_upstream.clone()
            }
        }
    }

    /// Commit to diff against: the merge base of HEAD and upstream, or HEAD
    /// itself when there is no common ancestor to find.
    pub fn diff_base(&self) -> String {
        let upstream = self.upstream();
        match self.git_stdout(&["merge-base", "HEAD", &upstream]) {
            Ok(base) if !base.is_empty() => base,
            Ok(_) | Err(_) => {
                warn!(upstream = %upstream, "No merge base with upstream, diffing against HEAD");
                "HEAD".to_string()
            }
        }
    }

    /// Absolute path of the repository's top-level directory.
    pub fn toplevel(&self) -> Result<PathBuf> {
        let top = self.git_stdout(&["rev-parse", "--show-toplevel"])?;
        if top.is_empty() {
            return Err(AffectedError::Vcs(
                "git rev-parse --show-toplevel returned empty output".to_string(),
            ));
        }
        Ok(PathBuf::from(top))
    }

    /// Files modified in the working tree relative to [`diff_base`](Self::diff_base).
    ///
    /// Paths come back NUL-separated and unquoted, so names with non-ASCII
    /// bytes or surrounding spaces are kept verbatim. No differences yields
    /// an empty set.
    pub fn changed_files(&self) -> Result<ChangeSet> {
        let base = self.diff_base();
        let diff = run_git_raw(
            &self.repo_dir,
            &["-c", "core.quotepath=off", "diff", "--name-only", "-z", &base, "--"],
        )?;
        let changes: ChangeSet = diff.split('\0').collect();
        debug!(base = %base, files = changes.len(), "Computed change set");
        Ok(changes)
    }

    fn git_stdout(&self, args: &[&str]) -> Result<String> {
        run_git(&self.repo_dir, args)
    }
}

fn run_git(repo_dir: &Path, args: &[&str]) -> Result<String> {
    Ok(run_git_raw(repo_dir, args)?.trim().to_string())
}

fn run_git_raw(repo_dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_dir)
        .output()
        .map_err(|e| AffectedError::Vcs(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AffectedError::Vcs(format!(
            "git {} failed: {}",
            args.join(" "),
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
