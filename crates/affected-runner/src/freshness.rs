//! Marking changed files newer than any build output.
//!
//! The build engine decides staleness by modification time, so touching the
//! changed inputs makes a dry-run report everything downstream of them. This
//! is a heuristic: clock skew or a concurrent build can defeat it.

use std::path::Path;

use affected_core::{AffectedError, ChangeSet, MissingFilePolicy, Result};
use filetime::FileTime;
use tracing::{debug, warn};

/// Makes the build engine see the change set as modified inputs.
pub trait FreshnessSignal: Send + Sync {
    /// Mark every path in `change_set` (relative to `repo_root`) as fresh.
    ///
    /// Returns the number of files updated.
    fn apply(&self, change_set: &ChangeSet, repo_root: &Path) -> Result<usize>;
}

/// Sets access and modification times to now, like `touch`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TouchFreshness {
    policy: MissingFilePolicy,
}

impl TouchFreshness {
    pub fn new(policy: MissingFilePolicy) -> Self {
        Self { policy }
    }
}

impl FreshnessSignal for TouchFreshness {
    fn apply(&self, change_set: &ChangeSet, repo_root: &Path) -> Result<usize> {
        let now = FileTime::now();
        let mut touched = 0;

        for relative in change_set.iter() {
            let path = repo_root.join(relative);
            match filetime::set_file_times(&path, now, now) {
                Ok(()) => {
                    debug!(path = %path.display(), "Touched");
                    touched += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => match self.policy {
                    MissingFilePolicy::Abort => return Err(AffectedError::MissingFile { path }),
                    MissingFilePolicy::Skip => {
                        warn!(path = %path.display(), "Changed file is missing, skipping");
                    }
                },
                Err(e) => return Err(AffectedError::Io(e)),
            }
        }

        Ok(touched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn old_time() -> FileTime {
        FileTime::from_unix_time(1_000_000, 0)
    }

    fn write_stale(root: &Path, relative: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, "contents").unwrap();
        filetime::set_file_times(&path, old_time(), old_time()).unwrap();
    }

    fn mtime(path: &Path) -> FileTime {
        FileTime::from_last_modification_time(&std::fs::metadata(path).unwrap())
    }

    #[test]
    fn test_touch_updates_mtime() {
        let dir = tempfile::tempdir().unwrap();
        write_stale(dir.path(), "src/foo.cc");
        write_stale(dir.path(), "src/bar.h");

        let changes: ChangeSet = vec!["src/foo.cc", "src/bar.h"].into_iter().collect();
        let touched = TouchFreshness::default()
            .apply(&changes, dir.path())
            .expect("touch failed");

        assert_eq!(touched, 2);
        assert!(mtime(&dir.path().join("src/foo.cc")) > old_time());
        assert!(mtime(&dir.path().join("src/bar.h")) > old_time());
    }

    #[test]
    fn test_untouched_files_keep_mtime() {
        let dir = tempfile::tempdir().unwrap();
        write_stale(dir.path(), "a.cc");
        write_stale(dir.path(), "b.cc");

        let changes: ChangeSet = vec!["a.cc"].into_iter().collect();
        TouchFreshness::default().apply(&changes, dir.path()).unwrap();

        assert_eq!(mtime(&dir.path().join("b.cc")), old_time());
    }

    #[test]
    fn test_missing_file_aborts_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let changes: ChangeSet = vec!["deleted.cc"].into_iter().collect();

        let err = TouchFreshness::default()
            .apply(&changes, dir.path())
            .unwrap_err();
        match err {
            AffectedError::MissingFile { path } => assert!(path.ends_with("deleted.cc")),
            other => panic!("expected MissingFile, got {other:?}"),
        }
        assert!(!dir.path().join("deleted.cc").exists());
    }

    #[test]
    fn test_missing_file_skipped_with_policy() {
        let dir = tempfile::tempdir().unwrap();
        write_stale(dir.path(), "kept.cc");
        let changes: ChangeSet = vec!["deleted.cc", "kept.cc"].into_iter().collect();

        let touched = TouchFreshness::new(MissingFilePolicy::Skip)
            .apply(&changes, dir.path())
            .expect("skip policy should not fail");
        assert_eq!(touched, 1);
        assert!(mtime(&dir.path().join("kept.cc")) > old_time());
    }

    #[test]
    fn test_empty_change_set_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let touched = TouchFreshness::default()
            .apply(&ChangeSet::new(), dir.path())
            .unwrap();
        assert_eq!(touched, 0);
    }
}
