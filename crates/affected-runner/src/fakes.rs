//! In-memory fakes for the pipeline collaborators (testing only)
//!
//! `ScriptedOracle` answers dry-run queries from canned output and
//! `RecordingFreshness` records what it was asked to touch. Both can share a
//! [`CallLog`] so tests can check call order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use affected_core::{
    AffectedError, BuildVariant, ChangeSet, Result, StalenessReport, VariantOutput,
};
use async_trait::async_trait;

use crate::freshness::FreshnessSignal;
use crate::oracle::StalenessOracle;

/// Ordered record of collaborator calls shared between fakes.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

// ---------------------------------------------------------------------------
// ScriptedOracle
// ---------------------------------------------------------------------------

/// Oracle returning canned lines per variant name.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    outputs: HashMap<String, Vec<String>>,
    failing: Option<String>,
    log: CallLog,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines reported for `variant`. Unscripted variants report nothing.
    pub fn with_output(mut self, variant: &str, lines: &[&str]) -> Self {
        self.outputs.insert(
            variant.to_string(),
            lines.iter().map(|l| l.to_string()).collect(),
        );
        self
    }

    /// Make queries against `variant` fail with a build-engine error.
    pub fn failing_on(mut self, variant: &str) -> Self {
        self.failing = Some(variant.to_string());
        self
    }

    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    /// Number of `query` calls so far.
    pub fn query_count(&self) -> usize {
        self.log
            .calls()
            .iter()
            .filter(|c| c.as_str() == "oracle")
            .count()
    }
}

#[async_trait]
impl StalenessOracle for ScriptedOracle {
    async fn query(&self, variants: &[BuildVariant]) -> Result<StalenessReport> {
        self.log.push("oracle");
        let mut report = StalenessReport::default();
        for variant in variants {
            if self.failing.as_deref() == Some(variant.name.as_str()) {
                return Err(AffectedError::BuildEngine {
                    variant: variant.name.clone(),
                    message: "scripted failure".to_string(),
                });
            }
            let lines = self.outputs.get(&variant.name).cloned().unwrap_or_default();
            report.push(VariantOutput::new(variant.name.clone(), lines));
        }
        Ok(report)
    }
}

// ---------------------------------------------------------------------------
// RecordingFreshness
// ---------------------------------------------------------------------------

/// Freshness signal that records change sets instead of touching files.
#[derive(Debug, Default)]
pub struct RecordingFreshness {
    applied: Mutex<Vec<(ChangeSet, PathBuf)>>,
    missing: Option<String>,
    log: CallLog,
}

impl RecordingFreshness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `path` as missing when it appears in a change set.
    pub fn missing(mut self, path: &str) -> Self {
        self.missing = Some(path.to_string());
        self
    }

    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    /// Change sets seen so far, with the repo root they were applied to.
    pub fn applied(&self) -> Vec<(ChangeSet, PathBuf)> {
        self.applied.lock().unwrap().clone()
    }
}

impl FreshnessSignal for RecordingFreshness {
    fn apply(&self, change_set: &ChangeSet, repo_root: &Path) -> Result<usize> {
        self.log.push("freshness");
        if let Some(missing) = &self.missing {
            if change_set.contains(missing) {
                return Err(AffectedError::MissingFile {
                    path: repo_root.join(missing),
                });
            }
        }
        self.applied
            .lock()
            .unwrap()
            .push((change_set.clone(), repo_root.to_path_buf()));
        Ok(change_set.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_oracle_reports_per_variant() {
        let oracle = ScriptedOracle::new().with_output("default", &["[1/1] touch obj/a.stamp"]);
        let variants = vec![
            BuildVariant::new("default", "out/default"),
            BuildVariant::new("default.zircon", "out/default.zircon"),
        ];

        let report = oracle.query(&variants).await.unwrap();
        assert_eq!(report.variants().len(), 2);
        assert_eq!(report.line_count(), 1);
        assert_eq!(oracle.query_count(), 1);
    }

    #[test]
    fn test_recording_freshness_records() {
        let freshness = RecordingFreshness::new();
        let changes: ChangeSet = vec!["a.cc"].into_iter().collect();
        assert_eq!(freshness.apply(&changes, Path::new("/repo")).unwrap(), 1);
        assert_eq!(freshness.applied().len(), 1);
        assert_eq!(freshness.applied()[0].1, PathBuf::from("/repo"));
    }

    #[test]
    fn test_shared_log_orders_calls() {
        let log = CallLog::new();
        let freshness = RecordingFreshness::new().with_log(log.clone());
        freshness
            .apply(&vec!["a.cc"].into_iter().collect(), Path::new("/repo"))
            .unwrap();
        log.push("other");
        assert_eq!(log.calls(), vec!["freshness", "other"]);
    }
}
