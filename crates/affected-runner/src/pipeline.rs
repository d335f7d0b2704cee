//! Affected-test selection pipeline.
//!
//! Steps run strictly in order: mark the change set fresh, query the build
//! engine, resolve against the registry. An empty change set stops before
//! any side effect.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use affected_core::{
    resolve_with, ActionLineParser, AffectedSet, BuildVariant, ChangeSet, NinjaLineParser,
    Result, TestRegistry,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use crate::freshness::FreshnessSignal;
use crate::oracle::StalenessOracle;

/// Outcome of one selection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionResult {
    /// Unique id for log correlation.
    pub run_id: String,

    pub started_at: DateTime<Utc>,

    /// Number of files in the change set.
    pub changed_files: usize,

    /// Files whose timestamps were updated.
    pub touched_files: usize,

    /// Lines in the staleness report across all variants.
    pub stale_lines: usize,

    /// Whether the build engine was queried.
    pub oracle_queried: bool,

    /// SHA-256 of the sorted change set.
    pub change_digest: String,

    pub affected: AffectedSet,

    /// Total duration in milliseconds.
    pub duration_ms: u64,
}

impl SelectionResult {
    pub fn has_affected(&self) -> bool {
        !self.affected.is_empty()
    }
}

/// Orchestrates freshness, staleness query and resolution.
pub struct SelectionPipeline {
    freshness: Arc<dyn FreshnessSignal>,
    oracle: Arc<dyn StalenessOracle>,
    parser: Arc<dyn ActionLineParser + Send + Sync>,
}

impl SelectionPipeline {
    pub fn new(freshness: Arc<dyn FreshnessSignal>, oracle: Arc<dyn StalenessOracle>) -> Self {
        Self {
            freshness,
            oracle,
            parser: Arc::new(NinjaLineParser),
        }
    }

    /// Replace the default ninja line parser.
    pub fn with_parser(mut self, parser: Arc<dyn ActionLineParser + Send + Sync>) -> Self {
        self.parser = parser;
        self
    }

    /// Select the tests affected by `change_set`.
    ///
    /// Any error aborts the whole run; there are no partial results.
    pub async fn run(
        &self,
        change_set: &ChangeSet,
        repo_root: &Path,
        registry: &TestRegistry,
        variants: &[BuildVariant],
    ) -> Result<SelectionResult> {
        let start = Instant::now();
        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let change_digest = compute_change_digest(change_set);

        info!(
            run_id = %run_id,
            changed = change_set.len(),
            tests = registry.len(),
            "Starting affected-test selection"
        );

        if change_set.is_empty() {
            info!(run_id = %run_id, "No modified files");
            return Ok(SelectionResult {
                run_id,
                started_at,
                changed_files: 0,
                touched_files: 0,
                stale_lines: 0,
                oracle_queried: false,
                change_digest,
                affected: AffectedSet::new(),
                duration_ms: start.elapsed().as_millis() as u64,
            });
        }

        let touched_files = self.freshness.apply(change_set, repo_root)?;
        info!(run_id = %run_id, touched = touched_files, "Marked changed files fresh");

        let report = self.oracle.query(variants).await?;
        let stale_lines = report.line_count();
        info!(
            run_id = %run_id,
            variants = variants.len(),
            lines = stale_lines,
            "Collected staleness report"
        );

        let affected = resolve_with(self.parser.as_ref(), report.lines(), registry);
        info!(run_id = %run_id, affected = affected.len(), "Resolved affected tests");

        Ok(SelectionResult {
            run_id,
            started_at,
            changed_files: change_set.len(),
            touched_files,
            stale_lines,
            oracle_queried: true,
            change_digest,
            affected,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Deterministic digest of the (sorted) change set.
fn compute_change_digest(change_set: &ChangeSet) -> String {
    let mut hasher = Sha256::new();
    for path in change_set.iter() {
        hasher.update(path.as_bytes());
        hasher.update(b"\0");
    }
    hex::encode(hasher.finalize())
}
