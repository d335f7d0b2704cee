//! Loading the test manifest (`tests.json`) written by the build.
//!
//! The manifest is a JSON array of `{"test": {"label": ..., ...}}` objects.
//! Fields other than the ones read here are ignored.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{AffectedError, Result};
use crate::registry::TestEntry;

/// File name of the manifest inside a build directory.
pub const MANIFEST_FILE_NAME: &str = "tests.json";

#[derive(Debug, Deserialize)]
struct ManifestRecord {
    test: TestEntry,
}

/// Parse manifest JSON held in memory.
pub fn parse_manifest(json: &str) -> Result<Vec<TestEntry>> {
    let records: Vec<ManifestRecord> = serde_json::from_str(json)?;
    Ok(records.into_iter().map(|r| r.test).collect())
}

/// Read and parse a manifest from disk.
///
/// A missing or malformed manifest is a configuration error.
pub fn load_manifest(path: &Path) -> Result<Vec<TestEntry>> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        AffectedError::Configuration(format!(
            "failed to read test manifest {}: {e}",
            path.display()
        ))
    })?;

    let entries = parse_manifest(&json).map_err(|e| {
        AffectedError::Configuration(format!(
            "failed to parse test manifest {}: {e}",
            path.display()
        ))
    })?;

    debug!(path = %path.display(), tests = entries.len(), "Loaded test manifest");
    Ok(entries)
}
