//! Test registry index: artifact path -> test label.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::label::LabelTranslator;

/// A registered test. The artifact path is derived from `label` on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestEntry {
    /// Build-graph label, e.g. `//foo/bar:baz(//toolchain:variant)`.
    pub label: String,

    /// Human-readable test name from the manifest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Host path or package-relative path of the test binary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Package URL for device tests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_url: Option<String>,

    /// Target operating system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
}

impl TestEntry {
    /// Entry carrying only a label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            name: None,
            path: None,
            package_url: None,
            os: None,
        }
    }

    pub fn artifact_path(&self, translator: &LabelTranslator) -> String {
        translator.translate(&self.label)
    }
}

/// Reverse lookup from artifact path to test label.
///
/// Built once per run and read-only afterwards. When two labels translate to
/// the same artifact path the later entry wins.
#[derive(Debug, Clone, Default)]
pub struct TestRegistry {
    by_artifact: HashMap<String, String>,
    collisions: usize,
}

impl TestRegistry {
    /// Build with the default translator.
    pub fn build<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = TestEntry>,
    {
        Self::build_with(&LabelTranslator::default(), entries)
    }

    pub fn build_with<I>(translator: &LabelTranslator, entries: I) -> Self
    where
        I: IntoIterator<Item = TestEntry>,
    {
        let mut by_artifact = HashMap::new();
        let mut collisions = 0;

        for entry in entries {
            let artifact = entry.artifact_path(translator);
            if let Some(previous) = by_artifact.insert(artifact.clone(), entry.label) {
                collisions += 1;
                debug!(
                    artifact = %artifact,
                    replaced = %previous,
                    "Artifact path collision, later label wins"
                );
            }
        }

        Self {
            by_artifact,
            collisions,
        }
    }

    /// Label registered for an artifact path.
    pub fn get(&self, artifact_path: &str) -> Option<&str> {
        self.by_artifact.get(artifact_path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_artifact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_artifact.is_empty()
    }

    /// Number of entries that overwrote an earlier one.
    pub fn collisions(&self) -> usize {
        self.collisions
    }
}
