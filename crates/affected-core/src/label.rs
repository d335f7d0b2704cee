//! Build-graph label to artifact path translation.
//!
//! `//my/gn:path(//toolchain:variant)` becomes `obj/my/gn/path.stamp`.
//! No label validation happens here; a malformed label yields a path that
//! simply never matches a stale output.

use serde::{Deserialize, Serialize};

/// Default directory prefix for stamp files inside a build directory.
pub const DEFAULT_ARTIFACT_ROOT: &str = "obj";

/// Default suffix appended to the stamp file name.
pub const DEFAULT_STAMP_SUFFIX: &str = ".stamp";

/// Converts build-graph labels into the artifact paths a build writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelTranslator {
    /// Directory prefix, e.g. `obj`. Empty means no prefix.
    pub artifact_root: String,

    /// Suffix appended after the target name, e.g. `.stamp`.
    pub stamp_suffix: String,
}

impl Default for LabelTranslator {
    fn default() -> Self {
        Self {
            artifact_root: DEFAULT_ARTIFACT_ROOT.to_string(),
            stamp_suffix: DEFAULT_STAMP_SUFFIX.to_string(),
        }
    }
}

impl LabelTranslator {
    pub fn new(artifact_root: impl Into<String>, stamp_suffix: impl Into<String>) -> Self {
        Self {
            artifact_root: artifact_root.into(),
            stamp_suffix: stamp_suffix.into(),
        }
    }

    /// Translate a label into its artifact path.
    pub fn translate(&self, label: &str) -> String {
        let unrooted = label.strip_prefix("//").unwrap_or(label);
        let without_toolchain = match unrooted.find('(') {
            Some(idx) => &unrooted[..idx],
            None => unrooted,
        };
        let relative = without_toolchain.replace(':', "/");

        if self.artifact_root.is_empty() {
            format!("{}{}", relative, self.stamp_suffix)
        } else {
            format!("{}/{}{}", self.artifact_root, relative, self.stamp_suffix)
        }
    }
}

/// Translate a label with the default `obj/` root and `.stamp` suffix.
pub fn translate(label: &str) -> String {
    LabelTranslator::default().translate(label)
}
