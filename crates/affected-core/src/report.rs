//! Inputs to resolution: the change set, build variants and the staleness
//! report gathered from a dry-run build.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Repository-relative paths modified relative to upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet {
    paths: BTreeSet<String>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }
}

impl<S: Into<String>> FromIterator<S> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            paths: iter
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }
}

/// Build-directory suffixes queried by default: the main build and the
/// legacy zircon build.
pub const DEFAULT_VARIANT_SUFFIXES: &[&str] = &["", ".zircon"];

/// One configured build output tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildVariant {
    /// Display name, usually the build directory's file name.
    pub name: String,

    /// Directory the build engine runs in.
    pub build_dir: PathBuf,
}

impl BuildVariant {
    pub fn new(name: impl Into<String>, build_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            build_dir: build_dir.into(),
        }
    }

    /// Variants formed by appending each suffix to `out_dir`.
    ///
    /// `out/default` with suffixes `["", ".zircon"]` gives `out/default` and
    /// `out/default.zircon`.
    pub fn from_out_dir<S: AsRef<str>>(out_dir: &Path, suffixes: &[S]) -> Vec<Self> {
        suffixes
            .iter()
            .map(|suffix| {
                let mut dir = out_dir.as_os_str().to_owned();
                dir.push(suffix.as_ref());
                let build_dir = PathBuf::from(dir);
                let name = build_dir
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| build_dir.display().to_string());
                Self { name, build_dir }
            })
            .collect()
    }
}

/// Raw dry-run output of one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantOutput {
    pub variant: String,
    pub lines: Vec<String>,
}

impl VariantOutput {
    pub fn new(variant: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            variant: variant.into(),
            lines,
        }
    }

    /// Split captured stdout into lines.
    pub fn from_stdout(variant: impl Into<String>, stdout: &str) -> Self {
        Self::new(variant, stdout.lines().map(str::to_string).collect())
    }
}

/// Action lines a build engine would run, tagged by variant, in variant order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StalenessReport {
    variants: Vec<VariantOutput>,
}

impl StalenessReport {
    pub fn new(variants: Vec<VariantOutput>) -> Self {
        Self { variants }
    }

    pub fn push(&mut self, output: VariantOutput) {
        self.variants.push(output);
    }

    pub fn variants(&self) -> &[VariantOutput] {
        &self.variants
    }

    /// All lines, concatenated in variant order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.variants
            .iter()
            .flat_map(|v| v.lines.iter().map(String::as_str))
    }

    pub fn line_count(&self) -> usize {
        self.variants.iter().map(|v| v.lines.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.line_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_set_dedups_and_sorts() {
        let set: ChangeSet = vec!["b.cc", "a.cc", "b.cc", ""].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["a.cc", "b.cc"]);
        assert!(set.contains("a.cc"));
    }

    #[test]
    fn test_variants_from_out_dir() {
        let variants = BuildVariant::from_out_dir(Path::new("out/default"), DEFAULT_VARIANT_SUFFIXES);
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].build_dir, PathBuf::from("out/default"));
        assert_eq!(variants[0].name, "default");
        assert_eq!(variants[1].build_dir, PathBuf::from("out/default.zircon"));
        assert_eq!(variants[1].name, "default.zircon");
    }

    #[test]
    fn test_report_lines_preserve_variant_order() {
        let report = StalenessReport::new(vec![
            VariantOutput::from_stdout("default", "[1/2] cc a.o\n[2/2] touch obj/a.stamp\n"),
            VariantOutput::from_stdout("default.zircon", "[1/1] touch obj/z.stamp\n"),
        ]);

        assert_eq!(report.line_count(), 3);
        assert_eq!(
            report.lines().collect::<Vec<_>>(),
            vec!["[1/2] cc a.o", "[2/2] touch obj/a.stamp", "[1/1] touch obj/z.stamp"]
        );
    }

    #[test]
    fn test_empty_report() {
        let mut report = StalenessReport::default();
        assert!(report.is_empty());
        report.push(VariantOutput::from_stdout("default", ""));
        assert!(report.is_empty());
        assert_eq!(report.variants().len(), 1);
    }
}
