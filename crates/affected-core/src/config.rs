//! Selection configuration with environment-variable defaults.

use serde::{Deserialize, Serialize};

use crate::label::LabelTranslator;
use crate::report::DEFAULT_VARIANT_SUFFIXES;

/// Upstream ref used when the current branch has no tracking ref.
pub const DEFAULT_UPSTREAM: &str = "origin/master";

/// What to do when a changed path no longer exists on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFilePolicy {
    /// Abort the run with a missing-file error.
    #[default]
    Abort,

    /// Log a warning and keep going.
    Skip,
}

/// Knobs for one selection run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Build engine command; `-C <dir> -n -v` is appended per variant.
    pub ninja_command: Vec<String>,

    /// Test runner command; the affected labels are appended.
    pub test_command: Vec<String>,

    /// Fallback upstream ref.
    pub default_upstream: String,

    /// Suffixes appended to the out dir to form build variants.
    pub variant_suffixes: Vec<String>,

    pub translator: LabelTranslator,

    pub missing_files: MissingFilePolicy,

    /// Query variants in parallel.
    pub concurrent_queries: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            ninja_command: command_from_env("SMOKE_NINJA", &["fx", "ninja"]),
            test_command: command_from_env("SMOKE_TEST_COMMAND", &["fx", "test"]),
            default_upstream: std::env::var("SMOKE_DEFAULT_UPSTREAM")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_UPSTREAM.to_string()),
            variant_suffixes: DEFAULT_VARIANT_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            translator: LabelTranslator::default(),
            missing_files: MissingFilePolicy::default(),
            concurrent_queries: true,
        }
    }
}

impl SelectionConfig {
    /// Create a config from environment variables.
    pub fn from_env() -> Self {
        Self::default()
    }

    pub fn with_ninja_command(mut self, command: Vec<String>) -> Self {
        self.ninja_command = command;
        self
    }

    pub fn with_test_command(mut self, command: Vec<String>) -> Self {
        self.test_command = command;
        self
    }

    pub fn with_default_upstream(mut self, upstream: impl Into<String>) -> Self {
        self.default_upstream = upstream.into();
        self
    }

    pub fn with_variant_suffixes(mut self, suffixes: Vec<String>) -> Self {
        self.variant_suffixes = suffixes;
        self
    }

    pub fn with_missing_files(mut self, policy: MissingFilePolicy) -> Self {
        self.missing_files = policy;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.concurrent_queries = false;
        self
    }
}

/// Split a whitespace-separated command line.
pub fn split_command(command: &str) -> Vec<String> {
    command.split_whitespace().map(str::to_string).collect()
}

fn command_from_env(var: &str, fallback: &[&str]) -> Vec<String> {
    std::env::var(var)
        .ok()
        .map(|s| split_command(&s))
        .filter(|cmd| !cmd.is_empty())
        .unwrap_or_else(|| fallback.iter().map(|s| s.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_command() {
        assert_eq!(split_command("fx  ninja"), vec!["fx", "ninja"]);
        assert!(split_command("   ").is_empty());
    }

    #[test]
    fn test_command_from_env_fallback() {
        let cmd = command_from_env("SMOKE_TEST_UNSET_VARIABLE_FOR_FALLBACK", &["fx", "test"]);
        assert_eq!(cmd, vec!["fx", "test"]);
    }

    #[test]
    fn test_builder_methods() {
        let config = SelectionConfig::default()
            .with_ninja_command(vec!["ninja".to_string()])
            .with_test_command(vec!["run-tests".to_string()])
            .with_default_upstream("origin/main")
            .with_variant_suffixes(vec![String::new()])
            .with_missing_files(MissingFilePolicy::Skip)
            .sequential();

        assert_eq!(config.ninja_command, vec!["ninja"]);
        assert_eq!(config.test_command, vec!["run-tests"]);
        assert_eq!(config.default_upstream, "origin/main");
        assert_eq!(config.variant_suffixes, vec![String::new()]);
        assert_eq!(config.missing_files, MissingFilePolicy::Skip);
        assert!(!config.concurrent_queries);
    }

    #[test]
    fn test_defaults() {
        let config = SelectionConfig::default();
        assert_eq!(config.variant_suffixes, vec!["", ".zircon"]);
        assert_eq!(config.translator, LabelTranslator::default());
        assert_eq!(config.missing_files, MissingFilePolicy::Abort);
        assert!(config.concurrent_queries);
    }

    #[test]
    fn test_missing_file_policy_serde() {
        let json = serde_json::to_string(&MissingFilePolicy::Skip).unwrap();
        assert_eq!(json, "\"skip\"");
    }
}
