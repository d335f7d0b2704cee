//! Error taxonomy for affected-test selection.
//!
//! Soft outcomes (empty change set, empty staleness report, empty affected
//! set) are not errors; they are valid "nothing to do" results.

use std::path::PathBuf;

/// Errors produced while selecting affected tests.
#[derive(Debug, thiserror::Error)]
pub enum AffectedError {
    /// A changed path could not be marked fresh because it does not exist.
    #[error("missing file: {}", path.display())]
    MissingFile { path: PathBuf },

    /// The build engine failed outright while answering a dry-run query.
    #[error("build engine failed for variant '{variant}': {message}")]
    BuildEngine { variant: String, message: String },

    /// The test manifest or build description could not be located or parsed.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("version control error: {0}")]
    Vcs(String),

    #[error("test execution error: {0}")]
    TestExecution(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for affected-test selection.
pub type Result<T> = std::result::Result<T, AffectedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_display() {
        let err = AffectedError::MissingFile {
            path: PathBuf::from("/src/foo.cc"),
        };
        let msg = err.to_string();
        assert!(msg.contains("missing file"));
        assert!(msg.contains("/src/foo.cc"));
    }

    #[test]
    fn test_build_engine_display() {
        let err = AffectedError::BuildEngine {
            variant: "default.zircon".to_string(),
            message: "ninja: error: loading 'build.ninja'".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("default.zircon"));
        assert!(msg.contains("build.ninja"));
    }

    #[test]
    fn test_configuration_display() {
        let err = AffectedError::Configuration("tests.json not found".to_string());
        assert!(err.to_string().contains("configuration error"));
        assert!(err.to_string().contains("tests.json not found"));
    }
}
