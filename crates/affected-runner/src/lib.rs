//! Affected Runner - process-backed selection of affected tests
//!
//! Provides the collaborators around the core resolver:
//! - Computes the change set from git
//! - Touches changed files so the build engine sees them as modified
//! - Queries the build engine in dry-run mode across build variants
//! - Hands the affected labels to the test runner

pub mod executor;
pub mod fakes;
pub mod freshness;
pub mod git;
pub mod oracle;
pub mod pipeline;
pub mod process;

// Re-export key types
pub use executor::TestExecutor;
pub use freshness::{FreshnessSignal, TouchFreshness};
pub use git::GitChangeSource;
pub use oracle::{NinjaOracle, StalenessOracle};
pub use pipeline::{SelectionPipeline, SelectionResult};
pub use process::{capture, CapturedOutput};
