//! Affected Core - change-impact test selection
//!
//! Given the tests registered by a build and the actions a dry-run build
//! would perform, works out which tests are affected:
//! - Translates build-graph labels into stamp artifact paths
//! - Indexes the test manifest by artifact path
//! - Parses dry-run progress lines into output tokens
//! - Intersects the two into an ordered set of affected labels

pub mod config;
pub mod error;
pub mod label;
pub mod manifest;
pub mod parser;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod telemetry;

pub use config::{split_command, MissingFilePolicy, SelectionConfig, DEFAULT_UPSTREAM};
pub use error::{AffectedError, Result};
pub use label::{translate, LabelTranslator};
pub use manifest::{load_manifest, parse_manifest, MANIFEST_FILE_NAME};
pub use parser::{ActionLineParser, NinjaLineParser};
pub use registry::{TestEntry, TestRegistry};
pub use report::{BuildVariant, ChangeSet, StalenessReport, VariantOutput};
pub use resolver::{resolve, resolve_with, AffectedSet};
pub use telemetry::init_tracing;
