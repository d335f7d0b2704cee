//! Staleness oracle: asks the build engine what it would rebuild.

use std::ffi::OsStr;

use affected_core::{AffectedError, BuildVariant, Result, StalenessReport, VariantOutput};
use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::{debug, info};

use crate::process::capture;

/// Reports the actions a build would perform, without performing them.
#[async_trait]
pub trait StalenessOracle: Send + Sync {
    /// Query every variant and return their output in variant order.
    async fn query(&self, variants: &[BuildVariant]) -> Result<StalenessReport>;
}

/// Runs `<command> -C <build_dir> -n -v` for each build variant.
#[derive(Debug, Clone)]
pub struct NinjaOracle {
    command: Vec<String>,
    concurrent: bool,
}

impl NinjaOracle {
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            concurrent: true,
        }
    }

    /// Query variants one after another instead of in parallel.
    pub fn sequential(mut self) -> Self {
        self.concurrent = false;
        self
    }

    async fn query_variant(&self, variant: &BuildVariant) -> Result<VariantOutput> {
        debug!(variant = %variant.name, dir = %variant.build_dir.display(), "Dry-run query");

        let args = [
            OsStr::new("-C"),
            variant.build_dir.as_os_str(),
            OsStr::new("-n"),
            OsStr::new("-v"),
        ];
        let output = capture(&self.command, args, None)
            .await
            .map_err(|e| AffectedError::BuildEngine {
                variant: variant.name.clone(),
                message: format!("{e:#}"),
            })?;

        if !output.passed() {
            return Err(AffectedError::BuildEngine {
                variant: variant.name.clone(),
                message: format!(
                    "exited with code {}: {}",
                    output.exit_code,
                    output.stderr.trim()
                ),
            });
        }

        let result = VariantOutput::from_stdout(variant.name.clone(), &output.stdout);
        info!(
            variant = %variant.name,
            lines = result.lines.len(),
            duration_ms = output.duration_ms,
            "Dry-run complete"
        );
        Ok(result)
    }
}

#[async_trait]
impl StalenessOracle for NinjaOracle {
    async fn query(&self, variants: &[BuildVariant]) -> Result<StalenessReport> {
        let outputs = if self.concurrent {
            try_join_all(variants.iter().map(|v| self.query_variant(v))).await?
        } else {
            let mut outputs = Vec::with_capacity(variants.len());
            for variant in variants {
                outputs.push(self.query_variant(variant).await?);
            }
            outputs
        };
        Ok(StalenessReport::new(outputs))
    }
}
