//! Hands the affected set to the test runner.

use std::process::Stdio;

use affected_core::{AffectedError, AffectedSet, Result};
use tokio::process::Command;
use tracing::info;

/// Runs `<command> <labels...> <extra args...>` with inherited stdio.
#[derive(Debug, Clone)]
pub struct TestExecutor {
    command: Vec<String>,
}

impl TestExecutor {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    /// Full argv that [`run`](Self::run) would execute, labels sorted.
    pub fn command_line(&self, affected: &AffectedSet, extra_args: &[String]) -> Vec<String> {
        self.command
            .iter()
            .cloned()
            .chain(affected.iter().map(str::to_string))
            .chain(extra_args.iter().cloned())
            .collect()
    }

    /// Run the affected tests and return the runner's exit code
    /// (-1 if it was killed by a signal).
    pub async fn run(&self, affected: &AffectedSet, extra_args: &[String]) -> Result<i32> {
        let argv = self.command_line(affected, extra_args);
        let Some((exe, args)) = argv.split_first() else {
            return Err(AffectedError::TestExecution(
                "test command is empty".to_string(),
            ));
        };

        info!(tests = affected.len(), command = %exe, "Running affected tests");

        let status = Command::new(exe)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| AffectedError::TestExecution(format!("failed to run {exe}: {e}")))?;

        Ok(status.code().unwrap_or(-1))
    }
}
