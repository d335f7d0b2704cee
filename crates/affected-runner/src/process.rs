//! External command execution with captured output.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::debug;

/// Captured result of an external command.
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    /// Exit code (-1 when terminated by a signal).
    pub exit_code: i32,

    pub stdout: String,

    pub stderr: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,

    pub success: bool,
}

impl CapturedOutput {
    /// Whether the command exited with code 0.
    pub fn passed(&self) -> bool {
        self.success && self.exit_code == 0
    }
}

/// Run `command` (first element is the executable) followed by `extra_args`,
/// capturing stdout and stderr.
///
/// No timeout is applied; callers own cancellation. Dropping the returned
/// future kills the child.
pub async fn capture<I, S>(
    command: &[String],
    extra_args: I,
    current_dir: Option<&Path>,
) -> anyhow::Result<CapturedOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let start = Instant::now();

    let Some((exe, args)) = command.split_first() else {
        anyhow::bail!("empty command");
    };

    let mut cmd = Command::new(exe);
    cmd.args(args)
        .args(extra_args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = current_dir {
        cmd.current_dir(dir);
    }

    debug!(command = ?cmd.as_std(), "Spawning");
    let output = cmd
        .spawn()
        .map_err(|e| anyhow::anyhow!("failed to spawn {exe}: {e}"))?
        .wait_with_output()
        .await?;

    let exit_code = output.status.code().unwrap_or(-1);

    Ok(CapturedOutput {
        exit_code,
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        duration_ms: start.elapsed().as_millis() as u64,
        success: output.status.success(),
    })
}
