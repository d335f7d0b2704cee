//! smoke-test - find and run tests affected by the current change
//!
//! Computes the files modified relative to upstream, marks them fresh, asks
//! the build engine which outputs a build would regenerate, and runs the
//! registered tests whose stamps are among them.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info, Level};

use affected_core::{
    init_tracing, load_manifest, split_command, BuildVariant, MissingFilePolicy,
    SelectionConfig, TestRegistry, MANIFEST_FILE_NAME,
};
use affected_runner::{
    GitChangeSource, NinjaOracle, SelectionPipeline, SelectionResult, TestExecutor,
    TouchFreshness,
};

#[derive(Parser, Debug)]
#[command(name = "smoke-test")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Finds and runs tests affected by current change", long_about = None)]
struct Cli {
    /// Print verbose messages
    #[arg(short, long)]
    verbose: bool,

    /// Don't run affected tests
    #[arg(long)]
    dry_run: bool,

    /// Emit JSON-formatted log lines and a JSON result on stdout
    #[arg(long)]
    json: bool,

    /// Path to the build directory
    #[arg(long, env = "SMOKE_OUT_DIR")]
    out_dir: PathBuf,

    /// Test manifest (default: <out-dir>/tests.json)
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Suffix appended to the out dir to form a build variant; repeatable
    /// (default: "" and ".zircon")
    #[arg(long = "variant", value_name = "SUFFIX")]
    variants: Vec<String>,

    /// Build engine command, whitespace separated (default: "fx ninja")
    #[arg(long, env = "SMOKE_NINJA")]
    ninja: Option<String>,

    /// Test runner command, whitespace separated (default: "fx test")
    #[arg(long, env = "SMOKE_TEST_COMMAND")]
    test_command: Option<String>,

    /// Upstream ref used when the branch has no tracking ref
    #[arg(long)]
    upstream: Option<String>,

    /// Repository to inspect (default: current directory)
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    /// Skip changed files that no longer exist instead of failing
    #[arg(long)]
    skip_missing: bool,

    /// Query build variants one at a time
    #[arg(long)]
    sequential: bool,

    /// Arguments for the test runner
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    test_args: Vec<String>,
}

impl Cli {
    fn manifest_path(&self) -> PathBuf {
        self.manifest
            .clone()
            .unwrap_or_else(|| self.out_dir.join(MANIFEST_FILE_NAME))
    }

    /// Environment defaults overridden by explicit flags.
    fn config(&self) -> SelectionConfig {
        let mut config = SelectionConfig::from_env();
        if let Some(ninja) = &self.ninja {
            config = config.with_ninja_command(split_command(ninja));
        }
        if let Some(test_command) = &self.test_command {
            config = config.with_test_command(split_command(test_command));
        }
        if let Some(upstream) = &self.upstream {
            config = config.with_default_upstream(upstream.clone());
        }
        if !self.variants.is_empty() {
            config = config.with_variant_suffixes(self.variants.clone());
        }
        if self.skip_missing {
            config = config.with_missing_files(MissingFilePolicy::Skip);
        }
        if self.sequential {
            config = config.sequential();
        }
        config
    }
}

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    selection: &'a SelectionResult,
    dry_run: bool,
    test_exit_code: Option<i32>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    init_tracing(cli.json, level);

    let mut stdout = std::io::stdout();
    tokio::select! {
        code = cmd_smoke_test(&cli, &mut stdout) => Ok(exit_code(code?)),
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Run the selection and, unless dry-running, the affected tests.
///
/// Results are written to `out`; in JSON mode that is exactly one document.
/// Returns the process exit status.
async fn cmd_smoke_test<W: Write>(cli: &Cli, out: &mut W) -> Result<i32> {
    let config = cli.config();
    debug!(config = ?config, "Resolved configuration");

    let manifest = cli.manifest_path();
    let entries = load_manifest(&manifest).context("Failed to load test manifest")?;
    let registry = TestRegistry::build_with(&config.translator, entries);
    info!(
        tests = registry.len(),
        collisions = registry.collisions(),
        "Indexed test manifest"
    );

    let source =
        GitChangeSource::new(&cli.repo).with_default_upstream(config.default_upstream.clone());
    let change_set = source
        .changed_files()
        .context("Failed to compute modified files")?;
    for path in change_set.iter() {
        debug!(path = %path, "Modified");
    }
    let repo_root = if change_set.is_empty() {
        cli.repo.clone()
    } else {
        source.toplevel().context("Failed to locate repository root")?
    };

    let variants = BuildVariant::from_out_dir(&cli.out_dir, &config.variant_suffixes);
    let mut oracle = NinjaOracle::new(config.ninja_command.clone());
    if !config.concurrent_queries {
        oracle = oracle.sequential();
    }
    let pipeline = SelectionPipeline::new(
        Arc::new(TouchFreshness::new(config.missing_files)),
        Arc::new(oracle),
    );

    let result = pipeline
        .run(&change_set, &repo_root, &registry, &variants)
        .await
        .context("Affected-test selection failed")?;

    if !result.has_affected() {
        info!("No affected tests");
        report(out, cli, &result, None)?;
        return Ok(0);
    }

    if cli.dry_run {
        info!(tests = result.affected.len(), "Not running tests (--dry-run)");
        report(out, cli, &result, None)?;
        return Ok(0);
    }

    if !cli.json {
        report(out, cli, &result, None)?;
        out.flush()?;
    }

    let executor = TestExecutor::new(config.test_command.clone());
    let code = executor
        .run(&result.affected, &cli.test_args)
        .await
        .context("Failed to run affected tests")?;
    info!(exit_code = code, "Test run finished");

    if cli.json {
        report(out, cli, &result, Some(code))?;
    }
    Ok(code)
}

/// Write the affected labels, one per line, or the JSON result.
fn report<W: Write>(
    out: &mut W,
    cli: &Cli,
    result: &SelectionResult,
    test_exit_code: Option<i32>,
) -> Result<()> {
    if cli.json {
        let output = JsonOutput {
            selection: result,
            dry_run: cli.dry_run,
            test_exit_code,
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
    } else {
        for label in result.affected.iter() {
            writeln!(out, "{label}")?;
        }
    }
    Ok(())
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(exit_status(code))
}

/// Child status as a process exit byte; out-of-range codes become 1.
fn exit_status(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}
