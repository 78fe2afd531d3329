//! # detwidth
//!
//! Command-line entry point: parses flags, loads settings, resolves the
//! collaborator executables, and runs one pipeline.

#![deny(unsafe_code)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use detwidth_runtime::{InputKind, Pipeline, RunContext, RunMode, RunRequest, RuntimeError};
use detwidth_settings::{DetwidthSettings, ToolSettings};
use detwidth_tools::{ProcessRunner, TokioProcessRunner, ToolPaths};
use tracing::{debug, error};

/// Compute the deterministic width of a regular language.
#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
#[command(name = "detwidth", about = "Tool to compute the deterministic width of a regular language.")]
struct Cli {
    /// A regular expression (optionally a DFA).
    input: String,

    /// Take in input a DFA instead of a regexp.
    #[arg(long = "DFA")]
    dfa: bool,

    /// Check if the language is Wheeler.
    #[arg(long = "Wheeler")]
    wheeler: bool,

    /// Check if the deterministic width is < (smaller) or >= (greater equal) than p.
    #[arg(long, allow_negative_numbers = true)]
    p: Option<i64>,

    /// Find the exact deterministic width.
    #[arg(long)]
    exact: bool,

    /// Minimize memory footprint.
    #[arg(long)]
    memory: bool,

    /// Keep intermediate files (debug only).
    #[arg(long)]
    keep: bool,

    /// Activate verbose mode.
    #[arg(long)]
    verbose: bool,

    /// Settings file (default `~/.detwidth/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Directory the collaborator executables resolve against.
    #[arg(long)]
    tools_root: Option<PathBuf>,
}

impl Cli {
    fn input_kind(&self) -> InputKind {
        if self.dfa { InputKind::Dfa } else { InputKind::Regex }
    }
}

/// Root directory for tools: flag, then settings, then the binary's directory.
fn tools_root(flag: Option<&Path>, settings: &ToolSettings) -> Result<PathBuf> {
    let root = match flag {
        Some(root) => root.to_path_buf(),
        None => {
            let exe = std::env::current_exe().context("cannot locate the running executable")?;
            let exe_dir = exe.parent().unwrap_or(Path::new("."));
            settings.root_or(exe_dir)
        }
    };
    std::path::absolute(&root).with_context(|| format!("cannot resolve tools root {}", root.display()))
}

fn tool_paths(settings: &ToolSettings, root: &Path, low_memory: bool) -> ToolPaths {
    let oracle = if low_memory {
        &settings.oracle_low_memory
    } else {
        &settings.oracle
    };
    ToolPaths {
        compiler: ToolSettings::resolve(root, &settings.compiler),
        minimizer: ToolSettings::resolve(root, &settings.minimizer),
        pruner: ToolSettings::resolve(root, &settings.pruner),
        partition_refiner: ToolSettings::resolve(root, &settings.partition_refiner),
        merger: ToolSettings::resolve(root, &settings.merger),
        oracle: ToolSettings::resolve(root, oracle),
    }
}

fn load_settings(path: Option<&Path>) -> Result<DetwidthSettings> {
    match path {
        Some(path) => detwidth_settings::load_settings_from_path(path)
            .with_context(|| format!("cannot load settings from {}", path.display())),
        None => detwidth_settings::load_settings().context("cannot load settings"),
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Flag errors are reported before anything touches the filesystem.
    let mode = RunMode::from_flags(cli.p, cli.wheeler, cli.exact)?;

    let settings = load_settings(cli.settings.as_deref())?;
    detwidth_logging::init_subscriber(detwidth_logging::effective_level(
        &settings.logging.level,
        cli.verbose,
    ));

    let root = tools_root(cli.tools_root.as_deref(), &settings.tools)?;
    let context = RunContext {
        tools: tool_paths(&settings.tools, &root, cli.memory),
        data_dir: ToolSettings::resolve(&root, &settings.pipeline.data_dir),
        verdict_file: settings.pipeline.verdict_file.clone(),
        pruned_header: settings.pipeline.pruned_header,
    };
    debug!(root = %root.display(), ?context, "resolved run context");

    let request = RunRequest {
        kind: cli.input_kind(),
        input: cli.input,
        mode,
        keep: cli.keep,
        verbose: cli.verbose,
    };
    let runner: Arc<dyn ProcessRunner> = Arc::new(TokioProcessRunner);
    let pipeline = Pipeline::prepare(runner, context, request, std::io::stdout())?;
    let _ = pipeline.run().await?;
    Ok(())
}

fn render(err: &anyhow::Error) -> String {
    match err.downcast_ref::<RuntimeError>() {
        Some(runtime) => {
            error!(kind = runtime.kind(), "run failed");
            runtime.diagnostic()
        }
        None => format!("{err:#}"),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", render(&err));
            ExitCode::FAILURE
        }
    }
}
