//! Pipeline orchestration.
//!
//! A run walks a fixed sequence of stages: minimum DFA (compiled from a regex
//! or minimized from a DFA), pruning, infimum and supremum refinement, interval
//! merge, and finally one oracle query or an exact search. Each stage returns
//! the artifacts the next one consumes; the first failure aborts the rest.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use detwidth_core::{ArtifactKind, ArtifactLedger, HeaderPosition, count_records, read_header, read_header_at};
use detwidth_tools::{Invocation, ProcessRunner, RefinementMode, RunLog, Stage, ToolPaths, collaborators};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::cleanup::{RunStatus, cleanup};
use crate::errors::RuntimeError;
use crate::oracle::{ProcessOracle, ThresholdOracle};
use crate::report::Outcome;
use crate::search::exact_width;

/// Log file used for regex input, inside the data directory.
pub const REGEX_LOG: &str = "regexp.log";
/// Minimum DFA compiled from a regex, inside the data directory.
pub const REGEX_AUTOMATON: &str = "regexp";

const WHEELER_DESCRIPTION: &str = "compute A^2 pruned automaton and check language Wheelerness";

/// What the positional input is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    /// A regular expression.
    Regex,
    /// Path to an automaton description.
    Dfa,
}

/// Which question the run answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    /// Is the width below `p`?
    Threshold {
        /// The threshold.
        p: usize,
        /// Asked as "is the language Wheeler?" (`p = 2`).
        wheeler: bool,
    },
    /// What is the width?
    Exact,
}

impl RunMode {
    /// Resolve the command-line flags.
    ///
    /// `exact` wins over everything else; `wheeler` forces `p = 2`.
    pub fn from_flags(p: Option<i64>, wheeler: bool, exact: bool) -> Result<Self, RuntimeError> {
        if exact {
            return Ok(Self::Exact);
        }
        if wheeler {
            return Ok(Self::Threshold { p: 2, wheeler: true });
        }
        let Some(p) = p else {
            return Err(RuntimeError::Validation(
                "Either --p, --Wheeler, or --exact is required.".into(),
            ));
        };
        match usize::try_from(p) {
            Ok(p) if p >= 2 => Ok(Self::Threshold { p, wheeler: false }),
            _ => Err(RuntimeError::Validation("The width to check must be >= 2.".into())),
        }
    }
}

/// One user request.
#[derive(Clone, Debug)]
pub struct RunRequest {
    /// The regex, or the path of the automaton.
    pub input: String,
    /// How to read `input`.
    pub kind: InputKind,
    /// Threshold or exact.
    pub mode: RunMode,
    /// Keep derived artifacts and the log after success.
    pub keep: bool,
    /// Print commands and timings.
    pub verbose: bool,
}

/// Resolved environment of a run.
#[derive(Clone, Debug)]
pub struct RunContext {
    /// Collaborator executables.
    pub tools: ToolPaths,
    /// Where regex-mode artifacts and the regex log live.
    pub data_dir: PathBuf,
    /// Name of the file the decision procedure writes its verdict to.
    pub verdict_file: String,
    /// Which line of a pruned automaton carries its header.
    pub pruned_header: HeaderPosition,
}

struct Pruned {
    min: PathBuf,
    max: PathBuf,
}

struct Refined {
    infima: PathBuf,
    suprema: PathBuf,
}

/// A prepared run: log opened, nothing executed yet.
pub struct Pipeline<W> {
    runner: Arc<dyn ProcessRunner>,
    context: RunContext,
    request: RunRequest,
    log: RunLog,
    ledger: ArtifactLedger,
    out: W,
}

impl<W: Write + Send> Pipeline<W> {
    /// Open the run log and announce it in verbose mode.
    ///
    /// Regex runs create the data directory if it is missing.
    pub fn prepare(
        runner: Arc<dyn ProcessRunner>,
        context: RunContext,
        request: RunRequest,
        out: W,
    ) -> Result<Self, RuntimeError> {
        let log_path = match request.kind {
            InputKind::Dfa => ArtifactKind::Log.derive(Path::new(&request.input)),
            InputKind::Regex => {
                std::fs::create_dir_all(&context.data_dir).map_err(|source| RuntimeError::Io {
                    path: context.data_dir.clone(),
                    source,
                })?;
                context.data_dir.join(REGEX_LOG)
            }
        };
        let log = RunLog::open(&log_path)?;
        let mut ledger = ArtifactLedger::new();
        ledger.set_log(&log_path);

        let mut pipeline = Self {
            runner,
            context,
            request,
            log,
            ledger,
            out,
        };
        pipeline.say(format_args!(
            "Sending logging messages to file: {}",
            log_path.display()
        ))?;
        Ok(pipeline)
    }

    /// Path of the run log.
    pub fn log_path(&self) -> &Path {
        self.log.path()
    }

    /// Execute every stage, print the result, and clean up.
    ///
    /// On failure the artifacts produced so far and the log are left on disk.
    pub async fn run(mut self) -> Result<Outcome, RuntimeError> {
        let result = self.execute().await;
        let Self {
            log,
            ledger,
            request,
            ..
        } = self;
        drop(log);
        let status = if result.is_ok() {
            RunStatus::Succeeded
        } else {
            RunStatus::Failed
        };
        cleanup(&ledger, request.keep, status);
        result
    }

    #[instrument(skip_all, fields(input = %self.request.input))]
    async fn execute(&mut self) -> Result<Outcome, RuntimeError> {
        let started = Instant::now();

        let minimized = match self.request.kind {
            InputKind::Regex => self.compile().await?,
            InputKind::Dfa => self.minimize().await?,
        };
        let pruned = self.prune(&minimized).await?;
        let refined = self.refine(&minimized, &pruned).await?;
        let interval = self.merge(&minimized, &refined).await?;

        let outcome = match self.request.mode {
            RunMode::Threshold { p, wheeler } => {
                let holds = self.decide(&minimized, &interval, p, wheeler).await?;
                Outcome::Threshold { p, wheeler, holds }
            }
            RunMode::Exact => self.search(&minimized, &interval).await?,
        };

        writeln!(self.out, "{outcome}").map_err(RuntimeError::Output)?;
        writeln!(
            self.out,
            "### Total elapsed time: {:.4}",
            started.elapsed().as_secs_f64()
        )
        .map_err(RuntimeError::Output)?;
        Ok(outcome)
    }

    async fn compile(&mut self) -> Result<PathBuf, RuntimeError> {
        let start = Instant::now();
        let output = ArtifactKind::RegexDfa.derive(&self.context.data_dir.join(REGEX_AUTOMATON));
        let invocation = collaborators::compile_regex(&self.context.tools, &self.request.input, &output);
        self.ledger.record(&output);
        self.invoke(&invocation, Stage::Compile.description()).await?;
        self.elapsed(start)?;
        Ok(output)
    }

    async fn minimize(&mut self) -> Result<PathBuf, RuntimeError> {
        let start = Instant::now();
        let input = PathBuf::from(&self.request.input);
        let output = ArtifactKind::Minimized.derive(&input);
        let invocation = collaborators::minimize(&self.context.tools, &input, &output);
        self.ledger.record(&output);
        self.invoke(&invocation, Stage::Minimize.description()).await?;
        self.elapsed(start)?;
        Ok(output)
    }

    async fn prune(&mut self, automaton: &Path) -> Result<Pruned, RuntimeError> {
        let start = Instant::now();
        let pruned = Pruned {
            min: ArtifactKind::PrunedMin.derive(automaton),
            max: ArtifactKind::PrunedMax.derive(automaton),
        };
        let invocation = collaborators::prune(&self.context.tools, automaton, &pruned.min, &pruned.max);
        self.ledger.record(&pruned.min);
        self.ledger.record(&pruned.max);
        self.invoke(&invocation, Stage::Prune.description()).await?;
        self.elapsed(start)?;
        Ok(pruned)
    }

    async fn refine(&mut self, automaton: &Path, pruned: &Pruned) -> Result<Refined, RuntimeError> {
        let start = Instant::now();
        let header = read_header_at(&pruned.min, self.context.pruned_header)?.validate(&pruned.min)?;
        info!(
            state_count = header.state_count,
            source_state = header.source_state,
            "pruned automaton header"
        );

        let refined = Refined {
            infima: ArtifactKind::Infima.derive(automaton),
            suprema: ArtifactKind::Suprema.derive(automaton),
        };
        for (mode, input, output) in [
            (RefinementMode::Infimum, &pruned.min, &refined.infima),
            (RefinementMode::Supremum, &pruned.max, &refined.suprema),
        ] {
            let invocation = collaborators::refine(&self.context.tools, mode, input, output, header);
            self.ledger.record(output);
            self.invoke(&invocation, invocation.stage.description()).await?;
        }
        self.elapsed(start)?;
        Ok(refined)
    }

    async fn merge(&mut self, automaton: &Path, refined: &Refined) -> Result<PathBuf, RuntimeError> {
        let start = Instant::now();
        let header = read_header(automaton)?.validate(automaton)?;
        let output = ArtifactKind::Interval.derive(automaton);
        let invocation = collaborators::merge(
            &self.context.tools,
            &refined.infima,
            &refined.suprema,
            &output,
            header,
        );
        self.ledger.record(&output);
        self.invoke(&invocation, Stage::Merge.description()).await?;
        self.elapsed(start)?;
        Ok(output)
    }

    async fn decide(
        &mut self,
        automaton: &Path,
        interval: &Path,
        p: usize,
        wheeler: bool,
    ) -> Result<bool, RuntimeError> {
        let start = Instant::now();
        let scratch = self.scratch_dir()?;
        let mut oracle = ProcessOracle::new(
            self.runner.as_ref(),
            &self.log,
            &self.context.tools.oracle,
            automaton,
            interval,
            &scratch,
            &self.context.verdict_file,
        )?;
        let description = if wheeler {
            WHEELER_DESCRIPTION
        } else {
            Stage::Oracle.description()
        };
        if self.request.verbose {
            writeln!(
                self.out,
                "==== {description}. Command: {}",
                oracle.invocation(p).command_line()
            )
            .map_err(RuntimeError::Output)?;
        }
        info!(stage = %Stage::Oracle, p, "running stage");
        let holds = oracle.query(p).await?;
        self.elapsed(start)?;
        Ok(holds)
    }

    async fn search(&mut self, automaton: &Path, interval: &Path) -> Result<Outcome, RuntimeError> {
        let max_candidate = count_records(interval)?;
        info!(max_candidate, "searching exact width");
        let scratch = self.scratch_dir()?;
        let mut oracle = ProcessOracle::new(
            self.runner.as_ref(),
            &self.log,
            &self.context.tools.oracle,
            automaton,
            interval,
            &scratch,
            &self.context.verdict_file,
        )?;
        let found = exact_width(&mut oracle, max_candidate).await?;
        Ok(Outcome::Exact {
            width: found.width,
            queries: found.queries,
        })
    }

    /// Run one collaborator, echoing it in verbose mode.
    async fn invoke(&mut self, invocation: &Invocation, description: &str) -> Result<(), RuntimeError> {
        let command = invocation.command_line();
        self.say(format_args!("==== {description}. Command: {command}"))?;
        info!(stage = %invocation.stage, "running stage");
        let outcome = self.runner.run(invocation, &self.log).await?;
        if outcome.success() {
            Ok(())
        } else {
            Err(RuntimeError::invocation(invocation, outcome.exit_code, self.log.path()))
        }
    }

    /// Private directory the decision procedure runs in, beside the log.
    fn scratch_dir(&mut self) -> Result<PathBuf, RuntimeError> {
        if let Some(existing) = self.ledger.scratch() {
            return Ok(existing.to_path_buf());
        }
        let parent = self
            .log
            .path()
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let scratch = parent.join(format!(".detwidth-{}", Uuid::now_v7()));
        std::fs::create_dir_all(&scratch).map_err(|source| RuntimeError::Io {
            path: scratch.clone(),
            source,
        })?;
        self.ledger.set_scratch(&scratch);
        Ok(scratch)
    }

    fn elapsed(&mut self, since: Instant) -> Result<(), RuntimeError> {
        self.say(format_args!(
            "Elapsed time: {:.4}",
            since.elapsed().as_secs_f64()
        ))
    }

    fn say(&mut self, line: fmt::Arguments<'_>) -> Result<(), RuntimeError> {
        if self.request.verbose {
            writeln!(self.out, "{line}").map_err(RuntimeError::Output)?;
        }
        Ok(())
    }
}
