//! End-to-end pipeline runs against a scripted collaborator set.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use detwidth_core::{CoreError, HeaderPosition};
use detwidth_runtime::{InputKind, Outcome, Pipeline, RunContext, RunMode, RunRequest, RuntimeError};
use detwidth_tools::{Invocation, OutputTarget, ProcessOutcome, ProcessRunner, RunLog, Stage, ToolError, ToolPaths};

const AUTOMATON: &str = "6 9 2\n0 97 1\n1 98 2\n";
const INTERVAL_RECORDS: usize = 5;

/// Plays every collaborator: writes plausible artifacts, answers oracle
/// queries with `p >= first_true`, and fails one chosen stage.
struct ScriptedTools {
    first_true: usize,
    fail: Option<Stage>,
    pruned_content: String,
    seen: Mutex<Vec<Invocation>>,
}

impl ScriptedTools {
    fn new(first_true: usize) -> Self {
        Self {
            first_true,
            fail: None,
            pruned_content: AUTOMATON.to_string(),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn failing(mut self, stage: Stage) -> Self {
        self.fail = Some(stage);
        self
    }

    fn stages(&self) -> Vec<Stage> {
        self.seen.lock().unwrap().iter().map(|i| i.stage).collect()
    }

    fn oracle_probes(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.stage == Stage::Oracle)
            .map(|i| i.args[0].clone())
            .collect()
    }

    fn find(&self, stage: Stage) -> Invocation {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.stage == stage)
            .cloned()
            .unwrap()
    }
}

#[async_trait]
impl ProcessRunner for ScriptedTools {
    async fn run(&self, invocation: &Invocation, log: &RunLog) -> Result<ProcessOutcome, ToolError> {
        self.seen.lock().unwrap().push(invocation.clone());
        log.note(&format!("$ {}", invocation.command_line()))?;
        if self.fail == Some(invocation.stage) {
            log.note("simulated failure")?;
            return Ok(ProcessOutcome {
                exit_code: 2,
                duration: Duration::ZERO,
            });
        }

        match invocation.stage {
            Stage::Compile | Stage::Minimize => {
                let OutputTarget::File(path) = &invocation.stdout else {
                    panic!("automaton stage without redirected stdout");
                };
                std::fs::write(path, AUTOMATON).unwrap();
            }
            Stage::Prune => {
                std::fs::write(&invocation.args[1], &self.pruned_content).unwrap();
                std::fs::write(&invocation.args[2], &self.pruned_content).unwrap();
            }
            Stage::Infima | Stage::Suprema => std::fs::write(&invocation.args[1], "refined\n").unwrap(),
            Stage::Merge => std::fs::write(&invocation.args[2], "0\t1\n".repeat(INTERVAL_RECORDS)).unwrap(),
            Stage::Oracle => {
                let p: usize = invocation.args[0].parse().unwrap();
                let dir = invocation.working_directory.clone().unwrap();
                let verdict = if p >= self.first_true { "1" } else { "0" };
                std::fs::write(dir.join("answer"), verdict).unwrap();
            }
        }
        Ok(ProcessOutcome {
            exit_code: 0,
            duration: Duration::from_millis(1),
        })
    }
}

struct Workspace {
    dir: tempfile::TempDir,
    input: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("lang.dfa");
        std::fs::write(&input, AUTOMATON).unwrap();
        Self { dir, input }
    }

    fn context(&self) -> RunContext {
        RunContext {
            tools: ToolPaths {
                compiler: "/tools/regToAutomaton".into(),
                minimizer: "/tools/minimizer.x".into(),
                pruner: "/tools/prune.x".into(),
                partition_refiner: "/tools/part-ref32.x".into(),
                merger: "/tools/merge32.x".into(),
                oracle: "/tools/det-width.x".into(),
            },
            data_dir: self.dir.path().join("data"),
            verdict_file: "answer".into(),
            pruned_header: HeaderPosition::First,
        }
    }

    fn request(&self, mode: RunMode) -> RunRequest {
        RunRequest {
            input: self.input.display().to_string(),
            kind: InputKind::Dfa,
            mode,
            keep: false,
            verbose: false,
        }
    }

    fn derived(&self, suffix: &str) -> PathBuf {
        self.dir.path().join(format!("lang.dfa{suffix}"))
    }

    /// Everything in the workspace directory, by name.
    fn listing(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

async fn run(
    tools: &Arc<ScriptedTools>,
    context: RunContext,
    request: RunRequest,
) -> (Result<Outcome, RuntimeError>, String) {
    let mut out = Vec::new();
    let runner: Arc<dyn ProcessRunner> = tools.clone();
    let pipeline = Pipeline::prepare(runner, context, request, &mut out).unwrap();
    let result = pipeline.run().await;
    (result, String::from_utf8(out).unwrap())
}

fn threshold(p: usize) -> RunMode {
    RunMode::Threshold { p, wheeler: false }
}

#[tokio::test]
async fn threshold_below() {
    let ws = Workspace::new();
    let tools = Arc::new(ScriptedTools::new(3));
    let (result, out) = run(&tools, ws.context(), ws.request(threshold(3))).await;

    assert_eq!(
        result.unwrap(),
        Outcome::Threshold {
            p: 3,
            wheeler: false,
            holds: true
        }
    );
    assert!(out.contains("The deterministic width is <(smaller than) 3"));
    assert!(out.contains("### Total elapsed time: "));
    assert_eq!(tools.oracle_probes(), vec!["3"]);
}

#[tokio::test]
async fn threshold_at_or_above() {
    let ws = Workspace::new();
    let tools = Arc::new(ScriptedTools::new(3));
    let (result, out) = run(&tools, ws.context(), ws.request(threshold(2))).await;

    assert_matches!(result.unwrap(), Outcome::Threshold { holds: false, .. });
    assert!(out.contains("The deterministic width is >=(greater or equal than) 2"));
}

#[tokio::test]
async fn wheeler_question() {
    let ws = Workspace::new();
    let tools = Arc::new(ScriptedTools::new(2));
    let mode = RunMode::Threshold { p: 2, wheeler: true };
    let (result, out) = run(&tools, ws.context(), ws.request(mode)).await;

    assert!(result.is_ok());
    assert!(out.contains("The regular language is Wheeler"));
    assert_eq!(tools.oracle_probes(), vec!["2"]);
}

#[tokio::test]
async fn exact_search_over_interval_records() {
    let ws = Workspace::new();
    let tools = Arc::new(ScriptedTools::new(4));
    let (result, out) = run(&tools, ws.context(), ws.request(RunMode::Exact)).await;

    assert_eq!(result.unwrap(), Outcome::Exact { width: 3, queries: 3 });
    assert_eq!(tools.oracle_probes(), vec!["2", "4", "3"]);
    assert!(out.contains("Regular language deterministic width: p = 3"));
}

#[tokio::test]
async fn stage_order_and_arguments() {
    let ws = Workspace::new();
    let tools = Arc::new(ScriptedTools::new(3));
    let (result, _) = run(&tools, ws.context(), ws.request(threshold(3))).await;
    assert!(result.is_ok());

    assert_eq!(
        tools.stages(),
        vec![
            Stage::Minimize,
            Stage::Prune,
            Stage::Infima,
            Stage::Suprema,
            Stage::Merge,
            Stage::Oracle
        ]
    );

    let minimize = tools.find(Stage::Minimize);
    assert_eq!(minimize.stdin.as_deref(), Some(ws.input.as_path()));
    assert_eq!(minimize.stdout, OutputTarget::File(ws.derived(".min")));

    let infima = tools.find(Stage::Infima);
    assert_eq!(&infima.args[2..], ["6", "2", "0", "1", "0", "1", "0", "1"]);
    assert!(infima.args[1].ends_with("lang.dfa.min.infima"));

    let suprema = tools.find(Stage::Suprema);
    assert_eq!(&suprema.args[2..], ["6", "2", "0", "1", "1", "1", "0", "1"]);

    let merge = tools.find(Stage::Merge);
    assert!(merge.args[2].ends_with("lang.dfa.min.interval"));
    assert_eq!(&merge.args[3..], ["6", "2", "0", "1"]);
}

#[tokio::test]
async fn pruner_failure_stops_the_run() {
    let ws = Workspace::new();
    let tools = Arc::new(ScriptedTools::new(3).failing(Stage::Prune));
    let (result, out) = run(&tools, ws.context(), ws.request(threshold(3))).await;

    let err = result.unwrap_err();
    assert_matches!(err, RuntimeError::Invocation { stage: Stage::Prune, exit_code: 2, .. });
    assert_eq!(tools.stages(), vec![Stage::Minimize, Stage::Prune]);

    let diagnostic = err.diagnostic();
    let min = ws.derived(".min");
    assert!(diagnostic.contains(&format!("/tools/prune.x {}", min.display())));
    assert!(diagnostic.contains(&ws.derived(".log").display().to_string()));
    assert!(!out.contains("#########"));

    // Produced artifacts and the log stay for inspection.
    assert!(min.exists());
    let log = std::fs::read_to_string(ws.derived(".log")).unwrap();
    assert!(log.contains("simulated failure"));
}

#[tokio::test]
async fn oracle_failure_is_reported() {
    let ws = Workspace::new();
    let tools = Arc::new(ScriptedTools::new(3).failing(Stage::Oracle));
    let (result, _) = run(&tools, ws.context(), ws.request(RunMode::Exact)).await;

    assert_matches!(result, Err(RuntimeError::Invocation { stage: Stage::Oracle, .. }));
    assert_eq!(tools.oracle_probes().len(), 1);
    assert!(ws.derived(".min.interval").exists());
}

#[tokio::test]
async fn malformed_pruned_header_aborts_before_refinement() {
    let ws = Workspace::new();
    let mut scripted = ScriptedTools::new(3);
    scripted.pruned_content = "six nine two\n".to_string();
    let tools = Arc::new(scripted);
    let (result, _) = run(&tools, ws.context(), ws.request(threshold(3))).await;

    assert_matches!(result, Err(RuntimeError::Core(CoreError::MalformedArtifact { .. })));
    assert_eq!(tools.stages(), vec![Stage::Minimize, Stage::Prune]);
}

#[tokio::test]
async fn success_cleans_up_everything_but_the_input() {
    let ws = Workspace::new();
    let tools = Arc::new(ScriptedTools::new(3));
    let (result, _) = run(&tools, ws.context(), ws.request(RunMode::Exact)).await;
    assert!(result.is_ok());

    assert_eq!(ws.listing(), vec!["lang.dfa"]);
}

#[tokio::test]
async fn keep_leaves_artifacts_and_log() {
    let ws = Workspace::new();
    let tools = Arc::new(ScriptedTools::new(3));
    let mut request = ws.request(threshold(3));
    request.keep = true;
    let (result, _) = run(&tools, ws.context(), request).await;
    assert!(result.is_ok());

    for suffix in [
        ".log",
        ".min",
        ".min.prmin",
        ".min.prmax",
        ".min.infima",
        ".min.suprema",
        ".min.interval",
    ] {
        assert!(ws.derived(suffix).exists(), "missing {suffix}");
    }
    // The oracle's scratch directory never outlives the run.
    assert!(ws.listing().iter().all(|name| !name.starts_with(".detwidth-")));
}

#[tokio::test]
async fn regex_input_goes_through_the_data_directory() {
    let ws = Workspace::new();
    let tools = Arc::new(ScriptedTools::new(3));
    let context = ws.context();
    let data_dir = context.data_dir.clone();
    let request = RunRequest {
        input: "a(b|c)*".into(),
        kind: InputKind::Regex,
        mode: threshold(3),
        keep: true,
        verbose: false,
    };
    let (result, _) = run(&tools, context, request).await;
    assert!(result.is_ok());

    let compile = tools.find(Stage::Compile);
    assert_eq!(compile.args, vec!["($)(a(b|c)*)", "--DFAmin"]);
    assert_eq!(compile.stdout, OutputTarget::File(data_dir.join("regexp.mdfa")));
    assert!(!tools.stages().contains(&Stage::Minimize));

    assert!(data_dir.join("regexp.log").exists());
    assert!(data_dir.join("regexp.mdfa.interval").exists());
}

#[tokio::test]
async fn regex_run_without_keep_empties_the_data_directory() {
    let ws = Workspace::new();
    let tools = Arc::new(ScriptedTools::new(3));
    let context = ws.context();
    let data_dir = context.data_dir.clone();
    let request = RunRequest {
        input: "ab".into(),
        kind: InputKind::Regex,
        mode: RunMode::Exact,
        keep: false,
        verbose: false,
    };
    let (result, _) = run(&tools, context, request).await;
    assert!(result.is_ok());
    assert_eq!(std::fs::read_dir(&data_dir).unwrap().count(), 0);
}

#[tokio::test]
async fn verbose_echoes_commands_and_timings() {
    let ws = Workspace::new();
    let tools = Arc::new(ScriptedTools::new(3));
    let mut request = ws.request(threshold(3));
    request.verbose = true;
    let (result, out) = run(&tools, ws.context(), request).await;
    assert!(result.is_ok());

    let first = out.lines().next().unwrap();
    assert_eq!(
        first,
        format!("Sending logging messages to file: {}", ws.derived(".log").display())
    );
    assert!(out.contains("==== pruning minimum DFA. Command: /tools/prune.x"));
    assert!(out.contains("==== compute A^p pruned automaton and check language width. Command: "));
    assert!(out.lines().any(|l| l.starts_with("Elapsed time: ")));
}

#[tokio::test]
async fn log_is_appended_across_runs() {
    let ws = Workspace::new();
    for _ in 0..2 {
        let tools = Arc::new(ScriptedTools::new(3));
        let mut request = ws.request(threshold(3));
        request.keep = true;
        let (result, _) = run(&tools, ws.context(), request).await;
        assert!(result.is_ok());
    }
    let log = std::fs::read_to_string(ws.derived(".log")).unwrap();
    assert_eq!(log.matches("=== detwidth run").count(), 2);
}

#[test]
fn missing_log_directory_is_a_tool_error() {
    let ws = Workspace::new();
    let mut request = ws.request(threshold(3));
    request.input = "/no/such/dir/lang.dfa".into();
    let runner: Arc<dyn ProcessRunner> = Arc::new(ScriptedTools::new(3));
    let err = Pipeline::prepare(runner, ws.context(), request, Vec::new()).err().unwrap();
    assert_matches!(err, RuntimeError::Tool(ToolError::Log { .. }));
}
