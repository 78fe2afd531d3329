//! Real process runner using `tokio::process::Command`.

use std::fs::File;
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tracing::debug;

use crate::errors::ToolError;
use crate::log::RunLog;
use crate::traits::{Invocation, OutputTarget, ProcessOutcome, ProcessRunner};

/// Real subprocess execution backed by `tokio::process::Command`.
///
/// No timeout: a collaborator that hangs blocks the run.
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, invocation: &Invocation, log: &RunLog) -> Result<ProcessOutcome, ToolError> {
        let start = Instant::now();

        let stdin = match &invocation.stdin {
            Some(path) => Stdio::from(File::open(path).map_err(|source| ToolError::Redirect {
                path: path.clone(),
                source,
            })?),
            None => Stdio::null(),
        };
        let stdout = match &invocation.stdout {
            OutputTarget::Log => log.stdio()?,
            OutputTarget::File(path) => {
                Stdio::from(File::create(path).map_err(|source| ToolError::Redirect {
                    path: path.clone(),
                    source,
                })?)
            }
        };

        let mut cmd = tokio::process::Command::new(&invocation.program);
        let _ = cmd
            .args(&invocation.args)
            .stdin(stdin)
            .stdout(stdout)
            .stderr(log.stdio()?);
        if let Some(dir) = &invocation.working_directory {
            let _ = cmd.current_dir(dir);
        }

        let command = invocation.command_line();
        debug!(stage = %invocation.stage, command = %command, "spawning collaborator");
        log.note(&format!("$ {command}"))?;

        let status = cmd.status().await.map_err(|source| ToolError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

        let outcome = ProcessOutcome {
            exit_code: status.code().unwrap_or(-1),
            duration: start.elapsed(),
        };
        debug!(
            stage = %invocation.stage,
            exit_code = outcome.exit_code,
            duration_ms = u64::try_from(outcome.duration.as_millis()).unwrap_or(u64::MAX),
            "collaborator completed"
        );
        Ok(outcome)
    }
}
