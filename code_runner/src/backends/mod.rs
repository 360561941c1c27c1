//! Execution backends, one per language family.
//!
//! Every backend takes a [`RunJob`] and produces a raw [`Output`]; turning it
//! into a comparable table is the verifier's job. Backends that need files get
//! a fresh working directory that is removed when the run ends, whether it
//! succeeded, failed or timed out.

pub mod interpreter;
pub mod logic;
pub mod relational;

use crate::error::RunnerError;
use crate::materializer::Relations;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::Command;
use tokio::time::timeout;
use util::execution_config::ExecutionLimits;
use util::relation::{Output, SampleInput};

pub use interpreter::InterpreterBackend;
pub use logic::LogicBackend;
pub use relational::RelationalBackend;

/// Everything a backend needs for a single run.
pub struct RunJob<'a> {
    pub task_id: &'a str,
    pub source: &'a str,
    /// Column-sorted input relations.
    pub relations: &'a Relations,
    /// The sample input exactly as stored, for backends that want raw records.
    pub raw_input: &'a SampleInput,
    /// Used to derive output schemas; never compared here.
    pub expected: &'a Output,
}

#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    async fn run(&self, job: &RunJob<'_>) -> Result<Output, RunnerError>;
}

/// Creates a disposable working directory under `limits.work_root`,
/// or the system temp dir when unset.
pub(crate) fn work_dir(limits: &ExecutionLimits, backend: &'static str) -> Result<TempDir, RunnerError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("bench-run-");
    let dir = match &limits.work_root {
        Some(root) => {
            util::paths::ensure_dir(root)
                .map_err(|e| RunnerError::backend(backend, format!("cannot create {root:?}: {e}")))?;
            builder.tempdir_in(root)
        }
        None => builder.tempdir(),
    };
    dir.map_err(|e| RunnerError::backend(backend, format!("cannot create working directory: {e}")))
}

pub(crate) fn write_file(
    dir: &Path,
    name: &str,
    contents: &str,
    backend: &'static str,
) -> Result<(), RunnerError> {
    std::fs::write(dir.join(name), contents)
        .map_err(|e| RunnerError::backend(backend, format!("cannot write {name}: {e}")))
}

/// Runs `program args..` inside `dir` and waits at most `limit`.
///
/// A child still running at the deadline is killed. Any non-zero exit is an
/// error carrying the child's stderr verbatim.
pub(crate) async fn run_process(
    program: &str,
    args: &[String],
    dir: &Path,
    limit: Duration,
    backend: &'static str,
) -> Result<String, RunnerError> {
    tracing::debug!(program, ?args, dir = %dir.display(), "spawning");

    let child = Command::new(program)
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| RunnerError::backend(backend, format!("failed to start '{program}': {e}")))?;

    let output = match timeout(limit, child.wait_with_output()).await {
        Ok(result) => result
            .map_err(|e| RunnerError::backend(backend, format!("failed to wait for '{program}': {e}")))?,
        Err(_) => {
            tracing::warn!(program, timeout_secs = limit.as_secs(), "run timed out");
            return Err(RunnerError::backend(
                backend,
                format!("'{program}' timed out after {}s", limit.as_secs()),
            ));
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr);

    if output.status.success() {
        Ok(stdout)
    } else {
        Err(RunnerError::backend(
            backend,
            format!(
                "Execution failed (exit code {}):\nSTDOUT:\n{}\nSTDERR:\n{}",
                output.status.code().unwrap_or(-1),
                stdout,
                stderr
            ),
        ))
    }
}
