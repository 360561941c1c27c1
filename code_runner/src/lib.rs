//! Runs one benchmark program against its task's sample input and checks the
//! result against the task's expected output.
//!
//! The pipeline is: dispatch the language to a family, materialize the sample
//! input, run the family's backend, then hand both results to the marker.
//! Dispatch happens first, so an unknown language never touches the disk.

pub mod backends;
pub mod dispatcher;
pub mod error;
pub mod materializer;

use crate::backends::{ExecutionBackend, InterpreterBackend, LogicBackend, RelationalBackend, RunJob};
use crate::dispatcher::Dispatcher;
use crate::error::RunnerError;
use crate::materializer::materialize;
use marker::VerificationJob;
use marker::report::VerificationReport;
use tracing::Instrument;
use util::execution_config::ExecutionConfig;
use util::languages::{LanguageCatalog, LanguageFamily};
use util::models::{program::Program, task::Task};
use util::relation::Output;

/// Picks the backend for a family, configured from `config`.
pub fn backend_for(family: LanguageFamily, config: &ExecutionConfig) -> Box<dyn ExecutionBackend> {
    match family {
        LanguageFamily::EmbeddedInterpreter { tabular } => Box::new(InterpreterBackend::new(
            config.interpreter.clone(),
            config.execution.clone(),
            tabular,
        )),
        LanguageFamily::Relational => Box::new(RelationalBackend),
        LanguageFamily::Logic => Box::new(LogicBackend::new(
            config.logic.clone(),
            config.execution.clone(),
        )),
    }
}

/// Runs `program` on `task`'s sample input and returns its raw result, unverified.
pub async fn run_program(
    task: &Task,
    program: &Program,
    catalog: &LanguageCatalog,
    config: &ExecutionConfig,
) -> Result<Output, RunnerError> {
    let family = Dispatcher::new(catalog).dispatch(&program.language)?;
    let relations = materialize(&task.sample_input)?;
    let expected = task.expected_output();

    let backend = backend_for(family, config);
    let job = RunJob {
        task_id: &task.id,
        source: &program.source,
        relations: &relations,
        raw_input: &task.sample_input,
        expected: &expected,
    };

    tracing::info!(backend = backend.name(), relations = relations.len(), "running program");
    let output = backend.run(&job).await;
    match &output {
        Ok(out) => tracing::debug!(shape = out.shape(), "program finished"),
        Err(e) => tracing::error!(error = %e, "program failed"),
    }
    output
}

/// Runs `program` on `task` and verifies the result.
///
/// # Returns
/// * `Ok(VerificationReport)` with both normalized tables when the result matches.
/// * `Err(RunnerError::UnsupportedLanguage)` if the language is not in `catalog`.
/// * `Err(RunnerError::Materialization)` if the sample input is malformed.
/// * `Err(RunnerError::BackendExecution)` if the program could not be run.
/// * `Err(RunnerError::Verification)` if it ran but produced a different result.
pub async fn execute(
    task: &Task,
    program: &Program,
    catalog: &LanguageCatalog,
    config: &ExecutionConfig,
) -> Result<VerificationReport, RunnerError> {
    let span = tracing::info_span!("execute", task = %task.id, language = %program.language);

    async move {
        let actual = run_program(task, program, catalog, config).await?;
        let report = VerificationJob::new(task.expected_output(), actual).verify()?;
        tracing::info!("verification passed");
        Ok(report)
    }
    .instrument(span)
    .await
}
