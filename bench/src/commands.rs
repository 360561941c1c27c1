use anyhow::{Context, Result, anyhow};
use code_runner::error::RunnerError;
use code_runner::{execute, run_program};
use marker::normalizer::to_relation;
use serde::Serialize;
use std::path::{Path, PathBuf};
use util::execution_config::ExecutionConfig;
use util::languages::LanguageCatalog;
use util::models::program::{Program, load_programs_for};
use util::models::task::Task;
use util::relation::{Record, Relation, Scalar};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    /// Ran, but the result differs from the expected one.
    Fail,
    /// Could not be run: invalid program, unknown language, bad input or backend failure.
    Error,
}

/// The verdict for one program.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub program: String,
    pub language: String,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Relation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<Relation>,
}

impl Outcome {
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }
}

fn load_task(task_id: &str) -> Result<Task> {
    let task = Task::load(task_id).map_err(|e| anyhow!(e))?;
    task.validate().map_err(|e| anyhow!(e))?;
    Ok(task)
}

/// Named programs, or every stored program for the task when `paths` is empty.
fn load_programs(task_id: &str, paths: &[PathBuf]) -> Result<Vec<(String, Program)>> {
    if paths.is_empty() {
        let programs = load_programs_for(task_id).map_err(|e| anyhow!(e))?;
        return Ok(programs.into_iter().map(|p| (p.file_name(), p)).collect());
    }
    paths
        .iter()
        .map(|path| {
            let program = Program::from_path(path).map_err(|e| anyhow!(e))?;
            let label = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| program.file_name());
            Ok((label, program))
        })
        .collect()
}

async fn verify_program(
    label: String,
    task: &Task,
    program: &Program,
    catalog: &LanguageCatalog,
    config: &ExecutionConfig,
) -> Outcome {
    let mut outcome = Outcome {
        program: label,
        language: program.language.clone(),
        verdict: Verdict::Error,
        message: None,
        expected: None,
        actual: None,
    };

    if let Err(e) = program.validate(catalog) {
        tracing::warn!(program = %outcome.program, error = %e, "invalid program");
        outcome.message = Some(e);
        return outcome;
    }
    if program.task != task.id {
        tracing::warn!(program = %outcome.program, declared = %program.task, task = %task.id, "program declares a different task");
    }

    match execute(task, program, catalog, config).await {
        Ok(report) => {
            outcome.verdict = Verdict::Pass;
            outcome.expected = Some(report.expected);
            outcome.actual = Some(report.actual);
        }
        Err(RunnerError::Verification(e)) => {
            outcome.verdict = Verdict::Fail;
            outcome.message = Some(e.to_string());
            outcome.expected = Some(e.expected().clone());
            outcome.actual = Some(e.actual().clone());
        }
        Err(e) => outcome.message = Some(e.to_string()),
    }
    outcome
}

/// Runs and verifies programs for `task_id`, one after another.
pub async fn verify_task(
    task_id: &str,
    paths: &[PathBuf],
    catalog: &LanguageCatalog,
    config: &ExecutionConfig,
) -> Result<Vec<Outcome>> {
    let task = load_task(task_id)?;
    let programs = load_programs(task_id, paths)?;
    if programs.is_empty() {
        tracing::warn!(task = task_id, "no programs to verify");
    }

    let mut outcomes = Vec::with_capacity(programs.len());
    for (label, program) in programs {
        outcomes.push(verify_program(label, &task, &program, catalog, config).await);
    }

    let passed = outcomes.iter().filter(|o| o.passed()).count();
    tracing::info!(task = task_id, passed, total = outcomes.len(), "verification finished");
    Ok(outcomes)
}

/// Runs one program and returns its result normalized to a table, unverified.
pub async fn show(
    task_id: &str,
    path: &Path,
    catalog: &LanguageCatalog,
    config: &ExecutionConfig,
) -> Result<Relation> {
    let task = load_task(task_id)?;
    let program = Program::from_path(path).map_err(|e| anyhow!(e))?;
    let output = run_program(&task, &program, catalog, config)
        .await
        .with_context(|| format!("running {}", path.display()))?;
    Ok(to_relation(output))
}

/// The catalog as a printable table.
pub fn languages(catalog: &LanguageCatalog) -> Relation {
    let records: Vec<Record> = catalog
        .iter()
        .map(|lang| {
            Record::from([
                ("id".to_string(), Scalar::from(lang.id.as_str())),
                ("name".to_string(), Scalar::from(lang.name.as_str())),
                ("family".to_string(), Scalar::from(lang.family().label())),
                ("tabular".to_string(), Scalar::Bool(lang.tabular)),
            ])
        })
        .collect();
    let columns = ["id", "name", "family", "tabular"].map(String::from).to_vec();
    Relation::from_records(columns, &records)
}

pub fn render_text(outcomes: &[Outcome], verbose: bool) -> String {
    let mut out = String::new();
    for o in outcomes {
        let tag = match o.verdict {
            Verdict::Pass => "PASS ",
            Verdict::Fail => "FAIL ",
            Verdict::Error => "ERROR",
        };
        out.push_str(&format!("{tag} {} ({})\n", o.program, o.language));
        if let Some(message) = &o.message {
            for line in message.lines() {
                out.push_str(&format!("      {line}\n"));
            }
        } else if verbose {
            if let Some(actual) = &o.actual {
                for line in actual.to_string().lines() {
                    out.push_str(&format!("      {line}\n"));
                }
            }
        }
    }
    let passed = outcomes.iter().filter(|o| o.passed()).count();
    out.push_str(&format!("{passed}/{} passed\n", outcomes.len()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(verdict: Verdict, message: Option<&str>) -> Outcome {
        Outcome {
            program: "sql_basic_ann.json".into(),
            language: "sql".into(),
            verdict,
            message: message.map(String::from),
            expected: None,
            actual: Some(Relation::single_column("0", vec![Scalar::Int(6)])),
        }
    }

    #[test]
    fn test_render_text() {
        let text = render_text(
            &[
                outcome(Verdict::Pass, None),
                outcome(Verdict::Error, Some("sql backend failed:\nno such table: t")),
            ],
            false,
        );
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "PASS  sql_basic_ann.json (sql)");
        assert_eq!(lines[1], "ERROR sql_basic_ann.json (sql)");
        assert_eq!(lines[3], "      no such table: t");
        assert_eq!(lines.last().copied(), Some("1/2 passed"));
    }

    #[test]
    fn test_render_text_verbose_shows_result() {
        let text = render_text(&[outcome(Verdict::Pass, None)], true);
        assert!(text.contains("      (1 rows)"));
    }

    #[test]
    fn test_outcome_json() {
        let value = serde_json::to_value(outcome(Verdict::Fail, Some("mismatch"))).unwrap();
        assert_eq!(value["verdict"], "fail");
        assert_eq!(value["message"], "mismatch");
        assert!(value.get("expected").is_none());
    }

    #[test]
    fn test_languages_table() {
        let table = languages(&LanguageCatalog::default());
        assert_eq!(table.len(), 5);
        assert_eq!(table.rows()[2][2], Scalar::from("interpreter"));
        assert_eq!(table.rows()[2][3], Scalar::Bool(true));
        assert_eq!(table.rows()[4][2], Scalar::from("logic"));
    }
}
