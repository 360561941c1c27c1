//! Interpreter backend: runs a scripting snippet in a separate interpreter process.
//!
//! The snippet (prefixed with the configured prelude) is written as the program
//! file, the relations go into `input.json`, and a fixed driver script loads the
//! snippet into a fresh namespace, calls the function named after the task with
//! one keyword argument per relation, and writes the result to `output.json`.

use super::{ExecutionBackend, RunJob, run_process, work_dir, write_file};
use crate::error::RunnerError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::fs;
use util::execution_config::{ExecutionLimits, InterpreterOptions};
use util::languages::LanguageFamily;
use util::relation::{Output, Relation, Scalar};

const BACKEND: &str = "interpreter";
const DRIVER_FILE: &str = "driver.py";
const INPUT_FILE: &str = "input.json";
const OUTPUT_FILE: &str = "output.json";

const DRIVER: &str = r#"import json
import math
import sys


def _plain(value):
    if hasattr(value, "item") and getattr(value, "ndim", 1) == 0:
        value = value.item()
    elif hasattr(value, "tolist") and not isinstance(value, (str, bytes)):
        value = value.tolist()
    if isinstance(value, float) and math.isnan(value):
        return None
    if isinstance(value, float) and math.isinf(value):
        return {"$float": "inf" if value > 0 else "-inf"}
    if isinstance(value, dict):
        return {str(k): _plain(v) for k, v in value.items()}
    if isinstance(value, (list, tuple, set, frozenset)):
        return [_plain(v) for v in value]
    if value is None or isinstance(value, (bool, int, float, str)):
        return value
    return str(value)


def _encode(result):
    if hasattr(result, "columns") and hasattr(result, "itertuples"):
        return {
            "kind": "table",
            "columns": [str(c) for c in result.columns],
            "rows": [[_plain(c) for c in row] for row in result.itertuples(index=False, name=None)],
        }
    if hasattr(result, "to_list") and hasattr(result, "index"):
        return {"kind": "value", "value": _plain(result.to_list())}
    return {"kind": "value", "value": _plain(result)}


def main():
    with open("input.json") as f:
        request = json.load(f)
    with open(request["program"]) as f:
        code = compile(f.read(), request["program"], "exec")
    namespace = {"__name__": "__snippet__"}
    exec(code, namespace)

    func = namespace.get(request["task"])
    if not callable(func):
        sys.stderr.write("no function named %r is defined\n" % request["task"])
        sys.exit(2)

    kwargs = {}
    for name, rel in request["relations"].items():
        if request["tabular"]:
            import pandas as pd
            kwargs[name] = pd.DataFrame(rel["records"], columns=rel["columns"])
        else:
            kwargs[name] = rel["records"]

    with open("output.json", "w") as f:
        json.dump(_encode(func(**kwargs)), f, allow_nan=False)


main()
"#;

/// What the driver writes back.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum DriverOutput {
    Table {
        columns: Vec<String>,
        rows: Vec<Vec<Scalar>>,
    },
    Value {
        value: Value,
    },
}

impl DriverOutput {
    fn into_output(self) -> Result<Output, RunnerError> {
        match self {
            DriverOutput::Table { columns, rows } => Relation::with_rows(columns, rows)
                .map(Output::Table)
                .map_err(|e| RunnerError::backend(BACKEND, format!("malformed table result: {e}"))),
            DriverOutput::Value { value } => Ok(Output::from_json(value)),
        }
    }
}

pub struct InterpreterBackend {
    options: InterpreterOptions,
    limits: ExecutionLimits,
    tabular: bool,
}

impl InterpreterBackend {
    pub fn new(options: InterpreterOptions, limits: ExecutionLimits, tabular: bool) -> Self {
        Self {
            options,
            limits,
            tabular,
        }
    }

    /// Prelude lines followed by the snippet.
    pub fn program_text(&self, source: &str) -> String {
        let mut text = self.options.prelude.join("\n");
        if !text.is_empty() {
            text.push_str("\n\n");
        }
        text.push_str(source);
        text.push('\n');
        text
    }

    /// The driver's view of the input. Tabular languages get column-sorted
    /// relations; the others get the records exactly as stored in the task.
    pub fn input_document(&self, job: &RunJob<'_>) -> Value {
        let mut relations = Map::new();
        for (name, relation) in job.relations {
            let records = if self.tabular {
                json!(relation.records())
            } else {
                json!(job.raw_input.get(name).cloned().unwrap_or_default())
            };
            relations.insert(
                name.clone(),
                json!({ "columns": relation.columns(), "records": records }),
            );
        }
        json!({
            "task": job.task_id,
            "program": LanguageFamily::EmbeddedInterpreter { tabular: self.tabular }.program_file_name(),
            "tabular": self.tabular,
            "relations": relations,
        })
    }
}

#[async_trait]
impl ExecutionBackend for InterpreterBackend {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn run(&self, job: &RunJob<'_>) -> Result<Output, RunnerError> {
        let dir = work_dir(&self.limits, BACKEND)?;
        let program_file =
            LanguageFamily::EmbeddedInterpreter { tabular: self.tabular }.program_file_name();

        write_file(dir.path(), program_file, &self.program_text(job.source), BACKEND)?;
        write_file(dir.path(), DRIVER_FILE, DRIVER, BACKEND)?;
        write_file(
            dir.path(),
            INPUT_FILE,
            &self.input_document(job).to_string(),
            BACKEND,
        )?;

        run_process(
            &self.options.program,
            &[DRIVER_FILE.to_string()],
            dir.path(),
            self.limits.timeout(),
            BACKEND,
        )
        .await?;

        let raw = fs::read_to_string(dir.path().join(OUTPUT_FILE))
            .map_err(|e| RunnerError::backend(BACKEND, format!("no result was written: {e}")))?;
        let result: DriverOutput = serde_json::from_str(&raw)
            .map_err(|e| RunnerError::backend(BACKEND, format!("unreadable result: {e}")))?;
        result.into_output()
    }
}
