//! Logic backend: runs a rule program through an external evaluator.
//!
//! Declarations for every input relation and for the task's output relation are
//! synthesized from the data and prepended to the user's rules. Facts are written
//! as header-less TSV next to the program, and the evaluator is expected to
//! leave `<task>.csv` (also TSV) in the same directory.

use super::{ExecutionBackend, RunJob, run_process, work_dir, write_file};
use crate::error::RunnerError;
use async_trait::async_trait;
use marker::normalizer::to_relation;
use std::fs;
use std::path::Path;
use util::execution_config::{ExecutionLimits, LogicOptions};
use util::languages::LanguageFamily;
use util::relation::{Output, Relation, Scalar};

const BACKEND: &str = "logic";

/// Attribute type tokens understood by the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    Number,
    Symbol,
    Float,
}

impl AttributeType {
    pub fn token(&self) -> &'static str {
        match self {
            AttributeType::Number => "number",
            AttributeType::Symbol => "symbol",
            AttributeType::Float => "float",
        }
    }

    /// Whole numbers are `number`, any fractional or missing value among numbers
    /// widens to `float`, everything else (including an empty column) is `symbol`.
    pub fn infer<'a>(cells: impl IntoIterator<Item = &'a Scalar>) -> Self {
        let (mut ints, mut floats, mut nulls, mut other) = (false, false, false, false);
        for cell in cells {
            match cell {
                Scalar::Int(_) => ints = true,
                Scalar::Float(_) => floats = true,
                Scalar::Null => nulls = true,
                Scalar::Bool(_) | Scalar::Text(_) => other = true,
            }
        }
        if other {
            AttributeType::Symbol
        } else if floats || (ints && nulls) {
            AttributeType::Float
        } else if ints {
            AttributeType::Number
        } else {
            AttributeType::Symbol
        }
    }

    /// `integral` is true when every non-empty field of the column reads as an
    /// integer. The evaluator prints `2.0` as `2`, so such a column is integral.
    fn parse(&self, field: &str, integral: bool) -> Scalar {
        if field.is_empty() && *self != AttributeType::Symbol {
            return Scalar::Null;
        }
        match self {
            AttributeType::Symbol => Scalar::Text(field.to_string()),
            _ if integral => field
                .parse::<i64>()
                .map(Scalar::Int)
                .unwrap_or_else(|_| Scalar::Text(field.to_string())),
            _ => field
                .parse::<f64>()
                .map(Scalar::Float)
                .unwrap_or_else(|_| Scalar::Text(field.to_string())),
        }
    }
}

/// One declared attribute. `name` is the column name, prefixed with `x` when
/// the column name is an integer literal the evaluator would reject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub column: String,
    pub name: String,
    pub ty: AttributeType,
}

pub fn attribute_name(column: &str) -> String {
    if column.trim().parse::<i64>().is_ok() {
        format!("x{column}")
    } else {
        column.to_string()
    }
}

pub fn infer_schema(relation: &Relation) -> Vec<Attribute> {
    relation
        .columns()
        .iter()
        .enumerate()
        .map(|(i, column)| Attribute {
            column: column.clone(),
            name: attribute_name(column),
            ty: AttributeType::infer(relation.rows().iter().map(|row| &row[i])),
        })
        .collect()
}

pub fn declaration(relation: &str, schema: &[Attribute]) -> String {
    let attrs: Vec<String> = schema
        .iter()
        .map(|a| format!("{}:{}", a.name, a.ty.token()))
        .collect();
    format!(".decl {relation}({})", attrs.join(", "))
}

/// Header-less TSV, one line per row. Nulls are written as empty fields.
/// Text containing a tab or line break has no fact encoding and is refused.
pub fn facts_tsv(name: &str, relation: &Relation) -> Result<String, RunnerError> {
    let mut out = String::new();
    for (n, row) in relation.rows().iter().enumerate() {
        let mut fields = Vec::with_capacity(row.len());
        for cell in row {
            match cell {
                Scalar::Null => fields.push(String::new()),
                Scalar::Text(s) if s.contains(['\t', '\n', '\r']) => {
                    return Err(RunnerError::backend(
                        BACKEND,
                        format!(
                            "relation '{name}' row {n}: text {s:?} contains a tab or line break and cannot be written as a fact"
                        ),
                    ));
                }
                other => fields.push(other.to_string()),
            }
        }
        out.push_str(&fields.join("\t"));
        out.push('\n');
    }
    Ok(out)
}

/// Reads evaluator output into a relation named by `schema`'s columns.
/// Blank lines are ignored; a line with the wrong number of fields is an error.
pub fn parse_output(text: &str, schema: &[Attribute]) -> Result<Relation, RunnerError> {
    let columns: Vec<String> = schema.iter().map(|a| a.column.clone()).collect();
    let mut relation = Relation::new(columns);
    let mut lines = Vec::new();

    for (n, line) in text.lines().enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != schema.len() {
            return Err(RunnerError::backend(
                BACKEND,
                format!(
                    "output line {} has {} fields, expected {}",
                    n + 1,
                    fields.len(),
                    schema.len()
                ),
            ));
        }
        lines.push(fields);
    }

    let integral: Vec<bool> = (0..schema.len())
        .map(|i| {
            lines
                .iter()
                .all(|fields| fields[i].is_empty() || fields[i].parse::<i64>().is_ok())
        })
        .collect();
    for fields in lines {
        let row = fields
            .iter()
            .zip(schema)
            .zip(&integral)
            .map(|((field, attr), integral)| attr.ty.parse(field, *integral))
            .collect();
        relation
            .push_row(row)
            .map_err(|e| RunnerError::backend(BACKEND, e))?;
    }

    Ok(relation)
}

pub struct LogicBackend {
    options: LogicOptions,
    limits: ExecutionLimits,
}

impl LogicBackend {
    pub fn new(options: LogicOptions, limits: ExecutionLimits) -> Self {
        Self { options, limits }
    }

    /// Declarations plus the user's rules. Also writes one facts file per input.
    fn prepare(&self, dir: &Path, job: &RunJob<'_>) -> Result<Vec<Attribute>, RunnerError> {
        let mut header = Vec::new();

        for (name, relation) in job.relations {
            if relation.width() == 0 {
                tracing::warn!(relation = %name, "skipping relation without columns");
                continue;
            }
            header.push(declaration(name, &infer_schema(relation)));
            header.push(format!(".input {name}"));
            let facts = facts_tsv(name, relation)?;
            write_file(dir, &format!("{name}.facts"), &facts, BACKEND)?;
        }

        let output_schema = infer_schema(&to_relation(job.expected.clone()));
        header.push(declaration(job.task_id, &output_schema));
        header.push(format!(".output {}", job.task_id));

        let program = format!("{}\n\n{}\n", header.join("\n"), job.source);
        write_file(dir, LanguageFamily::Logic.program_file_name(), &program, BACKEND)?;

        Ok(output_schema)
    }
}

#[async_trait]
impl ExecutionBackend for LogicBackend {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn run(&self, job: &RunJob<'_>) -> Result<Output, RunnerError> {
        let dir = work_dir(&self.limits, BACKEND)?;
        let output_schema = self.prepare(dir.path(), job)?;

        let mut args = self.options.args.clone();
        args.extend([
            "-F.".to_string(),
            "-D.".to_string(),
            LanguageFamily::Logic.program_file_name().to_string(),
        ]);
        run_process(
            &self.options.program,
            &args,
            dir.path(),
            self.limits.timeout(),
            BACKEND,
        )
        .await?;

        let output_path = dir.path().join(format!("{}.csv", job.task_id));
        let text = match fs::read_to_string(&output_path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(task = job.task_id, "evaluator produced no output file");
                String::new()
            }
            Err(e) => {
                return Err(RunnerError::backend(
                    BACKEND,
                    format!("cannot read {output_path:?}: {e}"),
                ));
            }
        };

        Ok(Output::Table(parse_output(&text, &output_schema)?))
    }
}
