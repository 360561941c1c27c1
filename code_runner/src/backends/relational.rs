//! Relational backend: an in-memory SQLite database per run.

use super::{ExecutionBackend, RunJob};
use crate::error::RunnerError;
use crate::materializer::Relations;
use async_trait::async_trait;
use rusqlite::{Connection, params_from_iter, types::Value};
use util::relation::{Output, Record, Scalar};

const BACKEND: &str = "relational";

pub struct RelationalBackend;

#[async_trait]
impl ExecutionBackend for RelationalBackend {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn run(&self, job: &RunJob<'_>) -> Result<Output, RunnerError> {
        let source = job.source.to_string();
        let relations = job.relations.clone();
        tokio::task::spawn_blocking(move || run_query(&source, &relations))
            .await
            .map_err(|e| RunnerError::backend(BACKEND, format!("query task failed: {e}")))?
    }
}

/// Loads every relation into a fresh in-memory database and runs `source`.
///
/// The source is split on `;` and the pieces run in order. Only the rows of
/// the last statement are kept. A `;` inside a string literal is not special
/// cased. The connection is closed when this returns, on every path.
pub fn run_query(source: &str, relations: &Relations) -> Result<Output, RunnerError> {
    let mut conn = Connection::open_in_memory().map_err(engine_error)?;
    load_relations(&mut conn, relations)?;

    let statements: Vec<&str> = source
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let mut last: (Vec<String>, Vec<Vec<Scalar>>) = (Vec::new(), Vec::new());
    for (i, sql) in statements.iter().enumerate() {
        tracing::debug!(statement = i, "executing");
        last = run_statement(&conn, sql)?;
    }

    let (columns, rows) = last;
    Ok(shape_result(columns, rows))
}

fn load_relations(conn: &mut Connection, relations: &Relations) -> Result<(), RunnerError> {
    let tx = conn.transaction().map_err(engine_error)?;
    for (name, relation) in relations {
        if relation.width() == 0 {
            tracing::warn!(relation = %name, "skipping relation without columns");
            continue;
        }
        let columns: Vec<String> = relation.columns().iter().map(|c| quote_ident(c)).collect();
        tx.execute(
            &format!("CREATE TABLE {} ({})", quote_ident(name), columns.join(", ")),
            [],
        )
        .map_err(engine_error)?;

        let placeholders = vec!["?"; relation.width()].join(", ");
        let insert = format!("INSERT INTO {} VALUES ({placeholders})", quote_ident(name));
        let mut stmt = tx.prepare(&insert).map_err(engine_error)?;
        for row in relation.rows() {
            stmt.execute(params_from_iter(row.iter().map(to_sql_value)))
                .map_err(engine_error)?;
        }
    }
    tx.commit().map_err(engine_error)
}

fn run_statement(conn: &Connection, sql: &str) -> Result<(Vec<String>, Vec<Vec<Scalar>>), RunnerError> {
    let mut stmt = conn.prepare(sql).map_err(engine_error)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    if columns.is_empty() {
        stmt.raw_execute().map_err(engine_error)?;
        return Ok((columns, Vec::new()));
    }

    let width = columns.len();
    let rows = stmt
        .query_map([], |row| {
            (0..width)
                .map(|i| row.get::<_, Value>(i).map(from_sql_value))
                .collect::<Result<Vec<_>, _>>()
        })
        .map_err(engine_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(engine_error)?;

    Ok((columns, rows))
}

/// Single-column results flatten to a sequence; anything else becomes records.
fn shape_result(columns: Vec<String>, rows: Vec<Vec<Scalar>>) -> Output {
    if rows.is_empty() || columns.len() == 1 {
        return Output::Sequence(rows.into_iter().filter_map(|r| r.into_iter().next()).collect());
    }
    let records: Vec<Record> = rows
        .into_iter()
        .map(|row| columns.iter().cloned().zip(row).collect())
        .collect();
    Output::Records(records)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn to_sql_value(cell: &Scalar) -> Value {
    match cell {
        Scalar::Null => Value::Null,
        Scalar::Bool(b) => Value::Integer(i64::from(*b)),
        Scalar::Int(i) => Value::Integer(*i),
        Scalar::Float(f) => Value::Real(*f),
        Scalar::Text(s) => Value::Text(s.clone()),
    }
}

fn from_sql_value(value: Value) -> Scalar {
    match value {
        Value::Null => Scalar::Null,
        Value::Integer(i) => Scalar::Int(i),
        Value::Real(f) => Scalar::Float(f),
        Value::Text(s) => Scalar::Text(s),
        Value::Blob(b) => Scalar::Text(String::from_utf8_lossy(&b).into_owned()),
    }
}

fn engine_error(e: rusqlite::Error) -> RunnerError {
    RunnerError::backend(BACKEND, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materializer::materialize;

    fn relations(json: &str) -> Relations {
        materialize(&serde_json::from_str(json).unwrap()).unwrap()
    }

    #[test]
    fn test_single_column_flattens() {
        let rels = relations(r#"{"t": [{"x": 3}, {"x": 1}, {"x": 2}]}"#);
        let out = run_query("SELECT x FROM t ORDER BY x", &rels).unwrap();
        assert_eq!(
            out,
            Output::Sequence(vec![Scalar::Int(1), Scalar::Int(2), Scalar::Int(3)])
        );
    }

    #[test]
    fn test_multi_column_rows_become_records() {
        let rels = relations(r#"{"t": [{"k": "a", "v": 1}, {"k": "b", "v": 2}]}"#);
        let out = run_query("SELECT k, v * 10 AS v FROM t ORDER BY k", &rels).unwrap();
        let Output::Records(records) = out else {
            panic!("expected records");
        };
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["k"], Scalar::from("b"));
        assert_eq!(records[1]["v"], Scalar::Int(20));
        let keys: Vec<&String> = records[0].keys().collect();
        assert_eq!(keys, vec!["k", "v"]);
    }

    #[test]
    fn test_only_last_statement_is_kept() {
        let rels = relations(r#"{"t": [{"x": 1}]}"#);
        let src = "CREATE TABLE u AS SELECT x + 1 AS y FROM t;\nSELECT 99;\nSELECT y FROM u;\n";
        let out = run_query(src, &rels).unwrap();
        assert_eq!(out, Output::Sequence(vec![Scalar::Int(2)]));
    }

    #[test]
    fn test_empty_result() {
        let rels = relations(r#"{"t": [{"a": 1, "b": 2}]}"#);
        let out = run_query("SELECT a, b FROM t WHERE a > 5", &rels).unwrap();
        assert_eq!(out, Output::Sequence(vec![]));
    }

    #[test]
    fn test_native_types_round_trip() {
        let rels = relations(r#"{"t": [{"f": 1.5, "s": "hi", "n": null}]}"#);
        let out = run_query("SELECT f, s, n FROM t", &rels).unwrap();
        let Output::Records(records) = out else {
            panic!("expected records");
        };
        assert_eq!(records[0]["f"], Scalar::Float(1.5));
        assert_eq!(records[0]["s"], Scalar::from("hi"));
        assert_eq!(records[0]["n"], Scalar::Null);
    }

    #[test]
    fn test_engine_error_is_backend_error() {
        let rels = relations(r#"{"t": [{"x": 1}]}"#);
        let err = run_query("SELECT nope FROM t", &rels).unwrap_err();
        match err {
            RunnerError::BackendExecution { backend, diagnostic } => {
                assert_eq!(backend, "relational");
                assert!(diagnostic.contains("nope"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_relation_without_columns_is_skipped() {
        let rels = relations(r#"{"empty": [], "t": [{"x": 7}]}"#);
        let out = run_query("SELECT x FROM t", &rels).unwrap();
        assert_eq!(out, Output::Sequence(vec![Scalar::Int(7)]));
        assert!(run_query("SELECT * FROM empty", &rels).is_err());
    }

    #[test]
    fn test_quoted_identifiers() {
        let rels = relations(r#"{"order": [{"group": 1}]}"#);
        let out = run_query(r#"SELECT "group" FROM "order""#, &rels).unwrap();
        assert_eq!(out, Output::Sequence(vec![Scalar::Int(1)]));
    }

    #[tokio::test]
    async fn test_backend_runs_query_off_the_async_thread() {
        let input = serde_json::from_str(r#"{"t": [{"x": 1}, {"x": 2}]}"#).unwrap();
        let rels = materialize(&input).unwrap();
        let expected = Output::Scalar(Scalar::Int(3));
        let job = RunJob {
            task_id: "total",
            source: "SELECT SUM(x) FROM t",
            relations: &rels,
            raw_input: &input,
            expected: &expected,
        };

        let out = RelationalBackend.run(&job).await.unwrap();
        assert_eq!(out, Output::Sequence(vec![Scalar::Int(3)]));

        let broken = RunJob {
            source: "SELECT nope FROM t",
            ..job
        };
        let err = RelationalBackend.run(&broken).await.unwrap_err();
        assert!(matches!(err, RunnerError::BackendExecution { backend: "relational", .. }));
    }
}
