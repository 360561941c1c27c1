//! Input Materializer
//!
//! Turns a task's sample input into one [`Relation`] per entry. Columns are
//! sorted by name so every backend sees the same layout no matter how the
//! keys were ordered in the task file. Cells keep their native types.

use crate::error::RunnerError;
use indexmap::IndexMap;
use util::relation::{Relation, SampleInput};

/// Materialized input relations, in task-file order.
pub type Relations = IndexMap<String, Relation>;

pub fn materialize(input: &SampleInput) -> Result<Relations, RunnerError> {
    let mut relations = Relations::with_capacity(input.len());

    for (name, rows) in input {
        let mut columns: Vec<String> = rows
            .first()
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default();
        columns.sort();

        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() || !columns.iter().all(|c| row.contains_key(c)) {
                let mut keys: Vec<&String> = row.keys().collect();
                keys.sort();
                return Err(RunnerError::Materialization {
                    relation: name.clone(),
                    reason: format!("row {i} has columns {keys:?}, expected {columns:?}"),
                });
            }
        }

        relations.insert(name.clone(), Relation::from_records(columns, rows));
    }

    Ok(relations)
}
