//! Result Normalizer
//!
//! Turns every [`Output`] shape into a [`Relation`]. The rule is a single
//! match over the tagged variants, in this order:
//!
//! 1. `Table` passes through unchanged.
//! 2. `Records` keeps the first record's key order; keys first seen in later
//!    records are appended after them, and absent keys become `Null`.
//! 3. `Sequence` becomes a single column named `"0"`, one row per element.
//! 4. `Scalar` becomes a one-row, one-column relation, column `"0"`.
//!
//! Normalization never fails.

use util::relation::{Output, Relation};

/// Column name given to results that carry no names of their own.
pub const POSITIONAL_COLUMN: &str = "0";

pub fn to_relation(output: Output) -> Relation {
    match output {
        Output::Table(rel) => rel,
        Output::Records(records) => {
            let mut columns: Vec<String> = Vec::new();
            for record in &records {
                for key in record.keys() {
                    if !columns.contains(key) {
                        columns.push(key.clone());
                    }
                }
            }
            Relation::from_records(columns, &records)
        }
        Output::Sequence(values) => Relation::single_column(POSITIONAL_COLUMN, values),
        Output::Scalar(value) => Relation::single_column(POSITIONAL_COLUMN, vec![value]),
    }
}
