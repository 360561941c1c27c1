//! Tabular data model shared by the runner and the marker.
//!
//! - [`Scalar`]: one cell, keeping its native JSON type.
//! - [`Record`]: one row as an ordered column-name -> value mapping.
//! - [`Relation`]: the canonical table every result is normalized into.
//! - [`Output`]: the tagged shapes a backend result or an expected answer can take.

mod output;
mod scalar;
mod table;

pub use output::Output;
pub use scalar::{Scalar, ScalarKind};
pub use table::Relation;

use indexmap::IndexMap;

/// One row as it appears in a task file, keys in source order.
pub type Record = IndexMap<String, Scalar>;

/// A task's sample input: relation name -> row records, in file order.
pub type SampleInput = IndexMap<String, Vec<Record>>;
