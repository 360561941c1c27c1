//! # Types Module
//!
//! Data structures passed between comparators and the verification job.

use serde::Serialize;
use util::relation::Relation;

/// Outcome of comparing two normalized tables.
///
/// The tables are returned in the form the comparator actually compared
/// (for example after reordering), so a mismatch can be inspected as seen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub expected: Relation,
    pub actual: Relation,
    /// `None` when the tables are equivalent, otherwise why they are not.
    pub mismatch: Option<String>,
}

impl Comparison {
    pub fn matched(expected: Relation, actual: Relation) -> Self {
        Self {
            expected,
            actual,
            mismatch: None,
        }
    }

    pub fn mismatched(expected: Relation, actual: Relation, reason: impl Into<String>) -> Self {
        Self {
            expected,
            actual,
            mismatch: Some(reason.into()),
        }
    }

    pub fn is_match(&self) -> bool {
        self.mismatch.is_none()
    }
}
