//! # Marker Library
//!
//! Decides whether a program's result is equivalent to a task's expected answer.
//!
//! ## Key Concepts
//! - **Normalization**: every result shape (table, records, sequence, scalar) becomes a
//!   [`Relation`](util::relation::Relation), see [`normalizer`].
//! - **Comparators**: pluggable strategies deciding equivalence of two normalized tables.
//!   The default sorts on the leading column and compares cell by cell.
//! - **VerificationJob**: normalizes both sides, runs the comparator, and turns a mismatch
//!   into a [`MarkerError`](error::MarkerError) carrying both tables.

pub mod comparators;
pub mod error;
pub mod normalizer;
pub mod report;
pub mod traits;
pub mod types;

use crate::comparators::leading_column_comparator::LeadingColumnComparator;
use crate::error::MarkerError;
use crate::normalizer::to_relation;
use crate::report::VerificationReport;
use crate::traits::comparator::RelationComparator;
use util::relation::Output;

/// One expected/actual pair awaiting verification.
pub struct VerificationJob<'a> {
    expected: Output,
    actual: Output,
    comparator: Box<dyn RelationComparator + 'a>,
}

impl<'a> VerificationJob<'a> {
    pub fn new(expected: Output, actual: Output) -> Self {
        Self {
            expected,
            actual,
            comparator: Box::new(LeadingColumnComparator),
        }
    }

    /// Set a custom comparator strategy for this job.
    pub fn with_comparator<C: RelationComparator + 'a>(mut self, comparator: C) -> Self {
        self.comparator = Box::new(comparator);
        self
    }

    /// Normalize both sides and compare them.
    ///
    /// # Returns
    /// * `Ok(VerificationReport)` with both tables as compared when they are equivalent.
    /// * `Err(MarkerError::VerificationMismatch)` otherwise, with both tables attached.
    pub fn verify(self) -> Result<VerificationReport, MarkerError> {
        let expected_shape = self.expected.shape();
        let actual_shape = self.actual.shape();
        let expected = to_relation(self.expected);
        let actual = to_relation(self.actual);
        tracing::debug!(
            expected_shape,
            actual_shape,
            expected_rows = expected.len(),
            actual_rows = actual.len(),
            "normalized results"
        );

        let comparison = self.comparator.compare(expected, actual);
        match comparison.mismatch {
            None => Ok(VerificationReport {
                expected: comparison.expected,
                actual: comparison.actual,
            }),
            Some(reason) => {
                tracing::info!(%reason, "verification failed");
                Err(MarkerError::mismatch(
                    reason,
                    comparison.expected,
                    comparison.actual,
                ))
            }
        }
    }
}

/// Verify with the default comparator.
pub fn check_equals(expected: Output, actual: Output) -> Result<(), MarkerError> {
    VerificationJob::new(expected, actual).verify().map(|_| ())
}
