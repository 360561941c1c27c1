//! Marker Error Types
//!
//! This module defines the [`MarkerError`] enum, returned when a program's
//! result cannot be shown equivalent to the task's expected answer.
//!
//! Both tables travel with the error so a failed verification can be
//! inspected, not just reported.
//!
//! # Example
//!
//! ```rust
//! use marker::error::MarkerError;
//! use util::relation::Relation;
//!
//! let err = MarkerError::mismatch("row count differs", Relation::default(), Relation::default());
//! assert!(err.to_string().contains("row count differs"));
//! ```

use util::relation::Relation;

#[derive(Debug, thiserror::Error)]
pub enum MarkerError {
    /// The program ran but its result is not equivalent to the expected one,
    /// or the two results could not be put in a comparable order.
    #[error("Mismatch between target and actual output: {reason}\nTarget:\n{expected}\nActual:\n{actual}")]
    VerificationMismatch {
        reason: String,
        expected: Box<Relation>,
        actual: Box<Relation>,
    },
}

impl MarkerError {
    pub fn mismatch(reason: impl Into<String>, expected: Relation, actual: Relation) -> Self {
        MarkerError::VerificationMismatch {
            reason: reason.into(),
            expected: Box::new(expected),
            actual: Box::new(actual),
        }
    }

    /// The expected table as it stood when the comparison gave up.
    pub fn expected(&self) -> &Relation {
        match self {
            MarkerError::VerificationMismatch { expected, .. } => expected,
        }
    }

    /// The actual table as it stood when the comparison gave up.
    pub fn actual(&self) -> &Relation {
        match self {
            MarkerError::VerificationMismatch { actual, .. } => actual,
        }
    }
}
