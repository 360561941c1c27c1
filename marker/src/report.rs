//! Verification report returned when a result is accepted.

use serde::Serialize;
use util::relation::Relation;

/// The two tables as they were compared, for display or export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationReport {
    pub expected: Relation,
    pub actual: Relation,
}
