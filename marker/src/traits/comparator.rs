use crate::types::Comparison;
use util::relation::Relation;

/// RelationComparator is a strategy trait for comparing an expected table
/// against the table a program produced. Both arrive already normalized.
pub trait RelationComparator: Send + Sync {
    /// Compare the two tables, producing the tables as compared and a verdict.
    fn compare(&self, expected: Relation, actual: Relation) -> Comparison;
}
