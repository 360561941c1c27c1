//! # Comparators
//!
//! Implementations of [`RelationComparator`](crate::traits::comparator::RelationComparator).
//!
//! - [`leading_column_comparator`]: sorts both tables by the expected table's first
//!   column, then requires them to be identical. This is the default.

pub mod leading_column_comparator;
