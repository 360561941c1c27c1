//!
//! Traits Module
//!
//! - [`comparator`]: the strategy trait for deciding whether two result tables are equivalent.
//!
//! Implement it to change what "equivalent" means without touching the verification job.

pub mod comparator;
