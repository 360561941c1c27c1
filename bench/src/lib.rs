//! Command-line front end for the benchmark runner.
//!
//! Loads tasks and programs from the data store, resolves the language catalog
//! and execution config from the environment, and reports one verdict per program.

pub mod commands;
pub mod settings;
