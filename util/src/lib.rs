//! Shared building blocks for the benchmark workspace: the tabular data
//! model, the language catalog, task/program records, configuration and
//! data-directory paths.

pub mod config;
pub mod execution_config;
pub mod languages;
pub mod models;
pub mod paths;
pub mod relation;
pub mod test_helpers;
