//! Task and program records as stored in the data directory.
//!
//! Only reading is supported here; authoring the files happens elsewhere.

pub mod program;
pub mod task;

pub use program::{Program, SourceRange, load_programs_for};
pub use task::{Plan, Task};
