//! Errors surfaced by [`execute`](crate::execute).
//!
//! Nothing is retried or swallowed: every variant carries enough payload
//! (the source diagnostic, or both compared tables) to reproduce the failure.

use marker::error::MarkerError;

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A sample input relation has rows with differing key sets.
    #[error("Malformed sample input for relation '{relation}': {reason}")]
    Materialization { relation: String, reason: String },

    /// The language id is not in the catalog. Raised before any side effect.
    #[error("Unsupported language '{0}'")]
    UnsupportedLanguage(String),

    /// The program could not be run to completion by its backend.
    #[error("{backend} backend failed:\n{diagnostic}")]
    BackendExecution {
        backend: &'static str,
        diagnostic: String,
    },

    /// The program ran but its result is not equivalent to the expected one.
    #[error(transparent)]
    Verification(#[from] MarkerError),
}

impl RunnerError {
    pub fn backend(backend: &'static str, diagnostic: impl Into<String>) -> Self {
        RunnerError::BackendExecution {
            backend,
            diagnostic: diagnostic.into(),
        }
    }
}
