//! Errors from external step collaborators.

use thiserror::Error;

/// An external step (draft, translation, scoring, storage) faulted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StepError {
    /// The backing service could not be reached.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The service answered with an error.
    #[error("step failed: {0}")]
    Failed(String),

    /// The call did not finish within the configured limit.
    #[error("step timed out after {0}ms")]
    Timeout(u64),
}
