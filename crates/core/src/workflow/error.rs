//! Workflow engine errors.

use thiserror::Error;

use super::{TranslationState, WorkflowAction};

/// Errors returned by the pure transition function.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// The action is not legal in the current state.
    #[error("cannot {action} an item in state {state}")]
    InvalidTransition {
        state: TranslationState,
        action: WorkflowAction,
    },

    /// The action consumes an external step result that was not supplied.
    #[error("{action} requires the result of its external step")]
    MissingStepOutput { action: WorkflowAction },
}

/// Failed to parse a state, score or action name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseWorkflowError {
    kind: &'static str,
    value: String,
}

impl ParseWorkflowError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
