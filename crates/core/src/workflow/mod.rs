//! Workflow engine: the translation state machine.

mod engine;
mod error;
mod types;

pub use engine::{auto_action, is_legal, legal_actions, manual_actions, transition};
pub use error::{ParseWorkflowError, TransitionError};
pub use types::{
    FieldChange, FieldUpdates, ItemEdits, StepOutput, Transition, TransitionContext,
    TranslationState, ValidationScore, WorkflowAction,
};
