//! Types for the workflow orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::intake::{summarize_keys, IntakeError};
use crate::item::TranslationItem;
use crate::workflow::{manual_actions, TransitionError, TranslationState, WorkflowAction};

/// Errors returned by orchestrator operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WorkflowError {
    /// Action is not legal for the item's current state.
    #[error("cannot {action} an item in state {state}")]
    InvalidTransition {
        state: TranslationState,
        action: WorkflowAction,
    },

    /// One or more keys already exist in the collection.
    #[error("key already exists: {}", summarize_keys(.0))]
    DuplicateKey(Vec<String>),

    /// No item with this id.
    #[error("item not found: {0}")]
    ItemNotFound(String),

    /// A draft, translation, scoring or storage call faulted.
    #[error("{action} step failed: {message}")]
    ExternalStepFailure {
        action: WorkflowAction,
        message: String,
    },

    /// Intake rejected the submission.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] IntakeError),

    /// Filter could not be applied.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
}

impl From<TransitionError> for WorkflowError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::InvalidTransition { state, action } => {
                WorkflowError::InvalidTransition { state, action }
            }
            // Only reachable if a step result was not threaded through.
            TransitionError::MissingStepOutput { action } => WorkflowError::ExternalStepFailure {
                action,
                message: "step produced no result".to_string(),
            },
        }
    }
}

/// Processing status of an item, derived on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Waiting on a human, or finished.
    Idle,
    /// An automatic run owns the item.
    Processing,
    /// In an auto-progress state with no run; needs `retry_step`.
    Stuck,
}

impl ItemStatus {
    pub(crate) fn derive(state: TranslationState, processing: bool) -> Self {
        if processing {
            ItemStatus::Processing
        } else if state.is_auto_progress() {
            ItemStatus::Stuck
        } else {
            ItemStatus::Idle
        }
    }
}

/// Last failed external step of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailure {
    pub action: WorkflowAction,
    /// State the item was parked in.
    pub state: TranslationState,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// An in-flight automatic run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingRun {
    pub item_id: String,
    /// State the run was started for.
    pub started_in: TranslationState,
    pub started_at: DateTime<Utc>,
}

/// Item plus everything a client needs to render it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemView {
    #[serde(flatten)]
    pub item: TranslationItem,
    pub status: ItemStatus,
    /// Display name of the state.
    #[serde(default)]
    pub label: String,
    /// Waiting on a person (review or rejected).
    #[serde(default)]
    pub needs_attention: bool,
    /// Buttons to offer for the current state.
    pub actions: Vec<WorkflowAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_failure: Option<StepFailure>,
}

impl ItemView {
    pub(crate) fn new(
        item: TranslationItem,
        processing: bool,
        last_failure: Option<StepFailure>,
    ) -> Self {
        let status = ItemStatus::derive(item.state, processing);
        let mut actions = manual_actions(item.state).to_vec();
        if status == ItemStatus::Stuck {
            actions.push(WorkflowAction::RetryStep);
        }
        Self {
            label: item.state.label().to_string(),
            needs_attention: item.state.needs_attention(),
            item,
            status,
            actions,
            last_failure,
        }
    }
}
