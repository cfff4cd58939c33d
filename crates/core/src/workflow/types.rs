//! Core workflow data types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ParseWorkflowError;

// ============================================================================
// States
// ============================================================================

/// Workflow state of a translation item.
///
/// ```text
/// Received -> Draft -> Approved -> Translated -> Validated -> Stored
///               |                      |
///               v                      +-> ReviewRequired -> Validated
///            Rejected <----------------+-> Rejected
///               |
///               +-> (retry) Received
/// ```
///
/// `Draft`, `Translated` and `Validated` are auto-progress states: the
/// orchestrator fires their exit action without a human.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationState {
    /// Key submitted, waiting for a draft.
    Received,
    /// Intermediate-language draft generated.
    Draft,
    /// Draft approved, waiting for translation.
    Approved,
    /// Target-language text produced, waiting for validation.
    Translated,
    /// Validation passed (or a reviewer approved it).
    Validated,
    /// Validation was inconclusive, a human has to look at it.
    ReviewRequired,
    /// Rejected by validation or by a human. Can be retried.
    Rejected,
    /// Persisted to translation memory (terminal).
    Stored,
}

impl TranslationState {
    /// All states, in pipeline order.
    pub const ALL: [TranslationState; 8] = [
        TranslationState::Received,
        TranslationState::Draft,
        TranslationState::Approved,
        TranslationState::Translated,
        TranslationState::Validated,
        TranslationState::ReviewRequired,
        TranslationState::Rejected,
        TranslationState::Stored,
    ];

    /// Returns the state name as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            TranslationState::Received => "received",
            TranslationState::Draft => "draft",
            TranslationState::Approved => "approved",
            TranslationState::Translated => "translated",
            TranslationState::Validated => "validated",
            TranslationState::ReviewRequired => "review_required",
            TranslationState::Rejected => "rejected",
            TranslationState::Stored => "stored",
        }
    }

    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            TranslationState::Received => "Received",
            TranslationState::Draft => "Draft (KO)",
            TranslationState::Approved => "Approved",
            TranslationState::Translated => "Translated",
            TranslationState::Validated => "Validated",
            TranslationState::ReviewRequired => "Review Required",
            TranslationState::Rejected => "Rejected",
            TranslationState::Stored => "Stored",
        }
    }

    /// Returns true if no action leaves this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TranslationState::Stored)
    }

    /// Returns true if the orchestrator drives the exit of this state.
    pub fn is_auto_progress(&self) -> bool {
        matches!(
            self,
            TranslationState::Draft | TranslationState::Translated | TranslationState::Validated
        )
    }

    /// Returns true if the item is parked waiting for a human.
    pub fn needs_attention(&self) -> bool {
        matches!(
            self,
            TranslationState::ReviewRequired | TranslationState::Rejected
        )
    }
}

impl fmt::Display for TranslationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TranslationState {
    type Err = ParseWorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TranslationState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| ParseWorkflowError::new("state", s))
    }
}

// ============================================================================
// Validation score
// ============================================================================

/// Quality score assigned by validation.
///
/// An item that has never been validated carries no score (`None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationScore {
    High,
    Medium,
    Low,
}

impl ValidationScore {
    pub const ALL: [ValidationScore; 3] = [
        ValidationScore::High,
        ValidationScore::Medium,
        ValidationScore::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationScore::High => "high",
            ValidationScore::Medium => "medium",
            ValidationScore::Low => "low",
        }
    }

    /// State reached by the validate step for this score.
    pub fn next_state(&self) -> TranslationState {
        match self {
            ValidationScore::High => TranslationState::Validated,
            ValidationScore::Medium => TranslationState::ReviewRequired,
            ValidationScore::Low => TranslationState::Rejected,
        }
    }
}

impl fmt::Display for ValidationScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationScore {
    type Err = ParseWorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValidationScore::ALL
            .into_iter()
            .find(|score| score.as_str() == s)
            .ok_or_else(|| ParseWorkflowError::new("score", s))
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Action requested against an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowAction {
    GenerateDraft,
    Approve,
    ReviewApprove,
    Reject,
    Translate,
    Validate,
    Store,
    Retry,
    /// Re-run auto-progression for the current state. Not a transition.
    RetryStep,
}

impl WorkflowAction {
    pub const ALL: [WorkflowAction; 9] = [
        WorkflowAction::GenerateDraft,
        WorkflowAction::Approve,
        WorkflowAction::ReviewApprove,
        WorkflowAction::Reject,
        WorkflowAction::Translate,
        WorkflowAction::Validate,
        WorkflowAction::Store,
        WorkflowAction::Retry,
        WorkflowAction::RetryStep,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowAction::GenerateDraft => "generate_draft",
            WorkflowAction::Approve => "approve",
            WorkflowAction::ReviewApprove => "review_approve",
            WorkflowAction::Reject => "reject",
            WorkflowAction::Translate => "translate",
            WorkflowAction::Validate => "validate",
            WorkflowAction::Store => "store",
            WorkflowAction::Retry => "retry",
            WorkflowAction::RetryStep => "retry_step",
        }
    }
}

impl fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowAction {
    type Err = ParseWorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkflowAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| ParseWorkflowError::new("action", s))
    }
}

// ============================================================================
// Transition inputs
// ============================================================================

/// Caller-supplied edits. Blank values count as not supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemEdits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intermediate_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_text: Option<String>,
}

impl ItemEdits {
    pub fn key(&self) -> Option<&str> {
        non_blank(&self.key)
    }

    pub fn source_text(&self) -> Option<&str> {
        non_blank(&self.source_text)
    }

    pub fn intermediate_text(&self) -> Option<&str> {
        non_blank(&self.intermediate_text)
    }

    pub fn target_text(&self) -> Option<&str> {
        non_blank(&self.target_text)
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_source_text(mut self, text: impl Into<String>) -> Self {
        self.source_text = Some(text.into());
        self
    }

    pub fn with_intermediate_text(mut self, text: impl Into<String>) -> Self {
        self.intermediate_text = Some(text.into());
        self
    }

    pub fn with_target_text(mut self, text: impl Into<String>) -> Self {
        self.target_text = Some(text.into());
        self
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Result of an external step, fed into the transition that consumes it.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutput {
    Draft(String),
    Translation(String),
    Score {
        score: ValidationScore,
        notes: Option<String>,
    },
    Stored,
}

/// Everything the engine may need besides the current state.
#[derive(Debug, Clone, Default)]
pub struct TransitionContext {
    pub edits: ItemEdits,
    pub output: Option<StepOutput>,
}

impl TransitionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_edits(mut self, edits: ItemEdits) -> Self {
        self.edits = edits;
        self
    }

    pub fn with_output(mut self, output: StepOutput) -> Self {
        self.output = Some(output);
        self
    }
}

// ============================================================================
// Transition outputs
// ============================================================================

/// Change to a nullable field.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldChange<T> {
    #[default]
    Keep,
    Set(T),
    Clear,
}

impl<T> FieldChange<T> {
    pub fn apply(self, target: &mut Option<T>) {
        match self {
            FieldChange::Keep => {}
            FieldChange::Set(value) => *target = Some(value),
            FieldChange::Clear => *target = None,
        }
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, FieldChange::Keep)
    }
}

/// Field updates produced by a transition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldUpdates {
    pub key: Option<String>,
    pub source_text: Option<String>,
    pub intermediate_text: FieldChange<String>,
    pub target_text: FieldChange<String>,
    pub score: FieldChange<ValidationScore>,
    pub notes: FieldChange<String>,
}

impl FieldUpdates {
    pub fn is_empty(&self) -> bool {
        self.key.is_none()
            && self.source_text.is_none()
            && self.intermediate_text.is_keep()
            && self.target_text.is_keep()
            && self.score.is_keep()
            && self.notes.is_keep()
    }
}

/// Outcome of a legal transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next_state: TranslationState,
    pub updates: FieldUpdates,
}

impl Transition {
    pub(crate) fn to(next_state: TranslationState) -> Self {
        Self {
            next_state,
            updates: FieldUpdates::default(),
        }
    }

    pub(crate) fn with_updates(mut self, updates: FieldUpdates) -> Self {
        self.updates = updates;
        self
    }
}
