//! The pure transition function.
//!
//! Nothing here performs I/O or keeps state: callers hand in the current
//! state plus whatever the action needs and get back the next state and
//! the field changes to apply.

use super::error::TransitionError;
use super::types::{
    FieldChange, FieldUpdates, StepOutput, Transition, TransitionContext, TranslationState,
    ValidationScore, WorkflowAction,
};

use TranslationState as S;
use WorkflowAction as A;

/// Actions the engine accepts in `state`.
pub fn legal_actions(state: TranslationState) -> &'static [WorkflowAction] {
    match state {
        S::Received => &[A::GenerateDraft],
        S::Draft => &[A::Approve, A::Reject],
        S::Approved => &[A::Translate],
        S::Translated => &[A::Validate],
        S::Validated => &[A::Store],
        S::ReviewRequired => &[A::ReviewApprove, A::Reject],
        S::Rejected => &[A::Retry],
        S::Stored => &[],
    }
}

/// Actions a human triggers in `state`. Auto actions are left out.
pub fn manual_actions(state: TranslationState) -> &'static [WorkflowAction] {
    match state {
        S::Received => &[A::GenerateDraft],
        S::Draft => &[A::Reject],
        S::Approved => &[A::Translate],
        S::ReviewRequired => &[A::ReviewApprove, A::Reject],
        S::Rejected => &[A::Retry],
        S::Translated | S::Validated | S::Stored => &[],
    }
}

/// The action the orchestrator fires to leave an auto-progress state.
pub fn auto_action(state: TranslationState) -> Option<WorkflowAction> {
    match state {
        S::Draft => Some(A::Approve),
        S::Translated => Some(A::Validate),
        S::Validated => Some(A::Store),
        _ => None,
    }
}

pub fn is_legal(state: TranslationState, action: WorkflowAction) -> bool {
    legal_actions(state).contains(&action)
}

/// Compute the next state and field updates for `action` in `state`.
pub fn transition(
    state: TranslationState,
    action: WorkflowAction,
    ctx: &TransitionContext,
) -> Result<Transition, TransitionError> {
    if !is_legal(state, action) {
        return Err(TransitionError::InvalidTransition { state, action });
    }

    let transition = match action {
        A::GenerateDraft => {
            let Some(StepOutput::Draft(text)) = &ctx.output else {
                return Err(TransitionError::MissingStepOutput { action });
            };
            Transition::to(S::Draft).with_updates(FieldUpdates {
                intermediate_text: FieldChange::Set(text.clone()),
                ..Default::default()
            })
        }
        A::Approve => {
            let intermediate_text = match ctx.edits.intermediate_text() {
                Some(text) => FieldChange::Set(text.to_string()),
                None => FieldChange::Keep,
            };
            Transition::to(S::Approved).with_updates(FieldUpdates {
                intermediate_text,
                ..Default::default()
            })
        }
        A::ReviewApprove => {
            let edits = &ctx.edits;
            Transition::to(S::Validated).with_updates(FieldUpdates {
                key: edits.key().map(str::to_string),
                source_text: edits.source_text().map(str::to_string),
                intermediate_text: set_or_keep(edits.intermediate_text()),
                target_text: set_or_keep(edits.target_text()),
                score: FieldChange::Set(ValidationScore::High),
                notes: FieldChange::Keep,
            })
        }
        A::Reject => Transition::to(S::Rejected),
        A::Translate => {
            let Some(StepOutput::Translation(text)) = &ctx.output else {
                return Err(TransitionError::MissingStepOutput { action });
            };
            Transition::to(S::Translated).with_updates(FieldUpdates {
                target_text: FieldChange::Set(text.clone()),
                ..Default::default()
            })
        }
        A::Validate => {
            let Some(StepOutput::Score { score, notes }) = &ctx.output else {
                return Err(TransitionError::MissingStepOutput { action });
            };
            Transition::to(score.next_state()).with_updates(FieldUpdates {
                score: FieldChange::Set(*score),
                notes: match notes {
                    Some(notes) => FieldChange::Set(notes.clone()),
                    None => FieldChange::Clear,
                },
                ..Default::default()
            })
        }
        A::Store => {
            if ctx.output != Some(StepOutput::Stored) {
                return Err(TransitionError::MissingStepOutput { action });
            }
            Transition::to(S::Stored)
        }
        A::Retry => Transition::to(S::Received).with_updates(FieldUpdates {
            intermediate_text: FieldChange::Clear,
            target_text: FieldChange::Clear,
            score: FieldChange::Clear,
            notes: FieldChange::Clear,
            ..Default::default()
        }),
        // Never in a legal set; handled by the orchestrator.
        A::RetryStep => return Err(TransitionError::InvalidTransition { state, action }),
    };

    Ok(transition)
}

fn set_or_keep(value: Option<&str>) -> FieldChange<String> {
    match value {
        Some(v) => FieldChange::Set(v.to_string()),
        None => FieldChange::Keep,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::ItemEdits;

    /// A context carrying the step output `action` consumes, if any.
    fn ctx_for(action: WorkflowAction) -> TransitionContext {
        let ctx = TransitionContext::new();
        match action {
            A::GenerateDraft => ctx.with_output(StepOutput::Draft("초안".to_string())),
            A::Translate => ctx.with_output(StepOutput::Translation("Save".to_string())),
            A::Validate => ctx.with_output(StepOutput::Score {
                score: ValidationScore::High,
                notes: None,
            }),
            A::Store => ctx.with_output(StepOutput::Stored),
            _ => ctx,
        }
    }

    #[test]
    fn test_transition_succeeds_iff_action_is_legal() {
        for state in TranslationState::ALL {
            for action in WorkflowAction::ALL {
                let result = transition(state, action, &ctx_for(action));
                if is_legal(state, action) {
                    assert!(result.is_ok(), "{state} / {action} should succeed");
                } else {
                    assert_eq!(
                        result.unwrap_err(),
                        TransitionError::InvalidTransition { state, action },
                        "{state} / {action} should be rejected"
                    );
                }
            }
        }
    }

    #[test]
    fn test_retry_step_is_never_an_engine_transition() {
        for state in TranslationState::ALL {
            assert!(transition(state, A::RetryStep, &TransitionContext::new()).is_err());
        }
    }

    #[test]
    fn test_generate_draft_sets_intermediate_text() {
        let t = transition(S::Received, A::GenerateDraft, &ctx_for(A::GenerateDraft)).unwrap();
        assert_eq!(t.next_state, S::Draft);
        assert_eq!(
            t.updates.intermediate_text,
            FieldChange::Set("초안".to_string())
        );
    }

    #[test]
    fn test_generate_draft_without_output_fails() {
        let err = transition(S::Received, A::GenerateDraft, &TransitionContext::new()).unwrap_err();
        assert_eq!(
            err,
            TransitionError::MissingStepOutput {
                action: A::GenerateDraft
            }
        );
    }

    #[test]
    fn test_approve_keeps_generated_draft_without_edits() {
        let t = transition(S::Draft, A::Approve, &TransitionContext::new()).unwrap();
        assert_eq!(t.next_state, S::Approved);
        assert!(t.updates.is_empty());
    }

    #[test]
    fn test_approve_with_edit_overrides_draft() {
        let ctx = TransitionContext::new()
            .with_edits(ItemEdits::default().with_intermediate_text("수정된 초안"));
        let t = transition(S::Draft, A::Approve, &ctx).unwrap();
        assert_eq!(
            t.updates.intermediate_text,
            FieldChange::Set("수정된 초안".to_string())
        );
    }

    #[test]
    fn test_review_approve_forces_high_score_and_applies_edits() {
        let ctx = TransitionContext::new().with_edits(ItemEdits::default().with_target_text("Save"));
        let t = transition(S::ReviewRequired, A::ReviewApprove, &ctx).unwrap();
        assert_eq!(t.next_state, S::Validated);
        assert_eq!(t.updates.score, FieldChange::Set(ValidationScore::High));
        assert_eq!(t.updates.target_text, FieldChange::Set("Save".to_string()));
        assert_eq!(t.updates.key, None);
        assert_eq!(t.updates.source_text, None);
        assert_eq!(t.updates.intermediate_text, FieldChange::Keep);
    }

    #[test]
    fn test_reject_changes_no_fields() {
        for state in [S::Draft, S::ReviewRequired] {
            let t = transition(state, A::Reject, &TransitionContext::new()).unwrap();
            assert_eq!(t.next_state, S::Rejected);
            assert!(t.updates.is_empty());
        }
    }

    #[test]
    fn test_translate_sets_target_text() {
        let t = transition(S::Approved, A::Translate, &ctx_for(A::Translate)).unwrap();
        assert_eq!(t.next_state, S::Translated);
        assert_eq!(t.updates.target_text, FieldChange::Set("Save".to_string()));
    }

    #[test]
    fn test_validate_branches_on_every_score() {
        for score in ValidationScore::ALL {
            let ctx = TransitionContext::new().with_output(StepOutput::Score {
                score,
                notes: Some("checked".to_string()),
            });
            let t = transition(S::Translated, A::Validate, &ctx).unwrap();
            assert_ne!(t.next_state, S::Translated);
            assert_eq!(t.next_state, score.next_state());
            assert_eq!(t.updates.score, FieldChange::Set(score));
            assert_eq!(t.updates.notes, FieldChange::Set("checked".to_string()));
        }
    }

    #[test]
    fn test_store_requires_memory_confirmation() {
        assert!(transition(S::Validated, A::Store, &TransitionContext::new()).is_err());
        let t = transition(S::Validated, A::Store, &ctx_for(A::Store)).unwrap();
        assert_eq!(t.next_state, S::Stored);
        assert!(t.updates.is_empty());
    }

    #[test]
    fn test_retry_resets_everything() {
        let t = transition(S::Rejected, A::Retry, &TransitionContext::new()).unwrap();
        assert_eq!(t.next_state, S::Received);
        assert_eq!(t.updates.intermediate_text, FieldChange::Clear);
        assert_eq!(t.updates.target_text, FieldChange::Clear);
        assert_eq!(t.updates.score, FieldChange::Clear);
        assert_eq!(t.updates.notes, FieldChange::Clear);
    }

    #[test]
    fn test_auto_actions_are_legal_in_their_state() {
        for state in TranslationState::ALL {
            match auto_action(state) {
                Some(action) => {
                    assert!(state.is_auto_progress());
                    assert!(is_legal(state, action));
                }
                None => assert!(!state.is_auto_progress()),
            }
        }
    }

    #[test]
    fn test_manual_actions_are_legal() {
        for state in TranslationState::ALL {
            for action in manual_actions(state) {
                assert!(is_legal(state, *action));
            }
        }
        assert!(manual_actions(S::Stored).is_empty());
    }
}
