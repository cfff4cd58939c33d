//! Testing utilities and mock implementations.
//!
//! This module provides a mock for every external step plus helpers for
//! waiting on background auto-progression, so workflows can be exercised
//! end to end without real services.
//!
//! # Example
//!
//! ```rust,ignore
//! use watchtower_core::testing::{fixtures, MockSteps};
//!
//! let mocks = MockSteps::new();
//! let orchestrator = fixtures::orchestrator(&mocks);
//!
//! // Configure mock responses
//! mocks.scorer.push_score(ValidationScore::Medium).await;
//!
//! let item = fixtures::add(&orchestrator, "app.btn.save", "Londoloza").await;
//! ```

mod mock_steps;

pub use mock_steps::{MockStep, MockSteps, MOCK_DRAFT_TEXT, MOCK_TRANSLATION_TEXT};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::time::{Duration, Instant};

    use super::MockSteps;
    use crate::intake::NewItemRequest;
    use crate::item::TranslationItem;
    use crate::orchestrator::{ItemStatus, OrchestratorConfig, WorkflowOrchestrator};
    use crate::workflow::{ItemEdits, TranslationState, WorkflowAction};

    /// How long helpers wait for background runs before giving up.
    pub const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Orchestrator with no settle delay, backed by `mocks`.
    pub fn orchestrator(mocks: &MockSteps) -> WorkflowOrchestrator {
        WorkflowOrchestrator::new(OrchestratorConfig::immediate(), mocks.providers())
    }

    /// Add an item in the `ui` context.
    pub async fn add(orchestrator: &WorkflowOrchestrator, key: &str, source: &str) -> TranslationItem {
        orchestrator
            .add_item(NewItemRequest::new(key, source, "ui"))
            .await
            .expect("Failed to add item")
    }

    /// Perform `action` without edits.
    pub async fn act(
        orchestrator: &WorkflowOrchestrator,
        item_id: &str,
        action: WorkflowAction,
    ) -> TranslationItem {
        orchestrator
            .perform_action(item_id, action, ItemEdits::default())
            .await
            .unwrap_or_else(|e| panic!("{action} failed: {e}"))
    }

    /// Wait until no run owns the item, then return it.
    pub async fn wait_for_idle(orchestrator: &WorkflowOrchestrator, item_id: &str) -> TranslationItem {
        let start = Instant::now();
        while start.elapsed() < WAIT_TIMEOUT {
            let status = orchestrator.status(item_id).await.expect("Item vanished");
            if status != ItemStatus::Processing {
                return orchestrator.item(item_id).await.expect("Item vanished");
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("Item {item_id} still processing after {WAIT_TIMEOUT:?}");
    }

    /// Wait until the item reaches `state`.
    pub async fn wait_for_state(
        orchestrator: &WorkflowOrchestrator,
        item_id: &str,
        state: TranslationState,
    ) -> bool {
        let start = Instant::now();
        while start.elapsed() < WAIT_TIMEOUT {
            if let Ok(item) = orchestrator.item(item_id).await {
                if item.state == state {
                    return true;
                }
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        false
    }

    /// Drive a fresh item to `approved`: draft, then the automatic approve.
    pub async fn approved_item(
        orchestrator: &WorkflowOrchestrator,
        key: &str,
        source: &str,
    ) -> TranslationItem {
        let item = add(orchestrator, key, source).await;
        act(orchestrator, &item.id, WorkflowAction::GenerateDraft).await;
        let item = wait_for_idle(orchestrator, &item.id).await;
        assert_eq!(item.state, TranslationState::Approved);
        item
    }
}
