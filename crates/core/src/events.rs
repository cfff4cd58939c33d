//! Outward notifications about workflow progress.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::workflow::{TranslationState, WorkflowAction};

/// Something observable happened to an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    /// A new item entered the workflow.
    ItemAdded { item_id: String, key: String },
    /// A transition was applied.
    ItemTransitioned {
        item_id: String,
        action: WorkflowAction,
        from_state: TranslationState,
        to_state: TranslationState,
        /// Fired by the orchestrator rather than a caller.
        automatic: bool,
    },
    /// An external step faulted and the item was parked.
    StepFailed {
        item_id: String,
        action: WorkflowAction,
        state: TranslationState,
        message: String,
    },
    /// An automatic run found the item moved on underneath it.
    AutoProgressAborted {
        item_id: String,
        expected_state: TranslationState,
        actual_state: TranslationState,
    },
    /// Keep-alive for long-lived subscribers.
    Heartbeat { timestamp: i64 },
}

impl WorkflowEvent {
    /// Short label, used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkflowEvent::ItemAdded { .. } => "item_added",
            WorkflowEvent::ItemTransitioned { .. } => "item_transitioned",
            WorkflowEvent::StepFailed { .. } => "step_failed",
            WorkflowEvent::AutoProgressAborted { .. } => "auto_progress_aborted",
            WorkflowEvent::Heartbeat { .. } => "heartbeat",
        }
    }

    /// Item the event is about, if any.
    pub fn item_id(&self) -> Option<&str> {
        match self {
            WorkflowEvent::ItemAdded { item_id, .. }
            | WorkflowEvent::ItemTransitioned { item_id, .. }
            | WorkflowEvent::StepFailed { item_id, .. }
            | WorkflowEvent::AutoProgressAborted { item_id, .. } => Some(item_id),
            WorkflowEvent::Heartbeat { .. } => None,
        }
    }
}

/// Fan-out of workflow events over a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<WorkflowEvent>,
}

impl EventBroadcaster {
    /// Create a new broadcaster with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn broadcast(&self, event: WorkflowEvent) {
        // No receivers is fine.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn heartbeat(&self) {
        self.broadcast(WorkflowEvent::Heartbeat {
            timestamp: chrono::Utc::now().timestamp(),
        });
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = WorkflowEvent::ItemTransitioned {
            item_id: "item-1".to_string(),
            action: WorkflowAction::Validate,
            from_state: TranslationState::Translated,
            to_state: TranslationState::ReviewRequired,
            automatic: true,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "item_transitioned");
        assert_eq!(json["action"], "validate");
        assert_eq!(json["to_state"], "review_required");
        assert_eq!(json["automatic"], true);

        let parsed: WorkflowEvent = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_broadcast_without_receivers() {
        let broadcaster = EventBroadcaster::new(4);
        broadcaster.heartbeat();
        assert_eq!(broadcaster.receiver_count(), 0);
    }

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let broadcaster = EventBroadcaster::new(4);
        let mut rx = broadcaster.subscribe();

        broadcaster.broadcast(WorkflowEvent::ItemAdded {
            item_id: "item-1".to_string(),
            key: "app.title".to_string(),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind(), "item_added");
        assert_eq!(event.item_id(), Some("item-1"));
    }
}
