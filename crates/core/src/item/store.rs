//! In-memory item collection and count projection.

use serde::{Deserialize, Serialize};

use super::TranslationItem;
use crate::workflow::TranslationState;

/// Ordered item collection, newest first.
///
/// Owned exclusively by the orchestrator; nothing else writes to it.
#[derive(Debug, Default)]
pub struct ItemStore {
    items: Vec<TranslationItem>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the front of the collection.
    pub fn insert_front(&mut self, item: TranslationItem) {
        self.items.insert(0, item);
    }

    pub fn get(&self, id: &str) -> Option<&TranslationItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut TranslationItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Case-sensitive exact key lookup.
    pub fn contains_key(&self, key: &str) -> bool {
        self.items.iter().any(|item| item.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TranslationItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Count items per state. Recomputed on every call.
    pub fn counts(&self) -> StateCounts {
        let mut counts = StateCounts::default();
        for item in &self.items {
            counts.increment(item.state);
        }
        counts
    }
}

/// Number of items per state, plus the total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCounts {
    pub all: usize,
    pub received: usize,
    pub draft: usize,
    pub approved: usize,
    pub translated: usize,
    pub validated: usize,
    pub review_required: usize,
    pub rejected: usize,
    pub stored: usize,
}

impl StateCounts {
    pub fn get(&self, state: TranslationState) -> usize {
        match state {
            TranslationState::Received => self.received,
            TranslationState::Draft => self.draft,
            TranslationState::Approved => self.approved,
            TranslationState::Translated => self.translated,
            TranslationState::Validated => self.validated,
            TranslationState::ReviewRequired => self.review_required,
            TranslationState::Rejected => self.rejected,
            TranslationState::Stored => self.stored,
        }
    }

    fn increment(&mut self, state: TranslationState) {
        self.all += 1;
        let slot = match state {
            TranslationState::Received => &mut self.received,
            TranslationState::Draft => &mut self.draft,
            TranslationState::Approved => &mut self.approved,
            TranslationState::Translated => &mut self.translated,
            TranslationState::Validated => &mut self.validated,
            TranslationState::ReviewRequired => &mut self.review_required,
            TranslationState::Rejected => &mut self.rejected,
            TranslationState::Stored => &mut self.stored,
        };
        *slot += 1;
    }

    /// Waiting for a draft or for draft approval.
    pub fn pending(&self) -> usize {
        self.received + self.draft
    }

    /// Approved or translated, moving toward validation.
    pub fn in_progress(&self) -> usize {
        self.approved + self.translated
    }

    pub fn needs_review(&self) -> usize {
        self.review_required
    }

    pub fn done(&self) -> usize {
        self.stored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_in(key: &str, state: TranslationState) -> TranslationItem {
        let mut item = TranslationItem::new(key, "text", "ui");
        item.state = state;
        item
    }

    #[test]
    fn test_insert_front_keeps_newest_first() {
        let mut store = ItemStore::new();
        store.insert_front(item_in("a", TranslationState::Received));
        store.insert_front(item_in("b", TranslationState::Received));
        let keys: Vec<_> = store.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_contains_key_is_case_sensitive() {
        let mut store = ItemStore::new();
        store.insert_front(item_in("app.btn.save", TranslationState::Received));
        assert!(store.contains_key("app.btn.save"));
        assert!(!store.contains_key("App.Btn.Save"));
    }

    #[test]
    fn test_get_mut_by_id() {
        let mut store = ItemStore::new();
        let item = item_in("a", TranslationState::Received);
        let id = item.id.clone();
        store.insert_front(item);
        store.get_mut(&id).unwrap().state = TranslationState::Draft;
        assert_eq!(store.get(&id).unwrap().state, TranslationState::Draft);
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn test_counts_cover_every_state() {
        let mut store = ItemStore::new();
        for (i, state) in TranslationState::ALL.into_iter().enumerate() {
            store.insert_front(item_in(&format!("k{i}"), state));
        }
        store.insert_front(item_in("extra", TranslationState::Stored));

        let counts = store.counts();
        assert_eq!(counts.all, 9);
        assert_eq!(counts.get(TranslationState::Stored), 2);
        for state in TranslationState::ALL {
            if state != TranslationState::Stored {
                assert_eq!(counts.get(state), 1);
            }
        }
        assert_eq!(counts.pending(), 2);
        assert_eq!(counts.in_progress(), 2);
        assert_eq!(counts.needs_review(), 1);
        assert_eq!(counts.done(), 2);
    }

    #[test]
    fn test_counts_serialize_flat() {
        let counts = StateCounts {
            all: 1,
            review_required: 1,
            ..Default::default()
        };
        let json = serde_json::to_value(counts).unwrap();
        assert_eq!(json["all"], 1);
        assert_eq!(json["review_required"], 1);
        assert_eq!(json["stored"], 0);
    }
}
