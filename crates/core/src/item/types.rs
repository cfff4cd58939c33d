//! Translation item data type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflow::{Transition, TranslationState, ValidationScore};

/// A UI translation key tracked through the localization workflow.
///
/// Text moves through three fixed languages: the source text is drafted
/// into an intermediate language, which is then machine translated into
/// the target language.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranslationItem {
    /// Unique identifier (UUID).
    pub id: String,

    /// Translation key, e.g. `app.btn.save`. Only changes during review.
    pub key: String,

    /// Grouping label (onboarding, settings, errors, ...).
    pub context: String,

    /// Source-language text.
    pub source_text: String,

    /// Intermediate-language draft, set by draft generation.
    pub intermediate_text: Option<String>,

    /// Target-language text, set by translation.
    pub target_text: Option<String>,

    /// Current workflow state.
    pub state: TranslationState,

    /// Validation score; `None` until validated at least once.
    pub score: Option<ValidationScore>,

    /// Free-text notes from validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// When the item was submitted.
    pub created_at: DateTime<Utc>,

    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TranslationItem {
    /// Create a freshly received item.
    pub fn new(
        key: impl Into<String>,
        source_text: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            key: key.into(),
            context: context.into(),
            source_text: source_text.into(),
            intermediate_text: None,
            target_text: None,
            state: TranslationState::Received,
            score: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a transition computed by the engine and bump `updated_at`.
    pub fn apply(&mut self, transition: Transition) {
        let updates = transition.updates;
        if let Some(key) = updates.key {
            self.key = key;
        }
        if let Some(source_text) = updates.source_text {
            self.source_text = source_text;
        }
        updates.intermediate_text.apply(&mut self.intermediate_text);
        updates.target_text.apply(&mut self.target_text);
        updates.score.apply(&mut self.score);
        updates.notes.apply(&mut self.notes);
        self.state = transition.next_state;
        self.touch();
    }

    fn touch(&mut self) {
        let now = Utc::now();
        // Clock can stand still between two quick mutations; never go backwards.
        self.updated_at = now.max(self.updated_at);
    }
}
