//! Collaborator traits for the external workflow steps.

use std::sync::Arc;

use async_trait::async_trait;

use super::StepError;
use crate::item::TranslationItem;
use crate::workflow::ValidationScore;

/// Produces an intermediate-language draft from the source text.
#[async_trait]
pub trait DraftGenerator: Send + Sync {
    /// Name of this implementation, for logs.
    fn name(&self) -> &str;

    async fn generate_draft(&self, source_text: &str) -> Result<String, StepError>;
}

/// Machine translation from the intermediate to the target language.
#[async_trait]
pub trait Translator: Send + Sync {
    fn name(&self) -> &str;

    async fn translate(&self, intermediate_text: &str) -> Result<String, StepError>;
}

/// Verdict of a quality check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityAssessment {
    pub score: ValidationScore,
    pub notes: Option<String>,
}

impl QualityAssessment {
    pub fn new(score: ValidationScore) -> Self {
        Self { score, notes: None }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Scores a translated item.
#[async_trait]
pub trait QualityScorer: Send + Sync {
    fn name(&self) -> &str;

    async fn score(&self, item: &TranslationItem) -> Result<QualityAssessment, StepError>;
}

/// External translation memory that receives finalized translations.
#[async_trait]
pub trait TranslationMemory: Send + Sync {
    fn name(&self) -> &str;

    async fn store(&self, item: &TranslationItem) -> Result<(), StepError>;
}

/// The four collaborators the orchestrator calls out to.
#[derive(Clone)]
pub struct StepProviders {
    pub drafts: Arc<dyn DraftGenerator>,
    pub translator: Arc<dyn Translator>,
    pub scorer: Arc<dyn QualityScorer>,
    pub memory: Arc<dyn TranslationMemory>,
}

impl StepProviders {
    pub fn new(
        drafts: Arc<dyn DraftGenerator>,
        translator: Arc<dyn Translator>,
        scorer: Arc<dyn QualityScorer>,
        memory: Arc<dyn TranslationMemory>,
    ) -> Self {
        Self {
            drafts,
            translator,
            scorer,
            memory,
        }
    }
}

impl std::fmt::Debug for StepProviders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepProviders")
            .field("drafts", &self.drafts.name())
            .field("translator", &self.translator.name())
            .field("scorer", &self.scorer.name())
            .field("memory", &self.memory.name())
            .finish()
    }
}
