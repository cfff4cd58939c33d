//! Reference stand-ins for the external steps.
//!
//! None of these do real language work. They exist so the workflow can run
//! end to end until real services are plugged in.

use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use tracing::info;

use super::{
    DraftGenerator, QualityAssessment, QualityScorer, StepError, StepProviders, TranslationMemory,
    Translator,
};
use crate::config::{ScorerBackend, StepsConfig};
use crate::item::TranslationItem;
use crate::workflow::ValidationScore;

/// Draft text produced by [`StubDraftGenerator`].
pub const STUB_DRAFT_TEXT: &str = "자동 생성된 한국어 번역";

/// Target text produced by [`StubTranslator`].
pub const STUB_TRANSLATION_TEXT: &str = "Auto-translated English text";

/// Returns a fixed intermediate-language draft.
#[derive(Debug, Default, Clone)]
pub struct StubDraftGenerator;

#[async_trait]
impl DraftGenerator for StubDraftGenerator {
    fn name(&self) -> &str {
        "stub"
    }

    async fn generate_draft(&self, _source_text: &str) -> Result<String, StepError> {
        Ok(STUB_DRAFT_TEXT.to_string())
    }
}

/// Returns a fixed target-language translation.
#[derive(Debug, Default, Clone)]
pub struct StubTranslator;

#[async_trait]
impl Translator for StubTranslator {
    fn name(&self) -> &str {
        "stub"
    }

    async fn translate(&self, _intermediate_text: &str) -> Result<String, StepError> {
        Ok(STUB_TRANSLATION_TEXT.to_string())
    }
}

/// Picks high, medium or low uniformly at random.
#[derive(Debug, Default, Clone)]
pub struct RandomScorer;

#[async_trait]
impl QualityScorer for RandomScorer {
    fn name(&self) -> &str {
        "random"
    }

    async fn score(&self, _item: &TranslationItem) -> Result<QualityAssessment, StepError> {
        let idx = rand::rng().random_range(0..ValidationScore::ALL.len());
        Ok(QualityAssessment::new(ValidationScore::ALL[idx]))
    }
}

/// Always answers with the same score.
#[derive(Debug, Clone)]
pub struct FixedScorer {
    score: ValidationScore,
}

impl FixedScorer {
    pub fn new(score: ValidationScore) -> Self {
        Self { score }
    }
}

#[async_trait]
impl QualityScorer for FixedScorer {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn score(&self, _item: &TranslationItem) -> Result<QualityAssessment, StepError> {
        Ok(QualityAssessment::new(self.score))
    }
}

/// Translation memory boundary that only logs.
#[derive(Debug, Default, Clone)]
pub struct NoopTranslationMemory;

#[async_trait]
impl TranslationMemory for NoopTranslationMemory {
    fn name(&self) -> &str {
        "noop"
    }

    async fn store(&self, item: &TranslationItem) -> Result<(), StepError> {
        info!(item_id = %item.id, key = %item.key, "Stored translation in memory (noop)");
        Ok(())
    }
}

impl StepProviders {
    /// Stub collaborators with the random scorer.
    pub fn stub() -> Self {
        Self::new(
            Arc::new(StubDraftGenerator),
            Arc::new(StubTranslator),
            Arc::new(RandomScorer),
            Arc::new(NoopTranslationMemory),
        )
    }

    /// Stub collaborators, scorer chosen by configuration.
    pub fn from_config(config: &StepsConfig) -> Self {
        let scorer: Arc<dyn QualityScorer> = match config.scorer {
            ScorerBackend::Random => Arc::new(RandomScorer),
            ScorerBackend::Fixed => Arc::new(FixedScorer::new(config.fixed_score)),
        };
        Self::new(
            Arc::new(StubDraftGenerator),
            Arc::new(StubTranslator),
            scorer,
            Arc::new(NoopTranslationMemory),
        )
    }
}
