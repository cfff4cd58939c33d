//! Mock external steps for testing.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{watch, RwLock};

use crate::item::TranslationItem;
use crate::steps::{
    DraftGenerator, QualityAssessment, QualityScorer, StepError, StepProviders, TranslationMemory,
    Translator,
};
use crate::workflow::ValidationScore;

/// Draft text returned by default.
pub const MOCK_DRAFT_TEXT: &str = "mock draft";

/// Translation returned by default.
pub const MOCK_TRANSLATION_TEXT: &str = "mock translation";

/// Mock implementation of every external step trait.
///
/// One instance usually plays one role; [`MockSteps`] wires four of them up.
/// Provides controllable behavior for testing:
/// - Record every call's input
/// - Fail once or until cleared
/// - Delay calls, or hold them until released
/// - Queue scores for the scorer role
///
/// # Example
///
/// ```rust,ignore
/// use watchtower_core::testing::MockSteps;
///
/// let mocks = MockSteps::new();
/// mocks.scorer.push_score(ValidationScore::Medium).await;
/// mocks.translator.set_next_error(StepError::Unavailable("mt".into())).await;
///
/// let orchestrator = WorkflowOrchestrator::new(config, mocks.providers());
/// ```
#[derive(Debug, Clone)]
pub struct MockStep {
    /// Inputs of every call, in order.
    calls: Arc<RwLock<Vec<String>>>,
    /// If set, the next call fails with this error.
    next_error: Arc<RwLock<Option<StepError>>>,
    /// If set, every call fails with this error.
    failing: Arc<RwLock<Option<StepError>>>,
    /// Simulated call duration in milliseconds.
    delay_ms: Arc<RwLock<u64>>,
    /// Calls wait while this is false.
    gate: Arc<watch::Sender<bool>>,
    draft_text: Arc<RwLock<String>>,
    translation_text: Arc<RwLock<String>>,
    scores: Arc<RwLock<VecDeque<QualityAssessment>>>,
    default_score: Arc<RwLock<ValidationScore>>,
}

impl Default for MockStep {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStep {
    /// Create a new mock that succeeds immediately.
    pub fn new() -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            failing: Arc::new(RwLock::new(None)),
            delay_ms: Arc::new(RwLock::new(0)),
            gate: Arc::new(gate),
            draft_text: Arc::new(RwLock::new(MOCK_DRAFT_TEXT.to_string())),
            translation_text: Arc::new(RwLock::new(MOCK_TRANSLATION_TEXT.to_string())),
            scores: Arc::new(RwLock::new(VecDeque::new())),
            default_score: Arc::new(RwLock::new(ValidationScore::High)),
        }
    }

    /// Get the input of every call made so far.
    pub async fn recorded_calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    /// Get the number of calls made so far.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: StepError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every call fail until [`clear_failing`](Self::clear_failing).
    pub async fn set_failing(&self, error: StepError) {
        *self.failing.write().await = Some(error);
    }

    pub async fn clear_failing(&self) {
        *self.failing.write().await = None;
    }

    /// Set the simulated call duration.
    pub async fn set_delay(&self, duration: Duration) {
        *self.delay_ms.write().await = duration.as_millis() as u64;
    }

    /// Block calls until [`release`](Self::release).
    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    /// Let held and future calls through.
    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    pub async fn set_draft_text(&self, text: impl Into<String>) {
        *self.draft_text.write().await = text.into();
    }

    pub async fn set_translation_text(&self, text: impl Into<String>) {
        *self.translation_text.write().await = text.into();
    }

    /// Queue a score for the next scoring call.
    pub async fn push_score(&self, score: ValidationScore) {
        self.scores
            .write()
            .await
            .push_back(QualityAssessment::new(score));
    }

    /// Queue a score with notes for the next scoring call.
    pub async fn push_assessment(&self, assessment: QualityAssessment) {
        self.scores.write().await.push_back(assessment);
    }

    /// Score used once the queue is empty.
    pub async fn set_default_score(&self, score: ValidationScore) {
        *self.default_score.write().await = score;
    }

    /// Record the call, honour hold/delay, then apply configured failures.
    async fn enter(&self, input: &str) -> Result<(), StepError> {
        self.calls.write().await.push(input.to_string());

        let mut gate = self.gate.subscribe();
        // Sender lives in self, so this cannot observe a closed channel.
        let _ = gate.wait_for(|open| *open).await;

        let delay_ms = *self.delay_ms.read().await;
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        if let Some(err) = self.failing.read().await.clone() {
            return Err(err);
        }
        Ok(())
    }
}

#[async_trait]
impl DraftGenerator for MockStep {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate_draft(&self, source_text: &str) -> Result<String, StepError> {
        self.enter(source_text).await?;
        Ok(self.draft_text.read().await.clone())
    }
}

#[async_trait]
impl Translator for MockStep {
    fn name(&self) -> &str {
        "mock"
    }

    async fn translate(&self, intermediate_text: &str) -> Result<String, StepError> {
        self.enter(intermediate_text).await?;
        Ok(self.translation_text.read().await.clone())
    }
}

#[async_trait]
impl QualityScorer for MockStep {
    fn name(&self) -> &str {
        "mock"
    }

    async fn score(&self, item: &TranslationItem) -> Result<QualityAssessment, StepError> {
        self.enter(&item.key).await?;
        let queued = self.scores.write().await.pop_front();
        match queued {
            Some(assessment) => Ok(assessment),
            None => Ok(QualityAssessment::new(*self.default_score.read().await)),
        }
    }
}

#[async_trait]
impl TranslationMemory for MockStep {
    fn name(&self) -> &str {
        "mock"
    }

    async fn store(&self, item: &TranslationItem) -> Result<(), StepError> {
        self.enter(&item.key).await
    }
}

/// One mock per external step.
#[derive(Debug, Clone, Default)]
pub struct MockSteps {
    pub drafts: MockStep,
    pub translator: MockStep,
    pub scorer: MockStep,
    pub memory: MockStep,
}

impl MockSteps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Providers backed by these mocks. Clones share state with `self`.
    pub fn providers(&self) -> StepProviders {
        StepProviders::new(
            Arc::new(self.drafts.clone()),
            Arc::new(self.translator.clone()),
            Arc::new(self.scorer.clone()),
            Arc::new(self.memory.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_calls_and_returns_configured_text() {
        let mock = MockStep::new();
        mock.set_translation_text("Save").await;

        let text = mock.translate("저장").await.unwrap();
        assert_eq!(text, "Save");
        assert_eq!(mock.recorded_calls().await, vec!["저장".to_string()]);
    }

    #[tokio::test]
    async fn test_next_error_is_one_shot() {
        let mock = MockStep::new();
        mock.set_next_error(StepError::Failed("boom".to_string()))
            .await;

        assert!(mock.generate_draft("a").await.is_err());
        assert!(mock.generate_draft("a").await.is_ok());
        assert_eq!(mock.call_count().await, 2);
    }

    #[tokio::test]
    async fn test_failing_until_cleared() {
        let mock = MockStep::new();
        mock.set_failing(StepError::Unavailable("down".to_string()))
            .await;
        assert!(mock.generate_draft("a").await.is_err());
        assert!(mock.generate_draft("a").await.is_err());

        mock.clear_failing().await;
        assert!(mock.generate_draft("a").await.is_ok());
    }

    #[tokio::test]
    async fn test_score_queue_then_default() {
        let mock = MockStep::new();
        mock.push_score(ValidationScore::Low).await;
        let item = TranslationItem::new("app.title", "Isihloko", "ui");

        assert_eq!(mock.score(&item).await.unwrap().score, ValidationScore::Low);
        assert_eq!(mock.score(&item).await.unwrap().score, ValidationScore::High);
    }

    #[tokio::test]
    async fn test_hold_blocks_until_release() {
        let mock = MockStep::new();
        mock.hold();

        let pending = {
            let mock = mock.clone();
            tokio::spawn(async move { mock.generate_draft("a").await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!pending.is_finished());

        mock.release();
        assert!(pending.await.unwrap().is_ok());
    }
}
