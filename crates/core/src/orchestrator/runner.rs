//! Workflow orchestrator implementation.
//!
//! Owns the item collection, applies engine transitions, and drives items
//! through the auto-progress states in the background:
//! - Manual actions apply synchronously and return the updated item
//! - Entering draft / translated / validated spawns one run per item
//! - Runs re-check the item's state after every suspension point

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::events::{EventBroadcaster, WorkflowEvent};
use crate::filter::ItemFilter;
use crate::intake::{validate_edits, BulkImportRequest, NewItemRequest};
use crate::item::{ItemStore, StateCounts, TranslationItem};
use crate::metrics::{
    AUTO_PROGRESS_ABORTS, ITEMS_ADDED, STEP_DURATION, STEP_FAILURES, TRANSITIONS_TOTAL,
};
use crate::steps::{StepError, StepProviders};
use crate::workflow::{
    auto_action, is_legal, transition, ItemEdits, StepOutput, TransitionContext,
    TranslationState, WorkflowAction,
};

use super::config::OrchestratorConfig;
use super::types::{ItemStatus, ItemView, ProcessingRun, StepFailure, WorkflowError};

type ProcessingMap = Arc<Mutex<HashMap<String, ProcessingRun>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Exclusive right to auto-progress one item. Released on drop.
struct ProcessingClaim {
    item_id: String,
    processing: ProcessingMap,
}

impl ProcessingClaim {
    /// Take the claim for `item_id`, or `None` if a run already holds it.
    fn acquire(processing: &ProcessingMap, item_id: &str, state: TranslationState) -> Option<Self> {
        let mut runs = lock(processing);
        if runs.contains_key(item_id) {
            return None;
        }
        runs.insert(
            item_id.to_string(),
            ProcessingRun {
                item_id: item_id.to_string(),
                started_in: state,
                started_at: Utc::now(),
            },
        );
        Some(Self {
            item_id: item_id.to_string(),
            processing: Arc::clone(processing),
        })
    }
}

impl Drop for ProcessingClaim {
    fn drop(&mut self) {
        lock(&self.processing).remove(&self.item_id);
    }
}

struct Inner {
    config: OrchestratorConfig,
    steps: StepProviders,
    store: RwLock<ItemStore>,
    processing: ProcessingMap,
    failures: Mutex<HashMap<String, StepFailure>>,
    events: EventBroadcaster,
}

/// Drives translation items through the workflow.
///
/// Cheap to clone; clones share the same collection.
#[derive(Clone)]
pub struct WorkflowOrchestrator {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for WorkflowOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowOrchestrator")
            .field("config", &self.inner.config)
            .field("steps", &self.inner.steps)
            .finish_non_exhaustive()
    }
}

impl WorkflowOrchestrator {
    /// Create an orchestrator with an empty collection.
    pub fn new(config: OrchestratorConfig, steps: StepProviders) -> Self {
        let events = EventBroadcaster::new(config.event_buffer.max(1));
        Self::with_broadcaster(config, steps, events)
    }

    /// Create an orchestrator publishing to an existing broadcaster.
    pub fn with_broadcaster(
        config: OrchestratorConfig,
        steps: StepProviders,
        events: EventBroadcaster,
    ) -> Self {
        info!(?steps, "Creating workflow orchestrator");
        Self {
            inner: Arc::new(Inner {
                config,
                steps,
                store: RwLock::new(ItemStore::new()),
                processing: Arc::new(Mutex::new(HashMap::new())),
                failures: Mutex::new(HashMap::new()),
                events,
            }),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.inner.config
    }

    pub fn events(&self) -> &EventBroadcaster {
        &self.inner.events
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.inner.events.subscribe()
    }

    // =========================================================================
    // Intake
    // =========================================================================

    /// Validate and add a single key in `received`.
    pub async fn add_item(&self, request: NewItemRequest) -> Result<TranslationItem, WorkflowError> {
        let request = request.validate()?;

        let item = {
            let mut store = self.inner.store.write().await;
            if store.contains_key(&request.key) {
                return Err(WorkflowError::DuplicateKey(vec![request.key]));
            }
            let item = TranslationItem::new(request.key, request.source_text, request.context);
            store.insert_front(item.clone());
            item
        };

        self.item_added(&item);
        Ok(item)
    }

    /// Add a batch of keys. Nothing is added if any key is invalid or taken.
    ///
    /// Items are returned in entry order; each is prepended, so the last
    /// entry ends up first in the collection.
    pub async fn import_items(
        &self,
        request: BulkImportRequest,
    ) -> Result<Vec<TranslationItem>, WorkflowError> {
        let requests = request.validate()?;

        let items = {
            let mut store = self.inner.store.write().await;

            let mut seen = HashSet::new();
            let duplicates: Vec<String> = requests
                .iter()
                .filter(|r| store.contains_key(&r.key) || !seen.insert(r.key.as_str()))
                .map(|r| r.key.clone())
                .collect();
            if !duplicates.is_empty() {
                return Err(WorkflowError::DuplicateKey(duplicates));
            }

            let items: Vec<TranslationItem> = requests
                .into_iter()
                .map(|r| TranslationItem::new(r.key, r.source_text, r.context))
                .collect();
            for item in &items {
                store.insert_front(item.clone());
            }
            items
        };

        info!("Imported {} items", items.len());
        for item in &items {
            self.item_added(item);
        }
        Ok(items)
    }

    fn item_added(&self, item: &TranslationItem) {
        ITEMS_ADDED.inc();
        info!(item_id = %item.id, key = %item.key, "Item added");
        self.inner.events.broadcast(WorkflowEvent::ItemAdded {
            item_id: item.id.clone(),
            key: item.key.clone(),
        });
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Apply `action` to an item and return it as it stands afterwards.
    ///
    /// Actions backed by an external step call it first; a fault is returned
    /// with the item unchanged. If the transition lands in an auto-progress
    /// state, a background run is started before this returns.
    pub async fn perform_action(
        &self,
        item_id: &str,
        action: WorkflowAction,
        edits: ItemEdits,
    ) -> Result<TranslationItem, WorkflowError> {
        if action == WorkflowAction::RetryStep {
            return self.retry_step(item_id).await;
        }

        let current = self.item(item_id).await?;
        if !is_legal(current.state, action) {
            return Err(WorkflowError::InvalidTransition {
                state: current.state,
                action,
            });
        }

        let edits = if action == WorkflowAction::ReviewApprove {
            validate_edits(edits)?
        } else {
            edits
        };

        let mut ctx = TransitionContext::new().with_edits(edits);
        if has_external_step(action) {
            match self.run_step(action, &current).await {
                Ok(output) => ctx = ctx.with_output(output),
                Err(e) => {
                    self.record_failure(item_id, action, current.state, &e);
                    return Err(WorkflowError::ExternalStepFailure {
                        action,
                        message: e.to_string(),
                    });
                }
            }
        }

        let (item, from_state, claim) = {
            let mut store = self.inner.store.write().await;

            // Recomputed against the live state; a concurrent change makes this stale.
            let from_state = store
                .get(item_id)
                .ok_or_else(|| WorkflowError::ItemNotFound(item_id.to_string()))?
                .state;
            let next = transition(from_state, action, &ctx)?;

            if let Some(new_key) = next.updates.key.as_deref() {
                let taken = store
                    .iter()
                    .any(|other| other.id != item_id && other.key == new_key);
                if taken {
                    return Err(WorkflowError::DuplicateKey(vec![new_key.to_string()]));
                }
            }

            let item = store
                .get_mut(item_id)
                .ok_or_else(|| WorkflowError::ItemNotFound(item_id.to_string()))?;
            item.apply(next);

            let claim = if item.state.is_auto_progress() {
                ProcessingClaim::acquire(&self.inner.processing, item_id, item.state)
            } else {
                None
            };
            (item.clone(), from_state, claim)
        };

        self.transitioned(&item, action, from_state, false);

        if let Some(claim) = claim {
            tokio::spawn(self.clone().run_auto_progress(claim, item.state));
        }

        Ok(item)
    }

    /// Re-enter auto-progression for an item parked in an auto-progress state.
    ///
    /// Does nothing if a run already owns the item.
    async fn retry_step(&self, item_id: &str) -> Result<TranslationItem, WorkflowError> {
        let (item, claim) = {
            let store = self.inner.store.read().await;
            let item = store
                .get(item_id)
                .ok_or_else(|| WorkflowError::ItemNotFound(item_id.to_string()))?;
            if !item.state.is_auto_progress() {
                return Err(WorkflowError::InvalidTransition {
                    state: item.state,
                    action: WorkflowAction::RetryStep,
                });
            }
            let claim = ProcessingClaim::acquire(&self.inner.processing, item_id, item.state);
            (item.clone(), claim)
        };

        match claim {
            Some(claim) => {
                info!(item_id, state = %item.state, "Retrying automatic step");
                tokio::spawn(self.clone().run_auto_progress(claim, item.state));
            }
            None => debug!(item_id, "Item already processing, retry_step ignored"),
        }

        Ok(item)
    }

    // =========================================================================
    // Auto-progression
    // =========================================================================

    /// Run automatic steps for one item until it reaches a state that needs
    /// a human, a terminal state, or a step fails.
    ///
    /// Every exit publishes its event and releases the claim while the store
    /// lock is still held, so a reader that sees the item idle also sees the
    /// outcome.
    async fn run_auto_progress(self, claim: ProcessingClaim, mut expected: TranslationState) {
        let item_id = claim.item_id.clone();
        debug!(item_id = %item_id, state = %expected, "Auto-progress run started");

        loop {
            let Some(action) = auto_action(expected) else {
                drop(claim);
                return;
            };

            if let Some(delay) = self.inner.config.settle_delay() {
                tokio::time::sleep(delay).await;
            }

            let item = {
                let store = self.inner.store.read().await;
                let Some(item) = store.get(&item_id) else {
                    drop(claim);
                    return;
                };
                if item.state != expected {
                    let actual = item.state;
                    if actual.is_auto_progress() {
                        // Still ours; follow the item into its new state.
                        drop(store);
                        self.followed(&item_id, expected, actual);
                        expected = actual;
                        continue;
                    }
                    self.aborted(&item_id, expected, actual);
                    drop(claim);
                    drop(store);
                    return;
                }
                item.clone()
            };

            let output = if has_external_step(action) {
                Some(self.run_step(action, &item).await)
            } else {
                None
            };

            let mut store = self.inner.store.write().await;
            let Some(item) = store.get_mut(&item_id) else {
                drop(claim);
                return;
            };
            if item.state != expected {
                let actual = item.state;
                if actual.is_auto_progress() {
                    drop(store);
                    self.followed(&item_id, expected, actual);
                    expected = actual;
                    continue;
                }
                self.aborted(&item_id, expected, actual);
                drop(claim);
                drop(store);
                return;
            }

            let ctx = match output {
                None => TransitionContext::new(),
                Some(Ok(output)) => TransitionContext::new().with_output(output),
                Some(Err(e)) => {
                    self.record_failure(&item_id, action, expected, &e);
                    drop(claim);
                    return;
                }
            };
            let next = match transition(expected, action, &ctx) {
                Ok(next) => next,
                Err(e) => {
                    warn!(item_id = %item_id, "Automatic {} rejected: {}", action, e);
                    drop(claim);
                    return;
                }
            };
            item.apply(next);
            let item = item.clone();

            if !item.state.is_auto_progress() {
                self.transitioned(&item, action, expected, true);
                drop(claim);
                drop(store);
                debug!(item_id = %item_id, state = %item.state, "Auto-progress run finished");
                return;
            }
            drop(store);

            self.transitioned(&item, action, expected, true);
            expected = item.state;
        }
    }

    // =========================================================================
    // External steps
    // =========================================================================

    async fn call_step(
        &self,
        action: WorkflowAction,
        item: &TranslationItem,
    ) -> Result<StepOutput, StepError> {
        let steps = &self.inner.steps;
        match action {
            WorkflowAction::GenerateDraft => steps
                .drafts
                .generate_draft(&item.source_text)
                .await
                .map(StepOutput::Draft),
            WorkflowAction::Translate => {
                let text = item.intermediate_text.as_deref().unwrap_or_default();
                steps.translator.translate(text).await.map(StepOutput::Translation)
            }
            WorkflowAction::Validate => steps.scorer.score(item).await.map(|a| StepOutput::Score {
                score: a.score,
                notes: a.notes,
            }),
            WorkflowAction::Store => steps.memory.store(item).await.map(|_| StepOutput::Stored),
            other => Err(StepError::Failed(format!("{other} has no external step"))),
        }
    }

    /// Call the collaborator behind `action`, bounded by the step timeout.
    async fn run_step(
        &self,
        action: WorkflowAction,
        item: &TranslationItem,
    ) -> Result<StepOutput, StepError> {
        let started = Instant::now();

        let result = match self.inner.config.step_timeout() {
            Some(limit) => tokio::time::timeout(limit, self.call_step(action, item))
                .await
                .unwrap_or(Err(StepError::Timeout(limit.as_millis() as u64))),
            None => self.call_step(action, item).await,
        };

        let outcome = if result.is_ok() { "success" } else { "error" };
        STEP_DURATION
            .with_label_values(&[action.as_str(), outcome])
            .observe(started.elapsed().as_secs_f64());
        debug!(item_id = %item.id, %action, outcome, "External step finished");

        result
    }

    // =========================================================================
    // Bookkeeping
    // =========================================================================

    fn transitioned(
        &self,
        item: &TranslationItem,
        action: WorkflowAction,
        from_state: TranslationState,
        automatic: bool,
    ) {
        lock(&self.inner.failures).remove(&item.id);

        let trigger = if automatic { "automatic" } else { "manual" };
        TRANSITIONS_TOTAL
            .with_label_values(&[action.as_str(), trigger])
            .inc();
        info!(
            item_id = %item.id,
            key = %item.key,
            "{} -> {} via {} ({})",
            from_state,
            item.state,
            action,
            trigger
        );

        self.inner.events.broadcast(WorkflowEvent::ItemTransitioned {
            item_id: item.id.clone(),
            action,
            from_state,
            to_state: item.state,
            automatic,
        });
    }

    fn record_failure(
        &self,
        item_id: &str,
        action: WorkflowAction,
        state: TranslationState,
        error: &StepError,
    ) {
        STEP_FAILURES.with_label_values(&[action.as_str()]).inc();
        warn!(item_id, %state, "{} step failed: {}", action, error);

        let message = error.to_string();
        lock(&self.inner.failures).insert(
            item_id.to_string(),
            StepFailure {
                action,
                state,
                message: message.clone(),
                at: Utc::now(),
            },
        );
        self.inner.events.broadcast(WorkflowEvent::StepFailed {
            item_id: item_id.to_string(),
            action,
            state,
            message,
        });
    }

    fn followed(&self, item_id: &str, expected: TranslationState, actual: TranslationState) {
        debug!(
            item_id,
            "Item moved from {} to {} under the run, continuing", expected, actual
        );
    }

    fn aborted(&self, item_id: &str, expected: TranslationState, actual: TranslationState) {
        AUTO_PROGRESS_ABORTS.inc();
        warn!(
            item_id,
            "Auto-progress aborted: expected {}, found {}", expected, actual
        );
        self.inner.events.broadcast(WorkflowEvent::AutoProgressAborted {
            item_id: item_id.to_string(),
            expected_state: expected,
            actual_state: actual,
        });
    }

    // =========================================================================
    // Projections
    // =========================================================================

    /// All items, newest first.
    pub async fn items(&self) -> Vec<TranslationItem> {
        self.inner.store.read().await.iter().cloned().collect()
    }

    pub async fn item(&self, item_id: &str) -> Result<TranslationItem, WorkflowError> {
        self.inner
            .store
            .read()
            .await
            .get(item_id)
            .cloned()
            .ok_or_else(|| WorkflowError::ItemNotFound(item_id.to_string()))
    }

    /// Items matching `filter`, newest first.
    pub async fn filtered(&self, filter: &ItemFilter) -> Result<Vec<TranslationItem>, WorkflowError> {
        filter.validate().map_err(WorkflowError::InvalidFilter)?;
        let store = self.inner.store.read().await;
        Ok(filter.apply(store.iter()).into_iter().cloned().collect())
    }

    /// Per-state counts over the live collection.
    pub async fn counts(&self) -> StateCounts {
        self.inner.store.read().await.counts()
    }

    /// Ids of items an automatic run currently owns.
    pub fn processing_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = lock(&self.inner.processing).keys().cloned().collect();
        ids.sort();
        ids
    }

    /// In-flight automatic runs.
    pub fn processing_runs(&self) -> Vec<ProcessingRun> {
        lock(&self.inner.processing).values().cloned().collect()
    }

    /// Ids of items sitting in an auto-progress state with no run, newest first.
    pub async fn stuck_ids(&self) -> Vec<String> {
        let store = self.inner.store.read().await;
        let processing = lock(&self.inner.processing);
        store
            .iter()
            .filter(|item| {
                ItemStatus::derive(item.state, processing.contains_key(&item.id))
                    == ItemStatus::Stuck
            })
            .map(|item| item.id.clone())
            .collect()
    }

    pub async fn status(&self, item_id: &str) -> Result<ItemStatus, WorkflowError> {
        let store = self.inner.store.read().await;
        let item = store
            .get(item_id)
            .ok_or_else(|| WorkflowError::ItemNotFound(item_id.to_string()))?;
        let processing = lock(&self.inner.processing).contains_key(item_id);
        Ok(ItemStatus::derive(item.state, processing))
    }

    pub fn last_failure(&self, item_id: &str) -> Option<StepFailure> {
        lock(&self.inner.failures).get(item_id).cloned()
    }

    pub async fn item_view(&self, item_id: &str) -> Result<ItemView, WorkflowError> {
        let store = self.inner.store.read().await;
        let item = store
            .get(item_id)
            .ok_or_else(|| WorkflowError::ItemNotFound(item_id.to_string()))?;
        Ok(self.view_of(item))
    }

    /// Every item with its status and available actions, newest first.
    pub async fn item_views(&self) -> Vec<ItemView> {
        let store = self.inner.store.read().await;
        store.iter().map(|item| self.view_of(item)).collect()
    }

    /// Views of the items matching `filter`.
    pub async fn filtered_views(&self, filter: &ItemFilter) -> Result<Vec<ItemView>, WorkflowError> {
        filter.validate().map_err(WorkflowError::InvalidFilter)?;
        let store = self.inner.store.read().await;
        Ok(filter
            .apply(store.iter())
            .into_iter()
            .map(|item| self.view_of(item))
            .collect())
    }

    fn view_of(&self, item: &TranslationItem) -> ItemView {
        let processing = lock(&self.inner.processing).contains_key(&item.id);
        ItemView::new(item.clone(), processing, self.last_failure(&item.id))
    }
}

fn has_external_step(action: WorkflowAction) -> bool {
    matches!(
        action,
        WorkflowAction::GenerateDraft
            | WorkflowAction::Translate
            | WorkflowAction::Validate
            | WorkflowAction::Store
    )
}
