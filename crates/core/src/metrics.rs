//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Workflow transitions (manual and automatic)
//! - External steps (duration, failures)
//! - Intake

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Workflow Metrics
// =============================================================================

/// Transitions applied, by action and trigger.
pub static TRANSITIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "watchtower_transitions_total",
            "Total workflow transitions applied",
        ),
        &["action", "trigger"], // trigger: "manual", "automatic"
    )
    .unwrap()
});

/// Items accepted by intake.
pub static ITEMS_ADDED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("watchtower_items_added_total", "Total items added").unwrap()
});

/// Automatic runs abandoned because the item changed state.
pub static AUTO_PROGRESS_ABORTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "watchtower_auto_progress_aborts_total",
        "Automatic runs aborted by a concurrent state change",
    )
    .unwrap()
});

// =============================================================================
// External Step Metrics
// =============================================================================

/// External step duration in seconds.
pub static STEP_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "watchtower_step_duration_seconds",
            "Duration of external step calls",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["action", "result"], // result: "success", "error"
    )
    .unwrap()
});

/// External step failures by action.
pub static STEP_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("watchtower_step_failures_total", "Total external step failures"),
        &["action"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Workflow
        Box::new(TRANSITIONS_TOTAL.clone()),
        Box::new(ITEMS_ADDED.clone()),
        Box::new(AUTO_PROGRESS_ABORTS.clone()),
        // External steps
        Box::new(STEP_DURATION.clone()),
        Box::new(STEP_FAILURES.clone()),
    ]
}
