//! Prometheus metrics for observability.
//!
//! Server-side metrics live here:
//! - HTTP request metrics (latency, counts)
//! - WebSocket connection metrics
//! - Item counts by state, processing and stuck items (collected dynamically)
//!
//! Workflow counters from the core crate are registered into the same registry.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec,
    Opts, Registry, TextEncoder,
};
use regex_lite::Regex;
use tracing::error;
use watchtower_core::TranslationState;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "watchtower_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("watchtower_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "watchtower_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// WebSocket Metrics
// =============================================================================

pub static WS_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "watchtower_ws_connections_active",
        "Number of active WebSocket connections",
    )
    .unwrap()
});

/// Total WebSocket connections (cumulative).
pub static WS_CONNECTIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "watchtower_ws_connections_total",
        "Total WebSocket connections since startup",
    )
    .unwrap()
});

/// WebSocket events sent, by event type.
pub static WS_EVENTS_SENT: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("watchtower_ws_events_sent_total", "WebSocket events sent"),
        &["type"],
    )
    .unwrap()
});

/// Times a client fell behind the event feed.
pub static WS_LAG_EVENTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "watchtower_ws_lag_events_total",
        "WebSocket lag events (client fell behind)",
    )
    .unwrap()
});

// =============================================================================
// Item Metrics (collected dynamically)
// =============================================================================

pub static ITEMS_BY_STATE: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("watchtower_items_by_state", "Current item count by state"),
        &["state"],
    )
    .unwrap()
});

/// Items with a background run in flight.
pub static ITEMS_PROCESSING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "watchtower_items_processing",
        "Items currently being auto-progressed",
    )
    .unwrap()
});

/// Items resting in an auto-progress state with no run.
pub static ITEMS_STUCK: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "watchtower_items_stuck",
        "Items waiting in an automatic state with no run in flight",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    let server_metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(HTTP_REQUEST_DURATION.clone()),
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()),
        Box::new(WS_CONNECTIONS_ACTIVE.clone()),
        Box::new(WS_CONNECTIONS_TOTAL.clone()),
        Box::new(WS_EVENTS_SENT.clone()),
        Box::new(WS_LAG_EVENTS.clone()),
        Box::new(ITEMS_BY_STATE.clone()),
        Box::new(ITEMS_PROCESSING.clone()),
        Box::new(ITEMS_STUCK.clone()),
    ];

    for metric in server_metrics
        .into_iter()
        .chain(watchtower_core::metrics::all_metrics())
    {
        if let Err(e) = registry.register(metric) {
            error!("Failed to register metric: {}", e);
        }
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Refresh the item gauges from the orchestrator.
///
/// Called right before encoding so a scrape sees current values.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let orchestrator = state.orchestrator();

    let counts = orchestrator.counts().await;
    for item_state in TranslationState::ALL {
        ITEMS_BY_STATE
            .with_label_values(&[item_state.as_str()])
            .set(counts.get(item_state) as i64);
    }

    ITEMS_PROCESSING.set(orchestrator.processing_ids().len() as i64);
    ITEMS_STUCK.set(orchestrator.stuck_ids().await.len() as i64);
}

static UUID_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .unwrap()
});

static ITEM_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(/api/v1/items/)([^/]+)").unwrap());

/// Normalize a path for metric labels (replace item ids with placeholders).
pub fn normalize_path(path: &str) -> String {
    let result = UUID_SEGMENT.replace_all(path, "{id}");
    let result = ITEM_SEGMENT.replace(&result, |caps: &regex_lite::Captures| {
        match &caps[2] {
            "search" | "import" => caps[0].to_string(),
            _ => format!("{}{{id}}", &caps[1]),
        }
    });
    result.into_owned()
}
