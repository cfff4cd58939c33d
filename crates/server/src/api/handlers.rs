use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use watchtower_core::{Config, StateCounts};

use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<Config> {
    Json(state.config().clone())
}

#[derive(Serialize)]
pub struct CountsResponse {
    #[serde(flatten)]
    pub counts: StateCounts,
    pub summary: CountsSummary,
}

/// Dashboard buckets over the per-state counts.
#[derive(Serialize)]
pub struct CountsSummary {
    pub pending: usize,
    pub in_progress: usize,
    pub needs_review: usize,
    pub done: usize,
}

impl From<StateCounts> for CountsResponse {
    fn from(counts: StateCounts) -> Self {
        let summary = CountsSummary {
            pending: counts.pending(),
            in_progress: counts.in_progress(),
            needs_review: counts.needs_review(),
            done: counts.done(),
        };
        Self { counts, summary }
    }
}

/// Item count per state, plus the total and summary buckets.
pub async fn get_counts(State(state): State<Arc<AppState>>) -> Json<CountsResponse> {
    Json(state.orchestrator().counts().await.into())
}

/// Prometheus scrape endpoint.
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    collect_dynamic_metrics(&state).await;
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
