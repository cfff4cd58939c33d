//! Item API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use watchtower_core::{
    BulkImportRequest, ItemEdits, ItemFilter, ItemView, NewItemRequest, ProcessingRun,
    TranslationState, WorkflowAction, WorkflowError,
};

use super::error::ApiError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing items
#[derive(Debug, Deserialize)]
pub struct ListItemsParams {
    /// Only items in this state
    pub state: Option<String>,
}

/// Request body for a bulk import
#[derive(Debug, Deserialize)]
pub struct ImportBody {
    pub context: String,
    /// Key to source text, in submission order.
    pub entries: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub items: Vec<ItemView>,
}

/// Request body for performing an action
#[derive(Debug, Deserialize)]
pub struct ActionBody {
    pub action: WorkflowAction,
    #[serde(default)]
    pub edits: ItemEdits,
}

/// Items owned by a background run, and items waiting for a retry.
#[derive(Debug, Serialize)]
pub struct ProcessingResponse {
    pub processing: Vec<String>,
    pub stuck: Vec<String>,
    pub runs: Vec<ProcessingRun>,
}

// ============================================================================
// Handlers
// ============================================================================

/// List items, newest first, optionally restricted to one state
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListItemsParams>,
) -> Result<Json<Vec<ItemView>>, ApiError> {
    let orchestrator = state.orchestrator();
    let Some(raw) = params.state else {
        return Ok(Json(orchestrator.item_views().await));
    };

    let item_state: TranslationState = raw
        .parse()
        .map_err(|_| ApiError::bad_request(format!("unknown state: {raw}")))?;
    let filter = ItemFilter::new().with_state(item_state);
    Ok(Json(orchestrator.filtered_views(&filter).await?))
}

/// List items matching a filter
pub async fn search_items(
    State(state): State<Arc<AppState>>,
    Json(filter): Json<ItemFilter>,
) -> Result<Json<Vec<ItemView>>, ApiError> {
    Ok(Json(state.orchestrator().filtered_views(&filter).await?))
}

/// Submit a single key
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewItemRequest>,
) -> Result<(StatusCode, Json<ItemView>), ApiError> {
    let orchestrator = state.orchestrator();
    let item = orchestrator.add_item(request).await?;
    let view = orchestrator.item_view(&item.id).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Submit several keys sharing one context
pub async fn import_items(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ImportBody>,
) -> Result<(StatusCode, Json<ImportResponse>), ApiError> {
    let request =
        BulkImportRequest::from_json(body.context, &body.entries).map_err(WorkflowError::from)?;

    let orchestrator = state.orchestrator();
    let items = orchestrator.import_items(request).await?;

    let mut views = Vec::with_capacity(items.len());
    for item in &items {
        views.push(orchestrator.item_view(&item.id).await?);
    }

    Ok((
        StatusCode::CREATED,
        Json(ImportResponse {
            imported: views.len(),
            items: views,
        }),
    ))
}

/// Get an item by ID
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ItemView>, ApiError> {
    Ok(Json(state.orchestrator().item_view(&id).await?))
}

/// Perform a workflow action on an item
pub async fn perform_action(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ActionBody>,
) -> Result<Json<ItemView>, ApiError> {
    let orchestrator = state.orchestrator();
    orchestrator
        .perform_action(&id, body.action, body.edits)
        .await?;
    Ok(Json(orchestrator.item_view(&id).await?))
}

/// Items currently being auto-progressed, and stuck items
pub async fn get_processing(State(state): State<Arc<AppState>>) -> Json<ProcessingResponse> {
    let orchestrator = state.orchestrator();
    Json(ProcessingResponse {
        processing: orchestrator.processing_ids(),
        stuck: orchestrator.stuck_ids().await,
        runs: orchestrator.processing_runs(),
    })
}
