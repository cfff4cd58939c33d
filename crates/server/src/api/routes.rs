use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::{handlers, items, middleware::metrics_middleware, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health, config and metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::get_metrics))
        // Items
        .route("/items", get(items::list_items).post(items::create_item))
        .route("/items/search", post(items::search_items))
        .route("/items/import", post(items::import_items))
        .route("/items/{id}", get(items::get_item))
        .route("/items/{id}/actions", post(items::perform_action))
        // Aggregates
        .route("/counts", get(handlers::get_counts))
        .route("/processing", get(items::get_processing))
        // Live events
        .route("/ws", get(ws::ws_handler))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(metrics_middleware)),
        )
}
