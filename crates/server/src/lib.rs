//! HTTP and WebSocket front end for the localization workflow.

pub mod api;
pub mod metrics;
pub mod state;
