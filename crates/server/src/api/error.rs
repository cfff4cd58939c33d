//! Mapping of workflow errors onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use watchtower_core::WorkflowError;

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A failed API call: status plus message.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        let status = match &err {
            WorkflowError::ItemNotFound(_) => StatusCode::NOT_FOUND,
            WorkflowError::InvalidTransition { .. } | WorkflowError::DuplicateKey(_) => {
                StatusCode::CONFLICT
            }
            WorkflowError::ExternalStepFailure { .. } => StatusCode::BAD_GATEWAY,
            WorkflowError::InvalidInput(_) | WorkflowError::InvalidFilter(_) => {
                StatusCode::BAD_REQUEST
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use watchtower_core::{IntakeError, TranslationState, WorkflowAction};

    #[test]
    fn test_status_codes() {
        let cases = [
            (
                WorkflowError::ItemNotFound("x".into()),
                StatusCode::NOT_FOUND,
            ),
            (
                WorkflowError::InvalidTransition {
                    state: TranslationState::Stored,
                    action: WorkflowAction::Reject,
                },
                StatusCode::CONFLICT,
            ),
            (
                WorkflowError::DuplicateKey(vec!["app.title".into()]),
                StatusCode::CONFLICT,
            ),
            (
                WorkflowError::ExternalStepFailure {
                    action: WorkflowAction::Translate,
                    message: "down".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                WorkflowError::InvalidInput(IntakeError::EmptyImport),
                StatusCode::BAD_REQUEST,
            ),
            (
                WorkflowError::InvalidFilter("too many".into()),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status, expected);
        }
    }
}
