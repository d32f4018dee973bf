use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Every error leaves the process as `{"error": <message>}` with the
/// matching status code; internal detail stays in the logs.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid data format: \"data\" field is required and cannot be empty.")]
    MissingData,

    #[error("Request body must include a non-empty \"messages\" array.")]
    EmptyMessages,

    #[error("Invalid request body")]
    InvalidBody,

    #[error("Failed to clarify the user's query")]
    Clarification(#[source] anyhow::Error),

    #[error("Error processing your request")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::MissingData | Self::EmptyMessages | Self::InvalidBody => StatusCode::BAD_REQUEST,
            Self::Clarification(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Clarification(err) | Self::Internal(err) = &self {
            error!("Request failed: {err:#}");
        }

        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
