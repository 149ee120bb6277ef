use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Outcome taxonomy for the order core. Everything except `Internal` is a
/// recoverable, expected result of normal concurrent operation and maps to a
/// 4xx response; `AlreadyTaken` and `StaleState` in particular are frequent
/// under load and are never logged as errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("location required for forward transitions")]
    LocationRequired,

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("illegal transition: {0}")]
    IllegalTransition(String),

    #[error("order already taken by another driver")]
    AlreadyTaken,

    #[error("stale state: order has already moved past the expected status")]
    StaleState,

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable tag so clients can tell apart outcomes that
    /// share an HTTP status (AlreadyTaken vs StaleState are both 409).
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::BadRequest(_) => "bad_request",
            AppError::LocationRequired => "location_required",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::IllegalTransition(_) => "illegal_transition",
            AppError::AlreadyTaken => "already_taken",
            AppError::StaleState => "stale_state",
            AppError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::LocationRequired => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::FORBIDDEN,
            AppError::IllegalTransition(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::AlreadyTaken | AppError::StaleState => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }));

        (status, body).into_response()
    }
}
