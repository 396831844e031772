//! API error taxonomy shared by every handler.
//!
//! Bodies carry at most a short static message. Credential and token failures
//! never say why they failed; the detail goes to the log instead.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use super::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Absent, invalid or expired credentials.
    #[error("unauthorized")]
    Unauthorized,
    /// Valid identity without the required role.
    #[error("forbidden")]
    Forbidden,
    #[error("bad request: {0}")]
    BadRequest(&'static str),
    #[error("not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(&'static str),
    /// Store, random-source or signing failure. The source is logged, never returned.
    #[error("internal error: {0}")]
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(_) => Self::Conflict("Resource already exists."),
            StoreError::Database(err) => Self::Internal(err.into()),
        }
    }
}

// Serde's message stays in the log; clients get the taxonomy's 400.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("Rejected request body: {rejection}");
        Self::BadRequest("Invalid request body.")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::BadRequest(message) | Self::Conflict(message) => {
                (status, message).into_response()
            }
            Self::Internal(err) => {
                error!("Internal error: {err:#}");
                status.into_response()
            }
            Self::Unauthorized | Self::Forbidden | Self::NotFound => status.into_response(),
        }
    }
}
