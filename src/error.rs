// src/error.rs
//! Errors that reach the HTTP caller. Adapter-local failures never end up here.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub const MISSING_FIELDS: &str = "Missing url or platform";

#[derive(Debug, Error)]
pub enum FinderError {
    /// A required credential is not configured. Fatal for the request.
    #[error("{0} not configured")]
    MissingCredential(&'static str),

    /// The request body is unusable. No adapters are invoked.
    #[error("{0}")]
    InvalidRequest(String),

    /// Anything unexpected above the adapter level.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl FinderError {
    pub fn status(&self) -> StatusCode {
        match self {
            FinderError::MissingCredential(_) | FinderError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            FinderError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for FinderError {
    fn into_response(self) -> Response {
        let message = match &self {
            // Internal detail stays in logs.
            FinderError::Internal(e) => {
                tracing::error!(error = ?e, "repost search failed");
                "Repost search failed".to_string()
            }
            other => other.to_string(),
        };
        (self.status(), Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_and_statuses() {
        let e = FinderError::MissingCredential("ANTHROPIC_API_KEY");
        assert_eq!(e.to_string(), "ANTHROPIC_API_KEY not configured");
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let e = FinderError::InvalidRequest(MISSING_FIELDS.into());
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert_eq!(e.to_string(), MISSING_FIELDS);
    }
}
