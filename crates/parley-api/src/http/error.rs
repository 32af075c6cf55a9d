//! Application error type mapping to HTTP status codes and the
//! `{success: false, error}` envelope.

use std::fmt;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use parley_types::error::ChatError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Client input was rejected. The message is shown to the caller.
    Validation(String),
    /// Something failed server-side. Only `public` reaches the caller;
    /// `detail` goes to the log.
    Internal {
        public: &'static str,
        detail: String,
    },
}

impl AppError {
    pub fn internal(public: &'static str, detail: impl fmt::Display) -> Self {
        AppError::Internal {
            public,
            detail: detail.to_string(),
        }
    }

    /// Map a `ChatError`, hiding non-validation detail behind `public`.
    pub fn from_chat(err: ChatError, public: &'static str) -> Self {
        match err {
            ChatError::Validation(msg) => AppError::Validation(msg),
            other => AppError::internal(public, other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal { public, detail } => {
                tracing::error!(error = %detail, "{public}");
                (StatusCode::INTERNAL_SERVER_ERROR, public.to_string())
            }
        };

        let body = json!({
            "success": false,
            "error": message,
        });

        (status, Json(body)).into_response()
    }
}
