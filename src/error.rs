// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types: the FatSecret client taxonomy and the HTTP-facing `AppError`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Explanations for the OAuth failure codes FatSecret reports in an
/// otherwise successful response body.
const OAUTH_ERROR_CODES: &[(i64, &str)] = &[
    (2, "Missing required oauth parameter"),
    (3, "Unsupported oauth parameter"),
    (4, "Invalid signature method"),
    (5, "Invalid consumer key"),
    (6, "Invalid or expired timestamp"),
    (7, "Invalid or used nonce"),
    (8, "Invalid signature"),
    (9, "Invalid access token"),
];

/// Look up the explanation for a known FatSecret OAuth error code.
pub fn oauth_error_explanation(code: i64) -> Option<&'static str> {
    OAUTH_ERROR_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, explanation)| *explanation)
}

/// Failures talking to FatSecret.
///
/// Every variant is terminal for the operation that raised it; nothing in the
/// client retries. The scheduler simply tries again on its next tick.
#[derive(Debug, thiserror::Error)]
pub enum FatSecretError {
    /// Authorization handshake failed (bad credentials, malformed token response).
    #[error("Authorization failed: {0}")]
    Auth(String),

    /// FatSecret answered with a non-2xx status.
    #[error("HTTP error {status}: {message}")]
    Transport { status: u16, message: String },

    /// The request never produced a response (connect error, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The response body could not be decoded.
    #[error("FatSecret response is not valid JSON: {0}")]
    Format(String),

    /// Known OAuth error code in the response body.
    #[error("OAuth error {code}: {explanation}")]
    OAuth { code: i64, explanation: String },

    /// Error code FatSecret returned that is not in the known table.
    #[error("FatSecret returned error {code}: {message}")]
    Api { code: i64, message: String },
}

impl FatSecretError {
    /// Build the error for an `{"error": {"code", "message"}}` body.
    pub fn from_api_code(code: i64, message: &str) -> Self {
        match oauth_error_explanation(code) {
            Some(explanation) => FatSecretError::OAuth {
                code,
                explanation: explanation.to_string(),
            },
            None => FatSecretError::Api {
                code,
                message: message.to_string(),
            },
        }
    }

    /// Application-level error code, if the failure carried one.
    pub fn api_code(&self) -> Option<i64> {
        match self {
            FatSecretError::OAuth { code, .. } | FatSecretError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FatSecretError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FatSecretError::Transport {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => FatSecretError::Network(err.to_string()),
        }
    }
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Authorization failed: {0}")]
    AuthFailed(String),

    #[error("Entry not ready: {0}")]
    NotReady(String),

    #[error("FatSecret error: {0}")]
    FatSecret(#[from] FatSecretError),

    #[error("Credential store error: {0}")]
    Store(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::AuthFailed(msg) => {
                (StatusCode::BAD_REQUEST, "auth_failed", Some(msg.clone()))
            }
            AppError::NotReady(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "not_ready",
                Some(msg.clone()),
            ),
            AppError::FatSecret(err) => {
                (StatusCode::BAD_GATEWAY, "fatsecret_error", Some(err.to_string()))
            }
            AppError::Store(msg) => {
                tracing::error!(error = %msg, "Credential store error");
                (StatusCode::INTERNAL_SERVER_ERROR, "store_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
