use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use chain_client::ClientError;
use eth_core::EthError;
use keystore::KeystoreError;

/// Everything a request can fail with, one structured kind per cause.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Engine(#[from] EthError),

    #[error(transparent)]
    Keystore(#[from] KeystoreError),

    #[error(transparent)]
    Chain(#[from] ClientError),

    #[error("token name mismatch: expected {expected}, contract reports {actual}")]
    TokenNameMismatch { expected: String, actual: String },
}

impl GatewayError {
    /// HTTP status for this kind: the node being slow or broken is a
    /// gateway-side failure, everything else is the caller's request.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Chain(ClientError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Chain(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// A failed request as the HTTP surface reports it: a human-readable message
/// plus the underlying error text.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    detail: Option<String>,
}

impl ApiError {
    /// A 400 with only a message, for requests rejected before any work.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            detail: None,
        }
    }

    /// Wraps a pipeline error under an endpoint-specific message.
    pub fn from_gateway(message: impl Into<String>, err: GatewayError) -> Self {
        Self {
            status: err.status(),
            message: message.into(),
            detail: Some(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.detail {
            Some(detail) => json!({ "message": self.message, "error": detail }),
            None => json!({ "message": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}
