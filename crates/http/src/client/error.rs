//! Client error types

use serde::Deserialize;
use thiserror::Error;

/// Message the backend sends with a 400 when the bearer token is invalid or expired
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid Token";

/// Client error types
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Transport failure: no connectivity, DNS, connection refused, timeout
    #[error("Network error: {0}")]
    Network(String),

    /// Request could not be completed for a non-transport reason
    #[error("Request failed: {0}")]
    Request(String),

    /// Backend rejected the bearer token
    #[error("Token rejected: {0}")]
    TokenRejected(String),

    /// Server returned an error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ClientError {
    /// Create error from an HTTP status code and the raw response body.
    ///
    /// The backend reports failures as `{"message": "..."}`; when the body has
    /// that shape the message is extracted, otherwise the raw body is kept.
    pub fn from_response(status: reqwest::StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status.to_string()
                } else {
                    body.to_string()
                }
            });

        match status.as_u16() {
            400 if message == INVALID_TOKEN_MESSAGE => Self::TokenRejected(message),
            400 => Self::BadRequest(message),
            401 => Self::AuthenticationFailed(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Whether the failure happened below HTTP (no response was received)
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Whether the backend signalled that the access token is invalid
    pub fn is_token_rejected(&self) -> bool {
        matches!(self, Self::TokenRejected(_))
    }

    /// Text suitable for a transient user notification
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Unable to reach the server. Check your connection.".to_string(),
            Self::TokenRejected(_) => "Your session has expired. Please log in again.".to_string(),
            Self::ServerError { message, .. }
            | Self::AuthenticationFailed(message)
            | Self::NotFound(message)
            | Self::BadRequest(message)
            | Self::Forbidden(message) => message.clone(),
            Self::Request(message) | Self::Serialization(message) | Self::Configuration(message) => {
                message.clone()
            }
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Serialization(err.to_string())
        } else if err.is_builder() {
            Self::Configuration(err.to_string())
        } else if is_transport_failure(&err) {
            Self::Network(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn is_transport_failure(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout() || (err.is_request() && err.status().is_none())
}

// fetch() only reports "TypeError: Failed to fetch", surfaced as a request error
#[cfg(target_arch = "wasm32")]
fn is_transport_failure(err: &reqwest::Error) -> bool {
    err.is_timeout() || (err.is_request() && err.status().is_none())
}
