//! API Response types
//!
//! The uniform envelope returned by every cart API endpoint:
//!
//! ```json
//! {
//!     "success": true,
//!     "message": "Cart updated",
//!     "data": { ... }
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-level failure carried in an envelope with `success: false`
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct EnvelopeError {
    pub message: String,
}

/// Unified API response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Whether the operation succeeded
    pub success: bool,
    /// Human-readable message
    #[serde(default)]
    pub message: String,
    /// Response data (optional)
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Server-side error detail (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Create a successful response
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: "Success".to_string(),
            data: Some(data),
            error: None,
        }
    }

    /// Create a successful response with a custom message
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error: None,
        }
    }

    /// Unwrap the envelope, treating `success: false` as an error
    ///
    /// The error message prefers the `error` detail over `message`.
    pub fn into_data(self) -> Result<Option<T>, EnvelopeError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(EnvelopeError {
                message: self.error.unwrap_or(self.message),
            })
        }
    }
}

impl ApiEnvelope<()> {
    /// Create a successful response with no data
    pub fn ok_empty() -> Self {
        Self {
            success: true,
            message: "Success".to_string(),
            data: None,
            error: None,
        }
    }
}
