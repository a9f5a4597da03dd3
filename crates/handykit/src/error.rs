//! Error types for HandyKit

use crate::text::sanitize;
use thiserror::Error;

/// Errors that can occur while calling an external service
///
/// This is a closed set of kinds. Tools never surface it directly; each
/// tool boundary renders it into a user-facing string.
#[derive(Debug, Error)]
pub enum ToolError {
    /// External API answered, but not with a success
    #[error("{message}")]
    UpstreamFailure {
        /// HTTP status code, when the failure came from a response
        status: Option<u16>,
        message: String,
    },

    /// Network unreachable, connection refused or timed out
    #[error("{0}")]
    TransportFailure(String),

    /// Payload did not have the expected shape
    #[error("{0}")]
    MalformedResponse(String),

    /// Anything else
    #[error("{0}")]
    InternalFailure(String),
}

impl ToolError {
    /// Create an upstream failure carrying an HTTP status
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        ToolError::UpstreamFailure {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            ToolError::TransportFailure(err.to_string())
        } else if err.is_decode() {
            ToolError::MalformedResponse(err.to_string())
        } else if let Some(status) = err.status() {
            ToolError::status(status.as_u16(), err.to_string())
        } else if err.is_builder() {
            ToolError::InternalFailure(err.to_string())
        } else {
            ToolError::TransportFailure(err.to_string())
        }
    }

    /// Name of the error kind, as shown to users
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::UpstreamFailure { .. } => "UpstreamFailure",
            ToolError::TransportFailure(_) => "TransportFailure",
            ToolError::MalformedResponse(_) => "MalformedResponse",
            ToolError::InternalFailure(_) => "InternalFailure",
        }
    }

    /// HTTP status of an upstream failure
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ToolError::UpstreamFailure { status, .. } => *status,
            _ => None,
        }
    }

    /// Render as `[<context> error] <Kind>: <message>`
    ///
    /// The message is reduced to ASCII so the result is safe for any
    /// transport encoding.
    pub fn render(&self, context: &str) -> String {
        format!(
            "[{} error] {}: {}",
            context,
            self.kind(),
            sanitize(&self.to_string())
        )
    }
}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> Self {
        ToolError::InternalFailure(err.to_string())
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::MalformedResponse(err.to_string())
    }
}
