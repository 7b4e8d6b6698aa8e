//! Error types for the core library

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Remote API unreachable: {0}")]
    Unreachable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unexpected response ({status}): {message}")]
    UnexpectedStatus { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Data load failed: {0}")]
    DataLoadFailed(#[source] Box<Error>),

    #[error("Operation already in progress: {0}")]
    Busy(String),

    #[error("Controller disposed")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Map a non-2xx status and its body text to a typed failure
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = server_message(body);
        match status {
            StatusCode::BAD_REQUEST => Self::InvalidInput(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            s if s.is_server_error() => Self::ServerError {
                status: s.as_u16(),
                message,
            },
            s => Self::UnexpectedStatus {
                status: s.as_u16(),
                message,
            },
        }
    }

    /// Map a transport failure from reqwest
    pub fn from_transport(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_status(status, "");
        }
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        Self::Unreachable(err.to_string())
    }

    /// True for failures that never reached the network
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Busy(_) | Self::Cancelled)
    }

    /// Message shown to the user in a notification
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => format!("Please fill in the required fields: {}", msg),
            Self::InvalidInput(msg) if msg.is_empty() => "The server rejected the task".to_string(),
            Self::InvalidInput(msg) => format!("The server rejected the task: {}", msg),
            Self::ServerError { .. } => "The server failed to process the request".to_string(),
            Self::Unreachable(_) => "Could not reach the task server".to_string(),
            Self::NotFound(_) => "Task not found".to_string(),
            Self::UnexpectedStatus { status, .. } => {
                format!("Unexpected response from the server ({})", status)
            }
            Self::Decode(_) | Self::Serialization(_) => {
                "The server sent an unreadable response".to_string()
            }
            Self::DataLoadFailed(_) => "load failed".to_string(),
            Self::Busy(_) => "Operation already in progress".to_string(),
            Self::Cancelled => "Operation cancelled".to_string(),
            Self::Config(msg) => format!("Invalid configuration: {}", msg),
        }
    }
}

/// Extract the `message` field of a JSON error body, falling back to the raw text
fn server_message(body: &str) -> String {
    let trimmed = body.trim();
    serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| trimmed.to_string())
}
