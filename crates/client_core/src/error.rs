use reqwest::{Method, StatusCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid request path '{path}': {source}")]
    InvalidPath {
        path: String,
        source: url::ParseError,
    },
    #[error("request to '{path}' failed: {source}")]
    Transport {
        path: String,
        source: reqwest::Error,
    },
    #[error("{method} {path} returned {status}: {message}")]
    Status {
        method: Method,
        path: String,
        status: StatusCode,
        message: String,
    },
    #[error("failed to decode response from '{path}': {source}")]
    Decode {
        path: String,
        source: serde_json::Error,
    },
}

impl RequestError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The message the backend attached to a rejected request.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            RequestError::Status { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}
