use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures of a single generation request.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("could not reach inference endpoint: {0}")]
    Transport(String),
    #[error("malformed inference response: {0}")]
    Parse(String),
    #[error("inference endpoint returned an error: {0}")]
    Upstream(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl InferenceError {
    pub fn kind(&self) -> &'static str {
        match self {
            InferenceError::Validation(_) => "validation",
            InferenceError::Transport(_) => "transport",
            InferenceError::Parse(_) => "parse",
            InferenceError::Upstream(_) => "upstream",
            InferenceError::Internal(_) => "internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            InferenceError::Validation(_) => StatusCode::BAD_REQUEST,
            InferenceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_GATEWAY,
        }
    }

    /// Message safe to hand to HTTP callers. Server-side details stay in the log.
    pub fn public_message(&self) -> String {
        match self {
            InferenceError::Validation(_) => self.to_string(),
            InferenceError::Transport(_) => "inference endpoint is unreachable".to_string(),
            InferenceError::Parse(_) => "inference endpoint returned an unexpected response".to_string(),
            InferenceError::Upstream(_) => "inference endpoint rejected the request".to_string(),
            InferenceError::Internal(_) => "internal server error".to_string(),
        }
    }
}

impl IntoResponse for InferenceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), "Generation failed: {}", self);
        } else {
            tracing::warn!(kind = self.kind(), "Rejected generate request: {}", self);
        }

        let body = json!({
            "error": {
                "kind": self.kind(),
                "message": self.public_message(),
            }
        });
        (status, Json(body)).into_response()
    }
}

/// Failures while moving checkpoint files between the hub, disk and the bucket.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("hub request for {repo_id} failed: {message}")]
    Hub { repo_id: String, message: String },
    #[error("io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("upload of {key} to bucket {bucket} failed: {message}")]
    Storage {
        bucket: String,
        key: String,
        message: String,
    },
    #[error("file name is not valid UTF-8 and cannot be used as an object key: {}", .path.display())]
    InvalidKey { path: PathBuf },
}

impl ArtifactError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ArtifactError::Io {
            path: path.into(),
            source,
        }
    }
}
