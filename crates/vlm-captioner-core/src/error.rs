//! Error types for captioning.
//!
//! `CaptionError` is what callers of [`Captioner::caption`](crate::Captioner::caption)
//! see. `ClientError` is produced by [`ChatClient`](crate::ChatClient)
//! implementations and travels inside `CaptionError::Completion`.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned from a single caption call.
#[derive(Error, Debug)]
pub enum CaptionError {
    /// Reading the image from disk failed
    #[error("failed to read image file: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The chat completion call failed or was canceled
    #[error("failed to create chat completion: {0}")]
    Completion(#[source] ClientError),

    /// The API answered but produced no candidate completions
    #[error("no choices returned from API")]
    NoChoices,
}

impl CaptionError {
    /// The underlying I/O error kind, for `FileRead` errors.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            Self::FileRead { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

/// Errors produced by a chat completion client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The HTTP request could not be sent or its body not received
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response without a recognizable error payload
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Error reported by the API in its error envelope
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The response body was not a valid chat completion
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The caller canceled the request before it completed
    #[error("context canceled")]
    Canceled,

    /// Any other client failure
    #[error("{0}")]
    Other(String),
}

impl ClientError {
    /// HTTP status code, when the server answered.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Convenience type alias for caption results.
pub type Result<T> = std::result::Result<T, CaptionError>;
