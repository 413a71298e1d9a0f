//! rpel client error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpelError {
    #[error("Cannot connect to rpel server at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Connection closed by server")]
    ConnectionClosed,

    #[error("Request {request_id} timed out after {seconds}s")]
    Timeout { request_id: i64, seconds: u64 },

    #[error("Malformed server message: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("Server error for {command}: {message}")]
    Server { command: String, message: String },

    #[error("Unexpected payload: expected {expected}, got {got}")]
    UnexpectedPayload { expected: &'static str, got: String },

    #[error("Another request is already in progress")]
    Busy,

    #[error("Record is not loaded; reload before editing")]
    NotEditable,

    #[error("No {list} entry at position {index}")]
    FieldIndex { list: &'static str, index: usize },

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, RpelError>;
