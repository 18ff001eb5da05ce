//! Errors raised by remote content sources.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteError {
    /// Connection, timeout or body decoding failure in the HTTP client
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Node answered with a non-success HTTP status
    #[error("Remote node returned HTTP {0}")]
    Status(u16),

    /// Node answered with a JSON-RPC error object
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Result did not have the expected shape
    #[error("Unexpected response shape: {0}")]
    Decode(String),

    /// Source refused or could not serve the request
    #[error("Remote source unavailable: {0}")]
    Unavailable(String),

    #[error("No remote nodes configured")]
    NoNodes,
}

impl RemoteError {
    /// True for failures another node (or another attempt) might not hit.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RemoteError::Transport(_) | RemoteError::Status(_) | RemoteError::Unavailable(_)
        )
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        RemoteError::Decode(err.to_string())
    }
}
