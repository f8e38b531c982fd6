//! Error types for the sync layer.

use thiserror::Error;
use ticklist_store::StoreError;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The client is not currently online; the call failed fast without
    /// touching the network.
    #[error("not connected to sync server")]
    NotConnected,

    /// The request could not be delivered (connection refused, timeout,
    /// DNS failure).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status; the body is kept
    /// for diagnosis.
    #[error("server returned status {status}: {body}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// A payload failed to serialize or parse.
    #[error("payload error: {0}")]
    Payload(#[from] serde_json::Error),

    /// A local storage operation failed mid-cycle.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
