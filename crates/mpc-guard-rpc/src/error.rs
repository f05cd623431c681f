//! Error types for the signing-service client.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RpcError>;

/// Errors talking to the MPC signing service.
#[derive(Debug, Error)]
pub enum RpcError {
    /// HTTP transport failure
    #[error("post {method} failed: {source}")]
    Post {
        method: String,
        #[source]
        source: reqwest::Error,
    },

    /// JSON-RPC level error object
    #[error("rpc error calling {method}: {message}")]
    Rpc { method: String, message: String },

    /// Service answered with a non-success status envelope
    #[error("{method} wrong status '{status}': {error}")]
    WrongStatus {
        method: String,
        status: String,
        error: String,
    },

    /// Response body did not have the expected shape
    #[error("invalid response for {method}: {message}")]
    InvalidResponse { method: String, message: String },

    /// Client could not be constructed
    #[error("invalid client config: {0}")]
    Config(String),

    /// Payload serialization failure
    #[error("serialize payload failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Operator key could not sign the envelope
    #[error("sign envelope failed: {0}")]
    Sign(String),
}

impl From<RpcError> for mpc_guard_core::Error {
    fn from(e: RpcError) -> Self {
        mpc_guard_core::Error::Transport(e.to_string())
    }
}
