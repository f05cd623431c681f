//! Wire types of the signing-service RPC surface.

use crate::error::{Result, RpcError};
use serde::{Deserialize, Serialize};

/// Status envelope every service method wraps its payload in.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RpcEnvelope<T> {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub tip: String,
    #[serde(default)]
    pub error: String,
    pub data: Option<T>,
}

impl<T> RpcEnvelope<T> {
    /// Unwrap the payload, mapping a non-success status to an error that
    /// names the method and carries the service's own message.
    pub fn into_result(self, method: &str) -> Result<T> {
        if self.status != "Success" {
            return Err(RpcError::WrongStatus {
                method: method.to_string(),
                status: self.status,
                error: self.error,
            });
        }
        self.data.ok_or_else(|| RpcError::InvalidResponse {
            method: method.to_string(),
            message: "no data in response".to_string(),
        })
    }
}

/// Payload of an `acceptSign` submission.
///
/// The message context is deliberately not echoed back; it was verified
/// before the verdict was formed and the service keys the decision on the
/// request key and hashes alone.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AcceptData {
    pub tx_type: String,
    pub key: String,
    pub accept: String,
    pub msg_hash: Vec<String>,
    pub time_stamp: String,
}

/// `{ "Result": ... }` payload used by submission methods.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultData {
    #[serde(default)]
    pub result: String,
}

/// Now in milliseconds since the epoch, as a decimal string.
pub fn now_milli_str() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}
