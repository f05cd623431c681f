//! JSON-RPC transport to the signing service.

use crate::error::{Result, RpcError};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Default method prefix of the signing service's RPC namespace.
pub const DEFAULT_API_PREFIX: &str = "smpc_";

/// Default request timeout in seconds.
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 10;

/// Plain JSON-RPC 2.0 client bound to one service URL.
#[derive(Debug, Clone)]
pub struct RpcClient {
    client: reqwest::Client,
    url: String,
    api_prefix: String,
}

impl RpcClient {
    pub fn new(
        url: impl Into<String>,
        api_prefix: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RpcError::Config(format!("failed to create http client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
            api_prefix: api_prefix.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Call `method` (without prefix) and deserialize the JSON-RPC result.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T> {
        let request_body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": format!("{}{}", self.api_prefix, method),
            "params": params,
            "id": 1,
        });
        debug!(method, url = %self.url, "rpc call");

        let response = self
            .client
            .post(&self.url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| RpcError::Post {
                method: method.to_string(),
                source: e,
            })?;

        let response_body: serde_json::Value =
            response.json().await.map_err(|e| RpcError::Post {
                method: method.to_string(),
                source: e,
            })?;

        if let Some(error) = response_body.get("error") {
            if !error.is_null() {
                return Err(RpcError::Rpc {
                    method: method.to_string(),
                    message: error.to_string(),
                });
            }
        }

        let result = response_body
            .get("result")
            .cloned()
            .ok_or_else(|| RpcError::InvalidResponse {
                method: method.to_string(),
                message: "no result field".to_string(),
            })?;
        serde_json::from_value(result).map_err(|e| RpcError::InvalidResponse {
            method: method.to_string(),
            message: e.to_string(),
        })
    }
}
