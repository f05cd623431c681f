//! High-level client implementing the guard's source and sink traits.

use crate::client::{RpcClient, DEFAULT_API_PREFIX, DEFAULT_RPC_TIMEOUT_SECS};
use crate::envelope::build_mpc_raw_tx;
use crate::error::Result;
use crate::types::{now_milli_str, AcceptData, ResultData, RpcEnvelope};
use alloy_primitives::Address;
use async_trait::async_trait;
use k256::ecdsa::SigningKey;
use mpc_guard_core::{public_key_address, ApprovalSink, SignRequest, SignRequestSource, Verdict};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, trace};

/// Configuration of the signing-service client.
#[derive(Debug, Clone)]
pub struct MpcClientConfig {
    /// Service URL
    pub url: String,
    /// RPC method prefix
    pub api_prefix: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Drop pending requests older than this many seconds; 0 disables
    pub expired_interval_secs: u64,
}

impl MpcClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout_secs: DEFAULT_RPC_TIMEOUT_SECS,
            expired_interval_secs: 0,
        }
    }

    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_expired_interval_secs(mut self, secs: u64) -> Self {
        self.expired_interval_secs = secs;
        self
    }
}

/// Client of the MPC signing service, acting as both the sign-request
/// source and the approval sink of the guard loop.
#[derive(Clone)]
pub struct MpcClient {
    rpc: RpcClient,
    key: SigningKey,
    identity: Address,
    expired_interval_secs: u64,
}

impl MpcClient {
    /// Create a client; `key` is the operator key that authenticates
    /// submissions and whose address owns the pending queue.
    pub fn new(config: MpcClientConfig, key: SigningKey) -> Result<Self> {
        let rpc = RpcClient::new(
            config.url,
            config.api_prefix,
            Duration::from_secs(config.timeout_secs),
        )?;
        let identity = public_key_address(key.verifying_key());
        info!(%identity, url = rpc.url(), "mpc client ready");
        Ok(Self {
            rpc,
            key,
            identity,
            expired_interval_secs: config.expired_interval_secs,
        })
    }

    /// Address whose pending sign requests this client polls.
    pub fn identity(&self) -> Address {
        self.identity
    }

    fn is_expired(&self, request: &SignRequest, now_secs: u64) -> bool {
        if self.expired_interval_secs == 0 {
            return false;
        }
        match request.timestamp_millis() {
            Some(millis) => millis / 1000 + self.expired_interval_secs < now_secs,
            None => false,
        }
    }
}

fn is_valid(request: &SignRequest) -> bool {
    !request.key.is_empty() && !request.msg_hash.is_empty() && !request.msg_context.is_empty()
}

#[async_trait]
impl SignRequestSource for MpcClient {
    async fn fetch_pending(&self) -> mpc_guard_core::Result<Vec<SignRequest>> {
        let envelope: RpcEnvelope<Vec<SignRequest>> = self
            .rpc
            .call(
                "getCurNodeSignInfo",
                serde_json::json!([format!("{}", self.identity)]),
            )
            .await?;
        let pending = envelope.into_result("getCurNodeSignInfo")?;

        let now_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let mut requests: Vec<SignRequest> = pending
            .into_iter()
            .filter(|request| {
                if !is_valid(request) {
                    trace!(key = %request.key, "filter out invalid sign info");
                    return false;
                }
                if self.is_expired(request, now_secs) {
                    trace!(key = %request.key, "filter out expired sign info");
                    return false;
                }
                true
            })
            .collect();
        requests.sort_by_key(|request| request.timestamp_millis().unwrap_or(0));

        debug!(pending = requests.len(), "fetched pending sign info");
        Ok(requests)
    }
}

#[async_trait]
impl ApprovalSink for MpcClient {
    async fn submit(
        &self,
        request: &SignRequest,
        verdict: &Verdict,
    ) -> mpc_guard_core::Result<()> {
        let data = AcceptData {
            tx_type: "ACCEPTSIGN".to_string(),
            key: request.key.clone(),
            accept: verdict.accept_result().to_string(),
            msg_hash: request.msg_hash.clone(),
            time_stamp: now_milli_str(),
        };
        let payload =
            serde_json::to_vec(&data).map_err(crate::error::RpcError::Serialize)?;
        // accept envelopes always use nonce 0
        let raw = build_mpc_raw_tx(0, &payload, &self.key)?;

        let envelope: RpcEnvelope<ResultData> =
            self.rpc.call("acceptSign", serde_json::json!([raw])).await?;
        let result = envelope.into_result("acceptSign")?;
        info!(key = %request.key, accept = data.accept, result = %result.result, "acceptSign submitted");
        Ok(())
    }
}
