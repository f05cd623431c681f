//! Unattended review of pending fee-withdrawal sign requests.
//!
//! The loop polls a sign-request source, reviews each request against the
//! policy, and submits an agree/disagree verdict for every request it
//! recognizes. Requests with a different shape belong to another approver
//! and are skipped without a submission. Once a request passes the shape
//! check it is claimed: every later failure is an explicit disagreement,
//! never a silent skip, so a malformed request cannot sit pending forever.

use crate::decode::{decode_call, method_name, Selector};
use crate::error::{PolicyError, Result};
use crate::policy::PolicyEngine;
use crate::tx::Transaction;
use crate::types::{SignRequest, Verdict};
use crate::verify::recover_signer;
use alloy_primitives::{B256, U256};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Context tag identifying a fee-withdrawal request.
pub const WITHDRAW_FEE_CONTEXT: &str = "withdrawfee";

/// Sleep between poll cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Where pending sign requests come from.
#[async_trait]
pub trait SignRequestSource {
    async fn fetch_pending(&self) -> Result<Vec<SignRequest>>;
}

/// Where verdicts go.
#[async_trait]
pub trait ApprovalSink {
    async fn submit(&self, request: &SignRequest, verdict: &Verdict) -> Result<()>;
}

/// The polling approval loop.
pub struct ApprovalLoop<S, K> {
    source: S,
    sink: K,
    engine: PolicyEngine,
    interval: Duration,
}

impl<S, K> ApprovalLoop<S, K>
where
    S: SignRequestSource,
    K: ApprovalSink,
{
    pub fn new(source: S, sink: K, engine: PolicyEngine) -> Self {
        Self {
            source,
            sink,
            engine,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Poll and review until the process is terminated. Source and sink
    /// failures are logged and the loop retries after the usual interval.
    pub async fn run(&self) {
        info!(interval_secs = self.interval.as_secs(), "approval loop started");
        loop {
            match self.run_cycle().await {
                Ok(submitted) if submitted > 0 => {
                    info!(submitted, "poll cycle complete");
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "poll cycle failed");
                }
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    /// One poll cycle: fetch every pending request, review each in order,
    /// submit all non-ignored verdicts. Returns how many were submitted.
    pub async fn run_cycle(&self) -> Result<usize> {
        let requests = self.source.fetch_pending().await?;
        debug!(pending = requests.len(), "fetched sign requests");

        let mut submitted = 0;
        for request in &requests {
            let verdict = self.review(request);
            if verdict.ignore {
                debug!(key = %request.key, reason = %verdict.reason, "skipping sign request");
                continue;
            }
            if !verdict.agree {
                warn!(key = %request.key, reason = %verdict.reason, "rejecting sign request");
            }
            match self.sink.submit(request, &verdict).await {
                Ok(()) => {
                    info!(key = %request.key, result = verdict.accept_result(), "verdict submitted");
                    submitted += 1;
                }
                Err(e) => {
                    warn!(key = %request.key, error = %e, "verdict submission failed");
                }
            }
        }
        Ok(submitted)
    }

    /// Review one sign request. Pure: no I/O, no state, same verdict for
    /// the same request every time.
    pub fn review(&self, request: &SignRequest) -> Verdict {
        // Shape check. A request that does not look like a fee withdrawal
        // is some other approver's business.
        if request.msg_hash.len() != 1 {
            return Verdict::ignore("mismatch message hash length");
        }
        if request.msg_context.len() != 4 {
            return Verdict::ignore("mismatch message context length");
        }
        if !request.msg_context[0].eq_ignore_ascii_case(WITHDRAW_FEE_CONTEXT) {
            return Verdict::ignore("mismatch message context type");
        }

        // Claimed from here on: every failure is a disagreement.
        let chain_id = match parse_chain_id(&request.msg_context[2]) {
            Some(id) => id,
            None => {
                return Verdict::disagree(format!(
                    "wrong chainID '{}'",
                    request.msg_context[2]
                ))
            }
        };

        let msg_hash = match parse_hash(&request.msg_hash[0]) {
            Some(hash) => hash,
            None => return Verdict::disagree("wrong message hash"),
        };

        let signer = match recover_signer(msg_hash, &request.msg_context[3]) {
            Ok(signer) => signer,
            Err(e) => return Verdict::disagree(e.to_string()),
        };
        if signer != self.engine.config().allowed_sender {
            return Verdict::disagree(PolicyError::SignerNotAllowed(signer).to_string());
        }

        let tx = match Transaction::from_json(&request.msg_context[1]) {
            Ok(tx) => tx,
            Err(e) => {
                return Verdict::disagree(format!("json unmarshal msgContext failed: {e}"))
            }
        };

        let input = tx.input.as_ref();
        if input.len() >= 4 {
            let selector: Selector = [input[0], input[1], input[2], input[3]];
            if let Some(name) = method_name(&selector) {
                debug!(key = %request.key, method = name, "reviewing contract call");
            }
        }

        let instruction = match decode_call(&tx) {
            Ok(instruction) => instruction,
            Err(e) => return Verdict::disagree(e.to_string()),
        };
        if let Err(e) = self.engine.evaluate(&instruction) {
            return Verdict::disagree(e.to_string());
        }

        let calc_hash = tx.sighash(chain_id);
        if calc_hash != msg_hash {
            return Verdict::disagree(format!(
                "check message hash failed. msgHash={msg_hash}, calcHash={calc_hash}"
            ));
        }

        Verdict::agree()
    }
}

/// Parse a chain ID the way `big.Int` does with base 0: `0x` prefixed hex
/// or plain decimal.
fn parse_chain_id(s: &str) -> Option<U256> {
    let s = s.trim();
    if let Some(hexadecimal) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        U256::from_str_radix(hexadecimal, 16).ok()
    } else {
        U256::from_str_radix(s, 10).ok()
    }
}

/// Parse a 32-byte hash from `0x`-prefixed or bare hex. Case-insensitive.
fn parse_hash(s: &str) -> Option<B256> {
    let s = s.trim();
    let stripped = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    let bytes = hex::decode(stripped).ok()?;
    if bytes.len() != 32 {
        return None;
    }
    Some(B256::from_slice(&bytes))
}
