//! Shared builders for guard tests: geth-style transaction JSON, detached
//! signatures, ABI-encoded multicall batches and complete sign requests.

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use k256::ecdsa::SigningKey;
use mpc_guard_core::{
    ApprovalSink, Error, Result, SignRequest, SignRequestSource, Transaction, Verdict,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub const CHAIN_ID: &str = "1";

/// Deterministic operator key used as the allowed sender in tests.
pub fn sender_key() -> SigningKey {
    SigningKey::from_slice(&[0x11u8; 32]).unwrap()
}

/// A second key that is never in the allow list.
pub fn stranger_key() -> SigningKey {
    SigningKey::from_slice(&[0x22u8; 32]).unwrap()
}

pub fn key_address(key: &SigningKey) -> Address {
    mpc_guard_core::public_key_address(key.verifying_key())
}

/// `r || s || v` hex signature over `hash`, v in 0/1 form.
pub fn sign_hash(key: &SigningKey, hash: B256) -> String {
    let (signature, recovery_id) = key.sign_prehash_recoverable(hash.as_slice()).unwrap();
    let mut bytes = signature.to_bytes().to_vec();
    bytes.push(recovery_id.to_byte());
    hex::encode(bytes)
}

/// Transaction JSON the way go-ethereum marshals a legacy transaction.
pub fn tx_json(to: Option<Address>, value: u64, data: &[u8]) -> String {
    serde_json::json!({
        "nonce": "0x0",
        "gasPrice": "0x12a05f200",
        "gas": "0x186a0",
        "to": to.map(|a| format!("{a:#x}")),
        "value": format!("0x{value:x}"),
        "input": format!("0x{}", hex::encode(data)),
    })
    .to_string()
}

/// A complete fee-withdrawal sign request whose hash and signature are
/// consistent with the embedded transaction.
pub fn build_request(key: &SigningKey, raw_tx: &str) -> SignRequest {
    let tx = Transaction::from_json(raw_tx).unwrap();
    let hash = tx.sighash(U256::from_str_radix(CHAIN_ID, 10).unwrap());
    SignRequest {
        key: format!("0xreq{}", hex::encode(&hash[..4])),
        account: format!("{:#x}", key_address(key)),
        msg_hash: vec![format!("{hash}")],
        msg_context: vec![
            "withdrawfee".to_string(),
            raw_tx.to_string(),
            CHAIN_ID.to_string(),
            sign_hash(key, hash),
        ],
        time_stamp: "1700000000000".to_string(),
        ..Default::default()
    }
}

fn put_word(buf: &mut Vec<u8>, value: u64) {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    buf.extend_from_slice(&word);
}

fn put_address(buf: &mut Vec<u8>, addr: Address) {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(addr.as_slice());
    buf.extend_from_slice(&word);
}

/// ABI-encode `aggregate3((address,bool,bytes)[])` call data.
///
/// The flag word is written as 0, which the decoder reads back as
/// allow-failure true; the policy never looks at it.
pub fn encode_aggregate3(calls: &[(Address, Vec<u8>)]) -> Vec<u8> {
    let mut data = vec![0x82, 0xad, 0x56, 0xcb];
    put_word(&mut data, 32); // array head offset
    put_word(&mut data, calls.len() as u64);

    // element offsets, relative to the start of the offset table
    let mut offset = (calls.len() * 32) as u64;
    for (_, call_data) in calls {
        put_word(&mut data, offset);
        offset += (4 * 32 + call_data.len().div_ceil(32) * 32) as u64;
    }

    for (target, call_data) in calls {
        put_address(&mut data, *target);
        put_word(&mut data, 0); // allowFailure word
        put_word(&mut data, 3 * 32); // bytes head offset
        put_word(&mut data, call_data.len() as u64);
        let mut padded = call_data.clone();
        padded.resize(call_data.len().div_ceil(32) * 32, 0);
        data.extend_from_slice(&padded);
    }
    data
}

/// `approve(spender, amount)` call data.
pub fn encode_approve(spender: Address) -> Vec<u8> {
    let mut data = vec![0x09, 0x5e, 0xa7, 0xb3];
    put_address(&mut data, spender);
    put_word(&mut data, 1_000_000);
    data
}

/// `transferFrom(from, to, amount)` call data.
pub fn encode_transfer_from(from: Address, to: Address) -> Vec<u8> {
    let mut data = vec![0x23, 0xb8, 0x72, 0xdd];
    put_address(&mut data, from);
    put_address(&mut data, to);
    put_word(&mut data, 1_000_000);
    data
}

/// `transfer(to, amount)` call data.
pub fn encode_transfer(to: Address) -> Vec<u8> {
    let mut data = vec![0xa9, 0x05, 0x9c, 0xbb];
    put_address(&mut data, to);
    put_word(&mut data, 1_000_000);
    data
}

/// In-memory sign-request source: each fetch pops one prepared cycle.
#[derive(Clone, Default)]
pub struct MockSource {
    cycles: Arc<Mutex<VecDeque<Result<Vec<SignRequest>>>>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_cycle(&self, requests: Vec<SignRequest>) {
        self.cycles.lock().unwrap().push_back(Ok(requests));
    }

    pub fn push_failure(&self, message: &str) {
        self.cycles
            .lock()
            .unwrap()
            .push_back(Err(Error::Transport(message.to_string())));
    }
}

#[async_trait]
impl SignRequestSource for MockSource {
    async fn fetch_pending(&self) -> Result<Vec<SignRequest>> {
        self.cycles
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(vec![]))
    }
}

/// Recording approval sink.
#[derive(Clone, Default)]
pub struct MockSink {
    submissions: Arc<Mutex<Vec<(String, bool, String)>>>,
    fail: Arc<AtomicBool>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    /// `(request key, agree, reason)` per submission, in order.
    pub fn submissions(&self) -> Vec<(String, bool, String)> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApprovalSink for MockSink {
    async fn submit(&self, request: &SignRequest, verdict: &Verdict) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Transport("sink unavailable".to_string()));
        }
        self.submissions.lock().unwrap().push((
            request.key.clone(),
            verdict.agree,
            verdict.reason.clone(),
        ));
        Ok(())
    }
}
