//! Signed transaction envelope for service submissions.
//!
//! The signing service accepts writes only as EIP-155-signed legacy
//! transactions addressed to its well-known service address on its own
//! service chain. The payload rides in the transaction's data field; the
//! transaction is never broadcast to a real network.

use crate::error::{Result, RpcError};
use alloy_primitives::{address, Address, U256};
use alloy_rlp::Encodable;
use k256::ecdsa::SigningKey;
use tiny_keccak::{Hasher, Keccak};

/// Service address every submission envelope is addressed to.
pub const MPC_TO_ADDRESS: Address = address!("00000000000000000000000000000000000000dc");

/// Chain ID of the signing service's internal namespace.
pub const MPC_WALLET_SERVICE_ID: u64 = 30400;

const ENVELOPE_GAS_LIMIT: u64 = 100_000;
const ENVELOPE_GAS_PRICE: u128 = 80_000;

/// Wrap `payload` in a signed legacy transaction and return it as
/// `0x`-prefixed RLP hex.
pub fn build_mpc_raw_tx(nonce: u64, payload: &[u8], key: &SigningKey) -> Result<String> {
    let sighash = signing_hash(nonce, payload);
    let (signature, recovery_id) = key
        .sign_prehash_recoverable(&sighash)
        .map_err(|e| RpcError::Sign(e.to_string()))?;

    let v = recovery_id.to_byte() as u64 + 35 + MPC_WALLET_SERVICE_ID * 2;
    let bytes = signature.to_bytes();
    let r = U256::from_be_slice(&bytes[..32]);
    let s = U256::from_be_slice(&bytes[32..]);

    let mut stream = alloy_rlp::BytesMut::new();
    alloy_rlp::Header {
        list: true,
        payload_length: body_rlp_length(nonce, payload) + v.length() + r.length() + s.length(),
    }
    .encode(&mut stream);
    encode_body(&mut stream, nonce, payload);
    v.encode(&mut stream);
    r.encode(&mut stream);
    s.encode(&mut stream);

    Ok(format!("0x{}", hex::encode(&stream)))
}

fn signing_hash(nonce: u64, payload: &[u8]) -> [u8; 32] {
    let mut stream = alloy_rlp::BytesMut::new();
    alloy_rlp::Header {
        list: true,
        payload_length: body_rlp_length(nonce, payload)
            + MPC_WALLET_SERVICE_ID.length()
            + 0u8.length()
            + 0u8.length(),
    }
    .encode(&mut stream);
    encode_body(&mut stream, nonce, payload);
    MPC_WALLET_SERVICE_ID.encode(&mut stream);
    0u8.encode(&mut stream);
    0u8.encode(&mut stream);

    let mut hasher = Keccak::v256();
    hasher.update(&stream);
    let mut hash = [0u8; 32];
    hasher.finalize(&mut hash);
    hash
}

fn encode_body(stream: &mut alloy_rlp::BytesMut, nonce: u64, payload: &[u8]) {
    nonce.encode(stream);
    ENVELOPE_GAS_PRICE.encode(stream);
    ENVELOPE_GAS_LIMIT.encode(stream);
    MPC_TO_ADDRESS.encode(stream);
    U256::ZERO.encode(stream);
    payload.encode(stream);
}

fn body_rlp_length(nonce: u64, payload: &[u8]) -> usize {
    nonce.length()
        + ENVELOPE_GAS_PRICE.length()
        + ENVELOPE_GAS_LIMIT.length()
        + MPC_TO_ADDRESS.length()
        + U256::ZERO.length()
        + payload.length()
}
