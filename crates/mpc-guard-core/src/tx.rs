//! Legacy Ethereum transaction model with EIP-155 signing hash.
//!
//! The message context carries the transaction as go-ethereum marshals it,
//! so all quantity fields arrive as `0x`-prefixed hex strings. Extra fields
//! (`v`, `r`, `s`, `hash`) are ignored on deserialization.

use crate::error::Result;
use alloy_primitives::{Address, Bytes, B256, U256, U64};
use alloy_rlp::Encodable;
use serde::Deserialize;
use tiny_keccak::{Hasher, Keccak};

/// A legacy (pre-EIP-1559) transaction as carried in a sign-request context.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Transaction {
    /// Sender account nonce
    #[serde(default)]
    pub nonce: U64,
    /// Gas price in wei
    #[serde(default, rename = "gasPrice")]
    pub gas_price: U256,
    /// Gas limit
    #[serde(default, rename = "gas")]
    pub gas_limit: U64,
    /// Recipient; `None` for contract creation
    #[serde(default)]
    pub to: Option<Address>,
    /// Native value in wei
    #[serde(default)]
    pub value: U256,
    /// Call data
    #[serde(default, alias = "data")]
    pub input: Bytes,
}

impl Transaction {
    /// Compute the EIP-155 signing hash for this transaction.
    ///
    /// `keccak256(rlp([nonce, gasPrice, gas, to, value, input, chainId, 0, 0]))`
    pub fn sighash(&self, chain_id: U256) -> B256 {
        let mut stream = alloy_rlp::BytesMut::new();

        let to_length = match self.to {
            Some(addr) => addr.length(),
            None => 1,
        };
        alloy_rlp::Header {
            list: true,
            payload_length: self.nonce.length()
                + self.gas_price.length()
                + self.gas_limit.length()
                + to_length
                + self.value.length()
                + self.input.length()
                + chain_id.length()
                + 0u8.length()
                + 0u8.length(),
        }
        .encode(&mut stream);

        self.nonce.encode(&mut stream);
        self.gas_price.encode(&mut stream);
        self.gas_limit.encode(&mut stream);
        match self.to {
            Some(addr) => addr.encode(&mut stream),
            None => stream.extend_from_slice(&[alloy_rlp::EMPTY_STRING_CODE]),
        }
        self.value.encode(&mut stream);
        self.input.encode(&mut stream);
        chain_id.encode(&mut stream);
        0u8.encode(&mut stream);
        0u8.encode(&mut stream);

        keccak256(&stream)
    }

    /// Parse a transaction from the JSON element of a message context.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Keccak-256 over an arbitrary byte slice.
pub fn keccak256(data: &[u8]) -> B256 {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut hash = [0u8; 32];
    hasher.finalize(&mut hash);
    B256::from(hash)
}
