//! Error types for the fee-withdrawal guard.

use alloy_primitives::Address;
use thiserror::Error;

/// Result type alias for guard operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while fetching, decoding or judging sign requests.
#[derive(Debug, Error)]
pub enum Error {
    /// Call data could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The decoded transaction violates the policy
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// Sender signature could not be verified
    #[error(transparent)]
    Verify(#[from] VerifyError),

    /// Network failure talking to the signing service
    #[error("transport error: {0}")]
    Transport(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Failures while decoding a transaction's call data.
///
/// Every variant rejects the request; none of them aborts the guard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Contract creation is never permitted for this policy
    #[error("transaction has no recipient")]
    NoRecipient,

    /// Call data shorter than a function selector
    #[error("call data too short: {0} bytes")]
    DataTooShort(usize),

    /// Fixed-argument method called with the wrong payload size
    #[error("wrong argument length for {method}: have {have}, want {want}")]
    WrongArgLength {
        method: &'static str,
        have: usize,
        want: usize,
    },

    /// Selector not in the allow table
    #[error("function hash 0x{0} not allowed")]
    UnknownSelector(String),

    /// Multicall header declares more elements than the buffer can hold
    #[error("multicall batch truncated: {declared} elements declared, {available} decodable")]
    TruncatedBatch { declared: usize, available: usize },
}

/// Policy violations found while evaluating a decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// Transfer receiver is not allow-listed
    #[error("receiver {0} is not in the allowed list")]
    ReceiverNotAllowed(Address),

    /// Multicall routed through an unknown aggregator contract
    #[error("multicall contract {0} is not in the allowed list")]
    MulticallTargetNotAllowed(Address),

    /// Non-batch function addressed directly at an aggregator contract
    #[error("function hash 0x{selector} not allowed on multicall contract {contract}")]
    AggregatorFunctionNotAllowed { contract: Address, selector: String },

    /// `approve` sub-call granting allowance to anything but the aggregator itself
    #[error("sub-call #{index}: approve spender {spender} is not the multicall contract")]
    ApproveToOtherAddress { index: usize, spender: Address },

    /// Sub-call selector not in the allow table
    #[error("sub-call #{index}: function hash 0x{selector} not allowed")]
    FunctionNotAllowed { index: usize, selector: String },

    /// Value-bearing or `transferFrom` sub-call paying a non-allow-listed receiver
    #[error("sub-call #{index}: receiver {receiver} is not in the allowed list")]
    SubCallReceiverNotAllowed { index: usize, receiver: Address },

    /// Sub-call payload shorter than a selector
    #[error("sub-call #{index}: call data too short: {len} bytes")]
    SubCallDataTooShort { index: usize, len: usize },

    /// Sub-call method called with the wrong payload size
    #[error("sub-call #{index}: wrong argument length for {method}: have {have}")]
    SubCallArgLength {
        index: usize,
        method: &'static str,
        have: usize,
    },

    /// Sender signature recovered to an unexpected address
    #[error("mismatch signature signer: {0}")]
    SignerNotAllowed(Address),
}

/// Failures while recovering the sender's detached signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// Signature is not 65 bytes of hex
    #[error("wrong signature format: {0}")]
    BadSignatureFormat(String),

    /// secp256k1 public-key recovery failed
    #[error("recover signature failed: {0}")]
    RecoveryFailed(String),
}
