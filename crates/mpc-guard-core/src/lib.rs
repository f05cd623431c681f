//! # MPC Guard Core
//!
//! Unattended transaction-policy guard for MPC fee-withdrawal sign
//! requests. The guard polls a signing service for pending requests,
//! decodes each proposed transaction (including one level of multicall
//! batching), checks it against a fixed allow-list policy and the expected
//! sender's detached signature, and answers AGREE or DISAGREE.
//!
//! ## Architecture
//!
//! - [`bytes`]: bounds-safe word reads over untrusted call data
//! - [`tx`]: legacy transaction model and EIP-155 signing hash
//! - [`decode`] / [`multicall`]: selector classification and batch decoding
//! - [`policy`]: deny-by-default allow-list evaluation
//! - [`verify`]: secp256k1 signer recovery
//! - [`approve`]: the review state machine and the polling loop
//!
//! The loop talks to the outside world only through the
//! [`SignRequestSource`] and [`ApprovalSink`] traits, so the whole pipeline
//! is testable without a network.

pub mod approve;
pub mod bytes;
pub mod decode;
pub mod error;
pub mod multicall;
pub mod policy;
pub mod tx;
pub mod types;
pub mod verify;

pub use approve::{
    ApprovalLoop, ApprovalSink, SignRequestSource, DEFAULT_POLL_INTERVAL, WITHDRAW_FEE_CONTEXT,
};
pub use decode::{decode_call, method_name, CallInstruction, Selector, SubCall};
pub use error::{DecodeError, Error, PolicyError, Result, VerifyError};
pub use multicall::TupleVariant;
pub use policy::{PolicyConfig, PolicyEngine};
pub use tx::{keccak256, Transaction};
pub use types::{SignRequest, Verdict};
pub use verify::{public_key_address, recover_signer, SIGNATURE_LENGTH};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
