//! # MPC Guard RPC
//!
//! JSON-RPC client for the MPC signing service: polls the pending
//! sign-request queue and submits accept/reject verdicts wrapped in the
//! service's signed transaction envelope.
//!
//! [`MpcClient`] implements both external interfaces of the guard loop,
//! [`mpc_guard_core::SignRequestSource`] and
//! [`mpc_guard_core::ApprovalSink`].

pub mod api;
pub mod client;
pub mod envelope;
pub mod error;
pub mod types;

pub use api::{MpcClient, MpcClientConfig};
pub use client::{RpcClient, DEFAULT_API_PREFIX, DEFAULT_RPC_TIMEOUT_SECS};
pub use envelope::{build_mpc_raw_tx, MPC_TO_ADDRESS, MPC_WALLET_SERVICE_ID};
pub use error::{Result, RpcError};
pub use types::{AcceptData, RpcEnvelope};
