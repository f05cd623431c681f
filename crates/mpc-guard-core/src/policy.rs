//! Allow-list policy over decoded call instructions.
//!
//! Everything is denied unless an explicit rule admits it. The rules are
//! deliberately closed-world: funds may only move to allow-listed
//! receivers, allowances may only be granted to the aggregator executing
//! the batch, only a fixed set of functions may appear inside a batch,
//! and a registered aggregator contract is only ever called as a batch.

use crate::bytes::{read_address, WORD};
use crate::decode::{
    CallInstruction, Selector, SubCall, ANY_SWAP_FEE_TO, ERC20_APPROVE, ERC20_TRANSFER,
    ERC20_TRANSFER_FROM, WITHDRAW_ACCRUED_FEES,
};
use crate::error::PolicyError;
use alloy_primitives::{Address, U256};
use std::collections::HashSet;

/// Static configuration of the policy.
///
/// Immutable after construction; the engine never mutates it and the loop
/// holds it for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyConfig {
    /// The only account whose detached signature authorizes a request
    pub allowed_sender: Address,
    /// Accounts that may receive funds
    pub allowed_receivers: HashSet<Address>,
    /// Aggregator contracts batches may be routed through
    pub allowed_multicall_contracts: HashSet<Address>,
}

impl PolicyConfig {
    /// Create a config with empty allow lists.
    pub fn new(allowed_sender: Address) -> Self {
        Self {
            allowed_sender,
            allowed_receivers: HashSet::new(),
            allowed_multicall_contracts: HashSet::new(),
        }
    }

    /// Set the receiver allow list.
    pub fn with_receivers(mut self, receivers: impl IntoIterator<Item = Address>) -> Self {
        self.allowed_receivers = receivers.into_iter().collect();
        self
    }

    /// Set the aggregator-contract allow list.
    pub fn with_multicall_contracts(
        mut self,
        contracts: impl IntoIterator<Item = Address>,
    ) -> Self {
        self.allowed_multicall_contracts = contracts.into_iter().collect();
        self
    }
}

/// Evaluates decoded instructions against a [`PolicyConfig`].
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    config: PolicyConfig,
}

impl PolicyEngine {
    /// Create an engine over a fixed config.
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// Access the config the engine was built with.
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Check one decoded instruction; `Ok(())` means the request may be
    /// approved. The first violation found is returned.
    pub fn evaluate(&self, call: &CallInstruction) -> Result<(), PolicyError> {
        match call {
            CallInstruction::FeeSweep { contract } => {
                self.check_not_aggregator(*contract, ANY_SWAP_FEE_TO)
            }
            CallInstruction::AccruedFeesWithdraw { contract } => {
                self.check_not_aggregator(*contract, WITHDRAW_ACCRUED_FEES)
            }
            CallInstruction::NativeTransfer { receiver } => {
                if self.config.allowed_receivers.contains(receiver) {
                    Ok(())
                } else {
                    Err(PolicyError::ReceiverNotAllowed(*receiver))
                }
            }
            CallInstruction::Erc20Transfer { token, receiver } => {
                self.check_not_aggregator(*token, ERC20_TRANSFER)?;
                if self.config.allowed_receivers.contains(receiver) {
                    Ok(())
                } else {
                    Err(PolicyError::ReceiverNotAllowed(*receiver))
                }
            }
            CallInstruction::Multicall { target, calls } => {
                if !self.config.allowed_multicall_contracts.contains(target) {
                    return Err(PolicyError::MulticallTargetNotAllowed(*target));
                }
                for (index, sub_call) in calls.iter().enumerate() {
                    self.evaluate_sub_call(index, *target, sub_call)?;
                }
                Ok(())
            }
        }
    }

    // A registered aggregator contract only ever receives batch calls;
    // any other function addressed at it is refused.
    fn check_not_aggregator(
        &self,
        contract: Address,
        selector: Selector,
    ) -> Result<(), PolicyError> {
        if self.config.allowed_multicall_contracts.contains(&contract) {
            return Err(PolicyError::AggregatorFunctionNotAllowed {
                contract,
                selector: hex::encode(selector),
            });
        }
        Ok(())
    }

    fn evaluate_sub_call(
        &self,
        index: usize,
        multicall: Address,
        call: &SubCall,
    ) -> Result<(), PolicyError> {
        // A sub-call forwarding native value pays its target directly; the
        // target is the receiver and the inner data is not inspected.
        if let Some(value) = call.value {
            if value > U256::ZERO {
                return if self.config.allowed_receivers.contains(&call.target) {
                    Ok(())
                } else {
                    Err(PolicyError::SubCallReceiverNotAllowed {
                        index,
                        receiver: call.target,
                    })
                };
            }
        }

        let data = call.call_data.as_slice();
        if data.len() < 4 {
            return Err(PolicyError::SubCallDataTooShort {
                index,
                len: data.len(),
            });
        }
        let selector = [data[0], data[1], data[2], data[3]];
        let args = &data[4..];

        match selector {
            ERC20_APPROVE => {
                if args.len() != 2 * WORD {
                    return Err(PolicyError::SubCallArgLength {
                        index,
                        method: "approve",
                        have: args.len(),
                    });
                }
                let spender = read_address(args, 0);
                // Only the aggregator itself may be approved, so the
                // allowance is spent within the same batch.
                if spender == multicall {
                    Ok(())
                } else {
                    Err(PolicyError::ApproveToOtherAddress { index, spender })
                }
            }
            ERC20_TRANSFER_FROM => {
                if args.len() != 3 * WORD {
                    return Err(PolicyError::SubCallArgLength {
                        index,
                        method: "transferFrom",
                        have: args.len(),
                    });
                }
                let receiver = read_address(args, WORD);
                if self.config.allowed_receivers.contains(&receiver) {
                    Ok(())
                } else {
                    Err(PolicyError::SubCallReceiverNotAllowed { index, receiver })
                }
            }
            _ => Err(PolicyError::FunctionNotAllowed {
                index,
                selector: hex::encode(selector),
            }),
        }
    }
}
