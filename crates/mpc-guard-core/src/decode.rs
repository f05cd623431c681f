//! Classification of fee-withdrawal transactions by function selector.
//!
//! Only a closed set of selectors is accepted at the top level. Anything
//! else decodes to an error and the request is rejected.

use crate::bytes::{read_address, WORD};
use crate::error::DecodeError;
use crate::multicall::{decode_calls, TupleVariant};
use crate::tx::Transaction;
use alloy_primitives::{Address, U256};

/// A 4-byte function selector.
pub type Selector = [u8; 4];

/// `AnyswapFeeTo(address,uint256)` style fee sweep
pub const ANY_SWAP_FEE_TO: Selector = [0x87, 0xcc, 0x6e, 0x2f];
/// `withdrawAccruedFees()`
pub const WITHDRAW_ACCRUED_FEES: Selector = [0xad, 0xa8, 0x2c, 0x7d];
/// `transfer(address,uint256)`
pub const ERC20_TRANSFER: Selector = [0xa9, 0x05, 0x9c, 0xbb];
/// `approve(address,uint256)`
pub const ERC20_APPROVE: Selector = [0x09, 0x5e, 0xa7, 0xb3];
/// `transferFrom(address,address,uint256)`
pub const ERC20_TRANSFER_FROM: Selector = [0x23, 0xb8, 0x72, 0xdd];
/// `aggregate((address,bytes)[])`
pub const AGGREGATE: Selector = [0x25, 0x2d, 0xba, 0x42];
/// `blockAndAggregate((address,bytes)[])`
pub const BLOCK_AND_AGGREGATE: Selector = [0xc3, 0x07, 0x7f, 0xa9];
/// `aggregate3((address,bool,bytes)[])`
pub const AGGREGATE3: Selector = [0x82, 0xad, 0x56, 0xcb];
/// `aggregate3Value((address,bool,uint256,bytes)[])`
pub const AGGREGATE3_VALUE: Selector = [0x17, 0x4d, 0xea, 0x71];
/// `tryAggregate(bool,(address,bytes)[])`
pub const TRY_AGGREGATE: Selector = [0xbc, 0xe3, 0x8b, 0xd7];
/// `tryBlockAndAggregate(bool,(address,bytes)[])`
pub const TRY_BLOCK_AND_AGGREGATE: Selector = [0x39, 0x95, 0x42, 0xe9];

/// One element of a multicall batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubCall {
    /// Contract the aggregator calls into
    pub target: Address,
    /// Whether the batch tolerates this call reverting
    pub allow_failure: bool,
    /// Native value forwarded with the call, when the layout carries one
    pub value: Option<U256>,
    /// Inner call data
    pub call_data: Vec<u8>,
}

/// The policy-relevant reading of a transaction's call data.
///
/// Every variant keeps the contract the transaction is addressed to; the
/// policy needs it to refuse non-batch functions aimed at a registered
/// aggregator contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallInstruction {
    /// Value transfer; call data is not inspected
    NativeTransfer { receiver: Address },
    /// Fee sweep on the bridge contract itself
    FeeSweep { contract: Address },
    /// Parameterless accrued-fee withdrawal
    AccruedFeesWithdraw { contract: Address },
    /// `transfer(address,uint256)` on a token contract
    Erc20Transfer { token: Address, receiver: Address },
    /// Batch of sub-calls routed through an aggregator contract
    Multicall {
        target: Address,
        calls: Vec<SubCall>,
    },
}

/// Classify a transaction into a [`CallInstruction`].
pub fn decode_call(tx: &Transaction) -> Result<CallInstruction, DecodeError> {
    let to = tx.to.ok_or(DecodeError::NoRecipient)?;

    if tx.value > U256::ZERO {
        return Ok(CallInstruction::NativeTransfer { receiver: to });
    }

    let input = tx.input.as_ref();
    if input.len() < 4 {
        return Err(DecodeError::DataTooShort(input.len()));
    }
    let selector: Selector = [input[0], input[1], input[2], input[3]];
    let args = &input[4..];

    match selector {
        ANY_SWAP_FEE_TO => Ok(CallInstruction::FeeSweep { contract: to }),
        WITHDRAW_ACCRUED_FEES => Ok(CallInstruction::AccruedFeesWithdraw { contract: to }),
        ERC20_TRANSFER => {
            if args.len() != 2 * WORD {
                return Err(DecodeError::WrongArgLength {
                    method: "transfer",
                    have: args.len(),
                    want: 2 * WORD,
                });
            }
            Ok(CallInstruction::Erc20Transfer {
                token: to,
                receiver: read_address(args, 0),
            })
        }
        AGGREGATE | BLOCK_AND_AGGREGATE => Ok(CallInstruction::Multicall {
            target: to,
            calls: decode_calls(args, TupleVariant::TargetData)?,
        }),
        AGGREGATE3 => Ok(CallInstruction::Multicall {
            target: to,
            calls: decode_calls(args, TupleVariant::TargetFlagData)?,
        }),
        AGGREGATE3_VALUE => Ok(CallInstruction::Multicall {
            target: to,
            calls: decode_calls(args, TupleVariant::TargetFlagValueData)?,
        }),
        TRY_AGGREGATE | TRY_BLOCK_AND_AGGREGATE => {
            // First argument is the requireSuccess bool; the array head
            // starts one word in.
            let rest = if args.len() > WORD { &args[WORD..] } else { &[][..] };
            Ok(CallInstruction::Multicall {
                target: to,
                calls: decode_calls(rest, TupleVariant::TargetData)?,
            })
        }
        _ => Err(DecodeError::UnknownSelector(hex::encode(selector))),
    }
}

/// Human-readable method name for a known selector, for audit logging.
pub fn method_name(selector: &Selector) -> Option<&'static str> {
    match *selector {
        ANY_SWAP_FEE_TO => Some("anySwapFeeTo"),
        WITHDRAW_ACCRUED_FEES => Some("withdrawAccruedFees"),
        ERC20_TRANSFER => Some("transfer"),
        ERC20_APPROVE => Some("approve"),
        ERC20_TRANSFER_FROM => Some("transferFrom"),
        AGGREGATE => Some("aggregate"),
        BLOCK_AND_AGGREGATE => Some("blockAndAggregate"),
        AGGREGATE3 => Some("aggregate3"),
        AGGREGATE3_VALUE => Some("aggregate3Value"),
        TRY_AGGREGATE => Some("tryAggregate"),
        TRY_BLOCK_AND_AGGREGATE => Some("tryBlockAndAggregate"),
        [0x2e, 0x1a, 0x7d, 0x4d] => Some("withdraw"),
        [0xd0, 0xe3, 0x0d, 0xb0] => Some("deposit"),
        [0x18, 0x16, 0x0d, 0xdd] => Some("totalSupply"),
        [0x70, 0xa0, 0x82, 0x31] => Some("balanceOf"),
        _ => None,
    }
}
