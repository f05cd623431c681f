//! Decoding of aggregator batch arguments into sub-calls.
//!
//! The three Multicall3 entrypoint families share one layout: a word-offset
//! table followed by per-element tuples, where the tuples differ only in
//! which fixed words precede the trailing `bytes` field. Rather than a full
//! ABI decoder this reads exactly the words the policy needs, assuming the
//! inner `bytes` head is at its canonical position.

use crate::bytes::{read_address, read_padded, read_u256, read_usize, WORD};
use crate::decode::SubCall;
use crate::error::DecodeError;
use alloy_primitives::U256;

/// Element tuple layout of a multicall batch argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TupleVariant {
    /// `(address target, bytes callData)`: aggregate, blockAndAggregate,
    /// tryAggregate, tryBlockAndAggregate
    TargetData,
    /// `(address target, bool allowFailure, bytes callData)`: aggregate3
    TargetFlagData,
    /// `(address target, bool allowFailure, uint256 value, bytes callData)`:
    /// aggregate3Value
    TargetFlagValueData,
}

impl TupleVariant {
    /// Offset of the `bytes` length word inside one element tuple.
    fn data_length_offset(self) -> usize {
        match self {
            TupleVariant::TargetData => 2 * WORD,
            TupleVariant::TargetFlagData => 3 * WORD,
            TupleVariant::TargetFlagValueData => 4 * WORD,
        }
    }
}

/// Decode a multicall batch argument (everything after the selector) into
/// its sub-calls.
///
/// Layout: word 0 is the head offset of the array, word 1 the element
/// count, then `count` element offsets relative to the start of the offset
/// table, then the element tuples.
pub fn decode_calls(data: &[u8], variant: TupleVariant) -> Result<Vec<SubCall>, DecodeError> {
    let count = read_usize(data, WORD);
    let body = if data.len() > 2 * WORD {
        &data[2 * WORD..]
    } else {
        &[][..]
    };

    // A count with no room for its own offset table is a garbage batch.
    if count > body.len() / WORD {
        return Err(DecodeError::TruncatedBatch {
            declared: count,
            available: body.len() / WORD,
        });
    }

    let mut calls = Vec::with_capacity(count);
    for i in 0..count {
        let offset = read_usize(body, i * WORD).min(body.len());
        let element = &body[offset..];

        let target = read_address(element, 0);
        let allow_failure = match variant {
            TupleVariant::TargetData => false,
            // The producing service encodes this flag inverted; decoded
            // as-is to match. The flag never affects the verdict.
            _ => read_u256(element, WORD) == U256::ZERO,
        };
        let value = match variant {
            TupleVariant::TargetFlagValueData => Some(read_u256(element, 2 * WORD)),
            _ => None,
        };

        let length_offset = variant.data_length_offset();
        let length = read_usize(element, length_offset).min(data.len());
        let call_data = read_padded(element, length_offset + WORD, length);

        calls.push(SubCall {
            target,
            allow_failure,
            value,
            call_data,
        });
    }
    Ok(calls)
}
