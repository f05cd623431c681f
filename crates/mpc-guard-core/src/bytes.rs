//! Bounds-safe word extraction from untrusted call data.
//!
//! Call data reaches this crate from an external signing queue and may be
//! truncated or deliberately malformed. Every read clamps its range to the
//! buffer and right-pads the result with zero bytes, so the decoders built
//! on top are total functions over arbitrary byte input.

use alloy_primitives::{Address, U256};

/// Size of one ABI word in bytes.
pub const WORD: usize = 32;

/// Read `size` bytes starting at `start`.
///
/// `start` and `start + size` are clamped to the buffer; missing bytes are
/// filled with zeros. The returned buffer always has exactly `size` bytes.
pub fn read_padded(data: &[u8], start: usize, size: usize) -> Vec<u8> {
    let mut out = vec![0u8; size];
    let start = start.min(data.len());
    let end = start.saturating_add(size).min(data.len());
    out[..end - start].copy_from_slice(&data[start..end]);
    out
}

/// Read one 32-byte word starting at `start`, zero-padded past the buffer.
pub fn read_word(data: &[u8], start: usize) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    let start = start.min(data.len());
    let end = start.saturating_add(WORD).min(data.len());
    word[..end - start].copy_from_slice(&data[start..end]);
    word
}

/// Read the word at `start` as a big-endian 256-bit integer.
pub fn read_u256(data: &[u8], start: usize) -> U256 {
    U256::from_be_bytes(read_word(data, start))
}

/// Read the word at `start` as a `usize`, saturating on overflow.
///
/// Saturated values are offsets or lengths that no real buffer can hold;
/// downstream reads clamp them away.
pub fn read_usize(data: &[u8], start: usize) -> usize {
    let value = read_u256(data, start);
    if value > U256::from(usize::MAX) {
        usize::MAX
    } else {
        value.to::<usize>()
    }
}

/// Read the word at `start` as an address (low 20 bytes of the word).
pub fn read_address(data: &[u8], start: usize) -> Address {
    Address::from_slice(&read_word(data, start)[12..])
}
