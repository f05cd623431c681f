//! secp256k1 signature recovery for the sender check.

use crate::error::VerifyError;
use alloy_primitives::{Address, B256};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use tiny_keccak::{Hasher, Keccak};

/// Length of an `r || s || v` recoverable signature.
pub const SIGNATURE_LENGTH: usize = 65;

/// Recover the address that produced `signature_hex` over `hash`.
///
/// The signature is 65 bytes of hex, `r || s || v`, with `v` either a raw
/// recovery id (0..=3) or the pre-EIP-155 27/28 form.
pub fn recover_signer(hash: B256, signature_hex: &str) -> Result<Address, VerifyError> {
    let stripped = signature_hex
        .strip_prefix("0x")
        .or_else(|| signature_hex.strip_prefix("0X"))
        .unwrap_or(signature_hex);
    let bytes = hex::decode(stripped).map_err(|e| VerifyError::BadSignatureFormat(e.to_string()))?;
    if bytes.len() != SIGNATURE_LENGTH {
        return Err(VerifyError::BadSignatureFormat(format!(
            "signature has {} bytes, want {}",
            bytes.len(),
            SIGNATURE_LENGTH
        )));
    }

    let v = match bytes[64] {
        v @ 0..=3 => v,
        v @ 27..=30 => v - 27,
        v => {
            return Err(VerifyError::BadSignatureFormat(format!(
                "invalid recovery byte {v}"
            )))
        }
    };
    let recovery_id =
        RecoveryId::from_byte(v).ok_or_else(|| VerifyError::BadSignatureFormat(v.to_string()))?;
    let signature = Signature::from_slice(&bytes[..64])
        .map_err(|e| VerifyError::BadSignatureFormat(e.to_string()))?;

    let key = VerifyingKey::recover_from_prehash(hash.as_slice(), &signature, recovery_id)
        .map_err(|e| VerifyError::RecoveryFailed(e.to_string()))?;
    Ok(public_key_address(&key))
}

/// Ethereum address of a secp256k1 public key: the last 20 bytes of the
/// keccak hash of the uncompressed point without its 0x04 prefix.
pub fn public_key_address(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let mut hasher = Keccak::v256();
    hasher.update(&point.as_bytes()[1..]);
    let mut hash = [0u8; 32];
    hasher.finalize(&mut hash);
    Address::from_slice(&hash[12..])
}
