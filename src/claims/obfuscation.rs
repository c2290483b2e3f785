//! Placeholder claim "encryption"
//!
//! These transforms only hide values from casual inspection. The code is a
//! keccak256 digest of the value's 32-byte big-endian word: anyone can
//! recompute it for candidate values, and nothing decrypts it. They provide
//! no confidentiality and must not be treated as a security boundary.

use crate::types::keccak256;

/// Opaque 32-byte code stored on the ledger in place of a plaintext value
pub type ObscuredCode = [u8; 32];

/// Hash a value as a single 32-byte big-endian word
pub fn obscure_value(value: u128) -> ObscuredCode {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    keccak256(&word)
}

/// Read the leading four bytes of a code as a big-endian integer.
///
/// This is what the "Decrypt & View" action historically displayed. It is
/// not an inverse of [`obscure_value`]: the result has no relation to the
/// original value beyond being derived from its digest.
pub fn peek_prefix(code: &ObscuredCode) -> u32 {
    u32::from_be_bytes([code[0], code[1], code[2], code[3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obscure_is_deterministic_and_value_sensitive() {
        assert_eq!(obscure_value(42), obscure_value(42));
        assert_ne!(obscure_value(42), obscure_value(43));
    }

    #[test]
    fn obscure_of_zero_is_hash_of_zero_word() {
        assert_eq!(obscure_value(0), keccak256(&[0u8; 32]));
    }

    #[test]
    fn peek_prefix_does_not_recover_value() {
        let code = obscure_value(1);
        assert_ne!(peek_prefix(&code), 1);
        assert_eq!(
            peek_prefix(&code),
            u32::from_str_radix(&hex::encode(code)[..8], 16).unwrap()
        );
    }
}
