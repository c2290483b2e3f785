//! Signing identity
//!
//! A secp256k1 key that authorises writes to the ledger. The ledger account
//! address is derived from the public key the same way EVM chains do it.

use rand::rngs::OsRng;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use serde::Serialize;

use crate::ledger::{LedgerError, Signed};
use crate::types::Address;

/// Signing errors
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("Invalid secret key: {0}")]
    InvalidKey(String),

    #[error("Signing failed: {0}")]
    Signing(#[from] LedgerError),
}

/// A connected signing identity
#[derive(Clone)]
pub struct Signer {
    secret_key: SecretKey,
    public_key: PublicKey,
    address: Address,
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl Signer {
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::signing_only();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        let address = Address::from_public_key(&public_key);

        Self {
            secret_key,
            public_key,
            address,
        }
    }

    /// Parse a hex-encoded 32-byte secret key (optional `0x` prefix)
    pub fn from_secret_hex(secret_hex: &str) -> Result<Self, SignerError> {
        let trimmed = secret_hex.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(digits).map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        let secret_key =
            SecretKey::from_slice(&bytes).map_err(|e| SignerError::InvalidKey(e.to_string()))?;

        Ok(Self::from_secret_key(secret_key))
    }

    /// Create a signer with a freshly generated key
    pub fn generate() -> Self {
        Self::from_secret_key(SecretKey::new(&mut OsRng))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    /// Sign a payload, producing a ledger transaction envelope
    pub fn sign<T: Serialize>(&self, payload: T) -> Result<Signed<T>, SignerError> {
        let digest = Signed::digest(&payload)?;
        let message = secp256k1::Message::from_digest_slice(&digest)
            .map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        let signature = Secp256k1::signing_only().sign_ecdsa(&message, &self.secret_key);

        Ok(Signed {
            payload,
            public_key: hex::encode(self.public_key.serialize()),
            signature: hex::encode(signature.serialize_compact()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_key_derives_known_address() {
        // Secret key 1 maps to the generator point
        let signer = Signer::from_secret_hex(
            "0x0000000000000000000000000000000000000000000000000000000000000001",
        )
        .unwrap();
        assert_eq!(
            signer.address().to_string(),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn signed_payload_verifies_to_signer_address() {
        let signer = Signer::generate();
        let signed = signer.sign("hello".to_string()).unwrap();
        assert_eq!(signed.verify().unwrap(), signer.address());
    }

    #[test]
    fn tampered_payload_fails_verification() {
        let signer = Signer::generate();
        let mut signed = signer.sign(7u64).unwrap();
        signed.payload = 8;
        assert!(matches!(
            signed.verify(),
            Err(LedgerError::InvalidSignature(_))
        ));
    }

    #[test]
    fn generated_signers_are_distinct_and_usable() {
        let first = Signer::generate();
        let second = Signer::generate();
        assert_ne!(first.address(), second.address());
        assert_ne!(first.secret_key(), second.secret_key());

        for signer in [&first, &second] {
            let signed = signer.sign(1u64).unwrap();
            assert_eq!(signed.verify().unwrap(), signer.address());
        }
    }

    #[test]
    fn rejects_malformed_secret() {
        assert!(Signer::from_secret_hex("zz").is_err());
        assert!(Signer::from_secret_hex(&"00".repeat(32)).is_err());
    }
}
