//! Password-based encryption for signing keys
//!
//! Secret keys are sealed with AES-256-GCM under a key stretched from the
//! user's password with PBKDF2-HMAC-SHA256. The stored blob is
//! `salt (16) || nonce (12) || ciphertext || tag (16)`, hex-encoded.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use secp256k1::SecretKey;
use sha2::Sha256;

/// PBKDF2 iteration count (OWASP guidance for HMAC-SHA256)
pub const PBKDF2_ROUNDS: u32 = 600_000;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Key encryption errors
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("Secp256k1 error: {0}")]
    Secp256k1(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Decryption error: {0}")]
    Decryption(String),
}

fn derive_cipher(password: &str, salt: &[u8]) -> Aes256Gcm {
    let mut key_bytes = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ROUNDS, &mut key_bytes);
    Aes256Gcm::new(aes_gcm::Key::<Aes256Gcm>::from_slice(&key_bytes))
}

/// Encrypt bytes under a password; returns the hex-encoded sealed blob
pub fn encrypt_data(data: &[u8], password: &str) -> Result<String, KeyError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);

    let ciphertext = derive_cipher(password, &salt)
        .encrypt(Nonce::from_slice(&nonce_bytes), data)
        .map_err(|e| KeyError::Encryption(e.to_string()))?;

    let mut sealed = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    sealed.extend_from_slice(&salt);
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&ciphertext);

    Ok(hex::encode(sealed))
}

/// Reverse [`encrypt_data`]
pub fn decrypt_data(sealed_hex: &str, password: &str) -> Result<Vec<u8>, KeyError> {
    let sealed = hex::decode(sealed_hex).map_err(|e| KeyError::Decryption(e.to_string()))?;

    if sealed.len() < SALT_LEN + NONCE_LEN + TAG_LEN {
        return Err(KeyError::Decryption(format!(
            "Data too short (minimum {} bytes required)",
            SALT_LEN + NONCE_LEN + TAG_LEN
        )));
    }

    let (salt, rest) = sealed.split_at(SALT_LEN);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

    derive_cipher(password, salt)
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|e| KeyError::Decryption(format!("Decryption failed (wrong password?): {}", e)))
}

pub fn encrypt_secret_key(secret_key: &SecretKey, password: &str) -> Result<String, KeyError> {
    encrypt_data(&secret_key.secret_bytes(), password)
}

pub fn decrypt_secret_key(sealed_hex: &str, password: &str) -> Result<SecretKey, KeyError> {
    let bytes = decrypt_data(sealed_hex, password)?;
    SecretKey::from_slice(&bytes)
        .map_err(|e| KeyError::Secp256k1(format!("Invalid secret key: {}", e)))
}
