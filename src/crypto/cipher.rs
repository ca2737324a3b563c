//! AES-256-GCM property encryption under a per-entity content encryption key.
//!
//! Ciphertext layout: `[nonce:12][ciphertext + tag:16]`. A fresh random nonce is drawn for every
//! value, so equal plaintexts never produce equal ciphertexts.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const CEK_LENGTH: usize = 32;
pub const NONCE_LENGTH: usize = 12;
pub const TAG_LENGTH: usize = 16;

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("Invalid key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },
    #[error("Ciphertext too short: {0} bytes")]
    DataTooShort(usize),
    #[error("Random number generation failed: {0}")]
    Rng(String),
    #[error("Encryption failed")]
    EncryptionFailed,
    #[error("Authentication failed: ciphertext was modified or the wrong key was used")]
    AuthenticationFailed,
    #[error("Malformed ciphertext: {0}")]
    Malformed(String),
}

/// One-time symmetric key used to encrypt the selected properties of a single entity.
///
/// The key material is wiped when the value is dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ContentKey([u8; CEK_LENGTH]);

impl ContentKey {
    pub fn generate() -> Result<Self, CipherError> {
        let mut key = [0u8; CEK_LENGTH];
        getrandom::getrandom(&mut key).map_err(|e| CipherError::Rng(e.to_string()))?;
        Ok(Self(key))
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, CipherError> {
        let key: [u8; CEK_LENGTH] = bytes.try_into().map_err(|_| CipherError::InvalidKeyLength {
            expected: CEK_LENGTH,
            got: bytes.len(),
        })?;
        Ok(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.0))
    }

    pub fn encrypt(&self, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>, CipherError> {
        let mut iv = [0u8; NONCE_LENGTH];
        getrandom::getrandom(&mut iv).map_err(|e| CipherError::Rng(e.to_string()))?;

        let ciphertext = self
            .cipher()
            .encrypt(
                Nonce::from_slice(&iv),
                Payload {
                    msg: plaintext,
                    aad,
                },
            )
            .map_err(|_| CipherError::EncryptionFailed)?;

        let mut result = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
        result.extend_from_slice(&iv);
        result.extend_from_slice(&ciphertext);
        Ok(result)
    }

    pub fn decrypt(&self, encrypted: &[u8], aad: &[u8]) -> Result<Vec<u8>, CipherError> {
        if encrypted.len() < NONCE_LENGTH + TAG_LENGTH {
            return Err(CipherError::DataTooShort(encrypted.len()));
        }

        let (iv, ciphertext) = encrypted.split_at(NONCE_LENGTH);

        self.cipher()
            .decrypt(
                Nonce::from_slice(iv),
                Payload {
                    msg: ciphertext,
                    aad,
                },
            )
            .map_err(|_| CipherError::AuthenticationFailed)
    }
}

/// Additional authenticated data binding a ciphertext to its entity and property.
/// Format: `[pk len:4 BE][pk][rk len:4 BE][rk][property name]`
pub fn property_aad(partition_key: &str, row_key: &str, name: &str) -> Vec<u8> {
    let mut aad = Vec::with_capacity(8 + partition_key.len() + row_key.len() + name.len());
    aad.extend_from_slice(&(partition_key.len() as u32).to_be_bytes());
    aad.extend_from_slice(partition_key.as_bytes());
    aad.extend_from_slice(&(row_key.len() as u32).to_be_bytes());
    aad.extend_from_slice(row_key.as_bytes());
    aad.extend_from_slice(name.as_bytes());
    aad
}
