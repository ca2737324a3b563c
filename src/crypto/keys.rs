//! Key encryption keys and key resolution.
//!
//! A [`KeyWrapper`] wraps and unwraps content encryption keys. A [`KeyResolver`] maps the key
//! identifier stored in the encryption metadata back to a usable [`KeyWrapper`]. Both traits are
//! async so that keys held by a remote key vault can be plugged in.

use aes_kw::{KekAes128, KekAes192, KekAes256};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::{collections::HashMap, fmt, sync::Arc};
use thiserror::Error;
use zeroize::Zeroizing;

pub const A128KW: &str = "A128KW";
pub const A192KW: &str = "A192KW";
pub const A256KW: &str = "A256KW";

/// AES-KW adds one 64 bit integrity block to the wrapped key.
const KW_OVERHEAD: usize = 8;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Invalid key length: expected 16, 24 or 32 bytes, got {0}")]
    InvalidKeyLength(usize),
    #[error("Unsupported key wrap algorithm '{algorithm}' for key '{key_id}'")]
    UnsupportedAlgorithm { key_id: String, algorithm: String },
    #[error("AES-KW wrap failed: {0}")]
    WrapFailed(String),
    #[error("AES-KW unwrap failed: {0}")]
    UnwrapFailed(String),
    #[error("Random number generation failed: {0}")]
    Rng(String),
    #[error("Key provider error: {0}")]
    Provider(String),
}

/// A key encryption key able to wrap and unwrap content encryption keys.
#[async_trait]
pub trait KeyWrapper: Send + Sync {
    /// Identifier recorded in the encryption metadata and later handed to a [`KeyResolver`].
    fn key_id(&self) -> &str;

    /// The algorithm used when wrapping new content keys.
    fn default_wrap_algorithm(&self) -> &str;

    async fn wrap_key(&self, key: &[u8], algorithm: &str) -> Result<Vec<u8>, KeyError>;

    async fn unwrap_key(&self, wrapped: &[u8], algorithm: &str) -> Result<Vec<u8>, KeyError>;
}

/// Maps a key identifier to a key.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    /// Returns `Ok(None)` when no key is registered under `key_id`.
    async fn resolve_key(&self, key_id: &str) -> Result<Option<Arc<dyn KeyWrapper>>, KeyError>;
}

enum Kek {
    Aes128(KekAes128),
    Aes192(KekAes192),
    Aes256(KekAes256),
}

/// A local AES key wrapping key (RFC 3394).
pub struct SymmetricKey {
    key_id: String,
    kek: Kek,
}

impl SymmetricKey {
    /// Create a key from raw key material of 16, 24 or 32 bytes.
    pub fn from_bytes(key_id: impl Into<String>, bytes: &[u8]) -> Result<Self, KeyError> {
        let kek = match bytes.len() {
            16 => {
                let raw: [u8; 16] = bytes
                    .try_into()
                    .map_err(|_| KeyError::InvalidKeyLength(bytes.len()))?;
                Kek::Aes128(KekAes128::from(raw))
            }
            24 => {
                let raw: [u8; 24] = bytes
                    .try_into()
                    .map_err(|_| KeyError::InvalidKeyLength(bytes.len()))?;
                Kek::Aes192(KekAes192::from(raw))
            }
            32 => {
                let raw: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| KeyError::InvalidKeyLength(bytes.len()))?;
                Kek::Aes256(KekAes256::from(raw))
            }
            other => return Err(KeyError::InvalidKeyLength(other)),
        };

        Ok(Self {
            key_id: key_id.into(),
            kek,
        })
    }

    /// Generate a new random 256 bit key.
    pub fn generate(key_id: impl Into<String>) -> Result<Self, KeyError> {
        let mut raw = Zeroizing::new([0u8; 32]);
        getrandom::getrandom(raw.as_mut()).map_err(|e| KeyError::Rng(e.to_string()))?;
        Self::from_bytes(key_id, raw.as_ref())
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn algorithm(&self) -> &'static str {
        match self.kek {
            Kek::Aes128(_) => A128KW,
            Kek::Aes192(_) => A192KW,
            Kek::Aes256(_) => A256KW,
        }
    }

    fn check_algorithm(&self, algorithm: &str) -> Result<(), KeyError> {
        if algorithm == self.algorithm() {
            Ok(())
        } else {
            Err(KeyError::UnsupportedAlgorithm {
                key_id: self.key_id.clone(),
                algorithm: algorithm.to_string(),
            })
        }
    }

    fn wrap(&self, key: &[u8]) -> Result<Vec<u8>, KeyError> {
        let mut wrapped = vec![0u8; key.len() + KW_OVERHEAD];
        match &self.kek {
            Kek::Aes128(kek) => kek.wrap(key, &mut wrapped),
            Kek::Aes192(kek) => kek.wrap(key, &mut wrapped),
            Kek::Aes256(kek) => kek.wrap(key, &mut wrapped),
        }
        .map_err(|e| KeyError::WrapFailed(format!("{:?}", e)))?;

        Ok(wrapped)
    }

    fn unwrap(&self, wrapped: &[u8]) -> Result<Vec<u8>, KeyError> {
        if wrapped.len() < 2 * KW_OVERHEAD {
            return Err(KeyError::UnwrapFailed(format!(
                "wrapped key too short: {} bytes",
                wrapped.len()
            )));
        }

        let mut key = vec![0u8; wrapped.len() - KW_OVERHEAD];
        match &self.kek {
            Kek::Aes128(kek) => kek.unwrap(wrapped, &mut key),
            Kek::Aes192(kek) => kek.unwrap(wrapped, &mut key),
            Kek::Aes256(kek) => kek.unwrap(wrapped, &mut key),
        }
        .map_err(|e| KeyError::UnwrapFailed(format!("{:?}", e)))?;

        Ok(key)
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("key_id", &self.key_id)
            .field("algorithm", &self.algorithm())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl KeyWrapper for SymmetricKey {
    fn key_id(&self) -> &str {
        &self.key_id
    }

    fn default_wrap_algorithm(&self) -> &str {
        self.algorithm()
    }

    async fn wrap_key(&self, key: &[u8], algorithm: &str) -> Result<Vec<u8>, KeyError> {
        self.check_algorithm(algorithm)?;
        self.wrap(key)
    }

    async fn unwrap_key(&self, wrapped: &[u8], algorithm: &str) -> Result<Vec<u8>, KeyError> {
        self.check_algorithm(algorithm)?;
        self.unwrap(wrapped)
    }
}

/// A collection of keys resolved by their identifier.
#[derive(Default)]
pub struct KeyRing {
    keys: RwLock<HashMap<String, Arc<dyn KeyWrapper>>>,
}

impl KeyRing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a key under its own identifier, replacing any key with the same identifier.
    pub fn add(&self, key: impl KeyWrapper + 'static) {
        self.add_shared(Arc::new(key));
    }

    pub fn add_shared(&self, key: Arc<dyn KeyWrapper>) {
        self.keys.write().insert(key.key_id().to_string(), key);
    }

    pub fn with_key(self, key: impl KeyWrapper + 'static) -> Self {
        self.add(key);
        self
    }

    pub fn remove(&self, key_id: &str) -> Option<Arc<dyn KeyWrapper>> {
        self.keys.write().remove(key_id)
    }

    pub fn contains(&self, key_id: &str) -> bool {
        self.keys.read().contains_key(key_id)
    }

    pub fn len(&self) -> usize {
        self.keys.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.read().is_empty()
    }
}

impl fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRing")
            .field("key_ids", &self.keys.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait]
impl KeyResolver for KeyRing {
    async fn resolve_key(&self, key_id: &str) -> Result<Option<Arc<dyn KeyWrapper>>, KeyError> {
        Ok(self.keys.read().get(key_id).cloned())
    }
}

/// A shared key resolves itself.
#[async_trait]
impl<K> KeyResolver for Arc<K>
where
    K: KeyWrapper + 'static,
{
    async fn resolve_key(&self, key_id: &str) -> Result<Option<Arc<dyn KeyWrapper>>, KeyError> {
        if self.key_id() == key_id {
            Ok(Some(self.clone() as Arc<dyn KeyWrapper>))
        } else {
            Ok(None)
        }
    }
}
