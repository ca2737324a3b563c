mod b64;
mod cipher;
mod keys;
mod metadata;
mod policy;
mod sealed;
mod sealer;

use crate::entity::EdmType;
use thiserror::Error;

// Re-exports
pub use b64::{b64_decode, b64_encode};
pub use cipher::{property_aad, CipherError, ContentKey};
pub use keys::{KeyError, KeyResolver, KeyRing, KeyWrapper, SymmetricKey, A128KW, A192KW, A256KW};
pub use metadata::{EncryptionData, Manifest, ManifestEntry, AES_GCM_256, PROTOCOL_V1};
pub use policy::{EncryptionPolicy, EncryptionPolicyBuilder};
pub use sealed::Sealed;
pub use sealer::Sealer;

/// Broad classification of an [`EncryptionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The policy or request options cannot perform the requested operation.
    Configuration,
    /// A property selected for encryption is not a non-null string.
    Eligibility,
    /// The wrap key could not be found or could not wrap/unwrap the content key.
    KeyResolution,
    /// Generating the content key or encrypting a property failed.
    Encryption,
    /// Ciphertext was damaged, failed authentication or did not decrypt to valid UTF-8.
    Decryption,
    /// The encryption metadata stored with the entity is malformed.
    Metadata,
}

/// Errors raised while encrypting or decrypting entity properties.
///
/// None of these are transient: retrying the same operation yields the same error.
#[derive(Debug, Error)]
pub enum EncryptionError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Entity is not encrypted but encryption is required")]
    NotEncrypted,

    #[error("Property '{name}' cannot be encrypted: expected a non-null Edm.String, got {}", describe(.edm_type, .is_null))]
    Ineligible {
        name: String,
        edm_type: EdmType,
        is_null: bool,
    },

    #[error("Property name '{0}' is reserved")]
    ReservedProperty(String),

    #[error("Key '{0}' could not be resolved")]
    KeyNotFound(String),

    #[error("Failed to wrap content key with key '{key_id}'")]
    KeyWrap {
        key_id: String,
        #[source]
        source: keys::KeyError,
    },

    #[error("Failed to unwrap content key with key '{key_id}'")]
    KeyUnwrap {
        key_id: String,
        #[source]
        source: keys::KeyError,
    },

    #[error("Failed to encrypt property '{name}'")]
    Encryption {
        name: String,
        #[source]
        source: CipherError,
    },

    #[error("Failed to decrypt property '{name}'")]
    Decryption {
        name: String,
        #[source]
        source: CipherError,
    },

    #[error("Decrypted property '{name}' is not valid UTF-8")]
    InvalidUtf8 {
        name: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Invalid encryption metadata: {0}")]
    InvalidMetadata(String),
}

fn describe(edm_type: &EdmType, is_null: &bool) -> String {
    if *is_null {
        format!("null {edm_type}")
    } else {
        edm_type.to_string()
    }
}

impl EncryptionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) | Self::NotEncrypted => ErrorKind::Configuration,
            Self::Ineligible { .. } | Self::ReservedProperty(_) => ErrorKind::Eligibility,
            Self::KeyNotFound(_) | Self::KeyWrap { .. } | Self::KeyUnwrap { .. } => {
                ErrorKind::KeyResolution
            }
            Self::Encryption { .. } => ErrorKind::Encryption,
            Self::Decryption { .. } | Self::InvalidUtf8 { .. } => ErrorKind::Decryption,
            Self::InvalidMetadata(_) => ErrorKind::Metadata,
        }
    }
}
