use super::{b64::serde_b64, EncryptionError};
use crate::entity::EdmType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const PROTOCOL_V1: &str = "1.0";
pub const AES_GCM_256: &str = "AES_GCM_256";

const ENCRYPTION_LIBRARY: &str = concat!("tablecrypt ", env!("CARGO_PKG_VERSION"));

/// Contents of the metadata shadow property: the wrapped content key and the algorithms used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EncryptionData {
    pub wrapped_content_key: WrappedContentKey,
    pub encryption_agent: EncryptionAgent,
    #[serde(default)]
    pub key_wrapping_metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WrappedContentKey {
    pub key_id: String,
    #[serde(with = "serde_b64")]
    pub encrypted_key: Vec<u8>,
    pub algorithm: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EncryptionAgent {
    pub protocol: String,
    pub encryption_algorithm: String,
}

impl EncryptionData {
    pub(crate) fn new(
        key_id: impl Into<String>,
        encrypted_key: Vec<u8>,
        algorithm: impl Into<String>,
    ) -> Self {
        Self {
            wrapped_content_key: WrappedContentKey {
                key_id: key_id.into(),
                encrypted_key,
                algorithm: algorithm.into(),
            },
            encryption_agent: EncryptionAgent {
                protocol: PROTOCOL_V1.to_string(),
                encryption_algorithm: AES_GCM_256.to_string(),
            },
            key_wrapping_metadata: HashMap::from([(
                "EncryptionLibrary".to_string(),
                ENCRYPTION_LIBRARY.to_string(),
            )]),
        }
    }

    pub(crate) fn to_json(&self) -> Result<String, EncryptionError> {
        serde_json::to_string(self).map_err(|e| EncryptionError::InvalidMetadata(e.to_string()))
    }

    /// Parse the metadata and check that it was produced by a supported protocol.
    pub(crate) fn from_json(json: &str) -> Result<Self, EncryptionError> {
        let data: Self = serde_json::from_str(json)
            .map_err(|e| EncryptionError::InvalidMetadata(e.to_string()))?;

        if data.encryption_agent.protocol != PROTOCOL_V1 {
            return Err(EncryptionError::InvalidMetadata(format!(
                "unsupported protocol version '{}'",
                data.encryption_agent.protocol
            )));
        }

        if data.encryption_agent.encryption_algorithm != AES_GCM_256 {
            return Err(EncryptionError::InvalidMetadata(format!(
                "unsupported encryption algorithm '{}'",
                data.encryption_agent.encryption_algorithm
            )));
        }

        Ok(data)
    }
}

/// One entry of the manifest: an encrypted property and the kind it had before encryption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManifestEntry {
    pub name: String,
    #[serde(rename = "Type")]
    pub edm_type: EdmType,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest(Vec<ManifestEntry>);

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, edm_type: EdmType) {
        self.0.push(ManifestEntry {
            name: name.into(),
            edm_type,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn to_bytes(&self) -> Result<Vec<u8>, EncryptionError> {
        serde_json::to_vec(self).map_err(|e| EncryptionError::InvalidMetadata(e.to_string()))
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<Self, EncryptionError> {
        serde_json::from_slice(bytes).map_err(|e| EncryptionError::InvalidMetadata(e.to_string()))
    }
}
