use super::{
    b64_decode, cipher::property_aad, metadata::Manifest, CipherError, ContentKey,
    EncryptionData, EncryptionError, KeyResolver,
};
use crate::entity::{
    property_name::{ENCRYPTION_MANIFEST, ENCRYPTION_METADATA},
    EdmType, Entity, EntityProperty,
};
use log::debug;
use zeroize::Zeroizing;

/// Wrapped to indicate that the entity is in its stored form: selected properties hold
/// ciphertext and the encryption shadow properties are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Sealed(pub(super) Entity);

impl Sealed {
    pub fn inner(&self) -> &Entity {
        &self.0
    }

    pub fn into_inner(self) -> Entity {
        self.0
    }

    /// Returns true if the entity carries encryption metadata.
    pub fn is_encrypted(&self) -> bool {
        self.0.get(ENCRYPTION_METADATA).is_some()
    }

    /// Decrypt the entity using the key named in its metadata.
    ///
    /// Shadow properties are always removed from the result. Without a `key_resolver` the
    /// encrypted properties are returned exactly as stored. That is opaque binary, or a base64
    /// string when the wire rendition dropped type information: the manifest naming the
    /// encrypted properties is itself encrypted, so they cannot be retyped without the key.
    /// Properties listed in the manifest but missing from the entity (because a projection did
    /// not select them) are skipped.
    pub async fn unseal(
        self,
        key_resolver: Option<&dyn KeyResolver>,
        require_encryption: bool,
    ) -> Result<Entity, EncryptionError> {
        let mut entity = self.0;
        let metadata = entity.remove(ENCRYPTION_METADATA);
        let manifest = entity.remove(ENCRYPTION_MANIFEST);

        let (metadata, manifest) = match (metadata, manifest) {
            (Some(metadata), Some(manifest)) => (metadata, manifest),
            (None, None) if require_encryption => return Err(EncryptionError::NotEncrypted),
            (None, None) => return Ok(entity),
            (Some(_), None) => {
                return Err(EncryptionError::InvalidMetadata(format!(
                    "{ENCRYPTION_METADATA} is present without {ENCRYPTION_MANIFEST}"
                )))
            }
            (None, Some(_)) => {
                return Err(EncryptionError::InvalidMetadata(format!(
                    "{ENCRYPTION_MANIFEST} is present without {ENCRYPTION_METADATA}"
                )))
            }
        };

        let Some(key_resolver) = key_resolver else {
            debug!(
                "No key resolver configured, returning ({}, {}) with encrypted properties as binary",
                entity.partition_key(),
                entity.row_key()
            );
            return Ok(entity);
        };

        let EntityProperty::String(Some(metadata)) = metadata else {
            return Err(EncryptionError::InvalidMetadata(format!(
                "{ENCRYPTION_METADATA} must be a non-null Edm.String"
            )));
        };

        let data = EncryptionData::from_json(&metadata)?;
        let cek = unwrap_content_key(&data, key_resolver).await?;

        let pk = entity.partition_key().to_string();
        let rk = entity.row_key().to_string();

        let manifest_bytes = ciphertext_bytes(ENCRYPTION_MANIFEST, manifest)?;
        let manifest = cek
            .decrypt(&manifest_bytes, &property_aad(&pk, &rk, ENCRYPTION_MANIFEST))
            .map_err(|source| EncryptionError::Decryption {
                name: ENCRYPTION_MANIFEST.to_string(),
                source,
            })
            .and_then(|bytes| Manifest::from_bytes(&bytes))?;

        for entry in manifest.iter() {
            let Some(stored) = entity.remove(&entry.name) else {
                debug!(
                    "Encrypted property '{}' not present on ({pk}, {rk}), skipping",
                    entry.name
                );
                continue;
            };

            let ciphertext = ciphertext_bytes(&entry.name, stored)?;
            let plaintext = cek
                .decrypt(&ciphertext, &property_aad(&pk, &rk, &entry.name))
                .map_err(|source| EncryptionError::Decryption {
                    name: entry.name.clone(),
                    source,
                })?;

            let restored = match entry.edm_type {
                EdmType::String => String::from_utf8(plaintext)
                    .map(|s| EntityProperty::String(Some(s)))
                    .map_err(|source| EncryptionError::InvalidUtf8 {
                        name: entry.name.clone(),
                        source,
                    })?,
                other => {
                    return Err(EncryptionError::InvalidMetadata(format!(
                        "property '{}' was recorded with unsupported kind {other}",
                        entry.name
                    )))
                }
            };

            entity.insert(entry.name.as_str(), restored);
        }

        debug!(
            "Decrypted ({pk}, {rk}) with key '{}'",
            data.wrapped_content_key.key_id
        );

        Ok(entity)
    }
}

async fn unwrap_content_key(
    data: &EncryptionData,
    key_resolver: &dyn KeyResolver,
) -> Result<ContentKey, EncryptionError> {
    let wrapped = &data.wrapped_content_key;

    let key = key_resolver
        .resolve_key(&wrapped.key_id)
        .await
        .map_err(|source| EncryptionError::KeyUnwrap {
            key_id: wrapped.key_id.clone(),
            source,
        })?
        .ok_or_else(|| EncryptionError::KeyNotFound(wrapped.key_id.clone()))?;

    let unwrapped = key
        .unwrap_key(&wrapped.encrypted_key, &wrapped.algorithm)
        .await
        .map(Zeroizing::new)
        .map_err(|source| EncryptionError::KeyUnwrap {
            key_id: wrapped.key_id.clone(),
            source,
        })?;

    ContentKey::from_slice(&unwrapped).map_err(|e| {
        EncryptionError::InvalidMetadata(format!("unwrapped content key is unusable: {e}"))
    })
}

/// The stored bytes of an encrypted value. Wire renditions without type information deliver
/// binary values as base64 strings.
fn ciphertext_bytes(name: &str, stored: EntityProperty) -> Result<Vec<u8>, EncryptionError> {
    let malformed = |reason: String| EncryptionError::Decryption {
        name: name.to_string(),
        source: CipherError::Malformed(reason),
    };

    match stored {
        EntityProperty::Binary(Some(bytes)) => Ok(bytes),
        EntityProperty::String(Some(encoded)) => {
            b64_decode(encoded).map_err(|e| malformed(format!("not valid base64: {e}")))
        }
        other => Err(malformed(format!("unexpected kind {}", other.edm_type()))),
    }
}

impl From<Entity> for Sealed {
    fn from(entity: Entity) -> Self {
        Self(entity)
    }
}
