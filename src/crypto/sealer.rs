use super::{
    cipher::property_aad, metadata::Manifest, ContentKey, EncryptionData, EncryptionError,
    KeyWrapper, Sealed,
};
use crate::{
    entity::{
        property_name::{is_reserved, ENCRYPTION_MANIFEST, ENCRYPTION_METADATA},
        EdmType, Entity, EntityProperty,
    },
    resolver::EncryptionResolver,
};
use itertools::Itertools;
use log::debug;

/// Encrypts the selected properties of an entity and attaches the encryption metadata.
pub struct Sealer {
    inner: Entity,
}

impl Sealer {
    pub fn new(inner: Entity) -> Self {
        Self { inner }
    }

    /// Names of the properties `resolver` selects for encryption, in a stable order.
    pub fn selected_properties(&self, resolver: &dyn EncryptionResolver) -> Vec<String> {
        let (pk, rk) = (self.inner.partition_key(), self.inner.row_key());

        self.inner
            .properties()
            .names()
            .filter(|name| resolver.should_encrypt(pk, rk, name))
            .sorted()
            .map(str::to_string)
            .collect()
    }

    /// Reject shadow and system names, then check that every selected property is a non-null
    /// string. Runs to completion before anything is encrypted.
    fn validate(&self, selected: &[String]) -> Result<(), EncryptionError> {
        if let Some(name) = self.inner.properties().names().find(|name| is_reserved(name)) {
            return Err(EncryptionError::ReservedProperty(name.to_string()));
        }

        for name in selected {
            match self.inner.get(name) {
                Some(EntityProperty::String(Some(_))) => {}
                Some(other) => {
                    return Err(EncryptionError::Ineligible {
                        name: name.clone(),
                        edm_type: other.edm_type(),
                        is_null: other.is_null(),
                    })
                }
                None => {
                    return Err(EncryptionError::Configuration(format!(
                        "selected property '{name}' does not exist"
                    )))
                }
            }
        }

        Ok(())
    }

    /// Encrypt every property `resolver` selects under a fresh content key wrapped with
    /// `wrap_key`.
    ///
    /// An entity with no selected properties is passed through without metadata and without
    /// requiring a wrap key.
    pub async fn seal(
        self,
        wrap_key: Option<&dyn KeyWrapper>,
        resolver: &dyn EncryptionResolver,
    ) -> Result<Sealed, EncryptionError> {
        let selected = self.selected_properties(resolver);
        self.validate(&selected)?;

        if selected.is_empty() {
            debug!(
                "No properties selected for encryption on ({}, {})",
                self.inner.partition_key(),
                self.inner.row_key()
            );
            return Ok(Sealed(self.inner));
        }

        let wrap_key = wrap_key.ok_or_else(|| {
            EncryptionError::Configuration(format!(
                "{} properties were selected for encryption but the encryption policy has no wrap key",
                selected.len()
            ))
        })?;

        let mut entity = self.inner;
        let pk = entity.partition_key().to_string();
        let rk = entity.row_key().to_string();

        let cek = ContentKey::generate().map_err(|source| EncryptionError::Encryption {
            name: ENCRYPTION_METADATA.to_string(),
            source,
        })?;

        let mut manifest = Manifest::new();

        for name in selected {
            let Some(EntityProperty::String(Some(plaintext))) = entity.remove(&name) else {
                return Err(EncryptionError::Configuration(format!(
                    "selected property '{name}' changed during encryption"
                )));
            };

            let ciphertext = cek
                .encrypt(plaintext.as_bytes(), &property_aad(&pk, &rk, &name))
                .map_err(|source| EncryptionError::Encryption {
                    name: name.clone(),
                    source,
                })?;

            entity.insert(name.as_str(), ciphertext);
            manifest.push(name, EdmType::String);
        }

        let encrypted_manifest = cek
            .encrypt(
                &manifest.to_bytes()?,
                &property_aad(&pk, &rk, ENCRYPTION_MANIFEST),
            )
            .map_err(|source| EncryptionError::Encryption {
                name: ENCRYPTION_MANIFEST.to_string(),
                source,
            })?;

        let algorithm = wrap_key.default_wrap_algorithm().to_string();
        let wrapped_key = wrap_key
            .wrap_key(cek.as_bytes(), &algorithm)
            .await
            .map_err(|source| EncryptionError::KeyWrap {
                key_id: wrap_key.key_id().to_string(),
                source,
            })?;

        let metadata = EncryptionData::new(wrap_key.key_id(), wrapped_key, algorithm);

        entity.insert(ENCRYPTION_METADATA, metadata.to_json()?);
        entity.insert(ENCRYPTION_MANIFEST, encrypted_manifest);

        debug!(
            "Encrypted {} properties on ({pk}, {rk}) with key '{}'",
            manifest.len(),
            wrap_key.key_id()
        );

        Ok(Sealed(entity))
    }
}
