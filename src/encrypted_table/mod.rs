pub mod query;
mod store;
mod table_result;

pub use self::{
    query::QueryBuilder,
    store::{MemoryStore, StoreError, StoreQuery, TableStore, WriteMode},
    table_result::TableResult,
};
use crate::{
    crypto::{EncryptionError, Sealed},
    entity::{property_name::is_reserved, Entity},
    errors::{DeleteError, GetError, PutError},
    options::TableRequestOptions,
    traits::TableEntity,
};
use log::{debug, info};
use std::sync::Arc;

/// A table whose entities are encrypted on write and decrypted on read according to the
/// configured [`TableRequestOptions`].
///
/// Cloning is cheap and clones share the underlying store.
pub struct EncryptedTable<S> {
    store: Arc<S>,
    options: TableRequestOptions,
}

impl<S> Clone for EncryptedTable<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            options: self.options.clone(),
        }
    }
}

impl<S: TableStore> EncryptedTable<S> {
    pub fn new(store: S) -> Self {
        Self::new_shared(Arc::new(store))
    }

    pub fn new_shared(store: Arc<S>) -> Self {
        info!("Initializing encrypted table");

        Self {
            store,
            options: TableRequestOptions::default(),
        }
    }

    /// Set the default options applied to every operation on this table.
    pub fn with_options(mut self, options: TableRequestOptions) -> Self {
        self.options = options;
        self
    }

    /// A handle on the same store whose operations use `options` over this table's defaults.
    pub fn with_request_options(&self, options: &TableRequestOptions) -> Self {
        Self {
            store: self.store.clone(),
            options: options.merged_with(&self.options),
        }
    }

    pub fn options(&self) -> &TableRequestOptions {
        &self.options
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn insert(&self, entity: Entity) -> Result<TableResult, PutError> {
        self.write(WriteMode::Insert, entity, &[]).await
    }

    pub async fn insert_or_replace(&self, entity: Entity) -> Result<TableResult, PutError> {
        self.write(WriteMode::InsertOrReplace, entity, &[]).await
    }

    /// Replace an existing entity. The entity's etag, if any, must match the stored one.
    pub async fn replace(&self, entity: Entity) -> Result<TableResult, PutError> {
        self.write(WriteMode::Replace, entity, &[]).await
    }

    /// Merge properties into an existing entity. Not available when an encryption policy is in
    /// effect.
    pub async fn merge(&self, entity: Entity) -> Result<TableResult, PutError> {
        self.write(WriteMode::Merge, entity, &[]).await
    }

    /// Not available when an encryption policy is in effect.
    pub async fn insert_or_merge(&self, entity: Entity) -> Result<TableResult, PutError> {
        self.write(WriteMode::InsertOrMerge, entity, &[]).await
    }

    /// Store a typed record, encrypting the fields it declares as encrypted in addition to those
    /// selected by the configured resolver.
    pub async fn put<T: TableEntity>(&self, record: T) -> Result<TableResult, PutError> {
        let entity = record.into_entity()?;
        self.write(WriteMode::InsertOrReplace, entity, T::encrypted_properties())
            .await
    }

    pub async fn retrieve(
        &self,
        partition_key: &str,
        row_key: &str,
    ) -> Result<TableResult, GetError> {
        let Some(stored) = self.store.retrieve(partition_key, row_key, None).await? else {
            return Ok(TableResult::not_found());
        };

        let entity = self.decrypt(stored).await?;
        Ok(TableResult::new(200, Some(entity)))
    }

    /// Retrieve only the `select`ed properties of an entity.
    pub async fn retrieve_projected<Sel: AsRef<str>>(
        &self,
        partition_key: &str,
        row_key: &str,
        select: &[Sel],
    ) -> Result<TableResult, GetError> {
        let columns = self.store_projection(select);

        let Some(stored) = self
            .store
            .retrieve(partition_key, row_key, Some(columns.as_slice()))
            .await?
        else {
            return Ok(TableResult::not_found());
        };

        let entity = self.decrypt_projected(stored, select).await?;
        Ok(TableResult::new(200, Some(entity)))
    }

    pub async fn get<T: TableEntity>(
        &self,
        partition_key: &str,
        row_key: &str,
    ) -> Result<Option<T>, GetError> {
        self.retrieve(partition_key, row_key)
            .await?
            .into_entity()
            .map(T::from_entity)
            .transpose()
            .map_err(GetError::from)
    }

    /// Delete an entity regardless of its etag.
    pub async fn delete(
        &self,
        partition_key: &str,
        row_key: &str,
    ) -> Result<TableResult, DeleteError> {
        self.store.delete(partition_key, row_key, None).await?;
        debug!("Deleted ({partition_key}, {row_key})");
        Ok(TableResult::new(204, None))
    }

    /// Delete an entity if its stored etag matches the etag of `entity`.
    pub async fn delete_entity(&self, entity: &Entity) -> Result<TableResult, DeleteError> {
        self.store
            .delete(entity.partition_key(), entity.row_key(), entity.etag())
            .await?;
        Ok(TableResult::new(204, None))
    }

    pub fn query(&self) -> QueryBuilder<'_, S> {
        QueryBuilder::new(self)
    }

    async fn write(
        &self,
        mode: WriteMode,
        entity: Entity,
        declared: &'static [&'static str],
    ) -> Result<TableResult, PutError> {
        let mut result = entity.clone();
        let stored = self.encrypt(mode, entity, declared).await?;
        let stored = self.store.write(mode, stored).await?;

        result.set_etag(stored.etag().map(str::to_string));
        if let Some(timestamp) = stored.timestamp() {
            result.set_timestamp(timestamp);
        }

        Ok(TableResult::new(mode.status_code(), Some(result)))
    }

    /// Turn a caller's entity into its stored form. Nothing is sent to the store if this fails.
    async fn encrypt(
        &self,
        mode: WriteMode,
        entity: Entity,
        declared: &'static [&'static str],
    ) -> Result<Entity, EncryptionError> {
        let Some(policy) = self.options.encryption_policy() else {
            if self.options.require_encryption() {
                return Err(EncryptionError::Configuration(
                    "require_encryption is set but no encryption policy is configured".to_string(),
                ));
            }

            if !declared.is_empty() {
                return Err(EncryptionError::Configuration(format!(
                    "properties {declared:?} must be encrypted but no encryption policy is configured"
                )));
            }

            if let Some(name) = entity.properties().names().find(|n| is_reserved(n)) {
                return Err(EncryptionError::ReservedProperty(name.to_string()));
            }

            return Ok(entity);
        };

        if mode.is_merge() {
            return Err(EncryptionError::Configuration(format!(
                "{mode:?} is not supported when an encryption policy is in effect"
            )));
        }

        let resolver = self.options.effective_resolver(declared);
        let sealed = policy.encrypt_entity(entity, &resolver).await?;

        Ok(sealed.into_inner())
    }

    pub(crate) async fn decrypt(&self, stored: Entity) -> Result<Entity, EncryptionError> {
        match self.options.encryption_policy() {
            Some(policy) => {
                policy
                    .decrypt_entity(Sealed::from(stored), self.options.require_encryption())
                    .await
            }
            None => self.without_policy(stored),
        }
    }

    pub(crate) async fn decrypt_projected<Sel: AsRef<str>>(
        &self,
        stored: Entity,
        select: &[Sel],
    ) -> Result<Entity, EncryptionError> {
        match self.options.encryption_policy() {
            Some(policy) => {
                policy
                    .decrypt_projected(
                        Sealed::from(stored),
                        select,
                        self.options.require_encryption(),
                    )
                    .await
            }
            None => self.without_policy(stored),
        }
    }

    /// The columns to request from the store for a projection.
    pub(crate) fn store_projection<Sel: AsRef<str>>(&self, select: &[Sel]) -> Vec<String> {
        match self.options.encryption_policy() {
            Some(policy) => policy.augment_projection(select),
            None => select.iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }

    fn without_policy(&self, mut stored: Entity) -> Result<Entity, EncryptionError> {
        if self.options.require_encryption() {
            return Err(EncryptionError::Configuration(
                "require_encryption is set but no encryption policy is configured".to_string(),
            ));
        }

        stored.strip_shadow_properties();
        Ok(stored)
    }
}
