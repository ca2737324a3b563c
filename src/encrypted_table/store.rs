use crate::entity::Entity;
use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use thiserror::Error;

/// The kind of write sent to a [`TableStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Fails with a conflict if the entity exists.
    Insert,
    InsertOrReplace,
    /// Fails if the entity is missing or its etag does not match.
    Replace,
    /// Adds and overwrites properties on an existing entity, keeping the others.
    Merge,
    InsertOrMerge,
}

impl WriteMode {
    pub fn is_merge(&self) -> bool {
        matches!(self, Self::Merge | Self::InsertOrMerge)
    }

    /// Status code of a successful write.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Insert => 201,
            _ => 204,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Entity ({partition_key}, {row_key}) not found")]
    NotFound {
        partition_key: String,
        row_key: String,
    },
    #[error("Entity ({partition_key}, {row_key}) already exists")]
    Conflict {
        partition_key: String,
        row_key: String,
    },
    #[error("Etag mismatch for entity ({partition_key}, {row_key})")]
    PreconditionFailed {
        partition_key: String,
        row_key: String,
    },
    #[error("StoreError: {0}")]
    Other(String),
}

impl StoreError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Conflict { .. } => 409,
            Self::PreconditionFailed { .. } => 412,
            Self::Other(_) => 500,
        }
    }
}

/// A store-side query: an optional partition key filter, projection and row limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreQuery {
    pub partition_key: Option<String>,
    pub select: Option<Vec<String>>,
    pub take: Option<usize>,
}

/// Transport for entities in their stored form.
///
/// Implementations assign the timestamp and etag on every write and apply projections before
/// returning entities. Encryption happens before entities reach the store.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Write `entity` and return it as stored. The etag carried by `entity` is the `If-Match`
    /// condition for replace and merge; `None` or `"*"` matches any etag.
    async fn write(&self, mode: WriteMode, entity: Entity) -> Result<Entity, StoreError>;

    async fn delete(
        &self,
        partition_key: &str,
        row_key: &str,
        if_match: Option<&str>,
    ) -> Result<(), StoreError>;

    async fn retrieve(
        &self,
        partition_key: &str,
        row_key: &str,
        select: Option<&[String]>,
    ) -> Result<Option<Entity>, StoreError>;

    async fn query(&self, query: &StoreQuery) -> Result<Vec<Entity>, StoreError>;
}

type Key = (String, String);

/// An in-process [`TableStore`], ordered by partition key then row key.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entities: RwLock<BTreeMap<Key, Entity>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entities.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.read().is_empty()
    }

    /// The stored form of an entity, without projection.
    pub fn get_raw(&self, partition_key: &str, row_key: &str) -> Option<Entity> {
        self.entities
            .read()
            .get(&(partition_key.to_string(), row_key.to_string()))
            .cloned()
    }

    /// Overwrite the stored form of an entity, bypassing etags. Useful to simulate
    /// data written by other clients.
    pub fn put_raw(&self, entity: Entity) {
        let key = (
            entity.partition_key().to_string(),
            entity.row_key().to_string(),
        );
        self.entities.write().insert(key, entity);
    }

    fn write_sync(&self, mode: WriteMode, mut entity: Entity) -> Result<Entity, StoreError> {
        let key = (
            entity.partition_key().to_string(),
            entity.row_key().to_string(),
        );
        let mut entities = self.entities.write();
        let existing = entities.get(&key);

        match (mode, existing) {
            (WriteMode::Insert, Some(_)) => return Err(conflict(&key)),
            (WriteMode::Replace | WriteMode::Merge, None) => return Err(not_found(&key)),
            (WriteMode::Replace | WriteMode::Merge, Some(existing)) => {
                if !etag_matches(entity.etag(), existing.etag()) {
                    return Err(precondition_failed(&key));
                }
            }
            _ => {}
        }

        if mode.is_merge() {
            if let Some(existing) = existing {
                let merged = existing
                    .properties()
                    .clone()
                    .merge(entity.properties().clone());
                entity.replace_properties(merged);
            }
        }

        entity.set_timestamp(Utc::now());
        entity.set_etag(Some(new_etag()));
        entities.insert(key, entity.clone());

        Ok(entity)
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn write(&self, mode: WriteMode, entity: Entity) -> Result<Entity, StoreError> {
        debug!(
            "{mode:?} ({}, {}) with {} properties",
            entity.partition_key(),
            entity.row_key(),
            entity.properties().len()
        );

        self.write_sync(mode, entity)
    }

    async fn delete(
        &self,
        partition_key: &str,
        row_key: &str,
        if_match: Option<&str>,
    ) -> Result<(), StoreError> {
        let key = (partition_key.to_string(), row_key.to_string());
        let mut entities = self.entities.write();

        let existing = entities.get(&key).ok_or_else(|| not_found(&key))?;
        if !etag_matches(if_match, existing.etag()) {
            return Err(precondition_failed(&key));
        }

        entities.remove(&key);
        Ok(())
    }

    async fn retrieve(
        &self,
        partition_key: &str,
        row_key: &str,
        select: Option<&[String]>,
    ) -> Result<Option<Entity>, StoreError> {
        Ok(self
            .get_raw(partition_key, row_key)
            .map(|entity| project(entity, select)))
    }

    async fn query(&self, query: &StoreQuery) -> Result<Vec<Entity>, StoreError> {
        let entities = self.entities.read();

        Ok(entities
            .values()
            .filter(|e| {
                query
                    .partition_key
                    .as_deref()
                    .map_or(true, |pk| e.partition_key() == pk)
            })
            .take(query.take.unwrap_or(usize::MAX))
            .cloned()
            .map(|e| project(e, query.select.as_deref()))
            .collect())
    }
}

fn project(mut entity: Entity, select: Option<&[String]>) -> Entity {
    if let Some(select) = select {
        entity
            .properties_mut()
            .retain(|name| select.iter().any(|s| s == name));
    }

    entity
}

fn etag_matches(if_match: Option<&str>, current: Option<&str>) -> bool {
    match if_match {
        None | Some("*") => true,
        Some(expected) => current == Some(expected),
    }
}

fn new_etag() -> String {
    format!("W/\"{}\"", uuid::Uuid::new_v4())
}

fn not_found((partition_key, row_key): &Key) -> StoreError {
    StoreError::NotFound {
        partition_key: partition_key.clone(),
        row_key: row_key.clone(),
    }
}

fn conflict((partition_key, row_key): &Key) -> StoreError {
    StoreError::Conflict {
        partition_key: partition_key.clone(),
        row_key: row_key.clone(),
    }
}

fn precondition_failed((partition_key, row_key): &Key) -> StoreError {
    StoreError::PreconditionFailed {
        partition_key: partition_key.clone(),
        row_key: row_key.clone(),
    }
}
