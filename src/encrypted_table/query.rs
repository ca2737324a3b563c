use super::{EncryptedTable, StoreQuery, TableStore};
use crate::{entity::Entity, errors::QueryError, traits::TableEntity};
use log::debug;

/// Builds and runs a query over an [`EncryptedTable`].
///
/// Every returned entity is decrypted with the table's options.
pub struct QueryBuilder<'t, S> {
    table: &'t EncryptedTable<S>,
    partition_key: Option<String>,
    select: Option<Vec<String>>,
    take: Option<usize>,
}

impl<'t, S: TableStore> QueryBuilder<'t, S> {
    pub fn new(table: &'t EncryptedTable<S>) -> Self {
        Self {
            table,
            partition_key: None,
            select: None,
            take: None,
        }
    }

    pub fn partition_key(mut self, partition_key: impl Into<String>) -> Self {
        self.partition_key = Some(partition_key.into());
        self
    }

    /// Only return the named properties.
    pub fn select<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.select = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn take(mut self, take: usize) -> Self {
        self.take = Some(take);
        self
    }

    pub async fn send(self) -> Result<Vec<Entity>, QueryError> {
        if self.select.as_ref().is_some_and(|s| s.is_empty()) {
            return Err(QueryError::InvalidQuery(
                "select must name at least one property".to_string(),
            ));
        }

        let query = StoreQuery {
            partition_key: self.partition_key,
            select: self
                .select
                .as_deref()
                .map(|select| self.table.store_projection(select)),
            take: self.take,
        };

        let stored = self.table.store.query(&query).await?;
        debug!("Query returned {} entities", stored.len());

        let mut results = Vec::with_capacity(stored.len());
        for entity in stored {
            let entity = match &self.select {
                Some(select) => {
                    self.table
                        .decrypt_projected(entity, select.as_slice())
                        .await?
                }
                None => self.table.decrypt(entity).await?,
            };
            results.push(entity);
        }

        Ok(results)
    }

    /// Run the query and convert every entity to `T`.
    pub async fn load<T: TableEntity>(self) -> Result<Vec<T>, QueryError> {
        self.send()
            .await?
            .into_iter()
            .map(|entity| T::from_entity(entity).map_err(QueryError::from))
            .collect()
    }
}
