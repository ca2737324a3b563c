mod properties;
mod property;
pub mod property_name;

pub use self::{
    properties::Properties,
    property::{EdmType, EntityProperty, TryFromProperty},
};
use chrono::{DateTime, Utc};

/// A table entity: the partition and row key, the service assigned timestamp and etag, and a
/// bag of typed properties.
///
/// The partition and row key uniquely identify the entity within a table and are never
/// encrypted.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    partition_key: String,
    row_key: String,
    timestamp: Option<DateTime<Utc>>,
    etag: Option<String>,
    properties: Properties,
}

impl Entity {
    pub fn new(partition_key: impl Into<String>, row_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            row_key: row_key.into(),
            timestamp: None,
            etag: None,
            properties: Properties::new(),
        }
    }

    pub fn new_with_properties(
        partition_key: impl Into<String>,
        row_key: impl Into<String>,
        properties: Properties,
    ) -> Self {
        Self {
            properties,
            ..Self::new(partition_key, row_key)
        }
    }

    pub fn with_property(
        mut self,
        name: impl Into<String>,
        value: impl Into<EntityProperty>,
    ) -> Self {
        self.properties.insert(name, value);
        self
    }

    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<EntityProperty>,
    ) -> Option<EntityProperty> {
        self.properties.insert(name, value)
    }

    pub fn get(&self, name: &str) -> Option<&EntityProperty> {
        self.properties.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<EntityProperty> {
        self.properties.remove(name)
    }

    pub fn partition_key(&self) -> &str {
        &self.partition_key
    }

    pub fn row_key(&self) -> &str {
        &self.row_key
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    /// Split the entity into its partition key, row key and properties.
    pub fn into_key_parts(self) -> (String, String, Properties) {
        (self.partition_key, self.row_key, self.properties)
    }

    pub(crate) fn set_timestamp(&mut self, timestamp: DateTime<Utc>) {
        self.timestamp = Some(timestamp);
    }

    pub(crate) fn set_etag(&mut self, etag: Option<String>) {
        self.etag = etag;
    }

    pub(crate) fn replace_properties(&mut self, properties: Properties) -> Properties {
        std::mem::replace(&mut self.properties, properties)
    }

    /// The final filtering step applied to every entity before it crosses the public boundary.
    pub(crate) fn strip_shadow_properties(&mut self) {
        self.properties.strip_shadow_properties();
    }
}
