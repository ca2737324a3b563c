pub use crate::entity::{EntityProperty, TryFromProperty};

use crate::entity::Entity;
use std::fmt::Debug;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadConversionError {
    #[error("Failed to convert property: {0} from EntityProperty")]
    ConversionFailed(String),
}

#[derive(Debug, Error)]
pub enum WriteConversionError {
    #[error("Failed to convert property: '{0}' to EntityProperty")]
    ConversionFailed(String),
}

/// A Rust type stored as a table entity.
///
/// Usually implemented with `#[derive(TableEntity)]`, which also produces the list of properties
/// to encrypt from `#[tablecrypt(encrypt)]` field attributes.
pub trait TableEntity: Debug + Sized {
    fn partition_key(&self) -> String;

    fn row_key(&self) -> String;

    /// Stored names of the properties that are always encrypted for this type.
    fn encrypted_properties() -> &'static [&'static str] {
        &[]
    }

    fn into_entity(self) -> Result<Entity, WriteConversionError>;

    /// Rebuild `Self` from a decrypted entity. Properties absent from the entity (for example
    /// because a projection did not select them) fall back to `Default`.
    fn from_entity(entity: Entity) -> Result<Self, ReadConversionError>;
}
