//! Client-side encryption of table storage entity properties.
//!
//! Selected string properties of an entity are encrypted with a random content encryption key
//! (AES-256-GCM) before the entity is stored. The content key is wrapped with a key encryption key
//! (AES Key Wrap) and stored next to the entity together with an encrypted manifest of the
//! encrypted property names, in two reserved properties. On retrieval the key is resolved by its
//! identifier, unwrapped, and the properties are decrypted.
//!
//! ```
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use tablecrypt::{
//!     crypto::{EncryptionPolicy, SymmetricKey},
//!     resolver::PropertyList,
//!     EncryptedTable, Entity, MemoryStore, TableRequestOptions,
//! };
//!
//! let key = SymmetricKey::generate("key1")?;
//! let options = TableRequestOptions::new()
//!     .with_encryption_policy(EncryptionPolicy::from_key(key))
//!     .with_encryption_resolver(PropertyList::new(["ssn"]));
//!
//! let table = EncryptedTable::new(MemoryStore::new()).with_options(options);
//!
//! table
//!     .insert(Entity::new("people", "jane").with_property("ssn", "123-45-6789"))
//!     .await?;
//!
//! let jane = table.retrieve("people", "jane").await?.into_entity();
//! assert_eq!(
//!     jane.and_then(|e| e.get("ssn").and_then(|p| p.as_str().map(str::to_string))),
//!     Some("123-45-6789".to_string())
//! );
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod crypto;
pub mod encrypted_table;
pub mod entity;
pub mod errors;
pub mod options;
pub mod resolver;
pub mod traits;

pub use encrypted_table::{EncryptedTable, MemoryStore, TableResult, TableStore};
pub use entity::{EdmType, Entity, EntityProperty, Properties};
pub use options::TableRequestOptions;
pub use tablecrypt_derive::TableEntity;
pub use traits::TableEntity;
