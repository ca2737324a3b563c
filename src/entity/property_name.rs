//! Reserved property names.
//!
//! The table service stores the keys and timestamp as system properties, and encrypted entities
//! carry two shadow properties holding the encryption metadata. None of these may appear as
//! ordinary user properties.

/// Shadow property holding the wrapped content key and the algorithms used.
pub const ENCRYPTION_METADATA: &str = "_ClientEncryptionMetadata1";

/// Shadow property holding the encrypted manifest of encrypted property names and kinds.
pub const ENCRYPTION_MANIFEST: &str = "_ClientEncryptionMetadata2";

pub const SHADOW_PROPERTIES: [&str; 2] = [ENCRYPTION_METADATA, ENCRYPTION_MANIFEST];

pub const PARTITION_KEY: &str = "PartitionKey";
pub const ROW_KEY: &str = "RowKey";
pub const TIMESTAMP: &str = "Timestamp";

pub const SYSTEM_PROPERTIES: [&str; 3] = [PARTITION_KEY, ROW_KEY, TIMESTAMP];

#[inline]
pub fn is_shadow_property(name: &str) -> bool {
    SHADOW_PROPERTIES.contains(&name)
}

#[inline]
pub fn is_system_property(name: &str) -> bool {
    SYSTEM_PROPERTIES.contains(&name)
}

/// Returns true if `name` cannot be used for a user property.
#[inline]
pub fn is_reserved(name: &str) -> bool {
    is_shadow_property(name) || is_system_property(name)
}
