//! Selection of the properties to encrypt.
//!
//! An [`EncryptionResolver`] is consulted once per property per write. Any
//! `Fn(&str, &str, &str) -> bool` closure taking the partition key, row key and property name is a
//! resolver. Resolvers must be pure: the answer for a given property may not change during a
//! single operation.

use std::{collections::HashSet, sync::Arc};

pub trait EncryptionResolver: Send + Sync {
    fn should_encrypt(&self, partition_key: &str, row_key: &str, property_name: &str) -> bool;
}

impl<F> EncryptionResolver for F
where
    F: Fn(&str, &str, &str) -> bool + Send + Sync,
{
    fn should_encrypt(&self, partition_key: &str, row_key: &str, property_name: &str) -> bool {
        self(partition_key, row_key, property_name)
    }
}

impl EncryptionResolver for Arc<dyn EncryptionResolver> {
    fn should_encrypt(&self, partition_key: &str, row_key: &str, property_name: &str) -> bool {
        self.as_ref()
            .should_encrypt(partition_key, row_key, property_name)
    }
}

/// Resolver that never selects a property.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncryptNothing;

impl EncryptionResolver for EncryptNothing {
    fn should_encrypt(&self, _: &str, _: &str, _: &str) -> bool {
        false
    }
}

/// Selects properties by name regardless of the entity keys.
///
/// This is how the descriptor table generated by `#[derive(TableEntity)]` is applied.
#[derive(Debug, Clone, Default)]
pub struct PropertyList(HashSet<String>);

impl PropertyList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl EncryptionResolver for PropertyList {
    fn should_encrypt(&self, _: &str, _: &str, property_name: &str) -> bool {
        self.0.contains(property_name)
    }
}

/// Logical OR of two resolvers: a property is encrypted if either selects it.
#[derive(Debug, Clone)]
pub struct AnyOf<A, B>(pub A, pub B);

impl<A, B> EncryptionResolver for AnyOf<A, B>
where
    A: EncryptionResolver,
    B: EncryptionResolver,
{
    fn should_encrypt(&self, partition_key: &str, row_key: &str, property_name: &str) -> bool {
        self.0.should_encrypt(partition_key, row_key, property_name)
            || self.1.should_encrypt(partition_key, row_key, property_name)
    }
}

pub trait EncryptionResolverExt: EncryptionResolver + Sized {
    fn or<R: EncryptionResolver>(self, other: R) -> AnyOf<Self, R> {
        AnyOf(self, other)
    }
}

impl<R: EncryptionResolver> EncryptionResolverExt for R {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_resolver() {
        let resolver = |_: &str, _: &str, name: &str| name.starts_with("foo");

        assert!(resolver.should_encrypt("pk", "rk", "foo2"));
        assert!(!resolver.should_encrypt("pk", "rk", "bar"));
    }

    #[test]
    fn test_key_aware_closure() {
        let resolver = |pk: &str, _: &str, name: &str| pk == "secret" && name == "foo";

        assert!(resolver.should_encrypt("secret", "rk", "foo"));
        assert!(!resolver.should_encrypt("public", "rk", "foo"));
    }

    #[test]
    fn test_property_list() {
        let list = PropertyList::new(["a", "b"]);

        assert!(list.should_encrypt("pk", "rk", "a"));
        assert!(!list.should_encrypt("pk", "rk", "A"));
        assert!(!PropertyList::default().should_encrypt("pk", "rk", "a"));
    }

    #[test]
    fn test_or() {
        let resolver = PropertyList::new(["a"]).or(|_: &str, _: &str, name: &str| name == "b");

        assert!(resolver.should_encrypt("pk", "rk", "a"));
        assert!(resolver.should_encrypt("pk", "rk", "b"));
        assert!(!resolver.should_encrypt("pk", "rk", "c"));
    }

    #[test]
    fn test_shared_resolver() {
        let shared: Arc<dyn EncryptionResolver> = Arc::new(PropertyList::new(["a"]));
        let combined = EncryptNothing.or(shared.clone());

        assert!(combined.should_encrypt("pk", "rk", "a"));
    }
}
