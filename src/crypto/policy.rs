use super::{EncryptionError, KeyResolver, KeyWrapper, Sealed, Sealer, SymmetricKey};
use crate::{
    entity::{property_name::SHADOW_PROPERTIES, Entity},
    resolver::EncryptionResolver,
};
use std::{fmt, sync::Arc};

/// Encrypt-on-write and decrypt-on-read configuration.
///
/// A policy needs a wrap key to encrypt, a key resolver to decrypt, and at least one of the two
/// to exist. It holds no per-request state: a single policy can be shared by any number of
/// concurrent operations.
#[derive(Clone)]
pub struct EncryptionPolicy {
    wrap_key: Option<Arc<dyn KeyWrapper>>,
    key_resolver: Option<Arc<dyn KeyResolver>>,
}

impl EncryptionPolicy {
    pub fn builder() -> EncryptionPolicyBuilder {
        EncryptionPolicyBuilder::default()
    }

    pub fn new(
        wrap_key: Option<Arc<dyn KeyWrapper>>,
        key_resolver: Option<Arc<dyn KeyResolver>>,
    ) -> Result<Self, EncryptionError> {
        if wrap_key.is_none() && key_resolver.is_none() {
            return Err(EncryptionError::Configuration(
                "an encryption policy requires a wrap key, a key resolver or both".to_string(),
            ));
        }

        Ok(Self {
            wrap_key,
            key_resolver,
        })
    }

    /// A policy that wraps with `key` and resolves only `key` when decrypting.
    pub fn from_key(key: SymmetricKey) -> Self {
        let key = Arc::new(key);

        Self {
            wrap_key: Some(key.clone()),
            key_resolver: Some(Arc::new(key)),
        }
    }

    pub fn wrap_key(&self) -> Option<&Arc<dyn KeyWrapper>> {
        self.wrap_key.as_ref()
    }

    pub fn key_resolver(&self) -> Option<&Arc<dyn KeyResolver>> {
        self.key_resolver.as_ref()
    }

    pub fn can_encrypt(&self) -> bool {
        self.wrap_key.is_some()
    }

    pub fn can_decrypt(&self) -> bool {
        self.key_resolver.is_some()
    }

    /// Encrypt the properties of `entity` that `resolver` selects.
    pub async fn encrypt_entity(
        &self,
        entity: Entity,
        resolver: &dyn EncryptionResolver,
    ) -> Result<Sealed, EncryptionError> {
        Sealer::new(entity)
            .seal(self.wrap_key.as_deref(), resolver)
            .await
    }

    /// Decrypt a stored entity.
    pub async fn decrypt_entity(
        &self,
        sealed: Sealed,
        require_encryption: bool,
    ) -> Result<Entity, EncryptionError> {
        sealed
            .unseal(self.key_resolver.as_deref(), require_encryption)
            .await
    }

    /// Decrypt a stored entity retrieved with a projection and limit the result to the `select`ed
    /// properties.
    pub async fn decrypt_projected<S: AsRef<str>>(
        &self,
        sealed: Sealed,
        select: &[S],
        require_encryption: bool,
    ) -> Result<Entity, EncryptionError> {
        let mut entity = self.decrypt_entity(sealed, require_encryption).await?;
        entity
            .properties_mut()
            .retain(|name| select.iter().any(|s| s.as_ref() == name));
        Ok(entity)
    }

    /// Extend a projection with the shadow properties needed to decrypt the result.
    pub fn augment_projection<S: AsRef<str>>(&self, select: &[S]) -> Vec<String> {
        let mut columns: Vec<String> = select.iter().map(|s| s.as_ref().to_string()).collect();

        for shadow in SHADOW_PROPERTIES {
            if !columns.iter().any(|c| c == shadow) {
                columns.push(shadow.to_string());
            }
        }

        columns
    }
}

impl fmt::Debug for EncryptionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionPolicy")
            .field("wrap_key", &self.wrap_key.as_ref().map(|k| k.key_id()))
            .field("key_resolver", &self.key_resolver.is_some())
            .finish()
    }
}

#[derive(Default)]
pub struct EncryptionPolicyBuilder {
    wrap_key: Option<Arc<dyn KeyWrapper>>,
    key_resolver: Option<Arc<dyn KeyResolver>>,
}

impl EncryptionPolicyBuilder {
    pub fn wrap_key(mut self, key: impl KeyWrapper + 'static) -> Self {
        self.wrap_key = Some(Arc::new(key));
        self
    }

    pub fn wrap_key_shared(mut self, key: Arc<dyn KeyWrapper>) -> Self {
        self.wrap_key = Some(key);
        self
    }

    pub fn key_resolver(mut self, resolver: impl KeyResolver + 'static) -> Self {
        self.key_resolver = Some(Arc::new(resolver));
        self
    }

    pub fn key_resolver_shared(mut self, resolver: Arc<dyn KeyResolver>) -> Self {
        self.key_resolver = Some(resolver);
        self
    }

    pub fn build(self) -> Result<EncryptionPolicy, EncryptionError> {
        EncryptionPolicy::new(self.wrap_key, self.key_resolver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        crypto::{ErrorKind, KeyRing},
        entity::{
            property_name::{ENCRYPTION_MANIFEST, ENCRYPTION_METADATA},
            EntityProperty,
        },
        resolver::{EncryptNothing, PropertyList},
    };

    fn entity() -> Entity {
        Entity::new("pk", "rk")
            .with_property("foo", "bar")
            .with_property("foo2", "")
            .with_property("fooint", 1234)
    }

    fn foo_resolver() -> PropertyList {
        PropertyList::new(["foo", "foo2"])
    }

    #[test]
    fn test_empty_policy_is_invalid() {
        let err = EncryptionPolicy::builder().build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_round_trip() {
        let policy = EncryptionPolicy::from_key(SymmetricKey::generate("key1").unwrap());

        let sealed = policy
            .encrypt_entity(entity(), &foo_resolver())
            .await
            .unwrap();

        let stored = sealed.inner();
        assert!(sealed.is_encrypted());
        assert!(matches!(stored.get("foo"), Some(EntityProperty::Binary(Some(_)))));
        assert!(matches!(stored.get("foo2"), Some(EntityProperty::Binary(Some(_)))));
        assert_eq!(stored.get("fooint"), Some(&EntityProperty::Int32(Some(1234))));
        assert!(matches!(
            stored.get(ENCRYPTION_METADATA),
            Some(EntityProperty::String(Some(_)))
        ));
        assert!(matches!(
            stored.get(ENCRYPTION_MANIFEST),
            Some(EntityProperty::Binary(Some(_)))
        ));

        let decrypted = policy.decrypt_entity(sealed, false).await.unwrap();
        assert_eq!(decrypted, entity());
    }

    #[tokio::test]
    async fn test_same_plaintext_encrypts_differently() {
        let policy = EncryptionPolicy::from_key(SymmetricKey::generate("key1").unwrap());
        let entity = Entity::new("pk", "rk")
            .with_property("foo", "bar")
            .with_property("foo2", "bar");

        let sealed = policy
            .encrypt_entity(entity, &foo_resolver())
            .await
            .unwrap();

        let foo = sealed.inner().get("foo").and_then(|p| p.as_bytes()).unwrap();
        let foo2 = sealed.inner().get("foo2").and_then(|p| p.as_bytes()).unwrap();
        assert_ne!(foo, foo2);
    }

    #[tokio::test]
    async fn test_nothing_selected_needs_no_wrap_key() {
        let policy = EncryptionPolicy::builder()
            .key_resolver(KeyRing::new())
            .build()
            .unwrap();

        let sealed = policy.encrypt_entity(entity(), &EncryptNothing).await.unwrap();

        assert!(!sealed.is_encrypted());
        assert_eq!(sealed.into_inner(), entity());
    }

    #[tokio::test]
    async fn test_selected_without_wrap_key_fails() {
        let policy = EncryptionPolicy::builder()
            .key_resolver(KeyRing::new())
            .build()
            .unwrap();

        let err = policy
            .encrypt_entity(entity(), &foo_resolver())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_decrypt_without_resolver_leaves_binary() {
        let key = SymmetricKey::generate("key1").unwrap();
        let writer = EncryptionPolicy::builder().wrap_key(key).build().unwrap();

        let sealed = writer.encrypt_entity(entity(), &foo_resolver()).await.unwrap();
        let opaque = writer.decrypt_entity(sealed, false).await.unwrap();

        assert!(matches!(opaque.get("foo"), Some(EntityProperty::Binary(Some(_)))));
        assert!(opaque.get(ENCRYPTION_METADATA).is_none());
        assert!(opaque.get(ENCRYPTION_MANIFEST).is_none());
    }

    #[tokio::test]
    async fn test_augment_projection() {
        let policy = EncryptionPolicy::from_key(SymmetricKey::generate("key1").unwrap());

        let columns = policy.augment_projection(&["foo", ENCRYPTION_MANIFEST]);
        assert_eq!(columns, vec!["foo", ENCRYPTION_MANIFEST, ENCRYPTION_METADATA]);
    }

    #[test]
    fn test_debug_shows_key_id_only() {
        let policy = EncryptionPolicy::from_key(SymmetricKey::generate("key1").unwrap());
        let debug = format!("{policy:?}");
        assert!(debug.contains("key1"));
    }
}
