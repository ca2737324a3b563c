use crate::{
    crypto::EncryptionPolicy,
    resolver::{AnyOf, EncryptNothing, EncryptionResolver, PropertyList},
};
use std::{fmt, sync::Arc};

/// Options applied to a single table operation.
///
/// Options set on an [`EncryptedTable`](crate::EncryptedTable) act as defaults; any option set on
/// a request overrides the table default.
#[derive(Clone, Default)]
pub struct TableRequestOptions {
    encryption_policy: Option<Arc<EncryptionPolicy>>,
    encryption_resolver: Option<Arc<dyn EncryptionResolver>>,
    require_encryption: Option<bool>,
}

impl TableRequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encryption_policy(mut self, policy: EncryptionPolicy) -> Self {
        self.encryption_policy = Some(Arc::new(policy));
        self
    }

    pub fn with_shared_encryption_policy(mut self, policy: Arc<EncryptionPolicy>) -> Self {
        self.encryption_policy = Some(policy);
        self
    }

    pub fn with_encryption_resolver(mut self, resolver: impl EncryptionResolver + 'static) -> Self {
        self.encryption_resolver = Some(Arc::new(resolver));
        self
    }

    pub fn with_shared_encryption_resolver(
        mut self,
        resolver: Arc<dyn EncryptionResolver>,
    ) -> Self {
        self.encryption_resolver = Some(resolver);
        self
    }

    pub fn with_require_encryption(mut self, require: bool) -> Self {
        self.require_encryption = Some(require);
        self
    }

    pub fn encryption_policy(&self) -> Option<&EncryptionPolicy> {
        self.encryption_policy.as_deref()
    }

    pub fn encryption_resolver(&self) -> Option<&Arc<dyn EncryptionResolver>> {
        self.encryption_resolver.as_ref()
    }

    pub fn require_encryption(&self) -> bool {
        self.require_encryption.unwrap_or(false)
    }

    /// Overlay `self` on `defaults`: options set on `self` win.
    pub fn merged_with(&self, defaults: &TableRequestOptions) -> TableRequestOptions {
        TableRequestOptions {
            encryption_policy: self
                .encryption_policy
                .clone()
                .or_else(|| defaults.encryption_policy.clone()),
            encryption_resolver: self
                .encryption_resolver
                .clone()
                .or_else(|| defaults.encryption_resolver.clone()),
            require_encryption: self.require_encryption.or(defaults.require_encryption),
        }
    }

    /// The resolver for a write: the request resolver ORed with the properties a typed entity
    /// always encrypts.
    pub(crate) fn effective_resolver(
        &self,
        declared: &'static [&'static str],
    ) -> AnyOf<PropertyList, Arc<dyn EncryptionResolver>> {
        let resolver = self
            .encryption_resolver
            .clone()
            .unwrap_or_else(|| Arc::new(EncryptNothing));

        AnyOf(PropertyList::new(declared.iter().copied()), resolver)
    }
}

impl fmt::Debug for TableRequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableRequestOptions")
            .field("encryption_policy", &self.encryption_policy)
            .field("encryption_resolver", &self.encryption_resolver.is_some())
            .field("require_encryption", &self.require_encryption)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SymmetricKey;

    fn policy() -> EncryptionPolicy {
        EncryptionPolicy::from_key(SymmetricKey::generate("key1").unwrap())
    }

    #[test]
    fn test_request_options_win() {
        let defaults = TableRequestOptions::new()
            .with_encryption_policy(policy())
            .with_require_encryption(true);

        let merged = TableRequestOptions::new()
            .with_require_encryption(false)
            .merged_with(&defaults);

        assert!(merged.encryption_policy().is_some());
        assert!(!merged.require_encryption());
    }

    #[test]
    fn test_defaults_fill_gaps() {
        let defaults =
            TableRequestOptions::new().with_encryption_resolver(PropertyList::new(["foo"]));

        let merged = TableRequestOptions::new().merged_with(&defaults);

        assert!(merged.encryption_policy().is_none());
        assert!(merged.encryption_resolver().is_some());
        assert!(!merged.require_encryption());
    }

    #[test]
    fn test_effective_resolver_combines_declared_properties() {
        let options = TableRequestOptions::new()
            .with_encryption_resolver(|_: &str, _: &str, name: &str| name == "b");

        let resolver = options.effective_resolver(&["a"]);

        assert!(resolver.should_encrypt("pk", "rk", "a"));
        assert!(resolver.should_encrypt("pk", "rk", "b"));
        assert!(!resolver.should_encrypt("pk", "rk", "c"));
    }
}
