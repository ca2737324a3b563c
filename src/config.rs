//! Environment-driven encryption configuration.
//!
//! ```no_run
//! # fn main() -> Result<(), tablecrypt::config::ConfigError> {
//! use tablecrypt::config::EncryptionConfig;
//!
//! // TABLECRYPT_KEY_ID=key1 TABLECRYPT_KEY=<base64>
//! let config = EncryptionConfig::builder().with_env().build()?;
//! let options = config.into_table_options();
//! # Ok(())
//! # }
//! ```

use crate::{
    crypto::{b64_decode, EncryptionPolicy, KeyError, SymmetricKey},
    options::TableRequestOptions,
};
use log::{info, warn};
use thiserror::Error;
use zeroize::Zeroizing;

pub const TABLECRYPT_KEY_ID: &str = "TABLECRYPT_KEY_ID";
pub const TABLECRYPT_KEY: &str = "TABLECRYPT_KEY";
pub const TABLECRYPT_REQUIRE_ENCRYPTION: &str = "TABLECRYPT_REQUIRE_ENCRYPTION";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Value not set: {0}")]
    ValueNotSet(&'static str),
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
    #[error("KeyError: {0}")]
    Key(#[from] KeyError),
}

/// Builder for [`EncryptionConfig`].
///
/// Values given explicitly take precedence over environment values regardless of the order in
/// which `with_env` and the setters are called.
#[derive(Default)]
pub struct EncryptionConfigBuilder {
    key_id: Option<String>,
    key: Option<Zeroizing<String>>,
    require_encryption: Option<bool>,
}

impl EncryptionConfigBuilder {
    pub fn with_env(mut self) -> Self {
        if self.key_id.is_none() {
            self.key_id = std::env::var(TABLECRYPT_KEY_ID).ok();
        }

        if self.key.is_none() {
            self.key = std::env::var(TABLECRYPT_KEY).ok().map(Zeroizing::new);
        }

        if self.require_encryption.is_none() {
            if let Ok(value) = std::env::var(TABLECRYPT_REQUIRE_ENCRYPTION) {
                self.require_encryption = Some(parse_bool(&value).unwrap_or_else(|| {
                    warn!(
                        "Ignoring {TABLECRYPT_REQUIRE_ENCRYPTION}={value:?}: expected true or false"
                    );
                    false
                }));
            }
        }

        self
    }

    pub fn key_id(mut self, value: &str) -> Self {
        self.key_id = Some(value.to_string());
        self
    }

    /// The raw key encoded as standard base64.
    pub fn key(mut self, value: &str) -> Self {
        self.key = Some(Zeroizing::new(value.to_string()));
        self
    }

    pub fn require_encryption(mut self, value: bool) -> Self {
        self.require_encryption = Some(value);
        self
    }

    pub fn build(self) -> Result<EncryptionConfig, ConfigError> {
        let key_id = self.key_id.ok_or(ConfigError::ValueNotSet(TABLECRYPT_KEY_ID))?;
        let encoded = self.key.ok_or(ConfigError::ValueNotSet(TABLECRYPT_KEY))?;

        let bytes = b64_decode(encoded.trim())
            .map(Zeroizing::new)
            .map_err(|e| ConfigError::InvalidValue {
                name: TABLECRYPT_KEY,
                reason: e.to_string(),
            })?;

        let key = SymmetricKey::from_bytes(key_id, &bytes)?;
        let require_encryption = self.require_encryption.unwrap_or(false);

        info!(
            "Loaded encryption key '{}' ({}), require_encryption={require_encryption}",
            key.key_id(),
            key.algorithm()
        );

        Ok(EncryptionConfig {
            key,
            require_encryption,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[derive(Debug)]
pub struct EncryptionConfig {
    key: SymmetricKey,
    require_encryption: bool,
}

impl EncryptionConfig {
    pub fn builder() -> EncryptionConfigBuilder {
        EncryptionConfigBuilder::default()
    }

    pub fn key(&self) -> &SymmetricKey {
        &self.key
    }

    pub fn require_encryption(&self) -> bool {
        self.require_encryption
    }

    pub fn into_policy(self) -> EncryptionPolicy {
        EncryptionPolicy::from_key(self.key)
    }

    /// Table options that encrypt and decrypt with the configured key.
    pub fn into_table_options(self) -> TableRequestOptions {
        let require_encryption = self.require_encryption;

        TableRequestOptions::new()
            .with_encryption_policy(self.into_policy())
            .with_require_encryption(require_encryption)
    }
}
