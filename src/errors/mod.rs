use thiserror::Error;

pub use crate::{
    config::ConfigError,
    crypto::{CipherError, EncryptionError, ErrorKind, KeyError},
    encrypted_table::StoreError,
    traits::{ReadConversionError, WriteConversionError},
};

/// Error returned by the write operations of [`EncryptedTable`](crate::EncryptedTable) when
/// encrypting and storing entities
#[derive(Error, Debug)]
pub enum PutError {
    #[error("StoreError: {0}")]
    Store(#[from] StoreError),
    #[error("Write Conversion Error: {0}")]
    WriteConversion(#[from] WriteConversionError),
    #[error("Encryption Error: {0}")]
    Encryption(#[from] EncryptionError),
}

/// Error returned by [`EncryptedTable::retrieve`](crate::EncryptedTable::retrieve) and
/// [`EncryptedTable::get`](crate::EncryptedTable::get) when retrieving and decrypting entities
#[derive(Error, Debug)]
pub enum GetError {
    #[error("StoreError: {0}")]
    Store(#[from] StoreError),
    #[error("Encryption Error: {0}")]
    Encryption(#[from] EncryptionError),
    #[error("Read Conversion Error: {0}")]
    ReadConversion(#[from] ReadConversionError),
}

/// Error returned by [`EncryptedTable::delete`](crate::EncryptedTable::delete)
#[derive(Error, Debug)]
pub enum DeleteError {
    #[error("StoreError: {0}")]
    Store(#[from] StoreError),
}

/// Error returned by [`QueryBuilder`](crate::encrypted_table::QueryBuilder) when retrieving and
/// decrypting entities
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("InvalidQuery: {0}")]
    InvalidQuery(String),
    #[error("StoreError: {0}")]
    Store(#[from] StoreError),
    #[error("EncryptionError: {0}")]
    Encryption(#[from] EncryptionError),
    #[error("ReadConversionError: {0}")]
    ReadConversion(#[from] ReadConversionError),
}

macro_rules! impl_encryption_kind {
    ($($ty:ident),*) => {
        $(
            impl $ty {
                /// The kind of encryption failure, if the encryption layer raised this error.
                pub fn encryption_kind(&self) -> Option<ErrorKind> {
                    match self {
                        Self::Encryption(e) => Some(e.kind()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_encryption_kind!(PutError, GetError, QueryError);

/// Error abstracting all errors returned by `tablecrypt`.
///
/// If you use this error you can use `?` to convert from other `tablecrypt` errors to
/// this one.
#[derive(Error, Debug)]
pub enum Error {
    #[error("ConfigError: {0}")]
    Config(#[from] ConfigError),
    #[error("PutError: {0}")]
    Put(#[from] PutError),
    #[error("GetError: {0}")]
    Get(#[from] GetError),
    #[error("DeleteError: {0}")]
    Delete(#[from] DeleteError),
    #[error("QueryError: {0}")]
    Query(#[from] QueryError),
    #[error("EncryptionError: {0}")]
    Encryption(#[from] EncryptionError),
}
