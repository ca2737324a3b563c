use tablecrypt::{
    crypto::{EncryptionError, ErrorKind},
    errors::{GetError, PutError},
    EncryptedTable, MemoryStore, TableRequestOptions,
};

mod common;

#[tokio::test]
async fn test_write_without_policy_fails_when_required() {
    common::init_logger();

    let table = EncryptedTable::new(MemoryStore::new())
        .with_options(TableRequestOptions::new().with_require_encryption(true));

    let err = crate::assert_err!(table.insert(common::sample_entity("pk", "rk")).await);

    assert_eq!(err.encryption_kind(), Some(ErrorKind::Configuration));
    assert!(matches!(err, PutError::Encryption(EncryptionError::Configuration(_))));
    assert!(table.store().is_empty());
}

#[tokio::test]
async fn test_read_of_unencrypted_entity_fails_when_required() {
    let plain = EncryptedTable::new(MemoryStore::new());
    plain
        .insert(common::sample_entity("pk", "rk"))
        .await
        .expect("Failed to insert");

    let strict = plain.with_request_options(
        &TableRequestOptions::new()
            .with_encryption_policy(common::policy("key1"))
            .with_require_encryption(true),
    );

    let err = crate::assert_err!(strict.retrieve("pk", "rk").await);
    assert!(matches!(err, GetError::Encryption(EncryptionError::NotEncrypted)));
}

#[tokio::test]
async fn test_unencrypted_entity_passes_when_not_required() {
    let plain = EncryptedTable::new(MemoryStore::new());
    plain
        .insert(common::sample_entity("pk", "rk"))
        .await
        .expect("Failed to insert");

    let lenient = plain.with_request_options(
        &TableRequestOptions::new().with_encryption_policy(common::policy("key1")),
    );

    let entity = lenient
        .retrieve("pk", "rk")
        .await
        .expect("Failed to retrieve")
        .into_entity()
        .expect("Entity not found");

    assert_eq!(entity.properties(), common::sample_entity("pk", "rk").properties());
}

#[tokio::test]
async fn test_entity_with_nothing_selected_is_not_encrypted() {
    let table = common::encrypted_table(&[]);

    table
        .insert(common::sample_entity("pk", "rk"))
        .await
        .expect("Failed to insert");

    let stored = table.store().get_raw("pk", "rk").expect("stored");
    assert_eq!(stored.properties(), common::sample_entity("pk", "rk").properties());

    let strict =
        table.with_request_options(&TableRequestOptions::new().with_require_encryption(true));
    let err = crate::assert_err!(strict.retrieve("pk", "rk").await);
    assert!(matches!(err, GetError::Encryption(EncryptionError::NotEncrypted)));
}
