use tablecrypt::{
    entity::property_name::{ENCRYPTION_MANIFEST, ENCRYPTION_METADATA},
    Entity, EntityProperty,
};

mod common;

#[tokio::test]
async fn test_round_trip() {
    let table = common::encrypted_table(&["foo", "foo2"]);

    table
        .insert(common::sample_entity("pk", "rk"))
        .await
        .expect("Failed to insert");

    let stored = table.store().get_raw("pk", "rk").expect("Entity not stored");
    assert!(matches!(stored.get("foo"), Some(EntityProperty::Binary(Some(_)))));
    assert!(matches!(stored.get("foo2"), Some(EntityProperty::Binary(Some(_)))));
    assert_eq!(stored.get("fooint"), Some(&EntityProperty::Int32(Some(1234))));
    assert!(stored.get(ENCRYPTION_METADATA).is_some());
    assert!(stored.get(ENCRYPTION_MANIFEST).is_some());

    let entity = table
        .retrieve("pk", "rk")
        .await
        .expect("Failed to retrieve")
        .into_entity()
        .expect("Entity not found");

    assert_eq!(entity.properties(), common::sample_entity("pk", "rk").properties());
    assert_eq!(entity.get("foo2").and_then(|p| p.as_str()), Some(""));
    assert_eq!(entity.get("fooint"), Some(&EntityProperty::Int32(Some(1234))));
    assert!(entity.get(ENCRYPTION_METADATA).is_none());
    assert!(entity.get(ENCRYPTION_MANIFEST).is_none());
    assert!(entity.etag().is_some());
    assert!(entity.timestamp().is_some());
}

#[tokio::test]
async fn test_same_plaintext_yields_different_ciphertext() {
    let table = common::encrypted_table(&["foo", "foo2"]);

    table
        .insert(
            Entity::new("pk", "rk")
                .with_property("foo", "bar")
                .with_property("foo2", "bar"),
        )
        .await
        .expect("Failed to insert");

    let stored = table.store().get_raw("pk", "rk").expect("Entity not stored");
    let foo = stored.get("foo").and_then(|p| p.as_bytes()).expect("foo");
    let foo2 = stored.get("foo2").and_then(|p| p.as_bytes()).expect("foo2");

    assert_ne!(foo, foo2);
}

#[tokio::test]
async fn test_rewrite_uses_fresh_content_key() {
    let table = common::encrypted_table(&["foo"]);

    table
        .insert_or_replace(common::sample_entity("pk", "rk"))
        .await
        .expect("Failed to insert");
    let first = table.store().get_raw("pk", "rk").expect("first");

    table
        .insert_or_replace(common::sample_entity("pk", "rk"))
        .await
        .expect("Failed to insert");
    let second = table.store().get_raw("pk", "rk").expect("second");

    assert_ne!(first.get(ENCRYPTION_METADATA), second.get(ENCRYPTION_METADATA));
    assert_ne!(first.get("foo"), second.get("foo"));
}

#[tokio::test]
async fn test_arbitrary_strings_round_trip() {
    let values = [
        "",
        "a",
        "with spaces and punctuation!?",
        "ünïcödé ✓ 漢字",
        "line\nbreaks\tand\0nul",
    ];

    let table = common::encrypted_table(&["value"]);

    for (i, value) in values.iter().enumerate() {
        let rk = i.to_string();
        table
            .insert(Entity::new("pk", rk.as_str()).with_property("value", *value))
            .await
            .expect("Failed to insert");

        let entity = table
            .retrieve("pk", &rk)
            .await
            .expect("Failed to retrieve")
            .into_entity()
            .expect("Entity not found");

        assert_eq!(entity.get("value").and_then(|p| p.as_str()), Some(*value));
    }

    let long = "x".repeat(64 * 1024);
    table
        .insert(Entity::new("pk", "long").with_property("value", long.as_str()))
        .await
        .expect("Failed to insert");

    let entity = table
        .retrieve("pk", "long")
        .await
        .expect("Failed to retrieve")
        .into_entity()
        .expect("Entity not found");
    assert_eq!(entity.get("value").and_then(|p| p.as_str()), Some(long.as_str()));
}

#[tokio::test]
async fn test_replace_encrypted_entity() {
    let table = common::encrypted_table(&["foo", "secret"]);

    let inserted = table
        .insert(common::sample_entity("pk", "rk"))
        .await
        .expect("Failed to insert")
        .into_entity()
        .expect("Insert returns the entity");

    let replacement = Entity::new("pk", "rk")
        .with_property("secret", "new value")
        .with_property("plain", true)
        .with_etag(inserted.etag().expect("etag"));

    let result = table.replace(replacement).await.expect("Failed to replace");
    assert_eq!(result.http_status_code, 204);

    let entity = table
        .retrieve("pk", "rk")
        .await
        .expect("Failed to retrieve")
        .into_entity()
        .expect("Entity not found");

    let mut names: Vec<&str> = entity.properties().names().collect();
    names.sort();
    assert_eq!(names, vec!["plain", "secret"]);
    assert_eq!(entity.get("secret").and_then(|p| p.as_str()), Some("new value"));
}

#[tokio::test]
async fn test_replace_with_stale_etag_fails() {
    let table = common::encrypted_table(&["foo"]);

    table
        .insert(common::sample_entity("pk", "rk"))
        .await
        .expect("Failed to insert");

    let err = crate::assert_err!(
        table
            .replace(common::sample_entity("pk", "rk").with_etag("W/\"stale\""))
            .await
    );

    match err {
        tablecrypt::errors::PutError::Store(e) => assert_eq!(e.status_code(), 412),
        other => panic!("expected a store error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_delete() {
    let table = common::encrypted_table(&["foo"]);

    table
        .insert(common::sample_entity("pk", "rk"))
        .await
        .expect("Failed to insert");

    let result = table.delete("pk", "rk").await.expect("Failed to delete");
    assert_eq!(result.http_status_code, 204);

    let result = table.retrieve("pk", "rk").await.expect("Failed to retrieve");
    assert_eq!(result.http_status_code, 404);
}
