#![allow(dead_code)]

use serde_json::{Map, Value};
use std::sync::Once;
use tablecrypt::{
    crypto::{b64_decode, b64_encode, EncryptionPolicy, SymmetricKey},
    resolver::PropertyList,
    EdmType, EncryptedTable, Entity, EntityProperty, MemoryStore, TableRequestOptions,
};

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

pub fn key(key_id: &str) -> SymmetricKey {
    SymmetricKey::generate(key_id).expect("Failed to generate key")
}

pub fn policy(key_id: &str) -> EncryptionPolicy {
    EncryptionPolicy::from_key(key(key_id))
}

/// A table that encrypts the named properties with a fresh key.
pub fn encrypted_table(encrypted: &[&str]) -> EncryptedTable<MemoryStore> {
    init_logger();

    let options = TableRequestOptions::new()
        .with_encryption_policy(policy("key1"))
        .with_encryption_resolver(PropertyList::new(encrypted.iter().copied()));

    EncryptedTable::new(MemoryStore::new()).with_options(options)
}

/// The `{foo: "bar", foo2: "", fooint: 1234}` entity used across tests.
pub fn sample_entity(pk: &str, rk: &str) -> Entity {
    Entity::new(pk, rk)
        .with_property("foo", "bar")
        .with_property("foo2", "")
        .with_property("fooint", 1234)
}

/// JSON payload renditions a table service may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    /// Every property carries an `@odata.type` annotation.
    FullMetadata,
    /// Only types that cannot be inferred from JSON are annotated.
    MinimalMetadata,
    /// No annotations; binary values travel as base64 strings.
    NoMetadata,
    /// Every value travels as text with an `m:type` annotation, the way an Atom feed carries
    /// entity properties. Strings are left unannotated.
    TypedText,
}

pub const ALL_WIRE_FORMATS: [WireFormat; 4] = [
    WireFormat::FullMetadata,
    WireFormat::MinimalMetadata,
    WireFormat::NoMetadata,
    WireFormat::TypedText,
];

const ODATA_TYPE: &str = "@odata.type";
const M_TYPE: &str = "@m:type";

pub fn to_wire(entity: &Entity, format: WireFormat) -> String {
    if format == WireFormat::TypedText {
        return to_typed_text(entity);
    }

    let mut object = Map::new();
    object.insert("PartitionKey".into(), entity.partition_key().into());
    object.insert("RowKey".into(), entity.row_key().into());

    for (name, property) in entity.properties().iter() {
        let value = match property {
            EntityProperty::String(Some(s)) => Value::from(s.as_str()),
            EntityProperty::Binary(Some(b)) => Value::from(b64_encode(b)),
            EntityProperty::Int32(Some(i)) => Value::from(*i),
            EntityProperty::Int64(Some(i)) => Value::from(i.to_string()),
            EntityProperty::Boolean(Some(b)) => Value::from(*b),
            EntityProperty::Double(Some(d)) => Value::from(*d),
            other if other.is_null() => Value::Null,
            other => panic!("unsupported property in wire rendition: {other:?}"),
        };

        let annotate = match format {
            WireFormat::FullMetadata => true,
            WireFormat::MinimalMetadata => matches!(
                property.edm_type(),
                EdmType::Binary | EdmType::Int64 | EdmType::DateTime | EdmType::Guid
            ),
            WireFormat::NoMetadata => false,
            WireFormat::TypedText => unreachable!("handled by to_typed_text above"),
        };

        if annotate {
            object.insert(
                format!("{name}{ODATA_TYPE}"),
                property.edm_type().as_str().into(),
            );
        }

        object.insert(name.to_string(), value);
    }

    serde_json::to_string(&Value::Object(object)).expect("Failed to serialize entity")
}

pub fn from_wire(payload: &str) -> Entity {
    let Value::Object(object) = serde_json::from_str(payload).expect("Invalid JSON") else {
        panic!("expected a JSON object");
    };

    let pk = object["PartitionKey"].as_str().expect("PartitionKey");
    let rk = object["RowKey"].as_str().expect("RowKey");
    let mut entity = Entity::new(pk, rk);

    for (name, value) in object.iter() {
        if name == "PartitionKey"
            || name == "RowKey"
            || name.ends_with(ODATA_TYPE)
            || name.ends_with(M_TYPE)
        {
            continue;
        }

        if let Some(edm_type) = object.get(&format!("{name}{M_TYPE}")) {
            let edm_type: EdmType =
                serde_json::from_value(edm_type.clone()).expect("Invalid m:type");
            entity.insert(name.as_str(), from_typed_text(edm_type, value));
            continue;
        }

        let annotation = object
            .get(&format!("{name}{ODATA_TYPE}"))
            .and_then(Value::as_str);

        let property = match (annotation, value) {
            (Some("Edm.Binary"), Value::String(s)) => {
                EntityProperty::from(b64_decode(s).expect("Invalid base64"))
            }
            (Some("Edm.Int64"), Value::String(s)) => {
                EntityProperty::from(s.parse::<i64>().expect("Invalid Int64"))
            }
            (Some("Edm.Double"), v) => EntityProperty::from(v.as_f64().expect("Invalid Double")),
            (_, Value::Number(n)) if n.is_f64() => {
                EntityProperty::from(n.as_f64().expect("Invalid Double"))
            }
            (_, Value::Number(n)) => EntityProperty::from(
                n.as_i64()
                    .and_then(|i| i32::try_from(i).ok())
                    .expect("Invalid Int32"),
            ),
            (_, Value::Bool(b)) => EntityProperty::from(*b),
            (_, Value::String(s)) => EntityProperty::from(s.as_str()),
            (_, Value::Null) => EntityProperty::String(None),
            (_, other) => panic!("unsupported JSON value {other}"),
        };

        entity.insert(name.as_str(), property);
    }

    entity
}

fn to_typed_text(entity: &Entity) -> String {
    let mut object = Map::new();
    object.insert("PartitionKey".into(), entity.partition_key().into());
    object.insert("RowKey".into(), entity.row_key().into());

    for (name, property) in entity.properties().iter() {
        let text = match property {
            EntityProperty::String(s) => s.clone(),
            EntityProperty::Binary(b) => b.as_ref().map(b64_encode),
            EntityProperty::Boolean(b) => b.map(|b| b.to_string()),
            EntityProperty::Int32(i) => i.map(|i| i.to_string()),
            EntityProperty::Int64(i) => i.map(|i| i.to_string()),
            EntityProperty::Double(d) => d.map(|d| d.to_string()),
            EntityProperty::DateTime(d) => d.map(|d| d.to_rfc3339()),
            EntityProperty::Guid(g) => g.map(|g| g.to_string()),
        };

        if property.edm_type() != EdmType::String {
            object.insert(
                format!("{name}{M_TYPE}"),
                property.edm_type().as_str().into(),
            );
        }

        object.insert(name.to_string(), text.map_or(Value::Null, Value::from));
    }

    serde_json::to_string(&Value::Object(object)).expect("Failed to serialize entity")
}

fn from_typed_text(edm_type: EdmType, value: &Value) -> EntityProperty {
    let text = match value {
        Value::String(s) => Some(s.as_str()),
        Value::Null => None,
        other => panic!("typed text values must be strings, got {other}"),
    };

    match edm_type {
        EdmType::String => EntityProperty::String(text.map(str::to_string)),
        EdmType::Binary => {
            EntityProperty::Binary(text.map(|t| b64_decode(t).expect("Invalid base64")))
        }
        EdmType::Boolean => {
            EntityProperty::Boolean(text.map(|t| t.parse().expect("Invalid Boolean")))
        }
        EdmType::Int32 => EntityProperty::Int32(text.map(|t| t.parse().expect("Invalid Int32"))),
        EdmType::Int64 => EntityProperty::Int64(text.map(|t| t.parse().expect("Invalid Int64"))),
        EdmType::Double => {
            EntityProperty::Double(text.map(|t| t.parse().expect("Invalid Double")))
        }
        EdmType::DateTime => EntityProperty::DateTime(text.map(|t| {
            chrono::DateTime::parse_from_rfc3339(t)
                .expect("Invalid DateTime")
                .with_timezone(&chrono::Utc)
        })),
        EdmType::Guid => EntityProperty::Guid(text.map(|t| t.parse().expect("Invalid Guid"))),
    }
}

#[macro_export]
macro_rules! assert_err {
    ($cond:expr,) => {
        $crate::assert_err!($cond);
    };
    ($cond:expr) => {
        match $cond {
            Ok(t) => {
                panic!("assertion failed, expected Err(..), got Ok({:?})", t);
            },
            Err(e) => e,
        }
    };
    ($cond:expr, $($arg:tt)+) => {
        match $cond {
            Ok(t) => {
                panic!("assertion failed, expected Err(..), got Ok({:?}): {}", t, format_args!($($arg)+));
            },
            Err(e) => e,
        }
    };
}
