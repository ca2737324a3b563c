use crate::traits::ReadConversionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use uuid::Uuid;

/// Trait for converting an [`EntityProperty`] to `Self`
pub trait TryFromProperty: Sized {
    /// Try to convert `value` to `Self`
    fn try_from_property(value: EntityProperty) -> Result<Self, ReadConversionError>;
}

/// The type tag of an [`EntityProperty`], named the way the table service names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdmType {
    #[serde(rename = "Edm.String")]
    String,
    #[serde(rename = "Edm.Binary")]
    Binary,
    #[serde(rename = "Edm.Boolean")]
    Boolean,
    #[serde(rename = "Edm.Int32")]
    Int32,
    #[serde(rename = "Edm.Int64")]
    Int64,
    #[serde(rename = "Edm.Double")]
    Double,
    #[serde(rename = "Edm.DateTime")]
    DateTime,
    #[serde(rename = "Edm.Guid")]
    Guid,
}

impl EdmType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "Edm.String",
            Self::Binary => "Edm.Binary",
            Self::Boolean => "Edm.Boolean",
            Self::Int32 => "Edm.Int32",
            Self::Int64 => "Edm.Int64",
            Self::Double => "Edm.Double",
            Self::DateTime => "Edm.DateTime",
            Self::Guid => "Edm.Guid",
        }
    }
}

impl Display for EdmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single typed value stored on an entity.
///
/// Every kind is nullable, mirroring the table service where a property can be present with a
/// type but without a value.
#[derive(Clone, PartialEq, Debug)]
pub enum EntityProperty {
    String(Option<String>),
    Binary(Option<Vec<u8>>),
    Boolean(Option<bool>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    Double(Option<f64>),
    DateTime(Option<DateTime<Utc>>),
    Guid(Option<Uuid>),
}

impl EntityProperty {
    pub fn edm_type(&self) -> EdmType {
        match self {
            Self::String(_) => EdmType::String,
            Self::Binary(_) => EdmType::Binary,
            Self::Boolean(_) => EdmType::Boolean,
            Self::Int32(_) => EdmType::Int32,
            Self::Int64(_) => EdmType::Int64,
            Self::Double(_) => EdmType::Double,
            Self::DateTime(_) => EdmType::DateTime,
            Self::Guid(_) => EdmType::Guid,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Self::String(v) => v.is_none(),
            Self::Binary(v) => v.is_none(),
            Self::Boolean(v) => v.is_none(),
            Self::Int32(v) => v.is_none(),
            Self::Int64(v) => v.is_none(),
            Self::Double(v) => v.is_none(),
            Self::DateTime(v) => v.is_none(),
            Self::Guid(v) => v.is_none(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(Some(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(Some(b)) => Some(b),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int32(v) => *v,
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int64(v) => *v,
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => *v,
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(v) => *v,
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::DateTime(v) => *v,
            _ => None,
        }
    }

    pub fn as_guid(&self) -> Option<Uuid> {
        match self {
            Self::Guid(v) => *v,
            _ => None,
        }
    }
}

macro_rules! impl_property_conversions {
    () => {};
    (, $($tail:tt)*) => {
        impl_property_conversions!($($tail)*);
    };
    ($ty:ty => $variant:ident $($tail:tt)*) => {
        impl From<$ty> for EntityProperty {
            fn from(value: $ty) -> Self {
                EntityProperty::$variant(Some(value))
            }
        }

        impl From<Option<$ty>> for EntityProperty {
            fn from(value: Option<$ty>) -> Self {
                EntityProperty::$variant(value)
            }
        }

        impl TryFromProperty for $ty {
            fn try_from_property(value: EntityProperty) -> Result<Self, ReadConversionError> {
                let EntityProperty::$variant(Some(value)) = value else {
                    return Err(ReadConversionError::ConversionFailed(
                        stringify!($ty).to_string(),
                    ));
                };

                Ok(value)
            }
        }

        impl TryFromProperty for Option<$ty> {
            fn try_from_property(value: EntityProperty) -> Result<Self, ReadConversionError> {
                let EntityProperty::$variant(value) = value else {
                    return Err(ReadConversionError::ConversionFailed(
                        stringify!(Option<$ty>).to_string(),
                    ));
                };

                Ok(value)
            }
        }

        impl_property_conversions!($($tail)*);
    };
}

impl_property_conversions!(
    String => String,
    Vec<u8> => Binary,
    bool => Boolean,
    i32 => Int32,
    i64 => Int64,
    f64 => Double,
    DateTime<Utc> => DateTime,
    Uuid => Guid
);

impl From<&str> for EntityProperty {
    fn from(value: &str) -> Self {
        EntityProperty::String(Some(value.to_string()))
    }
}

impl From<&[u8]> for EntityProperty {
    fn from(value: &[u8]) -> Self {
        EntityProperty::Binary(Some(value.to_vec()))
    }
}

impl TryFromProperty for EntityProperty {
    fn try_from_property(value: EntityProperty) -> Result<Self, ReadConversionError> {
        Ok(value)
    }
}
