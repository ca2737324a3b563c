use super::{property_name::is_shadow_property, EntityProperty, TryFromProperty};
use crate::traits::ReadConversionError;
use std::collections::{hash_map, HashMap};

/// Represents the collection of named properties on an entity.
/// Names are unique and case-sensitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(HashMap<String, EntityProperty>);

impl Properties {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Insert a property, returning the previous value stored under `name`.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<EntityProperty>,
    ) -> Option<EntityProperty> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&EntityProperty> {
        self.0.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<EntityProperty> {
        self.0.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntityProperty)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Removes `name` and converts it to `T`.
    ///
    /// A property that is not present (e.g. because a projection did not select it) yields
    /// `T::default()`.
    pub fn take_or_default<T>(&mut self, name: &str) -> Result<T, ReadConversionError>
    where
        T: TryFromProperty + Default,
    {
        match self.0.remove(name) {
            Some(value) => T::try_from_property(value)
                .map_err(|_| ReadConversionError::ConversionFailed(name.to_string())),
            None => Ok(T::default()),
        }
    }

    /// Merge `other` into this set; properties in `other` win.
    pub(crate) fn merge(mut self, other: Self) -> Self {
        self.0.extend(other.0);
        self
    }

    /// Keep only the properties whose name satisfies `f`.
    pub(crate) fn retain(&mut self, mut f: impl FnMut(&str) -> bool) {
        self.0.retain(|k, _| f(k));
    }

    /// Remove the encryption shadow properties.
    pub(crate) fn strip_shadow_properties(&mut self) {
        self.retain(|name| !is_shadow_property(name));
    }
}

impl From<HashMap<String, EntityProperty>> for Properties {
    fn from(map: HashMap<String, EntityProperty>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<EntityProperty>> FromIterator<(K, V)> for Properties {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Properties {
    type Item = (String, EntityProperty);
    type IntoIter = hash_map::IntoIter<String, EntityProperty>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
