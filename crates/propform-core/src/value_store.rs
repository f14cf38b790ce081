//! Property value store
//!
//! Property-name to string-value mapping for one row. Operations return a
//! new store so callers can diff old against new.

use indexmap::IndexMap;

use crate::schema::PropertyDescriptor;

/// Property values in descriptor order
pub type PropertyValues = IndexMap<String, String>;

/// Immutable view over a row's property values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueStore {
    values: PropertyValues,
}

impl ValueStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// One entry per descriptor, holding its default or an empty string
    #[must_use]
    pub fn from_defaults(descriptors: &[PropertyDescriptor]) -> Self {
        let values = descriptors
            .iter()
            .map(|d| (d.name.clone(), d.widget_attributes.default_value()))
            .collect();
        Self { values }
    }

    /// Current value, empty when unset
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map_or("", String::as_str)
    }

    /// Current value, falling back to the descriptor default when unset
    #[must_use]
    pub fn get_or_default(&self, descriptor: &PropertyDescriptor) -> String {
        self.values
            .get(&descriptor.name)
            .cloned()
            .unwrap_or_else(|| descriptor.widget_attributes.default_value())
    }

    /// New store with `name` set to `value`
    #[must_use]
    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut values = self.values.clone();
        values.insert(name.into(), value.into());
        Self { values }
    }

    /// New store holding only keys accepted by `keep`
    #[must_use]
    pub fn retain(&self, mut keep: impl FnMut(&str) -> bool) -> Self {
        let values = self
            .values
            .iter()
            .filter(|(k, _)| keep(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Self { values }
    }

    /// Borrow the values
    #[inline]
    #[must_use]
    pub fn values(&self) -> &PropertyValues {
        &self.values
    }

    /// Take the values
    #[inline]
    #[must_use]
    pub fn into_values(self) -> PropertyValues {
        self.values
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<PropertyValues> for ValueStore {
    fn from(values: PropertyValues) -> Self {
        Self { values }
    }
}
