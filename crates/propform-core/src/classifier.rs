//! Validation error routing
//!
//! Splits externally produced validation errors into row-level messages and
//! messages attached to one nested property. Errors whose locator names a
//! different transform, field set or filter set than the current row are
//! stale and dropped.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::LocatorError;
use crate::state::RowState;

/// Where a validation error belongs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ErrorLocator {
    /// Transform the error was produced for
    pub transform: String,
    /// Joined field names
    pub fields: String,
    /// Joined filter ids
    pub filters: String,
    /// Property the error belongs to, when nested
    pub transform_property_id: String,
    /// Whether the error targets a nested property
    pub is_nested_error: bool,
}

impl ErrorLocator {
    /// Locator addressing `state`, optionally one of its properties
    #[must_use]
    pub fn for_row(state: &RowState, property: Option<&str>, config: &EngineConfig) -> Self {
        Self {
            transform: state.transform.clone(),
            fields: state.fields_joined(config),
            filters: state.filters_joined(config),
            transform_property_id: property.unwrap_or_default().to_string(),
            is_nested_error: property.is_some(),
        }
    }

    /// Parse a locator string
    pub fn parse(locator: &str) -> Result<Self, LocatorError> {
        Ok(serde_json::from_str(locator)?)
    }

    /// Encode as a locator string
    #[must_use]
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Whether the locator addresses the current selection of `state`
    #[must_use]
    pub fn matches(&self, state: &RowState, config: &EngineConfig) -> bool {
        self.transform == state.transform
            && self.fields == state.fields_joined(config)
            && self.filters == state.filters_joined(config)
    }
}

/// A validation error as reported by the external validation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Serialized [`ErrorLocator`]
    #[serde(alias = "element")]
    pub locator: String,
    /// Display message
    #[serde(alias = "msg")]
    pub message: String,
}

impl ErrorEntry {
    /// Create entry from a locator
    #[must_use]
    pub fn new(locator: &ErrorLocator, message: impl Into<String>) -> Self {
        Self {
            locator: locator.encode(),
            message: message.into(),
        }
    }
}

/// Errors routed to their display buckets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedErrors {
    /// Row-level messages
    pub local: Vec<String>,
    /// Property name to its messages, in arrival order
    pub nested: IndexMap<String, Vec<String>>,
}

impl ClassifiedErrors {
    /// Whether any property carries an error
    #[inline]
    #[must_use]
    pub fn has_nested(&self) -> bool {
        !self.nested.is_empty()
    }

    /// Messages for one property
    #[must_use]
    pub fn for_property(&self, name: &str) -> &[String] {
        self.nested.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Total number of routed messages
    #[must_use]
    pub fn len(&self) -> usize {
        self.local.len() + self.nested.values().map(Vec::len).sum::<usize>()
    }

    /// Whether nothing was routed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.nested.is_empty()
    }
}

/// Route `errors` relevant to `state`
///
/// Malformed locators are skipped silently.
#[must_use]
pub fn classify(errors: &[ErrorEntry], state: &RowState, config: &EngineConfig) -> ClassifiedErrors {
    let mut classified = ClassifiedErrors::default();

    for entry in errors {
        let locator = match ErrorLocator::parse(&entry.locator) {
            Ok(locator) => locator,
            Err(err) => {
                tracing::debug!(error = %err, "skipping error with unreadable locator");
                continue;
            }
        };

        if !locator.matches(state, config) {
            continue;
        }

        if locator.is_nested_error {
            classified
                .nested
                .entry(locator.transform_property_id)
                .or_default()
                .push(entry.message.clone());
        } else {
            classified.local.push(entry.message.clone());
        }
    }

    classified
}
