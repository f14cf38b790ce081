//! Row state and its transport form
//!
//! The transport form is a flat JSON record. An empty string is the
//! distinguished "row not configured" value and is produced for every row
//! without a transform.

use indexmap::IndexSet;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::EngineConfig;
use crate::error::TransportError;
use crate::filters::{join_list, split_list};
use crate::value_store::PropertyValues;

/// Mutable state of one configurable row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowState {
    /// Selected transform name, empty when none
    pub transform: String,
    /// Selected filter ids in selection order
    pub filters: Vec<String>,
    /// Field names the row applies to
    pub fields: Vec<String>,
    /// One value per property of the active transform
    pub properties: PropertyValues,
    /// Whether the property panel is revealed
    pub expanded: bool,
    /// Properties currently in macro mode
    ///
    /// Not part of the transport form; rebuilt from the values on load.
    pub macro_properties: IndexSet<String>,
}

/// Wire record
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RowRecord<'a> {
    fields: String,
    transform: &'a str,
    filters: String,
    transform_properties: &'a PropertyValues,
    expanded: bool,
}

impl RowState {
    /// Fresh, unconfigured row
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a transform is selected
    #[inline]
    #[must_use]
    pub fn has_transform(&self) -> bool {
        !self.transform.is_empty()
    }

    /// Whether `property` is in macro mode
    #[inline]
    #[must_use]
    pub fn is_macro(&self, property: &str) -> bool {
        self.macro_properties.contains(property)
    }

    /// Fields joined for transport and locator comparison
    #[must_use]
    pub fn fields_joined(&self, config: &EngineConfig) -> String {
        join_list(&self.fields, &config.delimiter)
    }

    /// Filters joined for transport and locator comparison
    #[must_use]
    pub fn filters_joined(&self, config: &EngineConfig) -> String {
        join_list(&self.filters, &config.delimiter)
    }

    /// Serialize for the caller; empty when no transform is selected
    #[must_use]
    pub fn to_transport(&self, config: &EngineConfig) -> String {
        if !self.has_transform() {
            return String::new();
        }

        let record = RowRecord {
            fields: self.fields_joined(config),
            transform: &self.transform,
            filters: self.filters_joined(config),
            transform_properties: &self.properties,
            expanded: self.expanded,
        };
        serde_json::to_string(&record).unwrap_or_default()
    }

    /// Decode a transport string
    ///
    /// Empty input and records without a transform decode to a fresh row.
    /// Unknown keys are ignored; missing keys and keys of the wrong type
    /// default. `fields` and `filters` accept a delimited string or an
    /// array of strings. Scalar property values are stringified; `null`,
    /// arrays and objects are dropped.
    ///
    /// # Errors
    /// Returns [`TransportError::InvalidJson`] when the input is not JSON and
    /// [`TransportError::NotARecord`] when it is not a JSON object.
    pub fn try_from_transport(
        transport: &str,
        config: &EngineConfig,
    ) -> Result<Self, TransportError> {
        if transport.trim().is_empty() {
            return Ok(Self::new());
        }

        let Value::Object(record) = serde_json::from_str::<Value>(transport)? else {
            return Err(TransportError::NotARecord);
        };

        let transform = match record.get("transform") {
            Some(Value::String(name)) => name.clone(),
            _ => String::new(),
        };
        if transform.is_empty() {
            return Ok(Self::new());
        }

        Ok(Self {
            transform,
            filters: string_list(&record, "filters", &config.delimiter),
            fields: string_list(&record, "fields", &config.delimiter),
            properties: properties(&record),
            expanded: match record.get("expanded") {
                None | Some(Value::Null) => false,
                Some(Value::Bool(expanded)) => *expanded,
                Some(_) => {
                    tracing::debug!(key = "expanded", "defaulting malformed row key");
                    false
                }
            },
            macro_properties: IndexSet::new(),
        })
    }

    /// Decode a transport string, falling back to a fresh row
    #[must_use]
    pub fn from_transport(transport: &str, config: &EngineConfig) -> Self {
        Self::try_from_transport(transport, config).unwrap_or_else(|err| {
            tracing::debug!(error = %err, "resetting row after unreadable payload");
            Self::new()
        })
    }
}

fn string_list(record: &Map<String, Value>, key: &str, delimiter: &str) -> Vec<String> {
    match record.get(key) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(joined)) => split_list(joined, delimiter),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
        Some(_) => {
            tracing::debug!(key, "defaulting malformed row key");
            Vec::new()
        }
    }
}

fn properties(record: &Map<String, Value>) -> PropertyValues {
    let values = match record.get("transformProperties") {
        None | Some(Value::Null) => return PropertyValues::new(),
        Some(Value::Object(values)) => values,
        Some(_) => {
            tracing::debug!(key = "transformProperties", "defaulting malformed row key");
            return PropertyValues::new();
        }
    };

    values
        .iter()
        .filter_map(|(k, v)| match v {
            Value::String(s) => Some((k.clone(), s.clone())),
            Value::Number(_) | Value::Bool(_) => Some((k.clone(), v.to_string())),
            _ => {
                tracing::debug!(property = %k, "dropping non-scalar property value");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    fn configured() -> RowState {
        let mut properties = PropertyValues::new();
        properties.insert("algo".to_string(), "SHA256".to_string());
        RowState {
            transform: "Hash".to_string(),
            filters: vec!["EMAIL".to_string(), "PHONE".to_string()],
            fields: vec!["f1".to_string()],
            properties,
            expanded: true,
            macro_properties: IndexSet::new(),
        }
    }

    #[test]
    fn empty_transform_serializes_empty() {
        let mut state = configured();
        state.transform.clear();
        assert_eq!(state.to_transport(&config()), "");
        assert_eq!(RowState::new().to_transport(&config()), "");
    }

    #[test]
    fn transport_shape() {
        let json: Value = serde_json::from_str(&configured().to_transport(&config())).unwrap();
        assert_eq!(json["transform"], "Hash");
        assert_eq!(json["filters"], "EMAIL,PHONE");
        assert_eq!(json["fields"], "f1");
        assert_eq!(json["transformProperties"]["algo"], "SHA256");
        assert_eq!(json["expanded"], true);
    }

    #[test]
    fn round_trip() {
        let state = configured();
        let decoded = RowState::from_transport(&state.to_transport(&config()), &config());
        assert_eq!(decoded, state);
    }

    #[test]
    fn fresh_row_from_empty_string() {
        assert_eq!(RowState::from_transport("", &config()), RowState::new());
    }

    #[test]
    fn malformed_payload_resets() {
        assert_eq!(RowState::from_transport("{not json", &config()), RowState::new());
        assert!(matches!(
            RowState::try_from_transport("[1, 2]", &config()),
            Err(TransportError::NotARecord)
        ));
    }

    #[test]
    fn mistyped_keys_default_individually() {
        let state = RowState::from_transport(
            r#"{"transform": "Hash", "expanded": "true", "fields": ["a", "", "b"],
                "filters": 7, "transformProperties": ["algo"]}"#,
            &config(),
        );
        assert_eq!(state.transform, "Hash");
        assert!(!state.expanded);
        assert_eq!(state.fields, vec!["a", "b"]);
        assert!(state.filters.is_empty());
        assert!(state.properties.is_empty());
    }

    #[test]
    fn mistyped_transform_is_fresh() {
        let state = RowState::from_transport(r#"{"transform": 3, "fields": "f1"}"#, &config());
        assert_eq!(state, RowState::new());
    }

    #[test]
    fn missing_keys_default_and_unknown_keys_ignored() {
        let state = RowState::from_transport(
            r#"{"transform": "Redact", "bogus": {"deep": 1}}"#,
            &config(),
        );
        assert_eq!(state.transform, "Redact");
        assert!(state.fields.is_empty());
        assert!(state.filters.is_empty());
        assert!(state.properties.is_empty());
        assert!(!state.expanded);
    }

    #[test]
    fn record_without_transform_is_fresh() {
        let state = RowState::from_transport(
            r#"{"transform": "", "fields": "f1", "expanded": true}"#,
            &config(),
        );
        assert_eq!(state, RowState::new());
    }

    #[test]
    fn scalar_property_values_stringified() {
        let state = RowState::from_transport(
            r#"{"transform": "Mask", "transformProperties": {"width": 4, "keep": true, "x": null}}"#,
            &config(),
        );
        assert_eq!(state.properties.get("width").map(String::as_str), Some("4"));
        assert_eq!(state.properties.get("keep").map(String::as_str), Some("true"));
        assert!(!state.properties.contains_key("x"));
    }

    #[test]
    fn custom_delimiter() {
        let config = EngineConfig::new().with_delimiter("|");
        let state = RowState::from_transport(
            r#"{"transform": "Hash", "fields": "a|b", "filters": "NONE"}"#,
            &config,
        );
        assert_eq!(state.fields, vec!["a", "b"]);
        assert_eq!(state.fields_joined(&config), "a|b");
    }
}
