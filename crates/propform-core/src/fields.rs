//! Upstream field schema
//!
//! Extracts the fields an upstream stage offers to the "within" selector,
//! filtered by the active transform's supported types.

use serde::Deserialize;
use serde_json::Value;

use crate::error::SchemaError;

/// A schema field as declared upstream
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SchemaField {
    /// Field name
    pub name: String,
    /// Raw type: a name, a union array, or a complex type object
    #[serde(rename = "type")]
    pub ty: Value,
}

impl SchemaField {
    /// Effective type name used for filtering
    ///
    /// Nullable unions are reduced to their non-null member and logical
    /// types win over their physical representation.
    #[must_use]
    pub fn effective_type(&self) -> Option<String> {
        extract_type(&self.ty)
    }
}

/// Record schema of one upstream stage
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InputSchema {
    /// Declared fields in schema order
    #[serde(default)]
    pub fields: Vec<SchemaField>,
}

impl InputSchema {
    /// Parse a JSON record schema
    pub fn parse(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Field names whose type is allowed; empty `allowed` allows all
    #[must_use]
    pub fn field_names(&self, allowed: &[String]) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| type_allowed(&f.ty, allowed))
            .map(|f| f.name.clone())
            .collect()
    }
}

/// Available field names from the incoming stage schemas
///
/// All incoming stages are assumed to share a schema, so only the first is
/// consulted. An unparsable schema yields no fields.
#[must_use]
pub fn available_fields<S: AsRef<str>>(stage_schemas: &[S], allowed: &[String]) -> Vec<String> {
    let Some(first) = stage_schemas.first() else {
        return Vec::new();
    };

    match InputSchema::parse(first.as_ref()) {
        Ok(schema) => schema.field_names(allowed),
        Err(err) => {
            tracing::debug!(error = %err, "ignoring unparsable stage schema");
            Vec::new()
        }
    }
}

/// Drop selected fields that are not available, keeping order
#[must_use]
pub fn prune_selection(selected: &[String], available: &[String]) -> Vec<String> {
    selected
        .iter()
        .filter(|f| available.contains(f))
        .cloned()
        .collect()
}

fn type_allowed(ty: &Value, allowed: &[String]) -> bool {
    if allowed.is_empty() {
        return true;
    }
    extract_type(ty).is_some_and(|t| allowed.contains(&t))
}

fn extract_type(ty: &Value) -> Option<String> {
    let value = match ty {
        Value::Array(items) if items.len() == 1 => &items[0],
        Value::Array(items) if items.len() == 2 && items.iter().any(is_null_type) => {
            if is_null_type(&items[0]) {
                &items[1]
            } else {
                &items[0]
            }
        }
        other => other,
    };

    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("logicalType")
            .or_else(|| map.get("type"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

fn is_null_type(value: &Value) -> bool {
    value.as_str() == Some("null")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(name: &str, ty: Value) -> SchemaField {
        SchemaField {
            name: name.to_string(),
            ty,
        }
    }

    #[test]
    fn extracts_plain_and_nullable_types() {
        assert_eq!(field("a", json!("string")).effective_type().as_deref(), Some("string"));
        assert_eq!(field("b", json!(["string"])).effective_type().as_deref(), Some("string"));
        assert_eq!(
            field("c", json!(["null", "long"])).effective_type().as_deref(),
            Some("long")
        );
        assert_eq!(
            field("d", json!(["int", "null"])).effective_type().as_deref(),
            Some("int")
        );
    }

    #[test]
    fn logical_type_wins() {
        let ty = json!({"type": "long", "logicalType": "timestamp-micros"});
        assert_eq!(
            field("ts", ty).effective_type().as_deref(),
            Some("timestamp-micros")
        );

        let nullable_date = json!(["null", {"type": "int", "logicalType": "date"}]);
        assert_eq!(
            field("d", nullable_date).effective_type().as_deref(),
            Some("date")
        );
    }

    #[test]
    fn wide_union_has_no_single_type() {
        assert_eq!(field("u", json!(["int", "string", "null"])).effective_type(), None);
    }

    #[test]
    fn filters_by_allowed_types() {
        let schema = InputSchema::parse(
            r#"{"type": "record", "name": "etl", "fields": [
                {"name": "email", "type": ["string", "null"]},
                {"name": "age", "type": "int"},
                {"name": "ssn", "type": "string"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(schema.field_names(&[]), vec!["email", "age", "ssn"]);
        assert_eq!(
            schema.field_names(&["string".to_string()]),
            vec!["email", "ssn"]
        );
    }

    #[test]
    fn available_fields_uses_first_stage_only() {
        let stages = [
            r#"{"fields": [{"name": "a", "type": "string"}]}"#,
            r#"{"fields": [{"name": "b", "type": "string"}]}"#,
        ];
        assert_eq!(available_fields(&stages, &[]), vec!["a"]);
    }

    #[test]
    fn available_fields_tolerates_bad_schema() {
        assert!(available_fields(&["not json"], &[]).is_empty());
        assert!(available_fields::<&str>(&[], &[]).is_empty());
    }

    #[test]
    fn prune_keeps_order() {
        let selected = vec!["ssn".to_string(), "gone".to_string(), "email".to_string()];
        let available = vec!["email".to_string(), "ssn".to_string()];
        assert_eq!(prune_selection(&selected, &available), vec!["ssn", "email"]);
    }
}
