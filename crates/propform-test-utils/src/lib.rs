//! Testing utilities for the propform workspace
//!
//! Shared fixtures: a DLP-style transform catalog, row states and error
//! entries.

#![allow(missing_docs)]

use std::sync::Arc;

use propform_core::{
    EngineConfig, ErrorEntry, ErrorLocator, FilterOption, PropertyDescriptor, PropertyValues,
    RowState, TransformCatalog, TransformDescriptor,
};

pub fn redact_transform() -> TransformDescriptor {
    TransformDescriptor::new("Redact", "Redact")
        .with_supported_type("string")
        .with_option(
            PropertyDescriptor::new("pattern", "textbox")
                .with_label("Pattern")
                .with_macro(true),
        )
}

pub fn hash_transform() -> TransformDescriptor {
    TransformDescriptor::new("Hash", "Hash").with_option(
        PropertyDescriptor::new("algo", "select")
            .with_label("Algorithm")
            .with_default("SHA256")
            .with_attribute("values", serde_json::json!(["MD5", "SHA1", "SHA256"]))
            .with_macro(true),
    )
}

pub fn mask_transform() -> TransformDescriptor {
    TransformDescriptor::new("Mask", "Mask")
        .with_option(PropertyDescriptor::new("character", "textbox").with_default("#"))
        .with_option(PropertyDescriptor::new("keep", "number").with_default("4"))
        .with_option(PropertyDescriptor::new("script", "javascript-editor").with_macro(true))
}

pub fn drop_transform() -> TransformDescriptor {
    TransformDescriptor::new("Drop", "Drop field")
}

pub fn filter_options() -> Vec<FilterOption> {
    vec![
        FilterOption::Plain("NONE".to_string()),
        FilterOption::Labeled {
            id: "EMAIL_ADDRESS".to_string(),
            label: "Email".to_string(),
        },
        FilterOption::Labeled {
            id: "PHONE_NUMBER".to_string(),
            label: "Phone".to_string(),
        },
        FilterOption::Plain("US_SSN".to_string()),
    ]
}

pub fn dlp_catalog() -> Arc<TransformCatalog> {
    let catalog = TransformCatalog::new(
        vec![
            redact_transform(),
            hash_transform(),
            mask_transform(),
            drop_transform(),
        ],
        filter_options(),
    )
    .unwrap();
    Arc::new(catalog)
}

pub fn config() -> EngineConfig {
    EngineConfig::default()
}

pub fn values(pairs: &[(&str, &str)]) -> PropertyValues {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

pub fn row(transform: &str, fields: &[&str], filters: &[&str], props: &[(&str, &str)]) -> RowState {
    RowState {
        transform: transform.to_string(),
        fields: fields.iter().map(|f| (*f).to_string()).collect(),
        filters: filters.iter().map(|f| (*f).to_string()).collect(),
        properties: values(props),
        expanded: !props.is_empty(),
        ..RowState::default()
    }
}

pub fn row_error(state: &RowState, message: &str) -> ErrorEntry {
    ErrorEntry::new(&ErrorLocator::for_row(state, None, &config()), message)
}

pub fn property_error(state: &RowState, property: &str, message: &str) -> ErrorEntry {
    ErrorEntry::new(&ErrorLocator::for_row(state, Some(property), &config()), message)
}

pub fn customer_schema() -> String {
    serde_json::json!({
        "type": "record",
        "name": "customer",
        "fields": [
            {"name": "email", "type": ["string", "null"]},
            {"name": "phone", "type": "string"},
            {"name": "age", "type": "int"},
            {"name": "signup", "type": {"type": "long", "logicalType": "timestamp-micros"}}
        ]
    })
    .to_string()
}
