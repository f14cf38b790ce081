//! Property descriptors and the transform catalog
//!
//! Static, read-only schema supplied by the plugin catalog. A transform
//! groups the property descriptors a row edits once it is selected.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CatalogError;

/// Widget attribute bag (`default`, `macro`, `description`, `required`, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetAttributes(Map<String, Value>);

impl WidgetAttributes {
    /// Create empty attributes
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With attribute set
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Raw attribute lookup
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Default value rendered as a string, empty when absent
    ///
    /// Scalar defaults other than strings are stringified; `null`,
    /// arrays and objects count as absent.
    #[must_use]
    pub fn default_value(&self) -> String {
        match self.0.get("default") {
            Some(Value::String(s)) => s.clone(),
            Some(v @ (Value::Number(_) | Value::Bool(_))) => v.to_string(),
            _ => String::new(),
        }
    }

    /// Whether the property accepts macro placeholders
    #[inline]
    #[must_use]
    pub fn macro_supported(&self) -> bool {
        self.flag("macro")
    }

    /// Whether the property is required
    #[inline]
    #[must_use]
    pub fn required(&self) -> bool {
        self.flag("required")
    }

    /// Human-readable description
    #[inline]
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.0.get("description").and_then(Value::as_str)
    }

    /// Whether no attribute is set
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn flag(&self, key: &str) -> bool {
        match self.0.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

/// One editable property of a transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
    /// Unique key within the transform
    pub name: String,
    /// Display label
    #[serde(default)]
    pub label: String,
    /// Input kind tag
    #[serde(alias = "widget-type")]
    pub widget_type: String,
    /// Widget attributes
    #[serde(default, alias = "widget-attributes")]
    pub widget_attributes: WidgetAttributes,
    /// Allowed upstream field types
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supported_types: Vec<String>,
}

impl PropertyDescriptor {
    /// Create descriptor with empty attributes
    #[must_use]
    pub fn new(name: impl Into<String>, widget_type: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            widget_type: widget_type.into(),
            widget_attributes: WidgetAttributes::new(),
            supported_types: Vec::new(),
        }
    }

    /// With display label
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// With widget attribute
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.widget_attributes = self.widget_attributes.with(key, value);
        self
    }

    /// With default value
    #[must_use]
    pub fn with_default(self, value: impl Into<String>) -> Self {
        self.with_attribute("default", value.into())
    }

    /// With macro support flag
    #[must_use]
    pub fn with_macro(self, supported: bool) -> Self {
        self.with_attribute("macro", supported)
    }
}

/// A catalog filter entry; bare strings use the id as label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterOption {
    /// `{ "id": ..., "label": ... }`
    Labeled {
        /// Filter identifier
        id: String,
        /// Display label
        label: String,
    },
    /// Bare identifier
    Plain(String),
}

impl FilterOption {
    /// Normalised `{id, label}` form
    #[must_use]
    pub fn to_choice(&self) -> FilterChoice {
        match self {
            Self::Labeled { id, label } => FilterChoice {
                id: id.clone(),
                label: label.clone(),
            },
            Self::Plain(id) => FilterChoice {
                id: id.clone(),
                label: id.clone(),
            },
        }
    }

    /// Filter identifier
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Labeled { id, .. } | Self::Plain(id) => id,
        }
    }
}

/// Normalised filter option handed to rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterChoice {
    /// Filter identifier
    pub id: String,
    /// Display label
    pub label: String,
}

/// A selectable property group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformDescriptor {
    /// Display label
    #[serde(default)]
    pub label: String,
    /// Unique transform name
    pub name: String,
    /// Properties edited once the transform is selected
    #[serde(default)]
    pub options: Vec<PropertyDescriptor>,
    /// Upstream field types the transform applies to; empty means all
    #[serde(default)]
    pub supported_types: Vec<String>,
    /// Property visibility filters passed through to rendering
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Value>,
}

impl TransformDescriptor {
    /// Create transform with no properties
    #[must_use]
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            name: name.into(),
            options: Vec::new(),
            supported_types: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// With property
    #[must_use]
    pub fn with_option(mut self, option: PropertyDescriptor) -> Self {
        self.options.push(option);
        self
    }

    /// With supported upstream type
    #[must_use]
    pub fn with_supported_type(mut self, ty: impl Into<String>) -> Self {
        self.supported_types.push(ty.into());
        self
    }

    /// Find property by name
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.options.iter().find(|p| p.name == name)
    }

    /// Whether `name` is one of this transform's properties
    #[inline]
    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }
}

/// Ordered catalog of transforms plus the row-level filter options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformCatalog {
    /// Transforms in selector order
    #[serde(default)]
    pub transforms: Vec<TransformDescriptor>,
    /// Filter options offered by the "on" selector
    #[serde(default)]
    pub filters: Vec<FilterOption>,
}

impl TransformCatalog {
    /// Build a catalog, rejecting duplicate names
    pub fn new(
        transforms: Vec<TransformDescriptor>,
        filters: Vec<FilterOption>,
    ) -> Result<Self, CatalogError> {
        let catalog = Self {
            transforms,
            filters,
        };
        catalog.check_unique()?;
        Ok(catalog)
    }

    /// Parse from JSON
    ///
    /// Accepts a `{ "transforms": [...], "filters": [...] }` object or a bare
    /// array of transforms.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let value: Value = serde_json::from_str(json)?;
        let catalog: Self = if value.is_array() {
            Self {
                transforms: serde_json::from_value(value)?,
                filters: Vec::new(),
            }
        } else {
            serde_json::from_value(value)?
        };
        catalog.check_unique()?;
        Ok(catalog)
    }

    /// Parse from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_yaml::from_str(yaml)?;
        catalog.check_unique()?;
        Ok(catalog)
    }

    /// Load from a file; `.yaml`/`.yml` parse as YAML, anything else as JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|source| CatalogError::io_error(path, source))?;

        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml" | "yml")
        );
        let catalog = if is_yaml {
            Self::from_yaml(&text)?
        } else {
            Self::from_json(&text)?
        };

        tracing::debug!(
            path = %path.display(),
            transforms = catalog.transforms.len(),
            "loaded transform catalog"
        );
        Ok(catalog)
    }

    /// Find transform by name
    ///
    /// Absence is a normal outcome: a row may reference a transform that
    /// the current catalog no longer offers.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&TransformDescriptor> {
        self.transforms.iter().find(|t| t.name == name)
    }

    /// Normalised filter options
    #[must_use]
    pub fn filter_choices(&self) -> Vec<FilterChoice> {
        self.filters.iter().map(FilterOption::to_choice).collect()
    }

    /// Whether the catalog has no transforms
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    fn check_unique(&self) -> Result<(), CatalogError> {
        let mut names = HashSet::new();
        for transform in &self.transforms {
            if !names.insert(transform.name.as_str()) {
                return Err(CatalogError::DuplicateTransform(transform.name.clone()));
            }

            let mut props = HashSet::new();
            for prop in &transform.options {
                if !props.insert(prop.name.as_str()) {
                    return Err(CatalogError::DuplicateProperty {
                        transform: transform.name.clone(),
                        property: prop.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
