//! Engine configuration
//!
//! Values every component of a row must agree on: the multi-value
//! delimiter, the exclusive filter sentinel, and the macro presentation
//! rules. Loadable from JSON, YAML or TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Widget kinds that accept free text and keep their editor in macro mode
pub const DEFAULT_EDITOR_WIDGETS: &[&str] = &[
    "javascript-editor",
    "python-editor",
    "rules-engine-editor",
    "scala-editor",
    "sql-editor",
    "textarea",
    "wrangler-directives",
];

/// Configuration shared by the row engine components
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Joins multi-valued `fields` and `filters` in the transport form
    pub delimiter: String,
    /// Filter id that excludes every other filter
    pub none_filter: String,
    /// Value written when macro mode is switched on
    pub macro_placeholder: String,
    /// Widget kinds presented unchanged while in macro mode
    pub editor_widgets: Vec<String>,
    /// Widget kind forced for macro entry
    pub macro_widget: String,
    /// Widget kind never handed to rendering
    pub hidden_widget: String,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With multi-value delimiter
    #[inline]
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// With exclusive filter sentinel
    #[inline]
    #[must_use]
    pub fn with_none_filter(mut self, none_filter: impl Into<String>) -> Self {
        self.none_filter = none_filter.into();
        self
    }

    /// With macro placeholder value
    #[inline]
    #[must_use]
    pub fn with_macro_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.macro_placeholder = placeholder.into();
        self
    }

    /// With additional editor widget kind
    #[must_use]
    pub fn with_editor_widget(mut self, widget: impl Into<String>) -> Self {
        let widget = widget.into();
        if !self.editor_widgets.contains(&widget) {
            self.editor_widgets.push(widget);
        }
        self
    }

    /// Whether `widget_type` keeps its own editor in macro mode
    #[inline]
    #[must_use]
    pub fn is_editor_widget(&self, widget_type: &str) -> bool {
        self.editor_widgets.iter().any(|w| w == widget_type)
    }

    /// Check values the engine cannot work with
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for an empty delimiter, sentinel or
    /// macro widget, or a sentinel containing the delimiter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.delimiter.is_empty() {
            return Err(ConfigError::invalid("delimiter", "must not be empty"));
        }
        if self.none_filter.is_empty() {
            return Err(ConfigError::invalid("none_filter", "must not be empty"));
        }
        if self.none_filter.contains(self.delimiter.as_str()) {
            return Err(ConfigError::invalid(
                "none_filter",
                format!("must not contain the delimiter '{}'", self.delimiter),
            ));
        }
        if self.macro_widget.is_empty() {
            return Err(ConfigError::invalid("macro_widget", "must not be empty"));
        }
        Ok(())
    }

    /// Parse from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from TOML string
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from file, choosing the format by extension
    ///
    /// # Errors
    /// Returns error if the file cannot be read, the extension is not one
    /// of `json`, `yaml`, `yml`, `toml`, or the content is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|source| ConfigError::io_error(path, source))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let config = match extension.as_str() {
            "json" => Self::from_json(&text)?,
            "yaml" | "yml" => Self::from_yaml(&text)?,
            "toml" => Self::from_toml(&text)?,
            _ => return Err(ConfigError::UnsupportedFormat(extension)),
        };

        tracing::debug!(path = %path.display(), "loaded engine config");
        Ok(config)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            none_filter: "NONE".to_string(),
            macro_placeholder: "${}".to_string(),
            editor_widgets: DEFAULT_EDITOR_WIDGETS
                .iter()
                .map(|w| (*w).to_string())
                .collect(),
            macro_widget: "textbox".to_string(),
            hidden_widget: "hidden".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = EngineConfig::default();
        assert_eq!(config.delimiter, ",");
        assert_eq!(config.none_filter, "NONE");
        assert_eq!(config.macro_placeholder, "${}");
        assert!(config.is_editor_widget("sql-editor"));
        assert!(!config.is_editor_widget("select"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_setters() {
        let config = EngineConfig::new()
            .with_delimiter(";")
            .with_none_filter("NO_FILTER")
            .with_editor_widget("json-editor")
            .with_editor_widget("json-editor");

        assert_eq!(config.delimiter, ";");
        assert_eq!(config.none_filter, "NO_FILTER");
        assert_eq!(
            config
                .editor_widgets
                .iter()
                .filter(|w| *w == "json-editor")
                .count(),
            1
        );
    }

    #[test]
    fn partial_json_defaults_missing_keys() {
        let config = EngineConfig::from_json(r#"{"delimiter": "|"}"#).unwrap();
        assert_eq!(config.delimiter, "|");
        assert_eq!(config.none_filter, "NONE");
        assert_eq!(config.macro_widget, "textbox");
    }

    #[test]
    fn yaml_and_toml() {
        let yaml = EngineConfig::from_yaml("none_filter: SKIP\n").unwrap();
        assert_eq!(yaml.none_filter, "SKIP");

        let toml = EngineConfig::from_toml("macro_widget = \"textarea\"\n").unwrap();
        assert_eq!(toml.macro_widget, "textarea");
    }

    #[test]
    fn rejects_empty_delimiter() {
        let result = EngineConfig::from_json(r#"{"delimiter": ""}"#);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn rejects_sentinel_containing_delimiter() {
        let config = EngineConfig::new().with_none_filter("NO,NE");
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn load_by_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();

        let toml_path = dir.join("engine.toml");
        std::fs::write(&toml_path, "delimiter = \";\"\n").unwrap();
        assert_eq!(EngineConfig::load(&toml_path).unwrap().delimiter, ";");

        let ini_path = dir.join("engine.ini");
        std::fs::write(&ini_path, "delimiter=;").unwrap();
        assert!(matches!(
            EngineConfig::load(&ini_path),
            Err(ConfigError::UnsupportedFormat(_))
        ));

        assert!(matches!(
            EngineConfig::load(dir.join("missing.json")),
            Err(ConfigError::Io { .. })
        ));
    }
}
