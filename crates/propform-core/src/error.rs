//! Error types for the row engine
//!
//! Decoders return these; the state-transition API absorbs them and falls
//! back to a well-defined empty state instead of surfacing them.

use std::path::PathBuf;

/// Errors decoding a serialized row
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Row payload is not valid JSON for a row record
    #[error("invalid row payload: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Row payload is JSON but not an object
    #[error("row payload is not a JSON object")]
    NotARecord,
}

/// Errors decoding a validation error locator
#[derive(Debug, thiserror::Error)]
pub enum LocatorError {
    /// Locator is not a JSON locator record
    #[error("invalid error locator: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Errors loading a transform catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// IO error reading the catalog file
    #[error("io error reading {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Catalog JSON is malformed
    #[error("invalid catalog json: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Catalog YAML is malformed
    #[error("invalid catalog yaml: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    /// Two transforms share a name
    #[error("duplicate transform name: '{0}'")]
    DuplicateTransform(String),

    /// Two properties of one transform share a name
    #[error("duplicate property '{property}' in transform '{transform}'")]
    DuplicateProperty {
        /// Owning transform
        transform: String,
        /// Repeated property name
        property: String,
    },
}

/// Errors decoding an upstream stage schema
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Schema is not valid JSON
    #[error("invalid stage schema: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Errors loading engine configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading the config file
    #[error("io error reading {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config JSON is malformed
    #[error("invalid config json: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Config YAML is malformed
    #[error("invalid config yaml: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    /// Config TOML is malformed
    #[error("invalid config toml: {0}")]
    InvalidToml(#[from] toml::de::Error),

    /// File extension is not a known config format
    #[error("unsupported config format: '{0}'")]
    UnsupportedFormat(String),

    /// A value is outside what the engine accepts
    #[error("invalid config value for {key}: {reason}")]
    Invalid {
        /// Offending key
        key: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

impl CatalogError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create invalid value error
    pub fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Combined engine error
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// Row payload error
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Locator error
    #[error("locator error: {0}")]
    Locator(#[from] LocatorError),

    /// Catalog error
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Stage schema error
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Configuration error
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for engine operations
pub type FormResult<T> = Result<T, FormError>;
