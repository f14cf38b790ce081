//! Dynamic Property Form Engine
//!
//! Decides, from a declarative catalog of property descriptors and a row's
//! current values, what a configurable row renders, how its values change,
//! and where validation errors are shown.
//!
//! # Core Concepts
//!
//! - [`ValueStore`]: property-name to value mapping of one row
//! - [`MacroToggle`]: literal versus macro-placeholder mode per property
//! - [`classify`]: routes validation errors to the row or to one property
//! - [`reconcile`]: changed-key diff that stops editor feedback loops
//! - [`RowFormController`]: owns a [`RowState`], applies [`RowEvent`]s and
//!   notifies the caller with the re-serialized row
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use propform_core::{
//!     EngineConfig, PropertyDescriptor, RowEvent, RowFormController, TransformCatalog,
//!     TransformDescriptor,
//! };
//!
//! let catalog = TransformCatalog::new(
//!     vec![TransformDescriptor::new("Hash", "Hash")
//!         .with_option(PropertyDescriptor::new("algo", "select").with_default("SHA256"))],
//!     vec![],
//! )
//! .unwrap();
//!
//! let mut row = RowFormController::detached("", Arc::new(catalog), EngineConfig::default());
//! let emitted = row.dispatch(&RowEvent::SelectTransform { transform: "Hash".into() });
//!
//! assert!(emitted.is_some());
//! assert_eq!(row.state().properties["algo"], "SHA256");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod classifier;
pub mod config;
pub mod controller;
pub mod error;
pub mod fields;
pub mod filters;
pub mod macro_toggle;
pub mod reconciler;
pub mod reducer;
pub mod schema;
pub mod state;
pub mod value_store;

// Re-exports
pub use classifier::{classify, ClassifiedErrors, ErrorEntry, ErrorLocator};
pub use config::EngineConfig;
pub use controller::{
    ChangeSink, NoopSink, RecordingSink, RenderDescriptor, RowFormController, TransformOption,
};
pub use error::{
    CatalogError, ConfigError, FormError, FormResult, LocatorError, SchemaError, TransportError,
};
pub use fields::{available_fields, prune_selection, InputSchema, SchemaField};
pub use filters::apply_filter_change;
pub use macro_toggle::{
    present, EffectiveWidget, MacroDetector, MacroToggle, ToggleOutcome, WrappedMacroDetector,
};
pub use reconciler::{reconcile, PropertyDiff};
pub use reducer::{RowEvent, RowReducer, Transition};
pub use schema::{
    FilterChoice, FilterOption, PropertyDescriptor, TransformCatalog, TransformDescriptor,
    WidgetAttributes,
};
pub use state::RowState;
pub use value_store::{PropertyValues, ValueStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a row
    pub use crate::{
        ChangeSink, EngineConfig, ErrorEntry, ErrorLocator, RenderDescriptor, RowEvent,
        RowFormController, RowState, TransformCatalog,
    };
}
