//! Row form controller
//!
//! Owns one row's state, drives the reducer, and notifies the caller with
//! the re-serialized row after every real change. Produces the descriptor
//! the rendering layer draws from.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::classifier::{classify, ErrorEntry};
use crate::config::EngineConfig;
use crate::fields::{available_fields, prune_selection};
use crate::macro_toggle::{present, EffectiveWidget, MacroDetector, WrappedMacroDetector};
use crate::reducer::{RowEvent, RowReducer, Transition};
use crate::schema::{FilterChoice, TransformCatalog};
use crate::state::RowState;
use crate::value_store::PropertyValues;

/// Receives the serialized row after each change
pub trait ChangeSink {
    /// Called with the new transport string; empty means "not configured"
    fn on_change(&mut self, transport: &str);
}

impl<F: FnMut(&str)> ChangeSink for F {
    fn on_change(&mut self, transport: &str) {
        self(transport);
    }
}

/// Sink that drops notifications
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl ChangeSink for NoopSink {
    fn on_change(&mut self, _transport: &str) {}
}

/// Sink that keeps every notification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSink {
    /// Notifications in emission order
    pub emitted: Vec<String>,
}

impl ChangeSink for RecordingSink {
    fn on_change(&mut self, transport: &str) {
        self.emitted.push(transport.to_string());
    }
}

/// Transform selector entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformOption {
    /// Transform name
    pub name: String,
    /// Display label
    pub label: String,
}

/// Everything the rendering layer needs for one row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderDescriptor {
    /// Transform selector options in catalog order
    pub transforms: Vec<TransformOption>,
    /// Filter selector options
    pub filter_options: Vec<FilterChoice>,
    /// Field selector options
    pub available_fields: Vec<String>,
    /// Selected transform, empty when none
    pub selected_transform: String,
    /// Selected filters
    pub selected_filters: Vec<String>,
    /// Selected fields
    pub selected_fields: Vec<String>,
    /// Widgets for the active transform's properties
    pub effective_widget_list: Vec<EffectiveWidget>,
    /// Current property values
    pub current_values: PropertyValues,
    /// Row-level validation messages
    pub local_errors: Vec<String>,
    /// Validation messages by property
    pub nested_errors_by_property: IndexMap<String, Vec<String>>,
    /// Property visibility filters of the active transform
    pub property_filters: Vec<Value>,
    /// Whether the property panel is revealed
    pub is_expanded: bool,
    /// Whether the property panel is drawn
    pub show_properties: bool,
    /// Whether the expand control is enabled
    pub can_expand: bool,
}

/// Controller for one configurable row
#[derive(Debug)]
pub struct RowFormController<S: ChangeSink = NoopSink, D: MacroDetector = WrappedMacroDetector> {
    reducer: RowReducer<D>,
    state: RowState,
    sink: S,
}

impl RowFormController<NoopSink> {
    /// Controller whose changes are only observable through return values
    #[must_use]
    pub fn detached(transport: &str, catalog: Arc<TransformCatalog>, config: EngineConfig) -> Self {
        Self::new(transport, catalog, config, NoopSink)
    }
}

impl<S: ChangeSink> RowFormController<S> {
    /// Load a row from its transport string
    ///
    /// Unreadable input yields a fresh row. Property values the catalog
    /// does not declare for the row's transform are dropped.
    pub fn new(
        transport: &str,
        catalog: Arc<TransformCatalog>,
        config: EngineConfig,
        sink: S,
    ) -> Self {
        Self::from_reducer(transport, RowReducer::new(catalog, config), sink)
    }
}

impl<S: ChangeSink, D: MacroDetector> RowFormController<S, D> {
    /// Load a row through a prepared reducer
    pub fn from_reducer(transport: &str, reducer: RowReducer<D>, sink: S) -> Self {
        let state = reducer.sanitize(RowState::from_transport(transport, reducer.config()));
        Self {
            reducer,
            state,
            sink,
        }
    }

    /// With disabled flag
    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.reducer.set_disabled(disabled);
        self
    }

    /// Set disabled flag
    pub fn set_disabled(&mut self, disabled: bool) {
        self.reducer.set_disabled(disabled);
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> &RowState {
        &self.state
    }

    /// Current transport string
    #[must_use]
    pub fn transport(&self) -> String {
        self.state.to_transport(self.reducer.config())
    }

    /// Engine configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        self.reducer.config()
    }

    /// Borrow the sink
    #[inline]
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Take the sink
    #[must_use]
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Apply an event
    ///
    /// Returns the emitted transport string when the row changed. Unchanged
    /// transitions notify nobody.
    pub fn dispatch(&mut self, event: &RowEvent) -> Option<String> {
        match self.reducer.reduce(&self.state, event) {
            Transition::Unchanged => None,
            Transition::Updated(next) => {
                self.state = next;
                let transport = self.transport();
                tracing::debug!(
                    transform = %self.state.transform,
                    bytes = transport.len(),
                    "row changed"
                );
                self.sink.on_change(&transport);
                Some(transport)
            }
        }
    }

    /// Build the render descriptor
    ///
    /// When stage schemas are given, field selections no longer offered
    /// upstream are pruned. Errors are classified against the resulting
    /// state; a nested error reveals the property panel. Both adjustments
    /// go through [`Self::dispatch`] and notify only on a real change.
    pub fn render<T: AsRef<str>>(
        &mut self,
        errors: &[ErrorEntry],
        stage_schemas: &[T],
    ) -> RenderDescriptor {
        let allowed = self
            .reducer
            .active_transform(&self.state)
            .map(|t| t.supported_types.clone())
            .unwrap_or_default();

        let fields = if stage_schemas.is_empty() {
            Vec::new()
        } else {
            let fields = available_fields(stage_schemas, &allowed);
            let pruned = prune_selection(&self.state.fields, &fields);
            if pruned != self.state.fields {
                self.dispatch(&RowEvent::ChangeFields { fields: pruned });
            }
            fields
        };

        let classified = classify(errors, &self.state, self.reducer.config());
        if classified.has_nested() {
            self.dispatch(&RowEvent::RevealProperties);
        }

        let config = self.reducer.config();
        let state = &self.state;
        let active = self.reducer.active_transform(state);

        let effective_widget_list = active
            .map(|transform| {
                transform
                    .options
                    .iter()
                    .filter_map(|descriptor| {
                        let value = state
                            .properties
                            .get(&descriptor.name)
                            .map_or("", String::as_str);
                        let is_macro = state.is_macro(&descriptor.name);
                        present(descriptor, value, is_macro, config).map(|mut widget| {
                            widget.errors = classified.for_property(&descriptor.name).to_vec();
                            widget
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let catalog = self.reducer.catalog();
        let has_properties = !state.properties.is_empty();

        RenderDescriptor {
            transforms: catalog
                .transforms
                .iter()
                .map(|t| TransformOption {
                    name: t.name.clone(),
                    label: t.label.clone(),
                })
                .collect(),
            filter_options: catalog.filter_choices(),
            available_fields: fields,
            selected_transform: state.transform.clone(),
            selected_filters: state.filters.clone(),
            selected_fields: state.fields.clone(),
            effective_widget_list,
            current_values: state.properties.clone(),
            local_errors: classified.local.clone(),
            nested_errors_by_property: classified.nested.clone(),
            property_filters: active.map(|t| t.filters.clone()).unwrap_or_default(),
            is_expanded: state.expanded,
            show_properties: state.has_transform() && has_properties && state.expanded,
            can_expand: state.has_transform() && has_properties,
        }
    }
}
