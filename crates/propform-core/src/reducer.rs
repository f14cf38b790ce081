//! Row state reducer
//!
//! `(state, event) -> transition`. A transition is either `Unchanged` or a
//! new state; only the latter may be propagated to the caller.

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::FormResult;
use crate::filters::apply_filter_change;
use crate::macro_toggle::{MacroDetector, MacroToggle, WrappedMacroDetector};
use crate::reconciler::reconcile;
use crate::schema::{TransformCatalog, TransformDescriptor};
use crate::state::RowState;
use crate::value_store::{PropertyValues, ValueStore};

/// User or editor input for one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RowEvent {
    /// Pick a transform; an empty name clears the selection
    SelectTransform {
        /// Transform name
        transform: String,
    },
    /// Replace the filter selection
    ChangeFilters {
        /// Filter ids as reported by the selector
        filters: Vec<String>,
    },
    /// Replace the field selection
    ChangeFields {
        /// Field names
        fields: Vec<String>,
    },
    /// Full value map reported by the nested property editor
    ChangeProperties {
        /// Property values
        values: PropertyValues,
    },
    /// Edit one property
    SetProperty {
        /// Property name
        name: String,
        /// New value
        value: String,
    },
    /// Flip macro mode of one property
    ToggleMacro {
        /// Property name
        name: String,
    },
    /// Collapse, or expand when the row has properties
    ToggleExpanded,
    /// Expand the property panel, used when a property carries an error
    RevealProperties,
}

/// Result of applying an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Nothing to propagate
    Unchanged,
    /// New state to store and propagate
    Updated(RowState),
}

impl Transition {
    /// Whether the event changed the row
    #[inline]
    #[must_use]
    pub fn is_updated(&self) -> bool {
        matches!(self, Self::Updated(_))
    }
}

/// Pure reducer over [`RowState`]
#[derive(Debug, Clone)]
pub struct RowReducer<D: MacroDetector = WrappedMacroDetector> {
    catalog: Arc<TransformCatalog>,
    config: EngineConfig,
    macros: MacroToggle<D>,
    disabled: bool,
}

impl RowReducer {
    /// Create reducer over a shared catalog
    #[must_use]
    pub fn new(catalog: Arc<TransformCatalog>, config: EngineConfig) -> Self {
        let macros = MacroToggle::new(&config);
        Self {
            catalog,
            config,
            macros,
            disabled: false,
        }
    }

    /// Load catalog and optional engine config from files
    ///
    /// # Errors
    /// Returns the catalog or config error of whichever file fails.
    pub fn load(catalog: &Path, config: Option<&Path>) -> FormResult<Self> {
        let config = match config {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };
        let catalog = TransformCatalog::load(catalog)?;
        Ok(Self::new(Arc::new(catalog), config))
    }
}

impl<D: MacroDetector> RowReducer<D> {
    /// Replace the macro predicate
    #[must_use]
    pub fn with_macro_detector<E: MacroDetector>(self, detector: E) -> RowReducer<E> {
        RowReducer {
            macros: MacroToggle::with_detector(&self.config, detector),
            catalog: self.catalog,
            config: self.config,
            disabled: self.disabled,
        }
    }

    /// With disabled flag; disabled rows ignore macro toggles
    #[inline]
    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set disabled flag
    #[inline]
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Whether the row is disabled
    #[inline]
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Engine configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared catalog
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &Arc<TransformCatalog> {
        &self.catalog
    }

    /// Macro decisions
    #[inline]
    #[must_use]
    pub fn macros(&self) -> &MacroToggle<D> {
        &self.macros
    }

    /// Descriptor of the row's transform, if the catalog offers it
    #[must_use]
    pub fn active_transform(&self, state: &RowState) -> Option<&TransformDescriptor> {
        if state.has_transform() {
            self.catalog.find(&state.transform)
        } else {
            None
        }
    }

    /// Restore row invariants on a loaded state
    ///
    /// Drops property values the active transform does not declare,
    /// collapses a sentinel-plus-concrete filter selection to the sentinel,
    /// keeps the panel collapsed when no property is left and rebuilds
    /// macro mode from the values.
    #[must_use]
    pub fn sanitize(&self, mut state: RowState) -> RowState {
        state.filters = apply_filter_change(&[], &state.filters, &self.config.none_filter);

        if state.has_transform() {
            match self.catalog.find(&state.transform) {
                Some(transform) => state.properties.retain(|k, _| transform.has_property(k)),
                None => state.properties.clear(),
            }
        } else {
            state.properties.clear();
        }

        if state.properties.is_empty() {
            state.expanded = false;
        }
        state.macro_properties = self.detect_macros(&state);
        state
    }

    /// Properties whose current value reads as a macro
    fn detect_macros(&self, state: &RowState) -> IndexSet<String> {
        let Some(transform) = self.active_transform(state) else {
            return IndexSet::new();
        };

        transform
            .options
            .iter()
            .filter(|descriptor| {
                let value = state
                    .properties
                    .get(&descriptor.name)
                    .map_or("", String::as_str);
                self.macros
                    .is_macro(value, descriptor.widget_attributes.macro_supported())
            })
            .map(|descriptor| descriptor.name.clone())
            .collect()
    }

    /// Apply `event` to `state`
    #[must_use]
    pub fn reduce(&self, state: &RowState, event: &RowEvent) -> Transition {
        match event {
            RowEvent::SelectTransform { transform } => self.select_transform(state, transform),
            RowEvent::ChangeFilters { filters } => {
                let next = apply_filter_change(&state.filters, filters, &self.config.none_filter);
                if next == state.filters {
                    return Transition::Unchanged;
                }
                Transition::Updated(RowState {
                    filters: next,
                    ..state.clone()
                })
            }
            RowEvent::ChangeFields { fields } => {
                let mut next: Vec<String> = Vec::with_capacity(fields.len());
                for field in fields {
                    if !field.is_empty() && !next.contains(field) {
                        next.push(field.clone());
                    }
                }
                if next == state.fields {
                    return Transition::Unchanged;
                }
                Transition::Updated(RowState {
                    fields: next,
                    ..state.clone()
                })
            }
            RowEvent::ChangeProperties { values } => self.change_properties(state, values),
            RowEvent::SetProperty { name, value } => self.set_property(state, name, value),
            RowEvent::ToggleMacro { name } => self.toggle_macro(state, name),
            RowEvent::ToggleExpanded => {
                if state.expanded {
                    Transition::Updated(RowState {
                        expanded: false,
                        ..state.clone()
                    })
                } else if state.has_transform() && !state.properties.is_empty() {
                    Transition::Updated(RowState {
                        expanded: true,
                        ..state.clone()
                    })
                } else {
                    Transition::Unchanged
                }
            }
            RowEvent::RevealProperties => {
                if state.expanded || !state.has_transform() {
                    return Transition::Unchanged;
                }
                Transition::Updated(RowState {
                    expanded: true,
                    ..state.clone()
                })
            }
        }
    }

    fn select_transform(&self, state: &RowState, name: &str) -> Transition {
        if name == state.transform {
            return Transition::Unchanged;
        }

        if name.is_empty() {
            tracing::debug!(previous = %state.transform, "transform cleared");
            return Transition::Updated(RowState {
                transform: String::new(),
                properties: PropertyValues::new(),
                expanded: false,
                macro_properties: IndexSet::new(),
                ..state.clone()
            });
        }

        let properties = match self.catalog.find(name) {
            Some(transform) => ValueStore::from_defaults(&transform.options).into_values(),
            None => {
                tracing::warn!(transform = %name, "selected transform is not in the catalog");
                PropertyValues::new()
            }
        };

        tracing::info!(
            transform = %name,
            properties = properties.len(),
            "transform selected"
        );

        let mut next = RowState {
            transform: name.to_string(),
            expanded: !properties.is_empty(),
            properties,
            ..state.clone()
        };
        next.macro_properties = self.detect_macros(&next);
        Transition::Updated(next)
    }

    fn change_properties(&self, state: &RowState, values: &PropertyValues) -> Transition {
        let Some(transform) = self.active_transform(state) else {
            return Transition::Unchanged;
        };

        let next: PropertyValues = values
            .iter()
            .filter(|(k, _)| transform.has_property(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let diff = reconcile(&state.properties, &next);
        if diff.is_unchanged() {
            tracing::trace!(transform = %state.transform, "property values unchanged");
            return Transition::Unchanged;
        }

        tracing::debug!(changed = ?diff.changed(), "property values changed");
        Transition::Updated(RowState {
            properties: next,
            ..state.clone()
        })
    }

    fn set_property(&self, state: &RowState, name: &str, value: &str) -> Transition {
        let Some(transform) = self.active_transform(state) else {
            return Transition::Unchanged;
        };
        if !transform.has_property(name) {
            tracing::debug!(property = %name, "ignoring edit of undeclared property");
            return Transition::Unchanged;
        }

        if state.properties.get(name).map(String::as_str) == Some(value) {
            return Transition::Unchanged;
        }

        let store = ValueStore::from(state.properties.clone()).set(name, value);
        Transition::Updated(RowState {
            properties: store.into_values(),
            ..state.clone()
        })
    }

    fn toggle_macro(&self, state: &RowState, name: &str) -> Transition {
        let Some(descriptor) = self
            .active_transform(state)
            .and_then(|t| t.property(name))
        else {
            return Transition::Unchanged;
        };

        let supported = descriptor.widget_attributes.macro_supported();
        let Some(outcome) = self
            .macros
            .toggle(state.is_macro(name), supported, self.disabled)
        else {
            return Transition::Unchanged;
        };

        let mut next = state.clone();
        next.properties = ValueStore::from(next.properties)
            .set(name, outcome.value)
            .into_values();
        if outcome.is_macro {
            next.macro_properties.insert(name.to_string());
        } else {
            next.macro_properties.shift_remove(name);
        }
        Transition::Updated(next)
    }
}
