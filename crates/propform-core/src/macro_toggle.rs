//! Macro placeholder mode per property
//!
//! Macro mode is a per-property flag flipped by the toggle. A detector
//! seeds it when a row is loaded: a property that supports macros and holds
//! a single `${...}` substitution starts in macro mode. Macro entry is always presented as a plain
//! text box unless the original widget is already a free-text editor.

use serde::Serialize;

use crate::config::EngineConfig;
use crate::schema::{PropertyDescriptor, WidgetAttributes};

/// Recognises macro placeholder values
pub trait MacroDetector: Send + Sync + std::fmt::Debug {
    /// Whether `value` is a macro expression
    fn is_macro(&self, value: &str) -> bool;
}

/// Detects values wrapped as exactly one `${...}` expression
///
/// `${}` and `${a${b}}` qualify; `${a}${b}`, `x${a}` and `${a` do not.
#[derive(Debug, Clone, Copy, Default)]
pub struct WrappedMacroDetector;

impl MacroDetector for WrappedMacroDetector {
    fn is_macro(&self, value: &str) -> bool {
        let value = value.trim();
        let Some(body) = value.strip_prefix("${") else {
            return false;
        };

        let mut depth = 1usize;
        for (i, c) in body.char_indices() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return i + c.len_utf8() == body.len();
                    }
                }
                _ => {}
            }
        }
        false
    }
}

/// Outcome of a macro toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// Value to write to the property
    pub value: String,
    /// Macro mode after the toggle
    pub is_macro: bool,
}

/// Macro mode decisions for a row's properties
#[derive(Debug, Clone)]
pub struct MacroToggle<D: MacroDetector = WrappedMacroDetector> {
    detector: D,
    placeholder: String,
}

impl MacroToggle {
    /// Create toggle with the wrapped-expression detector
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_detector(config, WrappedMacroDetector)
    }
}

impl<D: MacroDetector> MacroToggle<D> {
    /// Create toggle with a custom detector
    #[must_use]
    pub fn with_detector(config: &EngineConfig, detector: D) -> Self {
        Self {
            detector,
            placeholder: config.macro_placeholder.clone(),
        }
    }

    /// Whether the property is in macro mode
    #[inline]
    #[must_use]
    pub fn is_macro(&self, value: &str, macro_supported: bool) -> bool {
        macro_supported && self.detector.is_macro(value)
    }

    /// Flip macro mode
    ///
    /// Turning on writes the placeholder, turning off clears the value.
    /// Returns `None` when the field is disabled or does not support macros.
    #[must_use]
    pub fn toggle(
        &self,
        current_is_macro: bool,
        macro_supported: bool,
        disabled: bool,
    ) -> Option<ToggleOutcome> {
        if disabled || !macro_supported {
            return None;
        }

        let is_macro = !current_is_macro;
        let value = if is_macro {
            self.placeholder.clone()
        } else {
            String::new()
        };
        Some(ToggleOutcome { value, is_macro })
    }
}

/// Widget as handed to rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveWidget {
    /// Property name
    pub name: String,
    /// Display label
    pub label: String,
    /// Widget kind to render
    pub widget_type: String,
    /// Attributes for that widget kind
    pub widget_attributes: WidgetAttributes,
    /// Whether the macro indicator is offered
    pub macro_supported: bool,
    /// Whether the property is in macro mode
    pub is_macro: bool,
    /// Current value
    pub value: String,
    /// Validation messages attached to this property
    pub errors: Vec<String>,
}

/// Presentation for one property, `None` for hidden widgets
///
/// In macro mode a non-editor widget is replaced by the configured plain
/// text widget with no attributes.
#[must_use]
pub fn present(
    descriptor: &PropertyDescriptor,
    value: &str,
    is_macro: bool,
    config: &EngineConfig,
) -> Option<EffectiveWidget> {
    if descriptor.widget_type == config.hidden_widget {
        return None;
    }

    let (widget_type, widget_attributes) =
        if is_macro && !config.is_editor_widget(&descriptor.widget_type) {
            (config.macro_widget.clone(), WidgetAttributes::new())
        } else {
            (
                descriptor.widget_type.clone(),
                descriptor.widget_attributes.clone(),
            )
        };

    Some(EffectiveWidget {
        name: descriptor.name.clone(),
        label: descriptor.label.clone(),
        widget_type,
        widget_attributes,
        macro_supported: descriptor.widget_attributes.macro_supported(),
        is_macro,
        value: value.to_string(),
        errors: Vec::new(),
    })
}
