//! Property set reconciliation
//!
//! The nested property editor re-emits its values on every mount, and may
//! omit keys whose value was cleared. Only a real difference may propagate,
//! otherwise the row notifies, re-renders, and the editor emits again.

use crate::value_store::PropertyValues;

/// Keys that differ between two property maps
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyDiff {
    changed: Vec<String>,
}

impl PropertyDiff {
    /// Changed keys in scan order
    #[inline]
    #[must_use]
    pub fn changed(&self) -> &[String] {
        &self.changed
    }

    /// Number of changed keys
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.changed.len()
    }

    /// Whether nothing changed
    #[inline]
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.changed.is_empty()
    }
}

/// Diff `old` against `new`
///
/// The map with more keys is scanned (`new` on ties). A key is changed
/// when it is missing from the other map while holding a non-empty value,
/// or present in both with different values.
#[must_use]
pub fn reconcile(old: &PropertyValues, new: &PropertyValues) -> PropertyDiff {
    let (longer, shorter) = if new.len() >= old.len() {
        (new, old)
    } else {
        (old, new)
    };

    let changed = longer
        .iter()
        .filter(|(key, value)| match shorter.get(*key) {
            None => !value.is_empty(),
            Some(other) => other != *value,
        })
        .map(|(key, _)| key.clone())
        .collect();

    PropertyDiff { changed }
}
