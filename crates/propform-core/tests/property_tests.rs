use std::sync::Arc;

use propform_core::filters::is_exclusive;
use propform_core::{
    apply_filter_change, reconcile, EngineConfig, MacroToggle, PropertyValues, RowReducer,
    RowState, TransformCatalog,
};
use proptest::prelude::*;

fn name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}"
}

fn property_values() -> impl Strategy<Value = PropertyValues> {
    prop::collection::vec((name(), "[ -~]{0,12}"), 0..6)
        .prop_map(|pairs| pairs.into_iter().collect())
}

fn row_state() -> impl Strategy<Value = RowState> {
    (
        "[A-Za-z][A-Za-z0-9]{0,9}",
        prop::collection::vec(name(), 0..4),
        prop::collection::vec("[A-Z_]{1,8}", 0..3),
        property_values(),
        any::<bool>(),
    )
        .prop_map(|(transform, fields, filters, properties, expanded)| RowState {
            transform,
            fields,
            filters,
            properties,
            expanded,
            ..RowState::default()
        })
}

fn filter_id() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("NONE".to_string()),
        Just("EMAIL".to_string()),
        Just("PHONE".to_string()),
        Just("US_SSN".to_string()),
    ]
}

proptest! {
    #[test]
    fn prop_transport_round_trip(state in row_state()) {
        let config = EngineConfig::default();
        let decoded = RowState::from_transport(&state.to_transport(&config), &config);
        prop_assert_eq!(decoded, state);
    }

    #[test]
    fn prop_empty_transform_serializes_empty(mut state in row_state()) {
        state.transform.clear();
        prop_assert_eq!(state.to_transport(&EngineConfig::default()), "");
    }

    #[test]
    fn prop_filters_stay_exclusive(
        events in prop::collection::vec(prop::collection::vec(filter_id(), 0..4), 1..12)
    ) {
        let mut selection: Vec<String> = Vec::new();
        for incoming in events {
            selection = apply_filter_change(&selection, &incoming, "NONE");
            prop_assert!(is_exclusive(&selection, "NONE"), "{:?}", selection);
        }
    }

    #[test]
    fn prop_loaded_filters_are_exclusive(filters in prop::collection::vec(filter_id(), 0..5)) {
        let reducer = RowReducer::new(Arc::new(TransformCatalog::default()), EngineConfig::default());
        let state = RowState {
            transform: "Hash".to_string(),
            filters,
            ..RowState::default()
        };
        let loaded = reducer.sanitize(state);
        prop_assert!(is_exclusive(&loaded.filters, "NONE"), "{:?}", loaded.filters);
    }

    #[test]
    fn prop_reconcile_identity_is_unchanged(values in property_values()) {
        prop_assert!(reconcile(&values, &values).is_unchanged());
    }

    #[test]
    fn prop_macro_double_toggle_clears(value in "[a-zA-Z0-9 ]{0,16}") {
        let toggle = MacroToggle::new(&EngineConfig::default());
        let start = toggle.is_macro(&value, true);
        prop_assert!(!start);

        let on = toggle.toggle(start, true, false).unwrap();
        let off = toggle.toggle(toggle.is_macro(&on.value, true), true, false).unwrap();
        prop_assert_eq!(off.value, "");
        prop_assert!(!off.is_macro);

        prop_assert!(toggle.toggle(start, false, false).is_none());
    }
}
