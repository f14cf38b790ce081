use pretty_assertions::assert_eq;
use propform_core::{
    classify, reconcile, ErrorEntry, RecordingSink, RowEvent, RowFormController, RowState,
};
use propform_test_utils::{
    config, customer_schema, dlp_catalog, property_error, row, row_error, values,
};

const NO_SCHEMAS: &[&str] = &[];

fn controller(transport: &str) -> RowFormController<RecordingSink> {
    RowFormController::new(transport, dlp_catalog(), config(), RecordingSink::default())
}

#[test]
fn test_fresh_row_from_empty_transport() {
    let state = RowState::from_transport("", &config());
    assert_eq!(state, row("", &[], &[], &[]));
    assert!(!state.expanded);
}

#[test]
fn test_transform_switch_discards_properties() {
    let start = row("Redact", &["f1"], &["NONE"], &[("pattern", "x")]);
    let mut row = controller(&start.to_transport(&config()));

    row.dispatch(&RowEvent::SelectTransform {
        transform: "Hash".to_string(),
    });

    assert_eq!(row.state().properties, values(&[("algo", "SHA256")]));
    assert_eq!(row.state().fields, vec!["f1"]);
}

#[test]
fn test_error_classification_drops_mismatched_fields() {
    let state = row("Redact", &["f1"], &["NONE"], &[]);
    let other = row("Redact", &["f2"], &["NONE"], &[]);
    let errors = vec![row_error(&state, "pattern required"), row_error(&other, "stale")];

    let classified = classify(&errors, &state, &config());

    assert_eq!(classified.local, vec!["pattern required"]);
    assert!(classified.nested.is_empty());
}

#[test]
fn test_reconciler_cleared_key() {
    let diff = reconcile(&values(&[("a", "1"), ("b", "2")]), &values(&[("a", "1")]));
    assert_eq!(diff.len(), 1);

    let diff = reconcile(&values(&[("a", "1"), ("b", "")]), &values(&[("a", "1")]));
    assert!(diff.is_unchanged());
}

#[test]
fn test_editor_re_emit_does_not_loop() {
    let mut row = controller("");
    row.dispatch(&RowEvent::SelectTransform {
        transform: "Mask".to_string(),
    });
    let after_select = row.sink().emitted.len();

    // The nested editor re-emits its mount-time values, once with the empty
    // script omitted.
    let full = row.state().properties.clone();
    let mut omitted = full.clone();
    omitted.shift_remove("script");

    for _ in 0..5 {
        row.dispatch(&RowEvent::ChangeProperties {
            values: full.clone(),
        });
        row.dispatch(&RowEvent::ChangeProperties {
            values: omitted.clone(),
        });
    }

    assert_eq!(row.sink().emitted.len(), after_select);
}

#[test]
fn test_clearing_transform_emits_empty() {
    let mut row = controller("");
    row.dispatch(&RowEvent::SelectTransform {
        transform: "Hash".to_string(),
    });
    row.dispatch(&RowEvent::ChangeFields {
        fields: vec!["email".to_string()],
    });
    let emitted = row.dispatch(&RowEvent::SelectTransform {
        transform: String::new(),
    });

    assert_eq!(emitted.as_deref(), Some(""));
    assert_eq!(row.transport(), "");
}

#[test]
fn test_filter_changes_through_controller() {
    let mut row = controller("");
    row.dispatch(&RowEvent::SelectTransform {
        transform: "Redact".to_string(),
    });

    row.dispatch(&RowEvent::ChangeFilters {
        filters: vec!["EMAIL_ADDRESS".to_string(), "PHONE_NUMBER".to_string()],
    });
    row.dispatch(&RowEvent::ChangeFilters {
        filters: vec![
            "EMAIL_ADDRESS".to_string(),
            "PHONE_NUMBER".to_string(),
            "NONE".to_string(),
        ],
    });
    assert_eq!(row.state().filters, vec!["NONE"]);

    row.dispatch(&RowEvent::ChangeFilters {
        filters: vec!["NONE".to_string(), "US_SSN".to_string()],
    });
    assert_eq!(row.state().filters, vec!["US_SSN"]);

    let transport: serde_json::Value = serde_json::from_str(&row.transport()).unwrap();
    assert_eq!(transport["filters"], "US_SSN");
}

#[test]
fn test_render_full_row() {
    let mut row = controller("");
    row.dispatch(&RowEvent::SelectTransform {
        transform: "Redact".to_string(),
    });
    row.dispatch(&RowEvent::ChangeFields {
        fields: vec!["email".to_string(), "age".to_string()],
    });
    row.dispatch(&RowEvent::ChangeFilters {
        filters: vec!["EMAIL_ADDRESS".to_string()],
    });

    let schema = customer_schema();
    let view = row.render(&[], &[schema.as_str()]);

    // Redact only supports strings, so the int field is pruned.
    assert_eq!(view.available_fields, vec!["email", "phone"]);
    assert_eq!(view.selected_fields, vec!["email"]);

    let state = row.state().clone();
    let errors: Vec<ErrorEntry> = vec![
        row_error(&state, "check filters"),
        property_error(&state, "pattern", "pattern required"),
    ];
    let view = row.render(&errors, &[schema.as_str()]);

    assert_eq!(view.local_errors, vec!["check filters"]);
    assert_eq!(
        view.nested_errors_by_property.get("pattern").cloned(),
        Some(vec!["pattern required".to_string()])
    );
    assert_eq!(view.effective_widget_list.len(), 1);
    assert_eq!(view.effective_widget_list[0].label, "Pattern");
    assert_eq!(view.filter_options[1].label, "Email");
}

#[test]
fn test_macro_editor_widget_kept() {
    let mut row = controller("");
    row.dispatch(&RowEvent::SelectTransform {
        transform: "Mask".to_string(),
    });
    row.dispatch(&RowEvent::ToggleMacro {
        name: "script".to_string(),
    });

    let view = row.render(&[], NO_SCHEMAS);
    let script = view
        .effective_widget_list
        .iter()
        .find(|w| w.name == "script")
        .unwrap();

    assert!(script.is_macro);
    assert_eq!(script.widget_type, "javascript-editor");
}

#[test]
fn test_disabled_row_ignores_macro_toggle() {
    let mut row = controller("").with_disabled(true);
    row.dispatch(&RowEvent::SelectTransform {
        transform: "Hash".to_string(),
    });
    let emitted = row.dispatch(&RowEvent::ToggleMacro {
        name: "algo".to_string(),
    });

    assert!(emitted.is_none());
    assert_eq!(row.state().properties, values(&[("algo", "SHA256")]));
}

#[test]
fn test_reload_round_trip_through_controller() {
    let mut row = controller("");
    row.dispatch(&RowEvent::SelectTransform {
        transform: "Mask".to_string(),
    });
    row.dispatch(&RowEvent::SetProperty {
        name: "keep".to_string(),
        value: "2".to_string(),
    });

    let reloaded = controller(&row.transport());
    assert_eq!(reloaded.state(), row.state());
}
