use serde_json::{Value, json};

use form_snapshot::codec::snapshot_model::Snapshot;
use form_snapshot::extract::descriptor_model::ControlValue;
use form_snapshot::extract::extractor::{ExtractOptions, Extraction, extract};
use form_snapshot::page::dom::{Document, EventKind, NodeId};
use form_snapshot::reconcile::engine::reconcile;
use form_snapshot::report::report_model::RestoreReport;

use crate::common::{
    pages::{checkbox, form_page, page, text_input},
    utils::{blank, fixture},
};

mod common;

// =========================================================================
// Helpers
// =========================================================================

fn capture_with(doc: &Document, options: &ExtractOptions) -> Snapshot {
    let controls = extract(doc, options).unwrap().into_controls();
    Snapshot::new(0, doc.url.clone(), doc.title.clone(), controls)
}

fn capture(doc: &Document) -> Snapshot {
    capture_with(doc, &ExtractOptions::default())
}

fn restore_with(snapshot: &Snapshot, doc: &mut Document, options: &ExtractOptions) -> RestoreReport {
    let live: Extraction = extract(doc, options).unwrap();
    reconcile(snapshot, &live, doc)
}

fn restore(snapshot: &Snapshot, doc: &mut Document) -> RestoreReport {
    restore_with(snapshot, doc, &ExtractOptions::default())
}

fn values(doc: &Document) -> Vec<ControlValue> {
    extract(doc, &ExtractOptions::default())
        .unwrap()
        .controls
        .into_iter()
        .filter(|c| !c.is_container())
        .map(|c| c.value)
        .collect()
}

fn find(doc: &Document, tag: &str, attr: &str, value: &str) -> NodeId {
    doc.ids()
        .find(|id| {
            let el = doc.element(*id);
            el.tag == tag && el.attr(attr) == Some(value)
        })
        .unwrap_or_else(|| panic!("no <{tag} {attr}={value}>"))
}

fn events_on(doc: &Document, node: NodeId) -> Vec<EventKind> {
    doc.events()
        .iter()
        .filter(|e| e.target == node)
        .map(|e| e.kind)
        .collect()
}

fn five_fields(disabled_index: Option<usize>) -> Document {
    let inputs: Vec<Value> = (0..5)
        .map(|i| {
            let mut input = text_input(&format!("f{i}"), &format!("v{i}"));
            if Some(i) == disabled_index {
                input["attributes"]["disabled"] = json!("");
                input["value"] = json!("locked");
            }
            input
        })
        .collect();
    form_page(Value::Array(inputs))
}

// =========================================================================
// Scenario: email + subscribe
// =========================================================================

#[test]
fn signup_values_come_back_after_reload() {
    let filled = fixture("signup.json");
    let snapshot = capture(&filled);

    let mut reloaded = blank(fixture("signup.json"));
    assert_ne!(values(&reloaded), values(&filled));

    let report = restore(&snapshot, &mut reloaded);
    assert_eq!(report.restored_count, 2);
    assert_eq!(report.skipped_count, 0);
    assert!(report.per_control_errors.is_empty());
    assert_eq!(
        values(&reloaded),
        vec![ControlValue::Text("a@b.com".into()), ControlValue::Bool(true)]
    );
}

#[test]
fn restore_is_idempotent() {
    let snapshot = capture(&fixture("profile.json"));
    let mut doc = blank(fixture("profile.json"));

    let first = restore(&snapshot, &mut doc);
    let after_first = values(&doc);
    let second = restore(&snapshot, &mut doc);

    assert_eq!(first.restored_count, second.restored_count);
    assert_eq!(values(&doc), after_first);
}

#[test]
fn restore_never_changes_structure() {
    let snapshot = capture(&fixture("profile.json"));
    let mut doc = blank(fixture("profile.json"));
    let before: Vec<_> = doc
        .ids()
        .map(|id| (doc.element(id).tag.clone(), doc.element(id).attributes.clone()))
        .collect();

    restore(&snapshot, &mut doc);

    let after: Vec<_> = doc
        .ids()
        .map(|id| (doc.element(id).tag.clone(), doc.element(id).attributes.clone()))
        .collect();
    assert_eq!(before, after);
}

// =========================================================================
// Partial failure
// =========================================================================

#[test]
fn one_disabled_counterpart_fails_alone() {
    let snapshot = capture(&five_fields(None));
    let mut live = five_fields(Some(2));

    let report = restore(&snapshot, &mut live);

    assert_eq!(report.restored_count, 4);
    assert_eq!(report.skipped_count, 0);
    assert_eq!(report.per_control_errors.len(), 1);
    let err = &report.per_control_errors[0];
    assert_eq!(err.control.name, "f2");
    assert_eq!(err.message, "control is readonly or disabled");

    let locked = find(&live, "input", "name", "f2");
    assert_eq!(live.element(locked).value, Some(json!("locked")));
}

#[test]
fn missing_controls_are_skipped_not_errors() {
    let snapshot = capture(&form_page(json!([
        text_input("a", "1"),
        {"tag": "textarea", "attributes": {"name": "gone"}, "value": "2"}
    ])));
    let mut live = form_page(json!([text_input("a", "")]));

    let report = restore(&snapshot, &mut live);
    assert_eq!(report.restored_count, 1);
    assert_eq!(report.skipped_count, 1);
    assert!(report.per_control_errors.is_empty());
}

#[test]
fn unknown_option_is_a_per_control_error() {
    let snapshot = capture(&form_page(json!([
        {"tag": "select", "attributes": {"name": "country"}, "value": "fr", "children": [
            {"tag": "option", "attributes": {"value": "fr"}, "selected": true}
        ]},
        text_input("city", "Paris")
    ])));
    let mut live = form_page(json!([
        {"tag": "select", "attributes": {"name": "country"}, "children": [
            {"tag": "option", "attributes": {"value": "uk"}}
        ]},
        text_input("city", "")
    ]));

    let report = restore(&snapshot, &mut live);
    assert_eq!(report.restored_count, 1);
    assert_eq!(report.per_control_errors.len(), 1);
    assert_eq!(report.per_control_errors[0].message, "option not found for fr");
}

#[test]
fn disabled_option_is_not_selected() {
    let mut snapshot = capture(&fixture("profile.json"));
    let country = snapshot.controls.iter_mut().find(|c| c.name == "country").unwrap();
    country.value = ControlValue::Text("de".into());
    let mut live = blank(fixture("profile.json"));

    let report = restore(&snapshot, &mut live);
    assert_eq!(report.restored_count, 5);
    assert_eq!(report.per_control_errors.len(), 1);
    assert_eq!(report.per_control_errors[0].control.name, "country");
    assert_eq!(report.per_control_errors[0].message, "option 'de' is disabled");
}

#[test]
fn file_inputs_report_instead_of_writing() {
    let snapshot = capture(&form_page(json!([
        {"tag": "input", "attributes": {"type": "file", "name": "cv"}, "files": ["cv.pdf"]}
    ])));
    let mut live = form_page(json!([{"tag": "input", "attributes": {"type": "file", "name": "cv"}}]));

    let report = restore(&snapshot, &mut live);
    assert_eq!(report.restored_count, 0);
    assert_eq!(report.per_control_errors[0].message, "file inputs cannot be restored");
}

// =========================================================================
// Key collisions
// =========================================================================

/// Two `tag` inputs whose paths only differ above the kept ancestor window.
fn colliding(values: &[&str]) -> Document {
    let wrappers = ["section", "article", "aside"];
    let children: Vec<Value> = values
        .iter()
        .zip(wrappers)
        .map(|(v, wrapper)| json!({"tag": wrapper, "children": [{"tag": "div", "children": [text_input("tag", v)]}]}))
        .collect();
    page(Value::Array(children))
}

#[test]
fn colliding_keys_pair_up_positionally() {
    let options = ExtractOptions {
        max_path_ancestors: 1,
        ..ExtractOptions::default()
    };
    let snapshot = capture_with(&colliding(&["one", "two"]), &options);
    assert_eq!(snapshot.controls[0].dom_path, snapshot.controls[1].dom_path);

    let mut live = colliding(&["", ""]);
    let report = restore_with(&snapshot, &mut live, &options);

    assert_eq!(report.restored_count, 2);
    assert_eq!(
        values(&live),
        vec![ControlValue::Text("one".into()), ControlValue::Text("two".into())]
    );
}

#[test]
fn surplus_colliding_controls_are_skipped() {
    let options = ExtractOptions {
        max_path_ancestors: 1,
        ..ExtractOptions::default()
    };
    let snapshot = capture_with(&colliding(&["one", "two", "three"]), &options);
    let mut live = colliding(&["", ""]);

    let report = restore_with(&snapshot, &mut live, &options);
    assert_eq!(report.restored_count, 2);
    assert_eq!(report.skipped_count, 1);
}

// =========================================================================
// Native choice controls
// =========================================================================

#[test]
fn checking_a_radio_unchecks_its_group() {
    let radio = |value: &str, checked: bool| {
        json!({"tag": "input", "attributes": {"type": "radio", "name": "plan", "value": value}, "checked": checked})
    };
    let snapshot = capture(&form_page(json!([radio("basic", false), radio("pro", true)])));
    let mut live = form_page(json!([radio("basic", true), radio("pro", false)]));

    let report = restore(&snapshot, &mut live);
    assert_eq!(report.restored_count, 2);
    assert_eq!(values(&live), vec![ControlValue::Bool(false), ControlValue::Bool(true)]);
}

#[test]
fn checkbox_round_trips_through_blank_page() {
    let snapshot = capture(&form_page(json!([checkbox("a", true), checkbox("b", false)])));
    let mut live = form_page(json!([checkbox("a", false), checkbox("b", true)]));

    restore(&snapshot, &mut live);
    assert_eq!(values(&live), vec![ControlValue::Bool(true), ControlValue::Bool(false)]);
}

// =========================================================================
// Rich components
// =========================================================================

#[test]
fn rich_select_replays_panel_and_option_clicks() {
    let snapshot = capture(&fixture("material.json"));
    let mut live = blank(fixture("material.json"));

    let report = restore(&snapshot, &mut live);
    assert!(report.is_complete(), "{report:?}");
    assert_eq!(report.restored_count, 3);

    let select = find(&live, "mat-select", "aria-label", "color");
    let blue = find(&live, "mat-option", "value", "blue");
    let red = find(&live, "mat-option", "value", "red");
    assert_eq!(
        events_on(&live, select),
        vec![EventKind::Input, EventKind::Change, EventKind::Blur, EventKind::Click]
    );
    assert_eq!(events_on(&live, blue), vec![EventKind::Click]);
    assert!(events_on(&live, red).is_empty());

    // Panel opens before the option is picked.
    let order: Vec<NodeId> = live
        .events()
        .iter()
        .filter(|e| e.kind == EventKind::Click)
        .map(|e| e.target)
        .collect();
    assert_eq!(&order[..2], &[select, blue]);
}

#[test]
fn closed_rich_select_takes_its_value_without_options() {
    let closed = |value: Value| {
        page(json!([{"tag": "mat-select", "attributes": {"name": "color"}, "value": value}]))
    };
    let snapshot = capture(&closed(json!("blue")));
    assert_eq!(snapshot.controls[0].value, ControlValue::Text("blue".into()));

    let mut live = closed(Value::Null);
    let report = restore(&snapshot, &mut live);

    assert_eq!(report.restored_count, 1);
    assert!(report.per_control_errors.is_empty(), "{report:?}");
    let select = find(&live, "mat-select", "name", "color");
    assert_eq!(live.element(select).value, Some(json!("blue")));
    assert_eq!(
        events_on(&live, select),
        vec![EventKind::Input, EventKind::Change, EventKind::Blur, EventKind::Click]
    );
}

#[test]
fn closed_rich_multi_select_takes_every_value() {
    let closed = |value: Value| {
        page(json!([{"tag": "mat-select", "attributes": {"name": "tags", "multiple": ""}, "value": value}]))
    };
    let snapshot = capture(&closed(json!(["a", "c"])));

    let mut live = closed(json!([]));
    let report = restore(&snapshot, &mut live);

    assert_eq!(report.restored_count, 1);
    assert_eq!(
        values(&live),
        vec![ControlValue::List(vec!["a".into(), "c".into()])]
    );
}

#[test]
fn open_rich_select_without_a_match_is_still_an_error() {
    let snapshot = capture(&page(json!([
        {"tag": "mat-select", "attributes": {"name": "color"}, "value": "green"}
    ])));
    let mut live = page(json!([
        {"tag": "mat-select", "attributes": {"name": "color"}, "children": [
            {"tag": "mat-option", "attributes": {"value": "red"}, "text": "Red"}
        ]}
    ]));

    let report = restore(&snapshot, &mut live);
    assert_eq!(report.restored_count, 0);
    assert_eq!(report.per_control_errors[0].message, "option not found for green");
}

#[test]
fn rich_toggle_syncs_its_native_checkbox() {
    let snapshot = capture(&fixture("material.json"));
    let mut live = blank(fixture("material.json"));
    restore(&snapshot, &mut live);

    let toggle = find(&live, "mat-slide-toggle", "name", "notify");
    let inner = find(&live, "input", "role", "switch");
    assert_eq!(live.element(toggle).checked, Some(true));
    assert_eq!(live.element(inner).checked, Some(true));
    assert_eq!(events_on(&live, inner), vec![EventKind::Click, EventKind::Change]);
}

#[test]
fn rich_radio_group_clicks_the_chosen_button() {
    let snapshot = capture(&fixture("material.json"));
    let mut live = blank(fixture("material.json"));
    restore(&snapshot, &mut live);

    let medium = find(&live, "mat-radio-button", "value", "m");
    let small = find(&live, "mat-radio-button", "value", "s");
    assert_eq!(live.element(medium).checked, Some(true));
    assert_eq!(live.element(small).checked, Some(false));
    assert_eq!(events_on(&live, medium), vec![EventKind::Click]);

    assert_eq!(values(&live), values(&fixture("material.json")));
}
