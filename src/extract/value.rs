use serde_json::Value;

use crate::extract::descriptor_model::{ControlValue, InputKind};
use crate::extract::families::nested_native;
use crate::page::dom::{Document, Element, NodeId};

/// Per-control read failure. The control is skipped, the scan continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueReadError(pub String);

const OPTION_TAGS: &[&str] = &["option", "mat-option", "ng-option", "mat-button-toggle"];
const RADIO_TAGS: &[&str] = &["mat-radio-button"];

// ============================================================================
// Option and toggle state helpers (shared with restore)
// ============================================================================

pub fn is_option(el: &Element) -> bool {
    OPTION_TAGS.contains(&el.tag.as_str()) || el.role() == Some("option")
}

/// Option elements belonging to a select-like control, in document order.
pub fn option_nodes(doc: &Document, id: NodeId) -> Vec<NodeId> {
    doc.descendants(id)
        .into_iter()
        .filter(|d| is_option(doc.element(*d)))
        .collect()
}

pub fn option_value(el: &Element) -> String {
    el.attr("value")
        .or_else(|| el.attr("ng-reflect-value"))
        .map(str::to_string)
        .unwrap_or_else(|| el.text_trimmed().to_string())
}

pub fn option_label(el: &Element) -> String {
    el.attr("label")
        .or_else(|| el.attr("aria-label"))
        .map(str::to_string)
        .unwrap_or_else(|| el.text_trimmed().to_string())
}

pub fn option_selected(el: &Element) -> bool {
    if let Some(s) = el.selected {
        return s;
    }
    el.attr("aria-selected") == Some("true")
        || el.attr("aria-pressed") == Some("true")
        || el.has_class("mat-selected")
        || el.has_class("mat-mdc-option-active")
        || el.has_class("mat-button-toggle-checked")
}

pub fn is_radio(el: &Element) -> bool {
    RADIO_TAGS.contains(&el.tag.as_str())
        || el.role() == Some("radio")
        || (el.tag == "input" && el.input_type() == "radio")
}

/// Radio buttons belonging to a radio-group component.
pub fn radio_nodes(doc: &Document, id: NodeId) -> Vec<NodeId> {
    let mut radios = Vec::new();
    for d in doc.descendants(id) {
        let el = doc.element(d);
        // Native inputs inside a radio-button component are that component.
        if is_radio(el) && !radios.iter().any(|r| doc.is_descendant_of(d, *r)) {
            radios.push(d);
        }
    }
    radios
}

/// Checked state of a checkbox, radio, or toggle component.
pub fn checked_state(doc: &Document, id: NodeId) -> bool {
    let el = doc.element(id);
    if let Some(c) = el.checked {
        return c;
    }
    if el.attr("aria-checked") == Some("true")
        || el.has_class("mat-checkbox-checked")
        || el.has_class("mat-mdc-checkbox-checked")
        || el.has_class("mat-checked")
        || el.has_class("mat-radio-checked")
        || el.has_class("mat-mdc-radio-checked")
        || el.has_class("mat-slide-toggle-checked")
    {
        return true;
    }
    if el.tag == "input" {
        return el.flag("checked");
    }
    nested_native(doc, id).is_some_and(|inner| checked_state(doc, inner))
}

// ============================================================================
// Value extraction by input kind
// ============================================================================

/// Read the value of `id` normalized for `kind`.
pub fn read_value(doc: &Document, id: NodeId, kind: InputKind) -> Result<ControlValue, ValueReadError> {
    let el = doc.element(id);
    match kind {
        InputKind::Container => Ok(ControlValue::empty()),
        InputKind::Checkbox | InputKind::Radio | InputKind::Toggle => {
            Ok(ControlValue::Bool(checked_state(doc, id)))
        }
        InputKind::File => Ok(ControlValue::List(read_files(doc, id))),
        InputKind::MultiSelect => {
            if let Some(Value::Array(items)) = &el.value {
                return items
                    .iter()
                    .map(scalar_to_string)
                    .collect::<Result<Vec<_>, _>>()
                    .map(ControlValue::List);
            }
            Ok(ControlValue::List(selected_values(doc, id)))
        }
        InputKind::Select => match live_scalar(el)? {
            Some(v) => Ok(ControlValue::Text(v)),
            None => Ok(ControlValue::Text(
                selected_values(doc, id).into_iter().next().unwrap_or_default(),
            )),
        },
        InputKind::RadioGroup => match live_scalar(el)? {
            Some(v) => Ok(ControlValue::Text(v)),
            None => Ok(ControlValue::Text(
                radio_nodes(doc, id)
                    .into_iter()
                    .find(|r| checked_state(doc, *r))
                    .map(|r| option_value(doc.element(r)))
                    .unwrap_or_default(),
            )),
        },
        _ => {
            if let Some(v) = live_scalar(el)? {
                return Ok(ControlValue::Text(v));
            }
            // Wrappers keep their value on the native control inside.
            if !matches!(el.tag.as_str(), "input" | "textarea") {
                if let Some(inner) = nested_native(doc, id) {
                    if let Some(v) = live_scalar(doc.element(inner))? {
                        return Ok(ControlValue::Text(v));
                    }
                }
            }
            let fallback = match el.tag.as_str() {
                "input" => el.attr("value").unwrap_or("").to_string(),
                "textarea" => el.text.clone().unwrap_or_default(),
                _ => String::new(),
            };
            Ok(ControlValue::Text(fallback))
        }
    }
}

fn read_files(doc: &Document, id: NodeId) -> Vec<String> {
    let el = doc.element(id);
    if !el.files.is_empty() || el.tag == "input" {
        return el.files.clone();
    }
    nested_native(doc, id)
        .map(|inner| doc.element(inner).files.clone())
        .unwrap_or_default()
}

fn selected_values(doc: &Document, id: NodeId) -> Vec<String> {
    option_nodes(doc, id)
        .into_iter()
        .map(|o| doc.element(o))
        .filter(|o| option_selected(o))
        .map(option_value)
        .collect()
}

/// Live value as a string. `None` when no live value is set.
fn live_scalar(el: &Element) -> Result<Option<String>, ValueReadError> {
    match &el.value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => scalar_to_string(v).map(Some),
    }
}

fn scalar_to_string(v: &Value) -> Result<String, ValueReadError> {
    match v {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Array(_) => Err(ValueReadError("list value on a single-valued control".into())),
        Value::Object(_) => Err(ValueReadError("object value cannot be normalized".into())),
    }
}
