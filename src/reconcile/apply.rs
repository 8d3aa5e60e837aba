use serde_json::Value;

use crate::error::ApplyError;
use crate::extract::descriptor_model::{ControlValue, InputKind};
use crate::extract::value::{option_label, option_nodes, option_value, radio_nodes};
use crate::page::dom::{Document, EventKind, NodeId};

/// Notifications sent after every successful write, in this order.
pub const APPLY_EVENTS: [EventKind; 3] = [EventKind::Input, EventKind::Change, EventKind::Blur];

/// Write `value` onto the live element `node` according to `kind`.
///
/// Only value state (`value`, `checked`, `selected`) is touched.
pub fn apply_value(
    doc: &mut Document,
    node: NodeId,
    kind: InputKind,
    value: &ControlValue,
) -> Result<(), ApplyError> {
    match kind {
        InputKind::Container => Ok(()),
        InputKind::Checkbox | InputKind::Radio | InputKind::Toggle => {
            let on = value.as_bool().ok_or_else(|| shape_error(kind))?;
            set_checked(doc, node, on);
            if kind == InputKind::Radio && on {
                uncheck_radio_siblings(doc, node);
            }
            Ok(())
        }
        InputKind::File => Err(ApplyError::FileInput),
        InputKind::Select | InputKind::MultiSelect => select_options(doc, node, kind, value),
        InputKind::RadioGroup => select_radio(doc, node, value),
        _ => {
            let text = value.as_text().ok_or_else(|| shape_error(kind))?;
            doc.element_mut(node).value = Some(Value::String(text));
            Ok(())
        }
    }
}

/// Emit the standard change notifications on `node`.
pub fn notify(doc: &mut Document, node: NodeId) {
    for kind in APPLY_EVENTS {
        doc.dispatch(node, kind);
    }
}

fn shape_error(kind: InputKind) -> ApplyError {
    ApplyError::ValueShape {
        kind: kind.as_str().to_string(),
    }
}

fn set_checked(doc: &mut Document, node: NodeId, on: bool) {
    doc.element_mut(node).checked = Some(on);
}

/// A checked native radio clears the other radios of its group: same
/// `name`, same form owner.
fn uncheck_radio_siblings(doc: &mut Document, node: NodeId) {
    let Some(name) = doc.element(node).attr("name").map(str::to_string) else {
        return;
    };
    let owner = form_owner(doc, node);
    let siblings: Vec<NodeId> = doc
        .ids()
        .filter(|id| *id != node)
        .filter(|id| {
            let el = doc.element(*id);
            el.tag == "input" && el.input_type() == "radio" && el.attr("name") == Some(name.as_str())
        })
        .filter(|id| form_owner(doc, *id) == owner)
        .collect();
    for sibling in siblings {
        set_checked(doc, sibling, false);
    }
}

fn form_owner(doc: &Document, node: NodeId) -> Option<NodeId> {
    doc.ancestors(node).find(|a| doc.element(*a).tag == "form")
}

fn option_matches(doc: &Document, option: NodeId, candidate: &str) -> bool {
    let el = doc.element(option);
    option_value(el) == candidate || option_label(el) == candidate
}

/// Select every option whose value or label equals a candidate.
///
/// Options rendered but none matching is an error.
fn select_options(
    doc: &mut Document,
    node: NodeId,
    kind: InputKind,
    value: &ControlValue,
) -> Result<(), ApplyError> {
    let candidates = value.candidates();
    let options = option_nodes(doc, node);
    let multiple = kind == InputKind::MultiSelect;

    // A closed select-like component renders no options; its value lives on
    // the host element.
    if options.is_empty() && doc.element(node).tag != "select" {
        doc.element_mut(node).value = Some(if multiple {
            Value::Array(candidates.into_iter().map(Value::String).collect())
        } else {
            Value::String(candidates.into_iter().next().unwrap_or_default())
        });
        return Ok(());
    }

    let mut chosen: Vec<NodeId> = Vec::new();
    for candidate in &candidates {
        if let Some(opt) = options.iter().copied().find(|o| option_matches(doc, *o, candidate)) {
            if !chosen.contains(&opt) {
                chosen.push(opt);
            }
        }
        if !multiple && !chosen.is_empty() {
            break;
        }
    }

    if !candidates.is_empty() && chosen.is_empty() {
        return Err(ApplyError::OptionNotFound(candidates));
    }
    if let Some(disabled) = chosen.iter().find(|o| doc.element(**o).flag("disabled")) {
        return Err(ApplyError::OptionDisabled(option_value(doc.element(*disabled))));
    }

    for opt in &options {
        doc.element_mut(*opt).selected = Some(chosen.contains(opt));
    }

    let values: Vec<String> = chosen.iter().map(|o| option_value(doc.element(*o))).collect();
    let el = doc.element_mut(node);
    if multiple {
        if matches!(el.value, Some(Value::Array(_))) {
            el.value = Some(Value::Array(values.into_iter().map(Value::String).collect()));
        }
    } else {
        el.value = Some(Value::String(values.into_iter().next().unwrap_or_default()));
    }
    Ok(())
}

/// Check the radio of a radio-group component that matches the value.
fn select_radio(doc: &mut Document, node: NodeId, value: &ControlValue) -> Result<(), ApplyError> {
    let candidates = value.candidates();
    let radios = radio_nodes(doc, node);

    let chosen = candidates
        .iter()
        .find_map(|c| radios.iter().copied().find(|r| option_matches(doc, *r, c)));

    match (candidates.is_empty(), chosen) {
        (false, None) => return Err(ApplyError::OptionNotFound(candidates)),
        (_, Some(radio)) if doc.element(radio).flag("disabled") => {
            return Err(ApplyError::OptionDisabled(option_value(doc.element(radio))));
        }
        _ => {}
    }

    for radio in &radios {
        set_checked(doc, *radio, Some(*radio) == chosen);
    }
    let selected = chosen
        .map(|r| option_value(doc.element(r)))
        .unwrap_or_default();
    doc.element_mut(node).value = Some(Value::String(selected));
    Ok(())
}
