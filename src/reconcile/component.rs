use serde_json::Value;

use crate::error::ApplyError;
use crate::extract::descriptor_model::ControlValue;
use crate::extract::families::{ComponentKind, component_kind, nested_native};
use crate::extract::value::{checked_state, option_nodes, option_selected, radio_nodes};
use crate::page::dom::{Document, EventKind, NodeId};

/// Follow-up for rich components whose internal state does not observe a
/// plain value write: replay the clicks a user would make, or push the value
/// into the native control the component wraps.
pub fn reconcile_component(
    doc: &mut Document,
    node: NodeId,
    value: &ControlValue,
) -> Result<(), ApplyError> {
    match component_kind(doc.element(node)) {
        ComponentKind::SelectLike | ComponentKind::ButtonToggleGroup => {
            let picked: Vec<NodeId> = option_nodes(doc, node)
                .into_iter()
                .filter(|o| option_selected(doc.element(*o)))
                .collect();
            // Open the panel, then pick each option.
            doc.dispatch(node, EventKind::Click);
            for option in picked {
                doc.dispatch(option, EventKind::Click);
            }
            Ok(())
        }
        ComponentKind::Toggle => {
            let on = value.as_bool().unwrap_or(false);
            if let Some(inner) = nested_native(doc, node) {
                if doc.element(inner).flag("disabled") {
                    return Err(ApplyError::ComponentRejected(
                        "wrapped checkbox is disabled".into(),
                    ));
                }
                if checked_state(doc, inner) != on {
                    doc.element_mut(inner).checked = Some(on);
                    doc.dispatch(inner, EventKind::Click);
                }
                doc.dispatch(inner, EventKind::Change);
            }
            Ok(())
        }
        ComponentKind::RadioGroup => {
            if let Some(radio) = radio_nodes(doc, node)
                .into_iter()
                .find(|r| checked_state(doc, *r))
            {
                doc.dispatch(radio, EventKind::Click);
            }
            Ok(())
        }
        ComponentKind::Other => {
            let Some(inner) = nested_native(doc, node) else {
                return Ok(());
            };
            let Some(text) = value.as_text() else {
                return Err(ApplyError::ComponentRejected(
                    "list value for a single-valued wrapper".into(),
                ));
            };
            doc.element_mut(inner).value = Some(Value::String(text));
            doc.dispatch(inner, EventKind::Input);
            doc.dispatch(inner, EventKind::Change);
            Ok(())
        }
    }
}
