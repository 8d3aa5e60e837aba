use serde::Serialize;

use crate::extract::descriptor_model::{ControlDescriptor, ControlFamily, ValidationStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationCounts {
    pub valid: usize,
    pub invalid: usize,
    pub pending: usize,
    pub disabled: usize,
}

/// A container and the controls directly under it. Built on demand from the
/// descriptor list; the counters are never stored anywhere else.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDescriptor {
    pub id: String,
    pub name: String,
    pub family: ControlFamily,
    pub control_ids: Vec<String>,
    pub counts: ValidationCounts,
}

/// Group descriptors under their containers, in container order.
pub fn form_descriptors(controls: &[ControlDescriptor]) -> Vec<FormDescriptor> {
    controls
        .iter()
        .filter(|c| c.is_container())
        .map(|container| {
            let children: Vec<&ControlDescriptor> = controls
                .iter()
                .filter(|c| c.parent_form_id.as_deref() == Some(container.id.as_str()))
                .collect();

            let mut counts = ValidationCounts::default();
            for child in &children {
                match child.validation_state.status {
                    ValidationStatus::Valid => counts.valid += 1,
                    ValidationStatus::Invalid => counts.invalid += 1,
                    ValidationStatus::Pending => counts.pending += 1,
                    ValidationStatus::Disabled => counts.disabled += 1,
                }
            }

            FormDescriptor {
                id: container.id.clone(),
                name: container.name.clone(),
                family: container.family,
                control_ids: children.iter().map(|c| c.id.clone()).collect(),
                counts,
            }
        })
        .collect()
}
