use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Ceiling, Result, SnapshotError};
use crate::extract::descriptor_model::{ControlDescriptor, ControlFamily, ControlFlags, InputKind};
use crate::extract::families::{STRATEGIES, fallback_name, input_kind_of, is_container_family};
use crate::extract::forms::{FormDescriptor, form_descriptors};
use crate::extract::validation::validation_state;
use crate::extract::value::read_value;
use crate::page::dom::{Document, Element, NodeId};
use crate::page::path::dom_path;

pub const DEFAULT_MAX_DEPTH: usize = 10;
pub const DEFAULT_MAX_CONTROLS: usize = 1000;

/// Scan limits and switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// Ancestors kept in each descriptor's `domPath`
    pub max_path_ancestors: usize,

    /// Deepest allowed container nesting
    pub max_nesting_depth: usize,

    /// Most descriptors a single page may produce
    pub max_controls: usize,

    /// Also capture `<input type="hidden">`
    pub include_hidden: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_path_ancestors: DEFAULT_MAX_DEPTH,
            max_nesting_depth: DEFAULT_MAX_DEPTH,
            max_controls: DEFAULT_MAX_CONTROLS,
            include_hidden: false,
        }
    }
}

/// A control that was found but could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionIssue {
    pub node: NodeId,
    pub tag: String,
    pub name: String,
    pub message: String,
}

/// Result of one scan. `controls[i]` was read from the live node
/// `node_of(i)`; the node binding is never serialized.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub controls: Vec<ControlDescriptor>,
    pub issues: Vec<ExtractionIssue>,
    nodes: Vec<NodeId>,
}

impl Extraction {
    pub fn node_of(&self, index: usize) -> NodeId {
        self.nodes[index]
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Controls that carry a value (everything except containers).
    pub fn value_control_count(&self) -> usize {
        self.controls.iter().filter(|c| !c.is_container()).count()
    }

    pub fn forms(&self) -> Vec<FormDescriptor> {
        form_descriptors(&self.controls)
    }

    pub fn into_controls(self) -> Vec<ControlDescriptor> {
        self.controls
    }
}

struct Claim {
    node: NodeId,
    family: ControlFamily,
    pass: usize,
}

/// Scan `doc` for form controls.
///
/// Runs the family passes in priority order; an element claimed by an earlier
/// pass, or sitting inside a claimed non-container control, is not visited
/// again. Output order is pass order, then document order.
pub fn extract(doc: &Document, options: &ExtractOptions) -> Result<Extraction> {
    if doc.root().is_none() {
        return Err(SnapshotError::NoDocument(
            "document has no root element".into(),
        ));
    }

    let mut claimed: Vec<Option<ControlFamily>> = vec![None; doc.len()];
    let mut claims: Vec<Claim> = Vec::new();

    for (pass, strategy) in STRATEGIES.iter().enumerate() {
        let before = claims.len();
        for id in doc.ids() {
            if claimed[id.0].is_some() || inside_claimed_control(doc, id, &claimed) {
                continue;
            }
            let el = doc.element(id);
            if !options.include_hidden && el.tag == "input" && el.input_type() == "hidden" {
                continue;
            }
            if let Some(family) = strategy.classify(doc, id) {
                claimed[id.0] = Some(family);
                claims.push(Claim {
                    node: id,
                    family,
                    pass,
                });
                if claims.len() > options.max_controls {
                    return Err(SnapshotError::capacity(
                        Ceiling::ControlCount,
                        claims.len(),
                        options.max_controls,
                    ));
                }
            }
        }
        debug!(pass = strategy.label(), claimed = claims.len() - before, "extraction pass");
    }

    // Ids first, so parents discovered by a later pass can still be referenced.
    let ids: Vec<String> = (0..claims.len()).map(|i| format!("c{i}")).collect();
    let containers: HashMap<NodeId, usize> = claims
        .iter()
        .enumerate()
        .filter(|(_, c)| is_container(doc.element(c.node), c.family))
        .map(|(i, c)| (c.node, i))
        .collect();

    let mut extraction = Extraction::default();

    for (index, claim) in claims.iter().enumerate() {
        let container_chain: Vec<usize> = doc
            .ancestors(claim.node)
            .filter_map(|a| containers.get(&a).copied())
            .collect();
        let depth = container_chain.len();
        if depth > options.max_nesting_depth {
            return Err(SnapshotError::capacity(
                Ceiling::NestingDepth,
                depth,
                options.max_nesting_depth,
            ));
        }
        let parent_form_id = container_chain.first().map(|p| ids[*p].clone());

        match describe(doc, claim, ids[index].clone(), parent_form_id, options) {
            Ok(descriptor) => {
                extraction.controls.push(descriptor);
                extraction.nodes.push(claim.node);
            }
            Err(message) => {
                let el = doc.element(claim.node);
                let name = STRATEGIES[claim.pass]
                    .binding_name(el)
                    .unwrap_or_else(|| fallback_name(el));
                warn!(tag = %el.tag, name = %name, error = %message, "skipping unreadable control");
                extraction.issues.push(ExtractionIssue {
                    node: claim.node,
                    tag: el.tag.clone(),
                    name,
                    message,
                });
            }
        }
    }

    debug!(
        controls = extraction.controls.len(),
        issues = extraction.issues.len(),
        "extraction complete"
    );
    Ok(extraction)
}

fn is_container(el: &Element, family: ControlFamily) -> bool {
    is_container_family(family) || (family == ControlFamily::NativeControl && el.tag == "form")
}

fn inside_claimed_control(doc: &Document, id: NodeId, claimed: &[Option<ControlFamily>]) -> bool {
    doc.ancestors(id).any(|a| match claimed[a.0] {
        Some(family) => !is_container(doc.element(a), family),
        None => false,
    })
}

fn describe(
    doc: &Document,
    claim: &Claim,
    id: String,
    parent_form_id: Option<String>,
    options: &ExtractOptions,
) -> std::result::Result<ControlDescriptor, String> {
    let el = doc.element(claim.node);
    let input_kind = if is_container(el, claim.family) {
        InputKind::Container
    } else {
        input_kind_of(doc, claim.node)
    };

    let value = read_value(doc, claim.node, input_kind).map_err(|e| e.0)?;
    let flags = control_flags(doc, claim.node);
    let validation_state = validation_state(el, input_kind, &value, &flags);
    let name = STRATEGIES[claim.pass]
        .binding_name(el)
        .unwrap_or_else(|| fallback_name(el));

    Ok(ControlDescriptor {
        id,
        family: claim.family,
        name,
        tag_name: el.tag.clone(),
        input_kind,
        value,
        dom_path: dom_path(doc, claim.node, options.max_path_ancestors),
        attributes: el.attributes.clone(),
        validation_state,
        flags,
        parent_form_id,
    })
}

fn control_flags(doc: &Document, id: NodeId) -> ControlFlags {
    let el = doc.element(id);
    let disabled_by_class = el
        .classes()
        .any(|c| c.starts_with("mat-") && c.ends_with("-disabled"));
    let disabled_by_fieldset = doc.ancestors(id).any(|a| {
        let anc = doc.element(a);
        anc.tag == "fieldset" && anc.flag("disabled")
    });

    ControlFlags {
        disabled: el.flag("disabled")
            || el.attr("aria-disabled") == Some("true")
            || disabled_by_class
            || disabled_by_fieldset,
        readonly: el.flag("readonly") || el.attr("aria-readonly") == Some("true"),
        required: el.flag("required") || el.attr("aria-required") == Some("true"),
        placeholder: el.attr("placeholder").unwrap_or("").to_string(),
        class_name: el.attr("class").unwrap_or("").to_string(),
        autocomplete: el.attr("autocomplete").unwrap_or("").to_string(),
    }
}
