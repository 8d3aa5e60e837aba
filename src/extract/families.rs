use crate::extract::descriptor_model::{ControlFamily, InputKind};
use crate::page::dom::{Document, Element, NodeId};

// ============================================================================
// Strategy table: one entry per binding mechanism, in claim priority order
// ============================================================================

/// Detection rules for one control family. Passes run in `STRATEGIES` order
/// and the first strategy to claim an element owns it.
pub trait FamilyStrategy: Sync {
    /// Short label used in logs.
    fn label(&self) -> &'static str;

    /// Family of `id` under this mechanism, or `None` if it does not apply.
    fn classify(&self, doc: &Document, id: NodeId) -> Option<ControlFamily>;

    /// Logical name carried by the binding itself (before generic fallbacks).
    fn binding_name(&self, el: &Element) -> Option<String>;
}

pub static STRATEGIES: [&dyn FamilyStrategy; 4] = [
    &BoundStrategy,
    &TwoWayStrategy,
    &RichComponentStrategy,
    &NativeStrategy,
];

pub struct BoundStrategy;
pub struct TwoWayStrategy;
pub struct RichComponentStrategy;
pub struct NativeStrategy;

const BOUND_CONTROL_ATTRS: &[&str] = &["formcontrolname", "formcontrol", "[formcontrol]"];
const BOUND_GROUP_ATTRS: &[&str] = &["formgroupname", "formgroup", "[formgroup]", "ng-reflect-form"];
const BOUND_ARRAY_ATTRS: &[&str] = &["formarrayname", "[formarray]"];

const TWO_WAY_CONTROL_ATTRS: &[&str] = &[
    "ngmodel",
    "[(ngmodel)]",
    "ng-model",
    "data-ng-model",
    "v-model",
    "ng-reflect-model",
];
const TWO_WAY_FORM_ATTRS: &[&str] = &["ngform", "ng-form"];

const RICH_TAGS: &[&str] = &[
    "mat-select",
    "mat-checkbox",
    "mat-slide-toggle",
    "mat-radio-group",
    "mat-button-toggle-group",
    "ng-select",
    "p-dropdown",
    "p-checkbox",
];
const RICH_ROLES: &[&str] = &["combobox", "listbox", "switch", "radiogroup", "checkbox"];

const NATIVE_SKIPPED_TYPES: &[&str] = &["submit", "button", "reset", "image"];

fn has_any(el: &Element, attrs: &[&str]) -> bool {
    attrs.iter().any(|a| el.has_attr(a))
}

fn first_attr(el: &Element, attrs: &[&str]) -> Option<String> {
    attrs
        .iter()
        .filter_map(|a| el.attr(a))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn is_native_control_tag(tag: &str) -> bool {
    matches!(tag, "input" | "select" | "textarea")
}

impl FamilyStrategy for BoundStrategy {
    fn label(&self) -> &'static str {
        "bound"
    }

    fn classify(&self, doc: &Document, id: NodeId) -> Option<ControlFamily> {
        let el = doc.element(id);
        if has_any(el, BOUND_ARRAY_ATTRS) {
            Some(ControlFamily::BoundArray)
        } else if has_any(el, BOUND_GROUP_ATTRS) {
            Some(ControlFamily::BoundGroup)
        } else if has_any(el, BOUND_CONTROL_ATTRS) {
            Some(ControlFamily::BoundControl)
        } else {
            None
        }
    }

    fn binding_name(&self, el: &Element) -> Option<String> {
        first_attr(
            el,
            &["formcontrolname", "formgroupname", "formarrayname", "ng-reflect-name"],
        )
    }
}

impl FamilyStrategy for TwoWayStrategy {
    fn label(&self) -> &'static str {
        "two-way"
    }

    fn classify(&self, doc: &Document, id: NodeId) -> Option<ControlFamily> {
        let el = doc.element(id);
        if el.tag == "ng-form" || has_any(el, TWO_WAY_FORM_ATTRS) {
            return Some(ControlFamily::TwoWayForm);
        }
        if el.tag == "form" {
            // Template-driven forms attach to any <form> hosting a two-way control.
            let hosts_two_way = doc
                .descendants(id)
                .into_iter()
                .any(|d| has_any(doc.element(d), TWO_WAY_CONTROL_ATTRS));
            return hosts_two_way.then_some(ControlFamily::TwoWayForm);
        }
        has_any(el, TWO_WAY_CONTROL_ATTRS).then_some(ControlFamily::TwoWayControl)
    }

    fn binding_name(&self, el: &Element) -> Option<String> {
        if let Some(name) = first_attr(el, &["name", "ng-reflect-name"]) {
            return Some(name);
        }
        // `user.email` → `email`
        first_attr(el, &["ng-model", "data-ng-model", "v-model"])
            .and_then(|expr| expr.rsplit('.').next().map(str::to_string))
            .filter(|s| !s.is_empty())
    }
}

impl FamilyStrategy for RichComponentStrategy {
    fn label(&self) -> &'static str {
        "rich-component"
    }

    fn classify(&self, doc: &Document, id: NodeId) -> Option<ControlFamily> {
        let el = doc.element(id);
        if RICH_TAGS.contains(&el.tag.as_str()) {
            return Some(ControlFamily::RichComponent);
        }
        let rich_role = el.role().is_some_and(|r| RICH_ROLES.contains(&r));
        (rich_role && !is_native_control_tag(&el.tag)).then_some(ControlFamily::RichComponent)
    }

    fn binding_name(&self, el: &Element) -> Option<String> {
        first_attr(el, &["name", "ng-reflect-name", "aria-label"])
    }
}

impl FamilyStrategy for NativeStrategy {
    fn label(&self) -> &'static str {
        "native"
    }

    fn classify(&self, doc: &Document, id: NodeId) -> Option<ControlFamily> {
        let el = doc.element(id);
        match el.tag.as_str() {
            "form" => Some(ControlFamily::NativeControl),
            "select" | "textarea" => Some(ControlFamily::NativeControl),
            "input" => {
                let t = el.input_type();
                (!NATIVE_SKIPPED_TYPES.contains(&t.as_str())).then_some(ControlFamily::NativeControl)
            }
            _ => None,
        }
    }

    fn binding_name(&self, el: &Element) -> Option<String> {
        first_attr(el, &["name"])
    }
}

/// Generic name fallbacks shared by every family.
pub fn fallback_name(el: &Element) -> String {
    first_attr(el, &["name", "id", "aria-label"]).unwrap_or_else(|| "unnamed".to_string())
}

// ============================================================================
// Component shapes
// ============================================================================

/// Interaction shape of an element, independent of how it is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    SelectLike,
    Toggle,
    RadioGroup,
    ButtonToggleGroup,
    Other,
}

pub fn component_kind(el: &Element) -> ComponentKind {
    match el.tag.as_str() {
        "mat-select" | "ng-select" | "p-dropdown" => ComponentKind::SelectLike,
        "mat-checkbox" | "mat-slide-toggle" | "p-checkbox" => ComponentKind::Toggle,
        "mat-radio-group" => ComponentKind::RadioGroup,
        "mat-button-toggle-group" => ComponentKind::ButtonToggleGroup,
        _ => match el.role() {
            Some("combobox") | Some("listbox") => ComponentKind::SelectLike,
            Some("switch") | Some("checkbox") => ComponentKind::Toggle,
            Some("radiogroup") => ComponentKind::RadioGroup,
            _ => ComponentKind::Other,
        },
    }
}

/// First native control inside `id`, used by wrappers that delegate to one.
pub fn nested_native(doc: &Document, id: NodeId) -> Option<NodeId> {
    doc.descendants(id)
        .into_iter()
        .find(|d| is_native_control_tag(&doc.element(*d).tag))
}

/// Input kind from the element's shape. Containers are decided by family,
/// not here.
pub fn input_kind_of(doc: &Document, id: NodeId) -> InputKind {
    let el = doc.element(id);
    match el.tag.as_str() {
        "input" => InputKind::from_input_type(&el.input_type()),
        "textarea" => InputKind::Textarea,
        "select" => {
            if el.flag("multiple") {
                InputKind::MultiSelect
            } else {
                InputKind::Select
            }
        }
        _ => match component_kind(el) {
            ComponentKind::SelectLike | ComponentKind::ButtonToggleGroup => {
                if el.flag("multiple") || el.attr("aria-multiselectable") == Some("true") {
                    InputKind::MultiSelect
                } else {
                    InputKind::Select
                }
            }
            ComponentKind::Toggle => InputKind::Toggle,
            ComponentKind::RadioGroup => InputKind::RadioGroup,
            ComponentKind::Other => match nested_native(doc, id) {
                Some(inner) => input_kind_of(doc, inner),
                None => InputKind::Text,
            },
        },
    }
}

pub fn is_container_family(family: ControlFamily) -> bool {
    matches!(
        family,
        ControlFamily::BoundGroup | ControlFamily::BoundArray | ControlFamily::TwoWayForm
    )
}
