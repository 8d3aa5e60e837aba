use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Binding mechanism a control was discovered through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ControlFamily {
    BoundControl,
    BoundGroup,
    BoundArray,
    TwoWayControl,
    TwoWayForm,
    RichComponent,
    NativeControl,
}

impl ControlFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlFamily::BoundControl => "boundControl",
            ControlFamily::BoundGroup => "boundGroup",
            ControlFamily::BoundArray => "boundArray",
            ControlFamily::TwoWayControl => "twoWayControl",
            ControlFamily::TwoWayForm => "twoWayForm",
            ControlFamily::RichComponent => "richComponent",
            ControlFamily::NativeControl => "nativeControl",
        }
    }
}

/// Normalized input category. Decides both the value shape and how restore
/// writes the value back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputKind {
    Text,
    Email,
    Password,
    Number,
    Search,
    Tel,
    Url,
    Date,
    Time,
    DatetimeLocal,
    Month,
    Week,
    Range,
    Color,
    Hidden,
    Checkbox,
    Radio,
    Toggle,
    File,
    Select,
    MultiSelect,
    RadioGroup,
    Textarea,
    Container,
}

impl InputKind {
    pub fn from_input_type(input_type: &str) -> Self {
        match input_type {
            "email" => InputKind::Email,
            "password" => InputKind::Password,
            "number" => InputKind::Number,
            "search" => InputKind::Search,
            "tel" => InputKind::Tel,
            "url" => InputKind::Url,
            "date" => InputKind::Date,
            "time" => InputKind::Time,
            "datetime-local" | "datetime" => InputKind::DatetimeLocal,
            "month" => InputKind::Month,
            "week" => InputKind::Week,
            "range" => InputKind::Range,
            "color" => InputKind::Color,
            "hidden" => InputKind::Hidden,
            "checkbox" => InputKind::Checkbox,
            "radio" => InputKind::Radio,
            "file" => InputKind::File,
            _ => InputKind::Text,
        }
    }

    /// Checkbox-like kinds carry a boolean value.
    pub fn is_boolean(&self) -> bool {
        matches!(self, InputKind::Checkbox | InputKind::Radio | InputKind::Toggle)
    }

    /// Kinds whose value is an ordered list of strings.
    pub fn is_list(&self) -> bool {
        matches!(self, InputKind::File | InputKind::MultiSelect)
    }

    pub fn is_container(&self) -> bool {
        matches!(self, InputKind::Container)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::Email => "email",
            InputKind::Password => "password",
            InputKind::Number => "number",
            InputKind::Search => "search",
            InputKind::Tel => "tel",
            InputKind::Url => "url",
            InputKind::Date => "date",
            InputKind::Time => "time",
            InputKind::DatetimeLocal => "datetime-local",
            InputKind::Month => "month",
            InputKind::Week => "week",
            InputKind::Range => "range",
            InputKind::Color => "color",
            InputKind::Hidden => "hidden",
            InputKind::Checkbox => "checkbox",
            InputKind::Radio => "radio",
            InputKind::Toggle => "toggle",
            InputKind::File => "file",
            InputKind::Select => "select",
            InputKind::MultiSelect => "multi-select",
            InputKind::RadioGroup => "radio-group",
            InputKind::Textarea => "textarea",
            InputKind::Container => "container",
        }
    }
}

/// Extracted control value. Serialized untagged: `true`, `["a","b"]`, `"x"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlValue {
    Bool(bool),
    List(Vec<String>),
    Text(String),
}

impl ControlValue {
    pub fn empty() -> Self {
        ControlValue::Text(String::new())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ControlValue::Bool(b) => Some(*b),
            ControlValue::Text(t) => match t.as_str() {
                "true" | "on" => Some(true),
                "false" | "off" | "" => Some(false),
                _ => None,
            },
            ControlValue::List(_) => None,
        }
    }

    /// Scalar rendering; lists have none.
    pub fn as_text(&self) -> Option<String> {
        match self {
            ControlValue::Text(t) => Some(t.clone()),
            ControlValue::Bool(b) => Some(b.to_string()),
            ControlValue::List(_) => None,
        }
    }

    /// Candidate values for option matching, empty strings dropped.
    pub fn candidates(&self) -> Vec<String> {
        match self {
            ControlValue::List(items) => items.iter().filter(|s| !s.is_empty()).cloned().collect(),
            ControlValue::Text(t) if t.is_empty() => vec![],
            ControlValue::Text(t) => vec![t.clone()],
            ControlValue::Bool(b) => vec![b.to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidationStatus {
    Valid,
    Invalid,
    Pending,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationState {
    pub status: ValidationStatus,
    /// Named failures, shaped like framework error maps (`required: true`,
    /// `minlength: {requiredLength, actualLength}`).
    #[serde(default)]
    pub errors: BTreeMap<String, Value>,
}

impl ValidationState {
    pub fn valid() -> Self {
        ValidationState {
            status: ValidationStatus::Valid,
            errors: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlFlags {
    pub disabled: bool,
    pub readonly: bool,
    pub required: bool,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub autocomplete: String,
}

/// Normalized record of one form control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlDescriptor {
    /// Process-local id, regenerated on every extraction.
    pub id: String,
    pub family: ControlFamily,
    pub name: String,
    pub tag_name: String,
    pub input_kind: InputKind,
    pub value: ControlValue,
    pub dom_path: String,
    pub attributes: BTreeMap<String, String>,
    pub validation_state: ValidationState,
    pub flags: ControlFlags,
    /// Id of the enclosing container descriptor, if any.
    pub parent_form_id: Option<String>,
}

impl ControlDescriptor {
    pub fn is_container(&self) -> bool {
        self.input_kind.is_container()
    }

    /// Live element cannot take a value.
    pub fn is_locked(&self) -> bool {
        self.flags.disabled
            || self.flags.readonly
            || self.validation_state.status == ValidationStatus::Disabled
    }
}
