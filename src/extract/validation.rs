use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Value, json};

use crate::extract::descriptor_model::{
    ControlFlags, ControlValue, InputKind, ValidationState, ValidationStatus,
};
use crate::page::dom::{Element, Validity};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+$").expect("static email pattern compiles")
});

const INVALID_CLASSES: &[&str] = &["ng-invalid", "is-invalid", "mat-form-field-invalid"];
const VALID_CLASSES: &[&str] = &["ng-valid", "is-valid"];

/// Best-effort validation state from presentation signals only: state
/// classes, `aria-invalid`, native validity flags, and constraint attributes.
pub fn validation_state(
    el: &Element,
    kind: InputKind,
    value: &ControlValue,
    flags: &ControlFlags,
) -> ValidationState {
    if flags.disabled {
        return ValidationState {
            status: ValidationStatus::Disabled,
            errors: BTreeMap::new(),
        };
    }

    let errors = match &el.validity {
        Some(validity) => errors_from_validity(validity),
        None => approximate_errors(el, kind, value, flags),
    };

    let status = if el.has_class("ng-pending") {
        ValidationStatus::Pending
    } else if INVALID_CLASSES.iter().any(|c| el.has_class(c))
        || el.attr("aria-invalid") == Some("true")
    {
        ValidationStatus::Invalid
    } else if VALID_CLASSES.iter().any(|c| el.has_class(c)) {
        ValidationStatus::Valid
    } else if errors.is_empty() {
        ValidationStatus::Valid
    } else {
        ValidationStatus::Invalid
    };

    ValidationState { status, errors }
}

fn errors_from_validity(v: &Validity) -> BTreeMap<String, Value> {
    let mut errors = BTreeMap::new();
    let pairs = [
        (v.value_missing, "required"),
        (v.type_mismatch, "type"),
        (v.pattern_mismatch, "pattern"),
        (v.too_long, "maxlength"),
        (v.too_short, "minlength"),
        (v.range_underflow, "min"),
        (v.range_overflow, "max"),
        (v.step_mismatch, "step"),
        (v.bad_input, "badInput"),
        (v.custom_error, "custom"),
    ];
    for (flag, name) in pairs {
        if flag {
            errors.insert(name.to_string(), Value::Bool(true));
        }
    }
    errors
}

fn approximate_errors(
    el: &Element,
    kind: InputKind,
    value: &ControlValue,
    flags: &ControlFlags,
) -> BTreeMap<String, Value> {
    let mut errors = BTreeMap::new();

    let empty = match value {
        ControlValue::Bool(b) => !b,
        ControlValue::List(items) => items.is_empty(),
        ControlValue::Text(t) => t.is_empty(),
    };
    if flags.required && empty && !kind.is_container() {
        errors.insert("required".to_string(), Value::Bool(true));
    }

    let ControlValue::Text(text) = value else {
        return errors;
    };
    if text.is_empty() {
        return errors;
    }
    let length = text.chars().count();

    if let Some(min) = el.attr("minlength").and_then(|v| v.trim().parse::<usize>().ok()) {
        if length < min {
            errors.insert(
                "minlength".to_string(),
                json!({"requiredLength": min, "actualLength": length}),
            );
        }
    }
    if let Some(max) = el.attr("maxlength").and_then(|v| v.trim().parse::<usize>().ok()) {
        if length > max {
            errors.insert(
                "maxlength".to_string(),
                json!({"requiredLength": max, "actualLength": length}),
            );
        }
    }

    if let Some(pattern) = el.attr("pattern").filter(|p| !p.is_empty()) {
        // Browsers anchor the pattern attribute; unparseable patterns are ignored.
        if let Ok(re) = Regex::new(&format!("^(?:{pattern})$")) {
            if !re.is_match(text) {
                errors.insert(
                    "pattern".to_string(),
                    json!({"requiredPattern": pattern, "actualValue": text}),
                );
            }
        }
    }

    if kind == InputKind::Email && !EMAIL.is_match(text) {
        errors.insert("email".to_string(), Value::Bool(true));
    }

    if matches!(kind, InputKind::Number | InputKind::Range) {
        if let Ok(actual) = text.trim().parse::<f64>() {
            if let Some(min) = el.attr("min").and_then(|v| v.trim().parse::<f64>().ok()) {
                if actual < min {
                    errors.insert("min".to_string(), json!({"min": min, "actual": actual}));
                }
            }
            if let Some(max) = el.attr("max").and_then(|v| v.trim().parse::<f64>().ok()) {
                if actual > max {
                    errors.insert("max".to_string(), json!({"max": max, "actual": actual}));
                }
            }
        }
    }

    errors
}
