use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// Framework-generated ids such as `mat-input-3` or `cdk-overlay-12`.
static GENERATED_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((?:mat|mdc|cdk|ng|p)-[A-Za-z0-9-]*?-)\d+$").expect("static id pattern compiles")
});

/// Attributes that reflect live state rather than identity.
const VOLATILE_ATTRS: &[&str] = &[
    "aria-activedescendant",
    "aria-checked",
    "aria-controls",
    "aria-describedby",
    "aria-disabled",
    "aria-expanded",
    "aria-invalid",
    "aria-owns",
    "aria-pressed",
    "aria-readonly",
    "aria-selected",
    "checked",
    "disabled",
    "ng-reflect-model",
    "readonly",
    "selected",
    "style",
];

/// Attributes whose values are element ids.
const ID_REF_ATTRS: &[&str] = &["id", "for", "aria-labelledby"];

const VOLATILE_CLASS_PREFIXES: &[&str] = &["ng-", "cdk-"];
const VOLATILE_CLASS_SUFFIXES: &[&str] = &["-focused", "-checked", "-selected", "-disabled", "-invalid"];
const VOLATILE_CLASSES: &[&str] = &["is-valid", "is-invalid", "mat-form-field-should-float"];

/// `mat-input-3` → `mat-input-#`; anything else is returned unchanged.
pub fn fold_generated_id(id: &str) -> String {
    GENERATED_ID.replace(id, "${1}#").into_owned()
}

fn is_volatile_class(class: &str) -> bool {
    VOLATILE_CLASSES.contains(&class)
        || VOLATILE_CLASS_PREFIXES.iter().any(|p| class.starts_with(p))
        || VOLATILE_CLASS_SUFFIXES.iter().any(|s| class.ends_with(s))
}

/// Stable class list: volatile state tokens removed, remainder sorted.
pub fn stable_classes(class: &str) -> String {
    let mut kept: Vec<&str> = class.split_whitespace().filter(|c| !is_volatile_class(c)).collect();
    kept.sort_unstable();
    kept.dedup();
    kept.join(" ")
}

/// Attributes reduced to the ones that identify a control across reloads.
pub fn canonical_attributes(attrs: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let choice = matches!(
        attrs.get("type").map(|t| t.to_lowercase()).as_deref(),
        Some("checkbox") | Some("radio")
    );

    let mut out = BTreeMap::new();
    for (name, value) in attrs {
        let name = name.to_lowercase();
        if VOLATILE_ATTRS.contains(&name.as_str())
            || name.starts_with("_ngcontent")
            || name.starts_with("_nghost")
        {
            continue;
        }
        // Text inputs mirror their live value into `value`; choices are named by it.
        if name == "value" && !choice {
            continue;
        }

        let value = if name == "class" {
            let classes = stable_classes(value);
            if classes.is_empty() {
                continue;
            }
            classes
        } else if ID_REF_ATTRS.contains(&name.as_str()) {
            value
                .split_whitespace()
                .map(fold_generated_id)
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            value.trim().to_string()
        };

        out.insert(name, value);
    }
    out
}

/// Short content fingerprint for logs and control references.
pub fn fingerprint(text: &str) -> String {
    use sha1::{Digest, Sha1};

    let mut hasher = Sha1::new();
    hasher.update(text.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..12].to_string()
}
