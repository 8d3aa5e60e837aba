use std::fmt;

use crate::extract::descriptor_model::ControlDescriptor;
use crate::identity::normalize::{canonical_attributes, fingerprint, fold_generated_id};
use crate::page::path::PATH_SEPARATOR;

pub const KEY_SEPARATOR: &str = "::";

/// Identity used to pair a captured descriptor with a live one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatchKey(String);

impl MatchKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short SHA-1 prefix, for logs and report references.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.0)
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `name::tag::domPath::{canonical attributes as sorted JSON}`.
///
/// Total and deterministic: the same descriptor always yields the same key.
pub fn match_key(descriptor: &ControlDescriptor) -> MatchKey {
    let attrs = canonical_attributes(&descriptor.attributes);
    // BTreeMap<String, String> always serializes; keys come out sorted.
    let attrs_json = serde_json::to_string(&attrs).unwrap_or_default();

    MatchKey(format!(
        "{name}{sep}{tag}{sep}{path}{sep}{attrs}",
        name = descriptor.name,
        tag = descriptor.tag_name,
        path = canonical_path(&descriptor.dom_path),
        attrs = attrs_json,
        sep = KEY_SEPARATOR,
    ))
}

/// Decoded descriptors may come from a dumper that did not fold generated ids.
fn canonical_path(path: &str) -> String {
    path.split(PATH_SEPARATOR)
        .map(|segment| match segment.split_once('#') {
            Some((tag, rest)) => {
                let (id, suffix) = match rest.find(':') {
                    Some(pos) => rest.split_at(pos),
                    None => (rest, ""),
                };
                format!("{tag}#{}{suffix}", fold_generated_id(id))
            }
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join(PATH_SEPARATOR)
}
