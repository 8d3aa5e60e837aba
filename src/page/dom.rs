use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::page::loader::{NodeDump, PageDump};

/// Index of an element in a `Document`. Ids are assigned in pre-order, so
/// comparing two ids compares their document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Native constraint-validation flags, as reported by the browser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Validity {
    pub value_missing: bool,
    pub type_mismatch: bool,
    pub pattern_mismatch: bool,
    pub too_long: bool,
    pub too_short: bool,
    pub range_underflow: bool,
    pub range_overflow: bool,
    pub step_mismatch: bool,
    pub bad_input: bool,
    pub custom_error: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,

    /// Live `value` property. Framework-bound values are not always strings.
    pub value: Option<Value>,
    pub checked: Option<bool>,
    pub selected: Option<bool>,
    pub files: Vec<String>,
    pub text: Option<String>,
    pub validity: Option<Validity>,

    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Boolean attribute semantics: present and not explicitly `"false"`.
    pub fn flag(&self, name: &str) -> bool {
        self.attr(name).is_some_and(|v| v != "false")
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn role(&self) -> Option<&str> {
        self.attr("role")
    }

    /// Lower-cased `type` attribute of an `<input>`, defaulting to `text`.
    pub fn input_type(&self) -> String {
        self.attr("type")
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "text".to_string())
    }

    pub fn text_trimmed(&self) -> &str {
        self.text.as_deref().unwrap_or("").trim()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Input,
    Change,
    Blur,
    Click,
}

/// A notification dispatched on an element during restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomEvent {
    pub target: NodeId,
    pub kind: EventKind,
}

/// Arena-backed page. Elements never own each other; parent and child links
/// are `NodeId`s into `nodes`.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub url: String,
    pub title: String,
    nodes: Vec<Element>,
    events: Vec<DomEvent>,
}

impl Document {
    pub fn from_dump(dump: PageDump) -> Self {
        let mut doc = Document {
            url: dump.url,
            title: dump.title,
            nodes: Vec::new(),
            events: Vec::new(),
        };

        if let Some(root) = dump.root {
            // Explicit stack keeps pre-order ids without recursion on deep trees.
            let mut stack: Vec<(NodeDump, Option<NodeId>)> = vec![(root, None)];
            while let Some((node, parent)) = stack.pop() {
                let id = NodeId(doc.nodes.len());
                let NodeDump {
                    tag,
                    attributes,
                    value,
                    checked,
                    selected,
                    files,
                    text,
                    validity,
                    children,
                } = node;

                doc.nodes.push(Element {
                    tag: tag.to_lowercase(),
                    attributes: attributes
                        .into_iter()
                        .map(|(k, v)| (k.to_lowercase(), v))
                        .collect(),
                    value,
                    checked,
                    selected,
                    files,
                    text,
                    validity,
                    parent,
                    children: Vec::new(),
                });
                if let Some(p) = parent {
                    doc.nodes[p.0].children.push(id);
                }

                for child in children.into_iter().rev() {
                    stack.push((child, Some(id)));
                }
            }
        }

        doc
    }

    pub fn to_dump(&self) -> PageDump {
        PageDump {
            url: self.url.clone(),
            title: self.title.clone(),
            root: self.root().map(|r| self.dump_node(r)),
        }
    }

    fn dump_node(&self, id: NodeId) -> NodeDump {
        let el = self.element(id);
        NodeDump {
            tag: el.tag.clone(),
            attributes: el.attributes.clone(),
            value: el.value.clone(),
            checked: el.checked,
            selected: el.selected,
            files: el.files.clone(),
            text: el.text.clone(),
            validity: el.validity.clone(),
            children: el.children.iter().map(|c| self.dump_node(*c)).collect(),
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        if self.nodes.is_empty() { None } else { Some(NodeId(0)) }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn element(&self, id: NodeId) -> &Element {
        &self.nodes[id.0]
    }

    pub fn element_mut(&mut self, id: NodeId) -> &mut Element {
        &mut self.nodes[id.0]
    }

    /// All element ids in document order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.element(id).parent,
        }
    }

    /// Descendants of `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.element(id).children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.element(next).children.iter().rev().copied());
        }
        out
    }

    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    /// Record a notification. Bound logic on a real page would observe these.
    pub fn dispatch(&mut self, target: NodeId, kind: EventKind) {
        self.events.push(DomEvent { target, kind });
    }

    pub fn events(&self) -> &[DomEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }
}

pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.element(current).parent;
        Some(current)
    }
}
