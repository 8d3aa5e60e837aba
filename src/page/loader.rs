use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PageError;
use crate::page::dom::{Document, Validity};

/// Tree-shaped page dump as written by the browser-side dumper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageDump {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    pub root: Option<NodeDump>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDump {
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity: Option<Validity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDump>,
}

/// Parse a page dump from JSON text.
pub fn parse_page(json: &str) -> Result<Document, PageError> {
    let dump: PageDump = serde_json::from_str(json).map_err(|e| PageError::Json {
        context: "page dump".into(),
        source: e,
    })?;
    Ok(Document::from_dump(dump))
}

/// Load a page dump file into a `Document`.
pub fn load_page(path: impl AsRef<Path>) -> Result<Document, PageError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| PageError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_page(&content)
}

/// Write a document back out as a pretty-printed page dump.
pub fn save_page(path: impl AsRef<Path>, doc: &Document) -> Result<(), PageError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(&doc.to_dump()).map_err(|e| PageError::Json {
        context: "serializing page dump".into(),
        source: e,
    })?;
    std::fs::write(path, json).map_err(|e| PageError::Io {
        path: path.display().to_string(),
        source: e,
    })
}
