use form_snapshot::page::dom::Document;
use form_snapshot::page::loader::PageDump;
use serde_json::{Value, json};

pub const PAGE_URL: &str = "https://app.test/form";

/// `<body><form>children</form></body>`
pub fn form_page(children: Value) -> Document {
    page(json!([{"tag": "form", "children": children}]))
}

/// `<body>children</body>`
pub fn page(children: Value) -> Document {
    let dump: PageDump = serde_json::from_value(json!({
        "url": PAGE_URL,
        "title": "Form",
        "root": {"tag": "body", "children": children}
    }))
    .unwrap();
    Document::from_dump(dump)
}

pub fn text_input(name: &str, value: &str) -> Value {
    json!({"tag": "input", "attributes": {"type": "text", "name": name}, "value": value})
}

pub fn checkbox(name: &str, checked: bool) -> Value {
    json!({"tag": "input", "attributes": {"type": "checkbox", "name": name}, "checked": checked})
}

/// Nested bound groups, `depth` levels deep, with one control at the bottom.
pub fn nested_groups(depth: usize) -> Document {
    let mut node = json!({"tag": "input", "attributes": {"formcontrolname": "leaf"}, "value": "x"});
    for level in (0..depth).rev() {
        node = json!({
            "tag": "div",
            "attributes": {"formgroupname": format!("g{level}")},
            "children": [node]
        });
    }
    page(json!([node]))
}

/// `count` text inputs with distinct names.
pub fn many_inputs(count: usize) -> Document {
    let inputs: Vec<Value> = (0..count)
        .map(|i| text_input(&format!("field{i}"), &format!("value {i}")))
        .collect();
    form_page(Value::Array(inputs))
}
