use std::path::PathBuf;

use form_snapshot::page::dom::Document;
use form_snapshot::page::loader::load_page;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture(name: &str) -> Document {
    load_page(fixture_path(name)).unwrap()
}

/// Same page with every live value reset, as after a reload.
pub fn blank(mut doc: Document) -> Document {
    let ids: Vec<_> = doc.ids().collect();
    for id in ids {
        let el = doc.element_mut(id);
        el.value = None;
        el.files.clear();
        if el.checked.is_some() || is_choice(&el.tag) {
            el.checked = Some(false);
        }
        if el.selected.is_some() || el.tag.ends_with("option") {
            el.selected = Some(false);
        }
    }
    doc.clear_events();
    doc
}

fn is_choice(tag: &str) -> bool {
    matches!(
        tag,
        "input" | "mat-checkbox" | "mat-slide-toggle" | "mat-radio-button"
    )
}
