use crate::identity::normalize::fold_generated_id;
use crate::page::dom::{Document, NodeId};

pub const PATH_SEPARATOR: &str = " > ";

/// Selector-like chain from the outermost kept ancestor down to `id`,
/// keeping at most `max_ancestors` ancestors above the element.
///
/// Segments are `tag`, `tag#id`, and get `:nth-of-type(k)` when the parent
/// has more than one child of the same tag.
pub fn dom_path(doc: &Document, id: NodeId, max_ancestors: usize) -> String {
    let mut segments = vec![segment(doc, id)];
    segments.extend(doc.ancestors(id).take(max_ancestors).map(|a| segment(doc, a)));
    segments.reverse();
    segments.join(PATH_SEPARATOR)
}

fn segment(doc: &Document, id: NodeId) -> String {
    let el = doc.element(id);
    let mut seg = el.tag.clone();

    if let Some(raw_id) = el.attr("id").map(str::trim).filter(|s| !s.is_empty()) {
        seg.push('#');
        seg.push_str(&fold_generated_id(raw_id));
    }

    if let Some(parent) = el.parent {
        let same_tag: Vec<NodeId> = doc
            .element(parent)
            .children
            .iter()
            .copied()
            .filter(|c| doc.element(*c).tag == el.tag)
            .collect();
        if same_tag.len() > 1 {
            if let Some(pos) = same_tag.iter().position(|c| *c == id) {
                seg.push_str(&format!(":nth-of-type({})", pos + 1));
            }
        }
    }

    seg
}
