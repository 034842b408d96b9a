//! Ignored subtree detection

use cel_dom::{DomTree, NodeData, NodeId};

/// Nearest inclusive ancestor carrying `attribute`. The climb stops at the
/// document and at fragment boundaries.
pub fn closest_ignored(tree: &DomTree, node: NodeId, attribute: &str) -> Option<NodeId> {
    let mut current = node;
    while let Some(n) = tree.get(current) {
        if n.is_fragment() || matches!(n.data, NodeData::Document) {
            return None;
        }
        if tree.has_attribute(current, attribute) {
            return Some(current);
        }
        current = n.parent;
    }
    None
}

pub fn is_ignored(tree: &DomTree, node: NodeId, attribute: &str) -> bool {
    closest_ignored(tree, node, attribute).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cel_dom::Document;

    const IGNORE: &str = "data-cel-ignore";

    #[test]
    fn test_ignored_ancestor() {
        let mut doc = Document::new();
        let body = doc.body();
        let skipped = doc.create_element("div");
        let inner = doc.create_element("span");
        doc.append_child(body, skipped).unwrap();
        doc.append_child(skipped, inner).unwrap();
        doc.set_attribute(skipped, IGNORE, "").unwrap();

        assert_eq!(closest_ignored(doc.tree(), inner, IGNORE), Some(skipped));
        assert!(is_ignored(doc.tree(), skipped, IGNORE));
        assert!(!is_ignored(doc.tree(), body, IGNORE));
    }

    #[test]
    fn test_fragment_is_a_boundary() {
        let mut doc = Document::new();
        let frag = doc.create_document_fragment();
        let inner = doc.create_element("span");
        doc.append_child(frag, inner).unwrap();
        assert!(!is_ignored(doc.tree(), inner, IGNORE));
    }

    #[test]
    fn test_detached_and_stale_nodes() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        assert!(!is_ignored(doc.tree(), div, IGNORE));
        doc.destroy(div).unwrap();
        assert!(!is_ignored(doc.tree(), div, IGNORE));
        assert!(!is_ignored(doc.tree(), NodeId::NONE, IGNORE));
    }
}
