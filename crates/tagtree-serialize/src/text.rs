//! Text extraction.

use tagtree_dom::{NodeId, Tree};

/// Text of `id`'s subtree in document order. Tags, comments and doctypes are
/// dropped; adjacent runs are joined without separators.
pub fn to_text(tree: &Tree, id: NodeId) -> String {
    tree.text_content(id)
}
