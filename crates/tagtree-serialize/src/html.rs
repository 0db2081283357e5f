//! HTML serializer.
//!
//! Compact output writes every node back in canonical form with no added
//! whitespace, so a parsed document round-trips to its tag, attribute and text
//! structure. Pretty output puts each element on its own line.

use crate::SerializeOptions;
use tagtree_dom::{ElementData, NodeData, NodeId, Tree};
use tagtree_lexer::is_void_element;

/// Serialize `id` and its subtree. Serializing the document writes its children.
pub fn to_html(tree: &Tree, id: NodeId, options: &SerializeOptions) -> String {
    let mut out = String::new();
    if options.pretty {
        generate_pretty(tree, id, options.indent, &mut out);
    } else {
        generate_compact(tree, id, &mut out);
    }
    out
}

/// A pending step of the walk. Children are pushed in reverse so they pop in
/// document order, with the parent's `Close` beneath them.
enum Frame {
    Open(NodeId, usize),
    Close(NodeId, usize),
}

// =========================================================================
// Compact
// =========================================================================

fn generate_compact(tree: &Tree, id: NodeId, out: &mut String) {
    let mut stack = vec![Frame::Open(id, 0)];

    while let Some(frame) = stack.pop() {
        let id = match frame {
            Frame::Open(id, _) => id,
            Frame::Close(id, _) => {
                if let Some(el) = tree[id].as_element() {
                    close_tag(el, out);
                }
                continue;
            }
        };

        match tree[id].data() {
            NodeData::Document => push_children(tree, id, 0, &mut stack),
            NodeData::Element(el) => {
                open_tag(el, out);
                if is_void_element(&el.tag) {
                    continue;
                }
                stack.push(Frame::Close(id, 0));
                push_children(tree, id, 0, &mut stack);
            }
            NodeData::Text(text) => out.push_str(text),
            NodeData::Comment(text) => comment(text, out),
            NodeData::Doctype {
                name,
                public_id,
                system_id,
            } => doctype(name, public_id.as_deref(), system_id.as_deref(), out),
        }
    }
}

// =========================================================================
// Pretty
// =========================================================================

fn generate_pretty(tree: &Tree, id: NodeId, width: usize, out: &mut String) {
    let mut stack = vec![Frame::Open(id, 0)];

    while let Some(frame) = stack.pop() {
        let (id, depth) = match frame {
            Frame::Open(id, depth) => (id, depth),
            Frame::Close(id, depth) => {
                if let Some(el) = tree[id].as_element() {
                    out.push_str(&" ".repeat(width * depth));
                    close_tag(el, out);
                    out.push('\n');
                }
                continue;
            }
        };
        let indent = " ".repeat(width * depth);

        match tree[id].data() {
            NodeData::Document => push_children(tree, id, depth, &mut stack),
            NodeData::Element(el) => {
                out.push_str(&indent);
                open_tag(el, out);

                if is_void_element(&el.tag) {
                    out.push('\n');
                    continue;
                }

                let children = tree.children(id);
                let text_only = children
                    .iter()
                    .all(|&child| matches!(tree[child].data(), NodeData::Text(_)));

                if text_only {
                    // Text-only children stay inline.
                    for &child in children {
                        if let Some(text) = tree[child].as_text() {
                            out.push_str(text);
                        }
                    }
                    close_tag(el, out);
                    out.push('\n');
                } else {
                    out.push('\n');
                    stack.push(Frame::Close(id, depth));
                    push_children(tree, id, depth + 1, &mut stack);
                }
            }
            NodeData::Text(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    out.push_str(&indent);
                    out.push_str(text);
                    out.push('\n');
                }
            }
            NodeData::Comment(text) => {
                out.push_str(&indent);
                comment(text, out);
                out.push('\n');
            }
            NodeData::Doctype {
                name,
                public_id,
                system_id,
            } => {
                out.push_str(&indent);
                doctype(name, public_id.as_deref(), system_id.as_deref(), out);
                out.push('\n');
            }
        }
    }
}

fn push_children(tree: &Tree, id: NodeId, depth: usize, stack: &mut Vec<Frame>) {
    stack.extend(
        tree.children(id)
            .iter()
            .rev()
            .map(|&child| Frame::Open(child, depth)),
    );
}

// =========================================================================
// Pieces
// =========================================================================

fn open_tag(el: &ElementData, out: &mut String) {
    out.push('<');
    out.push_str(&el.tag);
    for (name, value) in el.attributes.iter() {
        out.push(' ');
        out.push_str(name);
        out.push('=');
        quote_attr(value, out);
    }
    out.push('>');
}

fn close_tag(el: &ElementData, out: &mut String) {
    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
}

/// Double-quote a value, falling back to single quotes when the value has a
/// `"` and no `'`.
fn quote_attr(value: &str, out: &mut String) {
    if value.contains('"') && !value.contains('\'') {
        out.push('\'');
        out.push_str(value);
        out.push('\'');
    } else {
        out.push('"');
        out.push_str(&value.replace('"', "&quot;"));
        out.push('"');
    }
}

fn comment(text: &str, out: &mut String) {
    out.push_str("<!--");
    out.push_str(text);
    out.push_str("-->");
}

fn doctype(name: &str, public_id: Option<&str>, system_id: Option<&str>, out: &mut String) {
    out.push_str("<!DOCTYPE ");
    out.push_str(name);
    match (public_id, system_id) {
        (Some(public), Some(system)) => {
            out.push_str(&format!(" PUBLIC \"{public}\" \"{system}\""));
        }
        (Some(public), None) => out.push_str(&format!(" PUBLIC \"{public}\"")),
        (None, Some(system)) => out.push_str(&format!(" SYSTEM \"{system}\"")),
        (None, None) => {}
    }
    out.push('>');
}
