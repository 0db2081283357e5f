//! Tree builder.
//!
//! Folds a token stream into a [`Tree`] using a stack of open elements. The
//! top of the stack is the insertion point for new nodes.

use crate::node::{ElementData, NodeData, NodeId, Tree};
use tagtree_lexer::{is_void_element, Span, Token, TokenKind};

/// Stack-based tree builder.
pub struct TreeBuilder {
    tree: Tree,
    open: Vec<NodeId>,
    end: usize,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            tree: Tree::new(),
            open: vec![NodeId::ROOT],
            end: 0,
        }
    }

    /// Build a tree from a complete token stream.
    pub fn build(tokens: impl IntoIterator<Item = Token>) -> Tree {
        let mut builder = TreeBuilder::new();
        for token in tokens {
            builder.process(token);
        }
        builder.finish()
    }

    /// Apply one token to the tree.
    pub fn process(&mut self, token: Token) {
        let Token { kind, span } = token;
        let parent = self.current();
        self.end = self.end.max(span.end);

        match kind {
            TokenKind::Character(ch) => self.insert_char(ch, span),
            TokenKind::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                // Void and self-closing elements never become the insertion point.
                let leaf = self_closing || is_void_element(&name);
                let id = self.tree.append(
                    parent,
                    NodeData::Element(ElementData::new(name, attributes)),
                    Some(span.start),
                    leaf.then_some(span.end),
                );
                if !leaf {
                    self.open.push(id);
                }
            }
            TokenKind::EndTag { name } => self.close(&name, span),
            TokenKind::Comment(text) => {
                self.tree.append(
                    parent,
                    NodeData::Comment(text),
                    Some(span.start),
                    Some(span.end),
                );
            }
            TokenKind::Doctype {
                name,
                public_id,
                system_id,
            } => {
                self.tree.append(
                    parent,
                    NodeData::Doctype {
                        name,
                        public_id,
                        system_id,
                    },
                    Some(span.start),
                    Some(span.end),
                );
            }
        }
    }

    /// Finish building. Elements still open stay open.
    pub fn finish(mut self) -> Tree {
        if self.open.len() > 1 {
            tracing::debug!(
                unclosed = self.open.len() - 1,
                "elements left open at end of input"
            );
        }
        self.tree.node_mut(NodeId::ROOT).end_index = Some(self.end);
        self.tree
    }

    /// Current insertion point.
    fn current(&self) -> NodeId {
        *self.open.last().expect("open stack always holds the document")
    }

    fn insert_char(&mut self, ch: char, span: Span) {
        let parent = self.current();

        let last = self.tree.children(parent).last().copied();
        if let Some(last) = last {
            let node = self.tree.node_mut(last);
            if let NodeData::Text(text) = &mut node.data {
                text.push(ch);
                node.end_index = Some(span.end);
                return;
            }
        }

        self.tree.append(
            parent,
            NodeData::Text(ch.to_string()),
            Some(span.start),
            Some(span.end),
        );
    }

    /// Pop the insertion point if it is an element named `name`.
    fn close(&mut self, name: &str, span: Span) {
        let current = self.current();
        let matches = self.tree[current]
            .as_element()
            .is_some_and(|el| el.tag.eq_ignore_ascii_case(name));

        if matches {
            self.open.pop();
            self.tree.node_mut(current).end_index = Some(span.end);
        } else {
            tracing::debug!(
                tag = name,
                line = span.line,
                column = span.column,
                "ignoring mismatched end tag"
            );
        }
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;
    use pretty_assertions::assert_eq;
    use tagtree_lexer::{ErrorMode, Tokenizer};

    fn build(source: &str) -> Tree {
        let tokens = Tokenizer::tokenize(source, ErrorMode::Ignore).unwrap().tokens;
        TreeBuilder::build(tokens)
    }

    fn root_children(tree: &Tree) -> Vec<NodeId> {
        tree.children(tree.root()).to_vec()
    }

    fn tag(tree: &Tree, id: NodeId) -> &str {
        &tree[id].as_element().expect("element").tag
    }

    // =========================================================================
    // Text
    // =========================================================================

    #[test]
    fn test_empty_input() {
        let tree = build("");
        assert!(root_children(&tree).is_empty());
        assert_eq!(tree[tree.root()].end_index(), Some(0));
    }

    #[test]
    fn test_characters_merge_into_one_text_node() {
        let tree = build("Hello, world!");
        let kids = root_children(&tree);
        assert_eq!(kids.len(), 1);
        assert_eq!(tree[kids[0]].as_text(), Some("Hello, world!"));
        assert_eq!(tree[kids[0]].start_index(), Some(0));
        assert_eq!(tree[kids[0]].end_index(), Some(13));
    }

    #[test]
    fn test_text_split_by_element() {
        let tree = build("a<br>b");
        let kinds: Vec<NodeKind> = root_children(&tree)
            .iter()
            .map(|&id| tree[id].kind())
            .collect();
        assert_eq!(kinds, vec![NodeKind::Text, NodeKind::Element, NodeKind::Text]);
    }

    #[test]
    fn test_text_split_by_comment() {
        let tree = build("a<!--x-->b");
        assert_eq!(root_children(&tree).len(), 3);
    }

    // =========================================================================
    // Elements and nesting
    // =========================================================================

    #[test]
    fn test_unclosed_element_stays_open() {
        let tree = build("<p>");
        let kids = root_children(&tree);
        assert_eq!(kids.len(), 1);
        assert_eq!(tag(&tree, kids[0]), "p");
        assert!(tree.children(kids[0]).is_empty());
        assert_eq!(tree[kids[0]].end_index(), None);
    }

    #[test]
    fn test_nesting_and_parents() {
        let tree = build("<div><p>Hello</p></div>");
        let div = root_children(&tree)[0];
        let p = tree.children(div)[0];
        let text = tree.children(p)[0];

        assert_eq!(tag(&tree, div), "div");
        assert_eq!(tag(&tree, p), "p");
        assert_eq!(tree[text].as_text(), Some("Hello"));
        assert_eq!(tree.parent(div), Some(tree.root()));
        assert_eq!(tree.parent(p), Some(div));
        assert_eq!(tree.parent(text), Some(p));
    }

    #[test]
    fn test_siblings_after_close() {
        let tree = build("<ul><li>a</li><li>b</li></ul>");
        let ul = root_children(&tree)[0];
        assert_eq!(tree.children(ul).len(), 2);
    }

    #[test]
    fn test_void_element_is_not_pushed() {
        let tree = build("<p>a<br>b</p>");
        let p = root_children(&tree)[0];
        let kids = tree.children(p);
        assert_eq!(kids.len(), 3);
        assert!(tree.children(kids[1]).is_empty());
        assert_eq!(tree[kids[2]].as_text(), Some("b"));
    }

    #[test]
    fn test_self_closing_element_is_not_pushed() {
        let tree = build("<div/><span></span>");
        let kids = root_children(&tree);
        assert_eq!(kids.len(), 2);
        assert!(tree.children(kids[0]).is_empty());
    }

    #[test]
    fn test_mismatched_end_tag_is_ignored() {
        let tree = build("<div><p>a</span>b</p></div>");
        let div = root_children(&tree)[0];
        let p = tree.children(div)[0];
        assert_eq!(tree.children(p).len(), 1);
        assert_eq!(tree.text_content(p), "ab");
    }

    #[test]
    fn test_end_tag_for_outer_element_does_not_pop_inner() {
        let tree = build("<div><p>a</div>b");
        let div = root_children(&tree)[0];
        let p = tree.children(div)[0];
        // </div> does not match <p>, so "b" lands inside <p>.
        assert_eq!(tree.text_content(p), "ab");
        assert_eq!(root_children(&tree).len(), 1);
    }

    #[test]
    fn test_stray_end_tag_at_root() {
        let tree = build("</p>x");
        let kids = root_children(&tree);
        assert_eq!(kids.len(), 1);
        assert_eq!(tree[kids[0]].as_text(), Some("x"));
    }

    #[test]
    fn test_attributes_are_carried() {
        let tree = build("<p id=\"foo\" class=\"bar\"></p>");
        let el = tree[root_children(&tree)[0]].as_element().unwrap();
        let attrs: Vec<(&str, &str)> = el.attributes.iter().collect();
        assert_eq!(attrs, vec![("id", "foo"), ("class", "bar")]);
    }

    // =========================================================================
    // Comments, doctypes, spans
    // =========================================================================

    #[test]
    fn test_comment_node() {
        let tree = build("<div><!-- note --></div>");
        let div = root_children(&tree)[0];
        let comment = tree.children(div)[0];
        assert_eq!(tree[comment].data(), &NodeData::Comment(" note ".into()));
    }

    #[test]
    fn test_doctype_node() {
        let tree = build("<!DOCTYPE html><html></html>");
        let kids = root_children(&tree);
        assert_eq!(tree[kids[0]].kind(), NodeKind::Doctype);
        assert_eq!(tag(&tree, kids[1]), "html");
    }

    #[test]
    fn test_element_spans() {
        let source = "<div><p>hi</p><br></div>";
        let tree = build(source);
        let div = root_children(&tree)[0];
        let p = tree.children(div)[0];
        let br = tree.children(div)[1];

        assert_eq!(tree[div].start_index(), Some(0));
        assert_eq!(tree[div].end_index(), Some(source.len()));
        assert_eq!(
            &source[tree[p].start_index().unwrap()..tree[p].end_index().unwrap()],
            "<p>hi</p>"
        );
        assert_eq!(tree[br].start_index(), Some(14));
        assert_eq!(tree[br].end_index(), Some(18));
        assert_eq!(tree[tree.root()].end_index(), Some(source.len()));
    }
}
