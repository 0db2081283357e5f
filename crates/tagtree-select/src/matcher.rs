//! Selector matching.
//!
//! Each selector in a list is evaluated left to right: the head is matched
//! against the origin's subtree, then every `(combinator, compound)` step
//! narrows the previous matches to their children or descendants. Results from
//! all selectors are merged and returned in document order.

use std::collections::HashSet;

use tagtree_dom::{NodeId, Tree};

use crate::selector::{Combinator, Selector, SelectorList, SimpleSelector};

/// Check one element against a simple selector. Non-elements never match.
pub fn matches(tree: &Tree, id: NodeId, simple: &SimpleSelector) -> bool {
    let Some(el) = tree[id].as_element() else {
        return false;
    };

    simple
        .tag
        .as_deref()
        .map_or(true, |tag| tag.eq_ignore_ascii_case(&el.tag))
        && simple.id.as_deref().map_or(true, |want| el.id() == Some(want))
        && simple.classes.iter().all(|class| el.has_class(class))
}

/// Parse `selector` and run it against the subtree under `origin`.
pub fn query(tree: &Tree, origin: NodeId, selector: &str) -> Vec<NodeId> {
    select(tree, origin, &SelectorList::parse(selector))
}

/// Every element under `origin` (excluding `origin`) selected by `list`,
/// de-duplicated and in document order.
pub fn select(tree: &Tree, origin: NodeId, list: &SelectorList) -> Vec<NodeId> {
    let mut found = MatchSet::default();
    for selector in &list.selectors {
        for id in select_one(tree, origin, selector) {
            found.insert(id);
        }
    }

    if found.is_empty() {
        return Vec::new();
    }

    tree.preorder(tree.root())
        .filter(|id| found.contains(*id))
        .collect()
}

fn select_one(tree: &Tree, origin: NodeId, selector: &Selector) -> Vec<NodeId> {
    let Some(head) = selector.head.as_simple() else {
        return Vec::new();
    };

    let mut current: Vec<NodeId> = tree
        .descendants(origin)
        .filter(|&id| matches(tree, id, head))
        .collect();

    for (combinator, compound) in &selector.tail {
        let Some(simple) = compound.as_simple() else {
            return Vec::new();
        };

        let mut next = MatchSet::default();
        for &id in &current {
            match combinator {
                Combinator::Child => {
                    for &child in tree.children(id) {
                        if matches(tree, child, simple) {
                            next.insert(child);
                        }
                    }
                }
                Combinator::Descendant => {
                    for desc in tree.descendants(id) {
                        if matches(tree, desc, simple) {
                            next.insert(desc);
                        }
                    }
                }
            }
        }

        if next.is_empty() {
            return Vec::new();
        }
        current = next.into_vec();
    }

    current
}

/// Insertion-ordered set of node ids.
#[derive(Default)]
struct MatchSet {
    order: Vec<NodeId>,
    seen: HashSet<NodeId>,
}

impl MatchSet {
    fn insert(&mut self, id: NodeId) {
        if self.seen.insert(id) {
            self.order.push(id);
        }
    }

    fn contains(&self, id: NodeId) -> bool {
        self.seen.contains(&id)
    }

    fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn into_vec(self) -> Vec<NodeId> {
        self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tagtree_dom::TreeBuilder;
    use tagtree_lexer::{ErrorMode, Tokenizer};

    fn build(source: &str) -> Tree {
        let tokens = Tokenizer::tokenize(source, ErrorMode::Ignore).unwrap().tokens;
        TreeBuilder::build(tokens)
    }

    /// Run a query from the root and return the text content of each match.
    fn texts(tree: &Tree, selector: &str) -> Vec<String> {
        query(tree, tree.root(), selector)
            .into_iter()
            .map(|id| tree.text_content(id))
            .collect()
    }

    // =========================================================================
    // Simple selectors
    // =========================================================================

    #[test]
    fn test_query_by_tag_in_document_order() {
        let tree = build("<div><p>Hello</p><p>World</p></div>");
        assert_eq!(texts(&tree, "p"), vec!["Hello", "World"]);
    }

    #[test]
    fn test_query_by_class_and_id() {
        let tree = build("<div><p class=\"foo\">Hello</p><p id=\"bar\">World</p></div>");
        assert_eq!(texts(&tree, ".foo"), vec!["Hello"]);
        assert_eq!(texts(&tree, "#bar"), vec!["World"]);
    }

    #[test]
    fn test_tag_match_is_case_insensitive() {
        let tree = build("<div><p>x</p></div>");
        assert_eq!(texts(&tree, "P"), vec!["x"]);
        assert_eq!(texts(&tree, "DIV > p"), vec!["x"]);
    }

    #[test]
    fn test_id_match_is_exact() {
        let tree = build("<p id=\"Main\">x</p>");
        assert!(texts(&tree, "#main").is_empty());
        assert_eq!(texts(&tree, "#Main"), vec!["x"]);
    }

    #[test]
    fn test_all_classes_required() {
        let tree = build(
            "<div class=\"card\">a</div><div class=\"card highlight\">b</div><div class=\"highlight\">c</div>",
        );
        assert_eq!(texts(&tree, ".card.highlight"), vec!["b"]);
        assert_eq!(texts(&tree, "div.highlight"), vec!["b", "c"]);
    }

    #[test]
    fn test_compound_with_tag_id_and_classes() {
        let tree = build(
            "<div id=\"main\" class=\"card highlight\">a</div><section id=\"main\" class=\"card highlight\">b</section>",
        );
        assert_eq!(texts(&tree, "div#main.card.highlight"), vec!["a"]);
    }

    #[test]
    fn test_text_and_comments_never_match() {
        let tree = build("<!--p-->p");
        assert!(query(&tree, tree.root(), "p").is_empty());
    }

    // =========================================================================
    // Combinators
    // =========================================================================

    #[test]
    fn test_child_combinator() {
        let tree = build("<div><p>direct</p><section><p>nested</p></section></div>");
        assert_eq!(texts(&tree, "div > p"), vec!["direct"]);
    }

    #[test]
    fn test_descendant_combinator() {
        let tree = build("<div><p>direct</p><section><p>nested</p></section></div>");
        assert_eq!(texts(&tree, "div p"), vec!["direct", "nested"]);
    }

    #[test]
    fn test_nested_matches_are_deduplicated() {
        let tree = build("<div><div><div><span>x</span></div></div></div>");
        let found = query(&tree, tree.root(), "div span");
        assert_eq!(found.len(), 1);
        let divs = query(&tree, tree.root(), "div div");
        assert_eq!(divs.len(), 2);
    }

    #[test]
    fn test_three_step_chain() {
        let tree =
            build("<ul class=\"nav\"><li><a>1</a></li><li><b><a>2</a></b></li></ul><a>3</a>");
        assert_eq!(texts(&tree, "ul.nav > li > a"), vec!["1"]);
        assert_eq!(texts(&tree, "ul.nav li a"), vec!["1", "2"]);
    }

    #[test]
    fn test_chain_with_no_intermediate_match() {
        let tree = build("<div><p>x</p></div>");
        assert!(query(&tree, tree.root(), "section p").is_empty());
    }

    // =========================================================================
    // Lists and ordering
    // =========================================================================

    #[test]
    fn test_list_results_in_document_order() {
        let tree = build("<p>1</p><b>2</b><p>3</p><b>4</b>");
        let a = query(&tree, tree.root(), "b, p");
        let b = query(&tree, tree.root(), "p, b");
        assert_eq!(a, b);
        assert_eq!(texts(&tree, "b, p"), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_list_union_removes_duplicates() {
        let tree = build("<div><p class=\"x\">a</p></div>");
        assert_eq!(texts(&tree, "p, .x, div > p"), vec!["a"]);
    }

    #[test]
    fn test_query_is_idempotent() {
        let tree = build("<div><p>a</p><p>b</p></div>");
        assert_eq!(
            query(&tree, tree.root(), "div p"),
            query(&tree, tree.root(), "div p")
        );
    }

    // =========================================================================
    // Origins and malformed input
    // =========================================================================

    #[test]
    fn test_origin_is_excluded_and_scopes_search() {
        let tree = build("<div><div><p>in</p></div></div><p>out</p>");
        let outer = tree.children(tree.root())[0];
        let inner: Vec<NodeId> = query(&tree, outer, "div");
        assert_eq!(inner.len(), 1);
        assert_ne!(inner[0], outer);
        let ps: Vec<String> = query(&tree, outer, "p")
            .into_iter()
            .map(|id| tree.text_content(id))
            .collect();
        assert_eq!(ps, vec!["in"]);
    }

    #[test]
    fn test_malformed_selector_matches_nothing() {
        let tree = build("<div><p>x</p></div>");
        assert!(query(&tree, tree.root(), "p:first").is_empty());
        assert!(query(&tree, tree.root(), "div > ").is_empty());
        assert!(query(&tree, tree.root(), "").is_empty());
    }

    #[test]
    fn test_malformed_entry_does_not_poison_list() {
        let tree = build("<div><p>x</p></div>");
        assert_eq!(texts(&tree, "p[x], p"), vec!["x"]);
    }
}
