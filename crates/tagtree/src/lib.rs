//! tagtree
//!
//! Parse markup into a navigable node tree and query it with CSS-like
//! selectors.
//!
//! ```text
//! Source → Tokenizer → Vec<Token> → TreeBuilder → Tree → query / to_html / to_text
//! ```
//!
//! # Example
//!
//! ```
//! use tagtree::{parse, ParseOptions};
//!
//! let doc = parse("<ul><li class=\"x\">a</li><li>b</li></ul>", &ParseOptions::default()).unwrap();
//! let hits = doc.query("ul > li.x");
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].text_content(), "a");
//! assert_eq!(doc.to_text(), "ab");
//! ```

pub use tagtree_dom::{
    ElementData, Node, NodeData, NodeId, NodeKind, NodeRef, Tree, TreeBuilder, XHTML_NAMESPACE,
};
pub use tagtree_lexer::{ErrorMode, Span, SyntaxError, Token, TokenKind, Tokenizer};
pub use tagtree_select::SelectorList;
pub use tagtree_serialize::SerializeOptions;

/// The error returned by [`parse`] in strict mode and listed by [`ParseResult::errors`].
pub type ParseError = SyntaxError;

/// Parser settings. Every field is optional when deserialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParseOptions {
    /// Record syntax errors in [`ParseResult::errors`] instead of dropping them.
    pub collect_errors: bool,
    /// Fail on the first syntax error. Overrides `collect_errors`.
    pub strict: bool,
    /// Accepted for compatibility; has no effect on parsing.
    pub fragment_context: Option<String>,
}

impl ParseOptions {
    pub fn error_mode(&self) -> ErrorMode {
        if self.strict {
            ErrorMode::Strict
        } else if self.collect_errors {
            ErrorMode::Collect
        } else {
            ErrorMode::Ignore
        }
    }
}

/// Parse `markup` into a tree.
///
/// Only strict mode returns `Err`; in the other modes malformed input still
/// produces a tree.
pub fn parse(markup: &str, options: &ParseOptions) -> Result<ParseResult, SyntaxError> {
    tracing::debug!(len = markup.len(), mode = ?options.error_mode(), "parsing markup");

    if let Some(context) = &options.fragment_context {
        tracing::warn!(context = %context, "fragmentContext is not supported and will be ignored");
    }

    let output = Tokenizer::tokenize(markup, options.error_mode())?;
    let tree = TreeBuilder::build(output.tokens);

    tracing::debug!(
        nodes = tree.len(),
        errors = output.errors.len(),
        "parsed markup"
    );

    Ok(ParseResult {
        tree,
        errors: output.errors,
    })
}

/// A parsed document plus any collected syntax errors.
#[derive(Debug, Clone)]
pub struct ParseResult {
    tree: Tree,
    errors: Vec<SyntaxError>,
}

impl ParseResult {
    /// The Document node.
    pub fn root(&self) -> NodeRef<'_> {
        self.tree.node_ref(self.tree.root())
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Errors in source order. Empty unless errors were collected.
    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    /// Elements matching `selector` in document order. A malformed selector
    /// matches nothing.
    pub fn query(&self, selector: &str) -> Vec<NodeRef<'_>> {
        tagtree_select::query(&self.tree, self.tree.root(), selector)
            .into_iter()
            .map(|id| self.tree.node_ref(id))
            .collect()
    }

    /// Like [`ParseResult::query`] with a pre-parsed selector list.
    pub fn select(&self, selectors: &SelectorList) -> Vec<NodeRef<'_>> {
        tagtree_select::select(&self.tree, self.tree.root(), selectors)
            .into_iter()
            .map(|id| self.tree.node_ref(id))
            .collect()
    }

    /// Compact canonical markup for the whole document.
    pub fn to_html(&self) -> String {
        self.to_html_with(&SerializeOptions::default())
    }

    pub fn to_html_with(&self, options: &SerializeOptions) -> String {
        tagtree_serialize::to_html(&self.tree, self.tree.root(), options)
    }

    /// Outer markup of a single node.
    pub fn outer_html(&self, id: NodeId) -> String {
        tagtree_serialize::to_html(&self.tree, id, &SerializeOptions::default())
    }

    pub fn to_text(&self) -> String {
        tagtree_serialize::to_text(&self.tree, self.tree.root())
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }
}
