//! tagtree DOM
//!
//! The node tree produced by parsing, and the stack-based builder that folds
//! a token stream into it.
//!
//! ```
//! use tagtree_dom::TreeBuilder;
//! use tagtree_lexer::{ErrorMode, Tokenizer};
//!
//! let tokens = Tokenizer::tokenize("<p>Hi</p>", ErrorMode::Ignore).unwrap().tokens;
//! let tree = TreeBuilder::build(tokens);
//! assert_eq!(tree.text_content(tree.root()), "Hi");
//! ```

pub mod builder;
pub mod node;

pub use builder::TreeBuilder;
pub use node::{
    ElementData, Node, NodeData, NodeId, NodeKind, NodeRef, Preorder, Tree, XHTML_NAMESPACE,
};
