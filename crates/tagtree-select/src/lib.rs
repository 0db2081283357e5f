//! tagtree Selectors
//!
//! A small CSS-like selector language over a [`tagtree_dom::Tree`]: tag, `#id`
//! and `.class` simple selectors joined by child (`>`) and descendant
//! (whitespace) combinators, in comma-separated lists.
//!
//! ```
//! use tagtree_dom::TreeBuilder;
//! use tagtree_lexer::{ErrorMode, Tokenizer};
//!
//! let tokens = Tokenizer::tokenize("<ul><li>a</li><li>b</li></ul>", ErrorMode::Ignore)
//!     .unwrap()
//!     .tokens;
//! let tree = TreeBuilder::build(tokens);
//! assert_eq!(tagtree_select::query(&tree, tree.root(), "ul > li").len(), 2);
//! ```

pub mod matcher;
pub mod selector;

pub use matcher::{matches, query, select};
pub use selector::{Combinator, Compound, Selector, SelectorList, SimpleSelector};
