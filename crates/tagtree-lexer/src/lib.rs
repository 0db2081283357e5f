//! tagtree Lexer
//!
//! Tokenizes markup into a flat stream of tokens: single characters, start tags
//! with attributes, end tags, comments and doctypes. Source positions are tracked
//! on every token, and syntax errors are dropped, collected or returned
//! depending on the [`ErrorMode`].
//!
//! # Example
//!
//! ```
//! use tagtree_lexer::{ErrorMode, Tokenizer};
//!
//! let output = Tokenizer::tokenize("<p>hi</p>", ErrorMode::Ignore).unwrap();
//! assert_eq!(output.tokens.len(), 4); // <p>, 'h', 'i', </p>
//! ```

pub mod token;
pub mod tokenizer;

pub use token::{is_void_element, Attributes, Span, Token, TokenKind, VOID_ELEMENTS};
pub use tokenizer::{ErrorMode, Tokenized, Tokenizer};

/// Syntax error with position information.
///
/// `index` is the byte offset of the offending character in the source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize, serde::Deserialize)]
#[error("Syntax error at line {line}, column {column}: {message}")]
pub struct SyntaxError {
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub index: usize,
}
