//! tagtree Serializer
//!
//! Turns a parsed tree back into markup or plain text.
//!
//! ```text
//! Tree → to_html(options) → "<p id=\"a\">Hi</p>"
//! Tree → to_text()        → "Hi"
//! ```

pub mod html;
pub mod text;

pub use html::to_html;
pub use text::to_text;

/// HTML output settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SerializeOptions {
    /// Put each element on its own line, indented by depth.
    pub pretty: bool,
    /// Spaces per nesting level when `pretty` is set.
    pub indent: usize,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: 2,
        }
    }
}

impl SerializeOptions {
    pub fn compact() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }
}
