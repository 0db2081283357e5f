//! WASM bindings for tagtree.
//!
//! Option objects are plain JS objects (`{ collectErrors, strict }` for parsing,
//! `{ pretty, indent }` for output); `undefined` or `null` means defaults.
//! Strict-mode syntax errors are thrown as JS errors.

use serde::de::DeserializeOwned;
use tagtree::{ParseOptions, SerializeOptions, SyntaxError};
use wasm_bindgen::prelude::*;

/// Parse and re-serialize markup.
#[wasm_bindgen(js_name = toHtml)]
pub fn to_html(source: &str, options: JsValue, format: JsValue) -> Result<String, JsError> {
    let options: ParseOptions = from_js(options)?;
    let format: SerializeOptions = from_js(format)?;
    render_html(source, &options, &format).map_err(to_js_error)
}

/// Parse markup and return its text content.
#[wasm_bindgen(js_name = toText)]
pub fn to_text(source: &str, options: JsValue) -> Result<String, JsError> {
    let options: ParseOptions = from_js(options)?;
    let result = tagtree::parse(source, &options).map_err(to_js_error)?;
    Ok(result.to_text())
}

/// Outer HTML of every element matching `selector`, in document order.
#[wasm_bindgen]
pub fn query(source: &str, selector: &str, options: JsValue) -> Result<js_sys::Array, JsError> {
    let options: ParseOptions = from_js(options)?;
    let matches = query_html(source, selector, &options).map_err(to_js_error)?;
    Ok(matches.into_iter().map(JsValue::from).collect())
}

/// Every syntax error in `source` as `{ message, line, column, index }` objects.
#[wasm_bindgen]
pub fn check(source: &str) -> Result<JsValue, JsError> {
    let errors = collect_errors(source);
    serde_wasm_bindgen::to_value(&errors).map_err(|e| JsError::new(&e.to_string()))
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn from_js<T: DeserializeOwned + Default>(value: JsValue) -> Result<T, JsError> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsError::new(&format!("invalid options: {e}")))
}

fn to_js_error(e: SyntaxError) -> JsError {
    JsError::new(&e.to_string())
}

// =========================================================================
// Native pipeline
// =========================================================================

fn render_html(
    source: &str,
    options: &ParseOptions,
    format: &SerializeOptions,
) -> Result<String, SyntaxError> {
    Ok(tagtree::parse(source, options)?.to_html_with(format))
}

fn query_html(
    source: &str,
    selector: &str,
    options: &ParseOptions,
) -> Result<Vec<String>, SyntaxError> {
    let result = tagtree::parse(source, options)?;
    Ok(result
        .query(selector)
        .iter()
        .map(|node| result.outer_html(node.id()))
        .collect())
}

fn collect_errors(source: &str) -> Vec<SyntaxError> {
    let options = ParseOptions {
        collect_errors: true,
        ..ParseOptions::default()
    };
    match tagtree::parse(source, &options) {
        Ok(result) => result.errors().to_vec(),
        Err(e) => vec![e],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // =========================================================================
    // Native tests (non-WASM)
    // =========================================================================

    fn html(source: &str) -> String {
        render_html(source, &ParseOptions::default(), &SerializeOptions::default()).unwrap()
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(html(""), "");
        assert!(collect_errors("").is_empty());
    }

    #[test]
    fn test_round_trip() {
        let source = "<p id=\"foo\" class=\"bar\">Hello, world!</p>";
        assert_eq!(html(source), source);
    }

    #[test]
    fn test_pretty_format() {
        let out = render_html(
            "<div><p>x</p></div>",
            &ParseOptions::default(),
            &SerializeOptions::pretty(),
        )
        .unwrap();
        assert_eq!(out, "<div>\n  <p>x</p>\n</div>\n");
    }

    #[test]
    fn test_query_returns_outer_html() {
        let matches = query_html(
            "<ul><li class=\"a\">1</li><li>2<br></li></ul>",
            "ul > li",
            &ParseOptions::default(),
        )
        .unwrap();
        assert_eq!(matches, vec!["<li class=\"a\">1</li>", "<li>2<br></li>"]);
    }

    #[test]
    fn test_malformed_selector_returns_nothing() {
        let matches = query_html("<p>x</p>", "p >", &ParseOptions::default()).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_check_reports_positions() {
        let errors = collect_errors("<p<>");
        assert_eq!(errors.len(), 1);
        assert_eq!((errors[0].line, errors[0].column), (1, 3));
    }

    #[test]
    fn test_strict_error() {
        let options = ParseOptions {
            strict: true,
            ..ParseOptions::default()
        };
        let err = render_html("<p<>", &options, &SerializeOptions::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Syntax error at line 1, column 3: Unexpected character '<' in tag name"
        );
    }

    #[test]
    fn test_version() {
        let v = version();
        assert!(!v.is_empty());
        assert!(v.contains('.'));
    }

    #[test]
    fn test_multiple_parses() {
        // No state carried between calls
        let first = collect_errors("<p<>");
        let second = collect_errors("<p></p>");
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }
}
