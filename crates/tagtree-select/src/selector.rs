//! Selector parsing.
//!
//! Grammar:
//!
//! ```text
//! list      = selector ( "," selector )*
//! selector  = compound ( combinator compound )*
//! combinator= ">" | whitespace
//! compound  = tag? ( "#" ident | "." ident )*
//! tag       = [A-Za-z][A-Za-z0-9-]*
//! ident     = [A-Za-z0-9_-]+
//! ```
//!
//! Parsing never fails. A malformed compound, or a chain with a dangling
//! combinator, parses to something that matches nothing.

use std::fmt;
use std::str::FromStr;

/// How a compound relates to the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `a > b`
    Child,
    /// `a b`
    Descendant,
}

/// Tag, id and class constraints on a single element. Absent constraints
/// always hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleSelector {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

/// One compound in a chain. `Invalid` never matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compound {
    Simple(SimpleSelector),
    Invalid,
}

/// A chain of compounds joined by combinators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub head: Compound,
    pub tail: Vec<(Combinator, Compound)>,
}

/// Comma-separated selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorList {
    pub selectors: Vec<Selector>,
}

impl SelectorList {
    pub fn parse(source: &str) -> Self {
        let selectors = source
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Selector::parse)
            .collect();
        Self { selectors }
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

impl FromStr for SelectorList {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SelectorList::parse(s))
    }
}

impl Selector {
    /// Parse one selector (no commas).
    pub fn parse(source: &str) -> Self {
        let spaced = source.replace('>', " > ");
        let mut words = spaced.split_ascii_whitespace();

        let mut selector = match words.next() {
            Some(">") | None => return Selector::invalid(),
            Some(word) => Selector {
                head: Compound::parse(word),
                tail: Vec::new(),
            },
        };

        let mut pending: Option<Combinator> = None;
        for word in words {
            if word == ">" {
                if pending.is_some() {
                    return Selector::invalid();
                }
                pending = Some(Combinator::Child);
            } else {
                let combinator = pending.take().unwrap_or(Combinator::Descendant);
                selector.tail.push((combinator, Compound::parse(word)));
            }
        }

        if pending.is_some() {
            return Selector::invalid();
        }
        selector
    }

    fn invalid() -> Self {
        Selector {
            head: Compound::Invalid,
            tail: Vec::new(),
        }
    }
}

impl Compound {
    /// Parse a compound such as `div#main.card.highlight`.
    pub fn parse(source: &str) -> Self {
        parse_simple(source).map_or(Compound::Invalid, Compound::Simple)
    }

    pub fn as_simple(&self) -> Option<&SimpleSelector> {
        match self {
            Compound::Simple(simple) => Some(simple),
            Compound::Invalid => None,
        }
    }
}

fn parse_simple(source: &str) -> Option<SimpleSelector> {
    let mut simple = SimpleSelector::default();
    let tag_end = source.find(['#', '.']).unwrap_or(source.len());
    let (tag, mut rest) = source.split_at(tag_end);

    if !tag.is_empty() {
        if !is_tag_name(tag) {
            return None;
        }
        simple.tag = Some(tag.to_string());
    }

    while let Some(prefix) = rest.chars().next() {
        let body = &rest[1..];
        let end = body.find(['#', '.']).unwrap_or(body.len());
        let ident = &body[..end];
        if !is_ident(ident) {
            return None;
        }
        match prefix {
            '#' if simple.id.is_none() => simple.id = Some(ident.to_string()),
            '.' => simple.classes.push(ident.to_string()),
            _ => return None,
        }
        rest = &body[end..];
    }

    Some(simple)
}

fn is_tag_name(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn is_ident(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl fmt::Display for SimpleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(tag) = &self.tag {
            f.write_str(tag)?;
        }
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
        }
        for class in &self.classes {
            write!(f, ".{class}")?;
        }
        Ok(())
    }
}
