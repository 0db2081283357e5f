use crate::token::{Attributes, Span, Token, TokenKind};
use crate::SyntaxError;

/// What the tokenizer does with a syntax error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorMode {
    /// Drop the error and keep going.
    #[default]
    Ignore,
    /// Record the error and keep going.
    Collect,
    /// Stop at the first error and return it.
    Strict,
}

/// Output of a completed tokenizer run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokenized {
    pub tokens: Vec<Token>,
    /// Only populated in [`ErrorMode::Collect`].
    pub errors: Vec<SyntaxError>,
}

/// Location of a character in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Position {
    index: usize,
    line: usize,
    column: usize,
}

impl Position {
    fn start() -> Self {
        Self {
            index: 0,
            line: 1,
            column: 1,
        }
    }

    fn advance(&mut self, ch: char) {
        self.index += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Start,
    End,
}

/// The tag currently being lexed. Lives inside the tag states.
#[derive(Debug)]
struct TagBuilder {
    kind: TagKind,
    name: String,
    attributes: Attributes,
    attr_name: String,
    attr_value: String,
    start: Position,
}

impl TagBuilder {
    fn new(kind: TagKind, start: Position, first: char) -> Self {
        Self {
            kind,
            name: first.to_ascii_lowercase().to_string(),
            attributes: Attributes::new(),
            attr_name: String::new(),
            attr_value: String::new(),
            start,
        }
    }

    fn commit_attribute(&mut self) {
        if !self.attr_name.is_empty() {
            let name = std::mem::take(&mut self.attr_name);
            let value = std::mem::take(&mut self.attr_value);
            self.attributes.set(name, value);
        }
        self.attr_value.clear();
    }

    fn into_kind(mut self, self_closing: bool) -> TokenKind {
        self.commit_attribute();
        match self.kind {
            TagKind::Start => TokenKind::StartTag {
                name: self.name,
                attributes: self.attributes,
                self_closing,
            },
            // Attributes on end tags are lexed but discarded.
            TagKind::End => TokenKind::EndTag { name: self.name },
        }
    }
}

/// Lexer states. Tag states own the in-progress tag; declaration states own
/// their text buffer.
#[derive(Debug)]
enum State {
    Data,
    TagOpen(Position),
    EndTagOpen(Position),
    TagName(TagBuilder),
    BeforeAttributeName(TagBuilder),
    AttributeName(TagBuilder),
    AfterAttributeName(TagBuilder),
    BeforeAttributeValue(TagBuilder),
    AttributeValueDoubleQuoted(TagBuilder),
    AttributeValueSingleQuoted(TagBuilder),
    AttributeValueUnquoted(TagBuilder),
    SelfClosingStartTag(TagBuilder),
    MarkupDeclarationOpen { start: Position, seen: String },
    Comment { start: Position, buffer: String },
    Doctype { start: Position, buffer: String },
}

/// Markup tokenizer.
///
/// Consumes the input one character at a time through an explicit state
/// machine. A character that terminates one state and also begins the next is
/// re-fed to the new state without advancing the cursor.
pub struct Tokenizer {
    mode: ErrorMode,
    position: Position,
    tokens: Vec<Token>,
    errors: Vec<SyntaxError>,
}

impl Tokenizer {
    pub fn new(mode: ErrorMode) -> Self {
        Self {
            mode,
            position: Position::start(),
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Tokenize the entire source.
    ///
    /// Only [`ErrorMode::Strict`] can return `Err`.
    pub fn tokenize(source: &str, mode: ErrorMode) -> Result<Tokenized, SyntaxError> {
        Tokenizer::new(mode).run(source)
    }

    /// Consume `source` and return the emitted tokens.
    pub fn run(mut self, source: &str) -> Result<Tokenized, SyntaxError> {
        let mut state = State::Data;
        for ch in source.chars() {
            state = self.step(state, ch)?;
            self.position.advance(ch);
        }
        self.finish(state)?;

        Ok(Tokenized {
            tokens: self.tokens,
            errors: self.errors,
        })
    }

    /// Feed one character to `state` and return the next state.
    fn step(&mut self, state: State, ch: char) -> Result<State, SyntaxError> {
        let next = match state {
            State::Data => match ch {
                '<' => State::TagOpen(self.position),
                c => {
                    self.emit_char(c);
                    State::Data
                }
            },

            State::TagOpen(start) => match ch {
                '!' => State::MarkupDeclarationOpen {
                    start,
                    seen: String::new(),
                },
                '/' => State::EndTagOpen(start),
                c if c.is_ascii_alphabetic() => {
                    State::TagName(TagBuilder::new(TagKind::Start, start, c))
                }
                c => {
                    self.report(format!("Tag name must begin with a letter, found {c:?}"))?;
                    State::TagOpen(start)
                }
            },

            State::EndTagOpen(start) => match ch {
                c if c.is_ascii_alphabetic() => {
                    State::TagName(TagBuilder::new(TagKind::End, start, c))
                }
                c => {
                    self.report(format!(
                        "End tag name must begin with a letter, found {c:?}"
                    ))?;
                    State::EndTagOpen(start)
                }
            },

            State::TagName(mut tag) => match ch {
                c if c.is_ascii_whitespace() => State::BeforeAttributeName(tag),
                '/' => State::SelfClosingStartTag(tag),
                '>' => {
                    self.emit_tag(tag, false);
                    State::Data
                }
                '<' | '"' | '\'' | '=' => {
                    self.report(format!("Unexpected character {ch:?} in tag name"))?;
                    State::TagName(tag)
                }
                c => {
                    tag.name.push(c.to_ascii_lowercase());
                    State::TagName(tag)
                }
            },

            State::BeforeAttributeName(tag) => match ch {
                c if c.is_ascii_whitespace() => State::BeforeAttributeName(tag),
                '/' => State::SelfClosingStartTag(tag),
                '>' => {
                    self.emit_tag(tag, false);
                    State::Data
                }
                '<' | '"' | '\'' | '=' => {
                    self.report(format!(
                        "Unexpected character {ch:?} before attribute name"
                    ))?;
                    State::BeforeAttributeName(tag)
                }
                c => return self.step(State::AttributeName(tag), c),
            },

            State::AttributeName(mut tag) => match ch {
                c if c.is_ascii_whitespace() => State::AfterAttributeName(tag),
                '=' => State::BeforeAttributeValue(tag),
                '/' | '>' => {
                    tag.commit_attribute();
                    return self.step(State::BeforeAttributeName(tag), ch);
                }
                '<' | '"' | '\'' => {
                    self.report(format!("Unexpected character {ch:?} in attribute name"))?;
                    State::AttributeName(tag)
                }
                c => {
                    tag.attr_name.push(c.to_ascii_lowercase());
                    State::AttributeName(tag)
                }
            },

            State::AfterAttributeName(mut tag) => match ch {
                c if c.is_ascii_whitespace() => State::AfterAttributeName(tag),
                '=' => State::BeforeAttributeValue(tag),
                '<' | '"' | '\'' => {
                    self.report(format!(
                        "Unexpected character {ch:?} after attribute name"
                    ))?;
                    State::AfterAttributeName(tag)
                }
                c => {
                    tag.commit_attribute();
                    return self.step(State::BeforeAttributeName(tag), c);
                }
            },

            State::BeforeAttributeValue(tag) => match ch {
                c if c.is_ascii_whitespace() => State::BeforeAttributeValue(tag),
                '"' => State::AttributeValueDoubleQuoted(tag),
                '\'' => State::AttributeValueSingleQuoted(tag),
                '>' => {
                    self.report("Missing attribute value".into())?;
                    State::BeforeAttributeValue(tag)
                }
                c => return self.step(State::AttributeValueUnquoted(tag), c),
            },

            State::AttributeValueDoubleQuoted(mut tag) => match ch {
                '"' => {
                    tag.commit_attribute();
                    State::BeforeAttributeName(tag)
                }
                c => {
                    tag.attr_value.push(c);
                    State::AttributeValueDoubleQuoted(tag)
                }
            },

            State::AttributeValueSingleQuoted(mut tag) => match ch {
                '\'' => {
                    tag.commit_attribute();
                    State::BeforeAttributeName(tag)
                }
                c => {
                    tag.attr_value.push(c);
                    State::AttributeValueSingleQuoted(tag)
                }
            },

            State::AttributeValueUnquoted(mut tag) => match ch {
                c if c.is_ascii_whitespace() => {
                    tag.commit_attribute();
                    State::BeforeAttributeName(tag)
                }
                '>' => {
                    tag.commit_attribute();
                    return self.step(State::BeforeAttributeName(tag), ch);
                }
                '"' | '\'' | '<' | '=' | '`' => {
                    self.report(format!(
                        "Unexpected character {ch:?} in unquoted attribute value"
                    ))?;
                    State::AttributeValueUnquoted(tag)
                }
                c => {
                    tag.attr_value.push(c);
                    State::AttributeValueUnquoted(tag)
                }
            },

            State::SelfClosingStartTag(tag) => match ch {
                '>' => {
                    self.emit_tag(tag, true);
                    State::Data
                }
                c => {
                    self.report(format!("Unexpected character {c:?} after '/' in tag"))?;
                    State::BeforeAttributeName(tag)
                }
            },

            State::MarkupDeclarationOpen { start, mut seen } => {
                if ch == '>' {
                    self.report("Incorrectly opened markup declaration".into())?;
                    return Ok(State::Data);
                }
                seen.push(ch);
                if seen == "--" {
                    State::Comment {
                        start,
                        buffer: String::new(),
                    }
                } else if seen.eq_ignore_ascii_case("doctype") {
                    State::Doctype {
                        start,
                        buffer: String::new(),
                    }
                } else if "--".starts_with(seen.as_str())
                    || "doctype".starts_with(seen.to_ascii_lowercase().as_str())
                {
                    State::MarkupDeclarationOpen { start, seen }
                } else {
                    seen.pop();
                    self.report(format!("Expected '--' or 'DOCTYPE' after '<!', found {ch:?}"))?;
                    State::MarkupDeclarationOpen { start, seen }
                }
            }

            State::Comment { start, mut buffer } => {
                buffer.push(ch);
                if buffer.ends_with("-->") {
                    buffer.truncate(buffer.len() - 3);
                    self.emit_markup(TokenKind::Comment(buffer), start);
                    State::Data
                } else {
                    State::Comment { start, buffer }
                }
            }

            State::Doctype { start, mut buffer } => match ch {
                '>' => {
                    self.emit_markup(parse_doctype(&buffer), start);
                    State::Data
                }
                c => {
                    buffer.push(c);
                    State::Doctype { start, buffer }
                }
            },
        };

        Ok(next)
    }

    /// Handle end of input. Any unfinished token is discarded.
    fn finish(&mut self, state: State) -> Result<(), SyntaxError> {
        match state {
            State::Data => Ok(()),
            _ => self.report("Unexpected end of input".into()),
        }
    }

    // --- Errors ---

    fn report(&mut self, message: String) -> Result<(), SyntaxError> {
        let error = SyntaxError {
            message,
            line: self.position.line,
            column: self.position.column,
            index: self.position.index,
        };

        match self.mode {
            ErrorMode::Strict => Err(error),
            ErrorMode::Collect => {
                tracing::trace!(%error, "collected syntax error");
                self.errors.push(error);
                Ok(())
            }
            ErrorMode::Ignore => {
                tracing::trace!(%error, "dropped syntax error");
                Ok(())
            }
        }
    }

    // --- Emitters ---

    fn emit_char(&mut self, ch: char) {
        let pos = self.position;
        let span = Span::new(pos.index, pos.index + ch.len_utf8(), pos.line, pos.column);
        self.tokens.push(Token::new(TokenKind::Character(ch), span));
    }

    fn emit_tag(&mut self, tag: TagBuilder, self_closing: bool) {
        let start = tag.start;
        self.emit_markup(tag.into_kind(self_closing), start);
    }

    /// Emit a token spanning from `start` through the current `>`.
    fn emit_markup(&mut self, kind: TokenKind, start: Position) {
        let span = Span::new(start.index, self.position.index + 1, start.line, start.column);
        self.tokens.push(Token::new(kind, span));
    }
}

/// Split the text between `<!DOCTYPE` and `>` into name and identifiers.
fn parse_doctype(buffer: &str) -> TokenKind {
    let rest = buffer.trim_start();
    let name_end = rest.find(|c: char| c.is_ascii_whitespace()).unwrap_or(rest.len());
    let name = rest[..name_end].to_ascii_lowercase();
    let rest = rest[name_end..].trim_start();

    let keyword_end = rest.find(|c: char| c.is_ascii_whitespace() || c == '"' || c == '\'');
    let (keyword, rest) = rest.split_at(keyword_end.unwrap_or(rest.len()));

    let (public_id, system_id) = if keyword.eq_ignore_ascii_case("public") {
        match take_quoted(rest) {
            Some((public, rest)) => (Some(public), take_quoted(rest).map(|(s, _)| s)),
            None => (None, None),
        }
    } else if keyword.eq_ignore_ascii_case("system") {
        (None, take_quoted(rest).map(|(s, _)| s))
    } else {
        (None, None)
    };

    TokenKind::Doctype {
        name,
        public_id,
        system_id,
    }
}

/// Take a leading single- or double-quoted string, returning it and the remainder.
fn take_quoted(s: &str) -> Option<(String, &str)> {
    let s = s.trim_start();
    let quote = s.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let body = &s[1..];
    let end = body.find(quote)?;
    Some((body[..end].to_string(), &body[end + 1..]))
}
