//! JSX lowering
//!
//! The embedded engine parses plain ECMAScript only, so generated components are
//! rewritten before evaluation: every JSX element or fragment becomes a
//! `React.createElement(type, props, ...children)` call. Everything else is copied
//! through untouched. Strings, template literals, comments and regex literals are
//! skipped as opaque tokens so a `<` inside them is never mistaken for markup.
//!
//! A `<` starts an element only in expression position (after `(`, `,`, `=`, `?`,
//! `:`, `&&`, `=>`, `return`, ...) and when followed by a tag name or `>`.
//!
//! Elements, expression containers and `(`/`[`/`{` share one nesting budget,
//! which also bounds how deep the engine's parser has to recurse on the output.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[error("{message} (line {line}, column {column})")]
pub struct JsxError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// Combined depth of elements, containers and brackets accepted by `lower_jsx`.
pub const MAX_NESTING: usize = 96;

/// Rewrites JSX in `source` into `React.createElement` calls.
pub fn lower_jsx(source: &str) -> Result<String, JsxError> {
    let mut lowerer = Lowerer::new(source);
    let lowered = lowerer.js(Stop::Eof)?;
    Ok(lowered.code)
}

#[derive(Clone, Copy, PartialEq)]
enum Stop {
    Eof,
    /// Stop at the `}` closing an expression container; the brace is consumed.
    Brace,
}

/// The last significant token seen in JS mode.
#[derive(Clone, PartialEq)]
enum Prev {
    Start,
    Punct(char),
    Word(String),
    Value,
}

struct Lowered {
    code: String,
    /// False when the span held only whitespace and comments.
    has_code: bool,
}

/// Keywords after which an expression (and so JSX or a regex) may begin.
const EXPRESSION_KEYWORDS: &[&str] = &[
    "return",
    "yield",
    "await",
    "typeof",
    "case",
    "default",
    "else",
    "do",
    "in",
    "of",
    "new",
    "void",
    "delete",
    "throw",
    "instanceof",
];

struct Lowerer {
    chars: Vec<char>,
    pos: usize,
    prev: Prev,
    nesting: usize,
}

impl Lowerer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            prev: Prev::Start,
            nesting: 0,
        }
    }

    // ── cursor helpers ──────────────────────────────────────────────────────

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn starts_with(&self, pattern: &str) -> bool {
        pattern
            .chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn error(&self, message: impl Into<String>) -> JsxError {
        let mut line = 1;
        let mut column = 1;
        for &c in self.chars.iter().take(self.pos) {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        JsxError {
            message: message.into(),
            line,
            column,
        }
    }

    fn enter(&mut self) -> Result<(), JsxError> {
        self.nesting += 1;
        if self.nesting > MAX_NESTING {
            return Err(self.error(format!("Nesting deeper than {MAX_NESTING} levels")));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.nesting = self.nesting.saturating_sub(1);
    }

    /// Runs `f` one nesting level down.
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, JsxError>,
    ) -> Result<T, JsxError> {
        self.enter()?;
        let result = f(self);
        self.leave();
        result
    }

    fn expression_allowed(&self) -> bool {
        match &self.prev {
            Prev::Start => true,
            Prev::Punct(c) => "([{,;=:?!&|+-*%<>~^".contains(*c),
            Prev::Word(word) => EXPRESSION_KEYWORDS.contains(&word.as_str()),
            Prev::Value => false,
        }
    }

    // ── JS mode ─────────────────────────────────────────────────────────────

    fn js(&mut self, stop: Stop) -> Result<Lowered, JsxError> {
        self.nested(|this| this.js_span(stop))
    }

    fn js_span(&mut self, stop: Stop) -> Result<Lowered, JsxError> {
        let mut out = String::new();
        let mut has_code = false;
        let mut depth = 0usize;
        self.prev = Prev::Start;

        while let Some(c) = self.peek() {
            match c {
                '/' if self.peek_at(1) == Some('/') => self.copy_line_comment(&mut out),
                '/' if self.peek_at(1) == Some('*') => self.copy_block_comment(&mut out)?,
                '\'' | '"' => {
                    self.copy_string(&mut out, c)?;
                    self.prev = Prev::Value;
                    has_code = true;
                }
                '`' => {
                    self.copy_template(&mut out)?;
                    self.prev = Prev::Value;
                    has_code = true;
                }
                '/' if self.expression_allowed() => {
                    self.copy_regex(&mut out)?;
                    self.prev = Prev::Value;
                    has_code = true;
                }
                '{' => {
                    self.enter()?;
                    depth += 1;
                    out.push(c);
                    self.pos += 1;
                    self.prev = Prev::Punct(c);
                    has_code = true;
                }
                '}' => {
                    if depth == 0 && stop == Stop::Brace {
                        self.pos += 1;
                        return Ok(Lowered { code: out, has_code });
                    }
                    depth = depth.saturating_sub(1);
                    self.leave();
                    out.push(c);
                    self.pos += 1;
                    self.prev = Prev::Punct(c);
                    has_code = true;
                }
                '<' if self.expression_allowed() && self.at_element_start() => {
                    let element = self.element()?;
                    out.push_str(&element);
                    self.prev = Prev::Value;
                    has_code = true;
                }
                c if is_ident_char(c) => {
                    let word = self.read_while(is_ident_char);
                    out.push_str(&word);
                    self.prev = Prev::Word(word);
                    has_code = true;
                }
                c if c.is_whitespace() => {
                    out.push(c);
                    self.pos += 1;
                }
                '(' | '[' => {
                    self.enter()?;
                    out.push(c);
                    self.pos += 1;
                    self.prev = Prev::Punct(c);
                    has_code = true;
                }
                // `)` and `]` close a value; everything else is an operator.
                ')' | ']' => {
                    self.leave();
                    out.push(c);
                    self.pos += 1;
                    self.prev = Prev::Value;
                    has_code = true;
                }
                _ => {
                    out.push(c);
                    self.pos += 1;
                    self.prev = Prev::Punct(c);
                    has_code = true;
                }
            }
        }

        match stop {
            Stop::Eof => Ok(Lowered { code: out, has_code }),
            Stop::Brace => Err(self.error("Unterminated JSX expression container")),
        }
    }

    fn read_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.peek().is_some_and(&predicate) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn copy_line_comment(&mut self, out: &mut String) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            out.push(c);
            self.pos += 1;
        }
    }

    fn copy_block_comment(&mut self, out: &mut String) -> Result<(), JsxError> {
        out.push_str("/*");
        self.pos += 2;
        loop {
            if self.starts_with("*/") {
                out.push_str("*/");
                self.pos += 2;
                return Ok(());
            }
            match self.peek() {
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
                None => return Err(self.error("Unterminated block comment")),
            }
        }
    }

    fn copy_string(&mut self, out: &mut String, quote: char) -> Result<(), JsxError> {
        out.push(quote);
        self.pos += 1;
        while let Some(c) = self.peek() {
            out.push(c);
            self.pos += 1;
            if c == '\\' {
                if let Some(escaped) = self.peek() {
                    out.push(escaped);
                    self.pos += 1;
                }
            } else if c == quote {
                return Ok(());
            } else if c == '\n' {
                break;
            }
        }
        Err(self.error("Unterminated string literal"))
    }

    fn copy_template(&mut self, out: &mut String) -> Result<(), JsxError> {
        out.push('`');
        self.pos += 1;
        while let Some(c) = self.peek() {
            match c {
                '\\' => {
                    out.push(c);
                    self.pos += 1;
                    if let Some(escaped) = self.peek() {
                        out.push(escaped);
                        self.pos += 1;
                    }
                }
                '`' => {
                    out.push(c);
                    self.pos += 1;
                    return Ok(());
                }
                '$' if self.peek_at(1) == Some('{') => {
                    out.push_str("${");
                    self.pos += 2;
                    let inner = self.js(Stop::Brace)?;
                    out.push_str(&inner.code);
                    out.push('}');
                }
                _ => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
        Err(self.error("Unterminated template literal"))
    }

    fn copy_regex(&mut self, out: &mut String) -> Result<(), JsxError> {
        out.push('/');
        self.pos += 1;
        let mut in_class = false;
        while let Some(c) = self.peek() {
            out.push(c);
            self.pos += 1;
            match c {
                '\\' => {
                    if let Some(escaped) = self.peek() {
                        out.push(escaped);
                        self.pos += 1;
                    }
                }
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => {
                    let flags = self.read_while(|c| c.is_ascii_alphabetic());
                    out.push_str(&flags);
                    return Ok(());
                }
                '\n' => break,
                _ => {}
            }
        }
        Err(self.error("Unterminated regular expression"))
    }

    // ── JSX mode ────────────────────────────────────────────────────────────

    fn at_element_start(&self) -> bool {
        matches!(self.peek_at(1), Some(c) if c == '>' || c.is_alphabetic() || c == '_' || c == '$')
    }

    fn skip_tag_whitespace(&mut self) -> Result<(), JsxError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => self.pos += 1,
                Some('/') if self.peek_at(1) == Some('*') => {
                    let mut discard = String::new();
                    self.copy_block_comment(&mut discard)?;
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    let mut discard = String::new();
                    self.copy_line_comment(&mut discard);
                }
                _ => return Ok(()),
            }
        }
    }

    fn expect(&mut self, c: char, context: &str) -> Result<(), JsxError> {
        if self.peek() == Some(c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("Expected '{c}' {context}")))
        }
    }

    /// Parses one element or fragment starting at `<` and returns the lowered call.
    fn element(&mut self) -> Result<String, JsxError> {
        self.nested(Self::element_at)
    }

    fn element_at(&mut self) -> Result<String, JsxError> {
        self.pos += 1;
        self.skip_tag_whitespace()?;

        if self.peek() == Some('>') {
            self.pos += 1;
            let children = self.children()?;
            self.closing_tag("")?;
            return Ok(create_element("React.Fragment", "null", &children));
        }

        let name = self.read_while(is_tag_name_char);
        if name.is_empty() {
            return Err(self.error("Expected a tag name after '<'"));
        }

        let mut props: Vec<String> = Vec::new();
        let self_closing = loop {
            self.skip_tag_whitespace()?;
            match self.peek() {
                Some('/') => {
                    self.pos += 1;
                    self.expect('>', "to close a self-closing tag")?;
                    break true;
                }
                Some('>') => {
                    self.pos += 1;
                    break false;
                }
                Some('{') => {
                    self.pos += 1;
                    self.skip_tag_whitespace()?;
                    if !self.starts_with("...") {
                        return Err(self.error("Expected '...' in JSX spread attribute"));
                    }
                    self.pos += 3;
                    let spread = self.js(Stop::Brace)?;
                    props.push(format!("...({})", spread.code.trim()));
                }
                Some(c) if is_ident_char(c) => {
                    let attr = self.read_while(is_attr_name_char);
                    self.skip_tag_whitespace()?;
                    let value = if self.peek() == Some('=') {
                        self.pos += 1;
                        self.skip_tag_whitespace()?;
                        self.attribute_value()?
                    } else {
                        "true".to_string()
                    };
                    props.push(format!("{}: {}", js_string_literal(&attr), value));
                }
                Some(c) => {
                    return Err(self.error(format!("Unexpected '{c}' in <{name}> tag")));
                }
                None => return Err(self.error(format!("Unterminated <{name}> tag"))),
            }
        };

        let children = if self_closing {
            Vec::new()
        } else {
            let children = self.children()?;
            self.closing_tag(&name)?;
            children
        };

        let tag = if is_intrinsic(&name) {
            js_string_literal(&name)
        } else {
            name
        };
        let props = if props.is_empty() {
            "null".to_string()
        } else {
            format!("{{{}}}", props.join(", "))
        };

        Ok(create_element(&tag, &props, &children))
    }

    fn attribute_value(&mut self) -> Result<String, JsxError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|c| c != quote) {
                    self.pos += 1;
                }
                if self.peek().is_none() {
                    return Err(self.error("Unterminated attribute string"));
                }
                let raw: String = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                Ok(js_string_literal(&decode_entities(&raw)))
            }
            Some('{') => {
                self.pos += 1;
                let expr = self.js(Stop::Brace)?;
                if !expr.has_code {
                    return Err(self.error("JSX attribute value must not be an empty expression"));
                }
                Ok(format!("({})", expr.code.trim()))
            }
            Some('<') => self.element(),
            _ => Err(self.error("Expected an attribute value")),
        }
    }

    /// Collects children until the matching `</`.
    fn children(&mut self) -> Result<Vec<String>, JsxError> {
        let mut children = Vec::new();
        loop {
            if self.starts_with("</") {
                return Ok(children);
            }
            match self.peek() {
                None => return Err(self.error("Unterminated JSX element")),
                Some('<') => children.push(self.element()?),
                Some('{') => {
                    self.pos += 1;
                    let expr = self.js(Stop::Brace)?;
                    if expr.has_code {
                        children.push(format!("({})", expr.code.trim()));
                    }
                }
                Some(_) => {
                    let raw = self.read_while(|c| c != '<' && c != '{');
                    if let Some(text) = clean_jsx_text(&raw) {
                        children.push(js_string_literal(&decode_entities(&text)));
                    }
                }
            }
        }
    }

    fn closing_tag(&mut self, expected: &str) -> Result<(), JsxError> {
        // caller guarantees we are at "</"
        self.pos += 2;
        self.skip_tag_whitespace()?;
        let name = self.read_while(is_tag_name_char);
        self.skip_tag_whitespace()?;
        if name != expected {
            let shown = |n: &str| if n.is_empty() { "<>".to_string() } else { format!("<{n}>") };
            return Err(self.error(format!(
                "Expected closing tag for {}, found </{}>",
                shown(expected),
                name
            )));
        }
        self.expect('>', "to end a closing tag")
    }
}

fn create_element(tag: &str, props: &str, children: &[String]) -> String {
    let mut call = format!("React.createElement({tag}, {props}");
    for child in children {
        call.push_str(", ");
        call.push_str(child);
    }
    call.push(')');
    call
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn is_tag_name_char(c: char) -> bool {
    is_ident_char(c) || c == '.' || c == '-' || c == ':'
}

fn is_attr_name_char(c: char) -> bool {
    is_ident_char(c) || c == '-' || c == ':'
}

/// Lowercase names without a member access are host elements (`"div"`);
/// everything else refers to a component binding.
fn is_intrinsic(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_lowercase()) && !name.contains('.')
}

/// JSX text whitespace rules: lines are trimmed, blank lines dropped, and the
/// remaining lines joined by single spaces.
fn clean_jsx_text(raw: &str) -> Option<String> {
    let lines: Vec<&str> = raw.split('\n').collect();
    let last_non_empty = lines.iter().rposition(|line| !line.trim().is_empty())?;

    let mut text = String::new();
    for (i, line) in lines.iter().enumerate() {
        let line = line.replace(|c| c == '\t' || c == '\r', " ");
        let mut trimmed: &str = &line;
        if i != 0 {
            trimmed = trimmed.trim_start_matches(' ');
        }
        if i != lines.len() - 1 {
            trimmed = trimmed.trim_end_matches(' ');
        }
        if !trimmed.is_empty() {
            text.push_str(trimmed);
            if i != last_non_empty {
                text.push(' ');
            }
        }
    }

    (!text.is_empty()).then_some(text)
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').filter(|&end| end <= 10).and_then(|end| {
            let entity = &rest[1..end];
            let c = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                "copy" => Some('©'),
                "mdash" => Some('—'),
                "ndash" => Some('–'),
                "hellip" => Some('…'),
                "middot" => Some('·'),
                "bull" => Some('•'),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            c.map(|c| (c, end))
        });
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Double-quoted JavaScript string literal for `text`.
pub fn js_string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
