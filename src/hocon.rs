//! Reader for `.conf` fragments written in HOCON.
//!
//! Covers the syntax configuration files actually use:
//! - `key = value`, `key : value` and `key { ... }` fields, separated by
//!   newlines or commas
//! - dotted keys (`a.b.c = x`) expanding to nested objects; quoted keys are
//!   taken literally
//! - objects, arrays, quoted and `"""` triple-quoted strings, unquoted
//!   strings, numbers, booleans and `null`
//! - value concatenation (`a = 10 seconds`, `b = ${x}"/data"`)
//! - `+=` appends to an array
//! - `#` and `//` comments
//! - `${path}` and `${?path}` substitutions
//!
//! `include` is rejected. Substitutions are left as `${...}` markers for the
//! substitution pass; every literal is escaped so the pass only sees real
//! substitutions. A later field with the same key replaces the earlier one,
//! unless both values are objects, in which case they are merged.

use crate::merge::with_fallback;
use crate::substitute::escape_literal;
use serde_json::{Map, Number, Value};

/// Parse a HOCON document into an object.
pub fn parse(source: &str) -> Result<Value, String> {
    let mut parser = Parser {
        chars: source.chars().collect(),
        pos: 0,
    };
    parser.parse_root()
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

/// One element of a value concatenation.
enum Part {
    Unquoted(String),
    Quoted(String),
    /// Rendered `${path}` marker
    Substitution(String),
    Object(Map<String, Value>),
    Array(Vec<Value>),
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn starts_with(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(offset, c)| self.peek_at(offset) == Some(c))
    }

    fn error(&self, message: impl std::fmt::Display) -> String {
        let end = self.pos.min(self.chars.len());
        let line = self.chars[..end].iter().filter(|&&c| c == '\n').count() + 1;
        format!("line {line}: {message}")
    }

    fn at_comment(&self) -> bool {
        self.peek() == Some('#') || self.starts_with("//")
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.pos += 1;
        }
    }

    fn skip_inline_space(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' || !(c.is_whitespace() || c == '\u{feff}') {
                break;
            }
            self.pos += 1;
        }
    }

    /// Skip whitespace, newlines, commas and comments between fields or elements.
    fn skip_separators(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() || c == ',' || c == '\u{feff}' => self.pos += 1,
                Some(_) if self.at_comment() => self.skip_comment(),
                _ => break,
            }
        }
    }

    fn parse_root(&mut self) -> Result<Value, String> {
        self.skip_separators();
        let map = match self.peek() {
            Some('{') => {
                self.pos += 1;
                let map = self.parse_fields(Some('}'))?;
                self.skip_separators();
                if self.peek().is_some() {
                    return Err(self.error("unexpected content after the root object"));
                }
                map
            }
            Some('[') => return Err(self.error("the top level must be an object, found an array")),
            _ => self.parse_fields(None)?,
        };
        Ok(Value::Object(map))
    }

    /// Fields up to `close`, or to the end of input for the braceless root.
    fn parse_fields(&mut self, close: Option<char>) -> Result<Map<String, Value>, String> {
        let mut map = Map::new();
        loop {
            self.skip_separators();
            match self.peek() {
                None if close.is_none() => return Ok(map),
                None => return Err(self.error("unterminated object, expected `}`")),
                Some(c) if Some(c) == close => {
                    self.pos += 1;
                    return Ok(map);
                }
                Some(c @ ('}' | ']')) => return Err(self.error(format!("unexpected `{c}`"))),
                _ => {}
            }

            if self.starts_with("include") && self.peek_at(7).is_some_and(char::is_whitespace) {
                return Err(self.error("`include` is not supported"));
            }

            let path = self.parse_key()?;
            self.skip_inline_space();
            let append = match self.peek() {
                Some('{') => false,
                Some(':' | '=') => {
                    self.pos += 1;
                    false
                }
                Some('+') if self.peek_at(1) == Some('=') => {
                    self.pos += 2;
                    true
                }
                _ => {
                    return Err(self.error(format!(
                        "expected `=`, `:` or `{{` after key `{}`",
                        path.join(".")
                    )));
                }
            };
            self.skip_inline_space();
            let value = self.parse_value()?;
            insert_path(&mut map, &path, value, append);

            self.skip_inline_space();
            if self.at_comment() {
                self.skip_comment();
            }
            match self.peek() {
                None | Some('\n' | ',') => {}
                Some(c) if Some(c) == close => {}
                Some(c) => return Err(self.error(format!("unexpected `{c}` after value"))),
            }
        }
    }

    fn parse_key(&mut self) -> Result<Vec<String>, String> {
        let start = self.pos;
        let mut segments = Vec::new();
        let mut current = String::new();
        loop {
            match self.peek() {
                Some('"') => current.push_str(&self.parse_quoted()?),
                Some('.') => {
                    self.pos += 1;
                    segments.push(std::mem::take(&mut current));
                }
                Some(c) if is_key_char(c) && !self.at_comment() => {
                    current.push(c);
                    self.pos += 1;
                }
                _ => break,
            }
        }
        segments.push(current);

        if self.pos == start {
            return Err(self.error("expected a key"));
        }
        if segments.iter().any(String::is_empty) {
            return Err(self.error("empty key segment"));
        }
        Ok(segments)
    }

    /// A value, possibly concatenated from several parts on one line.
    fn parse_value(&mut self) -> Result<Value, String> {
        let mut parts = Vec::new();
        let mut space = String::new();
        while let Some(c) = self.peek() {
            if matches!(c, '\n' | ',' | '}' | ']') || self.at_comment() {
                break;
            }
            if c.is_whitespace() {
                space.push(c);
                self.pos += 1;
                continue;
            }
            let part = match c {
                '{' => {
                    self.pos += 1;
                    Part::Object(self.parse_fields(Some('}'))?)
                }
                '[' => {
                    self.pos += 1;
                    Part::Array(self.parse_array()?)
                }
                '"' => Part::Quoted(self.parse_quoted()?),
                '$' if self.peek_at(1) == Some('{') => {
                    Part::Substitution(self.parse_substitution()?)
                }
                _ => Part::Unquoted(self.parse_unquoted()),
            };
            parts.push((std::mem::take(&mut space), part));
        }
        concatenate(parts).map_err(|message| self.error(message))
    }

    fn parse_array(&mut self) -> Result<Vec<Value>, String> {
        let mut items = Vec::new();
        loop {
            self.skip_separators();
            match self.peek() {
                None => return Err(self.error("unterminated array, expected `]`")),
                Some(']') => {
                    self.pos += 1;
                    return Ok(items);
                }
                _ => items.push(self.parse_value()?),
            }
        }
    }

    fn parse_unquoted(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            let stop = c.is_whitespace()
                || matches!(c, '"' | '{' | '}' | '[' | ']' | ',' | '#')
                || self.starts_with("//")
                || self.starts_with("${");
            if stop && !text.is_empty() {
                break;
            }
            text.push(c);
            self.pos += 1;
        }
        text
    }

    fn parse_quoted(&mut self) -> Result<String, String> {
        if self.starts_with("\"\"\"") {
            return self.parse_triple_quoted();
        }
        self.pos += 1;
        let mut out = String::new();
        loop {
            let Some(c) = self.peek() else {
                return Err(self.error("unterminated string"));
            };
            self.pos += 1;
            match c {
                '"' => return Ok(out),
                '\n' => return Err(self.error("unterminated string")),
                '\\' => {
                    let Some(escaped) = self.peek() else {
                        return Err(self.error("unterminated string"));
                    };
                    self.pos += 1;
                    let decoded = match escaped {
                        '"' => '"',
                        '\\' => '\\',
                        '/' => '/',
                        'b' => '\u{8}',
                        'f' => '\u{c}',
                        'n' => '\n',
                        'r' => '\r',
                        't' => '\t',
                        'u' => self.parse_unicode_escape()?,
                        other => return Err(self.error(format!("invalid escape `\\{other}`"))),
                    };
                    out.push(decoded);
                }
                other => out.push(other),
            }
        }
    }

    fn parse_unicode_escape(&mut self) -> Result<char, String> {
        let hex: String = self
            .chars
            .get(self.pos..self.pos + 4)
            .map(|digits| digits.iter().collect())
            .unwrap_or_default();
        let decoded = u32::from_str_radix(&hex, 16)
            .ok()
            .filter(|_| hex.len() == 4)
            .and_then(char::from_u32)
            .ok_or_else(|| self.error(format!("invalid unicode escape `\\u{hex}`")))?;
        self.pos += 4;
        Ok(decoded)
    }

    fn parse_triple_quoted(&mut self) -> Result<String, String> {
        self.pos += 3;
        let start = self.pos;
        while self.pos < self.chars.len() {
            if self.starts_with("\"\"\"") {
                // Quotes right before the closing delimiter belong to the string
                while self.peek_at(3) == Some('"') {
                    self.pos += 1;
                }
                let text = self.chars[start..self.pos].iter().collect();
                self.pos += 3;
                return Ok(text);
            }
            self.pos += 1;
        }
        Err(self.error("unterminated triple-quoted string"))
    }

    fn parse_substitution(&mut self) -> Result<String, String> {
        self.pos += 2;
        let optional = self.peek() == Some('?');
        if optional {
            self.pos += 1;
        }
        let start = self.pos;
        loop {
            match self.peek() {
                Some('}') => break,
                None | Some('\n') => return Err(self.error("unterminated substitution")),
                Some(_) => self.pos += 1,
            }
        }
        let path: String = self.chars[start..self.pos].iter().collect();
        self.pos += 1;

        let path = path.trim();
        if path.is_empty() {
            return Err(self.error("empty substitution"));
        }
        let marker = if optional { "?" } else { "" };
        Ok(format!("${{{marker}{path}}}"))
    }
}

fn is_key_char(c: char) -> bool {
    !c.is_whitespace() && !"$\"{}[]:=,+#`^?!@*&\\.".contains(c)
}

/// Join the parts of one value.
///
/// A single part keeps its type. Objects concatenate by merging, arrays by
/// appending, anything else into a string with the whitespace between parts.
fn concatenate(parts: Vec<(String, Part)>) -> Result<Value, String> {
    let mut parts = parts.into_iter();
    let Some((_, first)) = parts.next() else {
        return Err("missing value".to_string());
    };
    let rest: Vec<(String, Part)> = parts.collect();
    if rest.is_empty() {
        return Ok(single(first));
    }

    match first {
        Part::Object(map) => {
            let mut merged = Value::Object(map);
            for (_, part) in rest {
                let Part::Object(next) = part else {
                    return Err("cannot concatenate an object with a non-object".to_string());
                };
                merged = with_fallback(Value::Object(next), merged);
            }
            Ok(merged)
        }
        Part::Array(mut items) => {
            for (_, part) in rest {
                let Part::Array(next) = part else {
                    return Err("cannot concatenate an array with a non-array".to_string());
                };
                items.extend(next);
            }
            Ok(Value::Array(items))
        }
        first => {
            let mut out = string_piece(first)?;
            for (space, part) in rest {
                out.push_str(&space);
                out.push_str(&string_piece(part)?);
            }
            Ok(Value::String(out))
        }
    }
}

fn single(part: Part) -> Value {
    match part {
        Part::Unquoted(token) => match token.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "null" => Value::Null,
            _ => parse_number(&token)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(escape_literal(&token))),
        },
        Part::Quoted(text) => Value::String(escape_literal(&text)),
        Part::Substitution(marker) => Value::String(marker),
        Part::Object(map) => Value::Object(map),
        Part::Array(items) => Value::Array(items),
    }
}

fn string_piece(part: Part) -> Result<String, String> {
    match part {
        Part::Unquoted(text) | Part::Quoted(text) => Ok(escape_literal(&text)),
        Part::Substitution(marker) => Ok(marker),
        Part::Object(_) | Part::Array(_) => {
            Err("cannot concatenate an object or array with a string".to_string())
        }
    }
}

fn parse_number(token: &str) -> Option<Number> {
    let first = token.chars().next()?;
    if !(first.is_ascii_digit() || first == '-') {
        return None;
    }
    if let Ok(n) = token.parse::<i64>() {
        return Some(n.into());
    }
    token.parse::<f64>().ok().and_then(Number::from_f64)
}

fn insert_path(map: &mut Map<String, Value>, path: &[String], value: Value, append: bool) {
    let [key, rest @ ..] = path else {
        return;
    };

    if rest.is_empty() {
        let merged = match (map.remove(key), value) {
            (Some(Value::Array(mut items)), value) if append => {
                items.push(value);
                Value::Array(items)
            }
            (_, value) if append => Value::Array(vec![value]),
            (Some(existing @ Value::Object(_)), value @ Value::Object(_)) => {
                with_fallback(value, existing)
            }
            (_, value) => value,
        };
        map.insert(key.clone(), merged);
        return;
    }

    let child = map
        .entry(key.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    if !child.is_object() {
        *child = Value::Object(Map::new());
    }
    if let Value::Object(child_map) = child {
        insert_path(child_map, rest, value, append);
    }
}
