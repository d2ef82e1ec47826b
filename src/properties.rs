//! Reader for `.properties` fragments.
//!
//! Keys are split on `.` into nested objects, so `db.host = x` and a
//! hierarchical `db: { host: x }` fragment produce the same tree. All values
//! are strings.

use serde_json::{Map, Value};

/// Parse `.properties` source into an object tree.
pub fn parse(source: &str) -> Result<Value, String> {
    let mut root = Map::new();

    for (line_no, line) in logical_lines(source) {
        let (raw_key, raw_value) = split_pair(&line);
        let key = unescape(raw_key).map_err(|e| format!("line {line_no}: {e}"))?;
        let value = unescape(raw_value).map_err(|e| format!("line {line_no}: {e}"))?;
        if key.is_empty() {
            return Err(format!("line {line_no}: empty key"));
        }
        insert_path(&mut root, &key, value).map_err(|e| format!("line {line_no}: {e}"))?;
    }

    Ok(Value::Object(root))
}

/// Join continuation lines and drop blanks and comments.
///
/// Yields the 1-based number of the first physical line of each entry.
fn logical_lines(source: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, physical) in source.lines().enumerate() {
        let trimmed = physical.trim_start();

        let (start, mut text) = match pending.take() {
            Some((start, text)) => (start, text + trimmed),
            None => {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                (idx + 1, trimmed.to_string())
            }
        };

        if ends_with_continuation(&text) {
            text.pop();
            pending = Some((start, text));
        } else {
            lines.push((start, text));
        }
    }

    if let Some(entry) = pending {
        lines.push(entry);
    }
    lines
}

/// An odd number of trailing backslashes continues the line.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// Split a logical line at the first unescaped `=`, `:` or whitespace.
fn split_pair(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();

    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' | '\x0c' => {
                key_end = idx;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start_matches([' ', '\t', '\x0c']);
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start_matches([' ', '\t', '\x0c']);
    }
    (key, rest)
}

fn unescape(raw: &str) -> Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .ok_or_else(|| format!("malformed \\u escape `\\u{hex}`"))?;
                let ch = char::from_u32(code)
                    .ok_or_else(|| format!("\\u{hex} is not a valid character"))?;
                out.push(ch);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

/// Insert `value` under a dotted key, creating intermediate objects.
///
/// Keys with empty segments (`a..b`, `.a`) are stored verbatim.
fn insert_path(root: &mut Map<String, Value>, key: &str, value: String) -> Result<(), String> {
    let segments: Vec<&str> = key.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        root.insert(key.to_string(), Value::String(value));
        return Ok(());
    }

    let (leaf, parents) = segments
        .split_last()
        .ok_or_else(|| "empty key".to_string())?;

    let mut current = root;
    for (depth, segment) in parents.iter().enumerate() {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        current = match entry {
            Value::Object(map) => map,
            _ => {
                return Err(format!(
                    "key `{key}` conflicts with value already set at `{}`",
                    segments[..=depth].join(".")
                ));
            }
        };
    }

    if let Some(Value::Object(_)) = current.get(*leaf) {
        return Err(format!("key `{key}` conflicts with nested keys below it"));
    }
    current.insert(leaf.to_string(), Value::String(value));
    Ok(())
}
