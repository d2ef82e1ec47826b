//! `${...}` substitution over a merged configuration tree.
//!
//! - `${a.b.c}` refers to the value at a dotted path from the root.
//! - `${?a.b.c}` is optional: when nothing is found the field is removed, or
//!   the reference expands to the empty string inside a longer string.
//! - A string that is exactly one reference takes the referenced value with
//!   its type; references embedded in text are stringified.
//! - Paths missing from the tree fall back to an environment lookup of the
//!   path verbatim, so `${HOME}` works.
//!
//! References may point forward or backward in the tree. Cycles are errors.
//!
//! `$$` stands for a literal `$`. Formats without substitution syntax are
//! passed through [`escape_literals`] when loaded, so their strings come out
//! of [`resolve`] exactly as written.

use crate::error::{ConfigError, Result};
use crate::format::value_kind;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// Source of environment variables for unresolved references.
pub trait EnvLookup: Send + Sync {
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Fixed variables, mostly for tests.
impl EnvLookup for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Resolve every substitution in `root`.
pub fn resolve(root: Value, env: &dyn EnvLookup) -> Result<Value> {
    let mut resolver = Resolver {
        source: &root,
        env,
        cache: HashMap::new(),
        visiting: HashSet::new(),
    };
    let resolved = resolver.resolve_node("", &root)?;
    Ok(resolved.unwrap_or_else(|| Value::Object(Map::new())))
}

/// Escape `text` so [`resolve`] reproduces it verbatim.
pub fn escape_literal(text: &str) -> String {
    text.replace('$', "$$")
}

/// Escape every string value of a tree. Keys are left alone.
pub fn escape_literals(value: Value) -> Value {
    match value {
        Value::String(text) if text.contains('$') => Value::String(escape_literal(&text)),
        Value::Array(items) => Value::Array(items.into_iter().map(escape_literals).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, child)| (key, escape_literals(child)))
                .collect(),
        ),
        other => other,
    }
}

/// Whether a string contains at least one substitution.
pub fn has_references(text: &str) -> bool {
    tokenize(text)
        .iter()
        .any(|piece| matches!(piece, Piece::Ref { .. }))
}

#[derive(Debug, PartialEq, Eq)]
enum Piece<'a> {
    Text(String),
    Ref { path: &'a str, optional: bool },
}

fn tokenize(text: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut rest = text;

    while let Some(dollar) = rest.find('$') {
        literal.push_str(&rest[..dollar]);
        let after = &rest[dollar + 1..];

        if let Some(escaped) = after.strip_prefix('$') {
            literal.push('$');
            rest = escaped;
            continue;
        }

        if let Some(body) = after.strip_prefix('{')
            && let Some(len) = body.find('}')
        {
            let inner = body[..len].trim();
            let (path, optional) = match inner.strip_prefix('?') {
                Some(path) => (path.trim(), true),
                None => (inner, false),
            };
            if path.is_empty() {
                literal.push_str(&rest[dollar..dollar + 3 + len]);
            } else {
                if !literal.is_empty() {
                    pieces.push(Piece::Text(std::mem::take(&mut literal)));
                }
                pieces.push(Piece::Ref { path, optional });
            }
            rest = &body[len + 1..];
            continue;
        }

        literal.push('$');
        rest = after;
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        pieces.push(Piece::Text(literal));
    }
    pieces
}

struct Resolver<'a> {
    source: &'a Value,
    env: &'a dyn EnvLookup,
    cache: HashMap<String, Option<Value>>,
    visiting: HashSet<String>,
}

impl Resolver<'_> {
    /// Resolve one node. `None` means an optional reference removed it.
    fn resolve_node(&mut self, path: &str, node: &Value) -> Result<Option<Value>> {
        match node {
            Value::Object(map) => {
                let mut out = Map::new();
                for (key, child) in map {
                    let child_path = join(path, key);
                    if let Some(value) = self.resolve_node(&child_path, child)? {
                        out.insert(key.clone(), value);
                    }
                }
                Ok(Some(Value::Object(out)))
            }
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (idx, item) in items.iter().enumerate() {
                    let item_path = join(path, &idx.to_string());
                    if let Some(value) = self.resolve_node(&item_path, item)? {
                        out.push(value);
                    }
                }
                Ok(Some(Value::Array(out)))
            }
            Value::String(text) => self.resolve_string(text),
            other => Ok(Some(other.clone())),
        }
    }

    fn resolve_string(&mut self, text: &str) -> Result<Option<Value>> {
        let pieces = tokenize(text);

        if let [Piece::Ref { path, optional }] = pieces.as_slice() {
            return match self.lookup(path)? {
                Some(value) => Ok(Some(value)),
                None if *optional => Ok(None),
                None => Err(ConfigError::unresolved(*path, "no value at this path")),
            };
        }

        if let [Piece::Text(literal)] = pieces.as_slice() {
            return Ok(Some(Value::String(literal.clone())));
        }

        let mut out = String::new();
        for piece in pieces {
            match piece {
                Piece::Text(literal) => out.push_str(&literal),
                Piece::Ref { path, optional } => match self.lookup(path)? {
                    Some(Value::String(s)) => out.push_str(&s),
                    Some(Value::Null) => out.push_str("null"),
                    Some(value @ (Value::Bool(_) | Value::Number(_))) => {
                        out.push_str(&value.to_string())
                    }
                    Some(value) => {
                        return Err(ConfigError::unresolved(
                            path,
                            format!("cannot embed {} in a string", value_kind(&value)),
                        ));
                    }
                    None if optional => {}
                    None => return Err(ConfigError::unresolved(path, "no value at this path")),
                },
            }
        }
        Ok(Some(Value::String(out)))
    }

    /// Resolved value at a dotted path, falling back to the environment.
    fn lookup(&mut self, path: &str) -> Result<Option<Value>> {
        match self.lookup_tree(path)? {
            Some(value) => Ok(Some(value)),
            None => Ok(self.env.var(path).map(Value::String)),
        }
    }

    /// Walk the raw tree segment by segment. A substitution met on the way is
    /// resolved and the walk continues inside its value, so references
    /// through other references work.
    fn lookup_tree(&mut self, path: &str) -> Result<Option<Value>> {
        let segments: Vec<&str> = path.split('.').collect();
        let mut raw = self.source;
        let mut walked = String::new();

        for (idx, segment) in segments.iter().enumerate() {
            match raw {
                Value::Object(map) => match map.get(*segment) {
                    Some(child) => {
                        raw = child;
                        walked = join(&walked, segment);
                    }
                    None => return Ok(None),
                },
                Value::String(text) if has_references(text) => {
                    let Some(resolved) = self.resolve_at(&walked, raw)? else {
                        return Ok(None);
                    };
                    return Ok(descend(&resolved, &segments[idx..]).cloned());
                }
                _ => return Ok(None),
            }
        }

        self.resolve_at(&walked, raw)
    }

    /// Resolve the node stored at `path`, memoized and cycle-checked.
    fn resolve_at(&mut self, path: &str, raw: &Value) -> Result<Option<Value>> {
        if let Some(cached) = self.cache.get(path) {
            return Ok(cached.clone());
        }
        if !self.visiting.insert(path.to_string()) {
            return Err(ConfigError::unresolved(path, "cycle in substitutions"));
        }
        let resolved = self.resolve_node(path, raw);
        self.visiting.remove(path);
        let resolved = resolved?;
        self.cache.insert(path.to_string(), resolved.clone());
        Ok(resolved)
    }
}

fn descend<'v>(value: &'v Value, segments: &[&str]) -> Option<&'v Value> {
    segments
        .iter()
        .try_fold(value, |current, segment| current.as_object()?.get(*segment))
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}
