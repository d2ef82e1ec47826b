//! The resolved configuration tree.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A fully resolved configuration.
///
/// Top-level keys are section names (plus any keys from a base config
/// file). Values are queried with dotted paths such as `root.property1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Config {
    root: Value,
}

impl Config {
    /// Wrap a resolved tree. Non-object values become an empty configuration.
    pub fn from_value(root: Value) -> Self {
        match root {
            Value::Object(_) => Self { root },
            _ => Self::empty(),
        }
    }

    pub fn empty() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    /// Value at a dotted path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return Some(&self.root);
        }
        path.split('.')
            .try_fold(&self.root, |current, segment| current.as_object()?.get(segment))
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Integer at a path; numeric strings (as read from `.properties`) are accepted.
    pub fn get_i64(&self, path: &str) -> Option<i64> {
        match self.get(path)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Boolean at a path; `"true"`/`"false"` strings are accepted.
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        match self.get(path)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Sub-tree at a path, when it is an object.
    pub fn get_config(&self, path: &str) -> Option<Config> {
        self.get(path)
            .filter(|value| value.is_object())
            .map(|value| Config {
                root: value.clone(),
            })
    }

    pub fn has_path(&self, path: &str) -> bool {
        self.get(path).is_some_and(|value| !value.is_null())
    }

    /// Top-level key names, in order.
    pub fn sections(&self) -> Vec<&str> {
        self.root
            .as_object()
            .map(|map| map.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Every non-null leaf with its dotted path.
    ///
    /// Objects are descended into; arrays count as single leaves.
    pub fn entries(&self) -> Vec<(String, &Value)> {
        let mut out = Vec::new();
        collect_entries("", &self.root, &mut out);
        out
    }

    pub fn entry_count(&self) -> usize {
        self.entries().len()
    }

    /// Deserialize one section into a typed value.
    pub fn section_as<T: DeserializeOwned>(&self, path: &str) -> Option<serde_json::Result<T>> {
        self.get(path)
            .map(|value| serde_json::from_value(value.clone()))
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::empty()
    }
}

fn collect_entries<'a>(prefix: &str, value: &'a Value, out: &mut Vec<(String, &'a Value)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                collect_entries(&path, child, out);
            }
        }
        Value::Null => {}
        leaf => out.push((prefix.to_string(), leaf)),
    }
}
