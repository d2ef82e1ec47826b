//! Fragment formats and their parsers.
//!
//! Every parser yields a `serde_json::Value` object so fragments of different
//! formats can be merged with one algorithm. Only `.conf` has substitution
//! syntax; strings from the other formats are escaped so the substitution
//! pass keeps them literal.

use crate::error::{ConfigError, Result};
use crate::substitute::escape_literals;
use crate::{hocon, properties};
use serde_json::{Map, Value};
use std::path::Path;

/// Supported fragment formats.
///
/// Declaration order is significant: when two fragments of the same section
/// sit in the same directory and bucket, the one whose format is declared
/// first takes precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Format {
    /// HOCON
    Conf,
    Json,
    Properties,
    Toml,
    Yaml,
}

impl Format {
    /// All formats in precedence order.
    pub const ALL: [Format; 5] = [
        Format::Conf,
        Format::Json,
        Format::Properties,
        Format::Toml,
        Format::Yaml,
    ];

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "conf" => Some(Self::Conf),
            "json" => Some(Self::Json),
            "properties" => Some(Self::Properties),
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Detect format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Get file extensions for this format.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Conf => &["conf"],
            Self::Json => &["json"],
            Self::Properties => &["properties"],
            Self::Toml => &["toml"],
            Self::Yaml => &["yaml", "yml"],
        }
    }

    /// Human-readable format name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Conf => "CONF",
            Self::Json => "JSON",
            Self::Properties => "properties",
            Self::Toml => "TOML",
            Self::Yaml => "YAML",
        }
    }

    /// Parse source text into an object tree.
    ///
    /// Blank documents yield an empty object. A document whose top level is
    /// not an object is rejected.
    pub fn parse(&self, source: &str) -> std::result::Result<Value, String> {
        if source.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }

        let value = match self {
            Self::Conf => hocon::parse(source)?,
            Self::Json => serde_json::from_str::<Value>(source).map_err(|e| e.to_string())?,
            Self::Properties => properties::parse(source)?,
            Self::Toml => {
                let table: toml::Table = toml::from_str(source).map_err(|e| e.to_string())?;
                serde_json::to_value(table).map_err(|e| e.to_string())?
            }
            Self::Yaml => serde_yaml::from_str::<Value>(source).map_err(|e| e.to_string())?,
        };
        let value = match self {
            Self::Conf => value,
            _ => escape_literals(value),
        };

        match value {
            Value::Object(_) => Ok(value),
            // A YAML document holding only comments
            Value::Null => Ok(Value::Object(Map::new())),
            other => Err(format!(
                "expected an object at the top level, found {}",
                value_kind(&other)
            )),
        }
    }

    /// Read and parse a fragment file.
    ///
    /// The file is read fully and closed before parsing.
    pub fn load(&self, path: &Path) -> Result<Value> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        tracing::trace!(path = %path.display(), format = self.name(), "Parsing fragment");
        self.parse(&content)
            .map_err(|message| ConfigError::malformed(path, self.name(), message))
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Load a file in the format implied by its extension.
pub fn load_path(path: &Path) -> Result<Value> {
    let format = Format::from_path(path).ok_or_else(|| {
        ConfigError::malformed(
            path,
            "unknown",
            format!(
                "unsupported extension; expected one of: {}",
                supported_extensions().join(", ")
            ),
        )
    })?;
    format.load(path)
}

/// Every extension recognized as a fragment.
pub fn supported_extensions() -> Vec<&'static str> {
    Format::ALL
        .iter()
        .flat_map(|format| format.extensions().iter().copied())
        .collect()
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_extension() {
        assert_eq!(Format::from_extension("conf"), Some(Format::Conf));
        assert_eq!(Format::from_extension("JSON"), Some(Format::Json));
        assert_eq!(Format::from_extension("yml"), Some(Format::Yaml));
        assert_eq!(Format::from_extension("txt"), None);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(
            Format::from_path(Path::new("/etc/app/root_it.properties")),
            Some(Format::Properties)
        );
        assert_eq!(Format::from_path(Path::new("README")), None);
    }

    #[test]
    fn test_declaration_order_is_precedence() {
        assert!(Format::Conf < Format::Json);
        assert!(Format::Json < Format::Properties);
        let mut formats = vec![Format::Yaml, Format::Properties, Format::Conf, Format::Json];
        formats.sort();
        assert_eq!(
            formats,
            vec![Format::Conf, Format::Json, Format::Properties, Format::Yaml]
        );
    }

    #[test]
    fn test_parse_conf() {
        let value = Format::Conf
            .parse("property1 = property1 in root.conf file\nnested { port = 8080 }\na.b.c: x\n")
            .unwrap();
        assert_eq!(
            value,
            json!({
                "property1": "property1 in root.conf file",
                "nested": {"port": 8080},
                "a": {"b": {"c": "x"}}
            })
        );
    }

    #[test]
    fn test_only_conf_keeps_substitutions() {
        assert_eq!(
            Format::Conf.parse("a = ${b}").unwrap(),
            json!({"a": "${b}"})
        );
        assert_eq!(
            Format::Json.parse(r#"{"a": "${b}"}"#).unwrap(),
            json!({"a": "$${b}"})
        );
        assert_eq!(
            Format::Properties.parse("a = Hi ${name}").unwrap(),
            json!({"a": "Hi $${name}"})
        );
        assert_eq!(
            Format::Yaml.parse("a: [\"$x\"]").unwrap(),
            json!({"a": ["$$x"]})
        );
    }

    #[test]
    fn test_parse_toml() {
        let value = Format::Toml
            .parse("name = \"app\"\n[server]\nport = 9000\n")
            .unwrap();
        assert_eq!(value, json!({"name": "app", "server": {"port": 9000}}));
    }

    #[test]
    fn test_parse_blank_is_empty_object() {
        for format in Format::ALL {
            assert_eq!(format.parse("  \n").unwrap(), json!({}), "{format}");
        }
        assert_eq!(Format::Yaml.parse("# only a comment\n").unwrap(), json!({}));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let err = Format::Json.parse("[1, 2]").unwrap_err();
        assert!(err.contains("an array"));
    }

    #[test]
    fn test_load_reports_path_and_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ \"a\": ").unwrap();

        let err = Format::Json.load(&path).unwrap_err();
        match err {
            ConfigError::MalformedFragment { path: p, format, .. } => {
                assert_eq!(p, path);
                assert_eq!(format, "JSON");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
