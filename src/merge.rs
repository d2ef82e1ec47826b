//! Fallback composition of configuration trees.
//!
//! The primary tree wins for every key it defines, null included; the
//! fallback only fills gaps. Objects are merged recursively, everything else
//! is taken whole.

use serde_json::{Map, Value};

/// Merge `fallback` under `primary`.
///
/// - Objects are merged recursively: keys in primary win over keys in fallback
/// - Arrays, strings, numbers, booleans and null are taken from primary entirely
///
/// # Example
/// ```
/// use serde_json::json;
/// use i18n_config::merge::with_fallback;
///
/// let primary = json!({
///     "server": { "port": 9000 },
///     "features": ["c"]
/// });
/// let fallback = json!({
///     "server": { "port": 8080, "host": "localhost" },
///     "features": ["a", "b"]
/// });
/// let result = with_fallback(primary, fallback);
/// assert_eq!(
///     result,
///     json!({ "server": { "port": 9000, "host": "localhost" }, "features": ["c"] })
/// );
/// ```
pub fn with_fallback(primary: Value, fallback: Value) -> Value {
    match (primary, fallback) {
        // Both are objects: merge recursively
        (Value::Object(mut primary_map), Value::Object(fallback_map)) => {
            for (key, fallback_value) in fallback_map {
                let merged_value = match primary_map.remove(&key) {
                    Some(primary_value) => with_fallback(primary_value, fallback_value),
                    None => fallback_value,
                };
                primary_map.insert(key, merged_value);
            }
            Value::Object(primary_map)
        }
        // Any other case: primary wins entirely
        (primary, _) => primary,
    }
}

/// Merge values in order, earlier values taking precedence.
///
/// Starts from an empty object, so the result is always an object when
/// every input is one.
pub fn fallback_all(values: impl IntoIterator<Item = Value>) -> Value {
    values
        .into_iter()
        .fold(Value::Object(Map::new()), with_fallback)
}
