// Nested JSON record -> flat, ordered key/scalar map with dotted keys

use serde_json::{Map, Value};

/// Flattens `record` so that `{"metrics": [{"percent": 1}]}` becomes
/// `{"metrics.0.percent": 1}`. Keys keep first-seen order. Empty objects and
/// arrays become a single null cell under their own key.
pub fn flatten(record: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in record {
        flatten_into(key.clone(), value, &mut out);
    }
    out
}

fn flatten_into(prefix: String, value: &Value, out: &mut Map<String, Value>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, v) in map {
                flatten_into(format!("{prefix}.{key}"), v, out);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (i, v) in items.iter().enumerate() {
                flatten_into(format!("{prefix}.{i}"), v, out);
            }
        }
        Value::Object(_) | Value::Array(_) => {
            out.insert(prefix, Value::Null);
        }
        scalar => {
            out.insert(prefix, scalar.clone());
        }
    }
}

/// Text form of a flattened scalar for tabular output. Null is empty.
pub fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
