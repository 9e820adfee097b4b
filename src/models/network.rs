// Docker network descriptor plus the tick timestamp

use serde::Serialize;
use serde_json::{Map, Value};

pub const TIMESTAMP_KEY: &str = "timestamp";

/// Runtime network descriptor, passed through as-is except for the injected
/// `timestamp` key.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct NetworkSnapshot {
    fields: Map<String, Value>,
}

impl NetworkSnapshot {
    pub fn new(mut descriptor: Map<String, Value>, timestamp: f64) -> Self {
        descriptor.insert(TIMESTAMP_KEY.to_string(), Value::from(timestamp));
        Self { fields: descriptor }
    }

    pub fn timestamp(&self) -> f64 {
        self.fields
            .get(TIMESTAMP_KEY)
            .and_then(Value::as_f64)
            .unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_injects_timestamp_and_keeps_fields() {
        let descriptor = json!({"Name": "bridge", "Driver": "bridge"});
        let Value::Object(map) = descriptor else {
            unreachable!()
        };
        let n = NetworkSnapshot::new(map, 1700000000.5);
        assert_eq!(n.timestamp(), 1700000000.5);
        assert_eq!(n.get("Name"), Some(&json!("bridge")));
        let keys: Vec<&String> = n.fields().keys().collect();
        assert_eq!(keys, ["Name", "Driver", "timestamp"]);
    }

    #[test]
    fn new_overwrites_runtime_timestamp() {
        let Value::Object(map) = json!({"timestamp": "old"}) else {
            unreachable!()
        };
        let n = NetworkSnapshot::new(map, 2.0);
        assert_eq!(n.timestamp(), 2.0);
        assert_eq!(n.fields().len(), 1);
    }
}
