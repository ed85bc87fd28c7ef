//! Conversions from front-matter YAML into template [`Value`]s.

use gtmpl_value::Value;
use serde_yaml::Value as Yaml;
use std::collections::HashMap;

/// Converts a YAML value into a template value. Mapping keys that aren't
/// scalars are dropped.
pub fn from_yaml(yaml: &Yaml) -> Value {
    match yaml {
        Yaml::Null => Value::Nil,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                Value::from(n.as_f64().unwrap_or_default())
            }
        }
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Sequence(items) => Value::Array(items.iter().map(from_yaml).collect()),
        Yaml::Mapping(mapping) => {
            let mut m: HashMap<String, Value> = HashMap::new();
            for (k, v) in mapping {
                if let Some(k) = scalar_to_string(k) {
                    m.insert(k, from_yaml(v));
                }
            }
            Value::Object(m)
        }
    }
}

/// Renders a scalar YAML value as a string. Null, sequences, and mappings
/// have no string form.
pub fn scalar_to_string(yaml: &Yaml) -> Option<String> {
    match yaml {
        Yaml::String(s) => Some(s.clone()),
        Yaml::Number(n) => Some(n.to_string()),
        Yaml::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
