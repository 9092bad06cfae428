//! Raw converter settings
//!
//! Settings arrive from the host pipeline as a string-keyed map of JSON values.
//! The typed accessors never coerce across types: `"100"` is a string, not an
//! integer, and callers decide what an ill-typed value means.

use serde_json::Value;
use std::collections::HashMap;

/// Key-value settings handed to `configure`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConverterSettings {
    values: HashMap<String, Value>,
}

impl ConverterSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Integer setting; `None` when absent or not an integer
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(Value::as_i64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(Value::as_bool)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse `key=value` properties text
    ///
    /// Blank lines and lines starting with `#` or `!` are skipped. Values that
    /// parse as integers or booleans are stored as such, everything else as a
    /// string.
    pub fn from_properties(text: &str) -> Self {
        let mut settings = Self::new();
        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let Some((key, raw)) = line.split_once('=').or_else(|| line.split_once(':')) else {
                log::warn!("Ignoring settings line without a value: {}", line);
                continue;
            };
            settings.insert(key.trim(), typed_value(raw.trim()));
        }
        settings
    }
}

fn typed_value(raw: &str) -> Value {
    if let Ok(int) = raw.parse::<i64>() {
        return Value::from(int);
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

impl From<HashMap<String, Value>> for ConverterSettings {
    fn from(values: HashMap<String, Value>) -> Self {
        Self { values }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ConverterSettings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
