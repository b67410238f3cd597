use std::collections::HashMap;
use std::fmt::Display;

use serde_json::Value;


/// Values available to placeholders while rendering a template.
///
/// Keys are matched exactly and case-sensitively. Values are stored in
/// their final string form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    values: HashMap<String, String>,
}

impl Context {
    pub fn new() -> Self {
        Context::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Display) {
        self.values.insert(key.into(), value.to_string());
    }

    /// Builder variant of [`Context::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Builds a context from JSON data.
    ///
    /// Object members become entries. Any other value is stored under `data`.
    pub fn from_json(data: Value) -> Self {
        let mut context = Context::new();

        match data {
            Value::Object(obj) => {
                for (k, v) in obj {
                    context.values.insert(k, json_to_string(&v));
                }
            }
            Value::Null => {}
            other => {
                context.values.insert("data".to_string(), json_to_string(&other));
            }
        }

        context
    }
}

impl<K: Into<String>, V: Display> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = Context::new();
        for (k, v) in iter {
            context.insert(k, v);
        }
        context
    }
}

fn json_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        // numbers, bools, arrays and objects keep their JSON text
        other => other.to_string(),
    }
}
