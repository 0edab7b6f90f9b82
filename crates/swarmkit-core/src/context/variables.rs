use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// String-keyed bag of values shared by an agent's instructions and functions.
///
/// Lives for one process; keys keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextVariables {
    vars: Map<String, Value>,
}

impl ContextVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.vars.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.vars.get_mut(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.vars.get(key).and_then(Value::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.vars.get(key).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.vars.get(key).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.vars.get(key).and_then(Value::as_bool)
    }

    pub fn get_array(&self, key: &str) -> Option<&Vec<Value>> {
        self.vars.get(key).and_then(Value::as_array)
    }

    pub fn get_object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.vars.get(key).and_then(Value::as_object)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.vars.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Shallow merge: every key of `other` replaces the one held here.
    pub fn update(&mut self, other: ContextVariables) {
        for (k, v) in other.vars {
            self.vars.insert(k, v);
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.vars.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.vars.iter()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.vars
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.vars.clone())
    }
}

impl From<Map<String, Value>> for ContextVariables {
    fn from(vars: Map<String, Value>) -> Self {
        Self { vars }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ContextVariables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ctx = Self::new();
        for (k, v) in iter {
            ctx.set(k, v);
        }
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_is_shallow() {
        let mut ctx = ContextVariables::new()
            .with("user", "Ada")
            .with("prefs", json!({"theme": "dark", "lang": "en"}));
        let patch = ContextVariables::new().with("prefs", json!({"theme": "light"}));
        ctx.update(patch);

        assert_eq!(ctx.get_str("user"), Some("Ada"));
        assert_eq!(ctx.get("prefs"), Some(&json!({"theme": "light"})));
    }

    #[test]
    fn test_typed_getters() {
        let ctx: ContextVariables = [("n", json!(3)), ("x", json!(1.5)), ("tags", json!(["a"]))]
            .into_iter()
            .collect();
        assert_eq!(ctx.get_i64("n"), Some(3));
        assert_eq!(ctx.get_f64("x"), Some(1.5));
        assert_eq!(ctx.get_array("tags").map(Vec::len), Some(1));
        assert_eq!(ctx.get_str("n"), None);
    }
}
