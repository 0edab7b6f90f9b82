use crate::error::SwarmError;
use serde_json::{Map, Value};

/// Arguments of a single function call, decoded from the model's JSON.
///
/// Models are loose with types, so numeric accessors also accept numbers
/// written as strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    inner: Map<String, Value>,
}

impl Args {
    pub fn new(inner: Map<String, Value>) -> Self {
        Self { inner }
    }

    pub fn from_value(value: Value) -> Result<Self, SwarmError> {
        match value {
            Value::Object(inner) => Ok(Self { inner }),
            Value::Null => Ok(Self::default()),
            other => Err(SwarmError::invalid_argument(
                "arguments",
                format!("expected a JSON object, got {other}"),
            )),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.inner.get(name).filter(|v| !v.is_null())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.inner
    }

    pub fn str(&self, name: &str) -> Result<&str, SwarmError> {
        self.opt_str(name)?.ok_or_else(|| missing(name))
    }

    pub fn opt_str(&self, name: &str) -> Result<Option<&str>, SwarmError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(wrong_type(name, "a string", other)),
        }
    }

    pub fn i64(&self, name: &str) -> Result<i64, SwarmError> {
        self.opt_i64(name)?.ok_or_else(|| missing(name))
    }

    pub fn opt_i64(&self, name: &str) -> Result<Option<i64>, SwarmError> {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };
        let parsed = match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        parsed
            .map(Some)
            .ok_or_else(|| wrong_type(name, "an integer", value))
    }

    pub fn f64(&self, name: &str) -> Result<f64, SwarmError> {
        self.opt_f64(name)?.ok_or_else(|| missing(name))
    }

    pub fn opt_f64(&self, name: &str) -> Result<Option<f64>, SwarmError> {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        parsed
            .map(Some)
            .ok_or_else(|| wrong_type(name, "a number", value))
    }

    pub fn bool(&self, name: &str) -> Result<bool, SwarmError> {
        self.opt_bool(name)?.ok_or_else(|| missing(name))
    }

    pub fn opt_bool(&self, name: &str) -> Result<Option<bool>, SwarmError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(Some(true)),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(Some(false)),
            Some(other) => Err(wrong_type(name, "a boolean", other)),
        }
    }

    pub fn str_list(&self, name: &str) -> Result<Vec<String>, SwarmError> {
        self.opt_str_list(name)?.ok_or_else(|| missing(name))
    }

    pub fn opt_str_list(&self, name: &str) -> Result<Option<Vec<String>>, SwarmError> {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };
        let Value::Array(items) = value else {
            return Err(wrong_type(name, "an array of strings", value));
        };
        items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(wrong_type(name, "an array of strings", other)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

impl From<Map<String, Value>> for Args {
    fn from(inner: Map<String, Value>) -> Self {
        Self { inner }
    }
}

fn missing(name: &str) -> SwarmError {
    SwarmError::invalid_argument(name, "missing required argument")
}

fn wrong_type(name: &str, expected: &str, got: &Value) -> SwarmError {
    SwarmError::invalid_argument(name, format!("expected {expected}, got {got}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(v: Value) -> Args {
        Args::from_value(v).unwrap()
    }

    #[test]
    fn test_lenient_numbers() {
        let a = args(json!({"qty": "3", "price": 2, "whole": 4.0}));
        assert_eq!(a.i64("qty").unwrap(), 3);
        assert_eq!(a.f64("price").unwrap(), 2.0);
        assert_eq!(a.i64("whole").unwrap(), 4);
    }

    #[test]
    fn test_missing_and_null_are_absent() {
        let a = args(json!({"note": null}));
        assert_eq!(a.opt_str("note").unwrap(), None);
        let err = a.str("name").unwrap_err();
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_wrong_type_is_error() {
        let a = args(json!({"qty": "lots", "tags": ["a", 1]}));
        assert!(a.i64("qty").is_err());
        assert!(a.str_list("tags").is_err());
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(Args::from_value(json!([1, 2])).is_err());
        assert!(Args::from_value(Value::Null).unwrap().as_map().is_empty());
    }
}
