//! Typed values produced by the type system.
//!
//! [`Value`] is the provider-side representation of any host value the core
//! handles: literals, iteration sources, parameter defaults, state descriptors,
//! invocation arguments, and published metadata. Hashes keep their entries in
//! insertion order and accept arbitrary keys.

use std::fmt;

use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::{Parameter, TypeRef};

/// A single `key => value` entry of an ordered hash.
#[derive(Debug, Clone, PartialEq)]
pub struct HashEntry {
    pub key: Value,
    pub value: Value,
}

impl HashEntry {
    pub fn new(key: impl Into<Value>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// An instance of a named object type, such as a converted resource state.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub type_name: String,
    pub attributes: IndexMap<String, Value>,
}

impl Object {
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.attributes.get(attribute)
    }
}

/// A typed value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Undef,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Hash(Vec<HashEntry>),
    Type(TypeRef),
    /// A reference to a parameter whose value is supplied at run time.
    Parameter(Box<Parameter>),
    Object(Object),
}

impl Value {
    /// Builds a hash with string keys, preserving iteration order.
    pub fn string_hash<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Hash(
            entries
                .into_iter()
                .map(|(key, value)| HashEntry::new(Value::String(key.into()), value))
                .collect(),
        )
    }

    /// Builds an object value of the given type.
    pub fn object<I>(type_name: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        Value::Object(Object {
            type_name: type_name.into(),
            attributes: attributes.into_iter().collect(),
        })
    }

    pub fn is_undef(&self) -> bool {
        matches!(self, Value::Undef)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_parameter(&self) -> Option<&Parameter> {
        match self {
            Value::Parameter(parameter) => Some(parameter),
            _ => None,
        }
    }

    /// Looks up a string key in a hash or an attribute of an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Hash(entries) => entries
                .iter()
                .find(|entry| entry.key.as_str() == Some(key))
                .map(|entry| &entry.value),
            Value::Object(object) => object.get(key),
            _ => None,
        }
    }

    /// Renders the value as JSON for display and export.
    ///
    /// Hashes whose keys are all strings become JSON objects; any other hash
    /// becomes an array of `[key, value]` pairs so that ordering and key types
    /// survive. Objects carry their type name under `__type`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Undef => JsonValue::Null,
            Value::Boolean(flag) => JsonValue::Bool(*flag),
            Value::Integer(number) => JsonValue::from(*number),
            Value::Float(number) => JsonValue::from(*number),
            Value::String(text) => JsonValue::String(text.clone()),
            Value::Array(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Value::Hash(entries) => {
                if entries.iter().all(|entry| entry.key.as_str().is_some()) {
                    let mut map = JsonMap::new();
                    for entry in entries {
                        if let Some(key) = entry.key.as_str() {
                            map.insert(key.to_string(), entry.value.to_json());
                        }
                    }
                    JsonValue::Object(map)
                } else {
                    JsonValue::Array(
                        entries
                            .iter()
                            .map(|entry| JsonValue::Array(vec![entry.key.to_json(), entry.value.to_json()]))
                            .collect(),
                    )
                }
            }
            Value::Type(type_ref) => JsonValue::String(type_ref.to_string()),
            Value::Parameter(parameter) => parameter.to_json(),
            Value::Object(object) => {
                let mut map = JsonMap::new();
                map.insert("__type".to_string(), JsonValue::String(object.type_name.clone()));
                for (name, value) in &object.attributes {
                    map.insert(name.clone(), value.to_json());
                }
                JsonValue::Object(map)
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(text) => f.write_str(text),
            Value::Type(type_ref) => write!(f, "{type_ref}"),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Boolean(flag)
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Value::Integer(number)
    }
}

impl From<i32> for Value {
    fn from(number: i32) -> Self {
        Value::Integer(number.into())
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Value::Float(number)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::String(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::String(text)
    }
}

impl From<TypeRef> for Value {
    fn from(type_ref: TypeRef) -> Self {
        Value::Type(type_ref)
    }
}

impl From<Parameter> for Value {
    fn from(parameter: Parameter) -> Self {
        Value::Parameter(Box::new(parameter))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::Array(items.into_iter().map(Value::String).collect())
    }
}

/// An error reported by a callable, returned to invokers as an ordinary value.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorValue {
    pub message: String,
    pub kind: Option<String>,
    pub issue_code: Option<String>,
    pub details: IndexMap<String, Value>,
}

impl ErrorValue {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: None,
            issue_code: None,
            details: IndexMap::new(),
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_issue_code(mut self, issue_code: impl Into<String>) -> Self {
        self.issue_code = Some(issue_code.into());
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Converts the error into an `Error` object value.
    pub fn to_value(&self) -> Value {
        let mut attributes = vec![("message".to_string(), Value::from(self.message.as_str()))];
        if let Some(kind) = &self.kind {
            attributes.push(("kind".to_string(), Value::from(kind.as_str())));
        }
        if let Some(issue_code) = &self.issue_code {
            attributes.push(("issue_code".to_string(), Value::from(issue_code.as_str())));
        }
        if !self.details.is_empty() {
            attributes.push((
                "details".to_string(),
                Value::string_hash(self.details.iter().map(|(key, value)| (key.clone(), value.clone()))),
            ));
        }
        Value::object("Error", attributes)
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Some(kind) => write!(f, "{kind}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_keyed_hash_renders_as_object() {
        let value = Value::string_hash([("name", Value::from("Bob")), ("age", Value::from(42))]);
        assert_eq!(value.to_json(), json!({"name": "Bob", "age": 42}));
        assert_eq!(value.get("name"), Some(&Value::from("Bob")));
        assert_eq!(value.get("missing"), None);
    }

    #[test]
    fn hash_with_non_string_keys_renders_as_pairs() {
        let value = Value::Hash(vec![HashEntry::new(1, "one"), HashEntry::new(2, "two")]);
        assert_eq!(value.to_json(), json!([[1, "one"], [2, "two"]]));
    }

    #[test]
    fn error_value_converts_to_error_object() {
        let error = ErrorValue::new("not found")
            .with_kind("NotFound")
            .with_detail("id", "x");
        let value = error.to_value();
        assert_eq!(
            value.to_json(),
            json!({"__type": "Error", "message": "not found", "kind": "NotFound", "details": {"id": "x"}})
        );
        assert_eq!(error.to_string(), "NotFound: not found");
    }
}
