//! Named, typed parameters of activities and callables.

use heck::ToLowerCamelCase;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::{TypeRef, Value};

/// A named, typed parameter with an optional default.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub type_ref: TypeRef,
    pub default: Option<Value>,
    pub optional: bool,
}

impl Parameter {
    /// Creates a required parameter without a default.
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            default: None,
            optional: false,
        }
    }

    /// Creates a required parameter of type `Any`.
    pub fn any(name: impl Into<String>) -> Self {
        Self::new(name, TypeRef::Any)
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// True when a caller must supply a value for this parameter.
    pub fn is_required(&self) -> bool {
        !self.optional && self.default.is_none()
    }

    pub fn to_json(&self) -> JsonValue {
        let mut map = JsonMap::new();
        map.insert("name".to_string(), JsonValue::String(self.name.clone()));
        map.insert("type".to_string(), JsonValue::String(self.type_ref.to_string()));
        if let Some(default) = &self.default {
            map.insert("value".to_string(), default.to_json());
        }
        if self.optional {
            map.insert("optional".to_string(), JsonValue::Bool(true));
        }
        JsonValue::Object(map)
    }
}

/// Derives a parameter name from a declared name by lower-casing its first
/// character only: `Output` becomes `output`, `z_index` stays as it is.
pub fn parameter_name(declared: &str) -> String {
    let mut chars = declared.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Derives a parameter name from a struct field name: `host_names` becomes `hostNames`.
pub fn field_parameter_name(field: &str) -> String {
    field.to_lower_camel_case()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn declared_names_only_lose_their_leading_capital() {
        assert_eq!(parameter_name("Output"), "output");
        assert_eq!(parameter_name("z_index"), "z_index");
        assert_eq!(parameter_name("HTTPServer"), "hTTPServer");
        assert_eq!(parameter_name("my-var"), "my-var");
        assert_eq!(parameter_name("Host_results"), "host_results");
        assert_eq!(parameter_name(""), "");
    }

    #[test]
    fn field_names_are_lower_camel_cased() {
        assert_eq!(field_parameter_name("host_names"), "hostNames");
        assert_eq!(field_parameter_name("x"), "x");
        assert_eq!(field_parameter_name("alreadyCamel"), "alreadyCamel");
    }

    #[test]
    fn parameter_json_omits_unset_fields() {
        let required = Parameter::new("a", TypeRef::String);
        assert_eq!(required.to_json(), json!({"name": "a", "type": "String"}));
        assert!(required.is_required());

        let defaulted = Parameter::any("b").with_default(Value::from(3)).with_optional(true);
        assert_eq!(defaulted.to_json(), json!({"name": "b", "type": "Any", "value": 3, "optional": true}));
        assert!(!defaulted.is_required());
    }
}
