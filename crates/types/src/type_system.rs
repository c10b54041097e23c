//! The type system provider contract and its default implementation.
//!
//! The resolver and the registry never inspect host values or host types
//! directly. They go through [`TypeSystem`], which wraps host values, reflects
//! host types registered with it, and builds annotated types, typed names and
//! guard conditions.

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::{AnnotatedType, Condition, ConditionError, Namespace, ObjectType, StructSchema, TypedName, Value};

/// Services the resolution engine and the service registry consume from a type system.
pub trait TypeSystem: Send + Sync {
    /// Converts a host literal into a typed value.
    fn wrap_value(&self, host: &JsonValue) -> Value;

    /// Returns the declared type implemented by `host_type`, if one is registered.
    fn reflect_type(&self, host_type: &str) -> Option<ObjectType>;

    /// Records that `host_type` implements `object_type`.
    fn register_type(&self, host_type: &str, object_type: ObjectType);

    fn new_annotated_type(
        &self,
        schema: StructSchema,
        tags: IndexMap<String, String>,
        annotations: IndexMap<String, Value>,
    ) -> AnnotatedType {
        AnnotatedType {
            schema,
            tags,
            annotations,
        }
    }

    fn new_typed_name(&self, namespace: Namespace, name: &str) -> TypedName {
        TypedName::new(namespace, name)
    }

    /// Parses a guard condition. Empty text yields a condition that is always true.
    fn parse_condition(&self, text: &str) -> Result<Condition, ConditionError> {
        Condition::parse(text)
    }
}

impl dyn TypeSystem {
    /// Serializes any host value and wraps the result.
    pub fn wrap<T: Serialize + ?Sized>(&self, host: &T) -> Result<Value, serde_json::Error> {
        let json = serde_json::to_value(host)?;
        Ok(self.wrap_value(&json))
    }
}

/// A type system backed by JSON values and an in-memory type table.
#[derive(Debug, Default)]
pub struct DefaultTypeSystem {
    implementations: RwLock<HashMap<String, ObjectType>>,
}

impl DefaultTypeSystem {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TypeSystem for DefaultTypeSystem {
    fn wrap_value(&self, host: &JsonValue) -> Value {
        match host {
            JsonValue::Null => Value::Undef,
            JsonValue::Bool(flag) => Value::Boolean(*flag),
            JsonValue::Number(number) => match number.as_i64() {
                Some(integer) => Value::Integer(integer),
                None => Value::Float(number.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(text) => Value::String(text.clone()),
            JsonValue::Array(items) => Value::Array(items.iter().map(|item| self.wrap_value(item)).collect()),
            JsonValue::Object(map) => {
                Value::string_hash(map.iter().map(|(key, value)| (key.clone(), self.wrap_value(value))))
            }
        }
    }

    fn reflect_type(&self, host_type: &str) -> Option<ObjectType> {
        self.implementations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(host_type)
            .cloned()
    }

    fn register_type(&self, host_type: &str, object_type: ObjectType) {
        self.implementations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(host_type.to_string(), object_type);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Function, TypeRef};
    use serde_json::json;

    #[test]
    fn wraps_json_values_preserving_key_order() {
        let type_system = DefaultTypeSystem::new();
        let wrapped = type_system.wrap_value(&json!({"b": 1, "a": [true, null, 2.5, "x"]}));
        assert_eq!(
            wrapped,
            Value::string_hash([
                ("b", Value::Integer(1)),
                (
                    "a",
                    Value::Array(vec![
                        Value::Boolean(true),
                        Value::Undef,
                        Value::Float(2.5),
                        Value::from("x"),
                    ])
                ),
            ])
        );
    }

    #[test]
    fn wrap_serializes_host_values() {
        #[derive(Serialize)]
        struct Host {
            name: String,
            count: u32,
        }

        let type_system: &dyn TypeSystem = &DefaultTypeSystem::new();
        let wrapped = type_system
            .wrap(&Host {
                name: "web".into(),
                count: 3,
            })
            .expect("wrap host value");
        assert_eq!(wrapped.get("name"), Some(&Value::from("web")));
        assert_eq!(wrapped.get("count"), Some(&Value::Integer(3)));
    }

    #[test]
    fn reflects_only_registered_types() {
        let type_system = DefaultTypeSystem::new();
        assert!(type_system.reflect_type("my::TheApi").is_none());

        let interface = ObjectType::interface("My::TheApi", vec![Function::new("first", vec![], TypeRef::String)]);
        type_system.register_type("my::TheApi", interface.clone());
        assert_eq!(type_system.reflect_type("my::TheApi"), Some(interface));
    }

    #[test]
    fn default_methods_build_names_and_conditions() {
        let type_system = DefaultTypeSystem::new();
        let name = type_system.new_typed_name(Namespace::Definition, "Test::X");
        assert_eq!(name.to_string(), "definition/Test::X");
        assert!(type_system.parse_condition("").expect("empty condition").is_always());
        assert!(type_system.parse_condition("a >= b").is_err());
    }
}
