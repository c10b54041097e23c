//! Published metadata records.

use indexmap::IndexMap;

use crate::{TypedName, Value};

/// A metadata record describing one registered API or resolved activity.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub identifier: TypedName,
    pub service_id: TypedName,
    pub properties: IndexMap<String, Value>,
}

impl Definition {
    pub fn new(identifier: TypedName, service_id: TypedName, properties: IndexMap<String, Value>) -> Self {
        Self {
            identifier,
            service_id,
            properties,
        }
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// The `style` property: `callable`, `action`, `resource`, `workflow` or `iterator`.
    pub fn style(&self) -> Option<&str> {
        self.property("style").and_then(Value::as_str)
    }

    /// Converts the definition into a `Service::Definition` object value.
    pub fn to_value(&self) -> Value {
        Value::object(
            "Service::Definition",
            [
                ("identifier".to_string(), self.identifier.to_value()),
                ("serviceId".to_string(), self.service_id.to_value()),
                (
                    "properties".to_string(),
                    Value::string_hash(self.properties.iter().map(|(key, value)| (key.clone(), value.clone()))),
                ),
            ],
        )
    }

    pub fn to_json(&self) -> serde_json::Value {
        let properties: serde_json::Map<String, serde_json::Value> = self
            .properties
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect();
        serde_json::json!({
            "identifier": self.identifier,
            "serviceId": self.service_id,
            "properties": properties,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Namespace, TypeRef};
    use serde_json::json;

    #[test]
    fn definition_exposes_style_and_renders_json() {
        let mut properties = IndexMap::new();
        properties.insert("interface".to_string(), Value::Type(TypeRef::named("My::TheApi")));
        properties.insert("style".to_string(), Value::from("callable"));
        let definition = Definition::new(
            TypedName::new(Namespace::Definition, "TheApi"),
            TypedName::new(Namespace::Service, "My::Service"),
            properties,
        );

        assert_eq!(definition.style(), Some("callable"));
        assert_eq!(
            definition.to_json(),
            json!({
                "identifier": {"namespace": "definition", "name": "TheApi"},
                "serviceId": {"namespace": "service", "name": "My::Service"},
                "properties": {"interface": "My::TheApi", "style": "callable"},
            })
        );
        assert!(matches!(definition.to_value(), Value::Object(ref object) if object.type_name == "Service::Definition"));
    }
}
