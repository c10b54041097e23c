//! Annotated types and the type sets that publish them.

use indexmap::IndexMap;

use crate::{ObjectType, StructSchema, Value, typed_name::qualify};

/// Annotation key for resource-type metadata (relationships, attribute mutability).
pub const RESOURCE_TYPE_ANNOTATION: &str = "Loom::ResourceType";
/// Annotation key for consumer-specific custom data.
pub const CUSTOM_DATA_ANNOTATION: &str = "Loom::CustomData";

/// A host type together with its tags and annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedType {
    pub schema: StructSchema,
    pub tags: IndexMap<String, String>,
    pub annotations: IndexMap<String, Value>,
}

impl AnnotatedType {
    /// Unqualified name of the annotated host type.
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn annotation(&self, key: &str) -> Option<&Value> {
        self.annotations.get(key)
    }

    /// Declares the annotated type under `namespace`, producing an object type.
    pub fn into_object_type(self, namespace: &str) -> ObjectType {
        ObjectType {
            name: qualify(namespace, &self.schema.name),
            attributes: self.schema.fields,
            functions: Vec::new(),
            tags: self.tags,
            annotations: self.annotations,
        }
    }
}

/// A named, versioned set of declared types.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSet {
    pub name: String,
    pub version: String,
    /// Declared types keyed by their name relative to the set.
    pub types: IndexMap<String, ObjectType>,
}

impl TypeSet {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            types: IndexMap::new(),
        }
    }

    /// Adds or replaces a type; the key is the type name relative to this set.
    pub fn insert(&mut self, object_type: ObjectType) {
        let relative = object_type
            .name
            .strip_prefix(&format!("{}::", self.name))
            .unwrap_or(&object_type.name)
            .to_string();
        self.types.insert(relative, object_type);
    }

    /// Looks up a type by its relative or fully qualified name.
    pub fn get(&self, name: &str) -> Option<&ObjectType> {
        self.types
            .get(name)
            .or_else(|| self.types.values().find(|object_type| object_type.name == name))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let types: serde_json::Map<String, serde_json::Value> = self
            .types
            .iter()
            .map(|(name, object_type)| (name.clone(), object_type.to_json()))
            .collect();
        serde_json::json!({
            "name": self.name,
            "version": self.version,
            "types": types,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Function, TypeRef};

    #[test]
    fn type_set_keys_types_relative_to_its_name() {
        let mut type_set = TypeSet::new("My", "0.1.0");
        let annotated = AnnotatedType {
            schema: StructSchema::new("MyRes").field("name", TypeRef::String),
            tags: IndexMap::new(),
            annotations: IndexMap::new(),
        };
        type_set.insert(annotated.into_object_type("My"));
        type_set.insert(ObjectType::interface("My::TheApi", vec![Function::new("first", vec![], TypeRef::String)]));

        assert_eq!(type_set.types.keys().collect::<Vec<_>>(), vec!["MyRes", "TheApi"]);
        assert_eq!(type_set.get("MyRes").map(|t| t.name.as_str()), Some("My::MyRes"));
        assert_eq!(type_set.get("My::TheApi").map(|t| t.name.as_str()), Some("My::TheApi"));
    }
}
