//! Resource type annotations.
//!
//! [`ResourceTypeBuilder`] accumulates relationship, attribute mutability,
//! custom data and tag metadata for one resource type and emits the annotated
//! type declared in a service's type set.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use loom_types::{
    AnnotatedType, CUSTOM_DATA_ANNOTATION, RESOURCE_TYPE_ANNOTATION, StructSchema, TypeRef, TypeSystem, Value,
};

/// A relationship from a resource type to another type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Name of the related type.
    pub to: String,
    pub kind: String,
    pub cardinality: String,
    /// Name of the relationship seen from the other side; empty when there is none.
    pub reverse_name: String,
    pub keys: Vec<String>,
}

impl Relationship {
    pub fn new(to: impl Into<String>, kind: impl Into<String>, cardinality: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            kind: kind.into(),
            cardinality: cardinality.into(),
            reverse_name: String::new(),
            keys: Vec::new(),
        }
    }

    pub fn with_reverse_name(mut self, reverse_name: impl Into<String>) -> Self {
        self.reverse_name = reverse_name.into();
        self
    }

    pub fn with_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys = keys.into_iter().map(Into::into).collect();
        self
    }

    fn to_value(&self) -> Value {
        let mut entries = vec![
            ("type", Value::Type(TypeRef::named(&self.to))),
            ("kind", Value::from(self.kind.as_str())),
            ("cardinality", Value::from(self.cardinality.as_str())),
            ("keys", Value::from(self.keys.clone())),
        ];
        if !self.reverse_name.is_empty() {
            entries.push(("reverseName", Value::from(self.reverse_name.as_str())));
        }
        Value::string_hash(entries)
    }
}

/// Accumulates annotations for a resource type.
///
/// Every operation is additive. Attribute names form ordered sets, relationships
/// are keyed by name, and custom data and tags overwrite on key collision.
pub struct ResourceTypeBuilder {
    type_system: Arc<dyn TypeSystem>,
    relationships: IndexMap<String, Relationship>,
    immutable_attributes: IndexSet<String>,
    provided_attributes: IndexSet<String>,
    custom_data: IndexMap<String, IndexMap<String, Value>>,
    tags: IndexMap<String, String>,
}

impl ResourceTypeBuilder {
    pub fn new(type_system: Arc<dyn TypeSystem>) -> Self {
        Self {
            type_system,
            relationships: IndexMap::new(),
            immutable_attributes: IndexSet::new(),
            provided_attributes: IndexSet::new(),
            custom_data: IndexMap::new(),
            tags: IndexMap::new(),
        }
    }

    pub fn add_relationship(&mut self, name: impl Into<String>, relationship: Relationship) -> &mut Self {
        self.relationships.insert(name.into(), relationship);
        self
    }

    /// Attributes that cannot change once the resource exists.
    pub fn immutable_attributes<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.immutable_attributes.extend(names.into_iter().map(Into::into));
        self
    }

    /// Attributes whose values are provided by the resource provider.
    pub fn provided_attributes<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.provided_attributes.extend(names.into_iter().map(Into::into));
        self
    }

    /// Attaches a value for a specific consumer, keyed by `key`.
    pub fn custom_data(&mut self, consumer_id: impl Into<String>, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.custom_data
            .entry(consumer_id.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    pub fn tags<I, K, V>(&mut self, tags: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.tags
            .extend(tags.into_iter().map(|(key, value)| (key.into(), value.into())));
        self
    }

    /// Builds the annotated type for `schema`; the builder is left unchanged.
    pub fn build(&self, schema: &StructSchema) -> AnnotatedType {
        let mut annotations = IndexMap::new();

        if !self.immutable_attributes.is_empty() || !self.provided_attributes.is_empty() || !self.relationships.is_empty() {
            let mut entries = Vec::with_capacity(3);
            if !self.immutable_attributes.is_empty() {
                entries.push(("immutableAttributes", string_list(&self.immutable_attributes)));
            }
            if !self.provided_attributes.is_empty() {
                entries.push(("providedAttributes", string_list(&self.provided_attributes)));
            }
            if !self.relationships.is_empty() {
                let relationships = self
                    .relationships
                    .iter()
                    .map(|(name, relationship)| (name.clone(), relationship.to_value()));
                entries.push(("relationships", Value::string_hash(relationships)));
            }
            annotations.insert(RESOURCE_TYPE_ANNOTATION.to_string(), Value::string_hash(entries));
        }

        if !self.custom_data.is_empty() {
            let custom_data = self.custom_data.iter().map(|(consumer_id, data)| {
                let data = data.iter().map(|(key, value)| (key.clone(), value.clone()));
                (consumer_id.clone(), Value::string_hash(data))
            });
            annotations.insert(CUSTOM_DATA_ANNOTATION.to_string(), Value::string_hash(custom_data));
        }

        self.type_system
            .new_annotated_type(schema.clone(), self.tags.clone(), annotations)
    }
}

fn string_list(names: &IndexSet<String>) -> Value {
    Value::Array(names.iter().map(|name| Value::from(name.as_str())).collect())
}
