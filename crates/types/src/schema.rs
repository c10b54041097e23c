//! Explicit schema descriptions of host types.
//!
//! Host types describe themselves instead of being reflected at run time. A
//! data type implements [`Describe`] to return its [`StructSchema`]; a callable
//! interface is described by an [`ObjectType`] listing its [`Function`]s.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Parameter, TypeRef, Value};

/// A single field of a described struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(rename = "type", default)]
    pub type_ref: TypeRef,
    #[serde(default)]
    pub optional: bool,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            optional: false,
        }
    }
}

/// The shape of a host struct: its name and ordered fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructSchema {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

impl StructSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, type_ref: TypeRef) -> Self {
        self.fields.push(FieldSchema::new(name, type_ref));
        self
    }

    pub fn optional_field(mut self, name: impl Into<String>, type_ref: TypeRef) -> Self {
        let mut field = FieldSchema::new(name, type_ref);
        field.optional = true;
        self.fields.push(field);
        self
    }
}

/// Implemented by host types that can describe their own shape.
///
/// ```rust
/// use loom_types::{Describe, StructSchema, TypeRef};
///
/// struct MyRes;
///
/// impl Describe for MyRes {
///     fn describe() -> StructSchema {
///         StructSchema::new("MyRes")
///             .field("name", TypeRef::String)
///             .field("phone", TypeRef::String)
///     }
/// }
///
/// assert_eq!(MyRes::describe().fields.len(), 2);
/// ```
pub trait Describe {
    fn describe() -> StructSchema;
}

/// Signature of a callable member of an interface type.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub returns: TypeRef,
}

impl Function {
    pub fn new(name: impl Into<String>, parameters: Vec<Parameter>, returns: TypeRef) -> Self {
        Self {
            name: name.into(),
            parameters,
            returns,
        }
    }

    /// Range of argument counts this function accepts.
    pub fn arity(&self) -> (usize, usize) {
        let required = self.parameters.iter().filter(|parameter| parameter.is_required()).count();
        (required, self.parameters.len())
    }

    pub fn accepts_argument_count(&self, count: usize) -> bool {
        let (min, max) = self.arity();
        (min..=max).contains(&count)
    }
}

/// A type declared in the type system: a data type, an interface, or both.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectType {
    /// Fully qualified name, for example `My::MyRes`.
    pub name: String,
    pub attributes: Vec<FieldSchema>,
    pub functions: Vec<Function>,
    pub tags: IndexMap<String, String>,
    pub annotations: IndexMap<String, Value>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            functions: Vec::new(),
            tags: IndexMap::new(),
            annotations: IndexMap::new(),
        }
    }

    /// Creates an interface type exposing the given functions.
    pub fn interface(name: impl Into<String>, functions: Vec<Function>) -> Self {
        Self {
            functions,
            ..Self::new(name)
        }
    }

    /// Looks up a callable member by name.
    pub fn member(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|function| function.name == name)
    }

    pub fn type_ref(&self) -> TypeRef {
        TypeRef::Named(self.name.clone())
    }

    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        if !self.attributes.is_empty() {
            let attributes = self
                .attributes
                .iter()
                .map(|field| {
                    let type_ref = if field.optional {
                        TypeRef::optional(field.type_ref.clone())
                    } else {
                        field.type_ref.clone()
                    };
                    (field.name.clone(), serde_json::Value::String(type_ref.to_string()))
                })
                .collect();
            map.insert("attributes".to_string(), serde_json::Value::Object(attributes));
        }
        if !self.functions.is_empty() {
            let functions = self
                .functions
                .iter()
                .map(|function| {
                    let parameters = function
                        .parameters
                        .iter()
                        .map(|parameter| serde_json::Value::String(parameter.type_ref.to_string()))
                        .collect();
                    let signature = serde_json::json!({
                        "parameters": serde_json::Value::Array(parameters),
                        "returns": function.returns.to_string(),
                    });
                    (function.name.clone(), signature)
                })
                .collect();
            map.insert("functions".to_string(), serde_json::Value::Object(functions));
        }
        if !self.annotations.is_empty() {
            let annotations = self
                .annotations
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect();
            map.insert("annotations".to_string(), serde_json::Value::Object(annotations));
        }
        if !self.tags.is_empty() {
            let tags = self
                .tags
                .iter()
                .map(|(key, value)| (key.clone(), serde_json::Value::String(value.clone())))
                .collect();
            map.insert("tags".to_string(), serde_json::Value::Object(tags));
        }
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_lookup_finds_declared_functions() {
        let interface = ObjectType::interface(
            "My::TheApi",
            vec![
                Function::new("first", vec![], TypeRef::String),
                Function::new("second", vec![Parameter::new("suffix", TypeRef::String)], TypeRef::String),
            ],
        );
        assert!(interface.member("first").is_some());
        assert_eq!(interface.member("second").map(Function::arity), Some((1, 1)));
        assert!(interface.member("third").is_none());
    }

    #[test]
    fn optional_parameters_widen_arity() {
        let function = Function::new(
            "greet",
            vec![
                Parameter::new("name", TypeRef::String),
                Parameter::new("greeting", TypeRef::String).with_optional(true),
            ],
            TypeRef::String,
        );
        assert!(function.accepts_argument_count(1));
        assert!(function.accepts_argument_count(2));
        assert!(!function.accepts_argument_count(0));
        assert!(!function.accepts_argument_count(3));
    }

    #[test]
    fn struct_schema_deserializes_with_typed_fields() {
        let yaml_text = r#"
name: Hosts
fields:
  - name: host_names
    type: Array[String]
  - name: region
    type: String
    optional: true
"#;
        let schema: StructSchema = serde_yaml::from_str(yaml_text).expect("deserialize schema");
        assert_eq!(schema.name, "Hosts");
        assert_eq!(schema.fields[0].type_ref, TypeRef::array_of(TypeRef::String));
        assert!(schema.fields[1].optional);
    }
}
