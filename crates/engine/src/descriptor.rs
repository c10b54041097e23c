//! User-authored activity descriptors.
//!
//! Descriptors are the declarative input of resolution. They can be built in
//! code or loaded from YAML/JSON documents (see [`crate::document`]), where the
//! `kind` field selects the variant:
//!
//! ```yaml
//! kind: workflow
//! name: Test
//! activities:
//!   - kind: resource
//!     name: X
//!     input: [a, b]
//!     state:
//!       type: My::MyRes
//!       value: { name: bob }
//! ```

use loom_types::{Describe, FieldSchema, StructSchema, TypeRef};
use serde::Deserialize;
use serde_json::Value as JsonValue;

/// A user-authored activity of one of the four known kinds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivityDescriptor {
    Action(ActionDescriptor),
    Resource(ResourceDescriptor),
    Workflow(WorkflowDescriptor),
    Collect(CollectDescriptor),
}

/// Values accepted in the `kind` field of a descriptor document.
pub const ACTIVITY_KINDS: [&str; 4] = ["action", "resource", "workflow", "collect"];

impl ActivityDescriptor {
    pub fn name(&self) -> &str {
        match self {
            ActivityDescriptor::Action(action) => &action.name,
            ActivityDescriptor::Resource(resource) => &resource.name,
            ActivityDescriptor::Workflow(workflow) => &workflow.name,
            ActivityDescriptor::Collect(collect) => &collect.name,
        }
    }

    /// Type name used in error reports.
    pub fn type_name(&self) -> &'static str {
        match self {
            ActivityDescriptor::Action(_) => "Action",
            ActivityDescriptor::Resource(_) => "Resource",
            ActivityDescriptor::Workflow(_) => "Workflow",
            ActivityDescriptor::Collect(_) => "Collect",
        }
    }

    /// Returns a shallow copy carrying a different name.
    pub fn renamed(&self, name: &str) -> Self {
        let mut copy = self.clone();
        match &mut copy {
            ActivityDescriptor::Action(action) => action.name = name.to_string(),
            ActivityDescriptor::Resource(resource) => resource.name = name.to_string(),
            ActivityDescriptor::Workflow(workflow) => workflow.name = name.to_string(),
            ActivityDescriptor::Collect(collect) => collect.name = name.to_string(),
        }
        copy
    }
}

impl From<ActionDescriptor> for ActivityDescriptor {
    fn from(action: ActionDescriptor) -> Self {
        ActivityDescriptor::Action(action)
    }
}

impl From<ResourceDescriptor> for ActivityDescriptor {
    fn from(resource: ResourceDescriptor) -> Self {
        ActivityDescriptor::Resource(resource)
    }
}

impl From<WorkflowDescriptor> for ActivityDescriptor {
    fn from(workflow: WorkflowDescriptor) -> Self {
        ActivityDescriptor::Workflow(workflow)
    }
}

impl From<CollectDescriptor> for ActivityDescriptor {
    fn from(collect: CollectDescriptor) -> Self {
        ActivityDescriptor::Collect(collect)
    }
}

/// A single action, optionally implemented by a registered API.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ActionDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub when: Option<String>,
    #[serde(default)]
    pub input: Vec<ParameterSpec>,
    #[serde(default)]
    pub output: Vec<ParameterSpec>,
    /// Name of the API implementing the action.
    #[serde(default)]
    pub interface: Option<String>,
}

/// A resource whose desired state is described by `state`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ResourceDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub when: Option<String>,
    #[serde(default)]
    pub input: Vec<ParameterSpec>,
    #[serde(default)]
    pub output: Vec<ParameterSpec>,
    #[serde(default)]
    pub state: Option<StateSpec>,
}

/// A sub-workflow with an ordered list of child activities.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct WorkflowDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub when: Option<String>,
    #[serde(default)]
    pub input: Vec<ParameterSpec>,
    #[serde(default)]
    pub output: Vec<ParameterSpec>,
    #[serde(default)]
    pub activities: Vec<ActivityDescriptor>,
}

/// Applies `activity` once per iteration and collects the results into `output`.
///
/// Exactly one of `times` (a count) and `each` (a collection) must be set.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CollectDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub when: Option<String>,
    #[serde(default)]
    pub times: Option<HostValue>,
    #[serde(default)]
    pub each: Option<HostValue>,
    /// Variables bound for each iteration.
    #[serde(rename = "as", default)]
    pub as_spec: Option<AsSpec>,
    /// Name of the collected output; empty means the collect's own leaf name.
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub activity: Option<Box<ActivityDescriptor>>,
}

/// The desired state of a resource.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StateSpec {
    /// Declared resource type, for example `My::MyRes`.
    #[serde(rename = "type")]
    pub resource_type: String,
    pub value: HostValue,
}

impl StateSpec {
    pub fn new(resource_type: impl Into<String>, value: impl Into<HostValue>) -> Self {
        Self {
            resource_type: resource_type.into(),
            value: value.into(),
        }
    }
}

/// A declared input or output parameter.
///
/// In documents a bare string is shorthand for an untyped required parameter.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "ParameterSpecRepr")]
pub struct ParameterSpec {
    pub name: String,
    /// Type text; empty means `Any`.
    pub type_name: String,
    pub default: Option<JsonValue>,
    pub optional: bool,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn typed(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    pub fn with_default(mut self, default: JsonValue) -> Self {
        self.default = Some(default);
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ParameterSpecRepr {
    Name(String),
    Full {
        name: String,
        #[serde(rename = "type", default)]
        type_name: String,
        #[serde(default)]
        default: Option<JsonValue>,
        #[serde(default)]
        optional: bool,
    },
}

impl From<ParameterSpecRepr> for ParameterSpec {
    fn from(repr: ParameterSpecRepr) -> Self {
        match repr {
            ParameterSpecRepr::Name(name) => ParameterSpec::new(name),
            ParameterSpecRepr::Full {
                name,
                type_name,
                default,
                optional,
            } => ParameterSpec {
                name,
                type_name,
                default,
                optional,
            },
        }
    }
}

/// Iteration variable bindings of a collect.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AsSpec {
    Name(String),
    Names(Vec<String>),
    /// Each field of the struct names one variable.
    Struct(StructSchema),
}

impl From<&str> for AsSpec {
    fn from(name: &str) -> Self {
        AsSpec::Name(name.to_string())
    }
}

impl From<Vec<&str>> for AsSpec {
    fn from(names: Vec<&str>) -> Self {
        AsSpec::Names(names.into_iter().map(str::to_string).collect())
    }
}

/// A caller-side value that still has to be normalized into a typed value.
///
/// `Input` declares an implicit input parameter instead of a literal: a
/// single-field struct schema whose field becomes the parameter. In documents
/// it is written as `{ input: { name: count, type: Integer } }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "HostValueRepr")]
pub enum HostValue {
    Literal(JsonValue),
    List(Vec<HostValue>),
    Map(Vec<(HostValue, HostValue)>),
    Input(StructSchema),
}

impl HostValue {
    /// Declares an implicit input described by `T`, which must have exactly one field.
    pub fn input<T: Describe>() -> Self {
        HostValue::Input(T::describe())
    }

    /// Declares an implicit input parameter with the given name and type.
    pub fn input_field(name: &str, type_ref: TypeRef) -> Self {
        HostValue::Input(StructSchema::new(name).field(name, type_ref))
    }
}

impl From<JsonValue> for HostValue {
    fn from(literal: JsonValue) -> Self {
        HostValue::Literal(literal)
    }
}

impl From<i64> for HostValue {
    fn from(count: i64) -> Self {
        HostValue::Literal(JsonValue::from(count))
    }
}

impl From<&str> for HostValue {
    fn from(text: &str) -> Self {
        HostValue::Literal(JsonValue::from(text))
    }
}

impl From<Vec<HostValue>> for HostValue {
    fn from(items: Vec<HostValue>) -> Self {
        HostValue::List(items)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HostValueRepr {
    Input { input: FieldSchema },
    List(Vec<HostValue>),
    Literal(JsonValue),
}

impl From<HostValueRepr> for HostValue {
    fn from(repr: HostValueRepr) -> Self {
        match repr {
            HostValueRepr::Input { input } => HostValue::Input(StructSchema {
                name: input.name.clone(),
                fields: vec![input],
            }),
            HostValueRepr::List(items) => HostValue::List(items),
            HostValueRepr::Literal(literal) => HostValue::Literal(literal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_tagged_descriptors() {
        let yaml_text = r#"
kind: collect
name: Hosts
each: { input: { name: host_names, type: "Array[String]" } }
as: host
activity:
  kind: action
  name: ping
  input:
    - host
    - { name: retries, type: Integer, default: 3 }
"#;
        let descriptor: ActivityDescriptor = serde_yaml::from_str(yaml_text).expect("deserialize collect");
        let ActivityDescriptor::Collect(collect) = descriptor else {
            panic!("expected a collect descriptor");
        };
        assert_eq!(collect.name, "Hosts");
        assert_eq!(
            collect.each,
            Some(HostValue::Input(StructSchema::new("host_names").field("host_names", TypeRef::array_of(TypeRef::String))))
        );
        assert_eq!(collect.as_spec, Some(AsSpec::Name("host".into())));

        let Some(ActivityDescriptor::Action(action)) = collect.activity.as_deref() else {
            panic!("expected an action body");
        };
        assert_eq!(action.input[0], ParameterSpec::new("host"));
        assert_eq!(
            action.input[1],
            ParameterSpec::typed("retries", "Integer").with_default(json!(3))
        );
    }

    #[test]
    fn host_values_keep_literals_and_lists() {
        let value: HostValue = serde_json::from_value(json!([1, {"input": {"name": "n"}}])).expect("deserialize list");
        assert_eq!(
            value,
            HostValue::List(vec![
                HostValue::Literal(json!(1)),
                HostValue::Input(StructSchema::new("n").field("n", TypeRef::Any)),
            ])
        );
        let literal: HostValue = serde_json::from_value(json!({"a": 1})).expect("deserialize map literal");
        assert_eq!(literal, HostValue::Literal(json!({"a": 1})));
    }

    #[test]
    fn renamed_copies_leave_the_original_untouched() {
        let original = ActivityDescriptor::from(ActionDescriptor {
            name: "body".into(),
            ..Default::default()
        });
        let copy = original.renamed("Outer::Hosts");
        assert_eq!(copy.name(), "Outer::Hosts");
        assert_eq!(original.name(), "body");
        assert_eq!(copy.type_name(), "Action");
    }
}
