//! Published definitions of resolved activities.

use indexmap::IndexMap;
use loom_engine::{Activity, ActivityKind};
use loom_types::{Definition, Namespace, Parameter, TypeRef, TypeSystem, TypedName, Value};

/// Builds the activity's own definition and every definition published for it.
///
/// The published list holds nested workflow children first (post-order) and
/// the activity's own definition last. An iterator's producer is embedded in
/// the iterator's definition and not published separately.
pub fn activity_definitions(
    type_system: &dyn TypeSystem,
    service_id: &TypedName,
    activity: &Activity,
) -> (Definition, Vec<Definition>) {
    let builder = DefinitionBuilder { type_system, service_id };
    let mut published = Vec::new();
    let definition = builder.build(activity, &mut published);
    (definition, published)
}

/// Properties of the definition published for an API.
pub fn callable_properties(interface: TypeRef) -> IndexMap<String, Value> {
    let mut properties = IndexMap::new();
    properties.insert("interface".to_string(), Value::Type(interface));
    properties.insert("style".to_string(), Value::from("callable"));
    properties
}

struct DefinitionBuilder<'a> {
    type_system: &'a dyn TypeSystem,
    service_id: &'a TypedName,
}

impl DefinitionBuilder<'_> {
    fn build(&self, activity: &Activity, published: &mut Vec<Definition>) -> Definition {
        let mut properties = IndexMap::new();
        if !activity.input.is_empty() {
            properties.insert("input".to_string(), parameter_list(&activity.input));
        }
        if !activity.output.is_empty() {
            properties.insert("output".to_string(), parameter_list(&activity.output));
        }

        match &activity.kind {
            ActivityKind::Action { interface } => {
                if let Some(interface) = interface {
                    properties.insert("interface".to_string(), Value::from(interface.as_str()));
                }
            }
            ActivityKind::Resource { state } => {
                properties.insert("resourceType".to_string(), Value::Type(state.resource_type.clone()));
            }
            ActivityKind::Workflow { activities } => {
                let children = activities
                    .iter()
                    .map(|child| self.build(child, published).to_value())
                    .collect();
                properties.insert("activities".to_string(), Value::Array(children));
            }
            ActivityKind::Iterator {
                style,
                over,
                variables,
                producer,
                into,
            } => {
                let mut embedded = Vec::new();
                let producer = self.build(producer, &mut embedded);
                properties.insert("iterationStyle".to_string(), Value::from(style.as_str()));
                properties.insert("over".to_string(), over.clone());
                properties.insert("variables".to_string(), parameter_list(variables));
                properties.insert("producer".to_string(), producer.to_value());
                properties.insert("into".to_string(), Value::from(into.as_str()));
            }
        }

        if !activity.when.is_always() {
            properties.insert("when".to_string(), Value::from(activity.when.to_string()));
        }
        properties.insert("style".to_string(), Value::from(activity.style()));

        let definition = Definition::new(
            self.type_system.new_typed_name(Namespace::Definition, &activity.name),
            self.service_id.clone(),
            properties,
        );
        published.push(definition.clone());
        definition
    }
}

fn parameter_list(parameters: &[Parameter]) -> Value {
    Value::Array(parameters.iter().cloned().map(Value::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use loom_engine::{
        ActionDescriptor, ActivityResolver, AsSpec, CollectDescriptor, HostValue, WorkflowDescriptor,
    };
    use loom_types::DefaultTypeSystem;
    use serde_json::json;

    fn resolve(descriptor: loom_engine::ActivityDescriptor) -> Activity {
        ActivityResolver::new(Arc::new(DefaultTypeSystem::new()))
            .resolve(&descriptor, "")
            .expect("resolve descriptor")
    }

    #[test]
    fn iterator_embeds_its_producer() {
        let activity = resolve(
            CollectDescriptor {
                name: "Pings".into(),
                times: Some(HostValue::from(2_i64)),
                as_spec: Some(AsSpec::from("attempt")),
                when: Some("enabled".into()),
                activity: Some(Box::new(
                    ActionDescriptor {
                        name: "ping".into(),
                        interface: Some("TheApi".into()),
                        ..Default::default()
                    }
                    .into(),
                )),
                ..Default::default()
            }
            .into(),
        );
        let service_id = TypedName::new(Namespace::Service, "My::Service");
        let (_, definitions) = activity_definitions(&DefaultTypeSystem::new(), &service_id, &activity);

        assert_eq!(definitions.len(), 1);
        let json = definitions[0].to_json();
        assert_eq!(json["identifier"]["name"], json!("Pings"));
        assert_eq!(json["properties"]["style"], json!("iterator"));
        assert_eq!(json["properties"]["iterationStyle"], json!("times"));
        assert_eq!(json["properties"]["over"], json!(2));
        assert_eq!(json["properties"]["into"], json!("Pings"));
        assert_eq!(json["properties"]["when"], json!("enabled"));
        assert_eq!(json["properties"]["variables"], json!([{"name": "attempt", "type": "Any"}]));
        assert_eq!(json["properties"]["producer"]["properties"]["interface"], json!("TheApi"));
        assert_eq!(json["properties"]["producer"]["properties"]["style"], json!("action"));
    }

    #[test]
    fn workflow_children_are_published_before_the_workflow() {
        let activity = resolve(
            WorkflowDescriptor {
                name: "Outer".into(),
                activities: vec![
                    WorkflowDescriptor {
                        name: "Inner".into(),
                        activities: vec![
                            ActionDescriptor {
                                name: "A".into(),
                                ..Default::default()
                            }
                            .into(),
                        ],
                        ..Default::default()
                    }
                    .into(),
                ],
                ..Default::default()
            }
            .into(),
        );
        let service_id = TypedName::new(Namespace::Service, "My::Service");
        let (_, definitions) = activity_definitions(&DefaultTypeSystem::new(), &service_id, &activity);
        let names: Vec<&str> = definitions.iter().map(|definition| definition.identifier.name.as_str()).collect();
        assert_eq!(names, vec!["Outer::Inner::A", "Outer::Inner", "Outer"]);
        assert_eq!(definitions[2].style(), Some("workflow"));
        assert!(definitions[2].property("when").is_none());
    }
}
