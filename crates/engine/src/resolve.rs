//! Resolution of activity descriptors into the resolved activity graph.
//!
//! Resolution is a pure, recursive computation over one descriptor tree. It
//! validates each descriptor, qualifies its name under the parent scope, binds
//! its parameters and normalizes its values. The first failure aborts the
//! whole resolution.

use std::{collections::HashSet, sync::Arc};

use loom_types::{Condition, TypeSystem, leaf_name, parameter_name, qualify};
use tracing::debug;

use crate::{
    ActionDescriptor, Activity, ActivityDescriptor, ActivityKind, CollectDescriptor, IterationStyle, ResolveError,
    ResourceDescriptor, State, WorkflowDescriptor,
    params::{as_params, bind_parameters, normalize_value, parse_declared_type},
};

/// Resolves descriptors against a type system.
#[derive(Clone)]
pub struct ActivityResolver {
    type_system: Arc<dyn TypeSystem>,
}

impl ActivityResolver {
    pub fn new(type_system: Arc<dyn TypeSystem>) -> Self {
        Self { type_system }
    }

    pub fn type_system(&self) -> &Arc<dyn TypeSystem> {
        &self.type_system
    }

    /// Resolves `descriptor` under `parent_scope`; an empty scope is the root.
    pub fn resolve(&self, descriptor: &ActivityDescriptor, parent_scope: &str) -> Result<Activity, ResolveError> {
        let activity = match descriptor {
            ActivityDescriptor::Action(action) => self.resolve_action(action, parent_scope),
            ActivityDescriptor::Resource(resource) => self.resolve_resource(resource, parent_scope),
            ActivityDescriptor::Workflow(workflow) => self.resolve_workflow(workflow, parent_scope),
            ActivityDescriptor::Collect(collect) => self.resolve_collect(collect, parent_scope),
        }?;
        debug!(
            activity = %activity.name,
            style = activity.style(),
            input_count = activity.input.len(),
            output_count = activity.output.len(),
            "activity resolved"
        );
        Ok(activity)
    }

    fn resolve_action(&self, action: &ActionDescriptor, parent_scope: &str) -> Result<Activity, ResolveError> {
        let name = qualified_name("Action", &action.name, parent_scope)?;
        Ok(Activity {
            when: self.guard(&name, action.when.as_deref())?,
            input: bind_parameters(self.type_system.as_ref(), &action.input)?,
            output: bind_parameters(self.type_system.as_ref(), &action.output)?,
            kind: ActivityKind::Action {
                interface: action.interface.clone().filter(|interface| !interface.is_empty()),
            },
            name,
        })
    }

    fn resolve_resource(&self, resource: &ResourceDescriptor, parent_scope: &str) -> Result<Activity, ResolveError> {
        let name = qualified_name("Resource", &resource.name, parent_scope)?;
        let state_spec = resource.state.as_ref().ok_or(ResolveError::MissingRequiredField {
            type_name: "Resource",
            field: "state",
        })?;
        let state = State {
            resource_type: parse_declared_type("state", &state_spec.resource_type)?,
            value: normalize_value(self.type_system.as_ref(), &state_spec.value)?,
        };
        Ok(Activity {
            when: self.guard(&name, resource.when.as_deref())?,
            input: bind_parameters(self.type_system.as_ref(), &resource.input)?,
            output: bind_parameters(self.type_system.as_ref(), &resource.output)?,
            kind: ActivityKind::Resource { state },
            name,
        })
    }

    fn resolve_workflow(&self, workflow: &WorkflowDescriptor, parent_scope: &str) -> Result<Activity, ResolveError> {
        let name = qualified_name("Workflow", &workflow.name, parent_scope)?;
        let when = self.guard(&name, workflow.when.as_deref())?;
        let input = bind_parameters(self.type_system.as_ref(), &workflow.input)?;
        let output = bind_parameters(self.type_system.as_ref(), &workflow.output)?;

        let mut seen = HashSet::new();
        let mut activities = Vec::with_capacity(workflow.activities.len());
        for child in &workflow.activities {
            let activity = self.resolve(child, &name)?;
            if !seen.insert(activity.name.clone()) {
                return Err(ResolveError::DuplicateActivity { name: activity.name });
            }
            activities.push(activity);
        }

        Ok(Activity {
            name,
            when,
            input,
            output,
            kind: ActivityKind::Workflow { activities },
        })
    }

    fn resolve_collect(&self, collect: &CollectDescriptor, parent_scope: &str) -> Result<Activity, ResolveError> {
        let name = qualified_name("Collect", &collect.name, parent_scope)?;

        let (style, source) = match (&collect.times, &collect.each) {
            (Some(_), Some(_)) => {
                return Err(ResolveError::MutuallyExclusiveFields {
                    fields: vec!["times", "each"],
                });
            }
            (Some(times), None) => (IterationStyle::Times, times),
            (None, Some(each)) => (IterationStyle::Each, each),
            (None, None) => {
                return Err(ResolveError::RequireOneOfFields {
                    fields: vec!["times", "each"],
                });
            }
        };
        let over = normalize_value(self.type_system.as_ref(), source)?;

        let body = collect.activity.as_deref().ok_or(ResolveError::MissingRequiredField {
            type_name: "Collect",
            field: "activity",
        })?;
        // The body takes over the collect's own name so both resolve to the same qualified name.
        let producer = self.resolve(&body.renamed(&collect.name), parent_scope)?;

        let as_spec = collect.as_spec.as_ref().ok_or(ResolveError::MissingRequiredField {
            type_name: "Collect",
            field: "as",
        })?;
        let variables = as_params(as_spec);

        let into = if collect.output.is_empty() {
            leaf_name(&name).to_string()
        } else {
            parameter_name(&collect.output)
        };

        Ok(Activity {
            when: self.guard(&name, collect.when.as_deref())?,
            input: Vec::new(),
            output: Vec::new(),
            kind: ActivityKind::Iterator {
                style,
                over,
                variables,
                producer: Box::new(producer),
                into,
            },
            name,
        })
    }

    fn guard(&self, activity: &str, when: Option<&str>) -> Result<Condition, ResolveError> {
        self.type_system
            .parse_condition(when.unwrap_or_default())
            .map_err(|source| ResolveError::InvalidCondition {
                activity: activity.to_string(),
                source,
            })
    }
}

fn qualified_name(type_name: &'static str, name: &str, parent_scope: &str) -> Result<String, ResolveError> {
    if name.is_empty() {
        return Err(ResolveError::MissingRequiredField { type_name, field: "name" });
    }
    Ok(qualify(parent_scope, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AsSpec, HostValue, ParameterSpec, StateSpec};
    use loom_types::{DefaultTypeSystem, Parameter, TypeRef, Value};
    use serde_json::json;

    fn resolver() -> ActivityResolver {
        ActivityResolver::new(Arc::new(DefaultTypeSystem::new()))
    }

    fn action(name: &str) -> ActivityDescriptor {
        ActionDescriptor {
            name: name.into(),
            ..Default::default()
        }
        .into()
    }

    fn collect(name: &str) -> CollectDescriptor {
        CollectDescriptor {
            name: name.into(),
            times: Some(HostValue::from(3_i64)),
            as_spec: Some(AsSpec::from("index")),
            activity: Some(Box::new(action("body"))),
            ..Default::default()
        }
    }

    #[test]
    fn empty_name_fails_for_every_kind() {
        let resolver = resolver();
        let descriptors: Vec<ActivityDescriptor> = vec![
            ActionDescriptor::default().into(),
            ResourceDescriptor {
                state: Some(StateSpec::new("My::MyRes", HostValue::Literal(json!({})))),
                ..Default::default()
            }
            .into(),
            WorkflowDescriptor::default().into(),
            collect("").into(),
        ];
        for descriptor in descriptors {
            let error = resolver.resolve(&descriptor, "P").expect_err("empty name must fail");
            assert_eq!(
                error,
                ResolveError::MissingRequiredField {
                    type_name: descriptor.type_name(),
                    field: "name",
                }
            );
        }
    }

    #[test]
    fn collect_requires_exactly_one_source() {
        let resolver = resolver();
        let mut both = collect("N");
        both.each = Some(HostValue::Literal(json!([1, 2])));
        assert!(matches!(
            resolver.resolve(&both.into(), ""),
            Err(ResolveError::MutuallyExclusiveFields { .. })
        ));

        let mut neither = collect("N");
        neither.times = None;
        assert!(matches!(
            resolver.resolve(&neither.into(), ""),
            Err(ResolveError::RequireOneOfFields { .. })
        ));
    }

    #[test]
    fn collect_is_qualified_under_its_parent_scope() {
        let resolver = resolver();
        let nested = resolver.resolve(&collect("N").into(), "P").expect("resolve nested collect");
        assert_eq!(nested.name, "P::N");
        let root = resolver.resolve(&collect("N").into(), "").expect("resolve root collect");
        assert_eq!(root.name, "N");
    }

    #[test]
    fn collect_builds_an_iterator_sharing_its_name_with_the_producer() {
        let resolver = resolver();
        let mut descriptor = collect("Hosts");
        descriptor.times = None;
        descriptor.each = Some(HostValue::input_field("host_names", TypeRef::array_of(TypeRef::String)));
        descriptor.output = "Results".into();
        descriptor.when = Some("enabled".into());

        let activity = resolver.resolve(&descriptor.into(), "Deploy").expect("resolve collect");
        assert_eq!(activity.when, Condition::Variable("enabled".into()));
        assert!(activity.input.is_empty() && activity.output.is_empty());
        let ActivityKind::Iterator {
            style,
            over,
            variables,
            producer,
            into,
        } = &activity.kind
        else {
            panic!("expected an iterator");
        };
        assert_eq!(*style, IterationStyle::Each);
        assert_eq!(
            over,
            &Value::from(Parameter::new("hostNames", TypeRef::array_of(TypeRef::String)))
        );
        assert_eq!(variables, &vec![Parameter::any("index")]);
        assert_eq!(producer.name, "Deploy::Hosts");
        assert_eq!(producer.style(), "action");
        assert_eq!(into, "results");
    }

    #[test]
    fn collect_output_defaults_to_leaf_name() {
        let activity = resolver().resolve(&collect("Hosts").into(), "Deploy").expect("resolve collect");
        let ActivityKind::Iterator { style, over, into, .. } = &activity.kind else {
            panic!("expected an iterator");
        };
        assert_eq!(*style, IterationStyle::Times);
        assert_eq!(over, &Value::Integer(3));
        assert_eq!(into, "Hosts");
    }

    #[test]
    fn collect_output_only_lowers_its_first_letter() {
        let mut descriptor = collect("Hosts");
        descriptor.output = "Host_results".into();
        let activity = resolver().resolve(&descriptor.into(), "").expect("resolve collect");
        let ActivityKind::Iterator { into, .. } = &activity.kind else {
            panic!("expected an iterator");
        };
        assert_eq!(into, "host_results");
    }

    #[test]
    fn collect_reports_missing_body_and_bindings() {
        let resolver = resolver();
        let mut without_body = collect("N");
        without_body.activity = None;
        assert_eq!(
            resolver.resolve(&without_body.into(), ""),
            Err(ResolveError::MissingRequiredField {
                type_name: "Collect",
                field: "activity",
            })
        );

        let mut without_as = collect("N");
        without_as.as_spec = None;
        assert_eq!(
            resolver.resolve(&without_as.into(), ""),
            Err(ResolveError::MissingRequiredField {
                type_name: "Collect",
                field: "as",
            })
        );
    }

    #[test]
    fn workflow_resolves_children_under_its_name() {
        let workflow = WorkflowDescriptor {
            name: "Test".into(),
            activities: vec![
                ResourceDescriptor {
                    name: "X".into(),
                    input: vec![ParameterSpec::new("a"), ParameterSpec::new("b")],
                    state: Some(StateSpec::new("My::MyRes", HostValue::Literal(json!({"name": "bob"})))),
                    ..Default::default()
                }
                .into(),
                action("Notify"),
            ],
            ..Default::default()
        };
        let activity = resolver().resolve(&workflow.into(), "").expect("resolve workflow");
        let names: Vec<&str> = activity.children().iter().map(|child| child.name.as_str()).collect();
        assert_eq!(names, vec!["Test::X", "Test::Notify"]);

        let resource = &activity.children()[0];
        assert_eq!(resource.input, vec![Parameter::any("a"), Parameter::any("b")]);
        let state = resource.state().expect("resource state");
        assert_eq!(state.resource_type, TypeRef::named("My::MyRes"));
        assert_eq!(state.value, Value::string_hash([("name", "bob")]));
    }

    #[test]
    fn workflow_rejects_duplicate_children() {
        let workflow = WorkflowDescriptor {
            name: "Test".into(),
            activities: vec![action("A"), action("A")],
            ..Default::default()
        };
        assert_eq!(
            resolver().resolve(&workflow.into(), ""),
            Err(ResolveError::DuplicateActivity { name: "Test::A".into() })
        );
    }

    #[test]
    fn resource_requires_state_and_valid_guard() {
        let resolver = resolver();
        let stateless = ResourceDescriptor {
            name: "X".into(),
            ..Default::default()
        };
        assert_eq!(
            resolver.resolve(&stateless.into(), ""),
            Err(ResolveError::MissingRequiredField {
                type_name: "Resource",
                field: "state",
            })
        );

        let guarded = ActionDescriptor {
            name: "A".into(),
            when: Some("a > b".into()),
            ..Default::default()
        };
        assert!(matches!(
            resolver.resolve(&guarded.into(), ""),
            Err(ResolveError::InvalidCondition { ref activity, .. }) if activity == "A"
        ));
    }
}
