//! The service registry.
//!
//! A [`ServiceRegistry`] hosts callable APIs, resolved activities and declared
//! types. All of its state sits behind one reader/writer lock. Lookups hold the
//! read lock only while they copy what they need, so callables always run with
//! no lock held, and every registration checks and commits inside a single
//! write section.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use indexmap::IndexMap;
use loom_engine::{Activity, ActivityDescriptor, ActivityKind, ActivityResolver, State};
use loom_types::{AnnotatedType, Definition, Namespace, ObjectType, TypeSet, TypeSystem, TypedName, Value};
use tracing::{debug, info};

use crate::{
    Api, CallError, Reply, ServiceError, StateConverter,
    definitions::{activity_definitions, callable_properties},
};

#[derive(Clone)]
struct Callable {
    interface: ObjectType,
    api: Arc<dyn Api>,
}

struct RegistryState {
    type_set: TypeSet,
    metadata: Vec<Definition>,
    identifiers: HashSet<TypedName>,
    states: HashMap<String, State>,
    callables: HashMap<String, Callable>,
    state_converter: Option<StateConverter>,
}

/// Thread-safe store of callables, resolved activities and declared types.
pub struct ServiceRegistry {
    type_system: Arc<dyn TypeSystem>,
    id: TypedName,
    state: RwLock<RegistryState>,
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry").field("id", &self.id).finish_non_exhaustive()
    }
}

impl ServiceRegistry {
    /// Creates an empty registry identified by `service_id` that declares its types in `type_set`.
    pub fn new(type_system: Arc<dyn TypeSystem>, service_id: &str, type_set: TypeSet) -> Self {
        let id = type_system.new_typed_name(Namespace::Service, service_id);
        Self {
            type_system,
            id,
            state: RwLock::new(RegistryState {
                type_set,
                metadata: Vec::new(),
                identifiers: HashSet::new(),
                states: HashMap::new(),
                callables: HashMap::new(),
                state_converter: None,
            }),
        }
    }

    pub fn identifier(&self) -> &TypedName {
        &self.id
    }

    pub fn type_system(&self) -> &Arc<dyn TypeSystem> {
        &self.type_system
    }

    /// Registers `api` under `name` and publishes its definition.
    ///
    /// The api's host type must have been mapped to an interface type first,
    /// see [`ServiceRegistry::add_interface`].
    pub fn add_api<A: Api>(&self, name: &str, api: A) -> Result<Definition, ServiceError> {
        self.add_shared_api(name, Arc::new(api))
    }

    /// Same as [`ServiceRegistry::add_api`] for an api that is already shared.
    pub fn add_shared_api(&self, name: &str, api: Arc<dyn Api>) -> Result<Definition, ServiceError> {
        let host_type = api.host_type();
        let interface = self
            .type_system
            .reflect_type(host_type)
            .ok_or_else(|| ServiceError::ApiTypeNotRegistered {
                type_name: host_type.to_string(),
            })?;
        let definition = Definition::new(
            self.type_system.new_typed_name(Namespace::Definition, name),
            self.id.clone(),
            callable_properties(interface.type_ref()),
        );

        let mut state = self.write()?;
        if state.callables.contains_key(name) || state.identifiers.contains(&definition.identifier) {
            return Err(ServiceError::AlreadyRegistered {
                namespace: Namespace::Interface,
                name: name.to_string(),
            });
        }
        info!(api = %name, interface = %interface.name, "api registered");
        state.callables.insert(name.to_string(), Callable { interface, api });
        state.identifiers.insert(definition.identifier.clone());
        state.metadata.push(definition.clone());
        Ok(definition)
    }

    /// Declares `interface` in the type set and maps `host_type` to it.
    pub fn add_interface(&self, host_type: &str, interface: ObjectType) -> Result<(), ServiceError> {
        let mut state = self.write()?;
        self.type_system.register_type(host_type, interface.clone());
        debug!(host_type = %host_type, interface = %interface.name, "interface declared");
        state.type_set.insert(interface);
        Ok(())
    }

    /// Declares an annotated data type in the type set and returns the declared type.
    pub fn add_type(&self, annotated: AnnotatedType) -> Result<ObjectType, ServiceError> {
        let mut state = self.write()?;
        let host_type = annotated.name().to_string();
        let object_type = annotated.into_object_type(&state.type_set.name);
        self.type_system.register_type(&host_type, object_type.clone());
        debug!(host_type = %host_type, type_name = %object_type.name, "type declared");
        state.type_set.insert(object_type.clone());
        Ok(object_type)
    }

    /// Resolves a top-level descriptor under the root scope and registers the result.
    pub fn register_activity(&self, descriptor: &ActivityDescriptor) -> Result<Definition, ServiceError> {
        let activity = ActivityResolver::new(Arc::clone(&self.type_system)).resolve(descriptor, "")?;
        self.add_activity(&activity)
    }

    /// Registers a resolved activity and returns its own definition.
    ///
    /// Definitions of nested workflow children are published before their
    /// parent. Every resource state in the tree becomes available to
    /// [`ServiceRegistry::state`]. Nothing is registered if any name is taken.
    pub fn add_activity(&self, activity: &Activity) -> Result<Definition, ServiceError> {
        let (own_definition, definitions) = activity_definitions(self.type_system.as_ref(), &self.id, activity);
        let mut states = Vec::new();
        collect_states(activity, &mut states);

        let mut state = self.write()?;
        let mut pending = HashSet::new();
        for definition in &definitions {
            if state.identifiers.contains(&definition.identifier) || !pending.insert(&definition.identifier) {
                return Err(ServiceError::AlreadyRegistered {
                    namespace: definition.identifier.namespace,
                    name: definition.identifier.name.clone(),
                });
            }
        }

        for (name, resource_state) in states {
            state.states.insert(name, resource_state);
        }
        for definition in &definitions {
            state.identifiers.insert(definition.identifier.clone());
        }
        state.metadata.extend(definitions.iter().cloned());
        info!(
            activity = %activity.name,
            definition_count = definitions.len(),
            "activity registered"
        );
        Ok(own_definition)
    }

    pub fn set_state_converter(&self, converter: StateConverter) -> Result<(), ServiceError> {
        self.write()?.state_converter = Some(converter);
        Ok(())
    }

    /// Converts the state registered for resource `name` using the state converter.
    pub fn state(&self, name: &str, input: &IndexMap<String, Value>) -> Result<Value, ServiceError> {
        let (converter, resource_state) = {
            let state = self.read()?;
            let converter = state
                .state_converter
                .clone()
                .ok_or_else(|| ServiceError::NoStateConverter { name: name.to_string() })?;
            let resource_state = state
                .states
                .get(name)
                .cloned()
                .ok_or_else(|| ServiceError::NoSuchState { name: name.to_string() })?;
            (converter, resource_state)
        };
        converter(&resource_state, input).map_err(|source| ServiceError::StateConversion {
            name: name.to_string(),
            source,
        })
    }

    /// Invokes `method` on the API registered as `api`.
    ///
    /// API names are title-cased before lookup, so `theApi` and `TheApi` name
    /// the same API. Errors the callable reports come back as [`Reply::Error`];
    /// any other failure is returned as [`ServiceError::InvocationFailed`].
    pub fn invoke(&self, api: &str, method: &str, arguments: &[Value]) -> Result<Reply, ServiceError> {
        let api_name = title_case(api);
        let callable = self
            .read()?
            .callables
            .get(&api_name)
            .cloned()
            .ok_or_else(|| ServiceError::NoSuchApi { api: api_name.clone() })?;

        let function = callable.interface.member(method).ok_or_else(|| ServiceError::NoSuchMethod {
            api: api_name.clone(),
            method: method.to_string(),
        })?;
        if !function.accepts_argument_count(arguments.len()) {
            let (min, max) = function.arity();
            let expected = if min == max { min.to_string() } else { format!("{min}..{max}") };
            return Err(ServiceError::InvalidArguments {
                api: api_name,
                method: method.to_string(),
                expected,
                actual: arguments.len(),
            });
        }

        debug!(api = %api_name, method = %method, argument_count = arguments.len(), "invoking api");
        match callable.api.call(method, arguments) {
            Ok(value) => Ok(Reply::Value(value)),
            Err(CallError::Reported(error)) => {
                debug!(api = %api_name, method = %method, error = %error, "api reported an error");
                Ok(Reply::Error(error))
            }
            Err(CallError::Failed(source)) => Err(ServiceError::InvocationFailed {
                api: api_name,
                method: method.to_string(),
                source,
            }),
        }
    }

    /// A snapshot of the declared types and the definitions in registration order.
    pub fn metadata(&self) -> Result<(TypeSet, Vec<Definition>), ServiceError> {
        let state = self.read()?;
        Ok((state.type_set.clone(), state.metadata.clone()))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, RegistryState>, ServiceError> {
        self.state.read().map_err(|error| ServiceError::Lock(error.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, RegistryState>, ServiceError> {
        self.state.write().map_err(|error| ServiceError::Lock(error.to_string()))
    }
}

/// Resource states in `activity`, keyed by the resource's qualified name.
fn collect_states(activity: &Activity, states: &mut Vec<(String, State)>) {
    match &activity.kind {
        ActivityKind::Resource { state } => states.push((activity.name.clone(), state.clone())),
        ActivityKind::Workflow { activities } => {
            for child in activities {
                collect_states(child, states);
            }
        }
        ActivityKind::Iterator { producer, .. } => collect_states(producer, states),
        ActivityKind::Action { .. } => {}
    }
}

/// Upper-cases the first letter of every word; any character other than a
/// letter, a digit or `_` separates words.
fn title_case(name: &str) -> String {
    let mut at_word_start = true;
    let mut titled = String::with_capacity(name.len());
    for character in name.chars() {
        if at_word_start {
            titled.extend(character.to_uppercase());
        } else {
            titled.push(character);
        }
        at_word_start = !(character.is_alphanumeric() || character == '_');
    }
    titled
}
