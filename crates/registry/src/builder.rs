//! Assembling a service registry from its parts.

use std::sync::Arc;

use indexmap::IndexMap;
use loom_engine::ActivityDescriptor;
use loom_types::{AnnotatedType, Describe, ObjectType, SCOPE_SEPARATOR, StructSchema, TypeSet, TypeSystem, qualify};
use tracing::info;

use crate::{
    Api, RegistryConfig, ResourceTypeBuilder, ServiceError, ServiceRegistry, StateConverter,
    config::DEFAULT_TYPE_SET_VERSION,
};

/// Collects the APIs, types, activities and state converter of a service.
///
/// Types are declared in a type set named after the first segment of the
/// service identifier, so `My::Service` declares `My::TheApi`, `My::MyRes`
/// and so on. Nothing is registered until [`ServiceBuilder::build`].
pub struct ServiceBuilder {
    type_system: Arc<dyn TypeSystem>,
    service_id: String,
    type_set_version: String,
    types: Vec<AnnotatedType>,
    apis: Vec<(String, Arc<dyn Api>)>,
    activities: Vec<ActivityDescriptor>,
    state_converter: Option<StateConverter>,
}

impl ServiceBuilder {
    pub fn new(type_system: Arc<dyn TypeSystem>, service_id: impl Into<String>) -> Self {
        Self {
            type_system,
            service_id: service_id.into(),
            type_set_version: DEFAULT_TYPE_SET_VERSION.to_string(),
            types: Vec::new(),
            apis: Vec::new(),
            activities: Vec::new(),
            state_converter: None,
        }
    }

    /// Creates a builder whose identifier and type set version may be overridden by `config`.
    pub fn from_config(type_system: Arc<dyn TypeSystem>, default_service_id: &str, config: &RegistryConfig) -> Self {
        let service_id = config.service_id.as_deref().unwrap_or(default_service_id);
        let mut builder = Self::new(type_system, service_id);
        builder.type_set_version = config.type_set_version.clone();
        builder
    }

    /// Name of the type set the service declares its types in.
    pub fn type_set_name(&self) -> &str {
        self.service_id
            .split(SCOPE_SEPARATOR)
            .next()
            .unwrap_or(&self.service_id)
    }

    /// Registers an API; its interface type is declared from [`Api::methods`].
    pub fn register_api<A: Api>(&mut self, name: impl Into<String>, api: A) -> &mut Self {
        self.apis.push((name.into(), Arc::new(api)));
        self
    }

    /// Declares plain data types.
    pub fn register_types<I>(&mut self, schemas: I) -> &mut Self
    where
        I: IntoIterator<Item = StructSchema>,
    {
        for schema in schemas {
            let annotated = self
                .type_system
                .new_annotated_type(schema, IndexMap::new(), IndexMap::new());
            self.types.push(annotated);
        }
        self
    }

    pub fn register_type<T: Describe>(&mut self) -> &mut Self {
        self.register_types([T::describe()])
    }

    /// Declares a resource type annotated through `configure`.
    pub fn register_resource_type<F>(&mut self, schema: StructSchema, configure: F) -> &mut Self
    where
        F: FnOnce(&mut ResourceTypeBuilder),
    {
        let mut resource_type = ResourceTypeBuilder::new(Arc::clone(&self.type_system));
        configure(&mut resource_type);
        self.types.push(resource_type.build(&schema));
        self
    }

    pub fn register_activity(&mut self, descriptor: impl Into<ActivityDescriptor>) -> &mut Self {
        self.activities.push(descriptor.into());
        self
    }

    pub fn register_state_converter(&mut self, converter: StateConverter) -> &mut Self {
        self.state_converter = Some(converter);
        self
    }

    /// Builds the registry: types first, then APIs, then activities in registration order.
    pub fn build(self) -> Result<ServiceRegistry, ServiceError> {
        let type_set_name = self.type_set_name().to_string();
        let type_set = TypeSet::new(&type_set_name, &self.type_set_version);
        let registry = ServiceRegistry::new(Arc::clone(&self.type_system), &self.service_id, type_set);

        for annotated in self.types {
            registry.add_type(annotated)?;
        }
        for (name, api) in self.apis {
            let interface = ObjectType::interface(qualify(&type_set_name, &name), api.methods());
            registry.add_interface(api.host_type(), interface)?;
            registry.add_shared_api(&name, api)?;
        }
        if let Some(converter) = self.state_converter {
            registry.set_state_converter(converter)?;
        }
        for descriptor in &self.activities {
            registry.register_activity(descriptor)?;
        }

        info!(service = %registry.identifier().name, "service built");
        Ok(registry)
    }
}
