//! # Loom Registry
//!
//! Hosts callable APIs, resolved activities and declared types for one
//! service, publishes their metadata and dispatches invocations.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use loom_registry::{Api, CallError, Reply, ServiceBuilder};
//! use loom_types::{DefaultTypeSystem, Function, TypeRef, Value};
//!
//! struct Greeter;
//!
//! impl Api for Greeter {
//!     fn methods(&self) -> Vec<Function> {
//!         vec![Function::new("hello", vec![], TypeRef::String)]
//!     }
//!
//!     fn call(&self, _method: &str, _arguments: &[Value]) -> Result<Value, CallError> {
//!         Ok(Value::from("hello"))
//!     }
//! }
//!
//! let mut builder = ServiceBuilder::new(Arc::new(DefaultTypeSystem::new()), "My::Service");
//! builder.register_api("Greeter", Greeter);
//! let registry = builder.build()?;
//!
//! assert_eq!(registry.invoke("greeter", "hello", &[])?, Reply::Value(Value::from("hello")));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod api;
pub mod builder;
pub mod config;
pub mod definitions;
pub mod error;
pub mod resource_type;
pub mod service;
pub mod state;

pub use api::{Api, CallError, Reply};
pub use builder::ServiceBuilder;
pub use config::RegistryConfig;
pub use error::ServiceError;
pub use resource_type::{Relationship, ResourceTypeBuilder};
pub use service::ServiceRegistry;
pub use state::{StateConverter, object_state_converter};
