//! # Loom Types
//!
//! Shared data model for the Loom workspace and the type system contract the
//! resolution engine and the service registry are written against.
//!
//! - [`Value`] is the typed value every host value is converted into.
//! - [`TypeRef`], [`StructSchema`] and [`ObjectType`] describe types.
//! - [`TypeSystem`] wraps host values, reflects registered host types and parses
//!   guard [`Condition`]s. [`DefaultTypeSystem`] is the JSON backed implementation.
//! - [`Definition`] and [`TypeSet`] make up the published metadata snapshot.

pub mod annotated;
pub mod condition;
pub mod definition;
pub mod parameter;
pub mod schema;
pub mod type_ref;
pub mod type_system;
pub mod typed_name;
pub mod value;

pub use annotated::{AnnotatedType, CUSTOM_DATA_ANNOTATION, RESOURCE_TYPE_ANNOTATION, TypeSet};
pub use condition::{Condition, ConditionError, Operand};
pub use definition::Definition;
pub use parameter::{Parameter, field_parameter_name, parameter_name};
pub use schema::{Describe, FieldSchema, Function, ObjectType, StructSchema};
pub use type_ref::{TypeParseError, TypeRef};
pub use type_system::{DefaultTypeSystem, TypeSystem};
pub use typed_name::{Namespace, SCOPE_SEPARATOR, TypedName, leaf_name, qualify};
pub use value::{ErrorValue, HashEntry, Object, Value};
