//! Errors raised by the service registry.

use loom_engine::ResolveError;
use loom_types::Namespace;
use thiserror::Error;

/// Registration and lookup failures of a [`crate::ServiceRegistry`].
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no type is registered for API implementation '{type_name}'")]
    ApiTypeNotRegistered { type_name: String },

    #[error("{namespace} '{name}' is already registered")]
    AlreadyRegistered { namespace: Namespace, name: String },

    #[error("no such API: {api}")]
    NoSuchApi { api: String },

    #[error("API '{api}' has no method '{method}'")]
    NoSuchMethod { api: String, method: String },

    #[error("no such state: {name}")]
    NoSuchState { name: String },

    #[error("no state converter registered, cannot produce state '{name}'")]
    NoStateConverter { name: String },

    #[error("{api}.{method} expects {expected} argument(s), got {actual}")]
    InvalidArguments {
        api: String,
        method: String,
        expected: String,
        actual: usize,
    },

    #[error("invocation of {api}.{method} failed: {source}")]
    InvocationFailed {
        api: String,
        method: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("state conversion of '{name}' failed: {source}")]
    StateConversion {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("registry lock poisoned: {0}")]
    Lock(String),
}
