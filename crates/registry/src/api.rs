//! Callable APIs hosted by a service registry.

use std::fmt;

use loom_types::{ErrorValue, Function, Value};

/// A host object whose methods can be invoked through the registry.
///
/// Implementations describe their methods explicitly; the registry checks the
/// method name and argument count against the declared interface type before
/// calling [`Api::call`].
pub trait Api: Send + Sync + 'static {
    /// Signatures of the methods this API exposes.
    fn methods(&self) -> Vec<Function>;

    fn call(&self, method: &str, arguments: &[Value]) -> Result<Value, CallError>;

    /// Key under which the implementation's declared interface type is registered.
    fn host_type(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Failure raised by a callable.
#[derive(Debug)]
pub enum CallError {
    /// An error the callable reports to its invoker as an ordinary result.
    Reported(ErrorValue),
    /// Any other failure; it aborts the invocation.
    Failed(anyhow::Error),
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::Reported(error) => write!(f, "{error}"),
            CallError::Failed(error) => write!(f, "{error}"),
        }
    }
}

impl From<ErrorValue> for CallError {
    fn from(error: ErrorValue) -> Self {
        CallError::Reported(error)
    }
}

impl From<anyhow::Error> for CallError {
    fn from(error: anyhow::Error) -> Self {
        CallError::Failed(error)
    }
}

/// Outcome of a successful dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Value(Value),
    /// An error reported by the callable.
    Error(ErrorValue),
}

impl Reply {
    pub fn value(&self) -> Option<&Value> {
        match self {
            Reply::Value(value) => Some(value),
            Reply::Error(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }

    /// Converts the reply into a value; reported errors become `Error` objects.
    pub fn into_value(self) -> Value {
        match self {
            Reply::Value(value) => value,
            Reply::Error(error) => error.to_value(),
        }
    }
}
