//! Namespaced identifiers for registry entries.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Value;

/// Separator used by scoped (hierarchical) names.
pub const SCOPE_SEPARATOR: &str = "::";

/// Namespaces that registry identifiers live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    /// Published metadata records (APIs and activities).
    Definition,
    /// Service identities.
    Service,
    /// Callable interfaces exposed by a service.
    Interface,
    /// Declared data types.
    Type,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Definition => "definition",
            Namespace::Service => "service",
            Namespace::Interface => "interface",
            Namespace::Type => "type",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `(namespace, name)` pair identifying an API, definition, or service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypedName {
    pub namespace: Namespace,
    pub name: String,
}

impl TypedName {
    pub fn new(namespace: Namespace, name: impl Into<String>) -> Self {
        Self {
            namespace,
            name: name.into(),
        }
    }

    /// Returns the last `::` segment of the name.
    pub fn leaf(&self) -> &str {
        leaf_name(&self.name)
    }

    /// Returns everything before the last `::` segment, if the name is qualified.
    pub fn parent(&self) -> Option<&str> {
        self.name.rsplit_once(SCOPE_SEPARATOR).map(|(parent, _)| parent)
    }

    /// Converts the name into a typed object value.
    pub fn to_value(&self) -> Value {
        Value::object(
            "TypedName",
            [
                ("namespace".to_string(), Value::from(self.namespace.as_str())),
                ("name".to_string(), Value::from(self.name.as_str())),
            ],
        )
    }
}

impl fmt::Display for TypedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Joins `name` onto `scope`; an empty scope is the root.
pub fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}{SCOPE_SEPARATOR}{name}")
    }
}

/// Returns the last `::` segment of `name`.
pub fn leaf_name(name: &str) -> &str {
    name.rsplit_once(SCOPE_SEPARATOR).map(|(_, leaf)| leaf).unwrap_or(name)
}
