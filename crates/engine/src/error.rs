//! Errors raised while resolving activity descriptors.

use loom_types::{ConditionError, TypeParseError};
use thiserror::Error;

/// Resolution failures. Resolution aborts on the first one; no partial graph is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("{type_name} is missing required field '{field}'")]
    MissingRequiredField { type_name: &'static str, field: &'static str },

    #[error("fields {} are mutually exclusive", .fields.join(" and "))]
    MutuallyExclusiveFields { fields: Vec<&'static str> },

    #[error("one of the fields {} is required", .fields.join(" or "))]
    RequireOneOfFields { fields: Vec<&'static str> },

    #[error("struct '{type_name}' must have exactly one field")]
    NotOneStructField { type_name: String },

    #[error("unknown activity kind '{kind}'")]
    UnknownActivity { kind: String },

    #[error("invalid condition on activity '{activity}': {source}")]
    InvalidCondition {
        activity: String,
        #[source]
        source: ConditionError,
    },

    #[error("invalid type for parameter '{parameter}': {source}")]
    InvalidType {
        parameter: String,
        #[source]
        source: TypeParseError,
    },

    #[error("duplicate activity '{name}'")]
    DuplicateActivity { name: String },
}
