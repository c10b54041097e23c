//! Conversion of registered resource states into domain objects.

use std::sync::Arc;

use indexmap::IndexMap;
use loom_engine::State;
use loom_types::{TypeRef, Value};

/// Maps a resource state and an input map to a domain object.
pub type StateConverter = Arc<dyn Fn(&State, &IndexMap<String, Value>) -> anyhow::Result<Value> + Send + Sync>;

/// A converter producing an object of the state's resource type.
///
/// The state's string-keyed attributes are copied first and entries of the
/// input map then override them. Non-hash state values are rejected.
pub fn object_state_converter() -> StateConverter {
    Arc::new(|state: &State, input: &IndexMap<String, Value>| -> anyhow::Result<Value> {
        let mut attributes: IndexMap<String, Value> = match &state.value {
            Value::Hash(entries) => entries
                .iter()
                .filter_map(|entry| entry.key.as_str().map(|key| (key.to_string(), entry.value.clone())))
                .collect(),
            Value::Object(object) => object.attributes.clone(),
            Value::Undef => IndexMap::new(),
            other => anyhow::bail!("state value must be a hash, got {other}"),
        };
        for (key, value) in input {
            attributes.insert(key.clone(), value.clone());
        }
        let type_name = match &state.resource_type {
            TypeRef::Named(name) => name.clone(),
            other => other.to_string(),
        };
        Ok(Value::object(type_name, attributes))
    })
}
