//! Parameter binding and host value normalization.
//!
//! Declared names keep their spelling apart from a lower-cased first letter,
//! so `HostNames` binds as `hostNames` and `z_index` as `z_index`. Struct
//! fields are lower-camel-cased, so a field `host_names` binds as `hostNames`.

use loom_types::{HashEntry, Parameter, StructSchema, TypeRef, TypeSystem, Value, field_parameter_name, parameter_name};

use crate::{AsSpec, HostValue, ParameterSpec, ResolveError};

/// Derives the ordered iteration variables of an `as` declaration.
pub fn as_params(spec: &AsSpec) -> Vec<Parameter> {
    match spec {
        AsSpec::Name(name) => vec![param_from_name(name)],
        AsSpec::Names(names) => names.iter().map(|name| param_from_name(name)).collect(),
        AsSpec::Struct(schema) => params_from_struct(schema),
    }
}

/// One required parameter of type `Any`.
pub fn param_from_name(name: &str) -> Parameter {
    Parameter::any(parameter_name(name))
}

/// One parameter per struct field, in field order.
pub fn params_from_struct(schema: &StructSchema) -> Vec<Parameter> {
    schema
        .fields
        .iter()
        .map(|field| Parameter::new(field_parameter_name(&field.name), field.type_ref.clone()).with_optional(field.optional))
        .collect()
}

/// The single parameter described by a one-field struct.
pub fn param_from_struct(schema: &StructSchema) -> Result<Parameter, ResolveError> {
    let mut params = params_from_struct(schema);
    if params.len() != 1 {
        return Err(ResolveError::NotOneStructField {
            type_name: schema.name.clone(),
        });
    }
    Ok(params.remove(0))
}

/// Converts a host value into a typed value.
///
/// Implicit inputs become parameter values; lists and maps are normalized
/// element by element with their order preserved. Everything else is wrapped
/// by the type system.
pub fn normalize_value(type_system: &dyn TypeSystem, host: &HostValue) -> Result<Value, ResolveError> {
    match host {
        HostValue::Input(schema) => param_from_struct(schema).map(Value::from),
        HostValue::List(items) => items
            .iter()
            .map(|item| normalize_value(type_system, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        HostValue::Map(entries) => entries
            .iter()
            .map(|(key, value)| {
                Ok(HashEntry {
                    key: normalize_value(type_system, key)?,
                    value: normalize_value(type_system, value)?,
                })
            })
            .collect::<Result<Vec<_>, ResolveError>>()
            .map(Value::Hash),
        HostValue::Literal(literal) => Ok(type_system.wrap_value(literal)),
    }
}

/// Binds declared input or output parameters, keeping declaration order.
pub fn bind_parameters(type_system: &dyn TypeSystem, specs: &[ParameterSpec]) -> Result<Vec<Parameter>, ResolveError> {
    specs
        .iter()
        .map(|spec| {
            let name = parameter_name(&spec.name);
            let type_ref = parse_declared_type(&name, &spec.type_name)?;
            let mut parameter = Parameter::new(name, type_ref).with_optional(spec.optional);
            if let Some(default) = &spec.default {
                parameter = parameter.with_default(type_system.wrap_value(default));
            }
            Ok(parameter)
        })
        .collect()
}

pub(crate) fn parse_declared_type(parameter: &str, type_name: &str) -> Result<TypeRef, ResolveError> {
    if type_name.trim().is_empty() {
        return Ok(TypeRef::Any);
    }
    type_name.parse().map_err(|source| ResolveError::InvalidType {
        parameter: parameter.to_string(),
        source,
    })
}
