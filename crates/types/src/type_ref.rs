//! Textual type references such as `String`, `Array[Integer]`, or `My::MyRes`.
//!
//! Declared parameters and schema fields carry their type as text in authored
//! documents. This module parses that text into a [`TypeRef`] and renders it back
//! in canonical form, so a parsed reference always displays the way it would be
//! written by hand.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

use crate::typed_name::SCOPE_SEPARATOR;

/// Errors produced while parsing a type reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeParseError {
    #[error("type reference cannot be empty")]
    Empty,
    #[error("unbalanced brackets in type reference '{0}'")]
    Unbalanced(String),
    #[error("type '{name}' expects {expected} type argument(s), got {actual}")]
    WrongArity { name: String, expected: usize, actual: usize },
    #[error("'{0}' is not a valid type name")]
    InvalidName(String),
}

/// A reference to a type known to the type system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TypeRef {
    #[default]
    Any,
    Undef,
    Boolean,
    Integer,
    Float,
    String,
    Array(Box<TypeRef>),
    Hash(Box<TypeRef>, Box<TypeRef>),
    Optional(Box<TypeRef>),
    /// A declared object or interface type, by (possibly qualified) name.
    Named(String),
}

impl TypeRef {
    pub fn array_of(element: TypeRef) -> Self {
        TypeRef::Array(Box::new(element))
    }

    pub fn hash_of(key: TypeRef, value: TypeRef) -> Self {
        TypeRef::Hash(Box::new(key), Box::new(value))
    }

    pub fn optional(inner: TypeRef) -> Self {
        TypeRef::Optional(Box::new(inner))
    }

    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    /// True for `Optional[...]` and `Undef`, the types that accept a missing value.
    pub fn accepts_undef(&self) -> bool {
        matches!(self, TypeRef::Optional(_) | TypeRef::Undef | TypeRef::Any)
    }
}

impl FromStr for TypeRef {
    type Err = TypeParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(TypeParseError::Empty);
        }

        let (base, arguments) = match text.find('[') {
            Some(open) => {
                let inner = text[open + 1..]
                    .strip_suffix(']')
                    .ok_or_else(|| TypeParseError::Unbalanced(text.to_string()))?;
                let arguments = split_type_arguments(inner).ok_or_else(|| TypeParseError::Unbalanced(text.to_string()))?;
                let arguments = arguments
                    .into_iter()
                    .map(TypeRef::from_str)
                    .collect::<Result<Vec<_>, _>>()?;
                (text[..open].trim(), arguments)
            }
            None => {
                if text.contains(']') {
                    return Err(TypeParseError::Unbalanced(text.to_string()));
                }
                (text, Vec::new())
            }
        };

        let arity = |expected: &[usize]| {
            if expected.contains(&arguments.len()) {
                Ok(())
            } else {
                Err(TypeParseError::WrongArity {
                    name: base.to_string(),
                    expected: *expected.iter().max().unwrap_or(&0),
                    actual: arguments.len(),
                })
            }
        };

        let mut arguments_iter = arguments.iter().cloned();
        let type_ref = match base {
            "Any" => {
                arity(&[0])?;
                TypeRef::Any
            }
            "Undef" => {
                arity(&[0])?;
                TypeRef::Undef
            }
            "Boolean" => {
                arity(&[0])?;
                TypeRef::Boolean
            }
            "Integer" => {
                arity(&[0])?;
                TypeRef::Integer
            }
            "Float" => {
                arity(&[0])?;
                TypeRef::Float
            }
            "String" => {
                arity(&[0])?;
                TypeRef::String
            }
            "Array" => {
                arity(&[0, 1])?;
                TypeRef::array_of(arguments_iter.next().unwrap_or_default())
            }
            "Hash" => {
                arity(&[0, 2])?;
                let key = arguments_iter.next().unwrap_or_default();
                let value = arguments_iter.next().unwrap_or_default();
                TypeRef::hash_of(key, value)
            }
            "Optional" => {
                arity(&[1])?;
                TypeRef::optional(arguments_iter.next().unwrap_or_default())
            }
            other => {
                arity(&[0])?;
                if !is_valid_type_name(other) {
                    return Err(TypeParseError::InvalidName(other.to_string()));
                }
                TypeRef::Named(other.to_string())
            }
        };
        Ok(type_ref)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Any => f.write_str("Any"),
            TypeRef::Undef => f.write_str("Undef"),
            TypeRef::Boolean => f.write_str("Boolean"),
            TypeRef::Integer => f.write_str("Integer"),
            TypeRef::Float => f.write_str("Float"),
            TypeRef::String => f.write_str("String"),
            TypeRef::Array(element) if **element == TypeRef::Any => f.write_str("Array"),
            TypeRef::Array(element) => write!(f, "Array[{element}]"),
            TypeRef::Hash(key, value) if **key == TypeRef::Any && **value == TypeRef::Any => f.write_str("Hash"),
            TypeRef::Hash(key, value) => write!(f, "Hash[{key}, {value}]"),
            TypeRef::Optional(inner) => write!(f, "Optional[{inner}]"),
            TypeRef::Named(name) => f.write_str(name),
        }
    }
}

impl Serialize for TypeRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

/// Splits comma separated type arguments at bracket depth zero.
fn split_type_arguments(inner: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (index, character) in inner.char_indices() {
        match character {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            ',' if depth == 0 => {
                parts.push(inner[start..index].trim());
                start = index + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    let last = inner[start..].trim();
    if !last.is_empty() || !parts.is_empty() {
        parts.push(last);
    }
    Some(parts)
}

/// Type names are `::` separated segments that each start with an uppercase letter.
fn is_valid_type_name(name: &str) -> bool {
    name.split(SCOPE_SEPARATOR).all(|segment| {
        let mut characters = segment.chars();
        characters.next().is_some_and(|first| first.is_ascii_uppercase())
            && characters.all(|character| character.is_ascii_alphanumeric() || character == '_')
    })
}
