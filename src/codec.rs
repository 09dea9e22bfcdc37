//! Value codecs used for individual properties.
//!
//! Scalars map to JSON scalars. Sequences and maps honour the mapper's typing
//! policy: with default typing enabled a list becomes
//! `["java.util.ArrayList", [..]]` and a map carries its own `@class` entry.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{Error, MappingError, MappingErrorKind};
use crate::mapper::ObjectMapper;
use crate::typing::{self, ARRAY_LIST, TREE_MAP, TYPE_PROPERTY};

/// Conversion between a Rust value and its JSON form under a mapper's policy.
pub trait JsonCodec: Sized {
    /// Writes the value.
    fn encode(&self, mapper: &ObjectMapper) -> Value;

    /// Reads a value, failing with a mapping error on a shape mismatch.
    fn decode(value: Value, mapper: &ObjectMapper) -> Result<Self, Error>;
}

impl JsonCodec for String {
    fn encode(&self, _mapper: &ObjectMapper) -> Value {
        Value::String(self.clone())
    }

    fn decode(value: Value, _mapper: &ObjectMapper) -> Result<Self, Error> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(unexpected("a string", &other)),
        }
    }
}

impl JsonCodec for bool {
    fn encode(&self, _mapper: &ObjectMapper) -> Value {
        Value::Bool(*self)
    }

    fn decode(value: Value, _mapper: &ObjectMapper) -> Result<Self, Error> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(unexpected("a boolean", &other)),
        }
    }
}

impl JsonCodec for i32 {
    fn encode(&self, _mapper: &ObjectMapper) -> Value {
        Value::from(*self)
    }

    fn decode(value: Value, _mapper: &ObjectMapper) -> Result<Self, Error> {
        value
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| unexpected("a 32-bit integer", &value))
    }
}

impl<T: JsonCodec> JsonCodec for Option<T> {
    fn encode(&self, mapper: &ObjectMapper) -> Value {
        match self {
            Some(inner) => inner.encode(mapper),
            None => Value::Null,
        }
    }

    fn decode(value: Value, mapper: &ObjectMapper) -> Result<Self, Error> {
        match value {
            Value::Null => Ok(None),
            other => T::decode(other, mapper).map(Some),
        }
    }
}

impl<T: JsonCodec> JsonCodec for Vec<T> {
    fn encode(&self, mapper: &ObjectMapper) -> Value {
        encode_sequence(mapper, ARRAY_LIST, self.iter())
    }

    fn decode(value: Value, mapper: &ObjectMapper) -> Result<Self, Error> {
        decode_sequence(value, mapper)
    }
}

impl<T: JsonCodec> JsonCodec for BTreeMap<String, T> {
    fn encode(&self, mapper: &ObjectMapper) -> Value {
        encode_map(mapper, self, |value| value.encode(mapper))
    }

    fn decode(value: Value, mapper: &ObjectMapper) -> Result<Self, Error> {
        decode_map(value, mapper, |value| T::decode(value, mapper))
    }
}

/// Writes a sequence, wrapped as `[type_id, [..]]` when default typing is on.
pub fn encode_sequence<'a, T, I>(mapper: &ObjectMapper, type_id: &'static str, items: I) -> Value
where
    T: JsonCodec + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let elements = Value::Array(items.into_iter().map(|item| item.encode(mapper)).collect());
    if mapper.config().default_typing.is_enabled() {
        Value::Array(vec![Value::String(type_id.to_string()), elements])
    } else {
        elements
    }
}

/// Reads a sequence written by [`encode_sequence`], preserving element order.
pub fn decode_sequence<T: JsonCodec>(value: Value, mapper: &ObjectMapper) -> Result<Vec<T>, Error> {
    let elements = unwrap_sequence(value, mapper)?;
    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| T::decode(element, mapper).map_err(|e| e.within_index(index)))
        .collect()
}

/// Reads a plain string array, the shape used for final element types.
pub fn decode_string_array(value: Value) -> Result<Vec<String>, Error> {
    match value {
        Value::Array(elements) => elements
            .into_iter()
            .enumerate()
            .map(|(index, element)| match element {
                Value::String(s) => Ok(s),
                other => Err(unexpected("a string", &other).within_index(index)),
            })
            .collect(),
        other => Err(unexpected("an array of strings", &other)),
    }
}

/// Writes a plain string array.
pub fn encode_string_array(values: &[String]) -> Value {
    Value::Array(values.iter().cloned().map(Value::String).collect())
}

/// Writes a key-sorted map, carrying `@class` when default typing is on.
pub fn encode_map<K: Ord + AsRef<str>, V>(
    mapper: &ObjectMapper,
    entries: &BTreeMap<K, V>,
    encode_value: impl Fn(&V) -> Value,
) -> Value {
    let mut map = Map::new();
    if mapper.config().default_typing.is_enabled() {
        map.insert(TYPE_PROPERTY.to_string(), Value::String(TREE_MAP.to_string()));
    }
    for (key, value) in entries {
        map.insert(key.as_ref().to_string(), encode_value(value));
    }
    Value::Object(map)
}

/// Reads a map written by [`encode_map`].
pub fn decode_map<V>(
    value: Value,
    mapper: &ObjectMapper,
    decode_value: impl Fn(Value) -> Result<V, Error>,
) -> Result<BTreeMap<String, V>, Error> {
    let mut map = match value {
        Value::Object(map) => map,
        other => return Err(unexpected("an object", &other)),
    };

    match map.remove(TYPE_PROPERTY) {
        Some(Value::String(type_id)) if typing::is_map_type(&type_id) => {}
        Some(Value::String(type_id)) => return Err(unknown_collection(type_id)),
        Some(other) => return Err(unexpected("a map type id", &other).within(TYPE_PROPERTY)),
        None if mapper.config().default_typing.is_enabled() => {
            return Err(MappingError::new(
                MappingErrorKind::MissingTypeId { expected: TREE_MAP },
                "typed maps must carry their collection type",
            )
            .into());
        }
        None => {}
    }

    map.into_iter()
        .map(|(key, value)| {
            let decoded = decode_value(value).map_err(|e| e.within(&key))?;
            Ok((key, decoded))
        })
        .collect()
}

fn unwrap_sequence(value: Value, mapper: &ObjectMapper) -> Result<Vec<Value>, Error> {
    let elements = match value {
        Value::Array(elements) => elements,
        other => return Err(unexpected("an array", &other)),
    };
    if !mapper.config().default_typing.is_enabled() {
        return Ok(elements);
    }

    let mut wrapper = elements.into_iter();
    match (wrapper.next(), wrapper.next(), wrapper.next()) {
        (Some(Value::String(type_id)), Some(Value::Array(inner)), None) => {
            if typing::is_sequence_type(&type_id) {
                Ok(inner)
            } else {
                Err(unknown_collection(type_id))
            }
        }
        _ => Err(MappingError::new(
            MappingErrorKind::MissingTypeId {
                expected: ARRAY_LIST,
            },
            "typed collections must be written as [type id, elements]",
        )
        .into()),
    }
}

fn unknown_collection(type_id: String) -> Error {
    let message = format!("'{}' is not a known collection type", type_id);
    MappingError::new(MappingErrorKind::UnknownType { type_id }, message).into()
}

pub(crate) fn unexpected(expected: &str, found: &Value) -> Error {
    let found = match found {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    };
    MappingError::invalid(format!("expected {}, found {}", expected, found)).into()
}
