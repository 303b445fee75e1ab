//! Value-type registry: stable key → serializer, deserializer and default.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::builtin::{identity_operator, OperatorRegistry};
use super::operator::{flatten_curried, CurriedOperator, OperatorRef};
use super::serialize::ValueTag;
use crate::model::{BlockState, Value, ValueType};
use crate::{Error, Result};

type SerializeFn = fn(&ValueTypeRegistry, &Value) -> Result<String>;
type DeserializeFn = fn(&ValueTypeRegistry, &str) -> Result<Value>;

/// How one value type is persisted.
#[derive(Debug, Clone, Copy)]
pub struct ValueTypeDescriptor {
    pub value_type: ValueType,
    pub serialize: SerializeFn,
    pub deserialize: DeserializeFn,
    pub default: fn() -> Value,
}

/// Registry of value types, populated at startup.
///
/// Operator values are persisted by operator name, so the registry also
/// carries the operators they can refer to.
#[derive(Debug, Clone)]
pub struct ValueTypeRegistry {
    types: HashMap<String, ValueTypeDescriptor>,
    operators: OperatorRegistry,
}

impl ValueTypeRegistry {
    /// Empty registry over the given operators.
    pub fn new(operators: OperatorRegistry) -> Self {
        Self { types: HashMap::new(), operators }
    }

    /// Registry with every concrete value type and the builtin operators.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new(OperatorRegistry::with_builtins());
        for descriptor in default_descriptors() {
            registry.register(descriptor);
        }
        registry
    }

    pub fn register(&mut self, descriptor: ValueTypeDescriptor) {
        self.types.insert(descriptor.value_type.key().to_string(), descriptor);
    }

    pub fn get(&self, key: &str) -> Option<&ValueTypeDescriptor> {
        self.types.get(key)
    }

    pub fn descriptor(&self, value_type: ValueType) -> Option<&ValueTypeDescriptor> {
        self.get(value_type.key())
    }

    pub fn operators(&self) -> &OperatorRegistry {
        &self.operators
    }

    pub fn operators_mut(&mut self) -> &mut OperatorRegistry {
        &mut self.operators
    }

    /// Default value of the given type.
    pub fn default_value(&self, value_type: ValueType) -> Result<Value> {
        self.descriptor(value_type)
            .map(|d| (d.default)())
            .ok_or_else(|| Error::NotFound(format!("Value type {value_type}")))
    }

    /// Type-level serialization, without compression or size capping.
    pub fn serialize_plain(&self, value: &Value) -> Result<String> {
        let descriptor = self
            .descriptor(value.value_type())
            .ok_or_else(|| Error::Serialization(format!("unregistered value type {}", value.value_type())))?;
        (descriptor.serialize)(self, value)
    }

    /// Type-level deserialization, without decompression.
    pub fn deserialize_plain(&self, value_type: ValueType, raw: &str) -> Result<Value> {
        let descriptor = self
            .descriptor(value_type)
            .ok_or_else(|| Error::Deserialization(format!("unregistered value type {value_type}")))?;
        (descriptor.deserialize)(self, raw)
    }
}

impl Default for ValueTypeRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn mismatch(expected: ValueType, got: &Value) -> Error {
    Error::Serialization(format!("expected a {expected} value, got {}", got.value_type()))
}

fn unparsable(ty: ValueType, raw: &str) -> Error {
    Error::Deserialization(format!("cannot parse {raw:?} as {ty}"))
}

fn default_descriptors() -> Vec<ValueTypeDescriptor> {
    vec![
        ValueTypeDescriptor {
            value_type: ValueType::Boolean,
            serialize: |_, v| v.as_bool().map(|b| b.to_string()).ok_or_else(|| mismatch(ValueType::Boolean, v)),
            deserialize: |_, raw| raw.parse().map(Value::Boolean).map_err(|_| unparsable(ValueType::Boolean, raw)),
            default: || Value::Boolean(false),
        },
        ValueTypeDescriptor {
            value_type: ValueType::Integer,
            serialize: |_, v| v.as_int().map(|i| i.to_string()).ok_or_else(|| mismatch(ValueType::Integer, v)),
            deserialize: |_, raw| raw.parse().map(Value::Integer).map_err(|_| unparsable(ValueType::Integer, raw)),
            default: || Value::Integer(0),
        },
        ValueTypeDescriptor {
            value_type: ValueType::Double,
            serialize: |_, v| match v {
                Value::Double(d) => Ok(d.to_string()),
                other => Err(mismatch(ValueType::Double, other)),
            },
            deserialize: |_, raw| raw.parse().map(Value::Double).map_err(|_| unparsable(ValueType::Double, raw)),
            default: || Value::Double(0.0),
        },
        ValueTypeDescriptor {
            value_type: ValueType::String,
            serialize: |_, v| v.as_str().map(str::to_string).ok_or_else(|| mismatch(ValueType::String, v)),
            deserialize: |_, raw| Ok(Value::String(raw.to_string())),
            default: || Value::String(String::new()),
        },
        ValueTypeDescriptor {
            value_type: ValueType::Block,
            serialize: |_, v| match v {
                Value::Block(block) => Ok(format!("{}${}", block.id, block.meta)),
                other => Err(mismatch(ValueType::Block, other)),
            },
            deserialize: |_, raw| deserialize_block(raw),
            default: || Value::Block(BlockState::air()),
        },
        ValueTypeDescriptor {
            value_type: ValueType::Operator,
            serialize: serialize_operator,
            deserialize: deserialize_operator,
            default: || Value::Operator(identity_operator()),
        },
    ]
}

fn deserialize_block(raw: &str) -> Result<Value> {
    let (id, meta) = raw
        .rsplit_once('$')
        .ok_or_else(|| Error::Deserialization(format!("Something went wrong while deserializing '{raw}'")))?;
    let meta = meta
        .parse()
        .map_err(|_| Error::Deserialization(format!("Something went wrong while deserializing '{raw}'")))?;
    if id.is_empty() {
        return Err(Error::Deserialization(format!("Something went wrong while deserializing '{raw}'")));
    }
    Ok(Value::Block(BlockState::new(id, meta)))
}

/// Persisted shape of an operator value: the base operator by name plus
/// the flattened bound prefix of any currying applied to it.
#[derive(Debug, Serialize, Deserialize)]
struct OperatorPayload {
    operator: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    bound: Vec<ValueTag>,
}

fn serialize_operator(registry: &ValueTypeRegistry, value: &Value) -> Result<String> {
    let operator = value.as_operator().ok_or_else(|| mismatch(ValueType::Operator, value))?;
    let (base, bound) = flatten_curried(operator);
    if registry.operators.get(base.name()).is_none() {
        return Err(Error::Serialization(format!("operator {} is not registered", base.name())));
    }
    let bound = bound
        .iter()
        .map(|v| {
            Ok(ValueTag {
                value_type: v.value_type().key().to_string(),
                value: registry.serialize_plain(v)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let payload = OperatorPayload { operator: base.name().to_string(), bound };
    Ok(serde_json::to_string(&payload)?)
}

fn deserialize_operator(registry: &ValueTypeRegistry, raw: &str) -> Result<Value> {
    let payload: OperatorPayload = serde_json::from_str(raw)?;
    let base = registry
        .operators
        .get(&payload.operator)
        .cloned()
        .ok_or_else(|| Error::Deserialization(format!("unknown operator {}", payload.operator)))?;
    if payload.bound.is_empty() {
        return Ok(Value::Operator(base));
    }
    if payload.bound.len() >= base.required_input_length() {
        return Err(Error::Deserialization(format!(
            "operator {} takes {} inputs but {} are bound",
            payload.operator,
            base.required_input_length(),
            payload.bound.len()
        )));
    }
    let bound = payload
        .bound
        .iter()
        .map(|tag| {
            let ty = ValueType::from_key(&tag.value_type)
                .ok_or_else(|| Error::Deserialization(format!("unknown value type {}", tag.value_type)))?;
            registry.deserialize_plain(ty, &tag.value)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Value::Operator(Arc::new(CurriedOperator::new(base, bound))))
}
