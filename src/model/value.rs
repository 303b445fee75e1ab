//! Immutable, typed values flowing through a network.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ValueType;
use crate::evaluate::{operators_equal, OperatorRef};

/// An addressable-resource value: a block identifier plus its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockState {
    pub id: String,
    pub meta: i32,
}

impl BlockState {
    pub fn new(id: impl Into<String>, meta: i32) -> Self {
        Self { id: id.into(), meta }
    }

    /// The empty block, used as the block type's default value.
    pub fn air() -> Self {
        Self::new("minecraft:air", 0)
    }
}

/// A typed unit of data.
///
/// Two values are equal iff they have the same type and the same payload.
/// Operator values compare by base operator name and bound prefix.
#[derive(Debug, Clone)]
pub enum Value {
    Boolean(bool),
    Integer(i32),
    Double(f64),
    String(String),
    Block(BlockState),
    Operator(OperatorRef),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Boolean(_) => ValueType::Boolean,
            Value::Integer(_) => ValueType::Integer,
            Value::Double(_) => ValueType::Double,
            Value::String(_) => ValueType::String,
            Value::Block(_) => ValueType::Block,
            Value::Operator(_) => ValueType::Operator,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            Value::Integer(i) => Some(f64::from(*i)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_operator(&self) -> Option<&OperatorRef> {
        match self {
            Value::Operator(op) => Some(op),
            _ => None,
        }
    }

    /// Short human-readable rendering, as shown on displays.
    pub fn to_compact_string(&self) -> String {
        match self {
            Value::Boolean(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Double(d) => d.to_string(),
            Value::String(s) => s.clone(),
            Value::Block(b) => b.id.clone(),
            Value::Operator(op) => op.name().to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Block(a), Value::Block(b)) => a == b,
            (Value::Operator(a), Value::Operator(b)) => operators_equal(a, b),
            _ => false,
        }
    }
}

/// Null-aware equality: two absent values are equal, one absent and one
/// present are not.
pub fn values_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<bool> for Value { fn from(v: bool) -> Self { Value::Boolean(v) } }
impl From<i32> for Value { fn from(v: i32) -> Self { Value::Integer(v) } }
impl From<f64> for Value { fn from(v: f64) -> Self { Value::Double(v) } }
impl From<String> for Value { fn from(v: String) -> Self { Value::String(v) } }
impl From<&str> for Value { fn from(v: &str) -> Self { Value::String(v.to_owned()) } }
impl From<BlockState> for Value { fn from(v: BlockState) -> Self { Value::Block(v) } }
impl From<OperatorRef> for Value { fn from(v: OperatorRef) -> Self { Value::Operator(v) } }

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "\"{}\"", s.replace('"', "\\\"")),
            Value::Block(b) => write!(f, "{}${}", b.id, b.meta),
            other => f.write_str(&other.to_compact_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_from() {
        assert_eq!(Value::from("hello"), Value::String("hello".into()));
        assert_eq!(Value::from(42), Value::Integer(42));
        assert_eq!(Value::from(2.5), Value::Double(2.5));
        assert_eq!(Value::from(true), Value::Boolean(true));
    }

    #[test]
    fn test_equality_requires_same_type() {
        assert_ne!(Value::Integer(1), Value::Double(1.0));
        assert_ne!(Value::from("1"), Value::Integer(1));
    }

    #[test]
    fn test_null_aware_equality() {
        let one = Value::Integer(1);
        assert!(values_equal(None, None));
        assert!(!values_equal(Some(&one), None));
        assert!(!values_equal(None, Some(&one)));
        assert!(values_equal(Some(&one), Some(&Value::Integer(1))));
    }

    #[test]
    fn test_compact_string() {
        assert_eq!(Value::Block(BlockState::new("minecraft:stone", 2)).to_compact_string(), "minecraft:stone");
        assert_eq!(Value::from("x").to_compact_string(), "x");
        assert_eq!(Value::from("x").to_string(), "\"x\"");
    }
}
