//! Value type identities.
//!
//! The persisted key of each type is stable; it is what the value-type
//! registry (see [`crate::evaluate::ValueTypeRegistry`]) is keyed by.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The type of a [`Value`](super::Value).
///
/// `Any` never describes a concrete value. It only appears in operator
/// signatures, where it accepts every concrete type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Any,
    Boolean,
    Integer,
    Double,
    String,
    Block,
    Operator,
}

impl ValueType {
    /// Every concrete (persistable) value type.
    pub const CONCRETE: [ValueType; 6] = [
        ValueType::Boolean,
        ValueType::Integer,
        ValueType::Double,
        ValueType::String,
        ValueType::Block,
        ValueType::Operator,
    ];

    /// Stable key used in persisted tags.
    pub fn key(self) -> &'static str {
        match self {
            ValueType::Any => "any",
            ValueType::Boolean => "boolean",
            ValueType::Integer => "integer",
            ValueType::Double => "double",
            ValueType::String => "string",
            ValueType::Block => "block",
            ValueType::Operator => "operator",
        }
    }

    pub fn from_key(key: &str) -> Option<ValueType> {
        match key {
            "any" => Some(ValueType::Any),
            "boolean" => Some(ValueType::Boolean),
            "integer" => Some(ValueType::Integer),
            "double" => Some(ValueType::Double),
            "string" => Some(ValueType::String),
            "block" => Some(ValueType::Block),
            "operator" => Some(ValueType::Operator),
            _ => None,
        }
    }

    /// Whether a value of type `other` may be passed where `self` is expected.
    pub fn accepts(self, other: ValueType) -> bool {
        self == ValueType::Any || self == other
    }

    /// RGB colour used when rendering values of this type.
    pub fn display_color(self) -> u32 {
        match self {
            ValueType::Any => 0xFF_FF_FF,
            ValueType::Boolean => 0x2B_7F_F6,
            ValueType::Integer => 0xE8_B9_19,
            ValueType::Double => 0xEB_6B_21,
            ValueType::String => 0x29_B2_1E,
            ValueType::Block => 0x8C_4E_1E,
            ValueType::Operator => 0x2B_BC_C2,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trip() {
        for ty in ValueType::CONCRETE {
            assert_eq!(ValueType::from_key(ty.key()), Some(ty));
        }
        assert_eq!(ValueType::from_key("nope"), None);
    }

    #[test]
    fn test_any_accepts_everything() {
        for ty in ValueType::CONCRETE {
            assert!(ValueType::Any.accepts(ty));
            assert!(ty.accepts(ty));
        }
        assert!(!ValueType::Integer.accepts(ValueType::Double));
    }
}
