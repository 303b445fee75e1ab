//! Persisted value strings.
//!
//! A value is persisted as a [`ValueTag`]: the value type's key plus the
//! type-level serialization passed through the [`SlashTranscoder`]. Values
//! whose compressed form reaches the configured maximum size are replaced by
//! [`TOO_LONG`] and come back as the type's default value.

use serde::{Deserialize, Serialize};

use super::transcode::SlashTranscoder;
use super::types::ValueTypeRegistry;
use crate::config::EngineConfig;
use crate::model::{Value, ValueType};
use crate::{Error, Result};

/// Sentinel stored instead of an oversized value.
pub const TOO_LONG: &str = "TOO LONG";

/// The persisted form of a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueTag {
    #[serde(rename = "valueType")]
    pub value_type: String,
    pub value: String,
}

/// Serialize a value to its persisted string: type serialization, then
/// compression, then the size cap.
pub fn serialize_raw(registry: &ValueTypeRegistry, config: &EngineConfig, value: &Value) -> Result<String> {
    let raw = registry.serialize_plain(value)?;
    let raw = SlashTranscoder::from_config(config).compress(&raw);
    if raw.len() >= config.max_value_byte_size {
        tracing::debug!(
            value_type = %value.value_type(),
            len = raw.len(),
            max = config.max_value_byte_size,
            "value too long to persist, storing sentinel"
        );
        return Ok(TOO_LONG.to_string());
    }
    Ok(raw)
}

/// Inverse of [`serialize_raw`]. The oversize sentinel yields the type's
/// default value.
pub fn deserialize_raw(
    registry: &ValueTypeRegistry,
    config: &EngineConfig,
    value_type: ValueType,
    raw: &str,
) -> Result<Value> {
    if raw == TOO_LONG {
        return registry.default_value(value_type);
    }
    let raw = SlashTranscoder::from_config(config).decompress(raw)?;
    registry.deserialize_plain(value_type, &raw)
}

/// Serialize a value into a persisted tag.
pub fn serialize_value(registry: &ValueTypeRegistry, config: &EngineConfig, value: &Value) -> Result<ValueTag> {
    Ok(ValueTag {
        value_type: value.value_type().key().to_string(),
        value: serialize_raw(registry, config, value)?,
    })
}

/// Deserialize a persisted tag. An unknown value-type key yields `Ok(None)`;
/// a malformed payload for a known type is an error.
pub fn deserialize_value(registry: &ValueTypeRegistry, config: &EngineConfig, tag: &ValueTag) -> Result<Option<Value>> {
    let Some(descriptor) = registry.get(&tag.value_type) else {
        tracing::debug!(value_type = %tag.value_type, "unknown value type in persisted tag");
        return Ok(None);
    };
    deserialize_raw(registry, config, descriptor.value_type, &tag.value).map(Some)
}

/// Persist a tag as JSON.
pub fn tag_to_json(tag: &ValueTag) -> Result<String> {
    serde_json::to_string(tag).map_err(Error::from)
}

pub fn tag_from_json(json: &str) -> Result<ValueTag> {
    serde_json::from_str(json).map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BlockState;

    fn small_config() -> EngineConfig {
        EngineConfig { max_value_byte_size: 200, ..EngineConfig::default() }
    }

    #[test]
    fn test_tag_shape() {
        let registry = ValueTypeRegistry::with_defaults();
        let tag = serialize_value(&registry, &EngineConfig::default(), &Value::Integer(12)).unwrap();
        assert_eq!(tag, ValueTag { value_type: "integer".into(), value: "12".into() });
        assert_eq!(tag_to_json(&tag).unwrap(), r#"{"valueType":"integer","value":"12"}"#);
    }

    #[test]
    fn test_block_tag_round_trip() {
        let registry = ValueTypeRegistry::with_defaults();
        let config = EngineConfig::default();
        let block = Value::Block(BlockState::new("minecraft:log", 2));
        let json = tag_to_json(&serialize_value(&registry, &config, &block).unwrap()).unwrap();
        let restored = deserialize_value(&registry, &config, &tag_from_json(&json).unwrap()).unwrap();
        assert_eq!(restored, Some(block));
    }

    #[test]
    fn test_oversize_value_becomes_default() {
        let registry = ValueTypeRegistry::with_defaults();
        let config = small_config();
        let long = Value::String("x".repeat(500));
        let tag = serialize_value(&registry, &config, &long).unwrap();
        assert_eq!(tag.value, TOO_LONG);
        let restored = deserialize_value(&registry, &config, &tag).unwrap();
        assert_eq!(restored, Some(Value::String(String::new())));
    }

    #[test]
    fn test_compressed_value_fits() {
        let registry = ValueTypeRegistry::with_defaults();
        let config = small_config();
        let slashes = Value::String(format!("a{}b", "\\".repeat(300)));
        let tag = serialize_value(&registry, &config, &slashes).unwrap();
        assert_ne!(tag.value, TOO_LONG);
        assert!(tag.value.len() < config.max_value_byte_size);
        assert_eq!(deserialize_value(&registry, &config, &tag).unwrap(), Some(slashes));
    }

    #[test]
    fn test_unknown_type_is_missing() {
        let registry = ValueTypeRegistry::with_defaults();
        let tag = ValueTag { value_type: "fluid".into(), value: "water".into() };
        assert_eq!(deserialize_value(&registry, &EngineConfig::default(), &tag).unwrap(), None);
    }

    #[test]
    fn test_malformed_known_type_fails() {
        let registry = ValueTypeRegistry::with_defaults();
        let tag = ValueTag { value_type: "integer".into(), value: "twelve".into() };
        assert!(deserialize_value(&registry, &EngineConfig::default(), &tag).is_err());
    }
}
