//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Tunables shared by serialization and evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Persisted value strings at or above this size are replaced by the
    /// oversize sentinel.
    pub max_value_byte_size: usize,
    /// Backslash runs up to this length are never compressed.
    pub slash_threshold: usize,
    /// Maximum number of overflow steps in one operator evaluation.
    pub max_curry_depth: usize,
    /// Maximum nesting of expression variables resolved in one read.
    pub max_expression_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_value_byte_size: 20_000,
            slash_threshold: 32,
            max_curry_depth: crate::evaluate::DEFAULT_MAX_CURRY_DEPTH,
            max_expression_depth: 64,
        }
    }
}

impl EngineConfig {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_value_byte_size == 0 {
            return Err(Error::Config("max_value_byte_size must be positive".into()));
        }
        if self.max_curry_depth == 0 {
            return Err(Error::Config("max_curry_depth must be positive".into()));
        }
        if self.max_expression_depth == 0 {
            return Err(Error::Config("max_expression_depth must be positive".into()));
        }
        Ok(())
    }

    /// Inputs shorter than this are never compressed.
    pub fn compression_threshold(&self) -> usize {
        self.max_value_byte_size / 4
    }
}
