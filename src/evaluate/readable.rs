//! Safe, human-readable rendering of variable values.

use std::fmt;
use std::sync::Arc;

use crate::model::Value;
use crate::Result;

pub const SAFE_MODE_TEXT: &str = "SAFE-MODE";
pub const ERROR_TEXT: &str = "ERROR";
pub const ERROR_COLOR: u32 = 0xFF_00_00;

/// Externally supplied "may live state be read" predicate.
///
/// When it reports false (e.g. the simulation is shutting down), reads must
/// not touch world state and degrade to [`SAFE_MODE_TEXT`].
#[derive(Clone)]
pub struct SafeMode {
    should_work: Arc<dyn Fn() -> bool + Send + Sync>,
}

impl SafeMode {
    pub fn new(should_work: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        Self { should_work: Arc::new(should_work) }
    }

    /// A predicate that always allows reads.
    pub fn always_working() -> Self {
        Self::new(|| true)
    }

    pub fn should_work(&self) -> bool {
        (self.should_work)()
    }
}

impl Default for SafeMode {
    fn default() -> Self {
        Self::always_working()
    }
}

impl fmt::Debug for SafeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafeMode").field("should_work", &self.should_work()).finish()
    }
}

/// A rendered value plus its display colour.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReadableValue {
    pub text: String,
    pub color: u32,
}

impl ReadableValue {
    pub fn error() -> Self {
        Self { text: ERROR_TEXT.to_string(), color: ERROR_COLOR }
    }

    pub fn safe_mode() -> Self {
        Self { text: SAFE_MODE_TEXT.to_string(), color: 0 }
    }

    pub fn of(value: &Value) -> Self {
        Self {
            text: value.to_compact_string(),
            color: value.value_type().display_color(),
        }
    }
}

/// Render the result of `read` without letting failures escape.
///
/// `read` is not invoked at all in safe mode. `None` renders as empty text.
pub fn safe_readable_value<F>(safe_mode: &SafeMode, read: Option<F>) -> ReadableValue
where
    F: FnOnce() -> Result<Value>,
{
    if !safe_mode.should_work() {
        return ReadableValue::safe_mode();
    }
    match read {
        None => ReadableValue::default(),
        Some(read) => match read() {
            Ok(value) => ReadableValue::of(&value),
            Err(err) => {
                tracing::debug!(error = %err, "variable read failed");
                ReadableValue::error()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate::EvaluationError;
    use crate::model::ValueType;
    use crate::Error;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_value_rendering() {
        let rendered = safe_readable_value(&SafeMode::always_working(), Some(|| Ok(Value::Integer(5))));
        assert_eq!(rendered.text, "5");
        assert_eq!(rendered.color, ValueType::Integer.display_color());
    }

    #[test]
    fn test_error_rendering() {
        let rendered = safe_readable_value(
            &SafeMode::always_working(),
            Some(|| Err(Error::from(EvaluationError::UnknownVariable(3)))),
        );
        assert_eq!(rendered, ReadableValue::error());
    }

    #[test]
    fn test_safe_mode_skips_read() {
        let touched = AtomicBool::new(false);
        let rendered = safe_readable_value(
            &SafeMode::new(|| false),
            Some(|| {
                touched.store(true, Ordering::SeqCst);
                Ok(Value::Integer(1))
            }),
        );
        assert_eq!(rendered.text, SAFE_MODE_TEXT);
        assert!(!touched.load(Ordering::SeqCst));
    }

    #[test]
    fn test_missing_variable_is_blank() {
        let rendered = safe_readable_value::<fn() -> Result<Value>>(&SafeMode::always_working(), None);
        assert_eq!(rendered, ReadableValue::default());
    }
}
