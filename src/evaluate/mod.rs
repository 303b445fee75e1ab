//! # Evaluation
//!
//! Operators, the currying engine, variables, the value-type registry and
//! the persisted value format.
//!
//! This module knows nothing about topology. Networks call into it to
//! evaluate expression variables and render values.

pub mod error;
pub mod operator;
pub mod builtin;
pub mod variable;
pub mod types;
pub mod transcode;
pub mod serialize;
pub mod readable;

pub use error::EvaluationError;
pub use operator::{
    Operator, OperatorRef, OperatorFn, BuiltinOperator, CurriedOperator,
    evaluate_operator, evaluate_operator_bounded, flatten_curried, operators_equal,
    validate_inputs, validate_predicate_output,
    DEFAULT_MAX_CURRY_DEPTH,
};
pub use builtin::{OperatorRegistry, builtins, identity_operator};
pub use variable::{Variable, VariableId, VariableFacade, FacadeSource};
pub use types::{ValueTypeRegistry, ValueTypeDescriptor};
pub use transcode::{SlashTranscoder, COMPRESSION_MARKER, MAX_EXPANSION_FACTOR};
pub use serialize::{
    ValueTag, TOO_LONG,
    serialize_raw, deserialize_raw, serialize_value, deserialize_value,
    tag_to_json, tag_from_json,
};
pub use readable::{
    SafeMode, ReadableValue, safe_readable_value,
    SAFE_MODE_TEXT, ERROR_TEXT, ERROR_COLOR,
};
