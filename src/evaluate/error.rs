//! Evaluation errors.
//!
//! Every variant carries the structured parameters a consumer needs to
//! render a localized message; [`EvaluationError::message_key`] names the
//! translation key.

use crate::model::ValueType;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("Operator {operator} takes {expected} inputs but received {actual}; the intermediate result of type {result_type} is not an operator")]
    CurryOverflow {
        operator: String,
        expected: usize,
        actual: usize,
        result_type: ValueType,
    },

    #[error("Operator {operator} exceeded the maximum operator chain depth of {max_depth}")]
    CurryDepthExceeded { operator: String, max_depth: usize },

    #[error("Predicate {predicate} returned a value of type {got}, expected {expected}")]
    WrongPredicate {
        predicate: String,
        got: ValueType,
        expected: ValueType,
    },

    #[error("Operator {operator} expected input {index} of type {expected}, got {got}")]
    WrongInputType {
        operator: String,
        index: usize,
        expected: ValueType,
        got: ValueType,
    },

    #[error("Operator {operator} failed: {message}")]
    Operator { operator: String, message: String },

    #[error("Unknown variable {0}")]
    UnknownVariable(i32),

    #[error("Variable {variable} exceeded the maximum expression depth of {max_depth}")]
    ExpressionDepthExceeded { variable: i32, max_depth: usize },

    #[error("Part state unavailable: {0}")]
    PartState(String),
}

impl EvaluationError {
    /// Stable translation key for this error.
    pub fn message_key(&self) -> &'static str {
        match self {
            EvaluationError::CurryOverflow { .. } => "operator.error.curryingOverflow",
            EvaluationError::CurryDepthExceeded { .. } => "operator.error.curryingDepth",
            EvaluationError::WrongPredicate { .. } => "operator.error.wrongPredicate",
            EvaluationError::WrongInputType { .. } => "operator.error.wrongType",
            EvaluationError::Operator { .. } => "operator.error.evaluation",
            EvaluationError::UnknownVariable(_) => "variable.error.unknown",
            EvaluationError::ExpressionDepthExceeded { .. } => "variable.error.recursion",
            EvaluationError::PartState(_) => "part.error.stateUnavailable",
        }
    }

    /// Shorthand for an operator-internal failure.
    pub fn operator(operator: impl Into<String>, message: impl Into<String>) -> Self {
        EvaluationError::Operator {
            operator: operator.into(),
            message: message.into(),
        }
    }
}
