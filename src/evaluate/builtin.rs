//! Builtin operators and the operator registry.

use std::collections::HashMap;

use super::operator::{evaluate_operator, validate_predicate_output, BuiltinOperator, OperatorRef};
use super::EvaluationError;
use crate::model::{Value, ValueType};

/// Operators addressable by their unique name.
#[derive(Debug, Default, Clone)]
pub struct OperatorRegistry {
    operators: HashMap<String, OperatorRef>,
}

impl OperatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every builtin operator.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for operator in builtins() {
            registry.register(operator);
        }
        registry
    }

    /// Register an operator. Returns false if the name is already taken.
    pub fn register(&mut self, operator: OperatorRef) -> bool {
        let name = operator.name().to_string();
        if self.operators.contains_key(&name) {
            return false;
        }
        self.operators.insert(name, operator);
        true
    }

    pub fn get(&self, name: &str) -> Option<&OperatorRef> {
        self.operators.get(name)
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operators.keys().map(String::as_str)
    }
}

fn int(v: &Value) -> i32 {
    v.as_int().unwrap_or_default()
}

fn boolean(v: &Value) -> bool {
    v.as_bool().unwrap_or_default()
}

fn string(v: &Value) -> &str {
    v.as_str().unwrap_or_default()
}

fn overflow(operator: &str) -> EvaluationError {
    EvaluationError::operator(operator, "integer overflow")
}

/// `general.identity`: returns its single input unchanged.
pub fn identity_operator() -> OperatorRef {
    BuiltinOperator::new("general.identity", [ValueType::Any], ValueType::Any, |v| Ok(v[0].clone())).into_ref()
}

/// All builtin operators.
pub fn builtins() -> Vec<OperatorRef> {
    use ValueType::*;

    vec![
        BuiltinOperator::new("logical.and", [Boolean, Boolean], Boolean, |v| {
            Ok(Value::Boolean(boolean(&v[0]) && boolean(&v[1])))
        })
        .into_ref(),
        BuiltinOperator::new("logical.or", [Boolean, Boolean], Boolean, |v| {
            Ok(Value::Boolean(boolean(&v[0]) || boolean(&v[1])))
        })
        .into_ref(),
        BuiltinOperator::new("logical.not", [Boolean], Boolean, |v| {
            Ok(Value::Boolean(!boolean(&v[0])))
        })
        .into_ref(),
        BuiltinOperator::new("arithmetic.add", [Integer, Integer], Integer, |v| {
            int(&v[0])
                .checked_add(int(&v[1]))
                .map(Value::Integer)
                .ok_or_else(|| overflow("arithmetic.add"))
        })
        .into_ref(),
        BuiltinOperator::new("arithmetic.subtract", [Integer, Integer], Integer, |v| {
            int(&v[0])
                .checked_sub(int(&v[1]))
                .map(Value::Integer)
                .ok_or_else(|| overflow("arithmetic.subtract"))
        })
        .into_ref(),
        BuiltinOperator::new("arithmetic.multiply", [Integer, Integer], Integer, |v| {
            int(&v[0])
                .checked_mul(int(&v[1]))
                .map(Value::Integer)
                .ok_or_else(|| overflow("arithmetic.multiply"))
        })
        .into_ref(),
        BuiltinOperator::new("arithmetic.divide", [Integer, Integer], Integer, |v| {
            if int(&v[1]) == 0 {
                return Err(EvaluationError::operator("arithmetic.divide", "division by zero"));
            }
            int(&v[0])
                .checked_div(int(&v[1]))
                .map(Value::Integer)
                .ok_or_else(|| overflow("arithmetic.divide"))
        })
        .into_ref(),
        BuiltinOperator::new("string.concat", [String, String], String, |v| {
            Ok(Value::String(format!("{}{}", string(&v[0]), string(&v[1]))))
        })
        .into_ref(),
        BuiltinOperator::new("string.length", [String], Integer, |v| {
            let len = string(&v[0]).chars().count();
            i32::try_from(len)
                .map(Value::Integer)
                .map_err(|_| overflow("string.length"))
        })
        .into_ref(),
        identity_operator(),
        BuiltinOperator::new("relational.equals", [Any, Any], Boolean, |v| {
            Ok(Value::Boolean(v[0] == v[1]))
        })
        .into_ref(),
        // Applies the operator in its first input to the second input,
        // going through the currying engine.
        BuiltinOperator::new("operator.apply", [Operator, Any], Any, |v| {
            let operator = v[0]
                .as_operator()
                .ok_or_else(|| EvaluationError::operator("operator.apply", "first input is not an operator"))?;
            evaluate_operator(operator, &v[1..])
        })
        .into_ref(),
        // (p1, p2, x) -> p1(x) && p2(x); curried with two predicates it is
        // itself a predicate.
        BuiltinOperator::new("operator.conjunction", [Operator, Operator, Any], Boolean, |v| {
            let mut all = true;
            for predicate in &v[..2] {
                let predicate = predicate.as_operator().ok_or_else(|| {
                    EvaluationError::operator("operator.conjunction", "predicate is not an operator")
                })?;
                let result = evaluate_operator(predicate, &v[2..])?;
                all &= validate_predicate_output(predicate.as_ref(), &result)?;
            }
            Ok(Value::Boolean(all))
        })
        .into_ref(),
    ]
}
