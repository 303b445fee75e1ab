//! Operators and the currying evaluation engine.
//!
//! [`evaluate_operator`] reconciles the number of supplied values with an
//! operator's arity:
//!
//! ```text
//! k == n  →  operator(values)
//! k <  n  →  Operator(Curried(operator, values))
//! k >  n  →  operator(values[..n]) must be an operator; continue with values[n..]
//! ```
//!
//! Overflow chains are walked iteratively. Each overflow step counts against
//! a maximum chain depth, so an operator that keeps returning itself fails
//! with [`EvaluationError::CurryDepthExceeded`] instead of looping forever.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use super::EvaluationError;
use crate::model::{Value, ValueType};

/// Default bound on the number of overflow steps in one evaluation.
pub const DEFAULT_MAX_CURRY_DEPTH: usize = 256;

/// A pure, fixed-arity mapping from values to a value.
pub trait Operator: fmt::Debug + Send + Sync {
    /// Unique name, also the operator's translation key.
    fn name(&self) -> &str;

    /// Expected input types, one per argument.
    fn input_types(&self) -> &[ValueType];

    fn output_type(&self) -> ValueType;

    fn required_input_length(&self) -> usize {
        self.input_types().len()
    }

    /// Apply the operator to exactly `required_input_length()` values.
    fn evaluate(&self, inputs: &[Value]) -> Result<Value, EvaluationError>;

    /// The base operator and bound prefix, for curried operators.
    fn as_curried(&self) -> Option<&CurriedOperator> {
        None
    }
}

/// Shared handle to an operator.
pub type OperatorRef = Arc<dyn Operator>;

/// Check that `inputs` match the operator's declared signature.
pub fn validate_inputs(operator: &dyn Operator, inputs: &[Value]) -> Result<(), EvaluationError> {
    let expected = operator.input_types();
    if inputs.len() != expected.len() {
        return Err(EvaluationError::operator(
            operator.name(),
            format!("expected {} inputs, got {}", expected.len(), inputs.len()),
        ));
    }
    for (index, (ty, value)) in expected.iter().zip(inputs).enumerate() {
        if !ty.accepts(value.value_type()) {
            return Err(EvaluationError::WrongInputType {
                operator: operator.name().to_string(),
                index,
                expected: *ty,
                got: value.value_type(),
            });
        }
    }
    Ok(())
}

/// Check that a predicate produced a boolean.
pub fn validate_predicate_output(predicate: &dyn Operator, result: &Value) -> Result<bool, EvaluationError> {
    result.as_bool().ok_or_else(|| EvaluationError::WrongPredicate {
        predicate: predicate.name().to_string(),
        got: result.value_type(),
        expected: ValueType::Boolean,
    })
}

// ============================================================================
// BuiltinOperator
// ============================================================================

/// Function body of a builtin operator. Inputs are already type-checked.
pub type OperatorFn = fn(&[Value]) -> Result<Value, EvaluationError>;

/// An operator backed by a plain function and a declared signature.
pub struct BuiltinOperator {
    name: String,
    input_types: SmallVec<[ValueType; 3]>,
    output_type: ValueType,
    function: OperatorFn,
}

impl BuiltinOperator {
    pub fn new(
        name: impl Into<String>,
        input_types: impl IntoIterator<Item = ValueType>,
        output_type: ValueType,
        function: OperatorFn,
    ) -> Self {
        Self {
            name: name.into(),
            input_types: input_types.into_iter().collect(),
            output_type,
            function,
        }
    }

    pub fn into_ref(self) -> OperatorRef {
        Arc::new(self)
    }
}

impl fmt::Debug for BuiltinOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinOperator")
            .field("name", &self.name)
            .field("input_types", &self.input_types)
            .field("output_type", &self.output_type)
            .finish()
    }
}

impl Operator for BuiltinOperator {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_types(&self) -> &[ValueType] {
        &self.input_types
    }

    fn output_type(&self) -> ValueType {
        self.output_type
    }

    fn evaluate(&self, inputs: &[Value]) -> Result<Value, EvaluationError> {
        validate_inputs(self, inputs)?;
        (self.function)(inputs)
    }
}

// ============================================================================
// CurriedOperator
// ============================================================================

/// An operator with a strict prefix of its arguments already bound.
#[derive(Debug)]
pub struct CurriedOperator {
    base: OperatorRef,
    bound: Vec<Value>,
}

impl CurriedOperator {
    /// Bind `bound` as the leading arguments of `base`.
    ///
    /// Callers must bind fewer values than the base arity; the engine only
    /// curries on a shortfall.
    pub(crate) fn new(base: OperatorRef, bound: Vec<Value>) -> Self {
        debug_assert!(bound.len() < base.required_input_length());
        Self { base, bound }
    }

    pub fn base(&self) -> &OperatorRef {
        &self.base
    }

    pub fn bound(&self) -> &[Value] {
        &self.bound
    }
}

impl Operator for CurriedOperator {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn input_types(&self) -> &[ValueType] {
        let all = self.base.input_types();
        &all[self.bound.len().min(all.len())..]
    }

    fn output_type(&self) -> ValueType {
        self.base.output_type()
    }

    fn required_input_length(&self) -> usize {
        self.base.required_input_length().saturating_sub(self.bound.len())
    }

    fn evaluate(&self, inputs: &[Value]) -> Result<Value, EvaluationError> {
        let mut all = Vec::with_capacity(self.bound.len() + inputs.len());
        all.extend_from_slice(&self.bound);
        all.extend_from_slice(inputs);
        self.base.evaluate(&all)
    }

    fn as_curried(&self) -> Option<&CurriedOperator> {
        Some(self)
    }
}

/// Peel nested curried operators down to the base operator and the full
/// bound prefix, outermost binding last.
pub fn flatten_curried(operator: &OperatorRef) -> (OperatorRef, Vec<Value>) {
    let mut segments = Vec::new();
    let mut current = Arc::clone(operator);
    loop {
        let next = match current.as_curried() {
            Some(curried) => {
                segments.push(curried.bound().to_vec());
                Arc::clone(curried.base())
            }
            None => break,
        };
        current = next;
    }
    let bound = segments.into_iter().rev().flatten().collect();
    (current, bound)
}

/// Payload equality for operators: same base operator name and an
/// element-wise equal bound prefix.
pub fn operators_equal(a: &OperatorRef, b: &OperatorRef) -> bool {
    if Arc::ptr_eq(a, b) {
        return true;
    }
    let (base_a, bound_a) = flatten_curried(a);
    let (base_b, bound_b) = flatten_curried(b);
    base_a.name() == base_b.name() && bound_a == bound_b
}

// ============================================================================
// Evaluation engine
// ============================================================================

/// Evaluate `operator` against `values`, currying on a shortfall and
/// chaining into operator-typed results on an overflow.
pub fn evaluate_operator(operator: &OperatorRef, values: &[Value]) -> Result<Value, EvaluationError> {
    evaluate_operator_bounded(operator, values, DEFAULT_MAX_CURRY_DEPTH)
}

/// [`evaluate_operator`] with an explicit bound on overflow steps.
pub fn evaluate_operator_bounded(
    operator: &OperatorRef,
    values: &[Value],
    max_depth: usize,
) -> Result<Value, EvaluationError> {
    let mut operator = Arc::clone(operator);
    let mut values = values;
    let mut depth = 0;

    loop {
        let required = operator.required_input_length();

        if values.len() == required {
            return operator.evaluate(values);
        }

        if values.len() < required {
            tracing::trace!(
                operator = operator.name(),
                bound = values.len(),
                required,
                "currying operator"
            );
            let curried = CurriedOperator::new(operator, values.to_vec());
            return Ok(Value::Operator(Arc::new(curried)));
        }

        depth += 1;
        if depth > max_depth {
            return Err(EvaluationError::CurryDepthExceeded {
                operator: operator.name().to_string(),
                max_depth,
            });
        }

        let (head, tail) = values.split_at(required);
        let result = operator.evaluate(head)?;
        match result {
            Value::Operator(next) => {
                tracing::trace!(
                    operator = operator.name(),
                    next = next.name(),
                    remaining = tail.len(),
                    "forwarding overflow inputs"
                );
                operator = next;
                values = tail;
            }
            other => {
                return Err(EvaluationError::CurryOverflow {
                    operator: operator.name().to_string(),
                    expected: required,
                    actual: values.len(),
                    result_type: other.value_type(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add() -> OperatorRef {
        BuiltinOperator::new(
            "arithmetic.add",
            [ValueType::Integer, ValueType::Integer],
            ValueType::Integer,
            |v| Ok(Value::Integer(v[0].as_int().unwrap_or(0) + v[1].as_int().unwrap_or(0))),
        )
        .into_ref()
    }

    fn constant_seven() -> OperatorRef {
        BuiltinOperator::new("general.seven", [], ValueType::Integer, |_| Ok(Value::Integer(7))).into_ref()
    }

    #[test]
    fn test_exact_arity() {
        let result = evaluate_operator(&add(), &[Value::Integer(2), Value::Integer(3)]).unwrap();
        assert_eq!(result, Value::Integer(5));
    }

    #[test]
    fn test_zero_arity_evaluates_immediately() {
        assert_eq!(evaluate_operator(&constant_seven(), &[]).unwrap(), Value::Integer(7));
    }

    #[test]
    fn test_shortfall_curries() {
        let result = evaluate_operator(&add(), &[Value::Integer(2)]).unwrap();
        let curried = result.as_operator().unwrap();
        assert_eq!(curried.required_input_length(), 1);
        assert_eq!(curried.input_types(), &[ValueType::Integer]);
        assert_eq!(curried.name(), "arithmetic.add");
        assert_eq!(curried.as_curried().unwrap().bound(), &[Value::Integer(2)]);

        let applied = evaluate_operator(curried, &[Value::Integer(40)]).unwrap();
        assert_eq!(applied, Value::Integer(42));
    }

    #[test]
    fn test_overflow_with_scalar_result_fails() {
        let err = evaluate_operator(
            &add(),
            &[Value::Integer(1), Value::Integer(2), Value::Integer(3)],
        )
        .unwrap_err();
        assert_eq!(
            err,
            EvaluationError::CurryOverflow {
                operator: "arithmetic.add".into(),
                expected: 2,
                actual: 3,
                result_type: ValueType::Integer,
            }
        );
    }

    #[test]
    fn test_wrong_input_type_is_reported() {
        let err = evaluate_operator(&add(), &[Value::Integer(1), Value::from("x")]).unwrap_err();
        assert!(matches!(err, EvaluationError::WrongInputType { index: 1, .. }));
    }

    #[derive(Debug)]
    struct Ouroboros;

    impl Operator for Ouroboros {
        fn name(&self) -> &str {
            "test.ouroboros"
        }
        fn input_types(&self) -> &[ValueType] {
            &[]
        }
        fn output_type(&self) -> ValueType {
            ValueType::Operator
        }
        fn evaluate(&self, _inputs: &[Value]) -> Result<Value, EvaluationError> {
            Ok(Value::Operator(Arc::new(Ouroboros)))
        }
    }

    #[test]
    fn test_self_returning_chain_is_bounded() {
        let op: OperatorRef = Arc::new(Ouroboros);
        let err = evaluate_operator_bounded(&op, &[Value::Integer(1)], 8).unwrap_err();
        assert_eq!(
            err,
            EvaluationError::CurryDepthExceeded {
                operator: "test.ouroboros".into(),
                max_depth: 8,
            }
        );
    }

    #[test]
    fn test_curried_operators_compare_by_payload() {
        let add_two = evaluate_operator(&add(), &[Value::Integer(2)]).unwrap();
        let add_two_again = evaluate_operator(&add(), &[Value::Integer(2)]).unwrap();
        let add_three = evaluate_operator(&add(), &[Value::Integer(3)]).unwrap();

        assert_eq!(add_two, add_two_again);
        assert_ne!(add_two, add_three);
        assert_ne!(add_two, Value::Operator(add()));
        assert_eq!(Value::Operator(add()), Value::Operator(add()));
    }

    #[test]
    fn test_nested_and_flat_currying_are_equal() {
        let triple = BuiltinOperator::new(
            "test.triple",
            [ValueType::Integer, ValueType::Integer, ValueType::Integer],
            ValueType::Integer,
            |_| Ok(Value::Integer(0)),
        )
        .into_ref();
        let flat = evaluate_operator(&triple, &[Value::Integer(1), Value::Integer(2)]).unwrap();
        let once = evaluate_operator(&triple, &[Value::Integer(1)]).unwrap();
        let nested = evaluate_operator(once.as_operator().unwrap(), &[Value::Integer(2)]).unwrap();
        assert_eq!(flat, nested);

        let (base, bound) = flatten_curried(nested.as_operator().unwrap());
        assert_eq!(base.name(), "test.triple");
        assert_eq!(bound, vec![Value::Integer(1), Value::Integer(2)]);
    }

    #[test]
    fn test_predicate_output_validation() {
        let op = add();
        assert_eq!(validate_predicate_output(op.as_ref(), &Value::Boolean(true)), Ok(true));
        let err = validate_predicate_output(op.as_ref(), &Value::Integer(1)).unwrap_err();
        assert_eq!(err.message_key(), "operator.error.wrongPredicate");
    }
}
