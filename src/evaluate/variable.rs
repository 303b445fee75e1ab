//! Variables and variable facades.

use serde::{Deserialize, Serialize};

use super::OperatorRef;
use crate::model::{Aspect, PartId, Value, ValueType};

/// Identifier of a variable facade, unique across a network's containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariableId(pub i32);

impl std::fmt::Display for VariableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A typed value read from a part or computed by an expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    value_type: ValueType,
    value: Value,
}

impl Variable {
    pub fn new(value_type: ValueType, value: Value) -> Self {
        Self { value_type, value }
    }

    /// The declared type; may be `Any` for generic outputs.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

/// Where a facade's value comes from.
#[derive(Debug, Clone)]
pub enum FacadeSource {
    /// A fixed value.
    Constant(Value),
    /// An operator applied to other facades, resolved through the network.
    Expression {
        operator: OperatorRef,
        inputs: Vec<VariableId>,
    },
    /// A reader part's aspect.
    PartAspect { part_id: PartId, aspect: Aspect },
}

/// A reference to a variable as stored in a variable container.
#[derive(Debug, Clone)]
pub struct VariableFacade {
    pub id: VariableId,
    pub source: FacadeSource,
}

impl VariableFacade {
    pub fn constant(id: VariableId, value: impl Into<Value>) -> Self {
        Self { id, source: FacadeSource::Constant(value.into()) }
    }

    pub fn expression(id: VariableId, operator: OperatorRef, inputs: impl IntoIterator<Item = VariableId>) -> Self {
        Self {
            id,
            source: FacadeSource::Expression {
                operator,
                inputs: inputs.into_iter().collect(),
            },
        }
    }

    pub fn part_aspect(id: VariableId, part_id: PartId, aspect: Aspect) -> Self {
        Self { id, source: FacadeSource::PartAspect { part_id, aspect } }
    }

    /// Declared output type, known without evaluating.
    pub fn output_type(&self) -> ValueType {
        match &self.source {
            FacadeSource::Constant(value) => value.value_type(),
            FacadeSource::Expression { operator, inputs } => {
                if inputs.len() < operator.required_input_length() {
                    ValueType::Operator
                } else {
                    operator.output_type()
                }
            }
            FacadeSource::PartAspect { aspect, .. } => aspect.output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate::OperatorRegistry;

    #[test]
    fn test_output_types() {
        let ops = OperatorRegistry::with_builtins();
        let add = ops.get("arithmetic.add").cloned().unwrap();

        let full = VariableFacade::expression(VariableId(1), add.clone(), [VariableId(2), VariableId(3)]);
        let partial = VariableFacade::expression(VariableId(4), add, [VariableId(2)]);
        let constant = VariableFacade::constant(VariableId(5), "hi");
        let aspect = VariableFacade::part_aspect(
            VariableId(6),
            PartId(1),
            Aspect::new("inventory.empty", ValueType::Boolean),
        );

        assert_eq!(full.output_type(), ValueType::Integer);
        assert_eq!(partial.output_type(), ValueType::Operator);
        assert_eq!(constant.output_type(), ValueType::String);
        assert_eq!(aspect.output_type(), ValueType::Boolean);
    }
}
