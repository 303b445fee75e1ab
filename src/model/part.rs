//! Parts: typed units mounted on one side of a node.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Value, ValueType};
use crate::evaluate::Variable;

/// Process-unique part identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartId(pub i32);

impl std::fmt::Display for PartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A readable aspect of a part, e.g. "inventory is empty".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Aspect {
    pub key: String,
    pub output: ValueType,
}

impl Aspect {
    pub fn new(key: impl Into<String>, output: ValueType) -> Self {
        Self { key: key.into(), output }
    }
}

/// The static type of a part.
///
/// `read_aspects` is `None` for types without the reader capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartType {
    pub name: String,
    pub read_aspects: Option<Vec<Aspect>>,
}

impl PartType {
    pub fn reader(name: impl Into<String>, aspects: impl IntoIterator<Item = Aspect>) -> Self {
        Self {
            name: name.into(),
            read_aspects: Some(aspects.into_iter().collect()),
        }
    }

    pub fn plain(name: impl Into<String>) -> Self {
        Self { name: name.into(), read_aspects: None }
    }

    pub fn is_reader(&self) -> bool {
        self.read_aspects.is_some()
    }

    pub fn supports(&self, aspect: &Aspect) -> bool {
        self.read_aspects
            .as_ref()
            .is_some_and(|aspects| aspects.contains(aspect))
    }

    /// The variable this type exposes for `aspect`, if both the type and
    /// the state can read it.
    pub fn variable(&self, state: &PartState, aspect: &Aspect) -> Option<Variable> {
        if !self.supports(aspect) {
            return None;
        }
        state.variable(aspect)
    }
}

/// The live state of a mounted part.
///
/// `aspect_values` is `None` for states without the reader capability.
#[derive(Debug, Clone, PartialEq)]
pub struct PartState {
    pub part_id: PartId,
    pub aspect_values: Option<HashMap<String, Value>>,
}

impl PartState {
    pub fn reader(part_id: PartId) -> Self {
        Self { part_id, aspect_values: Some(HashMap::new()) }
    }

    pub fn plain(part_id: PartId) -> Self {
        Self { part_id, aspect_values: None }
    }

    pub fn with_aspect_value(mut self, aspect: &Aspect, value: impl Into<Value>) -> Self {
        self.aspect_values
            .get_or_insert_with(HashMap::new)
            .insert(aspect.key.clone(), value.into());
        self
    }

    pub fn is_reader(&self) -> bool {
        self.aspect_values.is_some()
    }

    pub fn aspect_value(&self, aspect: &Aspect) -> Option<&Value> {
        self.aspect_values.as_ref()?.get(&aspect.key)
    }

    /// The reader variable for `aspect`; `None` if this state cannot read it.
    pub fn variable(&self, aspect: &Aspect) -> Option<Variable> {
        self.aspect_value(aspect)
            .map(|value| Variable::new(aspect.output, value.clone()))
    }
}

/// A part as mounted on a node: its id, type and current state.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub id: PartId,
    pub part_type: PartType,
    pub state: PartState,
}

impl Part {
    pub fn new(id: PartId, part_type: PartType) -> Self {
        let state = if part_type.is_reader() { PartState::reader(id) } else { PartState::plain(id) };
        Self { id, part_type, state }
    }

    pub fn with_aspect_value(mut self, aspect: &Aspect, value: impl Into<Value>) -> Self {
        self.state = self.state.with_aspect_value(aspect, value);
        self
    }
}
