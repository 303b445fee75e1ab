//! In-memory world.
//!
//! This is the reference implementation of `World`.
//! It uses a single HashMap of nodes protected by a RwLock.
//!
//! ## Limitations
//!
//! - **No events**: mutations never notify networks. Callers that place or
//!   remove nodes must rebuild or notify the affected networks themselves.
//! - **Single-writer only**: multi-step edits are not atomic.
//!
//! Use this world for:
//! - Testing topology discovery, networks and evaluation
//! - Embedding the engine where the host keeps its own simulation state

use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use parking_lot::RwLock;
use smallvec::SmallVec;

use super::{Capabilities, Capability, MountedParts, World};
use crate::evaluate::{VariableFacade, VariableId};
use crate::model::{Aspect, Part, PartPos, PartState, PartType, Position, Side, Value};
use crate::network::{NetworkElement, PartNetwork};

/// Produces the network elements a node contributes, once per network build.
pub type ElementFactory =
    Arc<dyn Fn(Position) -> Vec<Box<dyn NetworkElement<PartNetwork>>> + Send + Sync>;

// ============================================================================
// MemoryWorld
// ============================================================================

/// In-memory grid of nodes.
#[derive(Default)]
pub struct MemoryWorld {
    nodes: RwLock<HashMap<Position, MemoryNode>>,
}

#[derive(Default)]
struct MemoryNode {
    capabilities: Capabilities,
    vetoed: HashSet<Side>,
    parts: HashMap<Side, Part>,
    /// Insertion order is kept so facade listings are stable.
    facades: Vec<VariableFacade>,
    elements: Option<ElementFactory>,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a node, replacing anything already at `pos`.
    pub fn place(&self, pos: Position, capabilities: Capabilities) {
        self.nodes.write().insert(pos, MemoryNode { capabilities, ..Default::default() });
    }

    /// A cable: connectable and able to hold parts.
    pub fn place_cable(&self, pos: Position) {
        self.place(pos, Capabilities::of([Capability::Connectable, Capability::PartContainer]));
    }

    /// A connectable variable store.
    pub fn place_variable_store(&self, pos: Position) {
        self.place(pos, Capabilities::of([Capability::Connectable, Capability::VariableContainer]));
    }

    pub fn remove(&self, pos: Position) -> bool {
        self.nodes.write().remove(&pos).is_some()
    }

    /// Lift a veto placed by [`World::disconnect`].
    pub fn reconnect(&self, pos: Position, side: Side) {
        if let Some(node) = self.nodes.write().get_mut(&pos) {
            node.vetoed.remove(&side);
        }
    }

    /// Mount `part` on `side` of the node at `pos`.
    ///
    /// Returns false if there is no part container at `pos`.
    pub fn mount_part(&self, pos: Position, side: Side, part: Part) -> bool {
        let mut nodes = self.nodes.write();
        match nodes.get_mut(&pos) {
            Some(node) if node.capabilities.contains(Capability::PartContainer) => {
                node.parts.insert(side, part);
                true
            }
            _ => false,
        }
    }

    pub fn unmount_part(&self, target: PartPos) -> Option<Part> {
        self.nodes.write().get_mut(&target.pos)?.parts.remove(&target.side)
    }

    /// Update one aspect value of a mounted part's state.
    pub fn set_aspect_value(&self, target: PartPos, aspect: &Aspect, value: impl Into<Value>) -> bool {
        let mut nodes = self.nodes.write();
        let Some(part) = nodes.get_mut(&target.pos).and_then(|n| n.parts.get_mut(&target.side)) else {
            return false;
        };
        match part.state.aspect_values.as_mut() {
            Some(values) => {
                values.insert(aspect.key.clone(), value.into());
                true
            }
            None => false,
        }
    }

    /// Store `facade` in the container at `pos`, replacing one with the
    /// same id. Returns false if there is no variable container at `pos`.
    pub fn insert_facade(&self, pos: Position, facade: VariableFacade) -> bool {
        let mut nodes = self.nodes.write();
        let Some(node) = nodes.get_mut(&pos) else { return false };
        if !node.capabilities.contains(Capability::VariableContainer) {
            return false;
        }
        match node.facades.iter_mut().find(|f| f.id == facade.id) {
            Some(existing) => *existing = facade,
            None => node.facades.push(facade),
        }
        true
    }

    pub fn remove_facade(&self, pos: Position, id: VariableId) -> bool {
        let mut nodes = self.nodes.write();
        let Some(node) = nodes.get_mut(&pos) else { return false };
        let before = node.facades.len();
        node.facades.retain(|f| f.id != id);
        node.facades.len() != before
    }

    /// Make the node at `pos` an element provider backed by `factory`.
    pub fn set_element_factory(&self, pos: Position, factory: ElementFactory) -> bool {
        let mut nodes = self.nodes.write();
        let Some(node) = nodes.get_mut(&pos) else { return false };
        node.capabilities = node.capabilities.with(Capability::ElementProvider);
        node.elements = Some(factory);
        true
    }

    pub fn node_count(&self) -> usize {
        self.nodes.read().len()
    }
}

// ============================================================================
// World implementation
// ============================================================================

impl World for MemoryWorld {
    fn capabilities(&self, pos: Position) -> Capabilities {
        self.nodes.read().get(&pos).map(|n| n.capabilities).unwrap_or_default()
    }

    fn can_connect(&self, pos: Position, side: Side) -> bool {
        self.nodes.read().get(&pos).is_some_and(|n| {
            n.capabilities.contains(Capability::Connectable) && !n.vetoed.contains(&side)
        })
    }

    fn disconnect(&self, pos: Position, side: Side) {
        if let Some(node) = self.nodes.write().get_mut(&pos) {
            node.vetoed.insert(side);
        }
    }

    fn network_elements(&self, pos: Position) -> Vec<Box<dyn NetworkElement<PartNetwork>>> {
        // Clone the factory out so it runs without holding the lock.
        let factory = self.nodes.read().get(&pos).and_then(|n| n.elements.clone());
        factory.map(|f| f(pos)).unwrap_or_default()
    }

    fn parts(&self, pos: Position) -> MountedParts {
        let nodes = self.nodes.read();
        let Some(node) = nodes.get(&pos) else { return SmallVec::new() };
        let mut parts: MountedParts = node.parts.iter().map(|(side, part)| (*side, part.id)).collect();
        parts.sort_by_key(|(_, id)| *id);
        parts
    }

    fn has_part(&self, target: PartPos) -> bool {
        self.nodes.read().get(&target.pos).is_some_and(|n| n.parts.contains_key(&target.side))
    }

    fn part_state(&self, target: PartPos) -> Option<PartState> {
        let nodes = self.nodes.read();
        nodes.get(&target.pos)?.parts.get(&target.side).map(|p| p.state.clone())
    }

    fn part_type(&self, target: PartPos) -> Option<PartType> {
        let nodes = self.nodes.read();
        nodes.get(&target.pos)?.parts.get(&target.side).map(|p| p.part_type.clone())
    }

    fn variable_facade_ids(&self, pos: Position) -> Option<Vec<VariableId>> {
        let nodes = self.nodes.read();
        let node = nodes.get(&pos)?;
        if !node.capabilities.contains(Capability::VariableContainer) {
            return None;
        }
        Some(node.facades.iter().map(|f| f.id).collect())
    }

    fn variable_facade(&self, pos: Position, id: VariableId) -> Option<VariableFacade> {
        let nodes = self.nodes.read();
        nodes.get(&pos)?.facades.iter().find(|f| f.id == id).cloned()
    }
}
