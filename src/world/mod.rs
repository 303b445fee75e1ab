//! # World Contract
//!
//! [`World`] is THE contract between the network core and the host
//! simulation. Every question the core asks about physical nodes goes
//! through it: which roles a node plays, whether a side may connect, which
//! parts and variable facades it exposes.
//!
//! ## Implementations
//!
//! | World | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryWorld` | `memory` | In-memory for testing/embedding |

pub mod memory;

use smallvec::SmallVec;

use crate::evaluate::{VariableFacade, VariableId};
use crate::model::{PartId, PartPos, PartState, PartType, Position, Side};
use crate::network::{NetworkElement, PartNetwork};

pub use memory::{MemoryWorld, ElementFactory};

// ============================================================================
// Capabilities
// ============================================================================

/// A role a node can play in a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Contributes network elements.
    ElementProvider,
    /// Takes part in topology, with per-side connectivity.
    Connectable,
    /// Holds parts on its sides.
    PartContainer,
    /// Holds variable facades.
    VariableContainer,
}

impl Capability {
    fn bit(self) -> u8 {
        match self {
            Capability::ElementProvider => 1 << 0,
            Capability::Connectable => 1 << 1,
            Capability::PartContainer => 1 << 2,
            Capability::VariableContainer => 1 << 3,
        }
    }
}

/// The set of roles a node supports, fixed when the node is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    pub const NONE: Capabilities = Capabilities(0);

    pub fn of(capabilities: impl IntoIterator<Item = Capability>) -> Self {
        capabilities.into_iter().fold(Self::NONE, Self::with)
    }

    pub fn with(self, capability: Capability) -> Self {
        Self(self.0 | capability.bit())
    }

    pub fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

// ============================================================================
// World Trait
// ============================================================================

/// Parts mounted on one node, by side.
pub type MountedParts = SmallVec<[(Side, PartId); 6]>;

/// The host simulation as seen by networks.
///
/// Positions without a node report empty capabilities and `None`/`false`
/// everywhere; the core treats that as "absent", never as an error.
pub trait World: Send + Sync {
    /// Roles of the node at `pos`; empty if there is no node.
    fn capabilities(&self, pos: Position) -> Capabilities;

    /// Whether the node at `pos` currently permits a connection on `side`.
    fn can_connect(&self, pos: Position, side: Side) -> bool;

    /// Veto the connection on `side` of the node at `pos`.
    fn disconnect(&self, pos: Position, side: Side);

    /// Network elements contributed by the node at `pos`.
    fn network_elements(&self, pos: Position) -> Vec<Box<dyn NetworkElement<PartNetwork>>>;

    /// Parts currently mounted on the node at `pos`.
    fn parts(&self, pos: Position) -> MountedParts;

    /// Whether a part is mounted at `target`.
    fn has_part(&self, target: PartPos) -> bool;

    fn part_state(&self, target: PartPos) -> Option<PartState>;

    fn part_type(&self, target: PartPos) -> Option<PartType>;

    /// Facade ids held by the container at `pos`; `None` if there is no
    /// variable container there.
    fn variable_facade_ids(&self, pos: Position) -> Option<Vec<VariableId>>;

    fn variable_facade(&self, pos: Position, id: VariableId) -> Option<VariableFacade>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_flags() {
        let caps = Capabilities::of([Capability::Connectable, Capability::PartContainer]);
        assert!(caps.contains(Capability::Connectable));
        assert!(caps.contains(Capability::PartContainer));
        assert!(!caps.contains(Capability::VariableContainer));
        assert!(Capabilities::NONE.is_empty());
        assert!(!caps.is_empty());
    }
}
