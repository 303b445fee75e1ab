//! # cablenet: Cable Networks, Variables and Operators
//!
//! Networks of connected nodes that expose typed variables and evaluate
//! them through composable, curryable operators.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `World` is the contract between the networks and the host simulation
//! 2. **Clean DTOs**: `Value`, `Position`, `PartState` cross all boundaries
//! 3. **Rebuild, never patch**: a topology change yields a new network that supersedes the old one
//! 4. **Per-tick coherence**: derived values are computed at most once per tick
//!
//! ## Quick Start
//!
//! ```rust
//! use cablenet::{Engine, Position, Value, VariableFacade, VariableId};
//!
//! # fn example() -> cablenet::Result<()> {
//! let mut engine = Engine::open_memory();
//! engine.world().place_cable(Position::at(0, 0, 0));
//! engine.world().place_variable_store(Position::at(1, 0, 0));
//! engine.world().insert_facade(Position::at(1, 0, 0), VariableFacade::constant(VariableId(1), 42));
//!
//! let id = engine.rebuild(Position::at(0, 0, 0));
//! engine.tick();
//! assert_eq!(engine.network(id)?.read_variable(VariableId(1))?, Value::Integer(42));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Worlds
//!
//! | World | Description |
//! |-------|-------------|
//! | `MemoryWorld` | In-memory grid for testing/embedding |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod path;
pub mod world;
pub mod network;
pub mod evaluate;
pub mod config;

use std::sync::Arc;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Value, ValueType, BlockState, values_equal,
    Position, Side, PartPos,
    Part, PartId, PartType, PartState, Aspect,
};

// ============================================================================
// Re-exports: Topology and networks
// ============================================================================

pub use path::{Cluster, PathElement, connected_cluster, can_link};
pub use world::{World, Capability, Capabilities, MemoryWorld};
pub use network::{
    Network, NetworkElement, PartNetwork, NetworkRegistry, NetworkId, ChangeSignal,
};

// ============================================================================
// Re-exports: Evaluation
// ============================================================================

pub use evaluate::{
    Operator, OperatorRef, OperatorRegistry, BuiltinOperator, CurriedOperator,
    EvaluationError, evaluate_operator, evaluate_operator_bounded,
    Variable, VariableId, VariableFacade, FacadeSource,
    ValueTypeRegistry, ValueTag, SlashTranscoder, COMPRESSION_MARKER, TOO_LONG,
    SafeMode, ReadableValue,
};
pub use config::EngineConfig;

// ============================================================================
// Top-level Engine handle
// ============================================================================

/// The primary entry point. An `Engine` wraps a world and keeps the live
/// networks in it, the simulation clock and the value-type registry.
pub struct Engine<W: World + 'static> {
    world: Arc<W>,
    registry: NetworkRegistry,
    value_types: ValueTypeRegistry,
    safe_mode: SafeMode,
    config: EngineConfig,
    tick: u64,
}

impl<W: World + 'static> Engine<W> {
    /// Create an engine over `world`; fails if `config` is invalid.
    pub fn with_world(world: Arc<W>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            world,
            registry: NetworkRegistry::new(),
            value_types: ValueTypeRegistry::with_defaults(),
            safe_mode: SafeMode::default(),
            config,
            tick: 0,
        })
    }

    /// Use `safe_mode` for every network built from now on.
    pub fn with_safe_mode(mut self, safe_mode: SafeMode) -> Self {
        self.safe_mode = safe_mode;
        self
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    /// Rebuild the network around `seed`, superseding every network it overlaps.
    pub fn rebuild(&mut self, seed: Position) -> NetworkId {
        let world: Arc<dyn World> = self.world.clone();
        PartNetwork::initiate_network_setup(
            world,
            seed.into(),
            &mut self.registry,
            self.safe_mode.clone(),
            self.config.clone(),
        )
    }

    /// Advance the clock by one tick and update every network.
    pub fn tick(&mut self) -> u64 {
        self.tick += 1;
        self.registry.tick(self.tick);
        self.tick
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn network(&self, id: NetworkId) -> Result<&PartNetwork> {
        self.registry.get(id).ok_or_else(|| Error::NotFound(format!("{id}")))
    }

    pub fn network_at(&self, pos: Position) -> Option<&PartNetwork> {
        self.registry.network_at(pos).and_then(|id| self.registry.get(id))
    }

    /// Detach the node at `pos` from the network containing it.
    pub fn remove_cable(&mut self, pos: Position) -> bool {
        let Some(id) = self.registry.network_at(pos) else {
            return false;
        };
        self.registry
            .get_mut(id)
            .is_some_and(|network| network.remove_cable(&PathElement::new(pos)))
    }

    pub fn registry(&self) -> &NetworkRegistry {
        &self.registry
    }

    pub fn value_types(&self) -> &ValueTypeRegistry {
        &self.value_types
    }

    pub fn value_types_mut(&mut self) -> &mut ValueTypeRegistry {
        &mut self.value_types
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Persisted form of `value`.
    pub fn serialize_value(&self, value: &Value) -> Result<ValueTag> {
        evaluate::serialize_value(&self.value_types, &self.config, value)
    }

    /// Restore a persisted value; `None` for an unknown value type.
    pub fn deserialize_value(&self, tag: &ValueTag) -> Result<Option<Value>> {
        evaluate::deserialize_value(&self.value_types, &self.config, tag)
    }
}

/// In-memory world for testing and embedding.
impl Engine<MemoryWorld> {
    pub fn open_memory() -> Self {
        Self {
            world: Arc::new(MemoryWorld::new()),
            registry: NetworkRegistry::new(),
            value_types: ValueTypeRegistry::with_defaults(),
            safe_mode: SafeMode::default(),
            config: EngineConfig::default(),
            tick: 0,
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    #[error("Part state unavailable: {0}")]
    PartStateUnavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Reads are disabled in safe mode")]
    SafeMode,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network element error: {0}")]
    Element(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
