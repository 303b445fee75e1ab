//! Part networks: networks that know their parts and variables.
//!
//! On top of a [`Network`] a part network keeps
//! - a part id → (position, side) map, resolved through the world on read,
//! - an ordered list of variable containers with a lazily built composite
//!   index over all their facades,
//! - a per-tick memo of evaluated expression values.
//!
//! Reads that hit a node which vanished out-of-band report it as absent or
//! as [`Error::PartStateUnavailable`]; the network itself never becomes
//! inconsistent because of it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;

use super::{poll_elements, ChangeSignal, Network, NetworkId, NetworkRegistry};
use crate::config::EngineConfig;
use crate::evaluate::{
    evaluate_operator_bounded, safe_readable_value, EvaluationError, FacadeSource, ReadableValue,
    SafeMode, Variable, VariableFacade, VariableId,
};
use crate::model::{Aspect, PartId, PartPos, PartState, PartType, Position, Value};
use crate::path::PathElement;
use crate::world::{Capability, World};
use crate::{Error, Result};

// ============================================================================
// Composite variable cache
// ============================================================================

/// Variable containers and the composite index over their facades.
#[derive(Debug, Default)]
struct Containers {
    positions: Vec<Position>,
    /// Facade id → the container that holds it; `None` until built.
    index: Option<HashMap<VariableId, Position>>,
}

impl Containers {
    fn invalidate(&mut self) {
        self.index = None;
    }

    /// Build the index if needed. Containers that no longer resolve are
    /// dropped from `positions`; on an id collision the first container wins.
    fn index(&mut self, world: &dyn World) -> &HashMap<VariableId, Position> {
        let positions = &mut self.positions;
        self.index.get_or_insert_with(|| {
            let mut index = HashMap::new();
            positions.retain(|pos| match world.variable_facade_ids(*pos) {
                Some(ids) => {
                    for id in ids {
                        if let Some(existing) = index.get(&id) {
                            tracing::debug!(variable = %id, kept = %existing, ignored = %pos, "duplicate variable id");
                            continue;
                        }
                        index.insert(id, *pos);
                    }
                    true
                }
                None => {
                    tracing::error!(pos = %pos, "variable container no longer exists, dropping it");
                    false
                }
            });
            index
        })
    }
}

// ============================================================================
// PartNetwork
// ============================================================================

/// A network of parts and variable containers.
pub struct PartNetwork {
    network: Network<PartNetwork>,
    world: Arc<dyn World>,
    safe_mode: SafeMode,
    config: EngineConfig,
    part_positions: HashMap<PartId, PartPos>,
    containers: RwLock<Containers>,
    lazy_values: RwLock<HashMap<VariableId, Value>>,
    parts_changed: ChangeSignal,
    parts_changed_notifications: AtomicU64,
}

impl PartNetwork {
    pub fn new(network: Network<PartNetwork>, world: Arc<dyn World>, safe_mode: SafeMode, config: EngineConfig) -> Self {
        Self {
            network,
            world,
            safe_mode,
            config,
            part_positions: HashMap::new(),
            containers: RwLock::new(Containers::default()),
            lazy_values: RwLock::new(HashMap::new()),
            parts_changed: ChangeSignal::default(),
            parts_changed_notifications: AtomicU64::new(0),
        }
    }

    /// Build the network around `seed`: discover the cluster, collect its
    /// elements, and register every mounted part and variable container.
    pub fn initiate(world: Arc<dyn World>, seed: PathElement, safe_mode: SafeMode, config: EngineConfig) -> Self {
        let network = Network::initiate(world.as_ref(), seed, |pos| world.network_elements(pos));
        let mut part_network = Self::new(network, Arc::clone(&world), safe_mode, config);

        for pos in part_network.network.cluster().sorted_positions() {
            let capabilities = world.capabilities(pos);
            if capabilities.contains(Capability::PartContainer) {
                for (side, id) in world.parts(pos) {
                    if !part_network.add_part(id, PartPos::new(pos, side)) {
                        tracing::warn!(part = %id, pos = %pos, "duplicate part id in network");
                    }
                }
            }
            if capabilities.contains(Capability::VariableContainer) {
                part_network.add_variable_container(pos);
            }
        }

        tracing::debug!(
            seed = %seed.pos,
            nodes = part_network.network.cluster().len(),
            parts = part_network.part_positions.len(),
            elements = part_network.network.element_count(),
            "initiated part network"
        );
        part_network
    }

    /// [`initiate`](Self::initiate) and install the result in `registry`.
    pub fn initiate_network_setup(
        world: Arc<dyn World>,
        seed: PathElement,
        registry: &mut NetworkRegistry,
        safe_mode: SafeMode,
        config: EngineConfig,
    ) -> NetworkId {
        registry.add_new_network(Self::initiate(world, seed, safe_mode, config))
    }

    pub fn network(&self) -> &Network<PartNetwork> {
        &self.network
    }

    pub fn world(&self) -> &dyn World {
        self.world.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // Parts
    // ========================================================================

    /// Register a part; false (and no change) if the id is already known.
    pub fn add_part(&mut self, id: PartId, target: PartPos) -> bool {
        if self.part_positions.contains_key(&id) {
            return false;
        }
        self.part_positions.insert(id, target);
        true
    }

    pub fn remove_part(&mut self, id: PartId) {
        self.part_positions.remove(&id);
    }

    /// Registered position of `id`, even if it went stale.
    pub fn part_position(&self, id: PartId) -> Option<PartPos> {
        self.part_positions.get(&id).copied()
    }

    pub fn part_count(&self) -> usize {
        self.part_positions.len()
    }

    /// True iff `id` is registered and the world still has a part there.
    /// Always false in safe mode.
    pub fn has_part(&self, id: PartId) -> bool {
        self.safe_mode.should_work() && self.part_position(id).is_some_and(|target| self.world.has_part(target))
    }

    pub fn get_part_state(&self, id: PartId) -> Result<PartState> {
        self.ensure_working()?;
        let target = self.resolve_part(id)?;
        self.world
            .part_state(target)
            .ok_or_else(|| Error::PartStateUnavailable(format!("part {id} at {target} has no state")))
    }

    pub fn get_part_type(&self, id: PartId) -> Result<PartType> {
        self.ensure_working()?;
        let target = self.resolve_part(id)?;
        self.world
            .part_type(target)
            .ok_or_else(|| Error::PartStateUnavailable(format!("part {id} at {target} has no type")))
    }

    /// Reads of live world state stop here while the safe-mode predicate
    /// reports false.
    fn ensure_working(&self) -> Result<()> {
        if self.safe_mode.should_work() { Ok(()) } else { Err(Error::SafeMode) }
    }

    fn resolve_part(&self, id: PartId) -> Result<PartPos> {
        match self.part_position(id) {
            Some(target) if self.world.has_part(target) => Ok(target),
            Some(target) => Err(Error::PartStateUnavailable(format!("no part at {target} for part {id}"))),
            None => Err(Error::PartStateUnavailable(format!("part {id} is not in this network"))),
        }
    }

    pub fn has_part_variable(&self, id: PartId, aspect: &Aspect) -> bool {
        self.get_part_variable(id, aspect).is_ok()
    }

    /// The variable a reader part exposes for `aspect`.
    pub fn get_part_variable(&self, id: PartId, aspect: &Aspect) -> Result<Variable> {
        self.ensure_working()?;
        let state = self.get_part_state(id)?;
        let part_type = self.get_part_type(id)?;
        if !state.is_reader() || !part_type.is_reader() {
            return Err(Error::PartStateUnavailable(format!("part {id} is not a reader")));
        }
        part_type
            .variable(&state, aspect)
            .ok_or_else(|| Error::PartStateUnavailable(format!("part {id} cannot read {}", aspect.key)))
    }

    // ========================================================================
    // Variable containers
    // ========================================================================

    /// Track a variable container; false if it was already tracked.
    pub fn add_variable_container(&self, pos: Position) -> bool {
        let mut containers = self.containers.write();
        if containers.positions.contains(&pos) {
            return false;
        }
        containers.positions.push(pos);
        containers.invalidate();
        true
    }

    pub fn remove_variable_container(&self, pos: Position) -> bool {
        let mut containers = self.containers.write();
        let before = containers.positions.len();
        containers.positions.retain(|p| *p != pos);
        if containers.positions.len() == before {
            return false;
        }
        containers.invalidate();
        true
    }

    /// Tracked containers, in insertion order.
    pub fn variable_containers(&self) -> Vec<Position> {
        self.containers.read().positions.clone()
    }

    /// Forget the composite index, e.g. after facades were added to a
    /// tracked container.
    pub fn invalidate_variable_cache(&self) {
        self.containers.write().invalidate();
    }

    pub fn has_variable_facade(&self, id: VariableId) -> bool {
        self.containers.write().index(self.world.as_ref()).contains_key(&id)
    }

    /// Look `id` up in the composite index and read it from its container.
    pub fn variable_facade(&self, id: VariableId) -> Option<VariableFacade> {
        let pos = self.containers.write().index(self.world.as_ref()).get(&id).copied()?;
        self.world.variable_facade(pos, id)
    }

    // ========================================================================
    // Per-tick value cache
    // ========================================================================

    pub fn set_value(&self, id: VariableId, value: Value) {
        self.lazy_values.write().insert(id, value);
    }

    pub fn has_value(&self, id: VariableId) -> bool {
        self.lazy_values.read().contains_key(&id)
    }

    pub fn get_value(&self, id: VariableId) -> Option<Value> {
        self.lazy_values.read().get(&id).cloned()
    }

    // ========================================================================
    // Variable reads
    // ========================================================================

    /// Evaluate the variable behind facade `id`.
    ///
    /// Fails with [`Error::SafeMode`] without touching the world when the
    /// safe-mode predicate reports false. Expression results are memoized
    /// until the next update pass.
    pub fn read_variable(&self, id: VariableId) -> Result<Value> {
        self.ensure_working()?;
        self.resolve_variable(id, 0)
    }

    fn resolve_variable(&self, id: VariableId, depth: usize) -> Result<Value> {
        let max_depth = self.config.max_expression_depth;
        if depth > max_depth {
            return Err(EvaluationError::ExpressionDepthExceeded { variable: id.0, max_depth }.into());
        }
        let facade = self.variable_facade(id).ok_or(EvaluationError::UnknownVariable(id.0))?;

        match facade.source {
            FacadeSource::Constant(value) => Ok(value),
            FacadeSource::PartAspect { part_id, aspect } => self
                .get_part_variable(part_id, &aspect)
                .map(Variable::into_value)
                .map_err(|e| match e {
                    Error::PartStateUnavailable(reason) => EvaluationError::PartState(reason).into(),
                    other => other,
                }),
            FacadeSource::Expression { operator, inputs } => {
                if let Some(value) = self.get_value(id) {
                    return Ok(value);
                }
                let values = inputs
                    .iter()
                    .map(|input| self.resolve_variable(*input, depth + 1))
                    .collect::<Result<Vec<_>>>()?;
                let value = evaluate_operator_bounded(&operator, &values, self.config.max_curry_depth)?;
                self.set_value(id, value.clone());
                Ok(value)
            }
        }
    }

    /// [`read_variable`](Self::read_variable) rendered for display; never fails.
    pub fn readable_variable(&self, id: VariableId) -> ReadableValue {
        safe_readable_value(&self.safe_mode, Some(|| self.read_variable(id)))
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Schedule one parts-changed notification for the next update.
    pub fn notify_parts_changed(&self) {
        self.parts_changed.raise();
    }

    /// Parts-changed notifications fired so far.
    pub fn parts_changed_notifications(&self) -> u64 {
        self.parts_changed_notifications.load(Ordering::Relaxed)
    }

    /// Run one update pass for `tick`.
    ///
    /// Clears the value memo, polls every due element, then fires a pending
    /// parts-changed notification. A second call for the same tick does
    /// nothing and returns false.
    pub fn update(&mut self, tick: u64) -> bool {
        if !self.network.begin_tick(tick) {
            return false;
        }
        self.lazy_values.write().clear();

        // While polling, elements see a network without elements.
        let mut elements = self.network.take_elements();
        let this = &*self;
        poll_elements(&mut elements, tick, this);
        if this.parts_changed.take() {
            tracing::debug!(tick, "parts changed");
            this.parts_changed_notifications.fetch_add(1, Ordering::Relaxed);
            for element in elements.iter_mut() {
                element.on_parts_changed(this);
            }
        }
        self.network.restore_elements(elements);
        true
    }

    /// Detach the node at `element`, forgetting its parts and container.
    pub fn remove_cable(&mut self, element: &PathElement) -> bool {
        if !self.network.remove_cable(element) {
            return false;
        }
        self.part_positions.retain(|_, target| target.pos != element.pos);
        self.remove_variable_container(element.pos);
        self.parts_changed.raise();
        true
    }
}

impl PartialEq for PartNetwork {
    fn eq(&self, other: &Self) -> bool {
        self.network == other.network
    }
}

impl fmt::Debug for PartNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartNetwork")
            .field("network", &self.network)
            .field("parts", &self.part_positions.len())
            .field("containers", &self.containers.read().positions.len())
            .finish()
    }
}
