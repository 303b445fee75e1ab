//! Registry of the live networks in a world.

use std::fmt;

use hashbrown::HashMap;

use super::PartNetwork;
use crate::model::Position;

/// Handle of a network inside a [`NetworkRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetworkId(pub u64);

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "network-{}", self.0)
    }
}

/// The live networks of one world.
///
/// Passed explicitly to topology rebuilds; a rebuild installs its new
/// network here and thereby retires every network it overlaps.
#[derive(Debug, Default)]
pub struct NetworkRegistry {
    networks: HashMap<NetworkId, PartNetwork>,
    next_id: u64,
}

impl NetworkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `network`, removing every registered network that shares a
    /// node with it.
    pub fn add_new_network(&mut self, network: PartNetwork) -> NetworkId {
        let cluster = network.network().cluster();
        let superseded: Vec<NetworkId> = self
            .networks
            .iter()
            .filter(|(_, existing)| existing.network().cluster().shares_element_with(cluster))
            .map(|(id, _)| *id)
            .collect();
        for id in superseded {
            tracing::debug!(network = %id, "superseded by rebuild");
            self.networks.remove(&id);
        }

        let id = NetworkId(self.next_id);
        self.next_id += 1;
        self.networks.insert(id, network);
        id
    }

    /// The network whose cluster contains `pos`.
    pub fn network_at(&self, pos: Position) -> Option<NetworkId> {
        self.networks
            .iter()
            .find(|(_, network)| network.network().cluster().contains(pos))
            .map(|(id, _)| *id)
    }

    pub fn get(&self, id: NetworkId) -> Option<&PartNetwork> {
        self.networks.get(&id)
    }

    pub fn get_mut(&mut self, id: NetworkId) -> Option<&mut PartNetwork> {
        self.networks.get_mut(&id)
    }

    pub fn remove(&mut self, id: NetworkId) -> Option<PartNetwork> {
        self.networks.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    pub fn ids(&self) -> Vec<NetworkId> {
        let mut ids: Vec<NetworkId> = self.networks.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Update every network once for `tick`.
    pub fn tick(&mut self, tick: u64) {
        for network in self.networks.values_mut() {
            network.update(tick);
        }
    }
}
