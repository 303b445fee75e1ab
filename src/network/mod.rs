//! # Networks
//!
//! A [`Network`] owns one cluster and the elements its nodes contribute,
//! and drives them once per simulation tick. [`PartNetwork`] layers part
//! and variable bookkeeping on top; [`NetworkRegistry`] keeps the live
//! networks of a world and supersedes them on topology rebuilds.

pub mod element;
pub mod part;
pub mod registry;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::model::Position;
use crate::path::{connected_cluster, Cluster, PathElement};
use crate::world::{Capability, World};

pub use element::{poll_elements, NetworkElement};
pub use part::PartNetwork;
pub use registry::{NetworkId, NetworkRegistry};

// ============================================================================
// ChangeSignal
// ============================================================================

/// Edge-triggered flag: any number of raises between two takes are
/// observed as a single event.
#[derive(Debug, Default)]
pub struct ChangeSignal(AtomicBool);

impl ChangeSignal {
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Consume the signal; true at most once per raise burst.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

// ============================================================================
// Network
// ============================================================================

/// A cluster plus the elements contributed by its nodes.
pub struct Network<N: ?Sized> {
    cluster: Cluster,
    elements: Vec<Box<dyn NetworkElement<N>>>,
    last_tick: Option<u64>,
}

impl<N: ?Sized> Network<N> {
    pub fn from_cluster(cluster: Cluster, elements: Vec<Box<dyn NetworkElement<N>>>) -> Self {
        Self { cluster, elements, last_tick: None }
    }

    /// Discover the cluster around `seed` and collect the elements of every
    /// element provider in it. The result has not been ticked yet.
    pub fn initiate<F>(world: &dyn World, seed: PathElement, mut elements_of: F) -> Self
    where
        F: FnMut(Position) -> Vec<Box<dyn NetworkElement<N>>>,
    {
        let cluster = connected_cluster(world, seed);
        let elements = cluster
            .sorted_positions()
            .into_iter()
            .filter(|pos| world.capabilities(*pos).contains(Capability::ElementProvider))
            .flat_map(&mut elements_of)
            .collect();
        Self::from_cluster(cluster, elements)
    }

    pub fn cluster(&self) -> &Cluster {
        &self.cluster
    }

    pub fn elements(&self) -> &[Box<dyn NetworkElement<N>>] {
        &self.elements
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn last_tick(&self) -> Option<u64> {
        self.last_tick
    }

    /// Claim `tick` for an update pass; false if it was already run.
    pub fn begin_tick(&mut self, tick: u64) -> bool {
        if self.last_tick == Some(tick) {
            tracing::debug!(tick, "network already updated this tick");
            return false;
        }
        self.last_tick = Some(tick);
        true
    }

    /// Move the elements out so they can be polled against a network
    /// that owns this one. Pair with [`restore_elements`](Self::restore_elements).
    pub(crate) fn take_elements(&mut self) -> Vec<Box<dyn NetworkElement<N>>> {
        std::mem::take(&mut self.elements)
    }

    pub(crate) fn restore_elements(&mut self, mut elements: Vec<Box<dyn NetworkElement<N>>>) {
        // Elements added while polling go after the polled ones.
        elements.append(&mut self.elements);
        self.elements = elements;
    }

    /// Poll every due element against `network`. Returns false on a
    /// repeated call within the same tick.
    pub fn update(&mut self, tick: u64, network: &N) -> bool {
        if !self.begin_tick(tick) {
            return false;
        }
        poll_elements(&mut self.elements, tick, network);
        true
    }

    /// Detach the node at `element` together with its elements.
    pub fn remove_cable(&mut self, element: &PathElement) -> bool {
        let Some(cluster) = self.cluster.without(element) else {
            return false;
        };
        self.cluster = cluster;
        self.elements.retain(|e| e.position() != element.pos);
        true
    }
}

impl<N: ?Sized> PartialEq for Network<N> {
    fn eq(&self, other: &Self) -> bool {
        self.cluster == other.cluster
    }
}

impl<N: ?Sized> fmt::Debug for Network<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("nodes", &self.cluster.len())
            .field("elements", &self.elements.len())
            .field("last_tick", &self.last_tick)
            .finish()
    }
}
