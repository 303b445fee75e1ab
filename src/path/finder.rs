//! Connectivity-aware cluster discovery.

use std::collections::VecDeque;

use hashbrown::HashSet;

use super::{Cluster, PathElement};
use crate::model::{Position, Side};
use crate::world::{Capability, World};

/// Whether the element at `from` links to its neighbour across `side`.
///
/// Both endpoints must be connectable and neither may veto the shared side.
/// The check is symmetric: `can_link(w, a, s) == can_link(w, a.offset(s), s.opposite())`.
pub fn can_link(world: &dyn World, from: Position, side: Side) -> bool {
    let to = from.offset(side);
    world.capabilities(from).contains(Capability::Connectable)
        && world.capabilities(to).contains(Capability::Connectable)
        && world.can_connect(from, side)
        && world.can_connect(to, side.opposite())
}

/// Breadth-first discovery of every element connected to `seed`.
///
/// The seed is always a member, even when no connectable node exists at its
/// position; such a seed yields a degenerate one-element cluster.
pub fn connected_cluster(world: &dyn World, seed: PathElement) -> Cluster {
    let mut visited: HashSet<PathElement> = HashSet::new();
    let mut frontier = VecDeque::new();
    visited.insert(seed);
    frontier.push_back(seed);

    while let Some(current) = frontier.pop_front() {
        for side in Side::ALL {
            if !can_link(world, current.pos, side) {
                continue;
            }
            let neighbour = PathElement::new(current.pos.offset(side));
            if visited.insert(neighbour) {
                frontier.push_back(neighbour);
            }
        }
    }

    tracing::debug!(seed = %seed.pos, size = visited.len(), "computed cluster");
    visited.into_iter().collect()
}
