//! End-to-end tests for cluster discovery over generated grids.
//!
//! Each grid is a flat W x D layer of cables with random holes and random
//! per-side vetoes. The computed cluster is checked against an independent
//! flood fill over the generated data.

use std::collections::{BTreeSet, HashSet};

use cablenet::{can_link, connected_cluster, MemoryWorld, PathElement, Position, Side, World};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const HORIZONTAL: [Side; 4] = [Side::North, Side::South, Side::West, Side::East];

#[derive(Debug, Clone)]
struct Grid {
    width: i32,
    depth: i32,
    occupied: Vec<bool>,
    vetoes: Vec<(i32, i32, Side)>,
}

impl Grid {
    fn is_occupied(&self, x: i32, z: i32) -> bool {
        (0..self.width).contains(&x) && (0..self.depth).contains(&z) && self.occupied[(z * self.width + x) as usize]
    }

    fn vetoed(&self, x: i32, z: i32, side: Side) -> bool {
        self.vetoes.contains(&(x, z, side))
    }

    fn world(&self) -> MemoryWorld {
        let world = MemoryWorld::new();
        for z in 0..self.depth {
            for x in 0..self.width {
                if self.is_occupied(x, z) {
                    world.place_cable(Position::at(x, 0, z));
                }
            }
        }
        for (x, z, side) in &self.vetoes {
            world.disconnect(Position::at(*x, 0, *z), *side);
        }
        world
    }

    /// Flood fill over the raw grid data.
    fn reachable(&self, seed: Position) -> BTreeSet<Position> {
        let mut seen = BTreeSet::from([seed]);
        let mut stack = vec![seed];
        while let Some(pos) = stack.pop() {
            for side in HORIZONTAL {
                let next = pos.offset(side);
                let linked = self.is_occupied(pos.x, pos.z)
                    && self.is_occupied(next.x, next.z)
                    && !self.vetoed(pos.x, pos.z, side)
                    && !self.vetoed(next.x, next.z, side.opposite());
                if linked && seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        seen
    }
}

fn arb_grid() -> impl Strategy<Value = Grid> {
    (2i32..8, 2i32..8).prop_flat_map(|(width, depth)| {
        let cells = (width * depth) as usize;
        let veto = (0..width, 0..depth, prop::sample::select(HORIZONTAL.to_vec()));
        (
            Just(width),
            Just(depth),
            proptest::collection::vec(prop::bool::weighted(0.8), cells),
            proptest::collection::vec(veto, 0..12),
        )
            .prop_map(|(width, depth, occupied, vetoes)| Grid { width, depth, occupied, vetoes })
    })
}

proptest! {
    #[test]
    fn cluster_matches_flood_fill(grid in arb_grid(), sx in 0i32..8, sz in 0i32..8) {
        let seed = Position::at(sx % grid.width, 0, sz % grid.depth);
        let world = grid.world();

        let cluster = connected_cluster(&world, PathElement::new(seed));
        let found: BTreeSet<Position> = cluster.sorted_positions().into_iter().collect();

        prop_assert_eq!(found, grid.reachable(seed));
    }

    #[test]
    fn cluster_is_closed_under_links(grid in arb_grid()) {
        let world = grid.world();
        let cluster = connected_cluster(&world, PathElement::new(Position::at(0, 0, 0)));

        for element in cluster.iter() {
            for side in Side::ALL {
                let neighbour = element.pos.offset(side);
                if can_link(&world, element.pos, side) {
                    prop_assert!(cluster.contains(neighbour), "{} -> {} missing", element.pos, neighbour);
                }
            }
        }
    }

    #[test]
    fn clusters_partition_the_grid(grid in arb_grid()) {
        let world = grid.world();
        let mut assigned: HashSet<Position> = HashSet::new();
        for z in 0..grid.depth {
            for x in 0..grid.width {
                let pos = Position::at(x, 0, z);
                if !grid.is_occupied(x, z) || assigned.contains(&pos) {
                    continue;
                }
                let cluster = connected_cluster(&world, PathElement::new(pos));
                for member in cluster.sorted_positions() {
                    prop_assert!(assigned.insert(member), "{} in two clusters", member);
                }
            }
        }
    }
}

#[test]
fn test_veto_on_one_side_blocks_both_directions() {
    let world = MemoryWorld::new();
    world.place_cable(Position::at(0, 0, 0));
    world.place_cable(Position::at(1, 0, 0));
    world.disconnect(Position::at(0, 0, 0), Side::East);

    for seed in [Position::at(0, 0, 0), Position::at(1, 0, 0)] {
        assert_eq!(connected_cluster(&world, seed.into()).sorted_positions(), vec![seed]);
    }
}

#[test]
fn test_vertical_links_count() {
    let world = MemoryWorld::new();
    for y in 0..4 {
        world.place_cable(Position::at(0, y, 0));
    }
    let cluster = connected_cluster(&world, Position::at(0, 3, 0).into());
    assert_eq!(cluster.len(), 4);
}
