//! Path elements and clusters.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::model::Position;

/// One connectable unit in the world, identified by its position.
///
/// The owning node is resolved through the [`World`](crate::world::World)
/// on demand, so elements never hold on to node state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathElement {
    pub pos: Position,
}

impl PathElement {
    pub fn new(pos: Position) -> Self {
        Self { pos }
    }
}

impl From<Position> for PathElement {
    fn from(pos: Position) -> Self {
        Self::new(pos)
    }
}

/// An unordered set of connected path elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cluster {
    elements: HashSet<PathElement>,
}

impl Cluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(element: PathElement) -> Self {
        Self::from_iter([element])
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.elements.contains(&PathElement::new(pos))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathElement> {
        self.elements.iter()
    }

    /// Member positions in ascending order.
    pub fn sorted_positions(&self) -> Vec<Position> {
        let mut positions: Vec<Position> = self.elements.iter().map(|e| e.pos).collect();
        positions.sort();
        positions
    }

    /// A new cluster without `element`; `None` if it was not a member.
    pub fn without(&self, element: &PathElement) -> Option<Cluster> {
        if !self.elements.contains(element) {
            return None;
        }
        let mut elements = self.elements.clone();
        elements.remove(element);
        Some(Cluster { elements })
    }

    pub fn shares_element_with(&self, other: &Cluster) -> bool {
        let (small, large) = if self.len() <= other.len() { (self, other) } else { (other, self) };
        small.elements.iter().any(|e| large.elements.contains(e))
    }
}

impl FromIterator<PathElement> for Cluster {
    fn from_iter<I: IntoIterator<Item = PathElement>>(iter: I) -> Self {
        Self { elements: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(x: i32) -> PathElement {
        PathElement::new(Position::at(x, 0, 0))
    }

    #[test]
    fn test_equality_is_order_independent() {
        let a: Cluster = [el(1), el(2), el(3)].into_iter().collect();
        let b: Cluster = [el(3), el(1), el(2)].into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_without_does_not_mutate() {
        let a: Cluster = [el(1), el(2)].into_iter().collect();
        let b = a.without(&el(1)).unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 1);
        assert!(a.without(&el(9)).is_none());
    }

    #[test]
    fn test_shares_element_with() {
        let a: Cluster = [el(1), el(2)].into_iter().collect();
        let b: Cluster = [el(2), el(5)].into_iter().collect();
        let c = Cluster::single(el(7));
        assert!(a.shares_element_with(&b));
        assert!(!a.shares_element_with(&c));
    }
}
