//! # Topology
//!
//! [`PathElement`]s are the addressable graph nodes; a [`Cluster`] is a
//! maximal set of them connected under the current per-side connectivity
//! flags, computed by [`connected_cluster`].
//!
//! Clusters are immutable. A topology change produces a new cluster rather
//! than editing an existing one.

pub mod cluster;
pub mod finder;

pub use cluster::{Cluster, PathElement};
pub use finder::{connected_cluster, can_link};
