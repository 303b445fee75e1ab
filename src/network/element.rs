//! Network elements: the per-tick units a network polls.

use crate::model::Position;
use crate::Result;

/// One unit of behaviour contributed by a node to the network it is part of.
///
/// `N` is the network type handed back to the element on every callback,
/// so elements can read through the network's caches while they update.
pub trait NetworkElement<N: ?Sized>: Send + Sync {
    /// Position of the node that contributed this element.
    fn position(&self) -> Position;

    /// Called on ticks that are a multiple of [`update_interval`](Self::update_interval).
    fn update(&mut self, network: &N) -> Result<()>;

    /// Called once per update pass after parts were added or removed.
    fn on_parts_changed(&mut self, _network: &N) {}

    /// Ticks between two updates; zero is treated as one.
    fn update_interval(&self) -> u64 {
        1
    }
}

/// Poll every element due at `tick`.
///
/// A failing element is logged and skipped; its siblings still update.
/// Returns the number of failures.
pub fn poll_elements<N: ?Sized>(
    elements: &mut [Box<dyn NetworkElement<N>>],
    tick: u64,
    network: &N,
) -> usize {
    let mut failures = 0;
    for element in elements.iter_mut() {
        if tick % element.update_interval().max(1) != 0 {
            continue;
        }
        if let Err(e) = element.update(network) {
            failures += 1;
            tracing::warn!(pos = %element.position(), error = %e, "network element update failed");
        }
    }
    failures
}
