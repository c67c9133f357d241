use std::future::Future;

use crate::heap::HeapStore;

/// How a node is marked while an operation plays out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Highlight {
    /// The node a sift is working on.
    Active,
    /// Nodes being weighed against each other.
    Comparing,
    /// The two nodes about to change places.
    Swapping,
    /// Nodes that are in order.
    Settled,
    /// Nodes removed from the heap.
    Sorted,
    /// Nodes picked by the user in practice mode.
    Selected,
    /// No marking.
    Plain,
}

/// The view that renders a heap. Everything here is fire-and-forget apart
/// from `animate_swap`, which resolves once the two nodes have traded places.
pub trait Presentation {
    fn highlight(&self, indices: &[usize], highlight: Highlight);

    fn animate_swap(&self, i: usize, j: usize) -> impl Future<Output = ()> + Send;

    fn notify(&self, message: &str);

    /// Called after every change to the heap.
    fn refresh(&self, _heap: &HeapStore) {}
}
