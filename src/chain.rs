//! Prototype chain traversal.
//!
//! Both entry points follow back-references one object at a time and stop at
//! a root or at the first object already visited, so a misconfigured graph
//! (an object pointing back into its own ancestry) still terminates.

use crate::heap::Heap;
use crate::object::ObjectId;
use std::collections::HashSet;
use tracing::debug;

/// Iterator over an object and its ancestors, nearest first.
pub struct Ancestors<'h> {
    heap: &'h Heap,
    next: Option<ObjectId>,
    seen: HashSet<ObjectId>,
}

impl Iterator for Ancestors<'_> {
    type Item = ObjectId;

    fn next(&mut self) -> Option<ObjectId> {
        let current = self.next.take()?;
        self.seen.insert(current);

        self.next = match self.heap.proto_of(current) {
            Some(parent) if self.seen.contains(&parent) => {
                debug!(object = %current, parent = %parent, "back-reference cycle, stopping walk");
                None
            }
            parent => parent,
        };

        Some(current)
    }
}

/// Walks outward from `start`: `start` itself, its parent, its grandparent,
/// and so on up to the root.
pub fn ancestors(heap: &Heap, start: ObjectId) -> Ancestors<'_> {
    Ancestors {
        heap,
        next: Some(start),
        seen: HashSet::new(),
    }
}

/// Returns the chain of `start` root-first, ending with `start`.
///
/// No object appears twice. A self-referential object yields `[start]`.
pub fn chain_of(heap: &Heap, start: ObjectId) -> Vec<ObjectId> {
    let mut chain: Vec<ObjectId> = ancestors(heap, start).collect();
    chain.reverse();
    chain
}
