use protochain::chain::{ancestors, chain_of};
use protochain::heap::Heap;

#[test]
fn test_chain_of_root_is_itself() {
    let mut heap = Heap::new();
    let a = heap.alloc(None);
    assert_eq!(chain_of(&heap, a), vec![a]);
}

#[test]
fn test_chain_of_linear_chain_is_root_first() {
    let mut heap = Heap::new();
    let a = heap.alloc(None);
    let b = heap.alloc(Some(a));
    let c = heap.alloc(Some(b));

    assert_eq!(chain_of(&heap, c), vec![a, b, c]);
    assert_eq!(chain_of(&heap, b), vec![a, b]);
}

#[test]
fn test_chain_of_self_reference_terminates() {
    let mut heap = Heap::new();
    let a = heap.alloc(None);
    heap.set_proto(a, Some(a));

    assert_eq!(chain_of(&heap, a), vec![a]);
}

#[test]
fn test_chain_of_stops_at_cycle_back_into_ancestry() {
    let mut heap = Heap::new();
    let a = heap.alloc(None);
    let b = heap.alloc(Some(a));
    let c = heap.alloc(Some(b));
    // a -> c closes the loop c -> b -> a -> c
    heap.set_proto(a, Some(c));

    assert_eq!(chain_of(&heap, c), vec![a, b, c]);
    assert_eq!(chain_of(&heap, a), vec![b, c, a]);
}

#[test]
fn test_chain_of_is_idempotent() {
    let mut heap = Heap::new();
    let a = heap.alloc(None);
    let b = heap.alloc(Some(a));
    let c = heap.alloc(Some(b));

    assert_eq!(chain_of(&heap, c), chain_of(&heap, c));
}

#[test]
fn test_chain_of_reflects_reparenting() {
    let mut heap = Heap::new();
    let a = heap.alloc(None);
    let b = heap.alloc(None);
    let c = heap.alloc(Some(a));
    assert_eq!(chain_of(&heap, c), vec![a, c]);

    heap.set_proto(c, Some(b));
    assert_eq!(chain_of(&heap, c), vec![b, c]);

    heap.set_proto(c, None);
    assert_eq!(chain_of(&heap, c), vec![c]);
}

#[test]
fn test_shared_parent_appears_in_both_chains() {
    let mut heap = Heap::new();
    let parent = heap.alloc(None);
    let left = heap.alloc(Some(parent));
    let right = heap.alloc(Some(parent));

    assert_eq!(chain_of(&heap, left), vec![parent, left]);
    assert_eq!(chain_of(&heap, right), vec![parent, right]);
}

#[test]
fn test_ancestors_yields_nearest_first() {
    let mut heap = Heap::new();
    let a = heap.alloc(None);
    let b = heap.alloc(Some(a));
    let c = heap.alloc(Some(b));

    let outward: Vec<_> = ancestors(&heap, c).collect();
    assert_eq!(outward, vec![c, b, a]);
}
