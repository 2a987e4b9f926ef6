//! Super method resolution.

use crate::chain::chain_of;
use crate::error::{ProtoError, Result};
use crate::heap::Heap;
use crate::object::{BoundMethod, CallContext, ObjectId};
use tracing::{debug, trace};

/// Finds the next more ancestral definition of `name`, bypassing the one on
/// `from_owner`.
///
/// The objects of `instance`'s chain that come strictly before `from_owner`
/// are searched from the nearest ancestor toward the root, looking only at
/// attributes each object defines directly. The first hit is bound to
/// `instance` and returned without being invoked.
///
/// Returns `Ok(None)` when no ancestor defines `name`, or when `from_owner`
/// is not on `instance`'s chain at all. A hit that holds no behavior is a
/// [`ProtoError::NotCallable`].
pub fn resolve_super(
    heap: &Heap,
    instance: ObjectId,
    from_owner: ObjectId,
    name: &str,
) -> Result<Option<BoundMethod>> {
    let chain = chain_of(heap, instance);

    let Some(position) = chain.iter().position(|&id| id == from_owner) else {
        debug!(
            instance = %instance,
            owner = %from_owner,
            attr = name,
            "owner is not on the receiver's chain"
        );
        return Ok(None);
    };

    for &ancestor in chain[..position].iter().rev() {
        if let Some(value) = heap.own(ancestor, name) {
            trace!(instance = %instance, ancestor = %ancestor, attr = name, "super binding found");
            return BoundMethod::from_value(instance, ancestor, name, value)
                .map(Some)
                .ok_or_else(|| ProtoError::NotCallable(format!("{}.{}", heap.label(ancestor), name)));
        }
    }

    trace!(instance = %instance, owner = %from_owner, attr = name, "no ancestral binding");
    Ok(None)
}

impl CallContext {
    /// Resolves the super method for the running call. `name` defaults to
    /// the name the running method was found under.
    pub fn super_method(&self, heap: &Heap, name: Option<&str>) -> Result<Option<BoundMethod>> {
        resolve_super(heap, self.receiver, self.owner, name.unwrap_or(&self.name))
    }
}
