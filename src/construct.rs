//! Class-style construction on top of delegation.

use crate::error::{ProtoError, Result};
use crate::heap::Heap;
use crate::invoke::Invoker;
use crate::object::{BoundMethod, ObjectId, Value};
use tracing::debug;

/// Attribute invoked by [`construct`] on a freshly extended object.
pub const INITIALIZER: &str = "__init__";

/// Makes an object delegate to `parent`.
///
/// With no seed, or a `nil` seed, a fresh object is allocated. An object
/// seed is adopted and re-parented in place. Any other seed is rejected
/// with [`ProtoError::InvalidSeed`].
pub fn extend(heap: &mut Heap, parent: ObjectId, seed: Option<Value>) -> Result<ObjectId> {
    let child = match seed {
        None | Some(Value::Nil) => heap.alloc(None),
        Some(Value::Object(id)) => id,
        Some(other) => return Err(ProtoError::InvalidSeed(other.type_name().to_string())),
    };
    heap.set_proto(child, Some(parent));
    Ok(child)
}

/// [`extend`]s `parent`, then runs the new object's initializer once, with
/// no arguments, when it exposes one directly or through its chain.
pub fn construct<I: Invoker + ?Sized>(
    invoker: &mut I,
    parent: ObjectId,
    seed: Option<Value>,
) -> Result<ObjectId> {
    let instance = extend(invoker.heap_mut(), parent, seed)?;

    let heap = invoker.heap();
    let initializer = match heap.lookup(instance, INITIALIZER) {
        Some((owner, value)) => Some(
            BoundMethod::from_value(instance, owner, INITIALIZER, value).ok_or_else(|| {
                ProtoError::NotCallable(format!("{}.{}", heap.label(owner), INITIALIZER))
            })?,
        ),
        None => None,
    };

    if let Some(initializer) = initializer {
        debug!(
            instance = %instance,
            owner = %initializer.owner,
            "running initializer"
        );
        invoker.invoke(&initializer, &[])?;
    }

    Ok(instance)
}
