//! Invocation of bound callables.
//!
//! The receiver is always passed explicitly through a [`CallContext`]; no
//! callable captures `self` on its own.

use crate::error::{ProtoError, Result};
use crate::heap::Heap;
use crate::object::{BoundMethod, CallContext, Callable, ObjectId, Value};

/// A runtime able to execute bound callables against a heap.
pub trait Invoker {
    fn heap(&self) -> &Heap;

    fn heap_mut(&mut self) -> &mut Heap;

    /// Runs `method` with its receiver as `self`.
    fn invoke(&mut self, method: &BoundMethod, args: &[Value]) -> Result<Value>;
}

/// A bare heap runs native callables only. Script functions need an
/// interpreter to evaluate their bodies.
impl Invoker for Heap {
    fn heap(&self) -> &Heap {
        self
    }

    fn heap_mut(&mut self) -> &mut Heap {
        self
    }

    fn invoke(&mut self, method: &BoundMethod, args: &[Value]) -> Result<Value> {
        match &method.callable {
            Callable::Native(native) => (native.function)(self, &method.context(), args),
            Callable::Script(_) => Err(ProtoError::NotCallable(format!(
                "{} (script function without an interpreter)",
                method.name
            ))),
        }
    }
}

/// Looks `name` up from `receiver` and invokes it.
pub fn call_method<I: Invoker + ?Sized>(
    invoker: &mut I,
    receiver: ObjectId,
    name: &str,
    args: &[Value],
) -> Result<Value> {
    let heap = invoker.heap();
    let method = match heap.lookup(receiver, name) {
        Some((owner, value)) => BoundMethod::from_value(receiver, owner, name, value)
            .ok_or_else(|| ProtoError::NotCallable(format!("{}.{}", heap.label(owner), name)))?,
        None => {
            return Err(ProtoError::MissingMethod {
                receiver: heap.label(receiver),
                name: name.to_string(),
            })
        }
    };
    invoker.invoke(&method, args)
}

/// Invokes the super method of the running call, if there is one.
///
/// Returns `Ok(None)` when no ancestor defines the method, which is the
/// normal outcome for a root implementation.
pub fn call_super<I: Invoker + ?Sized>(
    invoker: &mut I,
    context: &CallContext,
    name: Option<&str>,
    args: &[Value],
) -> Result<Option<Value>> {
    match context.super_method(invoker.heap(), name)? {
        Some(method) => invoker.invoke(&method, args).map(Some),
        None => Ok(None),
    }
}
