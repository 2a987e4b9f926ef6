use crate::chain::chain_of;
use crate::construct::{construct, extend};
use crate::error::{ProtoError, Result};
use crate::heap::Heap;
use crate::invoke::Invoker;
use crate::object::{CallContext, Callable, NativeFunction, ObjectId, Value};
use std::collections::HashMap;

/// Name of the root object every script sees.
pub const ROOT_OBJECT: &str = "Object";

/// Creates the root object with its native methods and binds it in the
/// global namespace.
///
/// Because the methods live on the root, every object extended from it
/// reaches them through delegation, with itself as the receiver:
/// - `extend(seed?)` - a new object delegating to the receiver
/// - `new(seed?)` - like `extend`, then runs `__init__` once
/// - `chain()` - the receiver's chain, root first
/// - `own(name)` - whether the receiver defines `name` directly
pub fn register_builtins(heap: &mut Heap, globals: &mut HashMap<String, Value>) -> ObjectId {
    let root = heap.alloc_labelled(ROOT_OBJECT, None);

    let methods = [
        NativeFunction::new("extend", native_extend),
        NativeFunction::new("new", native_new),
        NativeFunction::new("chain", native_chain),
        NativeFunction::new("own", native_own),
    ];
    for native in methods {
        heap.set_attr(root, native.name, Value::Function(Callable::Native(native)));
    }

    globals.insert(ROOT_OBJECT.to_string(), Value::Object(root));
    root
}

/// Native implementation of `extend`. The receiver becomes the parent.
pub fn native_extend(invoker: &mut dyn Invoker, context: &CallContext, args: &[Value]) -> Result<Value> {
    let seed = optional_seed("extend", args)?;
    extend(invoker.heap_mut(), context.receiver, seed).map(Value::Object)
}

/// Native implementation of `new`. The receiver becomes the parent.
pub fn native_new(invoker: &mut dyn Invoker, context: &CallContext, args: &[Value]) -> Result<Value> {
    let seed = optional_seed("new", args)?;
    construct(invoker, context.receiver, seed).map(Value::Object)
}

pub fn native_chain(invoker: &mut dyn Invoker, context: &CallContext, args: &[Value]) -> Result<Value> {
    expect_arity("chain", 0, args)?;
    let chain = chain_of(invoker.heap(), context.receiver);
    Ok(Value::List(chain.into_iter().map(Value::Object).collect()))
}

pub fn native_own(invoker: &mut dyn Invoker, context: &CallContext, args: &[Value]) -> Result<Value> {
    expect_arity("own", 1, args)?;
    match &args[0] {
        Value::String(name) => Ok(Value::Boolean(
            invoker.heap().own(context.receiver, name).is_some(),
        )),
        other => Err(ProtoError::ArgumentType {
            expected: "an attribute name",
            got: other.type_name().to_string(),
        }),
    }
}

fn optional_seed(name: &str, args: &[Value]) -> Result<Option<Value>> {
    match args {
        [] => Ok(None),
        [seed] => Ok(Some(seed.clone())),
        _ => Err(ProtoError::Arity {
            name: name.to_string(),
            expected: 1,
            got: args.len(),
        }),
    }
}

fn expect_arity(name: &str, expected: usize, args: &[Value]) -> Result<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ProtoError::Arity {
            name: name.to_string(),
            expected,
            got: args.len(),
        })
    }
}
