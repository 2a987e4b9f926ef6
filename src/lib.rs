pub mod chain;
pub mod cli;
pub mod construct;
pub mod error;
pub mod heap;
pub mod invoke;
pub mod object;
pub mod resolve;
pub mod script;
pub mod token;

pub use chain::{ancestors, chain_of};
pub use construct::{construct, extend};
pub use error::{ProtoError, Result, ScriptError};
pub use heap::Heap;
pub use invoke::Invoker;
pub use object::{BoundMethod, CallContext, Callable, NativeFunction, ObjectId, Value};
pub use resolve::resolve_super;
