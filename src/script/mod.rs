//! A small text front end for the object model.
//!
//! Scripts build object graphs with `Object.extend()` / `Object.new()`,
//! assign attributes and back-references, and call methods whose bodies may
//! use `self` and `super`. The layer adds no semantics of its own: chain
//! walking, super resolution and construction all go through the library.

pub mod ast;
pub mod builtins;
pub mod interpreter;
pub mod parser;

pub use interpreter::Interpreter;
pub use parser::parse;
