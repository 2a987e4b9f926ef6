use crate::error::Result;
use crate::invoke::Invoker;
use crate::script::ast::ScriptFunction;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Handle to an object stored in a [`Heap`](crate::heap::Heap).
///
/// Ids are minted by the heap that owns the object and are only meaningful
/// for that heap. Two values refer to the same object exactly when their ids
/// are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) usize);

impl ObjectId {
    /// Position of the object in its heap's arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An object: its own named attributes and at most one back-reference to
/// the object it delegates to.
///
/// The back-reference is a plain handle; a child never owns its parent and
/// any number of children may share one.
#[derive(Clone, Debug, Default)]
pub struct ProtoObject {
    pub label: Option<String>,
    pub proto: Option<ObjectId>,
    attributes: HashMap<String, Value>,
}

impl ProtoObject {
    pub fn new(proto: Option<ObjectId>) -> Self {
        ProtoObject {
            label: None,
            proto,
            attributes: HashMap::new(),
        }
    }

    /// Reads an attribute defined directly on this object. Never consults
    /// the back-reference.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Defines or replaces an attribute, returning the previous value.
    pub fn set(&mut self, name: String, value: Value) -> Option<Value> {
        self.attributes.insert(name, value)
    }

    /// Own attribute names in sorted order.
    pub fn attribute_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.attributes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Signature of behavior implemented in Rust.
///
/// The function receives:
/// - invoker: the runtime executing the call, used to reach the heap or to
///   invoke further methods (including super methods)
/// - context: the receiver, the object the method was found on, and the
///   name it was found under
/// - args: the call arguments
pub type NativeFn =
    fn(invoker: &mut dyn Invoker, context: &CallContext, args: &[Value]) -> Result<Value>;

/// A named native function.
#[derive(Clone, Copy)]
pub struct NativeFunction {
    pub name: &'static str,
    pub function: NativeFn,
}

impl NativeFunction {
    pub fn new(name: &'static str, function: NativeFn) -> Self {
        NativeFunction { name, function }
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// Behavior that can be stored as an attribute and invoked against a receiver.
#[derive(Clone, Debug)]
pub enum Callable {
    Native(NativeFunction),
    Script(Rc<ScriptFunction>),
}

impl Callable {
    pub fn native(name: &'static str, function: NativeFn) -> Self {
        Callable::Native(NativeFunction::new(name, function))
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Callable::Native(a), Callable::Native(b)) => a == b,
            (Callable::Script(a), Callable::Script(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// The explicit execution context of a running method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallContext {
    /// Object the call operates on; `self` inside the method.
    pub receiver: ObjectId,
    /// Object on which the running implementation was found.
    pub owner: ObjectId,
    /// Attribute name the implementation was found under.
    pub name: String,
}

/// A callable paired with the receiver it runs against.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundMethod {
    pub receiver: ObjectId,
    pub owner: ObjectId,
    pub name: String,
    pub callable: Callable,
}

impl BoundMethod {
    /// Binds a stored attribute value to `receiver`.
    ///
    /// Returns `None` when the value holds no behavior. A value that is
    /// already bound keeps its original receiver.
    pub fn from_value(receiver: ObjectId, owner: ObjectId, name: &str, value: &Value) -> Option<Self> {
        match value {
            Value::Function(callable) => Some(BoundMethod {
                receiver,
                owner,
                name: name.to_string(),
                callable: callable.clone(),
            }),
            Value::BoundMethod(bound) => Some((**bound).clone()),
            _ => None,
        }
    }

    pub fn context(&self) -> CallContext {
        CallContext {
            receiver: self.receiver,
            owner: self.owner,
            name: self.name.clone(),
        }
    }
}

/// Every value an attribute, variable or call result can hold.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Nil,
    Boolean(bool),
    Integer(i64),
    String(String),
    List(Vec<Value>),
    Object(ObjectId),
    Function(Callable),
    BoundMethod(Rc<BoundMethod>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Boolean(_) => "bool",
            Value::Integer(_) => "int",
            Value::String(_) => "str",
            Value::List(_) => "list",
            Value::Object(_) => "object",
            Value::Function(Callable::Native(_)) => "native function",
            Value::Function(Callable::Script(_)) => "function",
            Value::BoundMethod(_) => "method",
        }
    }

    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::Object(id)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

/// Heap-independent rendering; objects show as their id.
/// Use [`Heap::describe`](crate::heap::Heap::describe) for labelled output.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Boolean(val) => write!(f, "{}", val),
            Value::Integer(val) => write!(f, "{}", val),
            Value::String(val) => write!(f, "{}", val),
            Value::List(values) => {
                write!(f, "[")?;
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    match value {
                        Value::String(text) => write!(f, "'{}'", text)?,
                        _ => write!(f, "{}", value)?,
                    }
                }
                write!(f, "]")
            }
            Value::Object(id) => write!(f, "<object {}>", id),
            Value::Function(Callable::Native(native)) => {
                write!(f, "<native fn {}>", native.name)
            }
            Value::Function(Callable::Script(function)) => {
                write!(f, "<fn({})>", function.params.join(", "))
            }
            Value::BoundMethod(bound) => {
                write!(f, "<bound method {} of {}>", bound.name, bound.receiver)
            }
        }
    }
}
