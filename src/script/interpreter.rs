//! Tree-walking interpreter for the prototype scripting language.

use crate::error::{ProtoError, Result, ScriptError};
use crate::heap::Heap;
use crate::invoke::Invoker;
use crate::object::{BoundMethod, CallContext, Callable, ObjectId, Value};
use crate::resolve::resolve_super;
use crate::script::ast::{BinaryOp, Expr, ScriptFunction, Stmt};
use crate::script::builtins::register_builtins;
use crate::script::parser::parse;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::trace;

pub const MAX_CALL_DEPTH: usize = 64;

/// Attribute name that reads and writes the back-reference.
pub const PROTO_ATTRIBUTE: &str = "__proto__";

/// Activation record of a running script function.
struct Frame {
    context: Option<CallContext>,
    locals: HashMap<String, Value>,
}

pub struct Interpreter {
    heap: Heap,
    globals: HashMap<String, Value>,
    frames: Vec<Frame>,
    output: Vec<String>,
    root: ObjectId,
    depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        let mut heap = Heap::new();
        let mut globals = HashMap::new();
        let root = register_builtins(&mut heap, &mut globals);
        Interpreter {
            heap,
            globals,
            frames: Vec::new(),
            output: Vec::new(),
            root,
            depth: 0,
        }
    }

    /// The `Object` root that carries the builtin methods.
    pub fn root(&self) -> ObjectId {
        self.root
    }

    pub fn global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    pub fn define_global(&mut self, name: &str, value: Value) {
        self.globals.insert(name.to_string(), value);
    }

    /// Parses and runs `source`. Returns the value of the final statement
    /// when it is an expression.
    pub fn run(&mut self, source: &str) -> std::result::Result<Option<Value>, ScriptError> {
        let statements = parse(source)?;
        Ok(self.execute(&statements)?)
    }

    pub fn execute(&mut self, statements: &[Stmt]) -> Result<Option<Value>> {
        let mut last = None;
        for statement in statements {
            last = self.exec(statement)?;
        }
        Ok(last)
    }

    /// Drains the lines produced by `print` so far.
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    pub fn describe(&self, value: &Value) -> String {
        self.heap.describe(value)
    }

    fn exec(&mut self, statement: &Stmt) -> Result<Option<Value>> {
        match statement {
            Stmt::Let { name, value } => {
                let value = self.eval(value)?;
                self.bind_variable(name, value);
                Ok(None)
            }
            Stmt::SetAttr {
                object,
                name,
                value,
            } => {
                let target = self.eval(object)?;
                let target = self.expect_object(&target)?;
                let value = self.eval(value)?;
                if name == PROTO_ATTRIBUTE {
                    let proto = match value {
                        Value::Nil => None,
                        Value::Object(id) => Some(id),
                        other => return Err(ProtoError::NotAnObject(other.type_name().to_string())),
                    };
                    self.heap.set_proto(target, proto);
                } else {
                    self.heap.set_attr(target, name.as_str(), value);
                }
                Ok(None)
            }
            Stmt::Print(expr) => {
                let value = self.eval(expr)?;
                let line = self.heap.describe(&value);
                self.output.push(line);
                Ok(None)
            }
            Stmt::Expression(expr) => self.eval(expr).map(Some),
        }
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Nil => Ok(Value::Nil),
            Expr::Boolean(value) => Ok(Value::Boolean(*value)),
            Expr::Integer(value) => Ok(Value::Integer(*value)),
            Expr::String(value) => Ok(Value::String(value.clone())),
            Expr::Variable(name) => self.lookup_variable(name),
            Expr::SelfRef => self
                .current_context()
                .map(|context| Value::Object(context.receiver))
                .ok_or(ProtoError::OutsideMethod("self")),
            Expr::NewObject => Ok(Value::Object(self.heap.alloc(None))),
            Expr::Function(function) => Ok(Value::Function(Callable::Script(function.clone()))),
            Expr::Get { object, name } => {
                let target = self.eval(object)?;
                let target = self.expect_object(&target)?;
                Ok(self.get_attribute(target, name))
            }
            Expr::Call { callee, args } => {
                let callee = self.eval(callee)?;
                let args = self.eval_all(args)?;
                self.call_value(callee, &args)
            }
            Expr::Super(args) => self.eval_super(args),
            Expr::Binary { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                match op {
                    BinaryOp::Add => self.add(left, right),
                    BinaryOp::Equal => Ok(Value::Boolean(left == right)),
                }
            }
        }
    }

    fn eval_all(&mut self, exprs: &[Expr]) -> Result<Vec<Value>> {
        exprs.iter().map(|expr| self.eval(expr)).collect()
    }

    /// Delegating attribute read. Behavior comes back bound to `target`;
    /// missing attributes read as nil.
    fn get_attribute(&self, target: ObjectId, name: &str) -> Value {
        if name == PROTO_ATTRIBUTE {
            return self.heap.proto_of(target).map_or(Value::Nil, Value::Object);
        }
        match self.heap.lookup(target, name) {
            Some((owner, value)) => match BoundMethod::from_value(target, owner, name, value) {
                Some(method) => Value::BoundMethod(Rc::new(method)),
                None => value.clone(),
            },
            None => Value::Nil,
        }
    }

    fn call_value(&mut self, callee: Value, args: &[Value]) -> Result<Value> {
        match callee {
            Value::BoundMethod(method) => self.invoke(&method, args),
            Value::Function(Callable::Script(function)) => {
                self.nested(|interpreter| interpreter.run_function(&function, None, "<fn>", args))
            }
            Value::Function(Callable::Native(native)) => Err(ProtoError::NotCallable(format!(
                "{} (native function without a receiver)",
                native.name
            ))),
            other => Err(ProtoError::NotCallable(self.heap.describe(&other))),
        }
    }

    /// `super(receiver, owner, name)` resolves explicitly; `super()` and
    /// `super(name)` resolve from the running method. Not found is nil.
    fn eval_super(&mut self, args: &[Expr]) -> Result<Value> {
        let values = self.eval_all(args)?;
        let resolved = match values.as_slice() {
            [receiver, owner, Value::String(name)] => {
                let receiver = self.expect_object(receiver)?;
                let owner = self.expect_object(owner)?;
                resolve_super(&self.heap, receiver, owner, name)?
            }
            [] => self.context_for_super()?.super_method(&self.heap, None)?,
            [Value::String(name)] => self
                .context_for_super()?
                .super_method(&self.heap, Some(name.as_str()))?,
            [other] | [_, _, other] => {
                return Err(ProtoError::ArgumentType {
                    expected: "an attribute name",
                    got: other.type_name().to_string(),
                })
            }
            _ => {
                return Err(ProtoError::Arity {
                    name: "super".to_string(),
                    expected: 3,
                    got: values.len(),
                })
            }
        };
        Ok(resolved.map_or(Value::Nil, |method| Value::BoundMethod(Rc::new(method))))
    }

    fn context_for_super(&self) -> Result<&CallContext> {
        self.current_context().ok_or(ProtoError::OutsideMethod("super"))
    }

    fn run_function(
        &mut self,
        function: &ScriptFunction,
        context: Option<CallContext>,
        name: &str,
        args: &[Value],
    ) -> Result<Value> {
        if function.params.len() != args.len() {
            return Err(ProtoError::Arity {
                name: name.to_string(),
                expected: function.params.len(),
                got: args.len(),
            });
        }

        let locals = function
            .params
            .iter()
            .cloned()
            .zip(args.iter().cloned())
            .collect();
        self.frames.push(Frame { context, locals });
        let result = self.execute(&function.body);
        self.frames.pop();

        result.map(Option::unwrap_or_default)
    }

    /// Runs one level of call nesting. Native and script calls both count.
    fn nested<F>(&mut self, call: F) -> Result<Value>
    where
        F: FnOnce(&mut Self) -> Result<Value>,
    {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(ProtoError::CallDepthExceeded(MAX_CALL_DEPTH));
        }
        self.depth += 1;
        let result = call(self);
        self.depth -= 1;
        result
    }

    fn current_context(&self) -> Option<&CallContext> {
        self.frames.last().and_then(|frame| frame.context.as_ref())
    }

    fn bind_variable(&mut self, name: &str, value: Value) {
        match self.frames.last_mut() {
            Some(frame) => {
                frame.locals.insert(name.to_string(), value);
            }
            None => {
                if let Value::Object(id) = value {
                    self.heap.label_if_unnamed(id, name);
                }
                self.globals.insert(name.to_string(), value);
            }
        }
    }

    fn lookup_variable(&self, name: &str) -> Result<Value> {
        self.frames
            .last()
            .and_then(|frame| frame.locals.get(name))
            .or_else(|| self.globals.get(name))
            .cloned()
            .ok_or_else(|| ProtoError::UndefinedVariable(name.to_string()))
    }

    fn expect_object(&self, value: &Value) -> Result<ObjectId> {
        value
            .as_object()
            .ok_or_else(|| ProtoError::NotAnObject(self.heap.describe(value)))
    }

    fn add(&self, left: Value, right: Value) -> Result<Value> {
        match (&left, &right) {
            (Value::Integer(a), Value::Integer(b)) => {
                a.checked_add(*b).map(Value::Integer).ok_or(ProtoError::Overflow)
            }
            (Value::String(text), _) => Ok(Value::String(format!(
                "{}{}",
                text,
                self.heap.describe(&right)
            ))),
            _ => Err(ProtoError::TypeMismatch {
                op: BinaryOp::Add.symbol(),
                left: left.type_name().to_string(),
                right: right.type_name().to_string(),
            }),
        }
    }
}

impl Invoker for Interpreter {
    fn heap(&self) -> &Heap {
        &self.heap
    }

    fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    fn invoke(&mut self, method: &BoundMethod, args: &[Value]) -> Result<Value> {
        trace!(
            receiver = %method.receiver,
            owner = %method.owner,
            method = %method.name,
            "invoke"
        );
        self.nested(|interpreter| match &method.callable {
            Callable::Native(native) => (native.function)(interpreter, &method.context(), args),
            Callable::Script(function) => {
                interpreter.run_function(function, Some(method.context()), &method.name, args)
            }
        })
    }
}
