use protochain::error::{ProtoError, ScriptError};
use protochain::object::Value;
use protochain::script::interpreter::MAX_CALL_DEPTH;
use protochain::script::Interpreter;

const ANIMALS: &str = r#"
let Animal = Object.extend()
Animal.name = "animal"
Animal.speak = fn() "generic " + self.name
let Dog = Animal.extend()
Dog.speak = fn() "woof, then " + super()()
let rex = Dog.new()
rex.name = "rex"
"#;

fn interpreter_with(source: &str) -> Interpreter {
    let mut interpreter = Interpreter::new();
    interpreter.run(source).unwrap();
    interpreter
}

fn eval(interpreter: &mut Interpreter, source: &str) -> Value {
    interpreter.run(source).unwrap().unwrap_or_default()
}

fn runtime_error(interpreter: &mut Interpreter, source: &str) -> ProtoError {
    match interpreter.run(source) {
        Err(ScriptError::Runtime(err)) => err,
        other => panic!("Expected runtime error, got {:?}", other),
    }
}

#[test]
fn test_super_call_runs_ancestor_with_original_receiver() {
    let mut interpreter = interpreter_with(ANIMALS);
    assert_eq!(
        eval(&mut interpreter, "rex.speak()"),
        Value::from("woof, then generic rex")
    );
}

#[test]
fn test_print_chain_uses_labels() {
    let mut interpreter = interpreter_with(ANIMALS);
    interpreter.run("print rex.chain()").unwrap();
    assert_eq!(
        interpreter.take_output(),
        vec!["[Object, Animal, Dog, rex]".to_string()]
    );
    assert!(interpreter.take_output().is_empty());
}

#[test]
fn test_explicit_super_resolution() {
    let mut interpreter = interpreter_with(ANIMALS);
    assert_eq!(
        eval(&mut interpreter, "super(rex, Dog, 'speak') == nil"),
        Value::Boolean(false)
    );
    assert_eq!(
        eval(&mut interpreter, "super(rex, Dog, 'speak')()"),
        Value::from("generic rex")
    );
    assert_eq!(
        eval(&mut interpreter, "super(rex, Animal, 'speak')"),
        Value::Nil
    );
}

#[test]
fn test_super_in_root_implementation_is_nil() {
    let mut interpreter = interpreter_with(ANIMALS);
    interpreter.run("Animal.only = fn() super()").unwrap();
    assert_eq!(eval(&mut interpreter, "rex.only()"), Value::Nil);
}

#[test]
fn test_super_with_explicit_name() {
    let mut interpreter = interpreter_with(ANIMALS);
    interpreter
        .run("Dog.loud = fn() super('speak')() + '!'")
        .unwrap();
    assert_eq!(eval(&mut interpreter, "rex.loud()"), Value::from("generic rex!"));
}

#[test]
fn test_new_runs_initializer_once() {
    let mut interpreter = interpreter_with(
        r#"
        let Counter = Object.extend()
        Counter.made = 0
        Counter.__init__ = fn() do self.count = 0; Counter.made = Counter.made + 1 end
        Counter.inc = fn() do self.count = self.count + 1; self.count end
        let c = Counter.new()
        "#,
    );
    assert_eq!(eval(&mut interpreter, "Counter.made"), Value::Integer(1));
    assert_eq!(eval(&mut interpreter, "c.inc(); c.inc()"), Value::Integer(2));
    assert_eq!(eval(&mut interpreter, "Counter.own('count')"), Value::Boolean(false));
    assert_eq!(eval(&mut interpreter, "c.own('count')"), Value::Boolean(true));
}

#[test]
fn test_new_adopts_seed() {
    let mut interpreter = interpreter_with(
        r#"
        let Base = Object.extend()
        Base.__init__ = fn() do self.ready = true end
        let seed = {}
        seed.given = 1
        let made = Base.new(seed)
        "#,
    );
    assert_eq!(eval(&mut interpreter, "made == seed"), Value::Boolean(true));
    assert_eq!(eval(&mut interpreter, "seed.ready"), Value::Boolean(true));
    assert_eq!(eval(&mut interpreter, "seed.__proto__ == Base"), Value::Boolean(true));
}

#[test]
fn test_extend_rejects_invalid_seed() {
    let mut interpreter = Interpreter::new();
    assert_eq!(
        runtime_error(&mut interpreter, "Object.extend(5)"),
        ProtoError::InvalidSeed("int".to_string())
    );
}

#[test]
fn test_proto_assignment_and_self_reference() {
    let mut interpreter = interpreter_with(ANIMALS);
    assert_eq!(eval(&mut interpreter, "rex.__proto__ == Dog"), Value::Boolean(true));

    interpreter.run("rex.__proto__ = rex; print rex.__proto__").unwrap();
    assert_eq!(interpreter.take_output(), vec!["rex".to_string()]);

    // With no path to the root object the builtins are out of reach.
    assert_eq!(eval(&mut interpreter, "rex.chain"), Value::Nil);
    assert_eq!(
        eval(&mut interpreter, "super(rex, rex, 'name')"),
        Value::Nil
    );

    interpreter.run("rex.__proto__ = nil").unwrap();
    assert_eq!(eval(&mut interpreter, "rex.__proto__"), Value::Nil);
}

#[test]
fn test_proto_assignment_rejects_non_objects() {
    let mut interpreter = interpreter_with(ANIMALS);
    assert_eq!(
        runtime_error(&mut interpreter, "rex.__proto__ = 3"),
        ProtoError::NotAnObject("int".to_string())
    );
}

#[test]
fn test_missing_attribute_reads_nil() {
    let mut interpreter = interpreter_with(ANIMALS);
    assert_eq!(eval(&mut interpreter, "rex.unknown"), Value::Nil);
}

#[test]
fn test_self_and_super_outside_method() {
    let mut interpreter = Interpreter::new();
    assert_eq!(
        runtime_error(&mut interpreter, "self"),
        ProtoError::OutsideMethod("self")
    );
    assert_eq!(
        runtime_error(&mut interpreter, "super()"),
        ProtoError::OutsideMethod("super")
    );
}

#[test]
fn test_arity_mismatch() {
    let mut interpreter = interpreter_with(ANIMALS);
    assert_eq!(
        runtime_error(&mut interpreter, "rex.speak(1)"),
        ProtoError::Arity {
            name: "speak".to_string(),
            expected: 0,
            got: 1
        }
    );
}

#[test]
fn test_unbound_function_call_and_locals() {
    let mut interpreter = Interpreter::new();
    assert_eq!(
        eval(&mut interpreter, "let add = fn(a, b) do let sum = a + b; sum end; add(2, 3)"),
        Value::Integer(5)
    );
    assert_eq!(
        runtime_error(&mut interpreter, "sum"),
        ProtoError::UndefinedVariable("sum".to_string())
    );
}

#[test]
fn test_bound_method_can_be_stored_and_called_later() {
    let mut interpreter = interpreter_with(ANIMALS);
    assert_eq!(
        eval(&mut interpreter, "let speak = rex.speak; speak()"),
        Value::from("woof, then generic rex")
    );
}

#[test]
fn test_string_concatenation_and_type_mismatch() {
    let mut interpreter = Interpreter::new();
    assert_eq!(eval(&mut interpreter, "'n=' + 1"), Value::from("n=1"));
    assert_eq!(
        runtime_error(&mut interpreter, "1 + 'n'"),
        ProtoError::TypeMismatch {
            op: "+",
            left: "int".to_string(),
            right: "str".to_string()
        }
    );
}

#[test]
fn test_calling_non_callable() {
    let mut interpreter = interpreter_with(ANIMALS);
    assert_eq!(
        runtime_error(&mut interpreter, "rex.name()"),
        ProtoError::NotCallable("rex".to_string())
    );
}

#[test]
fn test_runaway_recursion_is_bounded() {
    let mut interpreter = Interpreter::new();
    interpreter.run("Object.forever = fn() self.forever()").unwrap();
    assert_eq!(
        runtime_error(&mut interpreter, "Object.forever()"),
        ProtoError::CallDepthExceeded(MAX_CALL_DEPTH)
    );
    // The failed call leaves no frame behind.
    assert_eq!(
        runtime_error(&mut interpreter, "self"),
        ProtoError::OutsideMethod("self")
    );
}

#[test]
fn test_recursion_through_native_initializer_is_bounded() {
    let mut interpreter = Interpreter::new();
    interpreter.run("Object.__init__ = Object.new").unwrap();
    assert_eq!(
        runtime_error(&mut interpreter, "Object.new()"),
        ProtoError::CallDepthExceeded(MAX_CALL_DEPTH)
    );
    // The failed call unwinds its depth; ordinary calls still work.
    assert_eq!(
        eval(&mut interpreter, "Object.extend().own('extend')"),
        Value::Boolean(false)
    );
}

#[test]
fn test_unbound_function_recursion_is_bounded() {
    let mut interpreter = Interpreter::new();
    interpreter.run("let loop = fn(f) f(f)").unwrap();
    assert_eq!(
        runtime_error(&mut interpreter, "loop(loop)"),
        ProtoError::CallDepthExceeded(MAX_CALL_DEPTH)
    );
}

#[test]
fn test_print_inside_method_is_collected() {
    let mut interpreter = interpreter_with(ANIMALS);
    interpreter
        .run("Dog.shout = fn() do print 'loud'; 1 end; rex.shout()")
        .unwrap();
    assert_eq!(interpreter.take_output(), vec!["loud".to_string()]);
}

#[test]
fn test_root_object_is_a_global() {
    let mut interpreter = Interpreter::new();
    let root = interpreter.root();
    assert_eq!(interpreter.global("Object"), Some(&Value::Object(root)));

    interpreter.define_global("answer", Value::from(42));
    assert_eq!(eval(&mut interpreter, "answer + 1"), Value::Integer(43));
    assert_eq!(eval(&mut interpreter, "Object.own('extend')"), Value::Boolean(true));
}

#[test]
fn test_escaped_quote_in_string_literal() {
    let mut interpreter = Interpreter::new();
    assert_eq!(
        eval(&mut interpreter, r#""a\"b""#),
        Value::String("a\"b".to_string())
    );
}
