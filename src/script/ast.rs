//! Syntax tree of the prototype scripting language.

use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Equal,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Equal => "==",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Nil,
    Boolean(bool),
    Integer(i64),
    String(String),
    Variable(String),
    SelfRef,
    /// `{}`: a fresh root object.
    NewObject,
    Function(Rc<ScriptFunction>),
    Get {
        object: Box<Expr>,
        name: String,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `super(...)` with zero, one or three arguments.
    Super(Vec<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let { name: String, value: Expr },
    SetAttr { object: Expr, name: String, value: Expr },
    Print(Expr),
    Expression(Expr),
}

/// A function literal: parameters and a statement body. The value of the
/// last expression statement is the call result.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptFunction {
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}
