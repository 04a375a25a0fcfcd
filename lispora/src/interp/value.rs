//! Runtime values for the interpreter

use super::env::{EnvRef, Environment};
use super::error::InterpResult;
use super::Interpreter;
use crate::ast::{Node, NodeKind};
use std::fmt;

/// Native operation signature. A builtin owns its argument list.
pub type BuiltinFn = fn(&mut Interpreter, &EnvRef, List) -> InterpResult<Value>;

/// Runtime value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(i64),
    /// First-class failure carrier
    Error(String),
    Symbol(String),
    String(String),
    List(List),
    Function(Function),
}

/// Ordered list of values.
///
/// A quoted list is inert data (a Q-expression); an unquoted one is an
/// S-expression that the evaluator reduces. The flag is flipped in place by
/// `list`, `eval` and `if`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct List {
    pub items: Vec<Value>,
    pub quoted: bool,
}

/// Function value
#[derive(Debug, Clone, PartialEq)]
pub enum Function {
    Builtin(Builtin),
    Closure(Closure),
}

/// Native function registered under a name
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

/// Formal parameter of a closure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formal {
    Fixed(String),
    /// `& name`: collects all remaining arguments into a Q-expression
    Variadic(String),
}

/// User-defined function
pub struct Closure {
    pub formals: Vec<Formal>,
    /// Quoted body, evaluated as an S-expression on a saturated call
    pub body: List,
    /// Private environment holding partially applied arguments
    pub env: EnvRef,
}

impl Value {
    pub fn number(n: i64) -> Value {
        Value::Number(n)
    }

    pub fn symbol(name: impl Into<String>) -> Value {
        Value::Symbol(name.into())
    }

    pub fn string(text: impl Into<String>) -> Value {
        Value::String(text.into())
    }

    pub fn error(message: impl Into<String>) -> Value {
        Value::Error(message.into())
    }

    pub fn sexpr(items: Vec<Value>) -> Value {
        Value::List(List::sexpr(items))
    }

    pub fn qexpr(items: Vec<Value>) -> Value {
        Value::List(List::qexpr(items))
    }

    /// The empty S-expression, used as the "no value" result
    pub fn unit() -> Value {
        Value::List(List::default())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Get type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "Number",
            Value::Error(_) => "Error",
            Value::Symbol(_) => "Symbol",
            Value::String(_) => "String",
            Value::List(list) if list.quoted => "Q-Expression",
            Value::List(_) => "S-Expression",
            Value::Function(_) => "Function",
        }
    }

    /// Convert a parsed node into the value it denotes
    pub fn from_node(node: &Node) -> Value {
        match &node.kind {
            NodeKind::Number(n) => Value::Number(*n),
            NodeKind::Symbol(s) => Value::Symbol(s.clone()),
            NodeKind::String(s) => Value::String(s.clone()),
            NodeKind::SExpr(items) => Value::sexpr(items.iter().map(Value::from_node).collect()),
            NodeKind::QExpr(items) => Value::qexpr(items.iter().map(Value::from_node).collect()),
        }
    }
}

impl List {
    pub fn sexpr(items: Vec<Value>) -> Self {
        List { items, quoted: false }
    }

    pub fn qexpr(items: Vec<Value>) -> Self {
        List { items, quoted: true }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<List> for Value {
    fn from(list: List) -> Self {
        Value::List(list)
    }
}

impl Closure {
    /// Create a closure with a fresh, parentless private environment
    pub fn new(formals: Vec<Formal>, body: List) -> Self {
        Closure {
            formals,
            body,
            env: Environment::new().into_ref(),
        }
    }
}

impl Clone for Closure {
    /// Copies the private environment instead of sharing it.
    fn clone(&self) -> Self {
        Closure {
            formals: self.formals.clone(),
            body: self.body.clone(),
            env: self.env.borrow().copy().into_ref(),
        }
    }
}

/// Closures compare by code only; the captured environment is ignored.
impl PartialEq for Closure {
    fn eq(&self, other: &Self) -> bool {
        self.formals == other.formals && self.body == other.body
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("formals", &self.formals)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

/// Builtins are identified by the name they were registered under.
impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Error(message) => write!(f, "Error: {message}"),
            Value::Symbol(name) => write!(f, "{name}"),
            Value::String(text) => write_escaped(f, text),
            Value::List(list) => write!(f, "{list}"),
            Value::Function(func) => write!(f, "{func}"),
        }
    }
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (open, close) = if self.quoted { ('{', '}') } else { ('(', ')') };
        write!(f, "{open}")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{item}")?;
        }
        write!(f, "{close}")
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Builtin(builtin) => write!(f, "{}", builtin.name),
            Function::Closure(closure) => {
                write!(f, "(\\ {{")?;
                for (i, formal) in closure.formals.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    match formal {
                        Formal::Fixed(name) => write!(f, "{name}")?,
                        Formal::Variadic(name) => write!(f, "& {name}")?,
                    }
                }
                write!(f, "}} {})", closure.body)
            }
        }
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in text.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            '\r' => write!(f, "\\r")?,
            '\0' => write!(f, "\\0")?,
            c => write!(f, "{c}")?,
        }
    }
    write!(f, "\"")
}
