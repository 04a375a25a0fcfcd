//! Expression evaluator

use super::builtins::new_global_environment;
use super::env::EnvRef;
use super::error::{InterpResult, RuntimeError};
use super::value::{Closure, Formal, Function, List, Value};
use crate::ast::Node;
use crate::error::LoadError;
use crate::parser::parse_source;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::rc::Rc;

/// Standard library written in Lispora itself
const PRELUDE: &str = include_str!("../prelude.lspr");

/// Stack growth parameters for deep recursion
const STACK_RED_ZONE: usize = 128 * 1024; // 128KB remaining triggers growth
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024; // Grow by 4MB each time

/// The interpreter
pub struct Interpreter {
    /// Global environment, alive for the whole session
    global_env: EnvRef,
    /// Sink for `print` and for errors reported by `import`
    output: Box<dyn Write>,
}

impl Interpreter {
    /// Create an interpreter printing to stdout, with the prelude loaded
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Create an interpreter printing to `output`, with the prelude loaded
    pub fn with_output(output: Box<dyn Write>) -> Self {
        let mut interp = Self::bare(output);
        interp.load_prelude();
        interp
    }

    /// Create an interpreter with only the builtin library bound
    pub fn bare(output: Box<dyn Write>) -> Self {
        Interpreter {
            global_env: new_global_environment(),
            output,
        }
    }

    pub fn global_env(&self) -> &EnvRef {
        &self.global_env
    }

    fn load_prelude(&mut self) {
        match self.eval_source("<prelude>", PRELUDE) {
            Ok(values) => {
                for value in values.iter().filter(|v| v.is_error()) {
                    tracing::warn!(%value, "prelude definition failed");
                }
            }
            Err(err) => tracing::warn!(%err, "prelude failed to parse"),
        }
    }

    /// Evaluate a value in `env`
    pub fn eval(&mut self, env: &EnvRef, value: Value) -> Value {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.eval_inner(env, value))
    }

    fn eval_inner(&mut self, env: &EnvRef, value: Value) -> Value {
        match value {
            Value::Symbol(name) => env.borrow().get(&name).unwrap_or_else(Value::from),
            Value::List(list) if !list.quoted => self.eval_sexpr(env, list),
            other => other,
        }
    }

    /// Reduce an S-expression.
    ///
    /// Every child is evaluated before any error is looked at, so side
    /// effects of later children still happen when an earlier one failed.
    fn eval_sexpr(&mut self, env: &EnvRef, list: List) -> Value {
        let mut items: Vec<Value> = list
            .items
            .into_iter()
            .map(|item| self.eval(env, item))
            .collect();

        if let Some(pos) = items.iter().position(Value::is_error) {
            return items.swap_remove(pos);
        }

        match items.len() {
            0 => Value::List(List::sexpr(items)),
            1 => items.swap_remove(0),
            _ => {
                let first = items.remove(0);
                match first {
                    Value::Function(func) => self.call(env, func, List::sexpr(items)),
                    other => RuntimeError::not_a_function(other.type_name()).into(),
                }
            }
        }
    }

    /// Apply a function to an argument list evaluated in `env`
    pub fn call(&mut self, env: &EnvRef, func: Function, args: List) -> Value {
        let result = match func {
            Function::Builtin(builtin) => (builtin.func)(self, env, args),
            Function::Closure(closure) => self.call_closure(env, closure, args),
        };
        result.unwrap_or_else(Value::from)
    }

    /// Bind arguments into the closure's private environment.
    ///
    /// A saturated call re-parents that environment onto the *calling*
    /// environment before running the body, so free variables resolve
    /// against the caller. Unsaturated calls return the closure itself,
    /// still waiting for its remaining formals.
    fn call_closure(&mut self, env: &EnvRef, mut closure: Closure, args: List) -> InterpResult<Value> {
        let given = args.len();
        let total = closure.formals.len();
        let mut formals: VecDeque<Formal> = std::mem::take(&mut closure.formals).into();
        let mut args: VecDeque<Value> = args.items.into();

        while let Some(arg) = args.pop_front() {
            match formals.pop_front() {
                Some(Formal::Fixed(name)) => closure.env.borrow_mut().put(name, arg),
                Some(Formal::Variadic(name)) => {
                    let mut rest = vec![arg];
                    rest.extend(args.drain(..));
                    closure.env.borrow_mut().put(name, Value::qexpr(rest));
                }
                None => return Err(RuntimeError::too_many_arguments(given, total)),
            }
        }

        // `& rest` with nothing left to collect
        if let Some(Formal::Variadic(name)) = formals.front().cloned() {
            formals.pop_front();
            closure.env.borrow_mut().put(name, Value::qexpr(Vec::new()));
        }

        if !formals.is_empty() {
            tracing::trace!(given, remaining = formals.len(), "partial application");
            closure.formals = formals.into();
            return Ok(Value::Function(Function::Closure(closure)));
        }

        tracing::trace!(given, total, "saturated closure call");
        closure.env.borrow_mut().set_parent(env);
        let closure_env = Rc::clone(&closure.env);
        let mut body = closure.body;
        body.quoted = false;
        Ok(self.eval(&closure_env, Value::List(body)))
    }

    /// Evaluate one parsed top-level form in the global environment
    pub fn eval_node(&mut self, node: &Node) -> Value {
        let env = Rc::clone(&self.global_env);
        self.eval(&env, Value::from_node(node))
    }

    /// Evaluate a line of REPL input: all forms on the line make up a
    /// single S-expression, so `+ 1 2` evaluates to `3`.
    pub fn eval_line(&mut self, source: &str) -> Result<Value, LoadError> {
        let nodes = parse_source("<repl>", source)?;
        let expr = Value::sexpr(nodes.iter().map(Value::from_node).collect());
        let env = Rc::clone(&self.global_env);
        Ok(self.eval(&env, expr))
    }

    /// Evaluate every top-level form of a program in order
    pub fn eval_source(&mut self, name: &str, source: &str) -> Result<Vec<Value>, LoadError> {
        let nodes = parse_source(name, source)?;
        tracing::debug!(name, forms = nodes.len(), "evaluating source");
        Ok(nodes.iter().map(|node| self.eval_node(node)).collect())
    }

    /// Load a file and evaluate its forms in `env`, reporting any error
    /// results to the output sink.
    pub fn import(&mut self, env: &EnvRef, path: &str) -> InterpResult<Value> {
        tracing::debug!(path, "importing");
        let source = std::fs::read_to_string(path)
            .map_err(|e| RuntimeError::import_failure(&format!("{path}: {e}")))?;
        let nodes = parse_source(path, &source)
            .map_err(|e| RuntimeError::import_failure(&format!("{path}: {e}")))?;

        for node in &nodes {
            let result = self.eval(env, Value::from_node(node));
            if result.is_error() {
                self.write_line(&result.to_string());
            }
        }
        Ok(Value::unit())
    }

    /// Write a line to the output sink
    pub fn write_line(&mut self, line: &str) {
        let written = writeln!(self.output, "{line}").and_then(|()| self.output.flush());
        if let Err(err) = written {
            tracing::warn!(%err, "failed to write output");
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
