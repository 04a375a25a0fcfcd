//! Lispora
//!
//! A small Lisp with Q-expressions, first-class functions, partial
//! application and errors as values.

pub mod ast;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod repl;

pub use ast::Span;
pub use error::{LoadError, Result};
pub use interp::{Interpreter, Value};
