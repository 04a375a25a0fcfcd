//! Tree-walking interpreter: values, environments, evaluation and builtins

mod builtins;
mod env;
mod error;
mod eval;
mod value;

pub use builtins::new_global_environment;
pub use env::{define_global, root_env, EnvRef, Environment};
pub use error::{ErrorKind, InterpResult, RuntimeError};
pub use eval::Interpreter;
pub use value::{Builtin, BuiltinFn, Closure, Formal, Function, List, Value};
