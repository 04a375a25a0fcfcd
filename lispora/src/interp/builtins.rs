//! Builtin function library
//!
//! Every builtin takes ownership of its argument list and returns a new
//! value. Argument checks report through [`RuntimeError`]; the call site turns
//! those into error values.

use super::env::{define_global, EnvRef, Environment};
use super::error::{InterpResult, RuntimeError};
use super::value::{Builtin, BuiltinFn, Closure, Formal, Function, List, Value};
use super::Interpreter;

/// Names and implementations registered in every global environment
const BUILTINS: &[(&str, BuiltinFn)] = &[
    ("list", builtin_list),
    ("head", builtin_head),
    ("tail", builtin_tail),
    ("eval", builtin_eval),
    ("join", builtin_join),
    ("+", builtin_add),
    ("-", builtin_sub),
    ("*", builtin_mul),
    ("/", builtin_div),
    (">", builtin_gt),
    ("<", builtin_lt),
    (">=", builtin_ge),
    ("<=", builtin_le),
    ("==", builtin_eq),
    ("!=", builtin_ne),
    ("def", builtin_def),
    ("=", builtin_put),
    ("\\", builtin_lambda),
    ("if", builtin_if),
    ("print", builtin_print),
    ("error", builtin_error),
    ("import", builtin_import),
];

/// Create a root environment with the builtin library bound
pub fn new_global_environment() -> EnvRef {
    let mut env = Environment::new();
    for &(name, func) in BUILTINS {
        env.put(name, Value::Function(Function::Builtin(Builtin { name, func })));
    }
    env.into_ref()
}

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

fn exactly<const N: usize>(func: &str, args: List) -> InterpResult<[Value; N]> {
    let given = args.len();
    <[Value; N]>::try_from(args.items)
        .map_err(|_| RuntimeError::wrong_argument_count(func, N, given))
}

fn into_qexpr(func: &str, index: usize, value: Value) -> InterpResult<List> {
    match value {
        Value::List(list) if list.quoted => Ok(list),
        other => Err(RuntimeError::wrong_argument_type(
            func,
            index,
            "Q-Expression",
            other.type_name(),
        )),
    }
}

fn into_number(func: &str, index: usize, value: Value) -> InterpResult<i64> {
    match value {
        Value::Number(n) => Ok(n),
        other => Err(RuntimeError::wrong_argument_type(func, index, "Number", other.type_name())),
    }
}

fn into_string(func: &str, index: usize, value: Value) -> InterpResult<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(RuntimeError::wrong_argument_type(func, index, "String", other.type_name())),
    }
}

/// Unwrap a Q-expression that must consist of symbols only
fn into_symbols(func: &str, index: usize, value: Value) -> InterpResult<Vec<String>> {
    into_qexpr(func, index, value)?
        .items
        .into_iter()
        .map(|item| match item {
            Value::Symbol(name) => Ok(name),
            other => Err(RuntimeError::wrong_argument_type(func, index, "Symbol", other.type_name())),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// List operations
// ---------------------------------------------------------------------------

fn builtin_list(_: &mut Interpreter, _: &EnvRef, mut args: List) -> InterpResult<Value> {
    args.quoted = true;
    Ok(Value::List(args))
}

fn builtin_head(_: &mut Interpreter, _: &EnvRef, args: List) -> InterpResult<Value> {
    let [arg] = exactly::<1>("head", args)?;
    let mut list = into_qexpr("head", 0, arg)?;
    if list.is_empty() {
        return Err(RuntimeError::empty_list_argument("head", 0));
    }
    list.items.truncate(1);
    Ok(Value::List(list))
}

fn builtin_tail(_: &mut Interpreter, _: &EnvRef, args: List) -> InterpResult<Value> {
    let [arg] = exactly::<1>("tail", args)?;
    let mut list = into_qexpr("tail", 0, arg)?;
    if list.is_empty() {
        return Err(RuntimeError::empty_list_argument("tail", 0));
    }
    list.items.remove(0);
    Ok(Value::List(list))
}

fn builtin_eval(interp: &mut Interpreter, env: &EnvRef, args: List) -> InterpResult<Value> {
    let [arg] = exactly::<1>("eval", args)?;
    let mut list = into_qexpr("eval", 0, arg)?;
    list.quoted = false;
    Ok(interp.eval(env, Value::List(list)))
}

fn builtin_join(_: &mut Interpreter, _: &EnvRef, args: List) -> InterpResult<Value> {
    let mut joined = List::qexpr(Vec::new());
    for (i, arg) in args.items.into_iter().enumerate() {
        joined.items.extend(into_qexpr("join", i, arg)?.items);
    }
    Ok(Value::List(joined))
}

// ---------------------------------------------------------------------------
// Arithmetic and comparison
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        }
    }

    fn apply(self, lhs: i64, rhs: i64) -> InterpResult<i64> {
        Ok(match self {
            ArithOp::Add => lhs.wrapping_add(rhs),
            ArithOp::Sub => lhs.wrapping_sub(rhs),
            ArithOp::Mul => lhs.wrapping_mul(rhs),
            ArithOp::Div if rhs == 0 => return Err(RuntimeError::division_by_zero()),
            ArithOp::Div => lhs.wrapping_div(rhs),
        })
    }
}

/// Left fold over numeric arguments. Arithmetic wraps on overflow.
fn arithmetic(op: ArithOp, args: List) -> InterpResult<Value> {
    let name = op.symbol();
    let numbers = args
        .items
        .into_iter()
        .enumerate()
        .map(|(i, arg)| into_number(name, i, arg))
        .collect::<InterpResult<Vec<_>>>()?;

    let Some((&first, rest)) = numbers.split_first() else {
        return Err(RuntimeError::wrong_argument_count(name, 1, 0));
    };

    if matches!(op, ArithOp::Sub) && rest.is_empty() {
        return Ok(Value::Number(first.wrapping_neg()));
    }

    let mut acc = first;
    for &n in rest {
        acc = op.apply(acc, n)?;
    }
    Ok(Value::Number(acc))
}

fn builtin_add(_: &mut Interpreter, _: &EnvRef, args: List) -> InterpResult<Value> {
    arithmetic(ArithOp::Add, args)
}

fn builtin_sub(_: &mut Interpreter, _: &EnvRef, args: List) -> InterpResult<Value> {
    arithmetic(ArithOp::Sub, args)
}

fn builtin_mul(_: &mut Interpreter, _: &EnvRef, args: List) -> InterpResult<Value> {
    arithmetic(ArithOp::Mul, args)
}

fn builtin_div(_: &mut Interpreter, _: &EnvRef, args: List) -> InterpResult<Value> {
    arithmetic(ArithOp::Div, args)
}

fn compare(name: &str, args: List, cmp: fn(i64, i64) -> bool) -> InterpResult<Value> {
    let [lhs, rhs] = exactly::<2>(name, args)?;
    let lhs = into_number(name, 0, lhs)?;
    let rhs = into_number(name, 1, rhs)?;
    Ok(Value::Number(i64::from(cmp(lhs, rhs))))
}

fn builtin_gt(_: &mut Interpreter, _: &EnvRef, args: List) -> InterpResult<Value> {
    compare(">", args, |a, b| a > b)
}

fn builtin_lt(_: &mut Interpreter, _: &EnvRef, args: List) -> InterpResult<Value> {
    compare("<", args, |a, b| a < b)
}

fn builtin_ge(_: &mut Interpreter, _: &EnvRef, args: List) -> InterpResult<Value> {
    compare(">=", args, |a, b| a >= b)
}

fn builtin_le(_: &mut Interpreter, _: &EnvRef, args: List) -> InterpResult<Value> {
    compare("<=", args, |a, b| a <= b)
}

fn builtin_eq(_: &mut Interpreter, _: &EnvRef, args: List) -> InterpResult<Value> {
    let [lhs, rhs] = exactly::<2>("==", args)?;
    Ok(Value::Number(i64::from(lhs == rhs)))
}

fn builtin_ne(_: &mut Interpreter, _: &EnvRef, args: List) -> InterpResult<Value> {
    let [lhs, rhs] = exactly::<2>("!=", args)?;
    Ok(Value::Number(i64::from(lhs != rhs)))
}

// ---------------------------------------------------------------------------
// Definitions and functions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Global,
    Local,
}

/// `(def {a b} 1 2)` / `(= {a b} 1 2)`
fn bind_names(name: &str, scope: Scope, env: &EnvRef, args: List) -> InterpResult<Value> {
    let given = args.len();
    let mut items = args.items.into_iter();
    let Some(names) = items.next() else {
        return Err(RuntimeError::wrong_argument_count(name, 1, 0));
    };
    let symbols = into_symbols(name, 0, names)?;
    if symbols.len() + 1 != given {
        return Err(RuntimeError::wrong_argument_count(name, symbols.len() + 1, given));
    }

    for (symbol, value) in symbols.into_iter().zip(items) {
        match scope {
            Scope::Global => define_global(env, symbol, value),
            Scope::Local => env.borrow_mut().put(symbol, value),
        }
    }
    Ok(Value::unit())
}

fn builtin_def(_: &mut Interpreter, env: &EnvRef, args: List) -> InterpResult<Value> {
    bind_names("def", Scope::Global, env, args)
}

fn builtin_put(_: &mut Interpreter, env: &EnvRef, args: List) -> InterpResult<Value> {
    bind_names("=", Scope::Local, env, args)
}

/// Turn a symbol list into formals, folding `& name` into a variadic formal
fn parse_formals(names: Vec<String>) -> InterpResult<Vec<Formal>> {
    let mut formals = Vec::with_capacity(names.len());
    let mut names = names.into_iter();
    while let Some(name) = names.next() {
        if name != "&" {
            formals.push(Formal::Fixed(name));
            continue;
        }
        match (names.next(), names.next()) {
            (Some(collector), None) if collector != "&" => formals.push(Formal::Variadic(collector)),
            _ => return Err(RuntimeError::invalid_variadic_form()),
        }
    }
    Ok(formals)
}

fn builtin_lambda(_: &mut Interpreter, _: &EnvRef, args: List) -> InterpResult<Value> {
    let [formals, body] = exactly::<2>("\\", args)?;
    let formals = parse_formals(into_symbols("\\", 0, formals)?)?;
    let body = into_qexpr("\\", 1, body)?;
    Ok(Value::Function(Function::Closure(Closure::new(formals, body))))
}

// ---------------------------------------------------------------------------
// Control flow and I/O
// ---------------------------------------------------------------------------

fn builtin_if(interp: &mut Interpreter, env: &EnvRef, args: List) -> InterpResult<Value> {
    let [cond, then_branch, else_branch] = exactly::<3>("if", args)?;
    let cond = into_number("if", 0, cond)?;
    let then_branch = into_qexpr("if", 1, then_branch)?;
    let else_branch = into_qexpr("if", 2, else_branch)?;

    let mut chosen = if cond != 0 { then_branch } else { else_branch };
    chosen.quoted = false;
    Ok(interp.eval(env, Value::List(chosen)))
}

fn builtin_print(interp: &mut Interpreter, _: &EnvRef, args: List) -> InterpResult<Value> {
    let line = args
        .items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    interp.write_line(&line);
    Ok(Value::unit())
}

fn builtin_error(_: &mut Interpreter, _: &EnvRef, args: List) -> InterpResult<Value> {
    let [message] = exactly::<1>("error", args)?;
    let message = into_string("error", 0, message)?;
    Err(RuntimeError::user_error(&message))
}

fn builtin_import(interp: &mut Interpreter, env: &EnvRef, args: List) -> InterpResult<Value> {
    let [path] = exactly::<1>("import", args)?;
    let path = into_string("import", 0, path)?;
    interp.import(env, &path)
}
