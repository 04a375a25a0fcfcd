//! Integration tests for the Lispora interpreter
//!
//! Drives the full pipeline (lexer, parser, reader, evaluator, builtins and
//! prelude) through the public API, capturing everything the program prints.

use lispora::interp::{Interpreter, RuntimeError, Value};
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// Output sink shared with the test
#[derive(Clone, Default)]
struct Output(Rc<RefCell<Vec<u8>>>);

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Output {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

/// Helper: interpreter with prelude and captured output
fn session() -> (Interpreter, Output) {
    let out = Output::default();
    (Interpreter::with_output(Box::new(out.clone())), out)
}

/// Helper: evaluate a program and return the value of its last form
fn run(interp: &mut Interpreter, source: &str) -> Value {
    interp
        .eval_source("test.lspr", source)
        .expect("program should parse")
        .pop()
        .unwrap_or_else(Value::unit)
}

/// Helper: evaluate a program and render the last value
fn show(source: &str) -> String {
    let (mut interp, _) = session();
    run(&mut interp, source).to_string()
}

fn error_of(err: RuntimeError) -> String {
    Value::from(err).to_string()
}

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))
}

// ============================================
// Arithmetic
// ============================================

#[test]
fn test_division_truncates_toward_zero() {
    for (a, b) in [(7, 2), (-7, 2), (7, -2), (-7, -2), (100, 7), (i64::MIN + 1, 3)] {
        assert_eq!(show(&format!("(/ {a} {b})")), (a / b).to_string());
        assert_eq!(show(&format!("(* (/ {a} {b}) {b})")), ((a / b) * b).to_string());
    }
}

#[test]
fn test_division_by_zero() {
    for a in [0, 1, -1, 42] {
        assert_eq!(show(&format!("(/ {a} 0)")), error_of(RuntimeError::division_by_zero()));
    }
}

#[test]
fn test_nested_arithmetic() {
    assert_eq!(show("(+ 1 (* 2 3) (- 10 4))"), "13");
    assert_eq!(show("(- (- 3))"), "3");
}

// ============================================
// Q-expressions
// ============================================

#[test]
fn test_head_tail_join() {
    assert_eq!(show("(head (list))"), error_of(RuntimeError::empty_list_argument("head", 0)));
    assert_eq!(show("(head (list 1 2 3))"), "{1}");
    assert_eq!(show("(tail {1 2 3})"), "{2 3}");
    assert!(show("(tail {})").starts_with("Error:"));
    assert_eq!(show("(join {1 2} {3} {})"), "{1 2 3}");
}

#[test]
fn test_quoted_data_is_inert() {
    assert_eq!(show("(eval {+ 1 2})"), "3");
    assert_eq!(show("(list + 1 2)"), "{+ 1 2}");
    assert_eq!(show("{undefined (also undefined)}"), "{undefined (also undefined)}");
    assert_eq!(show("(eval (list + 1 2))"), "3");
}

// ============================================
// Functions
// ============================================

#[test]
fn test_closure_equality_ignores_captured_state() {
    assert_eq!(show("(== (\\ {x} {x}) (\\ {x} {x}))"), "1");
    assert_eq!(show("(def {f} (\\ {x y} {+ x y})) (== (f 1) (f 2))"), "1");
    assert_eq!(show("(== (\\ {x} {x}) (\\ {x} {+ x 0}))"), "0");
}

#[test]
fn test_partial_application() {
    let (mut interp, _) = session();
    run(&mut interp, "(def {add} (\\ {x y} {+ x y}))");
    run(&mut interp, "(def {add1} (add 1))");
    assert_eq!(run(&mut interp, "(add1 5)"), Value::number(6));
    assert_eq!(run(&mut interp, "(add1 10)"), Value::number(11));
    assert_eq!(run(&mut interp, "((add 2) 3)"), Value::number(5));
}

#[test]
fn test_partial_application_copies_are_independent() {
    let (mut interp, _) = session();
    run(&mut interp, "(def {add3} (\\ {a b c} {+ a b c}))");
    run(&mut interp, "(def {base} (add3 100))");
    run(&mut interp, "(def {left} (base 1))");
    run(&mut interp, "(def {right} (base 2))");
    assert_eq!(run(&mut interp, "(left 0)"), Value::number(101));
    assert_eq!(run(&mut interp, "(right 0)"), Value::number(102));
}

#[test]
fn test_variadic_arguments() {
    assert_eq!(show("((\\ {x & xs} {xs}) 1 2 3)"), "{2 3}");
    assert_eq!(show("((\\ {x & xs} {xs}) 1)"), "{}");
    assert_eq!(show("((\\ {& xs} {xs}) 1 2)"), "{1 2}");
    assert_eq!(
        show("(\\ {x & xs ys} {x})"),
        error_of(RuntimeError::invalid_variadic_form())
    );
}

#[test]
fn test_too_many_arguments() {
    assert_eq!(
        show("((\\ {x y} {x}) 1 2 3)"),
        error_of(RuntimeError::too_many_arguments(3, 2))
    );
}

#[test]
fn test_def_is_global_and_put_is_local() {
    let (mut interp, _) = session();
    run(&mut interp, "(def {g} (\\ {v} {def {from_def} v}))");
    run(&mut interp, "(def {l} (\\ {v} {= {from_put} v}))");
    run(&mut interp, "(g 1)");
    run(&mut interp, "(l 2)");
    assert_eq!(run(&mut interp, "from_def"), Value::number(1));
    assert_eq!(
        run(&mut interp, "from_put"),
        RuntimeError::unbound_symbol("from_put").into()
    );
}

#[test]
fn test_parameters_shadow_globals() {
    let (mut interp, _) = session();
    run(&mut interp, "(def {x} 1)");
    run(&mut interp, "(def {f} (\\ {x} {+ x 1}))");
    assert_eq!(run(&mut interp, "(f 10)"), Value::number(11));
    assert_eq!(run(&mut interp, "x"), Value::number(1));
}

#[test]
fn test_free_variables_resolve_in_caller() {
    let (mut interp, _) = session();
    run(&mut interp, "(def {get-z} (\\ {_} {z}))");
    run(&mut interp, "(def {with-z} (\\ {z} {get-z 0}))");
    assert_eq!(run(&mut interp, "(with-z 7)"), Value::number(7));
    assert_eq!(run(&mut interp, "(with-z 8)"), Value::number(8));
}

#[test]
fn test_recursive_function() {
    let (mut interp, _) = session();
    run(
        &mut interp,
        "(fun {fact n} {if (<= n 1) {1} {* n (fact (- n 1))}})",
    );
    assert_eq!(run(&mut interp, "(fact 10)"), Value::number(3_628_800));
}

// ============================================
// Conditionals and errors
// ============================================

#[test]
fn test_if_skips_untaken_branch() {
    let (mut interp, out) = session();
    assert_eq!(run(&mut interp, "(if 0 {print \"then\"} {2})"), Value::number(2));
    assert_eq!(run(&mut interp, "(if 1 {1} {print \"else\"})"), Value::number(1));
    assert_eq!(out.text(), "");
}

#[test]
fn test_unbound_symbol() {
    assert_eq!(show("(foo)"), error_of(RuntimeError::unbound_symbol("foo")));
}

#[test]
fn test_first_error_wins_after_side_effects() {
    let (mut interp, out) = session();
    let result = run(&mut interp, "(+ (error \"one\") (print \"side\") undefined)");
    assert_eq!(result, Value::error("one"));
    assert_eq!(out.text(), "\"side\"\n");
}

#[test]
fn test_error_values_are_first_class() {
    assert_eq!(show("(== (error \"x\") (error \"x\"))"), "Error: x");
    assert_eq!(show("(list (error \"boom\"))"), "Error: boom");
    assert_eq!(show("(error 1)"), error_of(RuntimeError::wrong_argument_type("error", 0, "String", "Number")));
}

#[test]
fn test_not_a_function() {
    assert_eq!(show("(1 2)"), error_of(RuntimeError::not_a_function("Number")));
    assert_eq!(show("({1} 2)"), error_of(RuntimeError::not_a_function("Q-Expression")));
}

// ============================================
// Printing
// ============================================

#[test]
fn test_print_space_separated() {
    let (mut interp, out) = session();
    let result = run(&mut interp, "(print 1 \"two\" {3 4} (\\ {x} {x}))");
    assert_eq!(result, Value::unit());
    assert_eq!(out.text(), "1 \"two\" {3 4} (\\ {x} {x})\n");
}

// ============================================
// Import
// ============================================

#[test]
fn test_import_evaluates_forms_in_current_environment() {
    let (mut interp, out) = session();
    let result = run(&mut interp, &format!("(import \"{}\")", fixture("shapes.lspr")));
    assert_eq!(result, Value::unit());
    assert_eq!(run(&mut interp, "area"), Value::number(16));
    assert_eq!(run(&mut interp, "(square 3)"), Value::number(9));
    assert_eq!(
        out.text(),
        "\"shapes loaded\"\nError: function 'head' passed {} for argument 0\n"
    );
}

#[test]
fn test_import_parse_failure() {
    let (mut interp, _) = session();
    let result = run(&mut interp, &format!("(import \"{}\")", fixture("broken.lspr")));
    let Value::Error(message) = result else {
        panic!("expected import failure, got {result}");
    };
    assert!(message.starts_with("could not import: "));
    assert!(run(&mut interp, "x").is_error());
}

// ============================================
// Prelude
// ============================================

#[test]
fn test_prelude_list_functions() {
    assert_eq!(show("(len {1 2 3})"), "3");
    assert_eq!(show("(nth 1 {5 6 7})"), "6");
    assert_eq!(show("(last {5 6 7})"), "7");
    assert_eq!(show("(reverse {1 2 3})"), "{3 2 1}");
    assert_eq!(show("(fst {{1 2} 3})"), "{1 2}");
    assert_eq!(show("(snd {1 2})"), "2");
}

#[test]
fn test_prelude_higher_order_functions() {
    assert_eq!(show("(map (\\ {x} {* x 2}) {1 2 3})"), "{2 4 6}");
    assert_eq!(show("(filter (\\ {x} {> x 1}) {1 2 3})"), "{2 3}");
    assert_eq!(show("(foldl + 0 {1 2 3 4})"), "10");
    assert_eq!(show("(sum {1 2 3 4})"), "10");
    assert_eq!(show("(product {1 2 3 4})"), "24");
}

#[test]
fn test_prelude_logic_and_currying() {
    assert_eq!(show("(not false)"), "1");
    assert_eq!(show("(and true false)"), "0");
    assert_eq!(show("(or false true)"), "1");
    assert_eq!(show("(unpack + {1 2 3})"), "6");
    assert_eq!(show("(pack head 1 2 3)"), "{1}");
}

#[test]
fn test_bare_interpreter_has_no_prelude() {
    let mut interp = Interpreter::bare(Box::new(io::sink()));
    assert_eq!(
        run(&mut interp, "(len {1})"),
        RuntimeError::unbound_symbol("len").into()
    );
}

// ============================================
// REPL line semantics
// ============================================

#[test]
fn test_eval_line_treats_line_as_sexpr() {
    let (mut interp, _) = session();
    assert_eq!(interp.eval_line("+ 1 2").unwrap(), Value::number(3));
    assert_eq!(interp.eval_line("def {y} 3").unwrap(), Value::unit());
    assert_eq!(interp.eval_line("y").unwrap(), Value::number(3));
    assert!(interp.eval_line("(+ 1 2").is_err());
}
