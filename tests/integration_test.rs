// ABOUTME: Black-box lex→parse→eval tests covering the seed scenarios and universal properties

use cocktail_lang::env::Environment;
use cocktail_lang::error::CocktailError;
use cocktail_lang::lexer;
use cocktail_lang::module_info::ModuleInfo;
use cocktail_lang::parser;
use cocktail_lang::value::Value;
use cocktail_lang::{builtins, eval};
use std::rc::Rc;

/// Runs a whole program through lex→parse→eval in a fresh module scope
/// and returns whatever `eval_module` returns (an `exit()` value, or
/// `None` for a normal fall-off-the-end program).
fn run(src: &str) -> Result<Option<Value>, CocktailError> {
    let info = ModuleInfo::unknown(src);
    let tokens = lexer::tokenize(info)?;
    let module = parser::parse(tokens)?;
    let env = Environment::new();
    builtins::register(&env);
    eval::eval_module(&module, &env)
}

/// Same pipeline, but returns the final environment so callers can
/// inspect bound names instead of relying on `print`'s stdout side
/// effect (the teacher crate's own eval tests follow this pattern).
fn run_env(src: &str) -> Rc<Environment> {
    let info = ModuleInfo::unknown(src);
    let tokens = lexer::tokenize(info).expect("lex");
    let module = parser::parse(tokens).expect("parse");
    let env = Environment::new();
    builtins::register(&env);
    eval::eval_module(&module, &env).expect("eval");
    env
}

fn num(env: &Rc<Environment>, name: &str) -> f64 {
    match env.get(name) {
        Some(Value::Num(n)) => n,
        other => panic!("expected Num for '{}', got {:?}", name, other),
    }
}

// ----- Seed scenarios (§8) ----- //

#[test]
fn seed_01_print_hello() {
    // `print` writes to stdout directly; exercised here for its
    // no-error, no-exit-marker return shape rather than captured text.
    let result = run(r#"print("hello");"#).unwrap();
    assert!(result.is_none());
}

#[test]
fn seed_02_augmented_assignment() {
    let env = run_env("a = 1; a += 2;");
    assert_eq!(num(&env, "a"), 3.0);
}

#[test]
fn seed_03_chained_comparison_in_if() {
    let env = run_env(r#"if (1 < 2 < 3) { branch = "ok"; } else { branch = "no"; }"#);
    assert!(matches!(env.get("branch"), Some(Value::Str(s)) if s == "ok"));
}

#[test]
fn seed_04_while_loop_counts_up() {
    let env = run_env("i = 0; seen = []; while (i < 3) { seen = seen + [i]; i++; }");
    match env.get("seen") {
        Some(Value::List(items)) => {
            let items = items.borrow();
            assert_eq!(items.len(), 3);
            assert!(matches!(items[0], Value::Num(n) if n == 0.0));
            assert!(matches!(items[2], Value::Num(n) if n == 2.0));
        }
        other => panic!("expected List, got {:?}", other),
    }
}

#[test]
fn seed_05_for_of_over_list() {
    let env = run_env("total = 0; for (x of [10, 20, 30]) { total += x; }");
    assert_eq!(num(&env, "total"), 60.0);
}

#[test]
fn seed_06_length_of_string_and_list() {
    let env = run_env(r#"a = length("abc"); b = length([1, 2, 3, 4]);"#);
    assert_eq!(num(&env, "a"), 3.0);
    assert_eq!(num(&env, "b"), 4.0);
}

#[test]
fn seed_07_match_builtin() {
    let env = run_env(r#"m = match("^h.*o$", "hello");"#);
    assert!(matches!(env.get("m"), Some(Value::Bool(true))));
}

#[test]
fn seed_08_number_constructor_coercion() {
    let env = run_env(r#"x = Number("2.5") + 1;"#);
    assert_eq!(num(&env, "x"), 3.5);
}

#[test]
fn seed_09_exit_with_argument() {
    let result = run(r#"exit("bye");"#).unwrap();
    assert!(matches!(result, Some(Value::Str(s)) if s == "bye"));
}

#[test]
fn seed_10_undefined_name_is_name_error() {
    let err = run("print(undef);").unwrap_err();
    match &err {
        CocktailError::Name { message, .. } => assert_eq!(message, "name 'undef' is not found"),
        other => panic!("expected NameError, got {:?}", other),
    }
}

// ----- Universally-quantified properties (§8) ----- //

#[test]
fn num_plus_zero_is_identity() {
    let env = run_env("x = 7; y = x + 0;");
    assert_eq!(num(&env, "y"), 7.0);
}

#[test]
fn unsupported_binary_operand_names_both_types() {
    let err = run(r#"x = 1 + "a";"#).unwrap_err();
    match &err {
        CocktailError::Type { message, .. } => {
            assert!(message.contains("number"));
            assert!(message.contains("string"));
        }
        other => panic!("expected TypeError, got {:?}", other),
    }
}

#[test]
fn chained_comparison_short_circuits_without_evaluating_the_rest() {
    let env = run_env("calls = 0; func bump() { global calls; calls += 1; return 5; } r = 1 < 2 < bump();");
    assert!(matches!(env.get("r"), Some(Value::Bool(true))));
    assert_eq!(num(&env, "calls"), 1.0);

    let env = run_env("calls = 0; func bump() { global calls; calls += 1; return 5; } r = 2 < 1 < bump();");
    assert!(matches!(env.get("r"), Some(Value::Bool(false))));
    assert_eq!(num(&env, "calls"), 0.0);
}

#[test]
fn assigning_to_reserved_constants_is_a_parse_time_syntax_error() {
    for src in ["true = 1;", "false = 1;", "none = 1;", "true += 1;", "++none;"] {
        let err = run(src).unwrap_err();
        assert!(matches!(err, CocktailError::Syntax { .. }), "expected SyntaxError for '{}'", src);
    }
}

#[test]
fn break_or_continue_at_module_level_is_a_syntax_error() {
    assert!(matches!(run("break;").unwrap_err(), CocktailError::Syntax { .. }));
    assert!(matches!(run("continue;").unwrap_err(), CocktailError::Syntax { .. }));
}

#[test]
fn duplicate_parameter_names_are_rejected_at_parse_time() {
    let info = ModuleInfo::unknown("func f(a, a) { return a; }");
    let tokens = lexer::tokenize(info).unwrap();
    assert!(matches!(parser::parse(tokens).unwrap_err(), CocktailError::Syntax { .. }));
}

// ----- Broader feature integration ----- //

#[test]
fn c_style_for_loop_with_else_clause() {
    let env = run_env(
        r#"
        total = 0;
        for (i = 0; i < 5; i++) {
            total += i;
        } else {
            total += 100;
        }
        "#,
    );
    // 0+1+2+3+4 = 10, then the else clause runs since the loop wasn't broken
    assert_eq!(num(&env, "total"), 110.0);
}

#[test]
fn break_skips_the_loop_else_clause() {
    let env = run_env(
        r#"
        total = 0;
        i = 0;
        while (i < 5) {
            if (i == 2) { break; }
            total += i;
            i++;
        } else {
            total += 1000;
        }
        "#,
    );
    assert_eq!(num(&env, "total"), 1.0); // 0 + 1, then break before the else runs
}

#[test]
fn recursive_function_and_closures_compose() {
    let env = run_env(
        r#"
        func fib(n) {
            if (n < 2) { return n; }
            return fib(n - 1) + fib(n - 2);
        }
        x = fib(10);

        func make_adder(n) {
            func adder(x) { return x + n; }
            return adder;
        }
        add5 = make_adder(5);
        y = add5(10);
        "#,
    );
    assert_eq!(num(&env, "x"), 55.0);
    assert_eq!(num(&env, "y"), 15.0);
}

#[test]
fn varargs_and_defaults_bind_correctly() {
    let env = run_env(
        r#"
        func total(base = 10, *rest) {
            acc = base;
            for (r of rest) { acc += r; }
            return acc;
        }
        a = total();
        b = total(1, 2, 3);
        "#,
    );
    assert_eq!(num(&env, "a"), 10.0);
    assert_eq!(num(&env, "b"), 6.0);
}

#[test]
fn slicing_and_indexing_follow_python_semantics() {
    let env = run_env(
        r#"
        xs = [0, 1, 2, 3, 4];
        a = xs[1:3];
        b = xs[-1];
        c = xs[::2];
        "#,
    );
    match env.get("a") {
        Some(Value::List(items)) => assert_eq!(items.borrow().len(), 2),
        other => panic!("expected List, got {:?}", other),
    }
    assert_eq!(num(&env, "b"), 4.0);
    match env.get("c") {
        Some(Value::List(items)) => assert_eq!(items.borrow().len(), 3),
        other => panic!("expected List, got {:?}", other),
    }
}

#[test]
fn bitwise_typo_resolution_returns_bool_for_bool_operands() {
    let env = run_env("x = true & false; y = true | false;");
    assert!(matches!(env.get("x"), Some(Value::Bool(false))));
    assert!(matches!(env.get("y"), Some(Value::Bool(true))));
}

#[test]
fn floats_are_rejected_by_bitwise_operators() {
    let err = run("x = 1.5 & 2;").unwrap_err();
    match &err {
        CocktailError::Type { message, .. } => assert!(message.contains("floats cannot be in")),
        other => panic!("expected TypeError, got {:?}", other),
    }
}

#[test]
fn out_of_range_index_is_an_index_error() {
    let err = run("xs = [1, 2, 3]; y = xs[10];").unwrap_err();
    assert!(matches!(err, CocktailError::Index { .. }));
}

#[test]
fn global_and_nonlocal_write_through_outer_scopes() {
    let env = run_env(
        r#"
        counter = 0;
        func bump() { global counter; counter += 1; }
        bump(); bump(); bump();

        func make_counter() {
            n = 0;
            func inc() { nonlocal n; n += 1; return n; }
            return inc;
        }
        inc = make_counter();
        first = inc();
        second = inc();
        "#,
    );
    assert_eq!(num(&env, "counter"), 3.0);
    assert_eq!(num(&env, "first"), 1.0);
    assert_eq!(num(&env, "second"), 2.0);
}
