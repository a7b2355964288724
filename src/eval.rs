// ABOUTME: Tree-walking evaluator with closures, in-band errors, and
// return unwinding

use crate::ast::{
    BlockStatement, Expression, HashLiteral, IfExpression, Program, Statement,
};
use crate::builtins;
use crate::env::Environment;
use crate::quote;
use crate::value::{Function, HashPair, MacroValue, Value};
use std::collections::HashMap;
use std::rc::Rc;

/// Evaluates a program against an environment. `return` unwinds are
/// unwrapped here, at the outermost boundary; runtime errors come back
/// as `Value::Error`.
pub fn eval_program(program: &Program, env: &Rc<Environment>) -> Value {
    let mut result = Value::Null;
    for statement in &program.statements {
        match eval_statement(statement, env) {
            Value::Return(value) => return *value,
            error @ Value::Error(_) => return error,
            value => result = value,
        }
    }
    result
}

pub fn eval_statement(statement: &Statement, env: &Rc<Environment>) -> Value {
    match statement {
        Statement::Let(s) => {
            let value = eval_expression(&s.value, env);
            if value.is_error() {
                return value;
            }
            env.set(s.name.value.clone(), value);
            Value::Null
        }
        Statement::Return(s) => {
            let value = eval_expression(&s.value, env);
            if value.is_error() {
                return value;
            }
            Value::Return(Box::new(value))
        }
        Statement::Expression(s) => eval_expression(&s.expression, env),
    }
}

/// Evaluates a block. The first `Return` or `Error` is handed back
/// unwrapped so that outer blocks keep unwinding; only the function
/// boundary (and the program itself) strips the wrapper.
pub fn eval_block(block: &BlockStatement, env: &Rc<Environment>) -> Value {
    let mut result = Value::Null;
    for statement in &block.statements {
        match eval_statement(statement, env) {
            terminal @ (Value::Return(_) | Value::Error(_)) => return terminal,
            value => result = value,
        }
    }
    result
}

pub fn eval_expression(expression: &Expression, env: &Rc<Environment>) -> Value {
    match expression {
        Expression::Int(literal) => Value::Integer(literal.value),
        Expression::Str(literal) => Value::Str(literal.value.clone()),
        Expression::Bool(literal) => Value::Bool(literal.value),
        Expression::Ident(ident) => eval_identifier(&ident.value, env),
        Expression::Prefix(prefix) => {
            let right = eval_expression(&prefix.right, env);
            if right.is_error() {
                return right;
            }
            eval_prefix_expression(&prefix.operator, right)
        }
        Expression::Infix(infix) => {
            let left = eval_expression(&infix.left, env);
            if left.is_error() {
                return left;
            }
            let right = eval_expression(&infix.right, env);
            if right.is_error() {
                return right;
            }
            eval_infix_expression(&infix.operator, left, right)
        }
        Expression::If(conditional) => eval_if_expression(conditional, env),
        Expression::Function(literal) => Value::Function(Rc::new(Function {
            parameters: literal.parameters.clone(),
            body: literal.body.clone(),
            env: env.clone(),
        })),
        Expression::Macro(literal) => Value::Macro(Rc::new(MacroValue {
            parameters: literal.parameters.clone(),
            body: literal.body.clone(),
            env: env.clone(),
        })),
        Expression::Call(call) => {
            // `quote` suppresses evaluation of its argument entirely, so
            // it has to be intercepted before callee and arguments run.
            if let Expression::Ident(ident) = call.function.as_ref() {
                if ident.value == "quote" {
                    if call.arguments.len() != 1 {
                        return Value::Error(format!(
                            "wrong number of arguments. got={}, want=1",
                            call.arguments.len()
                        ));
                    }
                    return quote::quote(call.arguments[0].clone(), env);
                }
            }
            let function = eval_expression(&call.function, env);
            if function.is_error() {
                return function;
            }
            let arguments = eval_expressions(&call.arguments, env);
            if arguments.len() == 1 && arguments[0].is_error() {
                return arguments.into_iter().next().unwrap();
            }
            apply_function(function, arguments)
        }
        Expression::Array(literal) => {
            let elements = eval_expressions(&literal.elements, env);
            if elements.len() == 1 && elements[0].is_error() {
                return elements.into_iter().next().unwrap();
            }
            Value::Array(elements)
        }
        Expression::Index(index) => {
            let left = eval_expression(&index.left, env);
            if left.is_error() {
                return left;
            }
            let idx = eval_expression(&index.index, env);
            if idx.is_error() {
                return idx;
            }
            eval_index_expression(left, idx)
        }
        Expression::Hash(literal) => eval_hash_literal(literal, env),
    }
}

fn eval_identifier(name: &str, env: &Rc<Environment>) -> Value {
    if let Some(builtin) = builtins::lookup(name) {
        return Value::Builtin(builtin);
    }
    match env.get(name) {
        Some(value) => value,
        None => Value::Error(format!("identifier not found: {}", name)),
    }
}

/// Evaluates left to right; the first error collapses the whole list to
/// a single-element vector carrying it.
fn eval_expressions(expressions: &[Expression], env: &Rc<Environment>) -> Vec<Value> {
    let mut results = Vec::with_capacity(expressions.len());
    for expression in expressions {
        let value = eval_expression(expression, env);
        if value.is_error() {
            return vec![value];
        }
        results.push(value);
    }
    results
}

fn apply_function(function: Value, arguments: Vec<Value>) -> Value {
    match function {
        Value::Function(function) => {
            let call_env = Environment::new_enclosed(function.env.clone());
            // Positional binding up to the shorter of the two lists;
            // surplus parameters stay unbound.
            for (parameter, argument) in function.parameters.iter().zip(arguments) {
                call_env.set(parameter.value.clone(), argument);
            }
            unwrap_return(eval_block(&function.body, &call_env))
        }
        Value::Builtin(builtin) => builtin(&arguments),
        other => Value::Error(format!("not a function: {}", other.type_name())),
    }
}

fn unwrap_return(value: Value) -> Value {
    match value {
        Value::Return(inner) => *inner,
        other => other,
    }
}

fn eval_prefix_expression(operator: &str, right: Value) -> Value {
    match operator {
        "!" => eval_bang_operator(right),
        "-" => match right {
            Value::Integer(n) => Value::Integer(n.wrapping_neg()),
            other => Value::Error(format!("unknown operator: -{}", other.type_name())),
        },
        _ => Value::Error(format!(
            "unknown operator: {}{}",
            operator,
            right.type_name()
        )),
    }
}

fn eval_bang_operator(right: Value) -> Value {
    match right {
        Value::Bool(b) => Value::Bool(!b),
        Value::Null => Value::Bool(true),
        _ => Value::Bool(false),
    }
}

fn eval_infix_expression(operator: &str, left: Value, right: Value) -> Value {
    if left.type_name() != right.type_name() {
        return Value::Error(format!(
            "type mismatch: {} {} {}",
            left.type_name(),
            operator,
            right.type_name()
        ));
    }
    match (&left, &right) {
        (Value::Integer(l), Value::Integer(r)) => {
            eval_integer_infix_expression(operator, *l, *r)
        }
        (Value::Str(l), Value::Str(r)) => {
            if operator == "+" {
                Value::Str(format!("{}{}", l, r))
            } else {
                Value::Error(format!("unknown operator: STRING {} STRING", operator))
            }
        }
        _ => match operator {
            // Identity comparison; true only for the boolean and null
            // singletons, false for freshly-allocated composites.
            "==" => Value::Bool(values_identical(&left, &right)),
            "!=" => Value::Bool(!values_identical(&left, &right)),
            _ => Value::Error(format!(
                "unknown operator: {} {} {}",
                left.type_name(),
                operator,
                right.type_name()
            )),
        },
    }
}

fn values_identical(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Bool(l), Value::Bool(r)) => l == r,
        (Value::Null, Value::Null) => true,
        _ => false,
    }
}

fn eval_integer_infix_expression(operator: &str, left: i64, right: i64) -> Value {
    match operator {
        "+" => Value::Integer(left.wrapping_add(right)),
        "-" => Value::Integer(left.wrapping_sub(right)),
        "*" => Value::Integer(left.wrapping_mul(right)),
        "/" => {
            if right == 0 {
                Value::Error("division by zero".to_string())
            } else {
                Value::Integer(left.wrapping_div(right))
            }
        }
        "<" => Value::Bool(left < right),
        ">" => Value::Bool(left > right),
        "==" => Value::Bool(left == right),
        "!=" => Value::Bool(left != right),
        _ => Value::Error(format!("unknown operator: INTEGER {} INTEGER", operator)),
    }
}

fn eval_if_expression(conditional: &IfExpression, env: &Rc<Environment>) -> Value {
    let condition = eval_expression(&conditional.condition, env);
    if condition.is_error() {
        return condition;
    }
    if is_truthy(&condition) {
        eval_block(&conditional.consequence, env)
    } else if let Some(alternative) = &conditional.alternative {
        eval_block(alternative, env)
    } else {
        Value::Null
    }
}

/// `null` and `false` are falsy; everything else, zero included, is truthy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        _ => true,
    }
}

fn eval_index_expression(left: Value, index: Value) -> Value {
    match (&left, &index) {
        (Value::Array(elements), Value::Integer(i)) => {
            if *i < 0 || *i >= elements.len() as i64 {
                Value::Null
            } else {
                elements[*i as usize].clone()
            }
        }
        (Value::Hash(pairs), _) => match index.hash_key() {
            Some(key) => pairs
                .get(&key)
                .map(|pair| pair.value.clone())
                .unwrap_or(Value::Null),
            None => Value::Error(format!("unusable as hash key: {}", index.type_name())),
        },
        _ => Value::Error(format!(
            "index operator not supported: {}",
            left.type_name()
        )),
    }
}

fn eval_hash_literal(literal: &HashLiteral, env: &Rc<Environment>) -> Value {
    let mut pairs = HashMap::with_capacity(literal.pairs.len());
    for (key_expression, value_expression) in &literal.pairs {
        let key = eval_expression(key_expression, env);
        if key.is_error() {
            return key;
        }
        let Some(hash_key) = key.hash_key() else {
            return Value::Error(format!("unusable as hash key: {}", key.type_name()));
        };
        let value = eval_expression(value_expression, env);
        if value.is_error() {
            return value;
        }
        pairs.insert(hash_key, HashPair { key, value });
    }
    Value::Hash(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn eval_source(input: &str) -> Value {
        let mut parser = Parser::new(Lexer::new(input));
        let program = parser.parse_program();
        assert_eq!(
            parser.errors(),
            &[] as &[String],
            "parser errors for {:?}",
            input
        );
        eval_program(&program, &Environment::new())
    }

    fn assert_integer(value: &Value, expected: i64) {
        match value {
            Value::Integer(n) => assert_eq!(*n, expected),
            other => panic!("expected integer {}, got {:?}", expected, other),
        }
    }

    fn assert_error(value: &Value, expected: &str) {
        match value {
            Value::Error(message) => assert_eq!(message, expected),
            other => panic!("expected error {:?}, got {:?}", expected, other),
        }
    }

    #[test]
    fn test_integer_arithmetic() {
        let cases = [
            ("5", 5),
            ("10", 10),
            ("-5", -5),
            ("-10", -10),
            ("5 + 5 + 5 + 5 - 10", 10),
            ("2 * 2 * 2 * 2 * 2", 32),
            ("-50 + 100 + -50", 0),
            ("5 * 2 + 10", 20),
            ("5 + 2 * 10", 25),
            ("20 + 2 * -10", 0),
            ("50 / 2 * 2 + 10", 60),
            ("2 * (5 + 10)", 30),
            ("3 * 3 * 3 + 10", 37),
            ("3 * (3 * 3) + 10", 37),
            ("(5 + 10 * 2 + 15 / 3) * 2 + -10", 50),
            ("7 / 2", 3),
            ("-7 / 2", -3),
        ];
        for (input, expected) in cases {
            assert_integer(&eval_source(input), expected);
        }
    }

    #[test]
    fn test_boolean_expressions() {
        let cases = [
            ("true", true),
            ("false", false),
            ("1 < 2", true),
            ("1 > 2", false),
            ("1 == 1", true),
            ("1 != 1", false),
            ("1 == 2", false),
            ("true == true", true),
            ("false == false", true),
            ("true == false", false),
            ("true != false", true),
            ("(1 < 2) == true", true),
            ("(1 > 2) == true", false),
        ];
        for (input, expected) in cases {
            match eval_source(input) {
                Value::Bool(b) => assert_eq!(b, expected, "input {:?}", input),
                other => panic!("expected boolean for {:?}, got {:?}", input, other),
            }
        }
    }

    #[test]
    fn test_bang_operator() {
        let cases = [
            ("!true", false),
            ("!false", true),
            ("!5", false),
            ("!0", false),
            ("!!true", true),
            ("!!false", false),
            ("!!5", true),
        ];
        for (input, expected) in cases {
            match eval_source(input) {
                Value::Bool(b) => assert_eq!(b, expected, "input {:?}", input),
                other => panic!("expected boolean for {:?}, got {:?}", input, other),
            }
        }
    }

    #[test]
    fn test_if_else_expressions() {
        assert_integer(&eval_source("if (true) { 10 }"), 10);
        assert_integer(&eval_source("if (1) { 10 }"), 10);
        assert_integer(&eval_source("if (1 < 2) { 10 }"), 10);
        assert_integer(&eval_source("if (1 > 2) { 10 } else { 20 }"), 20);
        assert_integer(&eval_source("if (1 < 2) { 10 } else { 20 }"), 10);
        assert!(matches!(eval_source("if (false) { 10 }"), Value::Null));
        assert!(matches!(eval_source("if (1 > 2) { 10 }"), Value::Null));
    }

    #[test]
    fn test_return_statements() {
        let cases = [
            ("return 10;", 10),
            ("return 10; 9;", 10),
            ("return 2 * 5; 9;", 10),
            ("9; return 2 * 5; 9;", 10),
            ("if (10 > 1) { if (10 > 1) { return 10; } return 1; }", 10),
        ];
        for (input, expected) in cases {
            assert_integer(&eval_source(input), expected);
        }
    }

    #[test]
    fn test_error_handling() {
        let cases = [
            ("5 + true;", "type mismatch: INTEGER + BOOLEAN"),
            ("5 + true; 5;", "type mismatch: INTEGER + BOOLEAN"),
            ("-true", "unknown operator: -BOOLEAN"),
            ("true + false;", "unknown operator: BOOLEAN + BOOLEAN"),
            ("5; true + false; 5", "unknown operator: BOOLEAN + BOOLEAN"),
            (
                "if (10 > 1) { true + false; }",
                "unknown operator: BOOLEAN + BOOLEAN",
            ),
            (
                "if (10 > 1) { if (10 > 1) { return true + false; } return 1; }",
                "unknown operator: BOOLEAN + BOOLEAN",
            ),
            ("foobar", "identifier not found: foobar"),
            ("\"Hello\" - \"World\"", "unknown operator: STRING - STRING"),
            ("\"Hello\" == \"Hello\"", "unknown operator: STRING == STRING"),
            (
                "{\"name\": \"Tamarin\"}[fn(x) { x }];",
                "unusable as hash key: FUNCTION",
            ),
            ("{fn(x) { x }: 1}", "unusable as hash key: FUNCTION"),
            ("[1, 2, 3][\"x\"]", "index operator not supported: ARRAY"),
            ("5(1)", "not a function: INTEGER"),
            ("10 / 0", "division by zero"),
        ];
        for (input, expected) in cases {
            assert_error(&eval_source(input), expected);
        }
    }

    #[test]
    fn test_error_short_circuits_siblings() {
        // The array literal never finishes evaluating; the error escapes
        // alone rather than embedded in a composite.
        let result = eval_source("[1, 2 + true, 3]");
        assert_error(&result, "type mismatch: INTEGER + BOOLEAN");
    }

    #[test]
    fn test_let_statements() {
        let cases = [
            ("let a = 5; a;", 5),
            ("let a = 5 * 5; a;", 25),
            ("let a = 5; let b = a; b;", 5),
            ("let a = 5; let b = a; let c = a + b + 5; c;", 15),
        ];
        for (input, expected) in cases {
            assert_integer(&eval_source(input), expected);
        }
    }

    #[test]
    fn test_function_value() {
        match eval_source("fn(x) { x + 2; };") {
            Value::Function(function) => {
                assert_eq!(function.parameters.len(), 1);
                assert_eq!(function.parameters[0].value, "x");
                assert_eq!(function.body.to_string(), "(x + 2)");
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_function_application() {
        let cases = [
            ("let identity = fn(x) { x; }; identity(5);", 5),
            ("let identity = fn(x) { return x; }; identity(5);", 5),
            ("let double = fn(x) { x * 2; }; double(5);", 10),
            ("let add = fn(x, y) { x + y; }; add(5, 5);", 10),
            ("let add = fn(x, y) { x + y; }; add(5 + 5, add(5, 5));", 20),
            ("fn(x) { x; }(5)", 5),
        ];
        for (input, expected) in cases {
            assert_integer(&eval_source(input), expected);
        }
    }

    #[test]
    fn test_closures() {
        let input = "
let newAdder = fn(x) { fn(y) { x + y } };
let addTwo = newAdder(2);
addTwo(2);";
        assert_integer(&eval_source(input), 4);
    }

    #[test]
    fn test_closure_keeps_definition_environment_alive() {
        // The adder's frame outlives the newAdder call that created it.
        let input = "
let counterFrom = fn(start) { fn() { start } };
let five = counterFrom(5);
let nine = counterFrom(9);
five() + nine();";
        assert_integer(&eval_source(input), 14);
    }

    #[test]
    fn test_short_argument_list_leaves_parameter_unbound() {
        let result = eval_source("let add = fn(x, y) { x + y }; add(1);");
        assert_error(&result, "identifier not found: y");
    }

    #[test]
    fn test_string_concatenation() {
        match eval_source("\"Hello\" + \" \" + \"World!\"") {
            Value::Str(s) => assert_eq!(s, "Hello World!"),
            other => panic!("expected string, got {:?}", other),
        }
    }

    #[test]
    fn test_array_literals_and_indexing() {
        match eval_source("[1, 2 * 2, 3 + 3]") {
            Value::Array(elements) => {
                assert_integer(&elements[0], 1);
                assert_integer(&elements[1], 4);
                assert_integer(&elements[2], 6);
            }
            other => panic!("expected array, got {:?}", other),
        }

        let cases = [
            ("[1, 2, 3][0]", 1),
            ("[1, 2, 3][1]", 2),
            ("[1, 2, 3][2]", 3),
            ("let i = 0; [1][i];", 1),
            ("[1, 2, 3][1 + 1];", 3),
            ("let myArray = [1, 2, 3]; myArray[2];", 3),
            ("[1, 2, 3][0] + [1, 2, 3][2]", 4),
        ];
        for (input, expected) in cases {
            assert_integer(&eval_source(input), expected);
        }

        assert!(matches!(eval_source("[1, 2, 3][3]"), Value::Null));
        assert!(matches!(eval_source("[1, 2, 3][-1]"), Value::Null));
    }

    #[test]
    fn test_hash_literals() {
        let input = "
let two = \"two\";
{
  \"one\": 10 - 9,
  two: 1 + 1,
  \"thr\" + \"ee\": 6 / 2,
  4: 4,
  true: 5,
  false: 6
}";
        match eval_source(input) {
            Value::Hash(pairs) => {
                assert_eq!(pairs.len(), 6);
                let expected = [
                    (Value::Str("one".to_string()), 1),
                    (Value::Str("two".to_string()), 2),
                    (Value::Str("three".to_string()), 3),
                    (Value::Integer(4), 4),
                    (Value::Bool(true), 5),
                    (Value::Bool(false), 6),
                ];
                for (key, value) in expected {
                    let pair = pairs
                        .get(&key.hash_key().unwrap())
                        .unwrap_or_else(|| panic!("missing key {:?}", key));
                    assert_integer(&pair.value, value);
                }
            }
            other => panic!("expected hash, got {:?}", other),
        }
    }

    #[test]
    fn test_hash_indexing() {
        let cases = [
            ("{\"foo\": 5}[\"foo\"]", 5),
            ("let key = \"foo\"; {\"foo\": 5}[key]", 5),
            ("{5: 5}[5]", 5),
            ("{true: 5}[true]", 5),
            ("{false: 5}[false]", 5),
        ];
        for (input, expected) in cases {
            assert_integer(&eval_source(input), expected);
        }
        assert!(matches!(eval_source("{\"foo\": 5}[\"bar\"]"), Value::Null));
        assert!(matches!(eval_source("{}[\"foo\"]"), Value::Null));
    }

    #[test]
    fn test_duplicate_hash_keys_keep_the_last_value() {
        assert_integer(&eval_source("{\"a\": 1, \"a\": 2}[\"a\"]"), 2);
    }

    #[test]
    fn test_builtin_len() {
        assert_integer(&eval_source("len(\"\")"), 0);
        assert_integer(&eval_source("len(\"hello world\")"), 11);
        assert_integer(&eval_source("len([1, 2, 3])"), 3);
        assert_error(
            &eval_source("len(1)"),
            "argument to `len` not supported, got INTEGER",
        );
        assert_error(
            &eval_source("len(\"one\", \"two\")"),
            "wrong number of arguments. got=2, want=1",
        );
    }

    #[test]
    fn test_builtins_resolve_before_the_environment() {
        // `len` comes from the fixed registry, so the binding is ignored.
        assert_integer(&eval_source("let len = fn(x) { 0 }; len(\"four\")"), 4);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let input = "let f = fn(x) { x * 2 }; f(3) + f(4)";
        let first = eval_source(input);
        let second = eval_source(input);
        match (first, second) {
            (Value::Integer(a), Value::Integer(b)) => assert_eq!(a, b),
            other => panic!("expected integers, got {:?}", other),
        }
    }
}
