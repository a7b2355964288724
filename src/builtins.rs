// ABOUTME: Fixed registry of host-provided builtin functions

use crate::value::{BuiltinFn, Value};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The builtin table. It is consulted before the environment when an
/// identifier is evaluated, so these names cannot be shadowed.
static BUILTINS: Lazy<HashMap<&'static str, BuiltinFn>> = Lazy::new(|| {
    HashMap::from([
        ("len", builtin_len as BuiltinFn),
        ("first", builtin_first),
        ("last", builtin_last),
        ("rest", builtin_rest),
        ("push", builtin_push),
        ("puts", builtin_puts),
    ])
});

pub fn lookup(name: &str) -> Option<BuiltinFn> {
    BUILTINS.get(name).copied()
}

fn wrong_arity(got: usize, want: usize) -> Value {
    Value::Error(format!("wrong number of arguments. got={}, want={}", got, want))
}

/// `len(x)`: byte length of a string, element count of an array.
fn builtin_len(args: &[Value]) -> Value {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Value::Str(s) => Value::Integer(s.len() as i64),
        Value::Array(elements) => Value::Integer(elements.len() as i64),
        other => Value::Error(format!(
            "argument to `len` not supported, got {}",
            other.type_name()
        )),
    }
}

/// `first(arr)`: the first element, or null for an empty array.
fn builtin_first(args: &[Value]) -> Value {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Value::Array(elements) => elements.first().cloned().unwrap_or(Value::Null),
        other => Value::Error(format!(
            "argument to `first` must be ARRAY, got {}",
            other.type_name()
        )),
    }
}

/// `last(arr)`: the last element, or null for an empty array.
fn builtin_last(args: &[Value]) -> Value {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Value::Array(elements) => elements.last().cloned().unwrap_or(Value::Null),
        other => Value::Error(format!(
            "argument to `last` must be ARRAY, got {}",
            other.type_name()
        )),
    }
}

/// `rest(arr)`: a new array without the first element; null when empty.
fn builtin_rest(args: &[Value]) -> Value {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Value::Array(elements) => {
            if elements.is_empty() {
                Value::Null
            } else {
                Value::Array(elements[1..].to_vec())
            }
        }
        other => Value::Error(format!(
            "argument to `rest` must be ARRAY, got {}",
            other.type_name()
        )),
    }
}

/// `push(arr, x)`: a new array with `x` appended; the original is untouched.
fn builtin_push(args: &[Value]) -> Value {
    if args.len() != 2 {
        return wrong_arity(args.len(), 2);
    }
    match &args[0] {
        Value::Array(elements) => {
            let mut pushed = elements.clone();
            pushed.push(args[1].clone());
            Value::Array(pushed)
        }
        other => Value::Error(format!(
            "argument to `push` must be ARRAY, got {}",
            other.type_name()
        )),
    }
}

/// `puts(...)`: prints each argument on its own line, returns null.
fn builtin_puts(args: &[Value]) -> Value {
    for arg in args {
        println!("{}", arg);
    }
    Value::Null
}
