// ABOUTME: Runtime value types, hash keys, and the user-visible Inspect rendering

use crate::ast::{BlockStatement, Expression, Identifier};
use crate::env::Environment;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Host-provided callable. Errors come back in-band as `Value::Error`.
pub type BuiltinFn = fn(&[Value]) -> Value;

/// A user-defined function: parameters, body, and the environment the
/// literal was evaluated in. The `Rc` on the environment is what makes
/// closures outlive the call that created them.
#[derive(Debug, Clone)]
pub struct Function {
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
    pub env: Rc<Environment>,
}

/// A macro: same shape as a function, but its body runs on quoted
/// syntax during expansion rather than on values.
#[derive(Debug, Clone)]
pub struct MacroValue {
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
    pub env: Rc<Environment>,
}

/// One hash entry. The original key value is retained alongside the
/// mapped value so printing can show the key as written.
#[derive(Debug, Clone)]
pub struct HashPair {
    pub key: Value,
    pub value: Value,
}

#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Str(String),
    Bool(bool),
    Null,
    /// Wraps the value of a `return` so it can unwind through blocks.
    Return(Box<Value>),
    /// An in-band runtime error; evaluation short-circuits on these.
    Error(String),
    Function(Rc<Function>),
    Builtin(BuiltinFn),
    Array(Vec<Value>),
    Hash(HashMap<HashKey, HashPair>),
    /// Unevaluated syntax, produced only by the macro facility.
    Quote(Expression),
    Macro(Rc<MacroValue>),
}

impl Value {
    /// The kind name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::Str(_) => "STRING",
            Value::Bool(_) => "BOOLEAN",
            Value::Null => "NULL",
            Value::Return(_) => "RETURN_VALUE",
            Value::Error(_) => "ERROR",
            Value::Function(_) => "FUNCTION",
            Value::Builtin(_) => "BUILTIN",
            Value::Array(_) => "ARRAY",
            Value::Hash(_) => "HASH",
            Value::Quote(_) => "QUOTE",
            Value::Macro(_) => "MACRO",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Hash key derivation. Only integers, booleans and strings have
    /// one; everything else is unusable as a hash key.
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Value::Integer(n) => Some(HashKey {
                kind: "INTEGER",
                value: *n as u64,
            }),
            Value::Bool(b) => Some(HashKey {
                kind: "BOOLEAN",
                value: u64::from(*b),
            }),
            Value::Str(s) => Some(HashKey {
                kind: "STRING",
                value: fnv1a(s.as_bytes()),
            }),
            _ => None,
        }
    }
}

/// A hashable key: the value kind plus a 64-bit digest. Carrying the
/// kind keeps equal digests of different types from colliding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    pub kind: &'static str,
    pub value: u64,
}

/// 64-bit FNV-1a over the raw bytes.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes.iter().fold(OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(PRIME)
    })
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Null => f.write_str("null"),
            Value::Return(inner) => write!(f, "{}", inner),
            Value::Error(message) => write!(f, "ERROR: {}", message),
            Value::Function(function) => {
                let params: Vec<String> = function
                    .parameters
                    .iter()
                    .map(|p| p.to_string())
                    .collect();
                write!(f, "fn({}) {{\n{}\n}}", params.join(", "), function.body)
            }
            Value::Builtin(_) => f.write_str("builtin function"),
            Value::Array(elements) => {
                let rendered: Vec<String> = elements.iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
            Value::Hash(pairs) => {
                // Iteration order is unspecified and observably so.
                let rendered: Vec<String> = pairs
                    .values()
                    .map(|pair| format!("{}: {}", pair.key, pair.value))
                    .collect();
                write!(f, "{{{}}}", rendered.join(", "))
            }
            Value::Quote(node) => write!(f, "QUOTE({})", node),
            Value::Macro(m) => {
                let params: Vec<String> = m.parameters.iter().map(|p| p.to_string()).collect();
                write!(f, "macro({}) {{\n{}\n}}", params.join(", "), m.body)
            }
        }
    }
}
