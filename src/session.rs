// ABOUTME: Long-lived interpreter state driving the full
// lex/parse/expand/eval pipeline for successive source submissions

use crate::env::Environment;
use crate::error::ScriptError;
use crate::eval::eval_program;
use crate::lexer::Lexer;
use crate::macros::{define_macros, expand_macros};
use crate::parser::Parser;
use crate::value::Value;
use std::rc::Rc;

/// The helper library bundled with the interpreter, written in the
/// language itself on top of the array builtins.
pub const PRELUDE: &str = include_str!("prelude.tam");

/// One global value environment plus one macro environment, reused
/// across submissions so that bindings and macro definitions persist
/// between lines of a REPL session or chunks of a script.
pub struct Session {
    env: Rc<Environment>,
    macro_env: Rc<Environment>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session {
            env: Environment::new(),
            macro_env: Environment::new(),
        }
    }

    /// Runs one source submission: parse, strip and register macro
    /// definitions, expand macro call sites, evaluate. Parser
    /// diagnostics abort before evaluation; runtime errors come back
    /// in-band as `Value::Error`.
    pub fn run(&mut self, source: &str) -> Result<Value, ScriptError> {
        let mut parser = Parser::new(Lexer::new(source));
        let mut program = parser.parse_program();
        if !parser.errors().is_empty() {
            return Err(ScriptError::Parse(parser.errors().to_vec()));
        }

        define_macros(&mut program, &self.macro_env);
        let program = expand_macros(program, &self.macro_env);
        log::debug!("expanded program: {}", program);

        Ok(eval_program(&program, &self.env))
    }

    /// Loads the bundled helper library into this session.
    pub fn load_prelude(&mut self) -> Result<(), ScriptError> {
        self.run(PRELUDE).map(|_| ())
    }
}
