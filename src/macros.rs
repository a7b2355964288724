// ABOUTME: Compile-time macro facility: definition capture and call-site
// expansion before normal evaluation

use crate::ast::{Expression, LetStatement, Program, Statement};
use crate::env::Environment;
use crate::eval::eval_block;
use crate::modify::modify_program;
use crate::value::{MacroValue, Value};
use std::rc::Rc;

/// Scans the program's top level for `let NAME = macro(...) {...}`
/// statements, binds each as a `Macro` value in `macro_env`, and removes
/// the definition from the program. Macro literals anywhere else are
/// left alone.
pub fn define_macros(program: &mut Program, macro_env: &Rc<Environment>) {
    let statements = std::mem::take(&mut program.statements);
    for statement in statements {
        match statement {
            Statement::Let(LetStatement {
                name,
                value: Expression::Macro(literal),
                ..
            }) => {
                macro_env.set(
                    name.value,
                    Value::Macro(Rc::new(MacroValue {
                        parameters: literal.parameters,
                        body: literal.body,
                        env: macro_env.clone(),
                    })),
                );
            }
            other => program.statements.push(other),
        }
    }
}

/// Rewrites the program bottom-up, replacing every call to a defined
/// macro with the syntax its body evaluates to. Arguments reach the body
/// unevaluated, wrapped as `Quote` values.
///
/// Panics when a macro body evaluates to anything but a `Quote`; that is
/// a broken macro definition, not a recoverable user error.
pub fn expand_macros(program: Program, macro_env: &Rc<Environment>) -> Program {
    modify_program(program, &mut |expression| {
        let Expression::Call(call) = &expression else {
            return expression;
        };
        let Expression::Ident(ident) = call.function.as_ref() else {
            return expression;
        };
        let Some(Value::Macro(macro_value)) = macro_env.get(&ident.value) else {
            return expression;
        };

        let expansion_env = Environment::new_enclosed(macro_value.env.clone());
        for (parameter, argument) in macro_value.parameters.iter().zip(call.arguments.iter()) {
            expansion_env.set(parameter.value.clone(), Value::Quote(argument.clone()));
        }

        match eval_block(&macro_value.body, &expansion_env) {
            Value::Quote(node) => node,
            other => panic!(
                "macro expansion must produce quoted syntax, got {}",
                other.type_name()
            ),
        }
    })
}
