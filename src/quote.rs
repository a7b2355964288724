// ABOUTME: The quote/unquote reflective facility lifting expressions to
// and from first-class syntax values

use crate::ast::{BooleanLiteral, Expression, IntegerLiteral};
use crate::env::Environment;
use crate::eval::eval_expression;
use crate::modify::modify_expression;
use crate::token::{Token, TokenKind};
use crate::value::Value;
use std::rc::Rc;

/// Suspends evaluation of `expression`, substituting any `unquote(...)`
/// call sites inside it with the syntax form of their evaluated
/// argument, and wraps the result as a `Quote` value.
pub fn quote(expression: Expression, env: &Rc<Environment>) -> Value {
    Value::Quote(eval_unquote_calls(expression, env))
}

fn eval_unquote_calls(expression: Expression, env: &Rc<Environment>) -> Expression {
    modify_expression(expression, &mut |node| {
        let call = match node {
            Expression::Call(call) => call,
            other => return other,
        };
        let is_unquote = matches!(
            call.function.as_ref(),
            Expression::Ident(ident) if ident.value == "unquote"
        );
        if !is_unquote || call.arguments.len() != 1 {
            return Expression::Call(call);
        }

        let unquoted = eval_expression(&call.arguments[0], env);
        match expression_for_value(unquoted) {
            Some(syntax) => syntax,
            // No syntactic form for this value; the call site stays as
            // written instead of becoming an unrepresentable node.
            None => Expression::Call(call),
        }
    })
}

/// Converts a runtime value back into syntax. Only integers, booleans
/// and already-quoted nodes have a defined conversion.
fn expression_for_value(value: Value) -> Option<Expression> {
    match value {
        Value::Integer(n) => Some(Expression::Int(IntegerLiteral {
            token: Token::new(TokenKind::Num, n.to_string()),
            value: n,
        })),
        Value::Bool(b) => {
            let token = if b {
                Token::new(TokenKind::True, "true")
            } else {
                Token::new(TokenKind::False, "false")
            };
            Some(Expression::Bool(BooleanLiteral { token, value: b }))
        }
        Value::Quote(node) => Some(node),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::eval_program;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn eval_source(input: &str) -> Value {
        let mut parser = Parser::new(Lexer::new(input));
        let program = parser.parse_program();
        assert_eq!(parser.errors(), &[] as &[String]);
        eval_program(&program, &Environment::new())
    }

    fn assert_quote(value: Value, expected: &str) {
        match value {
            Value::Quote(node) => assert_eq!(node.to_string(), expected),
            other => panic!("expected quote, got {:?}", other),
        }
    }

    #[test]
    fn test_quote_suspends_evaluation() {
        assert_quote(eval_source("quote(5)"), "5");
        assert_quote(eval_source("quote(5 + 8)"), "(5 + 8)");
        assert_quote(eval_source("quote(foobar)"), "foobar");
        assert_quote(eval_source("quote(foobar + barfoo)"), "(foobar + barfoo)");
    }

    #[test]
    fn test_quote_inspect() {
        assert_eq!(eval_source("quote(5 + 8)").to_string(), "QUOTE((5 + 8))");
    }

    #[test]
    fn test_unquote_evaluates_inside_quote() {
        assert_quote(eval_source("quote(unquote(4))"), "4");
        assert_quote(eval_source("quote(unquote(4 + 4))"), "8");
        assert_quote(eval_source("quote(8 + unquote(4 + 4))"), "(8 + 8)");
        assert_quote(eval_source("quote(unquote(4 + 4) + 8)"), "(8 + 8)");
    }

    #[test]
    fn test_unquote_sees_the_enclosing_environment() {
        assert_quote(
            eval_source("let foobar = 8; quote(unquote(foobar))"),
            "8",
        );
        assert_quote(
            eval_source("let foobar = 8; quote(foobar + unquote(foobar))"),
            "(foobar + 8)",
        );
    }

    #[test]
    fn test_unquote_converts_booleans() {
        assert_quote(eval_source("quote(unquote(true))"), "true");
        assert_quote(eval_source("quote(unquote(true == false))"), "false");
    }

    #[test]
    fn test_unquote_of_quote_splices_the_node() {
        assert_quote(eval_source("quote(unquote(quote(4 + 4)))"), "(4 + 4)");
        let input = "
let quotedInfixExpression = quote(4 + 4);
quote(unquote(4 + 4) + unquote(quotedInfixExpression))";
        assert_quote(eval_source(input), "(8 + (4 + 4))");
    }

    #[test]
    fn test_unquote_of_non_syntax_value_is_left_in_place() {
        assert_quote(
            eval_source("quote(unquote(\"hello\"))"),
            "unquote(hello)",
        );
    }

    #[test]
    fn test_quote_arity_is_checked() {
        match eval_source("quote(1, 2)") {
            Value::Error(message) => {
                assert_eq!(message, "wrong number of arguments. got=2, want=1");
            }
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[test]
    fn test_bare_quote_identifier_is_an_ordinary_lookup() {
        match eval_source("quote") {
            Value::Error(message) => assert_eq!(message, "identifier not found: quote"),
            other => panic!("expected error, got {:?}", other),
        }
    }
}
