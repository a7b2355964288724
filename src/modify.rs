// ABOUTME: Depth-first post-order AST rewriting, the sole mutation
// mechanism behind macro expansion and unquote substitution

use crate::ast::{
    ArrayLiteral, BlockStatement, CallExpression, Expression, ExpressionStatement, FunctionLiteral,
    HashLiteral, IfExpression, IndexExpression, InfixExpression, LetStatement, MacroLiteral,
    PrefixExpression, Program, ReturnStatement, Statement,
};

/// Rewrites every expression in the program bottom-up: children are
/// replaced first, then the rewriter sees the rebuilt node itself.
pub fn modify_program<F>(program: Program, f: &mut F) -> Program
where
    F: FnMut(Expression) -> Expression,
{
    Program {
        statements: program
            .statements
            .into_iter()
            .map(|statement| modify_statement(statement, f))
            .collect(),
    }
}

pub fn modify_statement<F>(statement: Statement, f: &mut F) -> Statement
where
    F: FnMut(Expression) -> Expression,
{
    match statement {
        Statement::Let(s) => {
            let LetStatement { token, name, value } = s;
            Statement::Let(LetStatement {
                token,
                name,
                value: modify_expression(value, f),
            })
        }
        Statement::Return(s) => {
            let ReturnStatement { token, value } = s;
            Statement::Return(ReturnStatement {
                token,
                value: modify_expression(value, f),
            })
        }
        Statement::Expression(s) => {
            let ExpressionStatement { token, expression } = s;
            Statement::Expression(ExpressionStatement {
                token,
                expression: modify_expression(expression, f),
            })
        }
    }
}

pub fn modify_block<F>(block: BlockStatement, f: &mut F) -> BlockStatement
where
    F: FnMut(Expression) -> Expression,
{
    BlockStatement {
        token: block.token,
        statements: block
            .statements
            .into_iter()
            .map(|statement| modify_statement(statement, f))
            .collect(),
    }
}

pub fn modify_expression<F>(expression: Expression, f: &mut F) -> Expression
where
    F: FnMut(Expression) -> Expression,
{
    let rebuilt = match expression {
        Expression::Prefix(e) => {
            let PrefixExpression {
                token,
                operator,
                right,
            } = e;
            Expression::Prefix(PrefixExpression {
                token,
                operator,
                right: Box::new(modify_expression(*right, f)),
            })
        }
        Expression::Infix(e) => {
            let InfixExpression {
                token,
                operator,
                left,
                right,
            } = e;
            Expression::Infix(InfixExpression {
                token,
                operator,
                left: Box::new(modify_expression(*left, f)),
                right: Box::new(modify_expression(*right, f)),
            })
        }
        Expression::If(e) => Expression::If(IfExpression {
            token: e.token,
            condition: Box::new(modify_expression(*e.condition, f)),
            consequence: modify_block(e.consequence, f),
            alternative: e.alternative.map(|block| modify_block(block, f)),
        }),
        Expression::Function(e) => {
            let FunctionLiteral {
                token,
                parameters,
                body,
            } = e;
            Expression::Function(FunctionLiteral {
                token,
                parameters,
                body: modify_block(body, f),
            })
        }
        Expression::Macro(e) => {
            let MacroLiteral {
                token,
                parameters,
                body,
            } = e;
            Expression::Macro(MacroLiteral {
                token,
                parameters,
                body: modify_block(body, f),
            })
        }
        Expression::Call(e) => Expression::Call(CallExpression {
            token: e.token,
            function: Box::new(modify_expression(*e.function, f)),
            arguments: e
                .arguments
                .into_iter()
                .map(|argument| modify_expression(argument, f))
                .collect(),
        }),
        Expression::Array(e) => Expression::Array(ArrayLiteral {
            token: e.token,
            elements: e
                .elements
                .into_iter()
                .map(|element| modify_expression(element, f))
                .collect(),
        }),
        Expression::Index(e) => Expression::Index(IndexExpression {
            token: e.token,
            left: Box::new(modify_expression(*e.left, f)),
            index: Box::new(modify_expression(*e.index, f)),
        }),
        // Both keys and values are rewritten; the pair list is rebuilt so
        // evaluation re-hashes under the new keys.
        Expression::Hash(e) => Expression::Hash(HashLiteral {
            token: e.token,
            pairs: e
                .pairs
                .into_iter()
                .map(|(key, value)| (modify_expression(key, f), modify_expression(value, f)))
                .collect(),
        }),
        leaf => leaf,
    };
    f(rebuilt)
}
