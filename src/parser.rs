// ABOUTME: Pratt parser turning the token stream into a Program while
// accumulating human-readable diagnostics

use crate::ast::{
    ArrayLiteral, BlockStatement, BooleanLiteral, CallExpression, Expression, ExpressionStatement,
    FunctionLiteral, HashLiteral, Identifier, IfExpression, IndexExpression, InfixExpression,
    IntegerLiteral, LetStatement, MacroLiteral, PrefixExpression, Program, ReturnStatement,
    Statement, StringLiteral,
};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

/// Binding strength, lowest to highest. The expression loop consumes an
/// infix operator only while the next token binds strictly tighter than
/// the current level, which makes every operator left-associative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

fn token_precedence(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
        TokenKind::Lt | TokenKind::Gt => Precedence::LessGreater,
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Slash | TokenKind::Asterisk => Precedence::Product,
        TokenKind::LParen => Precedence::Call,
        TokenKind::LBracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    cur_token: Token,
    peek_token: Token,
    errors: Vec<String>,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>) -> Self {
        let cur_token = lexer.next_token();
        let peek_token = lexer.next_token();
        Parser {
            lexer,
            cur_token,
            peek_token,
            errors: Vec::new(),
        }
    }

    /// Parses statements until end of input. Never panics: a statement
    /// that fails to parse records a diagnostic and the loop resumes at
    /// the next token.
    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();
        while !self.cur_token_is(TokenKind::Eof) {
            if let Some(statement) = self.parse_statement() {
                program.statements.push(statement);
            }
            self.next_token();
        }
        program
    }

    /// Diagnostics accumulated so far, in source order.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    fn next_token(&mut self) {
        self.cur_token = std::mem::replace(&mut self.peek_token, self.lexer.next_token());
    }

    fn cur_token_is(&self, kind: TokenKind) -> bool {
        self.cur_token.kind == kind
    }

    fn peek_token_is(&self, kind: TokenKind) -> bool {
        self.peek_token.kind == kind
    }

    /// Advances past the peek token when it matches, otherwise records
    /// the mismatch diagnostic and stays put.
    fn expect_peek(&mut self, kind: TokenKind) -> bool {
        if self.peek_token_is(kind) {
            self.next_token();
            true
        } else {
            self.peek_error(kind);
            false
        }
    }

    fn peek_error(&mut self, expected: TokenKind) {
        self.errors.push(format!(
            "expected next token to be {}, got {} instead",
            expected, self.peek_token.kind
        ));
    }

    fn peek_precedence(&self) -> Precedence {
        token_precedence(self.peek_token.kind)
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.cur_token.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        let token = self.cur_token.clone();
        if !self.expect_peek(TokenKind::Ident) {
            return None;
        }
        let name = Identifier {
            token: self.cur_token.clone(),
            value: self.cur_token.literal.clone(),
        };
        if !self.expect_peek(TokenKind::Assign) {
            return None;
        }
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(Statement::Let(LetStatement { token, name, value }))
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        let token = self.cur_token.clone();
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(Statement::Return(ReturnStatement { token, value }))
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let token = self.cur_token.clone();
        let expression = self.parse_expression(Precedence::Lowest)?;
        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(Statement::Expression(ExpressionStatement {
            token,
            expression,
        }))
    }

    fn parse_block_statement(&mut self) -> BlockStatement {
        let token = self.cur_token.clone();
        let mut statements = Vec::new();
        self.next_token();
        while !self.cur_token_is(TokenKind::RBrace) && !self.cur_token_is(TokenKind::Eof) {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.next_token();
        }
        BlockStatement { token, statements }
    }

    // =========================================================================
    // Expressions (Pratt core)
    // =========================================================================

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let mut left = self.parse_prefix()?;

        while !self.peek_token_is(TokenKind::Semicolon) && precedence < self.peek_precedence() {
            left = match self.peek_token.kind {
                TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Slash
                | TokenKind::Asterisk
                | TokenKind::Eq
                | TokenKind::NotEq
                | TokenKind::Lt
                | TokenKind::Gt => {
                    self.next_token();
                    self.parse_infix_expression(left)?
                }
                TokenKind::LParen => {
                    self.next_token();
                    self.parse_call_expression(left)?
                }
                TokenKind::LBracket => {
                    self.next_token();
                    self.parse_index_expression(left)?
                }
                _ => return Some(left),
            };
        }

        Some(left)
    }

    /// Prefix dispatch on the current token kind.
    fn parse_prefix(&mut self) -> Option<Expression> {
        match self.cur_token.kind {
            TokenKind::Ident => Some(Expression::Ident(Identifier {
                token: self.cur_token.clone(),
                value: self.cur_token.literal.clone(),
            })),
            TokenKind::Num => self.parse_integer_literal(),
            TokenKind::Str => Some(Expression::Str(StringLiteral {
                token: self.cur_token.clone(),
                value: self.cur_token.literal.clone(),
            })),
            TokenKind::Bang | TokenKind::Minus => self.parse_prefix_expression(),
            TokenKind::True | TokenKind::False => Some(Expression::Bool(BooleanLiteral {
                token: self.cur_token.clone(),
                value: self.cur_token_is(TokenKind::True),
            })),
            TokenKind::LParen => self.parse_grouped_expression(),
            TokenKind::If => self.parse_if_expression(),
            TokenKind::Function => self.parse_function_literal(),
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::LBrace => self.parse_hash_literal(),
            TokenKind::Macro => self.parse_macro_literal(),
            kind => {
                self.errors
                    .push(format!("no prefix parse function for {} found", kind));
                None
            }
        }
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();
        match token.literal.parse::<i64>() {
            Ok(value) => Some(Expression::Int(IntegerLiteral { token, value })),
            Err(_) => {
                self.errors
                    .push(format!("could not parse {:?} as integer", token.literal));
                None
            }
        }
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();
        let operator = token.literal.clone();
        self.next_token();
        let right = Box::new(self.parse_expression(Precedence::Prefix)?);
        Some(Expression::Prefix(PrefixExpression {
            token,
            operator,
            right,
        }))
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.cur_token.clone();
        let operator = token.literal.clone();
        let precedence = token_precedence(token.kind);
        self.next_token();
        let right = Box::new(self.parse_expression(precedence)?);
        Some(Expression::Infix(InfixExpression {
            token,
            operator,
            left: Box::new(left),
            right,
        }))
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let expression = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }
        Some(expression)
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();
        if !self.expect_peek(TokenKind::LParen) {
            return None;
        }
        self.next_token();
        let condition = Box::new(self.parse_expression(Precedence::Lowest)?);
        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }
        if !self.expect_peek(TokenKind::LBrace) {
            return None;
        }
        let consequence = self.parse_block_statement();

        let alternative = if self.peek_token_is(TokenKind::Else) {
            self.next_token();
            if !self.expect_peek(TokenKind::LBrace) {
                return None;
            }
            Some(self.parse_block_statement())
        } else {
            None
        };

        Some(Expression::If(IfExpression {
            token,
            condition,
            consequence,
            alternative,
        }))
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();
        if !self.expect_peek(TokenKind::LParen) {
            return None;
        }
        let parameters = self.parse_function_parameters()?;
        if !self.expect_peek(TokenKind::LBrace) {
            return None;
        }
        let body = self.parse_block_statement();
        Some(Expression::Function(FunctionLiteral {
            token,
            parameters,
            body,
        }))
    }

    fn parse_macro_literal(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();
        if !self.expect_peek(TokenKind::LParen) {
            return None;
        }
        let parameters = self.parse_function_parameters()?;
        if !self.expect_peek(TokenKind::LBrace) {
            return None;
        }
        let body = self.parse_block_statement();
        Some(Expression::Macro(MacroLiteral {
            token,
            parameters,
            body,
        }))
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Identifier>> {
        let mut parameters = Vec::new();
        if self.peek_token_is(TokenKind::RParen) {
            self.next_token();
            return Some(parameters);
        }

        self.next_token();
        parameters.push(Identifier {
            token: self.cur_token.clone(),
            value: self.cur_token.literal.clone(),
        });

        while self.peek_token_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            parameters.push(Identifier {
                token: self.cur_token.clone(),
                value: self.cur_token.literal.clone(),
            });
        }

        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }
        Some(parameters)
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let token = self.cur_token.clone();
        let arguments = self.parse_expression_list(TokenKind::RParen)?;
        Some(Expression::Call(CallExpression {
            token,
            function: Box::new(function),
            arguments,
        }))
    }

    fn parse_array_literal(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();
        let elements = self.parse_expression_list(TokenKind::RBracket)?;
        Some(Expression::Array(ArrayLiteral { token, elements }))
    }

    /// Zero or more comma-separated expressions terminated by `end`;
    /// shared by array literals and call argument lists.
    fn parse_expression_list(&mut self, end: TokenKind) -> Option<Vec<Expression>> {
        let mut list = Vec::new();
        if self.peek_token_is(end) {
            self.next_token();
            return Some(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_token_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.expect_peek(end) {
            return None;
        }
        Some(list)
    }

    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.cur_token.clone();
        self.next_token();
        let index = Box::new(self.parse_expression(Precedence::Lowest)?);
        if !self.expect_peek(TokenKind::RBracket) {
            return None;
        }
        Some(Expression::Index(IndexExpression {
            token,
            left: Box::new(left),
            index,
        }))
    }

    fn parse_hash_literal(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();
        let mut pairs = Vec::new();

        while !self.peek_token_is(TokenKind::RBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;
            if !self.expect_peek(TokenKind::Colon) {
                return None;
            }
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            if !self.peek_token_is(TokenKind::RBrace) && !self.expect_peek(TokenKind::Comma) {
                return None;
            }
        }

        if !self.expect_peek(TokenKind::RBrace) {
            return None;
        }
        Some(Expression::Hash(HashLiteral { token, pairs }))
    }
}
