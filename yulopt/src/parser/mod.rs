//! Recursive-descent parser for the Yul subset

use num_bigint::BigInt;
use num_traits::{One, Zero};

use crate::ast::{
    Assignment, Block, Case, Expression, ForLoop, FunctionCall, FunctionDefinition, Identifier,
    If, Literal, Span, Statement, Switch, VariableDeclaration,
};
use crate::error::{CompileError, Result};
use crate::lexer::Token;


/// Parse a token stream into a top-level block.
///
/// The source may be a braced block or a bare statement sequence; both forms
/// yield the same AST.
pub fn parse(source: &str, tokens: Vec<(Token, Span)>) -> Result<Block> {
    let end = source.len();
    let mut parser = Parser { tokens, pos: 0, end };
    let block = parser.parse_program()?;
    Ok(block)
}

struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn parse_program(&mut self) -> Result<Block> {
        let mut statements = Vec::new();
        while self.peek().is_some() {
            statements.push(self.parse_statement()?);
        }
        // A file consisting of exactly one block is that block.
        if statements.len() == 1 {
            if let Statement::Block(_) = &statements[0] {
                match statements.remove(0) {
                    Statement::Block(block) => return Ok(block),
                    _ => unreachable!(),
                }
            }
        }
        Ok(Block {
            statements,
            span: Span::new(0, self.end),
        })
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        match self.peek() {
            Some(Token::LBrace) => Ok(Statement::Block(self.parse_block()?)),
            Some(Token::Let) => self.parse_variable_declaration(),
            Some(Token::If) => self.parse_if(),
            Some(Token::Switch) => self.parse_switch(),
            Some(Token::For) => self.parse_for(),
            Some(Token::Function) => self.parse_function_definition(),
            Some(Token::Break) => {
                let span = self.advance().unwrap().1;
                Ok(Statement::Break(span))
            }
            Some(Token::Continue) => {
                let span = self.advance().unwrap().1;
                Ok(Statement::Continue(span))
            }
            Some(Token::Leave) => {
                let span = self.advance().unwrap().1;
                Ok(Statement::Leave(span))
            }
            Some(Token::Ident(_)) => {
                // `a := e`, `a, b := e`, or an expression statement `f(...)`.
                if matches!(self.peek_second(), Some(Token::Comma) | Some(Token::Assign)) {
                    self.parse_assignment()
                } else {
                    let expression = self.parse_expression()?;
                    Ok(Statement::Expression(expression))
                }
            }
            Some(token) => Err(CompileError::parser(
                format!("expected statement, found `{token}`"),
                self.current_span(),
            )),
            None => Err(CompileError::parser(
                "expected statement, found end of input",
                self.current_span(),
            )),
        }
    }

    fn parse_block(&mut self) -> Result<Block> {
        let open = self.expect(&Token::LBrace)?;
        let mut statements = Vec::new();
        while !matches!(self.peek(), Some(Token::RBrace)) {
            if self.peek().is_none() {
                return Err(CompileError::parser("unclosed block", open));
            }
            statements.push(self.parse_statement()?);
        }
        let close = self.expect(&Token::RBrace)?;
        Ok(Block {
            statements,
            span: open.merge(close),
        })
    }

    fn parse_variable_declaration(&mut self) -> Result<Statement> {
        let start = self.expect(&Token::Let)?;
        let variables = self.parse_identifier_list()?;
        let mut span = start.merge(variables.last().unwrap().span);
        let value = if self.eat(&Token::Assign).is_some() {
            let expression = self.parse_expression()?;
            span = span.merge(expression.span());
            Some(expression)
        } else {
            None
        };
        Ok(Statement::VariableDeclaration(VariableDeclaration {
            variables,
            value,
            span,
        }))
    }

    fn parse_assignment(&mut self) -> Result<Statement> {
        let targets = self.parse_identifier_list()?;
        self.expect(&Token::Assign)?;
        let value = self.parse_expression()?;
        let span = targets.first().unwrap().span.merge(value.span());
        Ok(Statement::Assignment(Assignment {
            targets,
            value,
            span,
        }))
    }

    fn parse_if(&mut self) -> Result<Statement> {
        let start = self.expect(&Token::If)?;
        let condition = self.parse_expression()?;
        let body = self.parse_block()?;
        let span = start.merge(body.span);
        Ok(Statement::If(If {
            condition,
            body,
            span,
        }))
    }

    fn parse_switch(&mut self) -> Result<Statement> {
        let start = self.expect(&Token::Switch)?;
        let expression = self.parse_expression()?;
        let mut cases = Vec::new();
        while let Some(case_start) = self.eat(&Token::Case) {
            let literal = self.parse_literal()?;
            let body = self.parse_block()?;
            cases.push(Case {
                span: case_start.merge(body.span),
                value: Some(literal),
                body,
            });
        }
        if let Some(default_start) = self.eat(&Token::Default) {
            let body = self.parse_block()?;
            cases.push(Case {
                span: default_start.merge(body.span),
                value: None,
                body,
            });
        }
        if cases.is_empty() {
            return Err(CompileError::parser(
                "switch statement without any cases",
                start,
            ));
        }
        let span = start.merge(cases.last().unwrap().span);
        Ok(Statement::Switch(Switch {
            expression,
            cases,
            span,
        }))
    }

    fn parse_for(&mut self) -> Result<Statement> {
        let start = self.expect(&Token::For)?;
        let pre = self.parse_block()?;
        let condition = self.parse_expression()?;
        let post = self.parse_block()?;
        let body = self.parse_block()?;
        let span = start.merge(body.span);
        Ok(Statement::ForLoop(ForLoop {
            pre,
            condition,
            post,
            body,
            span,
        }))
    }

    fn parse_function_definition(&mut self) -> Result<Statement> {
        let start = self.expect(&Token::Function)?;
        let name = self.expect_identifier()?;
        self.expect(&Token::LParen)?;
        let parameters = if matches!(self.peek(), Some(Token::RParen)) {
            Vec::new()
        } else {
            self.parse_identifier_list()?
        };
        self.expect(&Token::RParen)?;
        let returns = if self.eat(&Token::Arrow).is_some() {
            self.parse_identifier_list()?
        } else {
            Vec::new()
        };
        let body = self.parse_block()?;
        let span = start.merge(body.span);
        Ok(Statement::FunctionDefinition(FunctionDefinition {
            name,
            parameters,
            returns,
            body,
            span,
        }))
    }

    fn parse_expression(&mut self) -> Result<Expression> {
        match self.peek() {
            Some(Token::Ident(_)) => {
                let identifier = self.expect_identifier()?;
                if matches!(self.peek(), Some(Token::LParen)) {
                    self.parse_call(identifier)
                } else {
                    Ok(Expression::Identifier(identifier))
                }
            }
            _ => Ok(Expression::Literal(self.parse_literal()?)),
        }
    }

    fn parse_call(&mut self, function: Identifier) -> Result<Expression> {
        self.expect(&Token::LParen)?;
        let mut arguments = Vec::new();
        if !matches!(self.peek(), Some(Token::RParen)) {
            loop {
                arguments.push(self.parse_expression()?);
                if self.eat(&Token::Comma).is_none() {
                    break;
                }
            }
        }
        let close = self.expect(&Token::RParen)?;
        let span = function.span.merge(close);
        Ok(Expression::FunctionCall(FunctionCall {
            function,
            arguments,
            span,
        }))
    }

    fn parse_literal(&mut self) -> Result<Literal> {
        let (token, span) = match self.advance() {
            Some(pair) => pair,
            None => {
                return Err(CompileError::parser(
                    "expected literal, found end of input",
                    self.current_span(),
                ));
            }
        };
        let value = match token {
            Token::True => BigInt::one(),
            Token::False => BigInt::zero(),
            Token::DecimalNumber(text) => BigInt::parse_bytes(text.as_bytes(), 10)
                .ok_or_else(|| CompileError::parser("invalid decimal literal", span))?,
            Token::HexNumber(text) => BigInt::parse_bytes(text[2..].as_bytes(), 16)
                .ok_or_else(|| CompileError::parser("invalid hex literal", span))?,
            other => {
                return Err(CompileError::parser(
                    format!("expected literal, found `{other}`"),
                    span,
                ));
            }
        };
        if value.bits() > 256 {
            return Err(CompileError::parser(
                "literal does not fit in 256 bits",
                span,
            ));
        }
        Ok(Literal { value, span })
    }

    fn parse_identifier_list(&mut self) -> Result<Vec<Identifier>> {
        let mut identifiers = vec![self.expect_identifier()?];
        while matches!(self.peek(), Some(Token::Comma))
            && matches!(self.peek_second(), Some(Token::Ident(_)))
        {
            self.advance();
            identifiers.push(self.expect_identifier()?);
        }
        Ok(identifiers)
    }

    fn expect_identifier(&mut self) -> Result<Identifier> {
        match self.advance() {
            Some((Token::Ident(name), span)) => Ok(Identifier { name, span }),
            Some((other, span)) => Err(CompileError::parser(
                format!("expected identifier, found `{other}`"),
                span,
            )),
            None => Err(CompileError::parser(
                "expected identifier, found end of input",
                self.current_span(),
            )),
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<Span> {
        match self.advance() {
            Some((token, span)) if &token == expected => Ok(span),
            Some((other, span)) => Err(CompileError::parser(
                format!("expected `{expected}`, found `{other}`"),
                span,
            )),
            None => Err(CompileError::parser(
                format!("expected `{expected}`, found end of input"),
                self.current_span(),
            )),
        }
    }

    fn eat(&mut self, token: &Token) -> Option<Span> {
        if self.peek() == Some(token) {
            Some(self.advance().unwrap().1)
        } else {
            None
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn peek_second(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1).map(|(token, _)| token)
    }

    fn advance(&mut self) -> Option<(Token, Span)> {
        let pair = self.tokens.get(self.pos).cloned();
        if pair.is_some() {
            self.pos += 1;
        }
        pair
    }

    fn current_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map(|(_, span)| *span)
            .unwrap_or(Span::new(self.end, self.end))
    }
}
