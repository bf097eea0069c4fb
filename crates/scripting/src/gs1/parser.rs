//! GS1 Parser
//!
//! Error-recovering recursive descent parser. A malformed statement is
//! reported as a [`Diagnostic`] and skipped up to the next `;` or `}`, so a
//! partially broken script still produces a tree.
//!
//! Built-ins whose prototype favors text arguments take those arguments as
//! raw source text: `setimg door.png;` and `setimg(door.png);` both yield the
//! string `"door.png"`.

use crate::error::{Diagnostic, Result, ScriptError};
use crate::gs1::ast::*;
use crate::gs1::lexer::{Lexer, Token};
use crate::tables::favors_string;

/// Parse output: the tree plus everything that was skipped
#[derive(Debug, Clone, Default)]
pub struct Parsed {
    pub script: Script,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse a complete GS1 script
pub fn parse(source: &str) -> Parsed {
    Parser::new(source).parse()
}

/// Parse a single expression, e.g. one embedded in a property string
pub fn parse_expression(source: &str) -> Result<Expr> {
    let mut parser = Parser::new(source);
    if let Some(diagnostic) = parser.diagnostics.first() {
        return Err(ScriptError::ParseError {
            line: diagnostic.line,
            message: diagnostic.message.clone(),
        });
    }

    let expr = parser.expression()?;
    if !parser.check(&Token::EOF) {
        return Err(parser.error(format!("Unexpected {:?} after expression", parser.current)));
    }
    Ok(expr)
}

/// GS1 parser
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    current_start: usize,
    current_line: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    /// Create a new parser
    pub fn new(input: &'a str) -> Self {
        let mut parser = Self {
            lexer: Lexer::new(input),
            current: Token::EOF,
            current_start: 0,
            current_line: 1,
            diagnostics: Vec::new(),
        };
        parser.advance();
        parser
    }

    /// Parse a script
    pub fn parse(mut self) -> Parsed {
        let mut statements = Vec::new();

        while !self.check(&Token::EOF) {
            if self.check(&Token::RBrace) {
                let err = self.error("Unexpected '}'");
                self.report(err);
                self.advance();
                continue;
            }

            match self.statement() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    self.report(err);
                    self.synchronize();
                }
            }
        }

        Parsed {
            script: Script::new(statements),
            diagnostics: self.diagnostics,
        }
    }

    /// Parse a statement
    fn statement(&mut self) -> Result<Stmt> {
        match &self.current {
            Token::If => self.if_statement(),
            Token::While => self.while_statement(),
            Token::For => self.for_statement(),
            Token::Function => self.function_declaration(),
            Token::Return => self.return_statement(),
            Token::LBrace => self.block_statement(),
            Token::Break => {
                self.advance();
                self.end_statement()?;
                Ok(Stmt::Break)
            }
            Token::Continue => {
                self.advance();
                self.end_statement()?;
                Ok(Stmt::Continue)
            }
            Token::Semicolon => {
                self.advance();
                Ok(Stmt::Empty)
            }
            Token::Identifier(name) if self.starts_command() => {
                let name = name.clone();
                self.command_statement(name)
            }
            _ => self.expression_statement(),
        }
    }

    /// Whether the identifier under the cursor begins a command without
    /// parentheses (`message hello;`, `hide;`)
    fn starts_command(&self) -> bool {
        matches!(
            self.peek(),
            Token::Identifier(_)
                | Token::Number(_)
                | Token::String(_)
                | Token::Hash
                | Token::Semicolon
        )
    }

    /// Parse `name arg, arg;`
    fn command_statement(&mut self, name: String) -> Result<Stmt> {
        self.advance();

        let mut args = Vec::new();
        if !self.check(&Token::Semicolon) {
            loop {
                args.push(self.argument(&name, args.len())?);
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }

        self.end_statement()?;
        Ok(Stmt::Command { name, args })
    }

    /// Parse an if statement
    fn if_statement(&mut self) -> Result<Stmt> {
        self.consume(&Token::If, "Expected 'if'")?;
        self.consume(&Token::LParen, "Expected '(' after 'if'")?;
        let condition = self.expression()?;
        self.consume(&Token::RParen, "Expected ')' after condition")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_token(&Token::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If { condition, then_branch, else_branch })
    }

    /// Parse a while statement
    fn while_statement(&mut self) -> Result<Stmt> {
        self.consume(&Token::While, "Expected 'while'")?;
        self.consume(&Token::LParen, "Expected '(' after 'while'")?;
        let condition = self.expression()?;
        self.consume(&Token::RParen, "Expected ')' after condition")?;
        let body = Box::new(self.statement()?);

        Ok(Stmt::While { condition, body })
    }

    /// Parse a for statement
    fn for_statement(&mut self) -> Result<Stmt> {
        self.consume(&Token::For, "Expected 'for'")?;
        self.consume(&Token::LParen, "Expected '(' after 'for'")?;

        let init = self.optional_expression(&Token::Semicolon)?;
        self.consume(&Token::Semicolon, "Expected ';' after for initializer")?;
        let condition = self.optional_expression(&Token::Semicolon)?;
        self.consume(&Token::Semicolon, "Expected ';' after for condition")?;
        let step = self.optional_expression(&Token::RParen)?;
        self.consume(&Token::RParen, "Expected ')' after for clauses")?;

        let body = Box::new(self.statement()?);
        Ok(Stmt::For { init, condition, step, body })
    }

    fn optional_expression(&mut self, terminator: &Token) -> Result<Option<Expr>> {
        if self.check(terminator) {
            Ok(None)
        } else {
            self.expression().map(Some)
        }
    }

    /// Parse a function declaration
    fn function_declaration(&mut self) -> Result<Stmt> {
        self.consume(&Token::Function, "Expected 'function'")?;

        let name = match &self.current {
            Token::Identifier(name) => name.clone(),
            _ => return Err(self.error("Expected function name")),
        };
        self.advance();

        if self.match_token(&Token::LParen) {
            self.consume(&Token::RParen, "Expected ')' after function name")?;
        }

        if !self.check(&Token::LBrace) {
            return Err(self.error("Expected '{' before function body"));
        }
        let body = Box::new(self.block_statement()?);

        Ok(Stmt::Function { name, body })
    }

    /// Parse a return statement
    fn return_statement(&mut self) -> Result<Stmt> {
        self.consume(&Token::Return, "Expected 'return'")?;

        let value = if self.check(&Token::Semicolon) || self.check(&Token::RBrace) {
            None
        } else {
            Some(self.expression()?)
        };

        self.end_statement()?;
        Ok(Stmt::Return(value))
    }

    /// Parse a block, recovering from errors inside it
    fn block_statement(&mut self) -> Result<Stmt> {
        self.consume(&Token::LBrace, "Expected '{'")?;

        let mut statements = Vec::new();
        while !self.check(&Token::RBrace) && !self.check(&Token::EOF) {
            match self.statement() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    self.report(err);
                    self.synchronize();
                }
            }
        }

        if self.check(&Token::EOF) {
            return Err(ScriptError::Unterminated { what: "block", line: self.current_line });
        }
        self.advance();

        Ok(Stmt::Block(statements))
    }

    /// Parse an expression statement; a bare call becomes a command
    fn expression_statement(&mut self) -> Result<Stmt> {
        let expr = self.expression()?;
        self.end_statement()?;

        Ok(match expr {
            Expr::Call { name, args } => Stmt::Command { name, args },
            other => Stmt::Expr(other),
        })
    }

    /// Accept `;`, or nothing before a closing brace or end of input
    fn end_statement(&mut self) -> Result<()> {
        if self.match_token(&Token::Semicolon) || self.check(&Token::RBrace) || self.check(&Token::EOF) {
            Ok(())
        } else {
            Err(self.error(format!("Expected ';', found {:?}", self.current)))
        }
    }

    /// Parse an expression
    pub fn expression(&mut self) -> Result<Expr> {
        self.assignment()
    }

    /// Parse assignment (right associative)
    fn assignment(&mut self) -> Result<Expr> {
        let target = self.ternary()?;

        let op = match self.current {
            Token::Assign => BinaryOp::Assign,
            Token::PlusEqual => BinaryOp::AddAssign,
            Token::MinusEqual => BinaryOp::SubAssign,
            Token::StarEqual => BinaryOp::MulAssign,
            Token::SlashEqual => BinaryOp::DivAssign,
            _ => return Ok(target),
        };
        self.advance();

        let value = self.assignment()?;
        Ok(binary(target, op, value))
    }

    /// Parse `c ? a : b`
    fn ternary(&mut self) -> Result<Expr> {
        let condition = self.or()?;

        if !self.match_token(&Token::Question) {
            return Ok(condition);
        }

        let then_expr = self.assignment()?;
        self.consume(&Token::Colon, "Expected ':' in conditional expression")?;
        let else_expr = self.ternary()?;

        Ok(Expr::Ternary {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        })
    }

    /// Parse logical OR
    fn or(&mut self) -> Result<Expr> {
        let mut expr = self.and()?;

        while self.match_token(&Token::Or) {
            let right = self.and()?;
            expr = binary(expr, BinaryOp::Or, right);
        }

        Ok(expr)
    }

    /// Parse logical AND
    fn and(&mut self) -> Result<Expr> {
        let mut expr = self.equality()?;

        while self.match_token(&Token::And) {
            let right = self.equality()?;
            expr = binary(expr, BinaryOp::And, right);
        }

        Ok(expr)
    }

    /// Parse equality
    fn equality(&mut self) -> Result<Expr> {
        let mut expr = self.comparison()?;

        while let Some(op @ (BinaryOp::Equal | BinaryOp::NotEqual)) = BinaryOp::from_token(&self.current) {
            self.advance();
            let right = self.comparison()?;
            expr = binary(expr, op, right);
        }

        Ok(expr)
    }

    /// Parse comparison and `in`
    fn comparison(&mut self) -> Result<Expr> {
        let mut expr = self.term()?;

        loop {
            match BinaryOp::from_token(&self.current) {
                Some(BinaryOp::In) => {
                    self.advance();
                    let right = self.membership()?;
                    expr = binary(expr, BinaryOp::In, right);
                }
                Some(
                    op @ (BinaryOp::Less
                    | BinaryOp::Greater
                    | BinaryOp::LessEqual
                    | BinaryOp::GreaterEqual),
                ) => {
                    self.advance();
                    let right = self.term()?;
                    expr = binary(expr, op, right);
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Right side of `in`: a `<lo, hi>` range or a collection
    fn membership(&mut self) -> Result<Expr> {
        if !self.match_token(&Token::Less) {
            return self.term();
        }

        let low = self.term()?;
        self.consume(&Token::Comma, "Expected ',' in range")?;
        let high = self.term()?;
        self.consume(&Token::Greater, "Expected '>' after range")?;

        Ok(Expr::Range {
            low: Box::new(low),
            high: Box::new(high),
        })
    }

    /// Parse addition and subtraction
    fn term(&mut self) -> Result<Expr> {
        let mut expr = self.factor()?;

        while let Some(op @ (BinaryOp::Add | BinaryOp::Sub)) = BinaryOp::from_token(&self.current) {
            self.advance();
            let right = self.factor()?;
            expr = binary(expr, op, right);
        }

        Ok(expr)
    }

    /// Parse multiplication, division and modulo
    fn factor(&mut self) -> Result<Expr> {
        let mut expr = self.power()?;

        while let Some(op @ (BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod)) =
            BinaryOp::from_token(&self.current)
        {
            self.advance();
            let right = self.power()?;
            expr = binary(expr, op, right);
        }

        Ok(expr)
    }

    /// Parse exponentiation
    fn power(&mut self) -> Result<Expr> {
        let mut expr = self.unary()?;

        while self.match_token(&Token::Caret) {
            let right = self.unary()?;
            expr = binary(expr, BinaryOp::Pow, right);
        }

        Ok(expr)
    }

    /// Parse prefix operators
    fn unary(&mut self) -> Result<Expr> {
        let op = match self.current {
            Token::Not => UnaryOp::Not,
            Token::Minus => UnaryOp::Negate,
            Token::Increment => UnaryOp::PreIncrement,
            Token::Decrement => UnaryOp::PreDecrement,
            _ => return self.postfix(),
        };
        self.advance();

        let operand = self.unary()?;
        Ok(Expr::Unary { op, operand: Box::new(operand) })
    }

    /// Parse member access, indexing and postfix operators
    fn postfix(&mut self) -> Result<Expr> {
        let mut expr = self.primary()?;

        loop {
            match self.current {
                Token::LBracket => {
                    self.advance();
                    let indices = self.expression_list(&Token::RBracket)?;
                    self.consume(&Token::RBracket, "Expected ']' after index")?;
                    expr = index(expr, indices);
                }
                Token::Dot => {
                    self.advance();
                    let segment = self.member()?;
                    expr = match expr {
                        Expr::Dotted(mut segments) => {
                            segments.push(segment);
                            Expr::Dotted(segments)
                        }
                        head => Expr::Dotted(vec![head, segment]),
                    };
                }
                Token::Increment => {
                    self.advance();
                    expr = Expr::Unary { op: UnaryOp::PostIncrement, operand: Box::new(expr) };
                }
                Token::Decrement => {
                    self.advance();
                    expr = Expr::Unary { op: UnaryOp::PostDecrement, operand: Box::new(expr) };
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Parse one segment after a `.`
    fn member(&mut self) -> Result<Expr> {
        let name = match &self.current {
            Token::Identifier(name) => name.clone(),
            _ => return Err(self.error("Expected member name after '.'")),
        };
        self.advance();

        if self.check(&Token::LParen) {
            let args = self.call_arguments(&name)?;
            Ok(Expr::Call { name, args })
        } else {
            Ok(Expr::Identifier(name))
        }
    }

    /// Parse primary expressions
    fn primary(&mut self) -> Result<Expr> {
        let expr = match &self.current {
            Token::Number(n) => Expr::Number(n.clone()),
            Token::String(s) => Expr::String(s.clone()),
            Token::Identifier(name) => {
                let name = name.clone();
                self.advance();
                if self.check(&Token::LParen) {
                    let args = self.call_arguments(&name)?;
                    return Ok(Expr::Call { name, args });
                }
                return Ok(Expr::Identifier(name));
            }
            Token::LParen => {
                self.advance();
                let inner = self.expression()?;
                self.consume(&Token::RParen, "Expected ')' after expression")?;
                return Ok(Expr::Grouped(Box::new(inner)));
            }
            Token::LBrace => {
                self.advance();
                let items = self.expression_list(&Token::RBrace)?;
                self.consume(&Token::RBrace, "Expected '}' after list")?;
                return Ok(Expr::List(items));
            }
            other => return Err(self.error(format!("Unexpected {:?} in expression", other))),
        };

        self.advance();
        Ok(expr)
    }

    /// Parse `(args)` of a call to `name`
    fn call_arguments(&mut self, name: &str) -> Result<Vec<Expr>> {
        self.consume(&Token::LParen, "Expected '('")?;

        let mut args = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                args.push(self.argument(name, args.len())?);
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }

        self.consume(&Token::RParen, "Expected ')' after arguments")?;
        Ok(args)
    }

    /// Parse one argument, as raw text when the prototype asks for it
    fn argument(&mut self, name: &str, position: usize) -> Result<Expr> {
        if favors_string(name, position) && !matches!(self.current, Token::String(_)) {
            Ok(Expr::String(self.raw_argument()))
        } else {
            self.expression()
        }
    }

    /// Re-read the source from the current token as unquoted text
    fn raw_argument(&mut self) -> String {
        self.lexer.reset_to(self.current_start, self.current_line);
        let raw = self.lexer.read_raw_argument();
        self.advance();
        raw
    }

    fn expression_list(&mut self, terminator: &Token) -> Result<Vec<Expr>> {
        let mut items = Vec::new();
        if self.check(terminator) {
            return Ok(items);
        }

        loop {
            items.push(self.expression()?);
            if !self.match_token(&Token::Comma) {
                return Ok(items);
            }
        }
    }

    /// Skip to the end of the broken statement
    fn synchronize(&mut self) {
        loop {
            match self.current {
                Token::Semicolon => {
                    self.advance();
                    return;
                }
                Token::RBrace | Token::EOF => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn report(&mut self, err: ScriptError) {
        self.diagnostics.push(Diagnostic::from(err));
    }

    fn error(&self, message: impl Into<String>) -> ScriptError {
        ScriptError::ParseError {
            line: self.current_line,
            message: message.into(),
        }
    }

    /// Check if current token matches
    fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(&self.current) == std::mem::discriminant(token)
    }

    /// Match token and advance
    fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            return true;
        }
        false
    }

    /// Consume a specific token or error
    fn consume(&mut self, token: &Token, message: &str) -> Result<()> {
        if self.match_token(token) {
            Ok(())
        } else {
            Err(self.error(message))
        }
    }

    /// Token after the current one
    fn peek(&self) -> Token {
        self.lexer.clone().next_token().unwrap_or(Token::EOF)
    }

    /// Advance to next token, reporting lexical errors as diagnostics
    fn advance(&mut self) -> Token {
        let next = loop {
            match self.lexer.next_spanned() {
                Ok((token, start, line)) => {
                    self.current_start = start;
                    self.current_line = line;
                    break token;
                }
                Err(err) => self.report(err),
            }
        };
        std::mem::replace(&mut self.current, next)
    }
}

fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    Expr::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

/// Apply an index; inside a dotted chain it binds to the last segment
fn index(target: Expr, indices: Vec<Expr>) -> Expr {
    match target {
        Expr::Dotted(mut segments) => {
            if let Some(last) = segments.pop() {
                segments.push(Expr::Index { target: Box::new(last), indices });
            }
            Expr::Dotted(segments)
        }
        target => Expr::Index { target: Box::new(target), indices },
    }
}
