//! Recursive-descent parser and the AST it produces.
//!
//! The grammar is parsed with one function per precedence level, climbing from
//! `expression` down to `primary`. Statement-level errors unwind to
//! `declaration`, which reports them and re-synchronizes at the next statement
//! boundary, so one bad statement never hides the rest of the file.
//!
//! `for` loops never reach the later stages: they are desugared here into the
//! equivalent `Block`/`While` shape.

use std::rc::Rc;

use log::{debug, info};

use crate::error::{LoxError, Result};
use crate::reporter::SharedReporter;
use crate::token::{Token, TokenType};

/// Identity of a resolvable expression node. Every `Variable`, `Assign`,
/// `This`, and `Super` gets a fresh id at construction; the resolver keys its
/// hop-count table by it. Ids increase monotonically across REPL lines so a
/// stale table entry can never alias a new node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    True,
    False,
    Nil,
    Str(String),
    Number(f64),
}

#[derive(Debug, Clone)]
pub enum Expr {
    Assign {
        id: ExprId,
        name: Token,
        value: Box<Expr>,
    },

    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    Call {
        callee: Box<Expr>,
        paren: Token,
        arguments: Vec<Expr>,
    },

    Get {
        object: Box<Expr>,
        name: Token,
    },

    Grouping(Box<Expr>),

    Literal(LiteralValue),

    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },

    Super {
        id: ExprId,
        keyword: Token,
        method: Token,
    },

    This {
        id: ExprId,
        keyword: Token,
    },

    Unary {
        operator: Token,
        right: Box<Expr>,
    },

    Variable {
        id: ExprId,
        name: Token,
    },
}

/// One `fun` declaration or class method. Shared via `Rc` because the runtime
/// closure over it outlives the statement that declared it.
#[derive(Debug)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Block(Vec<Stmt>),

    Class {
        name: Token,
        superclass: Option<Expr>,
        methods: Vec<Rc<FunctionDecl>>,
    },

    Expression(Expr),

    Function(Rc<FunctionDecl>),

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    Print(Expr),

    Return {
        keyword: Token,
        value: Option<Expr>,
    },

    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    While {
        condition: Expr,
        body: Box<Stmt>,
    },
}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    next_id: usize,
    reporter: SharedReporter,
}

impl Parser {
    /// `first_id` seeds the expression-id counter; the driver threads it
    /// across runs so ids stay unique for the lifetime of one interpreter.
    pub fn new(tokens: Vec<Token>, reporter: SharedReporter, first_id: usize) -> Self {
        info!("Parser instantiated over {} token(s)", tokens.len());
        Parser {
            tokens,
            current: 0,
            next_id: first_id,
            reporter,
        }
    }

    /// Where the id counter stopped; the next `Parser` resumes from here.
    pub fn next_id(&self) -> usize {
        self.next_id
    }

    /// program → declaration* EOF
    ///
    /// Failed declarations are reported through the sink and contribute
    /// nothing to the output list.
    pub fn parse(&mut self) -> Vec<Stmt> {
        let mut statements: Vec<Stmt> = Vec::new();

        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        statements
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Declarations and statements
    // ─────────────────────────────────────────────────────────────────────────

    /// declaration → classDecl | funDecl | varDecl | statement
    ///
    /// Panic-mode boundary: every syntax error below lands here.
    fn declaration(&mut self) -> Option<Stmt> {
        let result: Result<Stmt> = if self.match_tokens(&[TokenType::CLASS]) {
            self.class_declaration()
        } else if self.match_tokens(&[TokenType::FUN]) {
            self.function("function").map(Stmt::Function)
        } else if self.match_tokens(&[TokenType::VAR]) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),

            Err(err) => {
                self.reporter.borrow_mut().report(&err);
                self.synchronize();
                None
            }
        }
    }

    /// classDecl → "class" IDENT ( "<" IDENT )? "{" function* "}"
    fn class_declaration(&mut self) -> Result<Stmt> {
        let name: Token = self
            .consume(TokenType::IDENTIFIER, "Expected a class name.")?
            .clone();

        let superclass: Option<Expr> = if self.match_tokens(&[TokenType::LESS]) {
            let super_name: Token = self
                .consume(TokenType::IDENTIFIER, "Expected a superclass name.")?
                .clone();

            Some(Expr::Variable {
                id: self.next_expr_id(),
                name: super_name,
            })
        } else {
            None
        };

        self.consume(TokenType::LEFT_BRACE, "Expected '{' before class body.")?;

        let mut methods: Vec<Rc<FunctionDecl>> = Vec::new();

        while !self.check(&TokenType::RIGHT_BRACE) && !self.is_at_end() {
            methods.push(self.function("method")?);
        }

        self.consume(TokenType::RIGHT_BRACE, "Expected '}' after class body.")?;

        Ok(Stmt::Class {
            name,
            superclass,
            methods,
        })
    }

    /// function → IDENT "(" parameters? ")" "{" declaration* "}"
    ///
    /// `kind` is "function" or "method", used only for error messages.
    fn function(&mut self, kind: &str) -> Result<Rc<FunctionDecl>> {
        let name: Token = self
            .consume(TokenType::IDENTIFIER, format!("Expected {} name.", kind))?
            .clone();

        self.consume(
            TokenType::LEFT_PAREN,
            format!("Expected '(' after {} name.", kind),
        )?;

        let mut params: Vec<Token> = Vec::new();

        if !self.check(&TokenType::RIGHT_PAREN) {
            loop {
                if params.len() >= 255 {
                    // Advisory: reported but parsing carries on.
                    let err = LoxError::parse(self.peek(), "Can't have more than 255 parameters.");
                    self.reporter.borrow_mut().report(&err);
                }

                params.push(
                    self.consume(TokenType::IDENTIFIER, "Expected a parameter name.")?
                        .clone(),
                );

                if !self.match_tokens(&[TokenType::COMMA]) {
                    break;
                }
            }
        }

        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after parameters.")?;
        self.consume(
            TokenType::LEFT_BRACE,
            format!("Expected '{{' before {} body.", kind),
        )?;

        let body: Vec<Stmt> = self.block()?;

        Ok(Rc::new(FunctionDecl { name, params, body }))
    }

    /// varDecl → "var" IDENT ( "=" expression )? ";"
    fn var_declaration(&mut self) -> Result<Stmt> {
        let name: Token = self
            .consume(TokenType::IDENTIFIER, "Expected a variable name.")?
            .clone();

        let initializer: Option<Expr> = if self.match_tokens(&[TokenType::EQUAL]) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(
            TokenType::SEMICOLON,
            "Expected ';' after variable declaration.",
        )?;

        Ok(Stmt::Var { name, initializer })
    }

    fn statement(&mut self) -> Result<Stmt> {
        if self.match_tokens(&[TokenType::PRINT]) {
            return self.print_statement();
        }

        if self.match_tokens(&[TokenType::RETURN]) {
            return self.return_statement();
        }

        if self.match_tokens(&[TokenType::WHILE]) {
            return self.while_statement();
        }

        if self.match_tokens(&[TokenType::FOR]) {
            return self.for_statement();
        }

        if self.match_tokens(&[TokenType::IF]) {
            return self.if_statement();
        }

        if self.match_tokens(&[TokenType::LEFT_BRACE]) {
            return Ok(Stmt::Block(self.block()?));
        }

        self.expression_statement()
    }

    /// forStmt → "for" "(" ( varDecl | exprStmt | ";" ) expression? ";"
    ///           expression? ")" statement
    ///
    /// Desugars to `{ init; while (cond) { body; incr; } }`; an absent
    /// condition becomes `true`.
    fn for_statement(&mut self) -> Result<Stmt> {
        self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'for'.")?;

        let initializer: Option<Stmt> = if self.match_tokens(&[TokenType::SEMICOLON]) {
            None
        } else if self.match_tokens(&[TokenType::VAR]) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition: Option<Expr> = if !self.check(&TokenType::SEMICOLON) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenType::SEMICOLON, "Expected ';' after loop condition.")?;

        let increment: Option<Expr> = if !self.check(&TokenType::RIGHT_PAREN) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after for clauses.")?;

        let mut body: Stmt = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
        }

        let condition: Expr = condition.unwrap_or(Expr::Literal(LiteralValue::True));

        body = Stmt::While {
            condition,
            body: Box::new(body),
        };

        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }

        Ok(body)
    }

    /// whileStmt → "while" "(" expression ")" statement
    fn while_statement(&mut self) -> Result<Stmt> {
        self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'while'.")?;
        let condition: Expr = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after condition.")?;

        let body: Stmt = self.statement()?;

        Ok(Stmt::While {
            condition,
            body: Box::new(body),
        })
    }

    /// ifStmt → "if" "(" expression ")" statement ( "else" statement )?
    fn if_statement(&mut self) -> Result<Stmt> {
        self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'if'.")?;
        let condition: Expr = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after if condition.")?;

        let then_branch: Stmt = self.statement()?;

        let else_branch: Option<Box<Stmt>> = if self.match_tokens(&[TokenType::ELSE]) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch: Box::new(then_branch),
            else_branch,
        })
    }

    fn print_statement(&mut self) -> Result<Stmt> {
        let value: Expr = self.expression()?;
        self.consume(TokenType::SEMICOLON, "Expected ';' after value.")?;

        Ok(Stmt::Print(value))
    }

    fn return_statement(&mut self) -> Result<Stmt> {
        let keyword: Token = self.previous().clone();

        let value: Option<Expr> = if !self.check(&TokenType::SEMICOLON) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenType::SEMICOLON, "Expected ';' after return value.")?;

        Ok(Stmt::Return { keyword, value })
    }

    fn expression_statement(&mut self) -> Result<Stmt> {
        let expr: Expr = self.expression()?;
        self.consume(TokenType::SEMICOLON, "Expected ';' after expression.")?;

        Ok(Stmt::Expression(expr))
    }

    /// block → "{" declaration* "}"
    ///
    /// Recovers per contained declaration, so one bad statement inside a block
    /// does not abandon its siblings.
    fn block(&mut self) -> Result<Vec<Stmt>> {
        let mut statements: Vec<Stmt> = Vec::new();

        while !self.check(&TokenType::RIGHT_BRACE) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume(TokenType::RIGHT_BRACE, "Expected '}' after block.")?;

        Ok(statements)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expressions, by precedence
    // ─────────────────────────────────────────────────────────────────────────

    pub fn expression(&mut self) -> Result<Expr> {
        self.assignment()
    }

    /// assignment → ( call "." )? IDENT "=" assignment | logic_or
    ///
    /// Right-associative. An invalid target is reported without unwinding; the
    /// parser keeps the left-hand side and carries on.
    fn assignment(&mut self) -> Result<Expr> {
        let expr: Expr = self.or()?;

        if self.match_tokens(&[TokenType::EQUAL]) {
            let equals: Token = self.previous().clone();
            let value: Box<Expr> = Box::new(self.assignment()?);

            return Ok(match expr {
                Expr::Variable { name, .. } => Expr::Assign {
                    id: self.next_expr_id(),
                    name,
                    value,
                },

                Expr::Get { object, name } => Expr::Set {
                    object,
                    name,
                    value,
                },

                other => {
                    let err = LoxError::parse(&equals, "Invalid assignment target.");
                    self.reporter.borrow_mut().report(&err);
                    other
                }
            });
        }

        Ok(expr)
    }

    fn or(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.and()?;

        while self.match_tokens(&[TokenType::OR]) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.and()?;

            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn and(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.equality()?;

        while self.match_tokens(&[TokenType::AND]) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.equality()?;

            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.comparison()?;

        while self.match_tokens(&[TokenType::BANG_EQUAL, TokenType::EQUAL_EQUAL]) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.comparison()?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.term()?;

        while self.match_tokens(&[
            TokenType::GREATER,
            TokenType::GREATER_EQUAL,
            TokenType::LESS,
            TokenType::LESS_EQUAL,
        ]) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.term()?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.factor()?;

        while self.match_tokens(&[TokenType::MINUS, TokenType::PLUS]) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.factor()?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.unary()?;

        while self.match_tokens(&[TokenType::SLASH, TokenType::STAR]) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.unary()?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr> {
        if self.match_tokens(&[TokenType::BANG, TokenType::MINUS]) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.unary()?;

            return Ok(Expr::Unary {
                operator,
                right: Box::new(right),
            });
        }

        self.call()
    }

    /// call → primary ( "(" arguments? ")" | "." IDENT )*
    fn call(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.primary()?;

        loop {
            if self.match_tokens(&[TokenType::LEFT_PAREN]) {
                expr = self.finish_call(expr)?;
            } else if self.match_tokens(&[TokenType::DOT]) {
                let name: Token = self
                    .consume(TokenType::IDENTIFIER, "Expected a property name after '.'.")?
                    .clone();

                expr = Expr::Get {
                    object: Box::new(expr),
                    name,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> Result<Expr> {
        let mut arguments: Vec<Expr> = Vec::new();

        if !self.check(&TokenType::RIGHT_PAREN) {
            loop {
                if arguments.len() >= 255 {
                    // Advisory: reported but parsing carries on.
                    let err = LoxError::parse(self.peek(), "Can't have more than 255 arguments.");
                    self.reporter.borrow_mut().report(&err);
                }

                arguments.push(self.expression()?);

                if !self.match_tokens(&[TokenType::COMMA]) {
                    break;
                }
            }
        }

        let paren: Token = self
            .consume(TokenType::RIGHT_PAREN, "Expected ')' after arguments.")?
            .clone();

        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }

    fn primary(&mut self) -> Result<Expr> {
        if self.match_tokens(&[TokenType::FALSE]) {
            return Ok(Expr::Literal(LiteralValue::False));
        }

        if self.match_tokens(&[TokenType::TRUE]) {
            return Ok(Expr::Literal(LiteralValue::True));
        }

        if self.match_tokens(&[TokenType::NIL]) {
            return Ok(Expr::Literal(LiteralValue::Nil));
        }

        if self.match_tokens(&[TokenType::NUMBER(0.0)]) {
            if let TokenType::NUMBER(n) = &self.previous().token_type {
                return Ok(Expr::Literal(LiteralValue::Number(*n)));
            }
        }

        if self.match_tokens(&[TokenType::STRING(String::new())]) {
            if let TokenType::STRING(s) = &self.previous().token_type {
                return Ok(Expr::Literal(LiteralValue::Str(s.clone())));
            }
        }

        if self.match_tokens(&[TokenType::SUPER]) {
            let keyword: Token = self.previous().clone();
            self.consume(TokenType::DOT, "Expected '.' after 'super'.")?;
            let method: Token = self
                .consume(TokenType::IDENTIFIER, "Expected superclass method name.")?
                .clone();

            return Ok(Expr::Super {
                id: self.next_expr_id(),
                keyword,
                method,
            });
        }

        if self.match_tokens(&[TokenType::THIS]) {
            return Ok(Expr::This {
                id: self.next_expr_id(),
                keyword: self.previous().clone(),
            });
        }

        if self.match_tokens(&[TokenType::IDENTIFIER]) {
            return Ok(Expr::Variable {
                id: self.next_expr_id(),
                name: self.previous().clone(),
            });
        }

        if self.match_tokens(&[TokenType::LEFT_PAREN]) {
            let expr: Expr = self.expression()?;
            self.consume(TokenType::RIGHT_PAREN, "Expected ')' after expression.")?;

            return Ok(Expr::Grouping(Box::new(expr)));
        }

        Err(LoxError::parse(self.peek(), "Expected an expression."))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Token-cursor helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn next_expr_id(&mut self) -> ExprId {
        let id = ExprId(self.next_id);
        self.next_id += 1;
        id
    }

    fn match_tokens(&mut self, types: &[TokenType]) -> bool {
        for token_type in types {
            if self.check(token_type) {
                self.advance();
                return true;
            }
        }

        false
    }

    fn consume<S: AsRef<str>>(&mut self, token_type: TokenType, message: S) -> Result<&Token> {
        if self.check(&token_type) {
            Ok(self.advance())
        } else {
            Err(LoxError::parse(self.peek(), message.as_ref()))
        }
    }

    fn check(&self, token_type: &TokenType) -> bool {
        if self.is_at_end() {
            return false;
        }

        &self.peek().token_type == token_type
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }

        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::EOF
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    /// Discard tokens until the previous one was `;` or the next one starts a
    /// statement, then resume normal parsing.
    fn synchronize(&mut self) {
        debug!("Synchronizing parser at line {}", self.peek().line);

        self.advance();

        while !self.is_at_end() {
            if self.previous().token_type == TokenType::SEMICOLON {
                return;
            }

            match self.peek().token_type {
                TokenType::CLASS
                | TokenType::FUN
                | TokenType::VAR
                | TokenType::FOR
                | TokenType::IF
                | TokenType::WHILE
                | TokenType::PRINT
                | TokenType::RETURN => return,

                _ => {}
            }

            self.advance();
        }
    }
}
