//! Static resolution pass.
//!
//! This module performs a single AST walk to:
//! 1. **Build lexical scopes**: maintains a stack of `HashMap<String, bool>`
//!    tracking declared (false) and fully defined (true) names in each nested
//!    block or function.
//! 2. **Enforce static rules**: reports errors such as redeclaration in the
//!    same scope, reading a variable in its own initializer, invalid `return`
//!    outside functions, and illegal use of `this`/`super`.
//! 3. **Record binding distances**: for every resolvable occurrence
//!    (`Variable`, `Assign`, `This`, `Super`), calls back into the interpreter
//!    to note whether it is a local (and at what depth) or a global. This lets
//!    the runtime climb exactly the right number of environment frames.
//!
//! Errors go to the shared sink and resolution carries on, so one pass
//! surfaces as many problems as it can. The driver refuses to execute a
//! program whose resolution reported anything: a partial hop-count table must
//! never reach the evaluator.

use std::collections::HashMap;
use std::io::Write;

use log::{debug, info};

use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::parser::{Expr, ExprId, FunctionDecl, Stmt};
use crate::reporter::SharedReporter;
use crate::token::Token;

/// What kind of function body is being resolved. Validates `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Initializer,
    Method,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ClassType {
    /// Not inside any class
    None,

    /// Inside a class declaration _without_ a superclass
    Class,

    /// Inside a class declaration _with_ a superclass
    Subclass,
}

/// Resolver: tracks scopes, enforces static rules, and *records* binding
/// distances (locals vs. globals) by calling back into the interpreter.
pub struct Resolver<'interp, W: Write> {
    interpreter: &'interp mut Interpreter<W>,
    reporter: SharedReporter,
    scopes: Vec<HashMap<String, bool>>, // false=declared, true=defined
    current_function: FunctionType,
    current_class: ClassType,
}

impl<'interp, W: Write> Resolver<'interp, W> {
    /// Create a new resolver bound to the given interpreter.
    pub fn new(interpreter: &'interp mut Interpreter<W>, reporter: SharedReporter) -> Self {
        info!("Resolver instantiated");
        Resolver {
            interpreter,
            reporter,
            scopes: Vec::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
        }
    }

    /// Walk all top-level statements.
    pub fn resolve(&mut self, statements: &[Stmt]) {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );
        for stmt in statements {
            self.resolve_stmt(stmt);
        }
    }

    fn error(&mut self, token: &Token, message: &str) {
        let err = LoxError::resolve(token, message);
        self.reporter.borrow_mut().report(&err);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statement resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                // 1. Save and enter the class context.
                let enclosing_class: ClassType = self.current_class;
                self.current_class = ClassType::Class;

                // 2. Declare & define the class name so methods can refer to it.
                self.declare(name);
                self.define(name);

                // 3. If there is a superclass, resolve it and bind `super`.
                if let Some(super_expr) = superclass {
                    if let Expr::Variable {
                        name: super_name, ..
                    } = super_expr
                    {
                        if super_name.lexeme == name.lexeme {
                            self.error(super_name, "A class can't inherit from itself.");
                        }
                    }

                    self.current_class = ClassType::Subclass;

                    self.resolve_expr(super_expr);

                    // Open a scope holding `super` for all method closures.
                    self.begin_scope();
                    self.scopes
                        .last_mut()
                        .expect("scope just pushed")
                        .insert("super".to_string(), true);
                }

                // 4. Open the implicit `this` scope for methods.
                self.begin_scope();
                self.scopes
                    .last_mut()
                    .expect("scope just pushed")
                    .insert("this".to_string(), true);

                // 5. Resolve each method in its own function context.
                for method in methods {
                    let kind: FunctionType = if method.name.lexeme == "init" {
                        FunctionType::Initializer
                    } else {
                        FunctionType::Method
                    };

                    self.resolve_function(method, kind);
                }

                // 6. Close the `this` scope, then the `super` scope if any.
                self.end_scope();

                if superclass.is_some() {
                    self.end_scope();
                }

                // 7. Restore the outer class context.
                self.current_class = enclosing_class;
            }

            Stmt::Block(statements) => {
                self.begin_scope();

                for s in statements {
                    self.resolve_stmt(s);
                }

                self.end_scope();
            }

            Stmt::Var { name, initializer } => {
                // Declared before, defined after the initializer: reading the
                // name inside its own initializer is caught in between.
                self.declare(name);

                if let Some(expr) = initializer {
                    self.resolve_expr(expr);
                }

                self.define(name);
            }

            Stmt::Function(declaration) => {
                // Declared & defined up front so the body may recurse.
                self.declare(&declaration.name);
                self.define(&declaration.name);

                self.resolve_function(declaration, FunctionType::Function);
            }

            Stmt::Expression(expr) | Stmt::Print(expr) => {
                self.resolve_expr(expr);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);

                if let Some(eb) = else_branch.as_deref() {
                    self.resolve_stmt(eb);
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    self.error(keyword, "Can't return from top-level code.");
                }

                if let Some(expr) = value {
                    if self.current_function == FunctionType::Initializer {
                        self.error(keyword, "Can't return a value from an initializer.");
                    }

                    self.resolve_expr(expr);
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expression resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => {
                self.resolve_expr(inner);
            }

            Expr::Unary { right, .. } => {
                self.resolve_expr(right);
            }

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }

            Expr::Variable { id, name } => {
                // A name may not be read while its own initializer resolves.
                let declared_only = self
                    .scopes
                    .last()
                    .map_or(false, |scope| scope.get(&name.lexeme) == Some(&false));

                if declared_only {
                    self.error(name, "Can't read local variable in its own initializer.");
                }

                self.resolve_local(*id, name);
            }

            Expr::Assign { id, name, value } => {
                self.resolve_expr(value);
                self.resolve_local(*id, name);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);

                for arg in arguments {
                    self.resolve_expr(arg);
                }
            }

            Expr::This { id, keyword } => {
                if self.current_class == ClassType::None {
                    self.error(keyword, "Can't use 'this' outside of a class.");
                }

                self.resolve_local(*id, keyword);
            }

            Expr::Get { object, .. } => {
                // Properties are looked up dynamically; only the object part
                // is resolved statically.
                self.resolve_expr(object);
            }

            Expr::Set { object, value, .. } => {
                self.resolve_expr(object);
                self.resolve_expr(value);
            }

            Expr::Super { id, keyword, .. } => {
                if self.current_class == ClassType::None {
                    self.error(keyword, "Can't use 'super' outside of a class.");
                } else if self.current_class != ClassType::Subclass {
                    self.error(keyword, "Can't use 'super' in a class with no superclass.");
                }

                self.resolve_local(*id, keyword);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Function helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Enter a fresh scope for a function's parameters + body.
    ///
    /// One scope covers both: the runtime builds exactly one frame per call,
    /// so the depths recorded here line up with it.
    fn resolve_function(&mut self, declaration: &FunctionDecl, kind: FunctionType) {
        let enclosing: FunctionType = self.current_function;
        self.current_function = kind;

        self.begin_scope();

        for param in &declaration.params {
            self.declare(param);
            self.define(param);
        }

        for stmt in &declaration.body {
            self.resolve_stmt(stmt);
        }

        self.end_scope();

        self.current_function = enclosing;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────────

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    #[inline]
    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(&name.lexeme) {
                let err = LoxError::resolve(
                    name,
                    "Already a variable with this name in this scope.",
                );
                self.reporter.borrow_mut().report(&err);
            }

            scope.insert(name.lexeme.clone(), false);
        }
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Binding-distance helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Record this occurrence as either a local at some depth, or a global if
    /// no enclosing scope knows the name (globals get no table entry).
    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                debug!("Resolved '{}' at depth {}", name.lexeme, depth);
                self.interpreter.note_local(id, depth);
                return;
            }
        }

        debug!("Resolved '{}' as global", name.lexeme);
    }
}
