//! Tree-walking evaluator.
//!
//! Owns the global frame, the current frame, and the resolver's hop-count
//! table. Non-local control flow is expressed as the `Interrupt` error
//! variant: `Return` unwinds through arbitrarily many block frames and is
//! caught exactly at the function-call boundary in `LoxFunction::call`;
//! runtime errors unwind all the way out to `interpret`, which hands them to
//! the reporter.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info};

use crate::class::{LoxClass, LoxInstance};
use crate::environment::Environment;
use crate::error::{LoxError, Result};
use crate::function::LoxFunction;
use crate::parser::{Expr, ExprId, FunctionDecl, LiteralValue, Stmt};
use crate::reporter::SharedReporter;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Why evaluation stopped early. `Return` is caught at function-call
/// boundaries; `Error` propagates to the top of the run.
pub enum Interrupt {
    Return(Value),
    Error(LoxError),
}

impl From<LoxError> for Interrupt {
    fn from(error: LoxError) -> Self {
        Interrupt::Error(error)
    }
}

pub struct Interpreter<W: Write> {
    output: W,
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<ExprId, usize>,
    reporter: SharedReporter,
}

impl<W: Write> Interpreter<W> {
    pub fn new(output: W, reporter: SharedReporter) -> Self {
        let globals = Rc::new(RefCell::new(Environment::new()));

        globals.borrow_mut().define(
            "clock",
            Value::NativeFunction {
                name: "clock".to_string(),
                arity: 0,
                func: clock_native,
            },
        );

        info!("Interpreter initialized with global environment");

        Interpreter {
            output,
            globals: globals.clone(),
            environment: globals,
            locals: HashMap::new(),
            reporter,
        }
    }

    /// Record a hop count for a resolvable expression. Called by the resolver;
    /// expressions with no entry fall back to the global frame at runtime.
    pub fn note_local(&mut self, id: ExprId, depth: usize) {
        debug!("Binding expr {:?} at depth {}", id, depth);

        self.locals.insert(id, depth);
    }

    /// Run a program. A runtime error stops execution and is routed to the
    /// reporter; the interpreter itself stays usable for the next run.
    pub fn interpret(&mut self, statements: &[Stmt]) {
        info!("Interpreting {} statement(s)", statements.len());

        for stmt in statements {
            match self.execute(stmt) {
                Ok(()) => {}

                Err(Interrupt::Error(err)) => {
                    self.reporter.borrow_mut().report(&err);
                    return;
                }

                // The resolver rejects top-level `return` before we get here.
                Err(Interrupt::Return(_)) => return,
            }
        }
    }

    /// Surrender the output stream; used by tests to inspect printed text.
    pub fn into_output(self) -> W {
        self.output
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────────

    fn execute(&mut self, stmt: &Stmt) -> std::result::Result<(), Interrupt> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;

                Ok(())
            }

            Stmt::Print(expr) => {
                let value: Value = self.evaluate(expr)?;

                writeln!(self.output, "{}", value).map_err(LoxError::from)?;

                Ok(())
            }

            Stmt::Var { name, initializer } => {
                let value: Value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                self.environment.borrow_mut().define(&name.lexeme, value);

                Ok(())
            }

            Stmt::Block(statements) => {
                let environment = Rc::new(RefCell::new(Environment::with_enclosing(
                    self.environment.clone(),
                )));

                self.execute_block(statements, environment)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if is_truthy(&self.evaluate(condition)?) {
                    self.execute(then_branch)?;
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)?;
                }

                Ok(())
            }

            Stmt::While { condition, body } => {
                while is_truthy(&self.evaluate(condition)?) {
                    self.execute(body)?;
                }

                Ok(())
            }

            Stmt::Function(declaration) => {
                debug!("Defining <fn {}>", declaration.name.lexeme);

                let function =
                    LoxFunction::new(declaration.clone(), self.environment.clone(), false);

                self.environment
                    .borrow_mut()
                    .define(&declaration.name.lexeme, Value::Function(Rc::new(function)));

                Ok(())
            }

            Stmt::Return { value, .. } => {
                let value: Value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                Err(Interrupt::Return(value))
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.execute_class(name, superclass.as_ref(), methods),
        }
    }

    /// Swap in `environment`, run the statements, swap back. The swap-back
    /// also runs when a `Return` or error unwinds through.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<RefCell<Environment>>,
    ) -> std::result::Result<(), Interrupt> {
        let previous: Rc<RefCell<Environment>> =
            std::mem::replace(&mut self.environment, environment);

        let mut result: std::result::Result<(), Interrupt> = Ok(());

        for stmt in statements {
            result = self.execute(stmt);

            if result.is_err() {
                break;
            }
        }

        self.environment = previous;

        result
    }

    fn execute_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) -> std::result::Result<(), Interrupt> {
        debug!("Defining class {}", name.lexeme);

        let superclass_value: Option<Rc<LoxClass>> = match superclass {
            Some(expr) => {
                let value: Value = self.evaluate(expr)?;

                match value {
                    Value::Class(class) => Some(class),

                    _ => {
                        let token: &Token = match expr {
                            Expr::Variable { name, .. } => name,
                            _ => name,
                        };

                        return Err(Interrupt::Error(LoxError::runtime(
                            token,
                            "Superclass must be a class.",
                        )));
                    }
                }
            }

            None => None,
        };

        // Two-step definition so methods can close over the class name.
        self.environment.borrow_mut().define(&name.lexeme, Value::Nil);

        // Method closures hang off a frame carrying `super` when subclassing.
        let class_env: Rc<RefCell<Environment>> = match &superclass_value {
            Some(superclass) => {
                let env = Rc::new(RefCell::new(Environment::with_enclosing(
                    self.environment.clone(),
                )));

                env.borrow_mut()
                    .define("super", Value::Class(superclass.clone()));

                env
            }

            None => self.environment.clone(),
        };

        let mut method_map: HashMap<String, Rc<LoxFunction>> = HashMap::new();

        for method in methods {
            let is_initializer: bool = method.name.lexeme == "init";

            method_map.insert(
                method.name.lexeme.clone(),
                Rc::new(LoxFunction::new(
                    method.clone(),
                    class_env.clone(),
                    is_initializer,
                )),
            );
        }

        let class = Value::Class(Rc::new(LoxClass::new(
            name.lexeme.clone(),
            superclass_value,
            method_map,
        )));

        self.environment
            .borrow_mut()
            .assign(&name.lexeme, class, name.line)?;

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────────

    fn evaluate(&mut self, expr: &Expr) -> std::result::Result<Value, Interrupt> {
        match expr {
            Expr::Literal(lit) => Ok(match lit {
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::Number(n) => Value::Number(*n),
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => self.evaluate_logical(left, operator, right),

            Expr::Variable { id, name } => self.look_up_variable(name, *id),

            Expr::This { id, keyword } => self.look_up_variable(keyword, *id),

            Expr::Assign { id, name, value } => {
                let value: Value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(distance) => Environment::assign_at(
                        &self.environment,
                        *distance,
                        &name.lexeme,
                        value.clone(),
                        name.line,
                    )?,

                    None => self
                        .globals
                        .borrow_mut()
                        .assign(&name.lexeme, value.clone(), name.line)?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee_value: Value = self.evaluate(callee)?;

                let mut arg_values: Vec<Value> = Vec::with_capacity(arguments.len());

                for arg in arguments {
                    arg_values.push(self.evaluate(arg)?);
                }

                self.call_value(callee_value, arg_values, paren)
            }

            Expr::Get { object, name } => {
                let object: Value = self.evaluate(object)?;

                match object {
                    Value::Instance(instance) => {
                        LoxInstance::get(&instance, name).map_err(Interrupt::Error)
                    }

                    _ => Err(Interrupt::Error(LoxError::runtime(
                        name,
                        "Only instances have properties.",
                    ))),
                }
            }

            Expr::Set {
                object,
                name,
                value,
            } => {
                let object: Value = self.evaluate(object)?;

                match object {
                    Value::Instance(instance) => {
                        let value: Value = self.evaluate(value)?;

                        instance.borrow_mut().set(name, value.clone());

                        Ok(value)
                    }

                    _ => Err(Interrupt::Error(LoxError::runtime(
                        name,
                        "Only instances have fields.",
                    ))),
                }
            }

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method),
        }
    }

    fn evaluate_unary(
        &mut self,
        operator: &Token,
        right: &Expr,
    ) -> std::result::Result<Value, Interrupt> {
        let value: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => match value {
                Value::Number(n) => Ok(Value::Number(-n)),

                _ => Err(Interrupt::Error(LoxError::runtime(
                    operator,
                    "Operand must be a number.",
                ))),
            },

            TokenType::BANG => Ok(Value::Bool(!is_truthy(&value))),

            _ => Err(Interrupt::Error(LoxError::runtime(
                operator,
                "Invalid unary operator.",
            ))),
        }
    }

    fn evaluate_binary(
        &mut self,
        left: &Expr,
        operator: &Token,
        right: &Expr,
    ) -> std::result::Result<Value, Interrupt> {
        let left_val: Value = self.evaluate(left)?;
        let right_val: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::PLUS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),

                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),

                _ => Err(Interrupt::Error(LoxError::runtime(
                    operator,
                    "Operands must be two numbers or two strings.",
                ))),
            },

            TokenType::MINUS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),

                _ => Err(Interrupt::Error(LoxError::runtime(
                    operator,
                    "Operands must be numbers.",
                ))),
            },

            TokenType::STAR => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),

                _ => Err(Interrupt::Error(LoxError::runtime(
                    operator,
                    "Operands must be numbers.",
                ))),
            },

            // Division by zero follows IEEE-754: Inf/NaN, never an error.
            TokenType::SLASH => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),

                _ => Err(Interrupt::Error(LoxError::runtime(
                    operator,
                    "Operands must be numbers.",
                ))),
            },

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(is_equal(&left_val, &right_val))),

            TokenType::BANG_EQUAL => Ok(Value::Bool(!is_equal(&left_val, &right_val))),

            TokenType::LESS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a < b)),

                _ => Err(Interrupt::Error(LoxError::runtime(
                    operator,
                    "Operands must be numbers.",
                ))),
            },

            TokenType::LESS_EQUAL => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a <= b)),

                _ => Err(Interrupt::Error(LoxError::runtime(
                    operator,
                    "Operands must be numbers.",
                ))),
            },

            TokenType::GREATER => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a > b)),

                _ => Err(Interrupt::Error(LoxError::runtime(
                    operator,
                    "Operands must be numbers.",
                ))),
            },

            TokenType::GREATER_EQUAL => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a >= b)),

                _ => Err(Interrupt::Error(LoxError::runtime(
                    operator,
                    "Operands must be numbers.",
                ))),
            },

            _ => Err(Interrupt::Error(LoxError::runtime(
                operator,
                "Invalid binary operator.",
            ))),
        }
    }

    fn evaluate_logical(
        &mut self,
        left: &Expr,
        operator: &Token,
        right: &Expr,
    ) -> std::result::Result<Value, Interrupt> {
        let left_val: Value = self.evaluate(left)?;

        match operator.token_type {
            TokenType::OR => {
                if is_truthy(&left_val) {
                    Ok(left_val)
                } else {
                    self.evaluate(right)
                }
            }

            TokenType::AND => {
                if !is_truthy(&left_val) {
                    Ok(left_val)
                } else {
                    self.evaluate(right)
                }
            }

            _ => Err(Interrupt::Error(LoxError::runtime(
                operator,
                "Invalid logical operator.",
            ))),
        }
    }

    fn evaluate_super(
        &mut self,
        id: ExprId,
        keyword: &Token,
        method: &Token,
    ) -> std::result::Result<Value, Interrupt> {
        let distance: usize = match self.locals.get(&id) {
            Some(distance) => *distance,

            None => {
                return Err(Interrupt::Error(LoxError::runtime(
                    keyword,
                    "Undefined variable 'super'.",
                )))
            }
        };

        let superclass: Value =
            Environment::get_at(&self.environment, distance, "super", keyword.line)?;

        // `this` sits one frame inside the `super` frame.
        let object: Value =
            Environment::get_at(&self.environment, distance - 1, "this", keyword.line)?;

        match (superclass, object) {
            (Value::Class(superclass), Value::Instance(instance)) => {
                match superclass.find_method(&method.lexeme) {
                    Some(found) => Ok(Value::Function(Rc::new(found.bind(instance)))),

                    None => Err(Interrupt::Error(LoxError::runtime(
                        method,
                        format!("Undefined property '{}'.", method.lexeme),
                    ))),
                }
            }

            _ => Err(Interrupt::Error(LoxError::runtime(
                keyword,
                "Undefined variable 'super'.",
            ))),
        }
    }

    fn call_value(
        &mut self,
        callee: Value,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> std::result::Result<Value, Interrupt> {
        match callee {
            Value::NativeFunction { arity, func, .. } => {
                check_arity(arity, arguments.len(), paren)?;

                func(&arguments).map_err(Interrupt::Error)
            }

            Value::Function(function) => {
                check_arity(function.arity(), arguments.len(), paren)?;

                function.call(self, arguments)
            }

            Value::Class(class) => {
                check_arity(class.arity(), arguments.len(), paren)?;

                let instance = Rc::new(RefCell::new(LoxInstance::new(class.clone())));

                if let Some(initializer) = class.find_method("init") {
                    initializer.bind(instance.clone()).call(self, arguments)?;
                }

                Ok(Value::Instance(instance))
            }

            _ => Err(Interrupt::Error(LoxError::runtime(
                paren,
                "Can only call functions and classes.",
            ))),
        }
    }

    fn look_up_variable(
        &self,
        name: &Token,
        id: ExprId,
    ) -> std::result::Result<Value, Interrupt> {
        let result: Result<Value> = match self.locals.get(&id) {
            Some(distance) => {
                Environment::get_at(&self.environment, *distance, &name.lexeme, name.line)
            }

            None => self.globals.borrow().get(&name.lexeme, name.line),
        };

        result.map_err(Interrupt::Error)
    }
}

/// Only `nil` and `false` are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Nil => false,

        Value::Bool(b) => *b,

        _ => true,
    }
}

/// Value equality within a type; callables and instances compare by identity.
fn is_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Nil, Value::Nil) => true,

        (Value::Number(a), Value::Number(b)) => a == b,

        (Value::String(a), Value::String(b)) => a == b,

        (Value::Bool(a), Value::Bool(b)) => a == b,

        (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),

        (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),

        (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),

        _ => false,
    }
}

fn check_arity(
    expected: usize,
    got: usize,
    paren: &Token,
) -> std::result::Result<(), Interrupt> {
    if expected == got {
        Ok(())
    } else {
        Err(Interrupt::Error(LoxError::runtime(
            paren,
            format!("Expected {} arguments but got {}.", expected, got),
        )))
    }
}

fn clock_native(_args: &[Value]) -> Result<Value> {
    let timestamp: f64 = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| LoxError::Runtime {
            message: format!("Clock error: {}", e),
            line: 0,
        })?
        .as_secs_f64();

    Ok(Value::Number(timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_is_nil_and_false_only() {
        assert!(!is_truthy(&Value::Nil));
        assert!(!is_truthy(&Value::Bool(false)));
        assert!(is_truthy(&Value::Bool(true)));
        assert!(is_truthy(&Value::Number(0.0)));
        assert!(is_truthy(&Value::String(String::new())));
    }

    #[test]
    fn equality_is_typed() {
        assert!(is_equal(&Value::Nil, &Value::Nil));
        assert!(!is_equal(&Value::Nil, &Value::Number(0.0)));
        assert!(is_equal(&Value::Number(1.0), &Value::Number(1.0)));
        assert!(!is_equal(&Value::Number(1.0), &Value::String("1".into())));
        assert!(is_equal(
            &Value::String("a".into()),
            &Value::String("a".into())
        ));
    }
}
