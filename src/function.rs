use std::cell::RefCell;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

use log::debug;

use crate::class::LoxInstance;
use crate::environment::Environment;
use crate::interpreter::{Interpreter, Interrupt};
use crate::parser::FunctionDecl;
use crate::value::Value;

/// A user function: its declaration, the environment captured where it was
/// declared, and whether it is a class initializer.
pub struct LoxFunction {
    declaration: Rc<FunctionDecl>,
    closure: Rc<RefCell<Environment>>,
    is_initializer: bool,
}

impl LoxFunction {
    pub fn new(
        declaration: Rc<FunctionDecl>,
        closure: Rc<RefCell<Environment>>,
        is_initializer: bool,
    ) -> Self {
        LoxFunction {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// A copy of this function whose closure is wrapped in a one-entry frame
    /// binding `this` to the given instance. Method lookup returns these.
    pub fn bind(&self, instance: Rc<RefCell<LoxInstance>>) -> LoxFunction {
        let environment = Rc::new(RefCell::new(Environment::with_enclosing(
            self.closure.clone(),
        )));

        environment
            .borrow_mut()
            .define("this", Value::Instance(instance));

        LoxFunction {
            declaration: self.declaration.clone(),
            closure: environment,
            is_initializer: self.is_initializer,
        }
    }

    /// Runs the body in a fresh frame under the closure. `Return` unwinding
    /// stops here; initializers always yield `this`.
    pub fn call<W: Write>(
        &self,
        interpreter: &mut Interpreter<W>,
        arguments: Vec<Value>,
    ) -> Result<Value, Interrupt> {
        debug!("Calling <fn {}> with {} arg(s)", self.name(), arguments.len());

        let environment = Rc::new(RefCell::new(Environment::with_enclosing(
            self.closure.clone(),
        )));

        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            environment.borrow_mut().define(&param.lexeme, argument);
        }

        match interpreter.execute_block(&self.declaration.body, environment) {
            Ok(()) => {}

            Err(Interrupt::Return(value)) => {
                if self.is_initializer {
                    return self.this_from_closure();
                }

                return Ok(value);
            }

            Err(other) => return Err(other),
        }

        if self.is_initializer {
            self.this_from_closure()
        } else {
            Ok(Value::Nil)
        }
    }

    fn this_from_closure(&self) -> Result<Value, Interrupt> {
        Environment::get_at(&self.closure, 0, "this", self.declaration.name.line)
            .map_err(Interrupt::Error)
    }
}

impl fmt::Debug for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Closures cycle back through environments; print the signature only.
        f.debug_struct("LoxFunction")
            .field("name", &self.name())
            .field("arity", &self.arity())
            .finish()
    }
}
