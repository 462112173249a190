use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{LoxError, Result};
use crate::function::LoxFunction;
use crate::token::Token;
use crate::value::Value;

/// A class value: its name, optional superclass, and method table. Immutable
/// after construction.
pub struct LoxClass {
    name: String,
    superclass: Option<Rc<LoxClass>>,
    methods: HashMap<String, Rc<LoxFunction>>,
}

impl LoxClass {
    pub fn new(
        name: String,
        superclass: Option<Rc<LoxClass>>,
        methods: HashMap<String, Rc<LoxFunction>>,
    ) -> Self {
        LoxClass {
            name,
            superclass,
            methods,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Walks this class then the superclass chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<LoxFunction>> {
        if let Some(method) = self.methods.get(name) {
            return Some(method.clone());
        }

        self.superclass
            .as_ref()
            .and_then(|superclass| superclass.find_method(name))
    }

    /// Calling a class takes as many arguments as its initializer does.
    pub fn arity(&self) -> usize {
        self.find_method("init")
            .map(|init| init.arity())
            .unwrap_or(0)
    }
}

impl fmt::Debug for LoxClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Method closures cycle back to this class; print the name only.
        f.debug_struct("LoxClass").field("name", &self.name).finish()
    }
}

impl fmt::Display for LoxClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// An instance: a class reference plus an open field map. Fields come into
/// existence on first assignment.
pub struct LoxInstance {
    class: Rc<LoxClass>,
    fields: HashMap<String, Value>,
}

impl LoxInstance {
    pub fn new(class: Rc<LoxClass>) -> Self {
        LoxInstance {
            class,
            fields: HashMap::new(),
        }
    }

    pub fn class_name(&self) -> &str {
        self.class.name()
    }

    /// Property lookup: fields shadow methods; a method hit returns a bound
    /// copy whose `this` is this instance. Reading an absent property is an
    /// error, not nil.
    pub fn get(instance: &Rc<RefCell<LoxInstance>>, name: &Token) -> Result<Value> {
        if let Some(value) = instance.borrow().fields.get(&name.lexeme) {
            return Ok(value.clone());
        }

        let method = instance.borrow().class.find_method(&name.lexeme);

        if let Some(method) = method {
            return Ok(Value::Function(Rc::new(method.bind(instance.clone()))));
        }

        Err(LoxError::runtime(
            name,
            format!("Undefined property '{}'.", name.lexeme),
        ))
    }

    pub fn set(&mut self, name: &Token, value: Value) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}

impl fmt::Debug for LoxInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Field values may cycle back to this instance; keep it shallow.
        f.debug_struct("LoxInstance")
            .field("class", &self.class.name)
            .finish()
    }
}
