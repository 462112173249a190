use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{LoxError, Result};
use crate::value::Value;

/// One lexical scope frame: a name→value map plus the enclosing frame. Frames
/// are shared by reference; closures keep their defining frame alive.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Unconditional write into this frame. Redefinition is allowed here; the
    /// resolver rejects it for non-global scopes before execution starts.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str, line: usize) -> Result<Value> {
        if let Some(value) = self.values.get(name) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name, line)
        } else {
            Err(LoxError::Runtime {
                message: format!("Undefined variable '{}'.", name),
                line,
            })
        }
    }

    pub fn assign(&mut self, name: &str, value: Value, line: usize) -> Result<()> {
        if self.values.contains_key(name) {
            self.values.insert(name.to_string(), value);
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value, line)
        } else {
            Err(LoxError::Runtime {
                message: format!("Undefined variable '{}'.", name),
                line,
            })
        }
    }

    /// Read directly from the frame exactly `distance` hops out, with no
    /// fallback chain. The resolver guarantees the binding exists there.
    pub fn get_at(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &str,
        line: usize,
    ) -> Result<Value> {
        let frame: Rc<RefCell<Environment>> = Self::ancestor(env, distance);

        let result = frame.borrow().values.get(name).cloned();

        result.ok_or_else(|| LoxError::Runtime {
            message: format!("Undefined variable '{}'.", name),
            line,
        })
    }

    /// Write directly into the frame exactly `distance` hops out.
    pub fn assign_at(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &str,
        value: Value,
        line: usize,
    ) -> Result<()> {
        let frame: Rc<RefCell<Environment>> = Self::ancestor(env, distance);

        let mut frame = frame.borrow_mut();

        if frame.values.contains_key(name) {
            frame.values.insert(name.to_string(), value);
            Ok(())
        } else {
            Err(LoxError::Runtime {
                message: format!("Undefined variable '{}'.", name),
                line,
            })
        }
    }

    fn ancestor(env: &Rc<RefCell<Environment>>, distance: usize) -> Rc<RefCell<Environment>> {
        let mut frame: Rc<RefCell<Environment>> = env.clone();

        for _ in 0..distance {
            let enclosing = frame
                .borrow()
                .enclosing
                .clone()
                .unwrap_or_else(|| frame.clone());

            frame = enclosing;
        }

        frame
    }
}
