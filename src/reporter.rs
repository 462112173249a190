//! Shared diagnostic sink.
//!
//! One `Reporter` is constructed per program run and handed to the parser,
//! resolver, and interpreter (the driver routes scanner errors into it). It
//! writes every diagnostic to standard error and records which phase failed so
//! the driver can gate execution and pick an exit code.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::error::LoxError;

#[derive(Debug, Default)]
pub struct Reporter {
    had_compile_error: bool,
    had_runtime_error: bool,
}

/// The sink is shared across pipeline stages within a single-threaded run.
pub type SharedReporter = Rc<RefCell<Reporter>>;

impl Reporter {
    pub fn new() -> SharedReporter {
        Rc::new(RefCell::new(Reporter::default()))
    }

    /// Print the diagnostic and record it under the matching flag.
    pub fn report(&mut self, error: &LoxError) {
        debug!("Reporting diagnostic: {}", error);

        eprintln!("{}", error);

        match error {
            LoxError::Runtime { .. } => self.had_runtime_error = true,
            _ => self.had_compile_error = true,
        }
    }

    pub fn had_compile_error(&self) -> bool {
        self.had_compile_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// The REPL forgives compile errors between prompt lines; runtime errors
    /// stay on record for the session's exit code.
    pub fn clear_compile_error(&mut self) {
        self.had_compile_error = false;
    }
}
