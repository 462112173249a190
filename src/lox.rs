//! End-to-end driver: one `Lox` value runs source strings through scanner,
//! parser, resolver, and interpreter, sharing a single reporter across all of
//! them. The same value serves repeated REPL lines: globals, the hop-count
//! table, and the expression-id counter all persist between runs.

use std::io::Write;

use log::{debug, info};

use crate::interpreter::Interpreter;
use crate::parser::{Parser, Stmt};
use crate::reporter::{Reporter, SharedReporter};
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::token::Token;

pub struct Lox<W: Write> {
    reporter: SharedReporter,
    interpreter: Interpreter<W>,
    next_id: usize,
}

impl<W: Write> Lox<W> {
    pub fn new(output: W) -> Self {
        let reporter: SharedReporter = Reporter::new();

        Lox {
            reporter: reporter.clone(),
            interpreter: Interpreter::new(output, reporter),
            next_id: 0,
        }
    }

    /// Run one source string to completion. Diagnostics go to the reporter;
    /// any compile-time error suppresses execution entirely.
    pub fn run(&mut self, source: &str) {
        info!("Running {} byte(s) of source", source.len());

        let scanner: Scanner = Scanner::new(source.as_bytes().to_vec());

        let mut tokens: Vec<Token> = Vec::new();

        for result in scanner {
            match result {
                Ok(token) => tokens.push(token),

                Err(err) => self.reporter.borrow_mut().report(&err),
            }
        }

        let mut parser: Parser = Parser::new(tokens, self.reporter.clone(), self.next_id);
        let statements: Vec<Stmt> = parser.parse();
        self.next_id = parser.next_id();

        if self.reporter.borrow().had_compile_error() {
            debug!("Skipping execution: scan/parse errors");
            return;
        }

        let mut resolver = Resolver::new(&mut self.interpreter, self.reporter.clone());
        resolver.resolve(&statements);

        // A partial hop-count table must never run.
        if self.reporter.borrow().had_compile_error() {
            debug!("Skipping execution: resolver errors");
            return;
        }

        self.interpreter.interpret(&statements);
    }

    pub fn had_compile_error(&self) -> bool {
        self.reporter.borrow().had_compile_error()
    }

    pub fn had_runtime_error(&self) -> bool {
        self.reporter.borrow().had_runtime_error()
    }

    /// Forgive compile errors between REPL lines.
    pub fn clear_compile_error(&mut self) {
        self.reporter.borrow_mut().clear_compile_error();
    }

    /// Surrender the output stream; used by tests to inspect printed text.
    pub fn into_output(self) -> W {
        self.interpreter.into_output()
    }
}
