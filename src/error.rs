//! Centralised error hierarchy for the interpreter.
//!
//! All subsystems (scanner, parser, resolver, runtime, CLI) convert their
//! internal failure modes into one of the variants defined here. This enables a
//! uniform `Result<T>` alias throughout the crate and ergonomic inter-operation
//! with `anyhow`, while still preserving rich diagnostic detail.
//!
//! The module **does not** print diagnostics itself; that is the reporter's
//! job.

use std::io;

use log::info;
use thiserror::Error;

use crate::token::{Token, TokenType};

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human-readable description.
        message: String,

        /// 1-based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error, located at a token.
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        message: String,
        location: String,
        line: usize,
    },

    /// Static-analysis (resolver) error, located at a token.
    #[error("[line {line}] Error{location}: {message}")]
    Resolve {
        message: String,
        location: String,
        line: usize,
    },

    /// Runtime evaluation error, carrying the most specific token's line.
    #[error("[line {line}] RuntimeError: {message}")]
    Runtime { message: String, line: usize },

    /// Wrapper around `std::io::Error` (transparent). Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF-8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// `" at end"` for the EOF sentinel, `" at '<lexeme>'"` for everything else.
fn location_of(token: &Token) -> String {
    if token.token_type == TokenType::EOF {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!(
            "Creating Parse error: line={}, msg={}",
            token.line, message
        );

        LoxError::Parse {
            message,
            location: location_of(token),
            line: token.line,
        }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!(
            "Creating Resolve error: line={}, msg={}",
            token.line, message
        );

        LoxError::Resolve {
            message,
            location: location_of(token),
            line: token.line,
        }
    }

    /// Helper constructor for the **runtime**.
    pub fn runtime<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!(
            "Creating Runtime error: line={}, msg={}",
            token.line, message
        );

        LoxError::Runtime {
            message,
            line: token.line,
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;
