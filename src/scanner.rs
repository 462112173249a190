use std::iter::FusedIterator;

use log::{debug, info};
use phf::phf_map;

use crate::error::LoxError;
use crate::token::{Token, TokenType};

static KEYWORDS: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"and" => TokenType::AND,
    b"class" => TokenType::CLASS,
    b"else" => TokenType::ELSE,
    b"false" => TokenType::FALSE,
    b"fun" => TokenType::FUN,
    b"for" => TokenType::FOR,
    b"if" => TokenType::IF,
    b"nil" => TokenType::NIL,
    b"or" => TokenType::OR,
    b"print" => TokenType::PRINT,
    b"return" => TokenType::RETURN,
    b"super" => TokenType::SUPER,
    b"this" => TokenType::THIS,
    b"true" => TokenType::TRUE,
    b"var" => TokenType::VAR,
    b"while" => TokenType::WHILE,
};

/// Hand-written lexer over raw bytes. Iterating yields one `Token` (or one
/// error) per lexeme, then a final EOF token carrying the last line number.
#[derive(Debug, Clone)]
pub struct Scanner {
    source: Vec<u8>,
    start: usize,
    curr_ptr: usize,
    line: usize,
    pending_token: Option<TokenType>,
}

impl Scanner {
    pub fn new(buf: Vec<u8>) -> Self {
        info!("Initializing Scanner with buffer of {} bytes", buf.len());
        Self {
            source: buf,
            start: 0,
            curr_ptr: 0,
            line: 1,
            pending_token: None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.source.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    fn scan_token(&mut self) -> Result<(), LoxError> {
        let byte: u8 = self.advance();

        match byte {
            b'(' => self.add_token(TokenType::LEFT_PAREN),

            b')' => self.add_token(TokenType::RIGHT_PAREN),

            b'{' => self.add_token(TokenType::LEFT_BRACE),

            b'}' => self.add_token(TokenType::RIGHT_BRACE),

            b',' => self.add_token(TokenType::COMMA),

            b'.' => self.add_token(TokenType::DOT),

            b'-' => self.add_token(TokenType::MINUS),

            b'+' => self.add_token(TokenType::PLUS),

            b';' => self.add_token(TokenType::SEMICOLON),

            b'*' => self.add_token(TokenType::STAR),

            b'!' => {
                let token_type: TokenType = if self.match_byte(b'=') {
                    TokenType::BANG_EQUAL
                } else {
                    TokenType::BANG
                };
                self.add_token(token_type);
            }

            b'=' => {
                let token_type: TokenType = if self.match_byte(b'=') {
                    TokenType::EQUAL_EQUAL
                } else {
                    TokenType::EQUAL
                };
                self.add_token(token_type);
            }

            b'<' => {
                let token_type: TokenType = if self.match_byte(b'=') {
                    TokenType::LESS_EQUAL
                } else {
                    TokenType::LESS
                };
                self.add_token(token_type);
            }

            b'>' => {
                let token_type: TokenType = if self.match_byte(b'=') {
                    TokenType::GREATER_EQUAL
                } else {
                    TokenType::GREATER
                };
                self.add_token(token_type);
            }

            b' ' | b'\r' | b'\t' => {}

            b'\n' => {
                self.line += 1;
            }

            b'/' => {
                if self.match_byte(b'/') {
                    debug!("Skipping line comment at line {}", self.line);
                    while self.peek() != b'\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else if self.match_byte(b'*') {
                    debug!("Skipping block comment at line {}", self.line);
                    self.block_comment()?;
                } else {
                    self.add_token(TokenType::SLASH);
                }
            }

            b'"' => {
                self.parse_string()?;
            }

            b'0'..=b'9' => {
                self.parse_number();
            }

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                self.parse_identifier();
            }

            _ => {
                debug!(
                    "Unexpected character '{}' at line {}",
                    byte as char, self.line
                );

                return Err(LoxError::lex(
                    self.line,
                    format!("Unexpected character: {}", byte as char),
                ));
            }
        }

        Ok(())
    }

    /// Consumes a `/* ... */` comment. Comments nest: every unmatched `/*`
    /// opens a level, `*/` closes the innermost one. Newlines inside any level
    /// still advance the line counter.
    fn block_comment(&mut self) -> Result<(), LoxError> {
        let mut depth: usize = 1;

        while depth > 0 {
            if self.is_at_end() {
                return Err(LoxError::lex(self.line, "Unterminated comment."));
            }

            match self.advance() {
                b'\n' => self.line += 1,

                b'*' if self.match_byte(b'/') => depth -= 1,

                b'/' if self.match_byte(b'*') => depth += 1,

                _ => {}
            }
        }

        Ok(())
    }

    fn parse_string(&mut self) -> Result<(), LoxError> {
        while !self.is_at_end() && self.peek() != b'"' {
            if self.peek() == b'\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            return Err(LoxError::lex(self.line, "Unterminated string."));
        }

        // The closing '"'.
        self.advance();

        let parsed_string: String = unsafe {
            String::from_utf8_unchecked(self.source[self.start + 1..self.curr_ptr - 1].to_vec())
        };

        debug!("Parsed string literal: {}", parsed_string);

        self.add_token(TokenType::STRING(parsed_string));

        Ok(())
    }

    fn parse_number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance();

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let parsed_number: String =
            unsafe { String::from_utf8_unchecked(self.source[self.start..self.curr_ptr].to_vec()) };

        let number: f64 = parsed_number.parse().unwrap_or(0.0);

        debug!("Parsed number: {}", number);

        self.add_token(TokenType::NUMBER(number));
    }

    fn parse_identifier(&mut self) {
        while self.peek().is_ascii_alphanumeric() || self.peek() == b'_' {
            self.advance();
        }

        let text: &[u8] = &self.source[self.start..self.curr_ptr];

        match KEYWORDS.get(text) {
            Some(token_type) => {
                self.add_token(token_type.clone());
            }

            None => {
                self.add_token(TokenType::IDENTIFIER);
            }
        }
    }

    #[inline]
    fn add_token(&mut self, token_type: TokenType) {
        self.pending_token = Some(token_type);
    }

    #[inline]
    fn advance(&mut self) -> u8 {
        let byte = self.source[self.curr_ptr];

        self.curr_ptr += 1;

        byte
    }

    #[inline]
    fn match_byte(&mut self, expected: u8) -> bool {
        if self.is_at_end() || self.source[self.curr_ptr] != expected {
            false
        } else {
            self.curr_ptr += 1;

            true
        }
    }

    #[inline]
    fn peek(&self) -> u8 {
        if self.is_at_end() {
            0
        } else {
            self.source[self.curr_ptr]
        }
    }

    #[inline]
    fn peek_next(&self) -> u8 {
        if self.curr_ptr + 1 >= self.len() {
            0
        } else {
            self.source[self.curr_ptr + 1]
        }
    }

    #[inline]
    fn is_at_end(&self) -> bool {
        self.curr_ptr >= self.len()
    }
}

impl Iterator for Scanner {
    type Item = Result<Token, LoxError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.is_at_end() {
                if self.curr_ptr == self.len() {
                    self.curr_ptr += 1;

                    info!("Reached EOF at line {}", self.line);

                    return Some(Ok(Token::new(TokenType::EOF, "".to_string(), self.line)));
                }

                return None;
            }

            self.pending_token = None;

            self.start = self.curr_ptr;

            if let Err(e) = self.scan_token() {
                return Some(Err(e));
            }

            if let Some(token_type) = self.pending_token.take() {
                let lexeme: &str = unsafe {
                    std::str::from_utf8_unchecked(&self.source[self.start..self.curr_ptr])
                };

                debug!(
                    "Emitting token: type={:?}, lexeme={}, line={}",
                    token_type, lexeme, self.line
                );

                return Some(Ok(Token::new(token_type, lexeme.to_string(), self.line)));
            }

            // Whitespace or a comment: nothing emitted, keep scanning.
        }
    }
}

impl FusedIterator for Scanner {}
