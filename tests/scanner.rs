#[cfg(test)]
mod scanner_tests {
    use loxide as lox;

    use lox::scanner::*;
    use lox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source.as_bytes().to_vec());
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    fn scan_all(source: &str) -> Vec<Result<Token, lox::error::LoxError>> {
        Scanner::new(source.as_bytes().to_vec()).collect()
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_operators() {
        assert_token_sequence(
            "! != = == < <= > >= / //ignored",
            &[
                (TokenType::BANG, "!"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL, "="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS, "<"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER, ">"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::SLASH, "/"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords_and_identifiers() {
        assert_token_sequence(
            "class fun var forge Zebra _under score1",
            &[
                (TokenType::CLASS, "class"),
                (TokenType::FUN, "fun"),
                (TokenType::VAR, "var"),
                (TokenType::IDENTIFIER, "forge"),
                (TokenType::IDENTIFIER, "Zebra"),
                (TokenType::IDENTIFIER, "_under"),
                (TokenType::IDENTIFIER, "score1"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_number_literals() {
        let tokens: Vec<_> = Scanner::new(b"12 3.5 7.".to_vec())
            .filter_map(Result::ok)
            .collect();

        assert_eq!(tokens.len(), 5); // 12, 3.5, 7, ., EOF

        match tokens[0].token_type {
            TokenType::NUMBER(n) => assert_eq!(n, 12.0),
            ref other => panic!("expected NUMBER, got {:?}", other),
        }
        match tokens[1].token_type {
            TokenType::NUMBER(n) => assert_eq!(n, 3.5),
            ref other => panic!("expected NUMBER, got {:?}", other),
        }

        // A trailing dot is not part of the number.
        match tokens[2].token_type {
            TokenType::NUMBER(n) => assert_eq!(n, 7.0),
            ref other => panic!("expected NUMBER, got {:?}", other),
        }
        assert_eq!(tokens[3].token_type, TokenType::DOT);
    }

    #[test]
    fn test_scanner_05_string_literal_payload() {
        let tokens: Vec<_> = Scanner::new(b"\"hi there\"".to_vec())
            .filter_map(Result::ok)
            .collect();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].lexeme, "\"hi there\"");

        match &tokens[0].token_type {
            TokenType::STRING(s) => assert_eq!(s, "hi there"),
            other => panic!("expected STRING, got {:?}", other),
        }
    }

    #[test]
    fn test_scanner_06_lines_counted_across_newlines_and_strings() {
        let source = "var a;\nvar b = \"two\nlines\";\nprint b;";
        let tokens: Vec<_> = Scanner::new(source.as_bytes().to_vec())
            .filter_map(Result::ok)
            .collect();

        // `var` on line 1.
        assert_eq!(tokens[0].line, 1);
        // Second `var` on line 2; the string closes on line 3.
        assert_eq!(tokens[3].line, 2);
        let string_token = tokens
            .iter()
            .find(|t| matches!(t.token_type, TokenType::STRING(_)))
            .expect("string token");
        assert_eq!(string_token.line, 3);
        // `print` on line 4.
        let print_token = tokens
            .iter()
            .find(|t| t.token_type == TokenType::PRINT)
            .expect("print token");
        assert_eq!(print_token.line, 4);
    }

    #[test]
    fn test_scanner_07_line_comment_at_start_of_line() {
        assert_token_sequence(
            "// leading comment\nprint 1;",
            &[
                (TokenType::PRINT, "print"),
                (TokenType::NUMBER(1.0), "1"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_08_block_comment_produces_no_tokens() {
        assert_token_sequence("/* nothing here */", &[(TokenType::EOF, "")]);
    }

    #[test]
    fn test_scanner_09_nested_block_comment_produces_no_tokens() {
        assert_token_sequence("/* /* x */ */", &[(TokenType::EOF, "")]);
    }

    #[test]
    fn test_scanner_10_unclosed_nesting_is_unterminated() {
        let results = scan_all("/* /* */");

        let errors: Vec<_> = results.iter().filter_map(|r| r.as_ref().err()).collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("Unterminated comment."));
    }

    #[test]
    fn test_scanner_11_newlines_inside_nested_comments_count() {
        let source = "/* outer\n/* inner\n*/\n*/ print 1;";
        let tokens: Vec<_> = Scanner::new(source.as_bytes().to_vec())
            .filter_map(Result::ok)
            .collect();

        assert_eq!(tokens[0].token_type, TokenType::PRINT);
        assert_eq!(tokens[0].line, 4);
    }

    #[test]
    fn test_scanner_12_tokens_after_block_comment_on_same_line() {
        assert_token_sequence(
            "1 /* mid */ + 2",
            &[
                (TokenType::NUMBER(1.0), "1"),
                (TokenType::PLUS, "+"),
                (TokenType::NUMBER(2.0), "2"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_13_unterminated_string() {
        let results = scan_all("\"no closing quote");

        let errors: Vec<_> = results.iter().filter_map(|r| r.as_ref().err()).collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("Unterminated string."));
    }

    #[test]
    fn test_scanner_14_unexpected_chars_interleaved() {
        let results = scan_all(",.$(#");

        // COMMA, DOT, error($), LEFT_PAREN, error(#), EOF
        assert_eq!(results.len(), 6);

        let error_count = results.iter().filter(|r| r.is_err()).count();
        assert_eq!(error_count, 2);

        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(
                err.to_string().contains("Unexpected character"),
                "error should mention the unexpected character, got: {}",
                err
            );
        }

        let kinds: Vec<_> = results
            .iter()
            .filter_map(|r| r.as_ref().ok())
            .map(|t| t.token_type.clone())
            .collect();
        assert_eq!(
            kinds,
            vec![
                TokenType::COMMA,
                TokenType::DOT,
                TokenType::LEFT_PAREN,
                TokenType::EOF
            ]
        );
    }

    #[test]
    fn test_scanner_15_eof_carries_final_line() {
        let tokens: Vec<_> = Scanner::new(b"1\n2\n3\n".to_vec())
            .filter_map(Result::ok)
            .collect();

        let eof = tokens.last().expect("eof token");
        assert_eq!(eof.token_type, TokenType::EOF);
        assert_eq!(eof.line, 4);
    }
}
