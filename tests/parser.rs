#[cfg(test)]
mod parser_tests {
    use loxide as lox;

    use lox::ast_printer::AstPrinter;
    use lox::parser::{Expr, Parser, Stmt};
    use lox::reporter::{Reporter, SharedReporter};
    use lox::scanner::Scanner;
    use lox::token::Token;

    fn tokenize(source: &str) -> Vec<Token> {
        Scanner::new(source.as_bytes().to_vec())
            .filter_map(Result::ok)
            .collect()
    }

    fn parse(source: &str) -> (Vec<Stmt>, SharedReporter) {
        let reporter = Reporter::new();
        let mut parser = Parser::new(tokenize(source), reporter.clone(), 0);
        let statements = parser.parse();
        (statements, reporter)
    }

    fn parse_expression(source: &str) -> Expr {
        let reporter = Reporter::new();
        let mut parser = Parser::new(tokenize(source), reporter.clone(), 0);
        let expr = parser.expression().expect("expression should parse");
        assert!(!reporter.borrow().had_compile_error());
        expr
    }

    #[test]
    fn precedence_binds_factor_over_term() {
        let expr = parse_expression("1 + 2 * 3");
        assert_eq!(AstPrinter::print(&expr), "(+ 1.0 (* 2.0 3.0))");
    }

    #[test]
    fn grouping_overrides_precedence() {
        let expr = parse_expression("(1 + 2) * 3");
        assert_eq!(AstPrinter::print(&expr), "(* (group (+ 1.0 2.0)) 3.0)");
    }

    #[test]
    fn unary_chains_are_right_nested() {
        let expr = parse_expression("!!true");
        assert_eq!(AstPrinter::print(&expr), "(! (! true))");
    }

    #[test]
    fn comparison_and_equality_nest_left() {
        let expr = parse_expression("1 < 2 == 3 >= 4");
        assert_eq!(AstPrinter::print(&expr), "(== (< 1.0 2.0) (>= 3.0 4.0))");
    }

    #[test]
    fn assignment_is_right_associative() {
        let expr = parse_expression("a = b = 1");
        assert_eq!(AstPrinter::print(&expr), "(= a (= b 1.0))");
    }

    #[test]
    fn logical_operators_keep_their_precedence() {
        let expr = parse_expression("a or b and c");
        assert_eq!(AstPrinter::print(&expr), "(or a (and b c))");
    }

    #[test]
    fn calls_and_property_chains_associate_left() {
        let expr = parse_expression("a.b(1).c");
        assert_eq!(AstPrinter::print(&expr), "(. (call (. a b) 1.0) c)");
    }

    #[test]
    fn set_expression_from_property_assignment() {
        let expr = parse_expression("a.b = 2");
        assert_eq!(AstPrinter::print(&expr), "(set a b 2.0)");
    }

    #[test]
    fn super_and_this_parse_inside_expressions() {
        let expr = parse_expression("super.greet");
        assert_eq!(AstPrinter::print(&expr), "(super greet)");

        let expr = parse_expression("this.x");
        assert_eq!(AstPrinter::print(&expr), "(. this x)");
    }

    #[test]
    fn for_loop_desugars_to_block_and_while() {
        let (statements, reporter) = parse("for (var i = 0; i < 3; i = i + 1) print i;");

        assert!(!reporter.borrow().had_compile_error());
        assert_eq!(statements.len(), 1);

        // { var i = 0; while (i < 3) { print i; i = i + 1; } }
        let outer = match &statements[0] {
            Stmt::Block(stmts) => stmts,
            other => panic!("expected Block, got {:?}", other),
        };
        assert_eq!(outer.len(), 2);
        assert!(matches!(outer[0], Stmt::Var { .. }));

        let (condition, body) = match &outer[1] {
            Stmt::While { condition, body } => (condition, body),
            other => panic!("expected While, got {:?}", other),
        };
        assert_eq!(AstPrinter::print(condition), "(< i 3.0)");

        let inner = match body.as_ref() {
            Stmt::Block(stmts) => stmts,
            other => panic!("expected Block body, got {:?}", other),
        };
        assert_eq!(inner.len(), 2);
        assert!(matches!(inner[0], Stmt::Print(_)));
        assert!(matches!(inner[1], Stmt::Expression(Expr::Assign { .. })));
    }

    #[test]
    fn for_loop_without_condition_gets_literal_true() {
        let (statements, reporter) = parse("for (;;) print 1;");

        assert!(!reporter.borrow().had_compile_error());

        let (condition, _) = match &statements[0] {
            Stmt::While { condition, body } => (condition, body),
            other => panic!("expected While, got {:?}", other),
        };
        assert_eq!(AstPrinter::print(condition), "true");
    }

    #[test]
    fn class_declaration_with_superclass_and_methods() {
        let (statements, reporter) = parse("class B < A { go() { return 1; } init(x) {} }");

        assert!(!reporter.borrow().had_compile_error());
        assert_eq!(statements.len(), 1);

        match &statements[0] {
            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                assert_eq!(name.lexeme, "B");
                assert!(matches!(superclass, Some(Expr::Variable { .. })));
                assert_eq!(methods.len(), 2);
                assert_eq!(methods[0].name.lexeme, "go");
                assert_eq!(methods[1].name.lexeme, "init");
                assert_eq!(methods[1].params.len(), 1);
            }
            other => panic!("expected Class, got {:?}", other),
        }
    }

    #[test]
    fn bad_declaration_is_dropped_and_rest_survives() {
        let (statements, reporter) = parse("var 1 = 2; print 3;");

        assert!(reporter.borrow().had_compile_error());
        // The bad var declaration contributes nothing; the print survives.
        assert_eq!(statements.len(), 1);
        assert!(matches!(statements[0], Stmt::Print(_)));
    }

    #[test]
    fn recovery_resumes_at_statement_keyword() {
        // No semicolon between the error and `var`: synchronize must stop at
        // the `var` keyword itself.
        let (statements, reporter) = parse("print + var ok = 1; print ok;");

        assert!(reporter.borrow().had_compile_error());
        assert_eq!(statements.len(), 2);
        assert!(matches!(statements[0], Stmt::Var { .. }));
        assert!(matches!(statements[1], Stmt::Print(_)));
    }

    #[test]
    fn invalid_assignment_target_reports_without_unwinding() {
        let (statements, reporter) = parse("1 = 2; print 3;");

        assert!(reporter.borrow().had_compile_error());
        // Both statements survive: the error does not enter panic mode.
        assert_eq!(statements.len(), 2);
        assert!(matches!(statements[1], Stmt::Print(_)));
    }

    #[test]
    fn expression_ids_continue_across_parsers() {
        let reporter = Reporter::new();

        let mut first = Parser::new(tokenize("a;"), reporter.clone(), 0);
        first.parse();
        let resume = first.next_id();
        assert!(resume > 0);

        let mut second = Parser::new(tokenize("b;"), reporter.clone(), resume);
        second.parse();
        assert!(second.next_id() > resume);
    }
}
