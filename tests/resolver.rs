#[cfg(test)]
mod resolver_tests {
    use loxide as lox;

    use lox::lox::Lox;

    /// Runs one source string; returns (stdout, had_compile_error).
    fn run(source: &str) -> (String, bool) {
        let mut driver = Lox::new(Vec::new());
        driver.run(source);

        let had_compile_error = driver.had_compile_error();
        let output = String::from_utf8(driver.into_output()).expect("output is UTF-8");

        (output, had_compile_error)
    }

    fn assert_rejected(source: &str) {
        let (output, had_compile_error) = run(source);

        assert!(had_compile_error, "expected a compile error for: {}", source);
        assert!(
            output.is_empty(),
            "nothing may execute after a compile error, but got: {}",
            output
        );
    }

    #[test]
    fn duplicate_local_in_same_scope_is_rejected() {
        assert_rejected("{ var a = 1; var a = 2; print a; }");
    }

    #[test]
    fn global_redeclaration_is_allowed() {
        let (output, had_compile_error) = run("var a = 1; var a = 2; print a;");

        assert!(!had_compile_error);
        assert_eq!(output, "2\n");
    }

    #[test]
    fn reading_local_in_its_own_initializer_is_rejected() {
        assert_rejected("var a = 1; { var a = a; }");
    }

    #[test]
    fn return_at_top_level_is_rejected() {
        assert_rejected("return 1;");
    }

    #[test]
    fn return_with_value_in_initializer_is_rejected() {
        assert_rejected("class K { init() { return 1; } } K();");
    }

    #[test]
    fn bare_return_in_initializer_is_allowed() {
        let (output, had_compile_error) = run("class K { init() { return; } } print K();");

        assert!(!had_compile_error);
        assert_eq!(output, "K instance\n");
    }

    #[test]
    fn this_outside_a_class_is_rejected() {
        assert_rejected("print this;");
        assert_rejected("fun f() { return this; } f();");
    }

    #[test]
    fn super_outside_a_class_is_rejected() {
        assert_rejected("print super.x;");
    }

    #[test]
    fn super_without_a_superclass_is_rejected() {
        assert_rejected("class A { m() { return super.m(); } } A().m();");
    }

    #[test]
    fn class_inheriting_from_itself_is_rejected() {
        assert_rejected("class A < A {} A();");
    }

    #[test]
    fn multiple_errors_surface_in_one_pass() {
        // Both the duplicate and the bad return sit in the same program; the
        // pass keeps going after the first hit.
        assert_rejected("{ var a = 1; var a = 2; } return 3;");
    }

    #[test]
    fn shadowed_variable_resolves_to_declaration_scope() {
        // The closure captured `a` before the block-local shadow existed, so
        // both calls see the global.
        let source = r#"
            var a = "global";
            {
              fun showA() { print a; }
              showA();
              var a = "block";
              showA();
            }
        "#;

        let (output, had_compile_error) = run(source);

        assert!(!had_compile_error);
        assert_eq!(output, "global\nglobal\n");
    }
}
