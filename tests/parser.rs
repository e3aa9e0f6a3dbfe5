#[cfg(test)]
mod parser_tests {
    use rox as lox;

    use lox::ast_printer::AstPrinter;
    use lox::error::LoxError;
    use lox::expr::Expr;
    use lox::parser::Parser;
    use lox::scanner::scan_tokens;
    use lox::stmt::Stmt;

    fn parse(source: &str) -> Result<Vec<Stmt>, Vec<LoxError>> {
        let tokens = scan_tokens(source).expect("source should scan cleanly");
        Parser::new(&tokens).parse()
    }

    fn parse_ok(source: &str) -> Vec<String> {
        parse(source)
            .unwrap_or_else(|errors| panic!("unexpected parse errors: {:?}", errors))
            .iter()
            .map(AstPrinter::print_stmt)
            .collect()
    }

    fn expr(source: &str) -> String {
        let tokens = scan_tokens(source).expect("source should scan cleanly");
        let expr: Expr = Parser::new(&tokens)
            .parse_expression()
            .unwrap_or_else(|errors| panic!("unexpected parse errors: {:?}", errors));

        AstPrinter::print(&expr)
    }

    fn messages(source: &str) -> Vec<String> {
        parse(source)
            .expect_err("expected parse errors")
            .iter()
            .filter_map(|e| e.diagnostic().map(|d| d.message.clone()))
            .collect()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(expr("1 + 2 * 3"), "(+ 1.0 (* 2.0 3.0))");
        assert_eq!(expr("(1 + 2) * 3"), "(* (group (+ 1.0 2.0)) 3.0)");
        assert_eq!(expr("1 << 2 + 3"), "(<< 1.0 (+ 2.0 3.0))");
        assert_eq!(expr("1 < 2 == true"), "(== (< 1.0 2.0) true)");
        assert_eq!(expr("-2 ^ 2 % 3"), "(% (^ (- 2.0) 2.0) 3.0)");
        assert_eq!(expr("!not true"), "(! (not true))");
    }

    #[test]
    fn test_logical_aliases() {
        assert_eq!(expr("a && b || c"), "(|| (&& a b) c)");
        assert_eq!(expr("a or b and c"), "(or a (and b c))");
    }

    #[test]
    fn test_ternary_is_right_associative() {
        assert_eq!(expr("a ? b : c ? d : e"), "(?: a b (?: c d e))");
    }

    #[test]
    fn test_list_and_calls() {
        assert_eq!(expr("[1, \"two\", f(x)]"), "(list 1.0 two (call f x))");
        assert_eq!(expr("[]"), "(list)");
        assert_eq!(expr("a.b.c(1)(2)"), "(call (call (. (. a b) c) 1.0) 2.0)");
    }

    #[test]
    fn test_assignment_targets() {
        assert_eq!(expr("a = b = 1"), "(= a (= b 1.0))");
        assert_eq!(expr("a.b = 2"), "(= (. a b) 2.0)");

        assert_eq!(messages("1 = 2;"), vec!["Invalid assignment target."]);
    }

    #[test]
    fn test_for_desugars_with_increment_on_loop() {
        let printed = parse_ok("for (var i = 0; i < 3; i = i + 1) print i;");

        assert_eq!(
            printed,
            vec!["(block (var i 0.0) (while (< i 3.0) (print i) (= i (+ i 1.0))))"]
        );
    }

    #[test]
    fn test_for_without_clauses_loops_forever() {
        assert_eq!(parse_ok("for (;;) break;"), vec!["(while true (break))"]);
    }

    #[test]
    fn test_conditions_with_and_without_parens() {
        assert_eq!(
            parse_ok("if (a) print 1; else print 2;"),
            vec!["(if a (print 1.0) (print 2.0))"]
        );
        assert_eq!(parse_ok("if a { print 1; }"), vec!["(if a (block (print 1.0)))"]);
        assert_eq!(
            parse_ok("while x > 0 { x = x - 1; }"),
            vec!["(while (> x 0.0) (block (; (= x (- x 1.0)))))"]
        );

        assert_eq!(messages("if a print 1;"), vec!["Expected '{' after conditional."]);
    }

    #[test]
    fn test_statements_of_the_extended_language() {
        assert_eq!(
            parse_ok("print 1, 2; del a, b; assert x, \"msg\"; assert y;"),
            vec![
                "(print 1.0 2.0)",
                "(del a b)",
                "(assert x msg)",
                "(assert y)",
            ]
        );
        assert_eq!(
            parse_ok("while (true) { break continue; }"),
            vec!["(while true (block (break) (continue)))"]
        );
    }

    #[test]
    fn test_class_declaration() {
        assert_eq!(
            parse_ok("class B : A { init(x) { this.x = x; } get() { return super.get(); } }"),
            vec!["(class B : A (fun init (x) (body (; (= (. this x) x)))) (fun get () (body (return (call (super get))))))"]
        );
    }

    #[test]
    fn test_keyword_followed_by_semicolon_is_an_error() {
        for source in ["print;", "assert;", "del;"] {
            assert_eq!(
                messages(source),
                vec!["Expected an expression before end of statement (received ';')."],
                "source: {}",
                source
            );
        }

        assert!(parse("fun f() { return; }").is_ok());
        assert!(parse("while (true) { break; }").is_ok());
    }

    #[test]
    fn test_else_cannot_start_a_statement() {
        assert_eq!(
            messages("else print 1;"),
            vec!["'else' cannot start a statement."]
        );
    }

    #[test]
    fn test_assert_message_must_be_literal() {
        assert_eq!(
            messages("assert x, y;"),
            vec!["Messages must be runtime constants."]
        );
    }

    #[test]
    fn test_recovery_reports_each_broken_statement() {
        let errors = parse("var = 1;\nprint 2;\nvar x = ;\nprint 3;").expect_err("two errors");

        assert_eq!(errors.len(), 2);

        let lines: Vec<usize> = errors
            .iter()
            .filter_map(|e| e.diagnostic().map(|d| d.line))
            .collect();
        assert_eq!(lines, vec![1, 3]);
    }

    #[test]
    fn test_unmatched_closer() {
        let errors = messages(") print 1;");

        assert_eq!(errors, vec!["Unmatched ')'."]);
    }

    #[test]
    fn test_argument_cap() {
        let args: Vec<String> = (0..256).map(|i| i.to_string()).collect();
        let source = format!("f({});", args.join(", "));

        assert_eq!(messages(&source), vec!["Can't have more than 255 arguments."]);

        let args: Vec<String> = (0..255).map(|i| i.to_string()).collect();
        assert!(parse(&format!("f({});", args.join(", "))).is_ok());
    }

    #[test]
    fn test_cap_is_reported_once_per_list() {
        let args: Vec<String> = (0..300).map(|i| i.to_string()).collect();
        let source = format!("f({});", args.join(", "));

        assert_eq!(messages(&source), vec!["Can't have more than 255 arguments."]);

        let params: Vec<String> = (0..300).map(|i| format!("p{}", i)).collect();
        let source = format!("fun f({}) {{}}", params.join(", "));

        assert_eq!(messages(&source), vec!["Can't have more than 255 parameters."]);
    }

    #[test]
    fn test_parameter_cap() {
        let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
        let source = format!("fun f({}) {{}}", params.join(", "));

        assert_eq!(messages(&source), vec!["Can't have more than 255 parameters."]);
    }
}
