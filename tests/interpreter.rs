#[cfg(test)]
mod interpreter_tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use rox as lox;

    use lox::config::Config;
    use lox::error::{Diagnostic, Reporter};
    use lox::{Lox, Status};

    /// A session whose program output lands in memory.
    struct Harness {
        session: Lox,
        sink: Rc<RefCell<Vec<u8>>>,
        reporter: Reporter,
    }

    impl Harness {
        fn new(config: Config) -> Self {
            let sink: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
            let reporter = Reporter::default();
            let session = Lox::with_parts(config, reporter.clone(), sink.clone());

            Self {
                session,
                sink,
                reporter,
            }
        }

        fn output(&self) -> String {
            String::from_utf8(self.sink.borrow().clone()).expect("output is UTF-8")
        }

        fn messages(&self) -> Vec<String> {
            self.reporter
                .snapshot()
                .into_iter()
                .map(|d| d.message)
                .collect()
        }
    }

    /// Run `source` in a fresh session; returns (output, diagnostics).
    fn run(source: &str) -> (String, Vec<Diagnostic>) {
        let mut harness = Harness::new(Config::default());
        harness.session.run(source);

        (harness.output(), harness.reporter.take())
    }

    fn output_of(source: &str) -> String {
        let (output, diagnostics) = run(source);
        assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics);

        output
    }

    fn runtime_error_of(source: &str) -> String {
        let (_, diagnostics) = run(source);
        assert_eq!(diagnostics.len(), 1, "diagnostics: {:?}", diagnostics);
        assert_eq!(diagnostics[0].label, "Runtime Error");

        diagnostics[0].message.clone()
    }

    // ───────────────────────── values and operators ─────────────────────────

    #[test]
    fn test_arithmetic_and_number_display() {
        assert_eq!(output_of("print 1 + 2;"), "3\n");
        assert_eq!(output_of("print 3.5, 10 / 4, 7;"), "3.5,2.5,7\n");
        assert_eq!(output_of("print -(2 * 3);"), "-6\n");
        assert_eq!(output_of("print 1 << 4, 256 >> 2, 2 ^ 10, 7 % 3;"), "16,64,1024,1\n");
    }

    #[test]
    fn test_string_and_list_operators() {
        assert_eq!(output_of("print \"ab\" * 3;"), "ababab\n");
        assert_eq!(output_of("print [1, 2] * 2;"), "[1, 2, 1, 2]\n");
        assert_eq!(output_of("print 1 + \"x\";"), "1x\n");
        assert_eq!(output_of("print \"x\" + 1;"), "x1\n");
        assert_eq!(output_of("print 'a' + \"b\";"), "ab\n");
        assert_eq!(output_of("print [1] + 2, [] + [3];"), "[1, 2],[[3]]\n");
    }

    #[test]
    fn test_truthiness() {
        assert_eq!(
            output_of("print !0, !1, !\"\", !null, ![], !false;"),
            "true,false,false,true,false,true\n"
        );
    }

    #[test]
    fn test_logical_and_ternary() {
        assert_eq!(output_of("print null or \"d\", 1 and 2, 0 && 5;"), "d,2,0\n");
        assert_eq!(output_of("print true ? 1 : 2, 0 ? 1 : 2;"), "1,2\n");
        assert_eq!(output_of("print false ? 1 : false ? 2 : 3;"), "3\n");
    }

    #[test]
    fn test_equality() {
        assert_eq!(
            output_of("var l = [1]; print l == l, [1] == [1], \"a\" == \"a\", 1 == \"1\", null == null;"),
            "true,false,true,false,true\n"
        );
    }

    #[test]
    fn test_value_display() {
        assert_eq!(
            output_of("fun f() {} class A {} print f, clock, A, A(), null, true;"),
            "<function f>,<native function clock>,<class A>,<class A instance>,null,true\n"
        );
    }

    #[test]
    fn test_keywords_ignore_case() {
        assert_eq!(output_of("VAR x = NULL; PRINT x;"), "null\n");
    }

    // ───────────────────────── runtime errors ─────────────────────────

    #[test]
    fn test_runtime_error_does_not_stop_the_program() {
        let (output, diagnostics) = run("print 1; print -\"x\"; print 2;");

        assert_eq!(output, "1\n2\n");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Only numbers have negative values.");
        assert_eq!(diagnostics[0].line, 1);
    }

    #[test]
    fn test_runtime_error_messages() {
        assert_eq!(
            runtime_error_of("print 1 - \"a\";"),
            "Both operands must be numbers (received number and string)."
        );
        assert_eq!(
            runtime_error_of("fun f(a, b) {} f(1);"),
            "Expected 2 arguments but got 1."
        );
        assert_eq!(
            runtime_error_of("\"x\"();"),
            "Can only call functions and classes."
        );
        assert_eq!(runtime_error_of("print y;"), "Undefined variable 'y'.");
        assert_eq!(runtime_error_of("y = 1;"), "Undefined variable 'y'.");
        assert_eq!(
            runtime_error_of("print 1 / 0;"),
            "An error occurred while trying to perform division: division by zero."
        );
        assert_eq!(
            runtime_error_of("print 1 % 0;"),
            "An error occurred while trying to perform modulus: modulus by zero."
        );
        assert!(runtime_error_of("print \"a\" * -1;").contains("repetition"));
        assert!(runtime_error_of("print true + 1;").contains("received boolean and number"));
    }

    #[test]
    fn test_repetition_limits() {
        assert_eq!(
            runtime_error_of("print \"a\" * -1;"),
            "An error occurred while trying to perform repetition: count must not be negative."
        );

        let (output, diagnostics) = run("print \"ab\" * 100000000000000000000; print 1;");
        assert_eq!(output, "1\n");
        assert_eq!(
            diagnostics[0].message,
            "An error occurred while trying to perform repetition: count is too large."
        );

        let (output, diagnostics) = run("print [1, 2] * 100000000000000000000; print 2;");
        assert_eq!(output, "2\n");
        assert!(diagnostics[0].message.contains("repetition"));

        assert_eq!(
            runtime_error_of("print \"ab\" * 2000000000;"),
            "An error occurred while trying to perform repetition: result is too large."
        );
        assert_eq!(output_of("print [] * 2000000000, \"\" * 3;"), "[],\n");
    }

    #[test]
    fn test_assert() {
        assert_eq!(runtime_error_of("assert 1 == 2, \"math\";"), "Assertion failed: math");
        assert_eq!(runtime_error_of("assert false;"), "Assertion failed");
        assert_eq!(output_of("assert 1; print \"ok\";"), "ok\n");
    }

    #[test]
    fn test_static_errors_skip_execution() {
        let mut harness = Harness::new(Config::default());

        assert_eq!(
            harness.session.execute("print \"never\"; print 1"),
            Status::StaticErrors
        );
        assert_eq!(harness.output(), "");
        assert_eq!(harness.reporter.snapshot()[0].label, "Parsing Error");
    }

    // ───────────────────────── scoping ─────────────────────────

    #[test]
    fn test_closures_capture_their_scope() {
        let source = r#"
            fun makeCounter() {
                var i = 0;
                fun count() { i = i + 1; return i; }
                return count;
            }
            var c = makeCounter();
            c();
            print c();
        "#;

        assert_eq!(output_of(source), "2\n");
    }

    #[test]
    fn test_resolution_is_static() {
        let source = r#"
            var a = "global";
            {
                fun show() { print a; }
                show();
                var a = "block";
                show();
            }
        "#;

        assert_eq!(output_of(source), "global\nglobal\n");
    }

    #[test]
    fn test_recursion() {
        let source = "fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); } print fib(15);";

        assert_eq!(output_of(source), "610\n");
    }

    #[test]
    fn test_del_uncovers_outer_binding() {
        assert_eq!(
            output_of("var a = 1; { var a = 2; del a; print a; }"),
            "1\n"
        );
        assert_eq!(output_of("del nothing; print \"fine\";"), "fine\n");
    }

    #[test]
    fn test_conditional_del_keeps_the_binding_in_scope() {
        let source = r#"
            var a = "outer";
            {
                var a = "inner";
                if (false) del a;
                print a;
            }
        "#;

        assert_eq!(output_of(source), "inner\n");

        assert_eq!(
            runtime_error_of("var a = 1; { var a = 2; if (true) del a; print a; }"),
            "Undefined variable 'a'."
        );
    }

    #[test]
    fn test_defined_checks_current_scope_only() {
        let source = r#"
            var x = 1;
            print defined("x");
            {
                print defined("x");
                var y;
                print defined("y");
            }
        "#;

        assert_eq!(output_of(source), "true\nfalse\ntrue\n");
    }

    // ───────────────────────── control flow ─────────────────────────

    #[test]
    fn test_break_and_continue() {
        let source = r#"
            for (var i = 0; i < 5; i = i + 1) {
                if (i == 1) continue;
                if (i == 3) break;
                print i;
            }
        "#;

        assert_eq!(output_of(source), "0\n2\n");
    }

    #[test]
    fn test_break_only_leaves_innermost_loop() {
        let source = r#"
            var i = 0;
            while i < 2 {
                while true { break; }
                print i;
                i = i + 1;
            }
        "#;

        assert_eq!(output_of(source), "0\n1\n");
    }

    #[test]
    fn test_return_from_inside_loop() {
        assert_eq!(
            output_of("fun f() { while (true) { return 5; } } print f();"),
            "5\n"
        );
    }

    #[test]
    fn test_increment_errors_do_not_end_the_loop() {
        let source = "var n = 0; for (var i = 0; i < 3; n = n + nope) { i = i + 1; print i; }";
        let (output, diagnostics) = run(source);

        assert_eq!(output, "1\n2\n3\n");
        assert_eq!(diagnostics.len(), 3);
        assert!(diagnostics
            .iter()
            .all(|d| d.message == "Undefined variable 'nope'."));
    }

    #[test]
    fn test_break_outside_loop_is_a_runtime_error() {
        let (output, diagnostics) = run("break; print 1;");
        assert_eq!(output, "1\n");
        assert_eq!(diagnostics[0].message, "'break' used outside of a loop.");

        let (output, diagnostics) = run("fun f() { continue; } f(); print 2;");
        assert_eq!(output, "2\n");
        assert_eq!(diagnostics[0].message, "'continue' used outside of a loop.");
    }

    // ───────────────────────── collation and halting ─────────────────────────

    #[test]
    fn test_identical_errors_are_collated() {
        let (_, diagnostics) = run("for (var i = 0; i < 30; i = i + 1) { print -\"x\"; }");

        assert_eq!(diagnostics.len(), 9);
        assert_eq!(diagnostics[0].note, None);
        assert_eq!(
            diagnostics[8].note.as_deref(),
            Some("[30 similar errors have been collated]")
        );
    }

    #[test]
    fn test_new_message_resets_collation() {
        let (_, diagnostics) = run("print -\"x\"; print -\"x\"; print y; print -\"x\";");

        let notes: Vec<bool> = diagnostics.iter().map(|d| d.note.is_some()).collect();
        assert_eq!(notes, vec![false, true, false, false]);
    }

    #[test]
    fn test_runaway_errors_halt() {
        let mut harness = Harness::new(Config::default());

        assert_eq!(
            harness.session.execute("while (true) { print -\"x\"; } print \"unreached\";"),
            Status::Halted
        );
        assert_eq!(harness.output(), "");

        let last = harness.reporter.snapshot().pop().expect("a fatal diagnostic");
        assert_eq!(last.label, "No-Good-Very-Bad Error");
    }

    #[test]
    fn test_loop_watchdog_halts() {
        let config = Config::default().with_loop_timeout(Some(Duration::from_millis(20)));
        let mut harness = Harness::new(config);

        assert_eq!(harness.session.execute("while (true) {}"), Status::Halted);

        let last = harness.reporter.snapshot().pop().expect("a timeout diagnostic");
        assert_eq!(last.label, "Timeout Error");
    }

    // ───────────────────────── sessions and natives ─────────────────────────

    #[test]
    fn test_trace_of_a_run() {
        let mut harness = Harness::new(Config::default());

        let trace = harness.session.run("1 + 1; var a = 3; print a; a;");

        assert_eq!(trace.as_deref(), Some("2\nvar a: 3\n3"));
        assert_eq!(harness.output(), "3\n");
    }

    #[test]
    fn test_fresh_sessions_agree() {
        let source = r#"
            class Counter {
                init() { this.n = 0; }
                bump() { this.n = this.n + 1; return this; }
            }
            var c = Counter();
            for (var i = 0; i < 4; i = i + 1) c.bump();
            print c.n, [1, "two"] + 3, 7 / 2;
            print nope;
            print "done";
        "#;

        let (first_output, first_diagnostics) = run(source);
        let (second_output, second_diagnostics) = run(source);

        assert_eq!(first_output, "4,[1, two, 3],3.5\ndone\n");
        assert_eq!(first_output, second_output);
        assert_eq!(first_diagnostics, second_diagnostics);
    }

    #[test]
    fn test_globals_persist_between_runs() {
        let mut harness = Harness::new(Config::default());

        harness.session.run("var a = 1; fun get() { var x = a; return x; }");
        harness.session.run("a = a + 1;");
        harness.session.run("print get();");

        assert_eq!(harness.output(), "2\n");
        assert!(harness.messages().is_empty());
    }

    #[test]
    fn test_clear_empties_globals_but_keeps_natives() {
        let mut harness = Harness::new(Config::default());

        harness.session.run("var a = 1;");
        harness.session.clear();
        harness.session.run("print a;");
        harness.session.run("print clock() > 0;");

        assert_eq!(harness.messages(), vec!["Undefined variable 'a'."]);
        assert_eq!(harness.output(), "true\n");
    }

    #[test]
    fn test_natives() {
        assert_eq!(output_of("print str(3) + \"!\";"), "3!\n");
        assert_eq!(output_of("var r = random(); print r >= 0 and r < 1;"), "true\n");
        assert_eq!(output_of("print clock() > 1000000000;"), "true\n");
    }

    #[test]
    fn test_exec_runs_nested_program() {
        assert_eq!(
            output_of("print exec(\"print 1; 1 + 2;\");"),
            "1\n3\n"
        );
    }

    #[test]
    fn test_exec_reports_nested_failure() {
        let (output, diagnostics) = run("print exec(\"var;\");");

        assert_eq!(output, "null\n");

        let messages: Vec<&str> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["Expected variable name.", "Previous error occurred in exec statement"]
        );
    }

    #[test]
    fn test_introspection() {
        let config = Config::default().with_introspection(true);
        let mut harness = Harness::new(config);

        harness.session.run("print #(1 + 2);");

        assert_eq!(
            harness.output(),
            "|------------------------------------\n\
             | (group (+ 1.0 2.0)): number\n\
             | evaluated: 3\n\
             |------------------------------------\n\
             true\n"
        );

        assert_eq!(output_of("print #(1 + 2);"), "null\n");
    }

    #[test]
    fn test_evaluate_expression() {
        let mut harness = Harness::new(Config::default());

        harness.session.run("var base = 40;");

        let value = harness.session.evaluate_expression("base + 2");
        assert_eq!(value.map(|v| v.to_string()), Some("42".to_owned()));

        assert!(harness.session.evaluate_expression("-\"x\"").is_none());
        assert_eq!(harness.messages(), vec!["Only numbers have negative values."]);
    }
}
