#[cfg(test)]
mod class_tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rox as lox;

    use lox::config::Config;
    use lox::error::Reporter;
    use lox::Lox;

    fn run(source: &str) -> (String, Vec<String>) {
        let sink: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
        let reporter = Reporter::default();
        let mut session = Lox::with_parts(Config::default(), reporter.clone(), sink.clone());

        session.run(source);

        let output = String::from_utf8(sink.borrow().clone()).expect("output is UTF-8");
        let messages = reporter.take().into_iter().map(|d| d.message).collect();

        (output, messages)
    }

    fn output_of(source: &str) -> String {
        let (output, messages) = run(source);
        assert!(messages.is_empty(), "unexpected diagnostics: {:?}", messages);

        output
    }

    const POINT: &str = r#"
        class Point {
            init(x, y) { this.x = x; this.y = y; }
            sum() { return this.x + this.y; }
        }
    "#;

    #[test]
    fn test_initializer_and_methods() {
        let source = format!("{} var p = Point(1, 2); print p.sum(), p.x;", POINT);

        assert_eq!(output_of(&source), "3,1\n");
    }

    #[test]
    fn test_calling_init_returns_the_instance() {
        let source = format!(
            "{} var p = Point(1, 2); var q = p.init(5, 5); print q == p, p.sum();",
            POINT
        );

        assert_eq!(output_of(&source), "true,10\n");
    }

    #[test]
    fn test_bare_return_in_init_still_yields_instance() {
        let source = r#"
            class A { init() { this.v = 1; return; this.v = 2; } }
            print A().v;
        "#;

        assert_eq!(output_of(source), "1\n");
    }

    #[test]
    fn test_super_dispatch_walks_the_chain() {
        let source = r#"
            class A { greet() { return "A"; } name() { return "a"; } }
            class B : A { greet() { return "B" + super.greet(); } }
            class C : B { greet() { return "C" + super.greet(); } }
            print C().greet(), C().name();
        "#;

        assert_eq!(output_of(source), "CBA,a\n");
    }

    #[test]
    fn test_inherited_initializer_sets_arity() {
        let source = r#"
            class A { init(x) { this.x = x; } }
            class B : A {}
            print B(7).x;
            B();
        "#;

        let (output, messages) = run(source);

        assert_eq!(output, "7\n");
        assert_eq!(messages, vec!["Expected 1 arguments but got 0."]);
    }

    #[test]
    fn test_fields_shadow_methods() {
        let source = r#"
            class A { m() { return 1; } }
            var a = A();
            print a.m();
            a.m = 5;
            print a.m;
        "#;

        assert_eq!(output_of(source), "1\n5\n");
    }

    #[test]
    fn test_bound_methods_remember_this() {
        let source = r#"
            class A {
                init() { this.v = 1; }
                get() { return this.v; }
                nested() { fun g() { return this.v + 1; } return g(); }
            }
            var get = A().get;
            print get(), A().nested();
        "#;

        assert_eq!(output_of(source), "1,2\n");
    }

    #[test]
    fn test_instances_compare_by_identity() {
        let source = "class A {} var a = A(); var b = a; print a == b, A() == A();";

        assert_eq!(output_of(source), "true,false\n");
    }

    #[test]
    fn test_class_refers_to_itself() {
        let source = "class N { make() { return N(); } } print N().make();";

        assert_eq!(output_of(source), "<class N instance>\n");
    }

    #[test]
    fn test_property_errors() {
        assert_eq!(
            run("class A {} print A().nope;").1,
            vec!["Undefined property 'nope'."]
        );
        assert_eq!(
            run("var n = 1; print n.x;").1,
            vec!["Only instances have properties."]
        );
        assert_eq!(
            run("var n = 1; n.x = 2;").1,
            vec!["Only instances have fields."]
        );
    }

    #[test]
    fn test_superclass_must_be_a_class() {
        let (output, messages) = run("var X = 1; class A : X {} print \"after\";");

        assert_eq!(output, "after\n");
        assert_eq!(messages, vec!["Inherited classes must also be classes."]);
    }

    #[test]
    fn test_missing_super_method() {
        let source = r#"
            class A {}
            class B : A { f() { return super.nope(); } }
            B().f();
        "#;

        assert_eq!(run(source).1, vec!["Undefined property 'nope'."]);
    }

    #[test]
    fn test_self_inheritance_is_static_error() {
        let (output, messages) = run("class A : A {} print 1;");

        assert_eq!(output, "");
        assert_eq!(messages, vec!["A class can't inherit from itself."]);
    }
}
