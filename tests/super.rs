#[macro_use]
mod common;

#[cfg(test)]
mod _super {
    ok_test!(
        call_other_method,
        r#"
            class Base { foo() { print("Base.foo()"); } }
            class Derived < Base {
                bar() { print("Derived.bar()"); super.foo(); }
            }
            Derived().bar();
        "#,
        ["Derived.bar()", "Base.foo()"]
    );

    ok_test!(
        call_same_method,
        r#"
            class Base { foo() { print("Base.foo()"); } }
            class Derived < Base {
                foo() { print("Derived.foo()"); super.foo(); }
            }
            Derived().foo();
        "#,
        ["Derived.foo()", "Base.foo()"]
    );

    ok_test!(
        constructor_chain,
        r#"
            class Base {
                Base(a, b) { print("Base.Base(" + a + ", " + b + ")"); }
            }
            class Derived < Base {
                Derived() { super("a", "b"); print("Derived.Derived()"); }
            }
            Derived();
        "#,
        ["Base.Base(a, b)", "Derived.Derived()"]
    );

    err_test!(
        extra_arguments,
        r#"
            class Base { foo(a, b) {} }
            class Derived < Base { bar() { super.foo(1, 2, 3, 4); } }
            Derived().bar();
        "#,
        "Expected 2 arguments but got 4."
    );

    ok_test!(
        indirectly_inherited,
        r#"
            class A { foo() { print("A.foo()"); } }
            class B < A {}
            class C < B { foo() { print("C.foo()"); super.foo(); } }
            C().foo();
        "#,
        ["C.foo()", "A.foo()"]
    );

    err_test!(
        missing_arguments,
        r#"
            class Base { foo(a, b) {} }
            class Derived < Base { bar() { super.foo(1); } }
            Derived().bar();
        "#,
        "Expected 2 arguments but got 1."
    );

    err_test!(
        no_superclass_bind,
        r#"
            class Base {
                foo() { var x = super.toString; }
            }
        "#,
        "Can't use 'super' in a class with no superclass."
    );

    err_test!(
        no_superclass_method,
        r#"
            class Base {
                foo() { super.doesNotExist(1); }
            }
        "#,
        "Can't use 'super' in a class with no superclass."
    );

    err_test!(super_at_top_level, "super.foo();", "Can't use 'super' outside of a class.");

    err_test!(
        super_in_top_level_function,
        "fn f() { super.foo(); }",
        "Can't use 'super' outside of a class."
    );

    ok_test!(
        super_in_inherited_method,
        r#"
            class A { a() { print("A"); } }
            class B < A { test() { super.a(); } }
            class C < B {}
            C().test();
        "#,
        ["A"]
    );

    err_test!(
        bare_super_call_not_first_statement,
        r#"
            class Base { Base() {} }
            class Derived < Base {
                Derived() { print("before"); super(); }
            }
        "#,
        "A chain-constructor 'super' call may appear only as the first statement of an initializer."
    );

    err_test!(
        bare_super_call_nested_in_block_is_not_first_statement,
        r#"
            class Base { Base() {} }
            class Derived < Base {
                Derived() { this.y = 2; { super(); } }
            }
        "#,
        "A chain-constructor 'super' call may appear only as the first statement of an initializer."
    );

    err_test!(
        bare_super_call_deeply_nested_in_block_is_not_first_statement,
        r#"
            class Base { Base() {} }
            class Derived < Base {
                Derived() { { this.y = 2; super(); } }
            }
        "#,
        "A chain-constructor 'super' call may appear only as the first statement of an initializer."
    );

    ok_test!(
        bare_super_call_as_sole_statement_of_leading_block,
        r#"
            class Base { Base(a) { print("Base.Base(" + a + ")"); } }
            class Derived < Base {
                Derived() { { super("a"); } print("Derived.Derived()"); }
            }
            Derived();
        "#,
        ["Base.Base(a)", "Derived.Derived()"]
    );

    ok_test!(
        bare_super_call_as_literal_first_statement,
        r#"
            class Base { Base(a) { print("Base.Base(" + a + ")"); } }
            class Derived < Base {
                Derived() { super("a"); print("Derived.Derived()"); }
            }
            Derived();
        "#,
        ["Base.Base(a)", "Derived.Derived()"]
    );

    ok_test!(
        this_in_superclass_method,
        r#"
            class Base {
                init() { this.a = "a"; }
                getA() { return this.a; }
            }
            class Derived < Base {
                getADerived() { return super.getA(); }
            }
            var derived = Derived();
            derived.init();
            print(derived.getADerived());
        "#,
        ["a"]
    );
}
