#[macro_use]
mod common;

#[cfg(test)]
mod _return {
    ok_test!(
        after_else,
        r#"
            fn f() { if (false) "no"; else return "ok"; print("bad"); }
            print(f());
        "#,
        ["ok"]
    );

    ok_test!(
        after_if,
        r#"
            fn f() { if (true) return "ok"; print("bad"); }
            print(f());
        "#,
        ["ok"]
    );

    ok_test!(
        after_while,
        r#"
            fn f() { while (true) return "ok"; print("bad"); }
            print(f());
        "#,
        ["ok"]
    );

    err_test!(at_top_level, "return 1;", "Can't return from top-level code.");

    ok_test!(in_function, r#"fn f() { return "ok"; } print(f());"#, ["ok"]);

    ok_test!(
        in_method,
        r#"
            class Foo { method() { return "ok"; } }
            print(Foo().method());
        "#,
        ["ok"]
    );

    ok_test!(return_nil_if_no_value, "fn f() { return; } print(f());", ["nil"]);
}
