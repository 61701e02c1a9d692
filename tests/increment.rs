#[macro_use]
mod common;

#[cfg(test)]
mod increment {
    ok_test!(
        prefix_increment_variable,
        r#"
            var a = 1;
            print(++a);
            print(a);
        "#,
        ["2", "2"]
    );

    ok_test!(
        prefix_decrement_variable,
        r#"
            var a = 5;
            print(--a);
            print(a);
        "#,
        ["4", "4"]
    );

    ok_test!(
        increment_in_for_loop,
        r#"
            var i = 0;
            while (i < 3) { print(i); ++i; }
        "#,
        ["0", "1", "2"]
    );

    ok_test!(
        increment_on_field,
        r#"
            class Counter { }
            var c = Counter();
            c.value = 0;
            print(++c.value);
            print(++c.value);
            print(c.value);
        "#,
        ["1", "2", "2"]
    );

    err_test!(increment_on_literal, "++1;", "Cannot assign to literal.");

    err_test!(
        increment_on_uninitialized,
        "var a; ++a;",
        "Cannot assign to uninitialized variable."
    );

    err_test!(increment_requires_number, r#"var a = "str"; ++a;"#, "Operand must be a number.");
}
