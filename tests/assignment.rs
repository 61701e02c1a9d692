#[macro_use]
mod common;

#[cfg(test)]
mod assignment {
    ok_test!(
        chained_assignment_is_right_associative,
        r#"
            var a = "a"; var b = "b"; var c = "c";
            a = b = c;
            print(a); print(b); print(c);
        "#,
        ["c", "c", "c"]
    );

    ok_test!(assignment_is_an_expression, "var a = 1; print(a = 2);", ["2"]);

    err_test!(
        invalid_target_grouping,
        r#"var a = "a"; (a) = "value";"#,
        "Invalid assignment target."
    );

    err_test!(
        invalid_target_infix,
        r#"var a = "a"; var b = "b"; a + b = "value";"#,
        "Invalid assignment target."
    );

    err_test!(invalid_target_prefix, r#"var a = "a"; !a = "value";"#, "Invalid assignment target.");

    err_test!(
        invalid_target_this,
        r#"class Foo { bar() { this = "value"; } }"#,
        "Invalid assignment target."
    );

    err_test!(undefined_target, r#"unknown = "value";"#, "Undefined variable 'unknown'.");
}
