#[macro_use]
mod common;

#[cfg(test)]
mod ternary {
    ok_test!(true_branch, r#"print(true ? "yes" : "no");"#, ["yes"]);
    ok_test!(false_branch, r#"print(false ? "yes" : "no");"#, ["no"]);
    ok_test!(truthy_condition, r#"print(1 ? "yes" : "no");"#, ["yes"]);

    ok_test!(
        right_associative_nesting,
        r#"print(false ? "a" : true ? "b" : "c");"#,
        ["b"]
    );

    ok_test!(
        only_taken_branch_evaluates,
        r#"
            fn bad() { print("should not run"); return "bad"; }
            print(true ? "good" : bad());
        "#,
        ["good"]
    );

    err_test!(missing_colon, "1 ? 2 3;", "Expect ':' after ternary then-branch.");
}
