#[macro_use]
mod common;

#[cfg(test)]
mod operator {
    ok_test!(
        add,
        r#"
            print(123 + 456);
            print("str" + "ing");
        "#,
        ["579", "string"]
    );

    err_test!(add_mismatched_types, "true + nil;", "Operands must be two numbers or two strings.");

    ok_test!(
        comparison,
        r#"
            print(1 < 2);
            print(2 < 2);
            print(2 <= 2);
            print(2 > 1);
            print(1 > 2);
            print("a" < "b");
        "#,
        ["true", "false", "true", "true", "false", "true"]
    );

    err_test!(comparison_mismatched_types, r#"1 < "1";"#, "Operands must be two numbers or two strings.");

    ok_test!(
        divide,
        r#"
            print(8 / 2);
            print(5 / 2);
        "#,
        ["4", "2.5"]
    );

    err_test!(divide_by_zero, "print(1 / 0);", "Division by zero.");
    err_test!(divide_type_error, "true / 1;", "Operands must be numbers.");

    ok_test!(
        equals,
        r#"
            print(1 == 1);
            print(1 == 2);
            print("str" == "str");
            print(nil == nil);
            print(1 == "1");
            print(nil == false);
        "#,
        ["true", "false", "true", "true", "false", "false"]
    );

    ok_test!(
        multiply,
        r#"
            print(5 * 3);
            print(2.5 * 2);
        "#,
        ["15", "5"]
    );

    err_test!(multiply_type_error, "true * 1;", "Operands must be numbers.");

    ok_test!(
        negate,
        r#"
            print(-3);
            print(-(-3));
        "#,
        ["-3", "3"]
    );

    err_test!(negate_type_error, r#"-"str";"#, "Operand must be a number.");

    ok_test!(
        not,
        r#"
            print(!true);
            print(!false);
            print(!!true);
            print(!123);
        "#,
        ["false", "true", "true", "false"]
    );

    ok_test!(
        subtract,
        r#"
            print(4 - 3);
            print(3 - 4);
        "#,
        ["1", "-1"]
    );

    err_test!(subtract_type_error, r#""1" - "2";"#, "Operands must be numbers.");

    ok_test!(modulo, "print(7 % 3);", ["1"]);
    err_test!(modulo_by_zero, "print(5 % 0);", "Division by zero.");
    ok_test!(exponent, "print(2 ** 10);", ["1024"]);
    ok_test!(exponent_is_left_associative, "print(2 ** 3 ** 2);", ["64"]);

    ok_test!(
        bitwise,
        r#"
            print(6 & 3);
            print(6 | 1);
            print(5 ^ 1);
            print(1 << 4);
            print(256 >> 4);
            print(~0);
            print(~5);
        "#,
        ["2", "7", "4", "16", "16", "-1", "-6"]
    );
}
