#[macro_use]
mod common;

#[cfg(test)]
mod misc {
    ok_test!(empty_program, "", []);

    ok_test!(
        arithmetic_precedence,
        r#"
            print(1 + 2 * 3);
            print((1 + 2) * 3);
        "#,
        ["7", "9"]
    );

    err_test!(unexpected_character, "@", "Unexpected character '@'.");
}
