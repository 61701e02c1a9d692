#[macro_use]
mod common;

#[cfg(test)]
mod _if {
    err_test!(class_in_then, "if (true) class Foo {}", "Expect expression.");
    err_test!(class_in_else, "if (false) 1; else class Foo {}", "Expect expression.");
    err_test!(var_in_then, "if (true) var a = 1;", "Expect expression.");
    err_test!(var_in_else, "if (false) 1; else var a = 1;", "Expect expression.");

    ok_test!(
        dangling_else,
        "if (true) if (false) print(\"bad\"); else print(\"good\");",
        ["good"]
    );

    ok_test!(
        else_flow,
        r#"
            if (true) print("good"); else print("bad");
            if (false) print("bad"); else print("good");
            if (false) print("bad1"); else if (false) print("bad2"); else print("block");
        "#,
        ["good", "good", "block"]
    );

    ok_test!(
        truth,
        r#"
            if (false) print("bad"); else print("false falsy");
            if (nil) print("bad"); else print("nil falsy");
            if (true) print("true truthy");
            if (0) print("zero truthy");
            if ("") print("empty truthy");
        "#,
        ["false falsy", "nil falsy", "true truthy", "zero truthy", "empty truthy"]
    );
}
