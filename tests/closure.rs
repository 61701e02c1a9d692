#[macro_use]
mod common;

#[cfg(test)]
mod closure {
    ok_test!(
        counter_closure,
        r#"
            fn makeCounter() {
                var i = 0;
                fn count() { i = i + 1; return i; }
                return count;
            }
            var counter = makeCounter();
            print(counter());
            print(counter());
            print(counter());
        "#,
        ["1", "2", "3"]
    );

    ok_test!(
        reference_closure_multiple_times,
        r#"
            fn f() {
                var a = "a";
                fn g() { print(a); print(a); }
                g();
            }
            f();
        "#,
        ["a", "a"]
    );

    ok_test!(
        assign_to_closure,
        r#"
            var f; var g;
            {
                var local = "local";
                fn f_() { print(local); local = "after f"; print(local); }
                f = f_;
                fn g_() { print(local); local = "after g"; print(local); }
                g = g_;
            }
            f();
            g();
        "#,
        ["local", "after f", "after f", "after g"]
    );

    ok_test!(
        close_over_later_variable,
        r#"
            fn f() {
                var a = "a";
                var b = "b";
                fn g() { print(b); print(a); }
                g();
            }
            f();
        "#,
        ["b", "a"]
    );

    ok_test!(
        nested_closures,
        r#"
            fn f() {
                var a = "a";
                fn g() {
                    var b = "b";
                    fn h() {
                        var c = "c";
                        fn i() { print(a); print(b); print(c); }
                        i();
                    }
                    h();
                }
                g();
            }
            f();
        "#,
        ["a", "b", "c"]
    );

    ok_test!(
        shadow_closure_with_local,
        r#"
            {
                var a = "closure";
                fn f() { print(a); }
                { var a = "shadow"; print(a); f(); }
                print(a);
            }
        "#,
        ["shadow", "closure", "closure"]
    );
}
