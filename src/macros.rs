// src/macros.rs
#[macro_export]
macro_rules! s {
    // String shorthand!

    // Zero-arg → String::new()
    () => {
        ::std::string::String::new()
    };
    // Any single expression: literals, consts, vars
    ($expr:expr) => {
        ::std::string::String::from($expr)
    };
}

#[macro_export]
macro_rules! join {
    // String-type concatenation shorthand!
    ($first:expr $(, $rest:expr)+ $(,)?) => {{
        let mut s = ::std::string::String::from($first);
        $(
            s.push_str($rest);
        )+
        s
    }};
}

/// Record literal shorthand: `record! { "title" => "X", "price" => 5 }`.
/// Values go through `Value::from`, so `&str`, `String`, integers and floats all work.
#[macro_export]
macro_rules! record {
    () => {
        $crate::record::Record::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut r = $crate::record::Record::new();
        $(
            r.set($name, $crate::record::Value::from($value));
        )+
        r
    }};
}
