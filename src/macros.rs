/// Compile a literal regex once per call site and hand out a `&'static Regex`.
///
/// Patterns are string literals checked by the tests, so a compile failure is
/// a programming error rather than an input error.
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).expect("invalid built-in regex"));
        &*RE
    }};
}

/// Union of named `DayMask` flags: `days!(MONDAY, WEDNESDAY)`.
#[cfg(test)]
macro_rules! days {
    ($($day:ident),+ $(,)?) => {
        $crate::DayMask::empty() $(| $crate::DayMask::$day)+
    };
}
