//! Debug tracing for table construction and the parsing drivers.
//!
//! Mirrors the teacher's `colored`-backed `log`/`logn` macros used to trace
//! GLR parsing: a plain `println!` gated on `debug_assertions` so release
//! builds pay nothing for it. `logn!` omits the trailing newline. Call sites
//! colorize their own labels with `colored::Colorize` the way
//! `rustemo/src/glr/parser.rs` does for "Preparing frontier" / "Reducing".

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! log {
    ($($args:tt)*) => {
        println!($($args)*)
    }
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! log {
    ($($args:tt)*) => {};
}

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! logn {
    ($($args:tt)*) => {
        print!($($args)*)
    }
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! logn {
    ($($args:tt)*) => {};
}
