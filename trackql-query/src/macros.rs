//! Argument-list macros.
//!
//! Combinators take a mix of positional conditions and `name = value`
//! keywords. These macros build the [`Args`](crate::Args) for them, so
//! call sites read like the query they produce.
//!
//! # Examples
//!
//! ```rust
//! use trackql_query::{and_, or_, not_, attr, Compare};
//!
//! let f = and_!(attr("a").gt(0), b = 5).unwrap();
//! assert_eq!(f.to_string(), "a > 0 and b is 5");
//!
//! let f = or_!(name = "x", name = "y").unwrap();
//! assert_eq!(f.to_string(), r#"(name is "x" or name is "y")"#);
//!
//! let f = not_!(a = 1, b = 2).unwrap();
//! assert_eq!(f.to_string(), "not (a is 1 or b is 2)");
//! ```

/// Build an argument list.
///
/// # Syntax
///
/// - `args![cond]` - Positional input (fragment, text, map, entity, sub-query)
/// - `args![name = value]` - Keyword compared for equality
/// - `args![cond, name = value, ...]` - Any mix; positionals are produced
///   before keywords regardless of the order written
///
/// ```rust
/// use trackql_query::{args, attr, Compare};
///
/// let args = args![attr("a").gt(0), b = 5, c = "x"];
/// assert_eq!(args.len(), 3);
/// assert!(args![].is_empty());
/// ```
#[macro_export]
macro_rules! args {
    (@acc [$args:expr]) => {
        $args
    };

    // Keyword: name = value
    (@acc [$args:expr] $key:ident = $value:expr $(, $($rest:tt)*)?) => {
        $crate::args!(@acc [$args.kw(stringify!($key), $value)] $($($rest)*)?)
    };

    // Positional input
    (@acc [$args:expr] $value:expr $(, $($rest:tt)*)?) => {
        $crate::args!(@acc [$args.arg($value)] $($($rest)*)?)
    };

    ($($tt:tt)*) => {
        $crate::args!(@acc [$crate::parser::Args::new()] $($tt)*)
    };
}

/// Join conditions with `and`.
///
/// ```rust
/// use trackql_query::{and_, attr, Compare};
///
/// let f = and_!(attr("version").gt(3), version = 1).unwrap();
/// assert_eq!(f.to_string(), "version > 3 and version is 1");
/// ```
#[macro_export]
macro_rules! and_ {
    ($($tt:tt)*) => {
        $crate::combinator::and_($crate::args!($($tt)*))
    };
}

/// Join conditions with `or`, bracketing two or more terms.
#[macro_export]
macro_rules! or_ {
    ($($tt:tt)*) => {
        $crate::combinator::or_($crate::args!($($tt)*))
    };
}

/// Negate the `or` of the conditions.
#[macro_export]
macro_rules! not_ {
    ($($tt:tt)*) => {
        $crate::fragment::not_($crate::args!($($tt)*))
    };
}
