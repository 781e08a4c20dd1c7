//! Fuzz target for structured condition building.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_combinators
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use trackql_query::{Args, Compare, Value, and_, attr, or_};

#[derive(Debug, Arbitrary)]
enum FuzzValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<FuzzValue> for Value {
    fn from(value: FuzzValue) -> Self {
        match value {
            FuzzValue::None => Value::None,
            FuzzValue::Bool(v) => Value::from(v),
            FuzzValue::Int(v) => Value::from(v),
            FuzzValue::Float(v) => Value::from(v),
            FuzzValue::Text(v) => Value::from(v),
        }
    }
}

#[derive(Debug, Arbitrary)]
struct FuzzTerm {
    path: String,
    greater: bool,
    value: FuzzValue,
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    terms: Vec<FuzzTerm>,
    keywords: Vec<(String, FuzzValue)>,
}

fuzz_target!(|input: FuzzInput| {
    let mut args = Args::new();
    let mut or_args = Args::new();
    for term in input.terms {
        let expr = attr(&term.path);
        let value = Value::from(term.value);
        let fragment = if term.greater {
            expr.gt(value)
        } else {
            expr.equals(value)
        };
        args = args.arg(fragment.clone());
        or_args = or_args.arg(fragment);
    }
    for (key, value) in input.keywords {
        let value = Value::from(value);
        args = args.kw(key.as_str(), value.clone());
        or_args = or_args.kw(key.as_str(), value);
    }

    // Neither combinator can fail without entities or sub-queries.
    let joined = and_(args).expect("and_ failed");
    let grouped = or_(or_args).expect("or_ failed");
    let _ = joined.negate();
    let _ = grouped.negate();
});
