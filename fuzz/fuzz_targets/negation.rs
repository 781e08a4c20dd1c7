//! Fuzz target for fragment negation.
//!
//! Arbitrary text goes through the bracket scanner, which must never panic.
//! Negating twice must give back the original text whenever the first
//! negation only added a prefix.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_negation
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use trackql_query::Fragment;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let fragment = Fragment::new(input);
        let negated = fragment.negate();
        if !input.starts_with("not ") && negated.as_str() == format!("not {input}") {
            assert_eq!(negated.negate(), fragment);
        }
    }
});
