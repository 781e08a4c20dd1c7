//! Fuzz target for the `trackql.toml` parser.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_config_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use trackql_query::QueryConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Invalid input must surface as an error, never a panic.
        if let Ok(config) = QueryConfig::from_str(input) {
            assert_ne!(config.page_size, Some(0));
        }
    }
});
