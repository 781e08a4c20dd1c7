//! Configuration file parsing for `trackql.toml`.
//!
//! ```rust
//! use trackql_query::QueryConfig;
//!
//! let config = QueryConfig::from_str("page_size = 50").unwrap();
//! assert_eq!(config.page_size, Some(50));
//! assert!(!config.debug);
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::{QueryError, QueryResult};
use crate::logging::parse_flag;

const PAGE_SIZE_VAR: &str = "TRACKQL_PAGE_SIZE";
const DEBUG_VAR: &str = "TRACKQL_DEBUG";

/// Defaults applied to statements built by an application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueryConfig {
    /// Number of results fetched per request by select statements.
    #[serde(default)]
    pub page_size: Option<u32>,

    /// Enable debug logging.
    #[serde(default)]
    pub debug: bool,
}

impl QueryConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> QueryResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            QueryError::invalid_configuration(format!("cannot read {}", path.display()))
                .with_source(e)
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> QueryResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            QueryError::invalid_configuration(e.message().to_string()).with_source(e)
        })?;
        config.validate()
    }

    /// Read `TRACKQL_PAGE_SIZE` and `TRACKQL_DEBUG`.
    pub fn from_env() -> QueryResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from any key lookup, such as a map of
    /// environment variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> QueryResult<Self> {
        let page_size = match lookup(PAGE_SIZE_VAR) {
            Some(raw) => Some(raw.trim().parse::<u32>().map_err(|e| {
                QueryError::invalid_configuration(format!("{PAGE_SIZE_VAR}={raw:?} is not a page size"))
                    .with_source(e)
            })?),
            None => None,
        };
        let debug = lookup(DEBUG_VAR).map(|v| parse_flag(&v)).unwrap_or(false);

        Self { page_size, debug }.validate()
    }

    /// Overlay values that are set in `other`.
    pub fn merge(mut self, other: QueryConfig) -> Self {
        if other.page_size.is_some() {
            self.page_size = other.page_size;
        }
        self.debug |= other.debug;
        self
    }

    fn validate(self) -> QueryResult<Self> {
        if self.page_size == Some(0) {
            return Err(QueryError::invalid_configuration("page_size must be greater than zero")
                .with_suggestion("Remove page_size to use the session default"));
        }
        Ok(self)
    }
}
