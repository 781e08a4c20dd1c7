//! # trackql-query
//!
//! Build query strings for a production-tracking service from native
//! expressions.
//!
//! This crate provides:
//! - Attribute expressions with dotted paths (`parent.name`)
//! - Comparisons that produce condition text instead of booleans
//! - `and`/`or`/`not` combinators with minimal bracketing
//! - Select, create, update and delete statements
//! - A second, compact grammar for event subscriptions
//!
//! ## Conditions
//!
//! ```rust
//! use trackql_query::{and_, or_, attr, Compare};
//!
//! let version = attr("version");
//! let f = and_!(version.gt(3), name = "comp").unwrap();
//! assert_eq!(f.to_string(), r#"version > 3 and name is "comp""#);
//!
//! // `or` groups are bracketed so they survive nesting.
//! let f = or_!(version.gt(3), version = 1).unwrap();
//! assert_eq!(f.to_string(), "(version > 3 or version is 1)");
//! assert_eq!((!f).to_string(), "not (version > 3 or version is 1)");
//! ```
//!
//! ## Statements
//!
//! ```rust
//! use trackql_query::{attr, select, Compare};
//!
//! let stmt = select(["Task.name"]).unwrap()
//!     .where_(attr("parent.name").equals("Shot 1")).unwrap()
//!     .limit(5);
//! assert_eq!(stmt.to_string(), r#"select name from Task where parent.name is "Shot 1" limit 5"#);
//! ```
//!
//! ## Events
//!
//! ```rust
//! use trackql_query::{event, Compare};
//!
//! assert_eq!(event::attr("topic").equals("ftrack.update").to_string(), r#"topic="ftrack.update""#);
//! ```

pub mod combinator;
pub mod config;
pub mod error;
pub mod event;
pub mod expression;
pub mod fragment;
pub mod logging;
#[macro_use]
pub mod macros;
pub mod parser;
pub mod statement;
pub mod subquery;
pub mod types;
pub mod value;

pub use combinator::{and_, or_, Join, AND, OR};
pub use config::QueryConfig;
pub use error::{ErrorCode, ErrorContext, QueryError, QueryResult, Suggestion};
pub use expression::{attr, Compare, Dialect, Expression, Namespace, Operator, ENTITY};
pub use fragment::{not_, Fragment};
pub use logging::{is_debug_enabled, LogFormat};
pub use parser::{Args, Input, Keyword, Parser, Terms};
pub use statement::{create, delete, select, update, Create, Delete, Select, Update};
pub use subquery::{Session, Subquery, Values};
pub use types::{OrderTerm, SortOrder};
pub use value::{Entity, EntityRef, Value};

/// Everything needed to write queries.
pub mod prelude {
    pub use crate::{and_, args, not_, or_};
    pub use crate::{
        attr, create, delete, event, select, update, Args, Compare, EntityRef, Fragment,
        OrderTerm, QueryError, QueryResult, Select, Session, Value,
    };
}
