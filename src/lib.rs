//! # trackql
//!
//! Write queries and event subscriptions for a production-tracking service
//! as Rust expressions instead of hand-assembled strings.
//!
//! trackql provides:
//! - Attribute expressions whose comparisons produce condition text
//! - `and_!`/`or_!`/`not_!` combinators that bracket only where needed
//! - Select, create, update and delete statements
//! - The compact event-subscription grammar under [`event`]
//!
//! ## Quick Start
//!
//! ```rust
//! use trackql::prelude::*;
//!
//! let shot = attr("parent.name").equals("Shot 010");
//! let stmt = select(["Task.name", "Task.status"])?
//!     .where_(and_!(shot, or_!(attr("version").gt(3), version = 1)?)?)?
//!     .order_by(attr("name").desc());
//!
//! assert_eq!(
//!     stmt.to_string(),
//!     r#"select name, status from Task where parent.name is "Shot 010" and (version > 3 or version is 1) order by name descending"#
//! );
//! # Ok::<(), trackql::QueryError>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub use trackql_query::*;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use trackql_query::prelude::*;
    pub use trackql_query::{QueryConfig, Subquery};
}
