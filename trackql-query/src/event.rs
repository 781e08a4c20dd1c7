//! Event subscription expressions.
//!
//! Subscriptions share the condition algebra of entity queries but write
//! comparisons without spaces (`a=1`, `a!=1`). Keyword and map arguments given
//! to this module's combinators use the same compact form.
//!
//! ```rust
//! use trackql_query::{event, Args, Compare};
//!
//! let topic = event::attr("topic").call("ftrack.update");
//! let user = event::attr("data.user.name").not_equals("admin");
//! let subscription = event::and_(Args::new().arg(topic).arg(user)).unwrap();
//! assert_eq!(
//!     subscription.to_string(),
//!     r#"topic="ftrack.update" and data.user.name!="admin""#
//! );
//! ```

use crate::combinator::Join;
use crate::error::QueryResult;
use crate::expression::{Dialect, Expression, Namespace};
use crate::fragment::Fragment;
use crate::parser::Args;

/// Root namespace for event attributes.
pub const EVENT: Namespace = Namespace::new(Dialect::Event);

/// `and` for subscriptions, unbracketed.
pub const AND: Join = Join::new("and", false, Dialect::Event);

/// `or` for subscriptions, bracketed.
pub const OR: Join = Join::new("or", true, Dialect::Event);

/// Create an event attribute expression.
pub fn attr(name: &str) -> Expression {
    EVENT.get(name)
}

/// Join terms with `and`.
pub fn and_(args: impl Into<Args>) -> QueryResult<Fragment> {
    AND.combine(args)
}

/// Join terms with `or`, bracketing two or more terms.
pub fn or_(args: impl Into<Args>) -> QueryResult<Fragment> {
    OR.combine(args)
}

/// Negate the disjunction of the terms.
pub fn not_(args: impl Into<Args>) -> QueryResult<Fragment> {
    Ok(OR.combine(args)?.negate())
}
