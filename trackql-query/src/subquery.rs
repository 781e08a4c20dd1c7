//! Protocols for sub-queries and the sessions that execute them.
//!
//! Nothing in this crate talks to the remote service. A [`Session`] is
//! supplied by the caller and is only reached when a sub-query has to be
//! resolved to a single entity while another query is being built.

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::error::{QueryError, QueryResult};
use crate::fragment::Fragment;
use crate::value::{EntityRef, Value};

/// An unexecuted query whose filters can be reused inside another query.
pub trait Subquery {
    /// The filter terms accumulated so far.
    fn filters(&self) -> &[Fragment];

    /// Execute the query and return its only result.
    ///
    /// Fails with [`crate::ErrorCode::AmbiguousSubqueryResult`] when the
    /// query yields zero or several results.
    fn one(&self) -> QueryResult<EntityRef>;
}

/// Attribute values written by create and update statements.
pub type Values = IndexMap<SmolStr, Value>;

/// Executes finished statements against the remote service.
///
/// None of these calls commit anything; committing is left to the caller.
pub trait Session: Send + Sync {
    /// Run a query and return the matching entities.
    fn query(&self, query: &str, page_size: Option<u32>) -> QueryResult<Vec<EntityRef>>;

    /// Create an entity with the given attribute values.
    fn create(&self, entity_type: &str, values: &Values) -> QueryResult<EntityRef>;

    /// Set attribute values on an existing entity.
    fn update(&self, entity: &EntityRef, values: &Values) -> QueryResult<()>;

    /// Delete an entity.
    fn delete(&self, entity: &EntityRef) -> QueryResult<()>;
}

/// Demand exactly one entity from a result set.
pub fn exactly_one(mut results: Vec<EntityRef>, query: &str) -> QueryResult<EntityRef> {
    match results.len() {
        1 => Ok(results.remove(0)),
        found => Err(QueryError::ambiguous_subquery(found, query)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_exactly_one() {
        let task = EntityRef::new("Task", "1");
        assert_eq!(exactly_one(vec![task.clone()], "Task").unwrap(), task);

        let err = exactly_one(Vec::new(), "Task").unwrap_err();
        assert_eq!(err.code, ErrorCode::AmbiguousSubqueryResult);

        let err = exactly_one(vec![task.clone(), task], "Task").unwrap_err();
        assert_eq!(err.code, ErrorCode::AmbiguousSubqueryResult);
        assert_eq!(err.context.query.as_deref(), Some("Task"));
    }
}
