//! Select, create, update and delete statements.
//!
//! Statements are thin string assemblies over the condition algebra. Every
//! builder method returns a new statement, leaving the original untouched.
//!
//! ```rust
//! use trackql_query::{attr, select, update, Compare, OrderTerm};
//!
//! let stmt = select(["Task.parent", "Task.children"]).unwrap()
//!     .where_(attr("name").equals("Test")).unwrap()
//!     .order_by(OrderTerm::desc("id"))
//!     .limit(1);
//! assert_eq!(
//!     stmt.to_string(),
//!     r#"select parent, children from Task where name is "Test" order by id descending limit 1"#
//! );
//!
//! let stmt = update("Task").where_(attr("name").equals("Old")).unwrap().set("name", "New");
//! assert_eq!(stmt.to_string(), r#"update Task where name is "Old" set (name='New')"#);
//! ```

use smol_str::SmolStr;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::combinator::AND;
use crate::config::QueryConfig;
use crate::error::{QueryError, QueryResult};
use crate::expression::Dialect;
use crate::fragment::Fragment;
use crate::parser::{Args, Input, Parser};
use crate::subquery::{exactly_one, Session, Subquery, Values};
use crate::types::OrderTerm;
use crate::value::{EntityRef, Value};

/// A select statement.
#[derive(Clone, Default)]
pub struct Select {
    entity_type: SmolStr,
    populate: Vec<SmolStr>,
    filters: Vec<Fragment>,
    sort: Vec<OrderTerm>,
    offset: Option<u64>,
    limit: Option<u64>,
    page_size: Option<u32>,
    session: Option<Arc<dyn Session>>,
}

impl Select {
    /// Select whole entities of one type.
    pub fn new(entity_type: impl Into<SmolStr>) -> Self {
        Self {
            entity_type: entity_type.into(),
            ..Default::default()
        }
    }

    /// The base entity type.
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// The projected attributes.
    pub fn projections(&self) -> &[SmolStr] {
        &self.populate
    }

    /// Check if any attributes are projected.
    pub fn has_projections(&self) -> bool {
        !self.populate.is_empty()
    }

    /// The ordering terms in the order they were added.
    pub fn sort_terms(&self) -> &[OrderTerm] {
        &self.sort
    }

    /// The page size passed to the session.
    pub fn fetch_size(&self) -> Option<u32> {
        self.page_size
    }

    /// Add filter terms. Multiple calls are joined with `and`.
    pub fn where_(&self, args: impl Into<Args>) -> QueryResult<Self> {
        let terms = Parser::new(Dialect::Query)
            .parse(args.into())
            .collect::<QueryResult<Vec<_>>>()?;
        let mut next = self.clone();
        next.filters.extend(terms.into_iter().filter(|t| !t.is_empty()));
        Ok(next)
    }

    /// Prefetch attributes with the query. Empty names are ignored.
    pub fn populate<I, S>(&self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        let mut next = self.clone();
        next.populate.extend(
            attributes
                .into_iter()
                .map(Into::into)
                .filter(|attr| !attr.is_empty()),
        );
        next
    }

    /// Append an ordering term.
    pub fn order_by(&self, term: OrderTerm) -> Self {
        let mut next = self.clone();
        next.sort.push(term);
        next
    }

    /// Append an ordering term written as `attr [asc|ascending|desc|descending]`.
    pub fn sort(&self, term: &str) -> QueryResult<Self> {
        Ok(self.order_by(OrderTerm::parse(term)?))
    }

    /// Drop every ordering term.
    pub fn unordered(&self) -> Self {
        let mut next = self.clone();
        next.sort.clear();
        next
    }

    /// Flip the direction of every ordering term added so far.
    ///
    /// Terms added afterwards are not affected.
    pub fn reverse(&self) -> Self {
        let mut next = self.clone();
        next.sort = self.sort.iter().map(OrderTerm::reversed).collect();
        next
    }

    /// Skip the first `offset` results.
    pub fn offset(&self, offset: u64) -> Self {
        let mut next = self.clone();
        next.offset = Some(offset);
        next
    }

    /// Return at most `limit` results.
    pub fn limit(&self, limit: u64) -> Self {
        let mut next = self.clone();
        next.limit = Some(limit);
        next
    }

    /// Number of results fetched per request.
    pub fn page_size(&self, page_size: u32) -> Self {
        let mut next = self.clone();
        next.page_size = Some(page_size);
        next
    }

    /// Apply the defaults from a configuration.
    pub fn configured(&self, config: &QueryConfig) -> Self {
        match config.page_size {
            Some(page_size) => self.page_size(page_size),
            None => self.clone(),
        }
    }

    /// Attach the session used by [`Select::execute`].
    pub fn bind(&self, session: Arc<dyn Session>) -> Self {
        let mut next = self.clone();
        next.session = Some(session);
        next
    }

    /// Turn the statement into one usable inside `in (...)`.
    ///
    /// With an attribute, that attribute becomes the only projection.
    /// Without one, `id` is projected unless something already is.
    pub fn subquery(&self, attribute: Option<&str>) -> Self {
        let mut next = self.clone();
        if attribute.is_some() || self.populate.is_empty() {
            next.populate = vec![SmolStr::new(attribute.unwrap_or("id"))];
        }
        next
    }

    /// The query text sent to the session.
    ///
    /// Unlike [`fmt::Display`], a statement without projections is written
    /// as a bare entity query (`Task where ...`).
    pub fn raw_query(&self) -> String {
        let mut query = String::with_capacity(64);
        if self.has_projections() {
            query.push_str("select ");
            query.push_str(&self.populate.join(", "));
            query.push_str(" from ");
        }
        query.push_str(&self.entity_type);
        self.write_tail(&mut query);
        query
    }

    fn write_tail(&self, query: &mut String) {
        let condition = AND.join_terms(self.filters.clone());
        if !condition.is_empty() {
            query.push_str(" where ");
            query.push_str(condition.as_str());
        }
        if !self.sort.is_empty() {
            query.push_str(" order by ");
            for (i, term) in self.sort.iter().enumerate() {
                if i > 0 {
                    query.push_str(", ");
                }
                term.write_clause(query);
            }
        }
        if let Some(offset) = self.offset.filter(|&n| n > 0) {
            query.push_str(&format!(" offset {offset}"));
        }
        if let Some(limit) = self.limit {
            query.push_str(&format!(" limit {limit}"));
        }
    }

    fn session(&self) -> QueryResult<&Arc<dyn Session>> {
        self.session
            .as_ref()
            .ok_or_else(|| QueryError::unbound_session(self.entity_type.as_str()))
    }

    /// Run the statement through the bound session.
    pub fn execute(&self) -> QueryResult<Vec<EntityRef>> {
        let session = self.session()?;
        let query = self.raw_query();
        crate::trackql_debug!(query = %query, page_size = ?self.page_size, "executing select");
        session.query(&query, self.page_size)
    }

    /// Every result.
    pub fn all(&self) -> QueryResult<Vec<EntityRef>> {
        self.execute()
    }

    /// The first result, if any.
    ///
    /// Only one result is requested unless a limit was already set.
    pub fn first(&self) -> QueryResult<Option<EntityRef>> {
        let query = if self.limit.is_some() {
            self.clone()
        } else {
            self.limit(1)
        };
        Ok(query.execute()?.into_iter().next())
    }

    /// The only result.
    ///
    /// Fails with [`crate::ErrorCode::AmbiguousSubqueryResult`] unless the
    /// statement matches exactly one entity.
    pub fn one(&self) -> QueryResult<EntityRef> {
        exactly_one(self.execute()?, &self.raw_query())
    }
}

impl fmt::Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut query = String::with_capacity(64);
        query.push_str("select ");
        if self.has_projections() {
            query.push_str(&self.populate.join(", "));
            query.push(' ');
        }
        query.push_str("from ");
        query.push_str(&self.entity_type);
        self.write_tail(&mut query);
        f.write_str(&query)
    }
}

impl fmt::Debug for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Select")
            .field("entity_type", &self.entity_type)
            .field("populate", &self.populate)
            .field("filters", &self.filters)
            .field("sort", &self.sort)
            .field("offset", &self.offset)
            .field("limit", &self.limit)
            .field("page_size", &self.page_size)
            .field("bound", &self.session.is_some())
            .finish()
    }
}

impl Subquery for Select {
    fn filters(&self) -> &[Fragment] {
        &self.filters
    }

    fn one(&self) -> QueryResult<EntityRef> {
        Select::one(self)
    }
}

impl From<Select> for Input {
    fn from(query: Select) -> Self {
        Input::subquery(query)
    }
}

/// A create statement.
#[derive(Clone)]
pub struct Create {
    entity_type: SmolStr,
    values: Values,
    session: Option<Arc<dyn Session>>,
}

impl Create {
    /// Start creating an entity of `entity_type`.
    pub fn new(entity_type: impl Into<SmolStr>) -> Self {
        Self {
            entity_type: entity_type.into(),
            values: Values::new(),
            session: None,
        }
    }

    /// Set one attribute value.
    pub fn set(&self, key: impl Into<SmolStr>, value: impl Into<Value>) -> Self {
        let mut next = self.clone();
        next.values.insert(key.into(), value.into());
        next
    }

    /// Set several attribute values, keeping their order.
    pub fn values<I, K, V>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<SmolStr>,
        V: Into<Value>,
    {
        let mut next = self.clone();
        next.values
            .extend(values.into_iter().map(|(k, v)| (k.into(), v.into())));
        next
    }

    /// Attach the session used by [`Create::execute`].
    pub fn bind(&self, session: Arc<dyn Session>) -> Self {
        let mut next = self.clone();
        next.session = Some(session);
        next
    }

    /// Create the entity. Nothing is committed.
    pub fn execute(&self) -> QueryResult<EntityRef> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| QueryError::unbound_session(self.entity_type.as_str()))?;
        debug!(entity_type = %self.entity_type, values = self.values.len(), "creating entity");
        session.create(&self.entity_type, &self.values)
    }
}

impl fmt::Display for Create {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "create {}({})", self.entity_type, values_literal(&self.values))
    }
}

impl fmt::Debug for Create {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Create")
            .field("entity_type", &self.entity_type)
            .field("values", &self.values)
            .field("bound", &self.session.is_some())
            .finish()
    }
}

/// An update statement. Projections are not available.
#[derive(Clone, Debug)]
pub struct Update {
    query: Select,
    values: Values,
}

impl Update {
    /// Start updating entities of `entity_type`.
    pub fn new(entity_type: impl Into<SmolStr>) -> Self {
        Self {
            query: Select::new(entity_type),
            values: Values::new(),
        }
    }

    fn with_query(&self, query: Select) -> Self {
        Self {
            query,
            values: self.values.clone(),
        }
    }

    /// Add filter terms selecting the entities to update.
    pub fn where_(&self, args: impl Into<Args>) -> QueryResult<Self> {
        Ok(self.with_query(self.query.where_(args)?))
    }

    /// Append an ordering term.
    pub fn order_by(&self, term: OrderTerm) -> Self {
        self.with_query(self.query.order_by(term))
    }

    /// Skip the first `offset` matches.
    pub fn offset(&self, offset: u64) -> Self {
        self.with_query(self.query.offset(offset))
    }

    /// Update at most `limit` entities.
    pub fn limit(&self, limit: u64) -> Self {
        self.with_query(self.query.limit(limit))
    }

    /// Set one attribute value.
    pub fn set(&self, key: impl Into<SmolStr>, value: impl Into<Value>) -> Self {
        let mut next = self.clone();
        next.values.insert(key.into(), value.into());
        next
    }

    /// Set several attribute values, keeping their order.
    pub fn values<I, K, V>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<SmolStr>,
        V: Into<Value>,
    {
        let mut next = self.clone();
        next.values
            .extend(values.into_iter().map(|(k, v)| (k.into(), v.into())));
        next
    }

    /// Attach the session used by [`Update::execute`].
    pub fn bind(&self, session: Arc<dyn Session>) -> Self {
        self.with_query(self.query.bind(session))
    }

    /// Apply the values to every matching entity and return how many were
    /// changed. Nothing is committed.
    pub fn execute(&self) -> QueryResult<usize> {
        let session = self.query.session()?;
        let matches = self.query.execute()?;
        for entity in &matches {
            session.update(entity, &self.values)?;
        }
        debug!(entity_type = %self.query.entity_type, count = matches.len(), "updated entities");
        Ok(matches.len())
    }
}

impl fmt::Display for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "update {} set ({})",
            self.query.raw_query(),
            values_literal(&self.values)
        )
    }
}

/// A delete statement. Projections are not available.
#[derive(Clone, Debug)]
pub struct Delete {
    query: Select,
}

impl Delete {
    /// Start deleting entities of `entity_type`.
    pub fn new(entity_type: impl Into<SmolStr>) -> Self {
        Self {
            query: Select::new(entity_type),
        }
    }

    /// Add filter terms selecting the entities to delete.
    pub fn where_(&self, args: impl Into<Args>) -> QueryResult<Self> {
        Ok(Self {
            query: self.query.where_(args)?,
        })
    }

    /// Append an ordering term.
    pub fn order_by(&self, term: OrderTerm) -> Self {
        Self {
            query: self.query.order_by(term),
        }
    }

    /// Skip the first `offset` matches.
    pub fn offset(&self, offset: u64) -> Self {
        Self {
            query: self.query.offset(offset),
        }
    }

    /// Delete at most `limit` entities.
    pub fn limit(&self, limit: u64) -> Self {
        Self {
            query: self.query.limit(limit),
        }
    }

    /// Attach the session used by [`Delete::execute`].
    pub fn bind(&self, session: Arc<dyn Session>) -> Self {
        Self {
            query: self.query.bind(session),
        }
    }

    /// Delete every matching entity and return how many were removed.
    /// Nothing is committed.
    pub fn execute(&self) -> QueryResult<usize> {
        let session = self.query.session()?;
        let matches = self.query.execute()?;
        for entity in &matches {
            session.delete(entity)?;
        }
        debug!(entity_type = %self.query.entity_type, count = matches.len(), "deleted entities");
        Ok(matches.len())
    }
}

impl fmt::Display for Delete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "delete {}", self.query.raw_query())
    }
}

fn values_literal(values: &Values) -> String {
    values
        .iter()
        .map(|(key, value)| format!("{}={}", key, value.literal()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build a select statement from `Type` or `Type.attr.path` items.
///
/// Every item must share the same base type. The remainder of each dotted
/// item becomes a projection.
pub fn select<I, S>(items: I) -> QueryResult<Select>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut entity_type: Option<SmolStr> = None;
    let mut populate = Vec::new();

    for item in items {
        let item = item.as_ref();
        let (base, rest) = match item.split_once('.') {
            Some((base, rest)) => (base, Some(rest)),
            None => (item, None),
        };
        if base.is_empty() {
            return Err(QueryError::invalid_attribute_path(item));
        }
        match entity_type.as_deref() {
            Some(first) if first != base => {
                return Err(QueryError::mixed_entity_types(first, base));
            }
            Some(_) => {}
            None => entity_type = Some(SmolStr::new(base)),
        }
        if let Some(rest) = rest {
            populate.push(SmolStr::new(rest));
        }
    }

    let entity_type = entity_type.ok_or_else(|| QueryError::invalid_attribute_path(""))?;
    Ok(Select::new(entity_type).populate(populate))
}

/// Build a create statement.
pub fn create(entity_type: &str) -> Create {
    Create::new(entity_type)
}

/// Build an update statement.
pub fn update(entity_type: &str) -> Update {
    Update::new(entity_type)
}

/// Build a delete statement.
pub fn delete(entity_type: &str) -> Delete {
    Delete::new(entity_type)
}
