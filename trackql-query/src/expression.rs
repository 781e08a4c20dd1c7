//! Attribute-path expressions and the comparison operators.
//!
//! An [`Expression`] is an unresolved dotted attribute reference such as
//! `parent.name`. Applying a comparison to it does not evaluate anything: it
//! builds a [`Fragment`] holding the condition text.
//!
//! ```rust
//! use trackql_query::{attr, event, Compare};
//!
//! let name = attr("parent").child("name");
//! assert_eq!(name.equals("abc").to_string(), r#"parent.name is "abc""#);
//! assert_eq!(name.gt(5).to_string(), "parent.name > 5");
//!
//! // The event grammar uses compact symbols.
//! assert_eq!(event::attr("a.b").equals("c").to_string(), r#"a.b="c""#);
//! ```

use smallvec::SmallVec;
use smol_str::SmolStr;
use std::borrow::Cow;
use std::fmt;

use crate::combinator::Join;
use crate::error::{QueryError, QueryResult};
use crate::fragment::Fragment;
use crate::parser::Args;
use crate::statement::Select;
use crate::types::{OrderTerm, SortOrder};
use crate::value::Value;

/// The grammar a comparison is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// Entity queries: `a is 1`, `a > 1`.
    #[default]
    Query,
    /// Event subscriptions: `a=1`, `a>1`.
    Event,
}

impl Dialect {
    /// The text placed between the attribute and the value for an operator.
    pub const fn symbol(&self, op: Operator) -> &'static str {
        match (self, op) {
            (Self::Query, Operator::Equals) => " is ",
            (Self::Query, Operator::NotEquals) => " is_not ",
            (Self::Query, Operator::Gt) => " > ",
            (Self::Query, Operator::Gte) => " >= ",
            (Self::Query, Operator::Lt) => " < ",
            (Self::Query, Operator::Lte) => " <= ",
            (Self::Event, Operator::Equals) => "=",
            (Self::Event, Operator::NotEquals) => "!=",
            (Self::Event, Operator::Gt) => ">",
            (Self::Event, Operator::Gte) => ">=",
            (Self::Event, Operator::Lt) => "<",
            (Self::Event, Operator::Lte) => "<=",
        }
    }
}

/// Comparison operators shared by every dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Equal to.
    Equals,
    /// Not equal to.
    NotEquals,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
}

/// Anything a comparison can be built from.
///
/// These methods build text, they never evaluate a boolean. `a.equals(1)`
/// produces the condition `a is 1`; it does not check whether `a` is 1.
pub trait Compare {
    /// The text on the left side of the comparison.
    fn subject(&self) -> Cow<'_, str>;

    /// The grammar used for the named operators.
    fn dialect(&self) -> Dialect {
        Dialect::Query
    }

    /// Build `{subject}{symbol}{value}` following the value-conversion rules.
    ///
    /// Entities are compared through their identifier, so the subject is
    /// rewritten to `{subject}.id`.
    fn compare_with(&self, symbol: &str, value: impl Into<Value>) -> Fragment {
        let value = value.into();
        let subject = self.subject();
        let mut text = String::with_capacity(subject.len() + symbol.len() + 16);
        text.push_str(&subject);
        if value.is_entity() {
            text.push_str(".id");
        }
        text.push_str(symbol);
        value.write_to(&mut text);
        Fragment::with_dialect(text, self.dialect())
    }

    /// Build a comparison using this dialect's symbol for `op`.
    fn compare(&self, op: Operator, value: impl Into<Value>) -> Fragment {
        self.compare_with(self.dialect().symbol(op), value)
    }

    /// Equal to.
    fn equals(&self, value: impl Into<Value>) -> Fragment {
        self.compare(Operator::Equals, value)
    }

    /// Not equal to.
    fn not_equals(&self, value: impl Into<Value>) -> Fragment {
        self.compare(Operator::NotEquals, value)
    }

    /// Greater than.
    fn gt(&self, value: impl Into<Value>) -> Fragment {
        self.compare(Operator::Gt, value)
    }

    /// Greater than or equal.
    fn gte(&self, value: impl Into<Value>) -> Fragment {
        self.compare(Operator::Gte, value)
    }

    /// Less than.
    fn lt(&self, value: impl Into<Value>) -> Fragment {
        self.compare(Operator::Lt, value)
    }

    /// Less than or equal.
    fn lte(&self, value: impl Into<Value>) -> Fragment {
        self.compare(Operator::Lte, value)
    }

    /// Alias for [`Compare::equals`].
    fn is_(&self, value: impl Into<Value>) -> Fragment {
        self.equals(value)
    }

    /// Alias for [`Compare::not_equals`].
    fn is_not(&self, value: impl Into<Value>) -> Fragment {
        self.not_equals(value)
    }

    /// Membership test (`value in subject`).
    ///
    /// Always fails: a membership test can only ever report a boolean, which
    /// would silently drop the condition from the query.
    fn membership(&self, value: impl fmt::Display) -> QueryResult<Fragment> {
        Err(QueryError::membership_unsupported(self.subject(), value))
    }
}

/// An unresolved dotted attribute reference.
///
/// Expressions are immutable; [`Expression::child`] returns a new value with
/// the extended path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expression {
    path: SmallVec<[SmolStr; 4]>,
    dialect: Dialect,
}

impl Expression {
    /// Create a query-dialect expression. Dots in `name` separate segments.
    pub fn new(name: &str) -> Self {
        Self::with_dialect(name, Dialect::Query)
    }

    /// Create an expression written in the given dialect.
    pub fn with_dialect(name: &str, dialect: Dialect) -> Self {
        Self {
            path: name.split('.').map(SmolStr::new).collect(),
            dialect,
        }
    }

    /// Create an expression, rejecting empty segments and whitespace.
    ///
    /// [`Expression::new`] accepts any text; this is for names that come
    /// from user input.
    pub fn parse(name: &str, dialect: Dialect) -> QueryResult<Self> {
        let invalid = name
            .split('.')
            .any(|segment| segment.is_empty() || segment.contains(char::is_whitespace));
        if invalid {
            return Err(QueryError::invalid_attribute_path(name));
        }
        Ok(Self::with_dialect(name, dialect))
    }

    /// Extend the path with a sub-attribute.
    pub fn child(&self, name: &str) -> Self {
        let mut path = self.path.clone();
        path.extend(name.split('.').map(SmolStr::new));
        Self {
            path,
            dialect: self.dialect,
        }
    }

    /// The individual path segments.
    pub fn segments(&self) -> &[SmolStr] {
        &self.path
    }

    /// The dotted path.
    pub fn path(&self) -> String {
        self.path.join(".")
    }

    /// Calling an expression is an alias for equality.
    pub fn call(&self, value: impl Into<Value>) -> Fragment {
        self.equals(value)
    }

    /// Pattern match, `%` is the wildcard.
    pub fn like(&self, value: impl Into<Value>) -> Fragment {
        self.compare_with(" like ", value)
    }

    /// Negated pattern match.
    pub fn not_like(&self, value: impl Into<Value>) -> Fragment {
        self.compare_with(" not_like ", value)
    }

    /// Date is after.
    pub fn after(&self, value: impl Into<Value>) -> Fragment {
        self.compare_with(" after ", value)
    }

    /// Date is before.
    pub fn before(&self, value: impl Into<Value>) -> Fragment {
        self.compare_with(" before ", value)
    }

    /// Text starts with `value`.
    pub fn starts_with(&self, value: &str) -> Fragment {
        self.like(format!("{}%", escape_wildcards(value)))
    }

    /// Text ends with `value`.
    pub fn ends_with(&self, value: &str) -> Fragment {
        self.like(format!("%{}", escape_wildcards(value)))
    }

    /// Text contains `value`.
    pub fn contains(&self, value: &str) -> Fragment {
        self.like(format!("%{}%", escape_wildcards(value)))
    }

    /// Test a scalar relationship: `path has (...)`.
    pub fn has(&self, args: impl Into<Args>) -> QueryResult<Fragment> {
        self.relationship("has", args.into())
    }

    /// Test a collection relationship: `path any (...)`.
    pub fn any(&self, args: impl Into<Args>) -> QueryResult<Fragment> {
        self.relationship("any", args.into())
    }

    fn relationship(&self, keyword: &str, args: Args) -> QueryResult<Fragment> {
        let inner = Join::new("and", false, self.dialect).combine(args)?;
        Ok(Fragment::with_dialect(
            format!("{} {} ({})", self.path(), keyword, inner),
            self.dialect,
        ))
    }

    /// One of these values.
    ///
    /// An empty list renders `("")`. If any value is an entity the path is
    /// rewritten to `path.id`. A single text value that reads like
    /// `select ... from ...` is inserted verbatim.
    pub fn in_<I, V>(&self, values: I) -> Fragment
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.value_list("in", values.into_iter().map(Into::into).collect())
    }

    /// None of these values. See [`Expression::in_`].
    pub fn not_in<I, V>(&self, values: I) -> Fragment
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.value_list("not_in", values.into_iter().map(Into::into).collect())
    }

    fn value_list(&self, keyword: &str, values: Vec<Value>) -> Fragment {
        let mut subject = self.path();
        let body = match values.as_slice() {
            [] => Value::from("").render(),
            [Value::Text(text)] if is_raw_subquery(text) => text.clone(),
            values => {
                if values.iter().any(Value::is_entity) {
                    subject.push_str(".id");
                }
                values
                    .iter()
                    .map(Value::render)
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        };
        Fragment::with_dialect(format!("{} {} ({})", subject, keyword, body), self.dialect)
    }

    /// Membership in the results of a select statement.
    ///
    /// A statement without projections selects whole entities, so the path
    /// is compared through `.id` and the sub-query projects `id`.
    pub fn in_query(&self, query: &Select) -> Fragment {
        self.query_list("in", query)
    }

    /// Exclusion from the results of a select statement.
    pub fn not_in_query(&self, query: &Select) -> Fragment {
        self.query_list("not_in", query)
    }

    fn query_list(&self, keyword: &str, query: &Select) -> Fragment {
        let mut subject = self.path();
        if !query.has_projections() {
            subject.push_str(".id");
        }
        Fragment::with_dialect(
            format!("{} {} ({})", subject, keyword, query.subquery(None)),
            self.dialect,
        )
    }

    /// Order ascending.
    pub fn asc(&self) -> OrderTerm {
        OrderTerm::new(self.path(), SortOrder::Ascending)
    }

    /// Order descending.
    pub fn desc(&self) -> OrderTerm {
        OrderTerm::new(self.path(), SortOrder::Descending)
    }
}

impl Compare for Expression {
    fn subject(&self) -> Cow<'_, str> {
        match self.path.as_slice() {
            [single] => Cow::Borrowed(single.as_str()),
            _ => Cow::Owned(self.path()),
        }
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.subject())
    }
}

/// Lookup of root expressions by attribute name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Namespace {
    dialect: Dialect,
}

impl Namespace {
    /// Create a namespace for the given dialect.
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// Get the root expression for an attribute.
    pub fn get(&self, name: &str) -> Expression {
        Expression::with_dialect(name, self.dialect)
    }
}

/// Root namespace for entity queries.
pub const ENTITY: Namespace = Namespace::new(Dialect::Query);

/// Create a query-dialect attribute expression.
pub fn attr(name: &str) -> Expression {
    ENTITY.get(name)
}

fn escape_wildcards(value: &str) -> String {
    value.replace('%', "\\%")
}

fn is_raw_subquery(text: &str) -> bool {
    text.starts_with("select ") && text.contains(" from ")
}
