//! Normalisation of mixed argument lists into condition terms.
//!
//! Combinators accept positional inputs of several kinds plus ordered
//! keyword arguments. [`Parser::parse`] turns them into a lazy, single-use
//! sequence of [`Fragment`]s:
//!
//! | Input                 | Terms produced                                   |
//! |-----------------------|--------------------------------------------------|
//! | [`Input::Fragment`]   | the fragment unchanged                           |
//! | [`Input::Map`]        | one equality per entry, in insertion order       |
//! | [`Input::Entity`]     | error, a keyword is needed to compare against    |
//! | [`Input::Sequence`]   | each element, only when it is the sole argument  |
//! | [`Input::Subquery`]   | the sub-query's accumulated filters              |
//! | keyword `k = v`       | `k == v`                                         |
//! | keyword `k = query`   | `k == query.one()`                               |
//!
//! ```rust
//! use trackql_query::{args, attr, Args, Compare, Dialect, Parser};
//!
//! let terms: Vec<_> = Parser::new(Dialect::Query)
//!     .parse(args![attr("a").gt(0), b = 5])
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(terms.len(), 2);
//! assert_eq!(terms[1].to_string(), "b is 5");
//! ```

use indexmap::IndexMap;
use smol_str::SmolStr;
use std::collections::VecDeque;
use std::fmt;

use crate::error::{QueryError, QueryResult};
use crate::expression::{Compare, Dialect, Expression};
use crate::fragment::Fragment;
use crate::subquery::Subquery;
use crate::value::{EntityRef, Value};

/// A single positional argument.
pub enum Input {
    /// A finished condition, or text assumed to be valid syntax.
    Fragment(Fragment),
    /// Attribute/value pairs; keys may be dotted paths.
    Map(IndexMap<String, Value>),
    /// A bare entity, which cannot be placed without an attribute name.
    Entity(EntityRef),
    /// A lazily produced list of conditions.
    Sequence(Box<dyn Iterator<Item = Fragment>>),
    /// An unexecuted query whose filters are reused.
    Subquery(Box<dyn Subquery>),
}

impl Input {
    /// Wrap an iterator of conditions.
    pub fn sequence<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Fragment> + 'static,
        I::IntoIter: 'static,
    {
        Self::Sequence(Box::new(items.into_iter().map(Into::into)))
    }

    /// Wrap a sub-query.
    pub fn subquery(query: impl Subquery + 'static) -> Self {
        Self::Subquery(Box::new(query))
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fragment(fragment) => f.debug_tuple("Fragment").field(fragment).finish(),
            Self::Map(map) => f.debug_tuple("Map").field(map).finish(),
            Self::Entity(entity) => f.debug_tuple("Entity").field(entity).finish(),
            Self::Sequence(_) => f.write_str("Sequence(..)"),
            Self::Subquery(query) => f.debug_tuple("Subquery").field(&query.filters()).finish(),
        }
    }
}

impl From<Fragment> for Input {
    fn from(fragment: Fragment) -> Self {
        Self::Fragment(fragment)
    }
}

impl From<&Fragment> for Input {
    fn from(fragment: &Fragment) -> Self {
        Self::Fragment(fragment.clone())
    }
}

impl From<&str> for Input {
    fn from(text: &str) -> Self {
        Self::Fragment(Fragment::new(text))
    }
}

impl From<String> for Input {
    fn from(text: String) -> Self {
        Self::Fragment(Fragment::new(text))
    }
}

impl From<IndexMap<String, Value>> for Input {
    fn from(map: IndexMap<String, Value>) -> Self {
        Self::Map(map)
    }
}

impl From<EntityRef> for Input {
    fn from(entity: EntityRef) -> Self {
        Self::Entity(entity)
    }
}

impl From<&EntityRef> for Input {
    fn from(entity: &EntityRef) -> Self {
        Self::Entity(entity.clone())
    }
}

impl From<Vec<Fragment>> for Input {
    fn from(items: Vec<Fragment>) -> Self {
        Self::sequence(items)
    }
}

/// The value of a keyword argument.
pub enum Keyword {
    /// A plain value, compared for equality.
    Value(Value),
    /// A sub-query resolved to its single result before comparing.
    Subquery(Box<dyn Subquery>),
}

impl fmt::Debug for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Subquery(query) => f.debug_tuple("Subquery").field(&query.filters()).finish(),
        }
    }
}

/// Positional inputs followed by ordered keyword arguments.
#[derive(Debug, Default)]
pub struct Args {
    positional: Vec<Input>,
    keywords: Vec<(SmolStr, Keyword)>,
}

impl Args {
    /// Create an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a positional input.
    pub fn arg(mut self, input: impl Into<Input>) -> Self {
        self.positional.push(input.into());
        self
    }

    /// Add a keyword argument compared for equality.
    pub fn kw(mut self, key: impl Into<SmolStr>, value: impl Into<Value>) -> Self {
        self.keywords.push((key.into(), Keyword::Value(value.into())));
        self
    }

    /// Add a keyword argument whose value is the single result of a sub-query.
    pub fn kw_query(mut self, key: impl Into<SmolStr>, query: impl Subquery + 'static) -> Self {
        self.keywords
            .push((key.into(), Keyword::Subquery(Box::new(query))));
        self
    }

    /// Total number of arguments given.
    pub fn len(&self) -> usize {
        self.positional.len() + self.keywords.len()
    }

    /// Check if no arguments were given.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Into<Input>> From<T> for Args {
    fn from(input: T) -> Self {
        Args::new().arg(input)
    }
}

/// Converts arguments into terms for one dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Parser {
    dialect: Dialect,
}

impl Parser {
    /// Create a parser whose keyword terms use `dialect`.
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// The dialect used for keyword and map terms.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Start normalising `args`. Terms are produced on demand.
    pub fn parse(&self, args: Args) -> Terms {
        let sole = args.positional.len() == 1;
        Terms {
            dialect: self.dialect,
            positional: args.positional.into_iter().enumerate(),
            keywords: args.keywords.into_iter(),
            pending: VecDeque::new(),
            sequence: None,
            sole,
        }
    }
}

/// Lazy sequence of terms produced by [`Parser::parse`].
pub struct Terms {
    dialect: Dialect,
    positional: std::iter::Enumerate<std::vec::IntoIter<Input>>,
    keywords: std::vec::IntoIter<(SmolStr, Keyword)>,
    pending: VecDeque<Fragment>,
    sequence: Option<Box<dyn Iterator<Item = Fragment>>>,
    sole: bool,
}

impl Terms {
    fn equality(&self, key: &str, value: impl Into<Value>) -> Fragment {
        Expression::with_dialect(key, self.dialect).equals(value)
    }

    fn expand(&mut self, position: usize, input: Input) -> QueryResult<()> {
        match input {
            Input::Fragment(fragment) => self.pending.push_back(fragment),
            Input::Map(map) => {
                for (key, value) in map {
                    let term = self.equality(&key, value);
                    self.pending.push_back(term);
                }
            }
            Input::Entity(entity) => return Err(QueryError::missing_keyword(entity)),
            Input::Sequence(items) => {
                if !self.sole {
                    return Err(QueryError::nested_sequence(position));
                }
                self.sequence = Some(items);
            }
            Input::Subquery(query) => self.pending.extend(query.filters().iter().cloned()),
        }
        Ok(())
    }

    fn keyword(&self, key: &str, keyword: Keyword) -> QueryResult<Fragment> {
        match keyword {
            Keyword::Value(value) => Ok(self.equality(key, value)),
            Keyword::Subquery(query) => {
                let entity = query.one()?;
                Ok(self.equality(key, entity))
            }
        }
    }
}

impl Iterator for Terms {
    type Item = QueryResult<Fragment>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(term) = self.pending.pop_front() {
                return Some(Ok(term));
            }
            if let Some(items) = self.sequence.as_mut() {
                match items.next() {
                    Some(term) => return Some(Ok(term)),
                    None => self.sequence = None,
                }
            }
            if let Some((position, input)) = self.positional.next() {
                if let Err(err) = self.expand(position, input) {
                    return Some(Err(err));
                }
                continue;
            }
            let (key, keyword) = self.keywords.next()?;
            return Some(self.keyword(&key, keyword));
        }
    }
}

impl fmt::Debug for Terms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Terms")
            .field("dialect", &self.dialect)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::error::ErrorCode;
    use crate::expression::attr;
    use pretty_assertions::assert_eq;

    struct FixedQuery {
        filters: Vec<Fragment>,
        results: Vec<EntityRef>,
    }

    impl Subquery for FixedQuery {
        fn filters(&self) -> &[Fragment] {
            &self.filters
        }

        fn one(&self) -> QueryResult<EntityRef> {
            crate::subquery::exactly_one(self.results.clone(), "Fixed")
        }
    }

    fn texts(args: Args) -> QueryResult<Vec<String>> {
        Parser::new(Dialect::Query)
            .parse(args)
            .map(|term| term.map(|f| f.to_string()))
            .collect()
    }

    #[test]
    fn test_positional_then_keywords() {
        let terms = texts(args![b = 5, attr("a").gt(0), "raw is 1"]).unwrap();
        assert_eq!(terms, vec!["a > 0", "raw is 1", "b is 5"]);
    }

    #[test]
    fn test_map_keeps_insertion_order_and_dots() {
        let mut map = IndexMap::new();
        map.insert("z".to_string(), Value::from(1));
        map.insert("parent.name".to_string(), Value::from("abc"));
        let terms = texts(Args::new().arg(map)).unwrap();
        assert_eq!(terms, vec!["z is 1", r#"parent.name is "abc""#]);
    }

    #[test]
    fn test_map_matches_keywords() {
        let mut map = IndexMap::new();
        map.insert("a".to_string(), Value::from(1));
        assert_eq!(texts(Args::from(map)).unwrap(), texts(args![a = 1]).unwrap());
    }

    #[test]
    fn test_positional_entity_needs_keyword() {
        let err = texts(Args::new().arg(EntityRef::new("Task", "1"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingKeyword);
    }

    #[test]
    fn test_keyword_entity_compares_id() {
        let terms = texts(Args::new().kw("parent", EntityRef::new("Task", "1"))).unwrap();
        assert_eq!(terms, vec![r#"parent.id is "1""#]);
    }

    #[test]
    fn test_sole_sequence_is_unrolled() {
        let items = (0..3).map(|i| attr("a").equals(i));
        let terms = texts(Args::new().arg(Input::sequence(items))).unwrap();
        assert_eq!(terms, vec!["a is 0", "a is 1", "a is 2"]);
    }

    #[test]
    fn test_sequence_of_owned_text() {
        let items: Vec<String> = (1..=2).map(|i| format!("id is {i}")).collect();
        let terms = texts(Args::new().arg(Input::sequence(items))).unwrap();
        assert_eq!(terms, vec!["id is 1", "id is 2"]);

        let from_vec = Input::from(vec![attr("a").equals(1)]);
        assert_eq!(texts(Args::new().arg(from_vec)).unwrap(), vec!["a is 1"]);
    }

    #[test]
    fn test_sequence_with_other_arguments_is_rejected() {
        let args = Args::new()
            .arg(attr("a").equals(1))
            .arg(Input::sequence(vec![attr("b").equals(2)]));
        let err = texts(args).unwrap_err();
        assert_eq!(err.code, ErrorCode::NestedSequence);
    }

    #[test]
    fn test_sequence_with_keywords_is_unrolled() {
        let args = Args::new()
            .arg(Input::sequence(vec![attr("b").equals(2)]))
            .kw("c", 3);
        assert_eq!(texts(args).unwrap(), vec!["b is 2", "c is 3"]);
    }

    #[test]
    fn test_positional_subquery_is_flattened() {
        let query = FixedQuery {
            filters: vec![attr("name").equals("x"), attr("b").gt(1)],
            results: Vec::new(),
        };
        let terms = texts(Args::new().arg(Input::subquery(query)).kw("c", 1)).unwrap();
        assert_eq!(terms, vec![r#"name is "x""#, "b > 1", "c is 1"]);
    }

    #[test]
    fn test_keyword_subquery_is_resolved() {
        let query = FixedQuery {
            filters: Vec::new(),
            results: vec![EntityRef::new("ProjectSchema", "42")],
        };
        let terms = texts(Args::new().kw_query("project_schema", query)).unwrap();
        assert_eq!(terms, vec![r#"project_schema.id is "42""#]);
    }

    #[test]
    fn test_keyword_subquery_must_be_unique() {
        let query = FixedQuery {
            filters: Vec::new(),
            results: vec![EntityRef::new("A", "1"), EntityRef::new("A", "2")],
        };
        let err = texts(Args::new().kw_query("a", query)).unwrap_err();
        assert_eq!(err.code, ErrorCode::AmbiguousSubqueryResult);
    }

    #[test]
    fn test_event_dialect_keywords() {
        let terms: Vec<_> = Parser::new(Dialect::Event)
            .parse(args![topic = "ftrack.update"])
            .map(|t| t.unwrap().to_string())
            .collect();
        assert_eq!(terms, vec![r#"topic="ftrack.update""#]);
    }

    #[test]
    fn test_terms_are_lazy() {
        let mut terms = Parser::default().parse(
            Args::new()
                .arg(attr("a").equals(1))
                .arg(EntityRef::new("Task", "1")),
        );
        assert_eq!(terms.next().unwrap().unwrap().as_str(), "a is 1");
        assert!(terms.next().unwrap().is_err());
    }
}
