//! Ordering terms for select statements.

use smol_str::SmolStr;
use std::fmt;
use std::str::FromStr;

use crate::error::{QueryError, QueryResult};

/// Sort order for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    /// Ascending order (A-Z, 0-9, oldest first).
    #[default]
    Ascending,
    /// Descending order (Z-A, 9-0, newest first).
    Descending,
}

impl SortOrder {
    /// The keyword written after the attribute.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        }
    }

    /// The opposite direction.
    pub fn reversed(&self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for SortOrder {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(QueryError::unknown_sort_order(other)),
        }
    }
}

/// An attribute and the direction to sort it in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderTerm {
    /// The attribute path.
    pub attribute: SmolStr,
    /// The sort order.
    pub order: SortOrder,
}

impl OrderTerm {
    /// Create a new ordering term.
    pub fn new(attribute: impl Into<SmolStr>, order: SortOrder) -> Self {
        Self {
            attribute: attribute.into(),
            order,
        }
    }

    /// Order by `attribute` ascending.
    pub fn asc(attribute: impl Into<SmolStr>) -> Self {
        Self::new(attribute, SortOrder::Ascending)
    }

    /// Order by `attribute` descending.
    pub fn desc(attribute: impl Into<SmolStr>) -> Self {
        Self::new(attribute, SortOrder::Descending)
    }

    /// Parse `attr`, `attr asc` or `attr descending`.
    ///
    /// ```rust
    /// use trackql_query::{OrderTerm, SortOrder};
    ///
    /// let term = OrderTerm::parse("id desc").unwrap();
    /// assert_eq!(term.order, SortOrder::Descending);
    /// assert!(OrderTerm::parse("id sideways").is_err());
    /// ```
    pub fn parse(text: &str) -> QueryResult<Self> {
        match text.trim().split_once(' ') {
            Some((attribute, method)) => Ok(Self::new(attribute, method.trim().parse()?)),
            None => Ok(Self::asc(text.trim())),
        }
    }

    /// The same attribute sorted the other way.
    pub fn reversed(&self) -> Self {
        Self::new(self.attribute.clone(), self.order.reversed())
    }

    /// Write the term as it appears in an `order by` clause.
    ///
    /// Ascending is the service default, so only `descending` is spelled out.
    pub fn write_clause(&self, buffer: &mut String) {
        buffer.push_str(&self.attribute);
        if self.order == SortOrder::Descending {
            buffer.push_str(" descending");
        }
    }
}

impl fmt::Display for OrderTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.attribute, self.order)
    }
}

impl FromStr for OrderTerm {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sort_order_keywords() {
        assert_eq!(SortOrder::Ascending.to_string(), "ascending");
        assert_eq!(SortOrder::Descending.keyword(), "descending");
        assert_eq!(SortOrder::default(), SortOrder::Ascending);
        assert_eq!(SortOrder::Ascending.reversed(), SortOrder::Descending);
    }

    #[test]
    fn test_parse_directions() {
        assert_eq!(OrderTerm::parse("id").unwrap(), OrderTerm::asc("id"));
        assert_eq!(OrderTerm::parse("id asc").unwrap(), OrderTerm::asc("id"));
        assert_eq!(OrderTerm::parse("id ascending").unwrap(), OrderTerm::asc("id"));
        assert_eq!(OrderTerm::parse("id desc").unwrap(), OrderTerm::desc("id"));
        assert_eq!("name descending".parse::<OrderTerm>().unwrap(), OrderTerm::desc("name"));
    }

    #[test]
    fn test_parse_unknown_direction() {
        let err = OrderTerm::parse("id sideways").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownSortOrder);
    }

    #[test]
    fn test_clause_omits_ascending() {
        let mut buffer = String::new();
        OrderTerm::asc("a").write_clause(&mut buffer);
        buffer.push_str(", ");
        OrderTerm::desc("b").write_clause(&mut buffer);
        assert_eq!(buffer, "a, b descending");
    }

    #[test]
    fn test_reversed() {
        assert_eq!(OrderTerm::asc("a").reversed(), OrderTerm::desc("a"));
    }
}
