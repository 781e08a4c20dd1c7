//! `and`/`or` combinators.
//!
//! A [`Join`] normalises its arguments with a [`Parser`], joins the terms
//! with its operator and, when its bracket policy asks for it and more than
//! one term was produced, wraps the result in parentheses. `or` binds looser
//! than `and`, so only `or` groups are bracketed by default.
//!
//! ```rust
//! use trackql_query::{and_, or_, attr, Compare};
//!
//! let a = attr("a");
//! assert_eq!(and_!(a.gt(0), b = 5).unwrap().to_string(), "a > 0 and b is 5");
//! assert_eq!(or_!(a.gt(0), b = 5).unwrap().to_string(), "(a > 0 or b is 5)");
//! assert_eq!(or_!(a.gt(0)).unwrap().to_string(), "a > 0");
//! ```

use tracing::debug;

use crate::error::QueryResult;
use crate::expression::Dialect;
use crate::fragment::Fragment;
use crate::parser::{Args, Parser};

/// A reusable, stateless joiner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Join {
    operator: &'static str,
    brackets: bool,
    parser: Parser,
}

impl Join {
    /// Create a combinator.
    ///
    /// `dialect` decides how keyword and map arguments become terms.
    pub const fn new(operator: &'static str, brackets: bool, dialect: Dialect) -> Self {
        Self {
            operator,
            brackets,
            parser: Parser::new(dialect),
        }
    }

    /// The joining keyword.
    pub fn operator(&self) -> &'static str {
        self.operator
    }

    /// Whether multi-term results are wrapped in parentheses.
    pub fn uses_brackets(&self) -> bool {
        self.brackets
    }

    /// Normalise `args` and join the resulting terms.
    pub fn combine(&self, args: impl Into<Args>) -> QueryResult<Fragment> {
        let terms = self
            .parser
            .parse(args.into())
            .collect::<QueryResult<Vec<_>>>()?;
        Ok(self.join_terms(terms))
    }

    /// Join already-normalised terms.
    pub fn join_terms(&self, terms: Vec<Fragment>) -> Fragment {
        let separator = format!(" {} ", self.operator);
        let joined = terms
            .iter()
            .map(Fragment::as_str)
            .collect::<Vec<_>>()
            .join(&separator);

        let text = if self.brackets && terms.len() > 1 {
            format!("({joined})")
        } else {
            joined
        };
        debug!(operator = self.operator, terms = terms.len(), query = %text, "joined terms");
        Fragment::with_dialect(text, self.parser.dialect())
    }
}

/// `and` for entity queries, unbracketed.
pub const AND: Join = Join::new("and", false, Dialect::Query);

/// `or` for entity queries, bracketed.
pub const OR: Join = Join::new("or", true, Dialect::Query);

/// Join terms with `and`.
pub fn and_(args: impl Into<Args>) -> QueryResult<Fragment> {
    AND.combine(args)
}

/// Join terms with `or`, bracketing two or more terms.
pub fn or_(args: impl Into<Args>) -> QueryResult<Fragment> {
    OR.combine(args)
}
