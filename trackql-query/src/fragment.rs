//! Finished textual conditions.
//!
//! A [`Fragment`] is the text of a boolean condition, e.g. `a.b is "c"` or
//! `(a > 0 or b is 5)`. Fragments never change once built; negation and
//! combination return new values.
//!
//! ```rust
//! use trackql_query::{attr, Compare};
//!
//! let version = attr("version").equals(5);
//! assert_eq!((!version.clone()).to_string(), "not version is 5");
//! assert_eq!((!!version.clone()), version);
//!
//! let either = version | attr("version").equals(6);
//! assert_eq!((!either).to_string(), "not (version is 5 or version is 6)");
//! ```

use smol_str::SmolStr;
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{BitAnd, BitOr, Not};
use tracing::trace;

use crate::combinator::{Join, OR};
use crate::error::{QueryError, QueryResult};
use crate::expression::{Compare, Dialect};
use crate::parser::Args;
use crate::value::Value;

const NEGATION: &str = "not ";

/// An immutable boolean condition rendered as text.
///
/// A fragment remembers the grammar it was written in, so comparisons built
/// on top of it use the same symbols. Equality only looks at the text.
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    text: SmolStr,
    dialect: Dialect,
}

impl Fragment {
    /// Wrap already-valid query condition text.
    pub fn new(text: impl Into<SmolStr>) -> Self {
        Self::with_dialect(text, Dialect::Query)
    }

    /// Wrap condition text written in the given dialect.
    pub fn with_dialect(text: impl Into<SmolStr>, dialect: Dialect) -> Self {
        Self {
            text: text.into(),
            dialect,
        }
    }

    /// The condition text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Check if the fragment holds no condition at all.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Logical negation using as few brackets as keep the meaning intact.
    ///
    /// - `not x` becomes `x` when the `not` covers the whole of `x`
    /// - a condition without `and`/`or` is prefixed with `not `
    /// - a condition that is one bracketed group is prefixed with `not `
    /// - anything else is wrapped: `not (...)`
    ///
    /// `not a is 1 and b is 2` only negates its first term, so negating it
    /// wraps instead of stripping.
    pub fn negate(&self) -> Fragment {
        let text = self.as_str();

        if let Some(rest) = text.strip_prefix(NEGATION) {
            if is_atomic(rest) {
                return Fragment::with_dialect(rest, self.dialect);
            }
        }

        let negated = if is_atomic(text) {
            format!("{NEGATION}{text}")
        } else {
            format!("{NEGATION}({text})")
        };
        trace!(input = %text, output = %negated, "negated fragment");
        Fragment::with_dialect(negated, self.dialect)
    }

    /// Calling a fragment is a usage error.
    pub fn call(&self, _value: impl Into<Value>) -> QueryResult<Fragment> {
        Err(QueryError::not_callable(self.as_str()))
    }

    /// Combine with another condition using `and`.
    pub fn and(self, other: impl Into<Fragment>) -> Fragment {
        let join = Join::new("and", false, self.dialect);
        join.join_terms(vec![self, other.into()])
    }

    /// Combine with another condition using `or`.
    pub fn or(self, other: impl Into<Fragment>) -> Fragment {
        let join = Join::new("or", true, self.dialect);
        join.join_terms(vec![self, other.into()])
    }
}

/// Check whether a `not ` prefix applies to the whole text.
fn is_atomic(text: &str) -> bool {
    !has_connective(text) || is_single_group(text)
}

/// Check for a boolean connective anywhere in the text.
///
/// Connectives inside relationship brackets (`a has (b and c)`) count too,
/// which only ever leads to extra brackets.
fn has_connective(text: &str) -> bool {
    text.contains(" and ") || text.contains(" or ")
}

/// Check whether the whole text is one bracketed group, e.g. `(a or b)` but
/// not `(a or b) and (c or d)`.
///
/// Brackets inside double-quoted strings are ignored.
fn is_single_group(text: &str) -> bool {
    let inner = match text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        Some(inner) => inner,
        None => return false,
    };

    let mut depth: i32 = 0;
    let mut quoted = false;
    for c in inner.chars() {
        match c {
            '"' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return false;
        }
    }
    true
}

impl Compare for Fragment {
    fn subject(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }
}

impl PartialEq for Fragment {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Fragment {}

impl Hash for Fragment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for Fragment {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for Fragment {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Fragment {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl PartialEq<str> for Fragment {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Fragment {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl Not for Fragment {
    type Output = Fragment;

    fn not(self) -> Fragment {
        self.negate()
    }
}

impl Not for &Fragment {
    type Output = Fragment;

    fn not(self) -> Fragment {
        self.negate()
    }
}

impl<T: Into<Fragment>> BitAnd<T> for Fragment {
    type Output = Fragment;

    fn bitand(self, rhs: T) -> Fragment {
        self.and(rhs)
    }
}

impl<T: Into<Fragment>> BitOr<T> for Fragment {
    type Output = Fragment;

    fn bitor(self, rhs: T) -> Fragment {
        self.or(rhs)
    }
}

/// Negate every term of an argument list as a single `or` group.
///
/// `not_(a, b)` is `not (a or b)`; with one term it is `not a`.
pub fn not_(args: impl Into<Args>) -> QueryResult<Fragment> {
    Ok(OR.combine(args)?.negate())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::expression::attr;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_negate_atomic_has_no_brackets() {
        assert_eq!(Fragment::new("a.b=2").negate().as_str(), "not a.b=2");
        assert_eq!(attr("version").gt(5).negate().as_str(), "not version > 5");
    }

    #[test]
    fn test_double_negation_is_identity() {
        let f = Fragment::new(r#"a.b is "c""#);
        assert_eq!(f.negate().negate(), f);
        assert_eq!(!!f.clone(), f);
    }

    #[test]
    fn test_negate_single_group() {
        let f = Fragment::new("(version > 3 or version is 1)");
        assert_eq!(f.negate().as_str(), "not (version > 3 or version is 1)");
    }

    #[test]
    fn test_negate_unbracketed_connective() {
        let f = Fragment::new("a is 0 and b is 1");
        assert_eq!(f.negate().as_str(), "not (a is 0 and b is 1)");
    }

    #[test]
    fn test_negate_two_groups_adds_brackets() {
        let f = Fragment::new("(a is 1 or b is 2) and (c is 3 or d is 4)");
        assert_eq!(f.negate().as_str(), "not ((a is 1 or b is 2) and (c is 3 or d is 4))");
    }

    #[test]
    fn test_negate_ignores_quoted_brackets() {
        let f = Fragment::new(r#"(name is ")" or name is "(")"#);
        assert_eq!(f.negate().as_str(), r#"not (name is ")" or name is "(")"#);

        let f = Fragment::new(r#"(name is "x") and (name is ")(")"#);
        assert_eq!(f.negate().as_str(), r#"not ((name is "x") and (name is ")("))"#);
    }

    #[test]
    fn test_negate_relationship() {
        let f = Fragment::new("a has (b is 1 and c is 2)");
        assert_eq!(f.negate().as_str(), "not (a has (b is 1 and c is 2))");
        assert_eq!(Fragment::new("a has (b is 1)").negate().as_str(), "not a has (b is 1)");
    }

    #[test]
    fn test_negate_partially_negated_conjunction() {
        let f = crate::and_!(!attr("a").equals(1), b = 2).unwrap();
        assert_eq!(f.as_str(), "not a is 1 and b is 2");
        assert_eq!(f.negate().as_str(), "not (not a is 1 and b is 2)");

        let group = crate::or_!(a = 0, b = 1).unwrap();
        let f = crate::and_!(!group, c = 2).unwrap();
        assert_eq!(f.as_str(), "not (a is 0 or b is 1) and c is 2");
        assert_eq!(f.negate().as_str(), "not (not (a is 0 or b is 1) and c is 2)");
    }

    #[test]
    fn test_negated_group_strips_back() {
        let f = Fragment::new("not (a is 0 or b is 1)");
        assert_eq!(f.negate().as_str(), "(a is 0 or b is 1)");
        assert_eq!(Fragment::new("not a has (b is 1)").negate().as_str(), "a has (b is 1)");
    }

    #[test]
    fn test_event_fragment_keeps_dialect() {
        let f = crate::event::attr("a").equals(1);
        assert_eq!(f.dialect(), Dialect::Event);
        assert_eq!(f.negate().dialect(), Dialect::Event);
        assert_eq!(Fragment::new("x").is_not(2).as_str(), "x is_not 2");
        assert_eq!(Fragment::with_dialect("x", Dialect::Event).is_not(2).as_str(), "x!=2");
        let joined = f.clone() & crate::event::attr("b").equals(2);
        assert_eq!(joined.dialect(), Dialect::Event);
        assert_eq!(joined.as_str(), "a=1 and b=2");
    }

    #[test]
    fn test_equality_ignores_dialect() {
        assert_eq!(Fragment::with_dialect("a=1", Dialect::Event), Fragment::new("a=1"));
    }

    #[test]
    fn test_call_is_rejected() {
        let err = attr("a").equals(1).call(2).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotCallable);
    }

    #[test]
    fn test_fragment_compare_aliases() {
        let f = Fragment::new("x");
        assert_eq!(f.is_(1).as_str(), "x is 1");
        assert_eq!(f.is_not("y").as_str(), r#"x is_not "y""#);
    }

    #[test]
    fn test_operators() {
        let left = attr("x").equals(1);
        let right = attr("y").equals(2);
        assert_eq!((left.clone() & right.clone()).as_str(), "x is 1 and y is 2");
        assert_eq!((left.clone() | right.clone()).as_str(), "(x is 1 or y is 2)");
        assert_eq!((left & right.to_string()).as_str(), "x is 1 and y is 2");
    }

    #[test]
    fn test_not_function() {
        let version = attr("version");
        assert_eq!(not_(version.equals(5)).unwrap().as_str(), "not version is 5");
        assert_eq!(
            not_(crate::args![version.equals(5), version = 6]).unwrap().as_str(),
            "not (version is 5 or version is 6)"
        );
    }
}
