//! Error types for expression building with actionable messages.
//!
//! Every error in this crate is a usage error: it reflects a mistake in the
//! way a query was put together, is raised at construction time and is never
//! retried.
//!
//! # Error Codes
//!
//! Error codes follow a pattern: Q{category}{number}
//! - 1xxx: Expression errors (membership, calling, attribute paths)
//! - 2xxx: Argument errors (missing keyword, nested sequences, sub-queries)
//! - 3xxx: Statement errors (entity types, sort order, sessions)
//! - 7xxx: Configuration errors
//!
//! ```rust
//! use trackql_query::{QueryError, ErrorCode};
//!
//! let err = QueryError::missing_keyword("Task(123)");
//! assert_eq!(err.code, ErrorCode::MissingKeyword);
//! assert!(err.to_string().starts_with("[Q2001]"));
//! ```

use std::fmt;
use thiserror::Error;

/// Result type for query building operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Expression errors (1xxx)
    /// A fragment was invoked as a function (Q1001).
    NotCallable = 1001,
    /// Membership syntax was used on an expression or fragment (Q1002).
    MembershipUnsupported = 1002,
    /// An attribute path segment was rejected (Q1003).
    InvalidAttributePath = 1003,

    // Argument errors (2xxx)
    /// An entity was passed without an attribute name (Q2001).
    MissingKeyword = 2001,
    /// A sub-query did not resolve to exactly one result (Q2002).
    AmbiguousSubqueryResult = 2002,
    /// A term sequence was mixed with other positional arguments (Q2003).
    NestedSequence = 2003,

    // Statement errors (3xxx)
    /// A statement selected from more than one entity type (Q3001).
    MixedEntityTypes = 3001,
    /// An ordering term used an unknown direction (Q3002).
    UnknownSortOrder = 3002,
    /// A statement was executed without a session (Q3003).
    UnboundSession = 3003,
    /// The session failed while executing a statement (Q3004).
    SessionFailed = 3004,

    // Configuration errors (7xxx)
    /// Invalid configuration (Q7001).
    InvalidConfiguration = 7001,
}

impl ErrorCode {
    /// Get the error code string (e.g., "Q2001").
    pub fn code(&self) -> String {
        format!("Q{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotCallable => "Fragment is not callable",
            Self::MembershipUnsupported => "Membership test is not supported",
            Self::InvalidAttributePath => "Invalid attribute path",
            Self::MissingKeyword => "Keyword required for entity",
            Self::AmbiguousSubqueryResult => "Sub-query did not return exactly one result",
            Self::NestedSequence => "Term sequence must be the only positional argument",
            Self::MixedEntityTypes => "Multiple base entity types selected",
            Self::UnknownSortOrder => "Unknown sort order",
            Self::UnboundSession => "Statement has no session bound to it",
            Self::SessionFailed => "Session failed",
            Self::InvalidConfiguration => "Invalid configuration",
        }
    }

    /// Check if this code is a usage error raised while building a query.
    pub fn is_usage(&self) -> bool {
        (*self as u16) < 3003
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Suggestion for fixing an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// The suggestion text.
    pub text: String,
    /// Optional code example.
    pub code: Option<String>,
}

impl Suggestion {
    /// Create a new suggestion.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code: None,
        }
    }

    /// Add a code example.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// The attribute path involved.
    pub attribute: Option<String>,
    /// The entity type involved.
    pub entity_type: Option<String>,
    /// The query text (if available).
    pub query: Option<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<Suggestion>,
    /// Help text.
    pub help: Option<String>,
}

/// Errors that can occur while building or executing a query.
#[derive(Error, Debug)]
pub struct QueryError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl QueryError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(Suggestion::new(suggestion));
        self
    }

    /// Add a code suggestion.
    pub fn with_code_suggestion(mut self, text: impl Into<String>, code: impl Into<String>) -> Self {
        self.context
            .suggestions
            .push(Suggestion::new(text).with_code(code));
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }

    /// Set the attribute path.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.context.attribute = Some(attribute.into());
        self
    }

    /// Set the entity type.
    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.context.entity_type = Some(entity_type.into());
        self
    }

    /// Set the query text.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.context.query = Some(query.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// A fragment was invoked like a function.
    pub fn not_callable(fragment: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotCallable, "'Fragment' object is not callable")
            .with_query(fragment)
            .with_help("Only attribute expressions can be called, as an alias for equality")
    }

    /// Membership syntax was used where only a boolean could be produced.
    pub fn membership_unsupported(attribute: impl Into<String>, value: impl fmt::Display) -> Self {
        let attribute = attribute.into();
        Self::new(ErrorCode::MembershipUnsupported, "'in' cannot be used to build a comparison")
            .with_code_suggestion(
                "Use a pattern match instead",
                format!("{attribute} like \"%{value}%\""),
            )
            .with_attribute(attribute)
    }

    /// An attribute path had an empty or malformed segment.
    pub fn invalid_attribute_path(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(
            ErrorCode::InvalidAttributePath,
            format!("invalid attribute path: {path:?}"),
        )
        .with_attribute(path)
        .with_suggestion("Separate attribute names with single dots, e.g. parent.name")
    }

    /// An entity was given positionally, so there is nothing to compare it with.
    pub fn missing_keyword(entity: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::MissingKeyword,
            format!("keyword required for {entity}"),
        )
        .with_code_suggestion(
            "Name the attribute the entity should be compared against",
            "and_!(parent = entity)",
        )
    }

    /// A sub-query resolved to zero or several results.
    pub fn ambiguous_subquery(found: usize, query: impl Into<String>) -> Self {
        let message = if found == 0 {
            "sub-query returned no results, expected exactly one".to_string()
        } else {
            format!("sub-query returned {found} results, expected exactly one")
        };
        Self::new(ErrorCode::AmbiguousSubqueryResult, message)
            .with_query(query)
            .with_suggestion("Add more specific filters to narrow the sub-query down to a single result")
    }

    /// A term sequence was not the sole positional argument.
    pub fn nested_sequence(position: usize) -> Self {
        Self::new(
            ErrorCode::NestedSequence,
            format!("term sequence at position {position} must be the only positional argument"),
        )
        .with_suggestion("Chain the extra terms onto the sequence before passing it in")
    }

    /// A statement mixed base entity types.
    pub fn mixed_entity_types(first: &str, second: &str) -> Self {
        Self::new(
            ErrorCode::MixedEntityTypes,
            format!("selecting multiple base types is not supported ({first}, {second})"),
        )
        .with_entity_type(first)
    }

    /// An ordering term could not be parsed.
    pub fn unknown_sort_order(method: impl Into<String>) -> Self {
        let method = method.into();
        Self::new(
            ErrorCode::UnknownSortOrder,
            format!("unknown sorting method: {method:?}"),
        )
        .with_suggestion("Use one of: asc, ascending, desc, descending")
    }

    /// A statement was executed without a session.
    pub fn unbound_session(entity_type: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnboundSession, "statement has no session bound to it")
            .with_entity_type(entity_type)
            .with_code_suggestion("Bind a session first", "select(\"Task\")?.bind(session)")
    }

    /// Wrap a failure reported by a session.
    pub fn session<E: std::error::Error + Send + Sync + 'static>(query: impl Into<String>, source: E) -> Self {
        Self::new(ErrorCode::SessionFailed, format!("session failed: {source}"))
            .with_query(query)
            .with_source(source)
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InvalidConfiguration,
            format!("invalid configuration: {}", message.into()),
        )
    }

    // ============== Error Checks ==============

    /// Check if this error was raised while building a query.
    pub fn is_usage(&self) -> bool {
        self.code.is_usage()
    }

    /// Display the full error with all context and suggestions.
    pub fn display_full(&self) -> String {
        let mut output = format!("Error [{}]: {}\n", self.code.code(), self.message);

        if let Some(ref attribute) = self.context.attribute {
            output.push_str(&format!("  → Attribute: {}\n", attribute));
        }
        if let Some(ref entity_type) = self.context.entity_type {
            output.push_str(&format!("  → Entity: {}\n", entity_type));
        }
        if let Some(ref query) = self.context.query {
            let shown = if query.chars().count() > 200 {
                format!("{}...", query.chars().take(200).collect::<String>())
            } else {
                query.clone()
            };
            output.push_str(&format!("  → Query: {}\n", shown));
        }

        if !self.context.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for (i, suggestion) in self.context.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion.text));
                if let Some(ref code) = suggestion.code {
                    output.push_str(&format!("     {}\n", code));
                }
            }
        }

        if let Some(ref help) = self.context.help {
            output.push_str(&format!("\nHelp: {}\n", help));
        }

        output
    }
}
