//! Comparison values and the entity-reference protocol.
//!
//! Every raw value placed into a query goes through [`Value::render`]:
//!
//! - `None` becomes the bare token `none`
//! - numbers (and booleans) are written as-is
//! - entities are written as their quoted identifier (the caller is expected to
//!   compare against the `.id` sub-attribute, see [`Value::is_entity`])
//! - anything else is written inside double quotes
//!
//! ```rust
//! use trackql_query::{EntityRef, Value};
//!
//! assert_eq!(Value::from(5).render(), "5");
//! assert_eq!(Value::from("c").render(), "\"c\"");
//! assert_eq!(Value::None.render(), "none");
//! assert_eq!(Value::from(EntityRef::new("Task", "123")).render(), "\"123\"");
//! ```

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// An object on the remote service that can be referenced by its identifier.
pub trait Entity {
    /// The entity type name, e.g. `Task`.
    fn entity_type(&self) -> &str;

    /// The unique identifier of the entity.
    fn id(&self) -> &str;

    /// Capture this entity as a plain reference.
    fn to_ref(&self) -> EntityRef {
        EntityRef::new(self.entity_type(), self.id())
    }
}

/// A lightweight reference to a remote entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// The entity type name.
    pub entity_type: SmolStr,
    /// The unique identifier.
    pub id: String,
}

impl EntityRef {
    /// Create a new entity reference.
    pub fn new(entity_type: impl Into<SmolStr>, id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Look up a field by key. Only `id` is known to a bare reference.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "id" => Some(&self.id),
            _ => None,
        }
    }
}

impl Entity for EntityRef {
    fn entity_type(&self) -> &str {
        &self.entity_type
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn to_ref(&self) -> EntityRef {
        self.clone()
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}({})>", self.entity_type, self.id)
    }
}

/// A raw comparison value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null value, rendered as `none`.
    None,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Entity reference, compared by identifier.
    Entity(EntityRef),
    /// Anything else, rendered by its textual representation.
    Text(String),
}

impl Value {
    /// Check if this is a null value.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Check if this value refers to an entity.
    pub fn is_entity(&self) -> bool {
        matches!(self, Self::Entity(_))
    }

    /// Wrap anything printable as a text value.
    pub fn display(value: impl fmt::Display) -> Self {
        Self::Text(value.to_string())
    }

    /// Render the value as it appears on the right side of a comparison.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    /// Write the rendered value into a buffer.
    pub fn write_to(&self, buf: &mut String) {
        match self {
            Self::None => buf.push_str("none"),
            Self::Bool(true) => buf.push_str("True"),
            Self::Bool(false) => buf.push_str("False"),
            Self::Int(v) => buf.push_str(&v.to_string()),
            // `{:?}` keeps the fractional marker: `1.0`, not `1`.
            Self::Float(v) => buf.push_str(&format!("{v:?}")),
            Self::Entity(entity) => quote_into(buf, &entity.id),
            Self::Text(text) => quote_into(buf, text),
        }
    }

    /// Render the value as a literal for `values(...)` previews.
    pub fn literal(&self) -> String {
        match self {
            Self::None => "None".to_string(),
            Self::Text(text) => format!("'{}'", text),
            Self::Entity(entity) => entity.to_string(),
            other => other.render(),
        }
    }
}

fn quote_into(buf: &mut String, text: &str) {
    buf.reserve(text.len() + 2);
    buf.push('"');
    buf.push_str(text);
    buf.push('"');
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(v) => Self::Int(v),
            Err(_) => Self::Text(v.to_string()),
        }
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Self::from(v as u64)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Self::Text(v.clone())
    }
}

impl From<SmolStr> for Value {
    fn from(v: SmolStr) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<EntityRef> for Value {
    fn from(v: EntityRef) -> Self {
        Self::Entity(v)
    }
}

impl From<&EntityRef> for Value {
    fn from(v: &EntityRef) -> Self {
        Self::Entity(v.clone())
    }
}

impl From<uuid::Uuid> for Value {
    fn from(v: uuid::Uuid) -> Self {
        Self::Text(v.to_string())
    }
}

impl<Tz: chrono::TimeZone> From<chrono::DateTime<Tz>> for Value
where
    Tz::Offset: fmt::Display,
{
    fn from(v: chrono::DateTime<Tz>) -> Self {
        Self::Text(v.to_rfc3339())
    }
}

impl From<chrono::NaiveDate> for Value {
    fn from(v: chrono::NaiveDate) -> Self {
        Self::Text(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::None,
        }
    }
}
