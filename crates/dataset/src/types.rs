//! Core value types shared by every layer of the dataset crate.
//!
//! Key Rust concepts demonstrated here:
//! - Type aliases for domain clarity (InnerId)
//! - Enums as tagged unions for dynamically typed input (RawId, FieldValue)
//! - `From` conversions so callers can write `1.into()` or `"a".into()`

use serde::Serialize;
use std::fmt;

// =============================================================================
// Identifiers
// =============================================================================

/// Dense, zero-based id assigned in order of first appearance
pub type InnerId = usize;

/// Caller-supplied identifier for a user or item.
///
/// Source data mixes integer and string ids, so both are accepted. The two
/// variants never compare equal: `Int(9)` and `Str("9")` are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum RawId {
    Int(i64),
    Str(String),
}

impl RawId {
    /// Interpret text the way the file parser types an id column.
    ///
    /// Yields `Int` only for canonical integer text, so `"42"` becomes
    /// `Int(42)` while `"0195153448"` and `"+7"` stay strings.
    pub fn infer(text: &str) -> Self {
        match text.parse::<i64>() {
            Ok(n) if n.to_string() == text => RawId::Int(n),
            _ => RawId::Str(text.to_string()),
        }
    }
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Int(n) => write!(f, "{}", n),
            RawId::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RawId {
    fn from(n: i64) -> Self {
        RawId::Int(n)
    }
}

impl From<i32> for RawId {
    fn from(n: i32) -> Self {
        RawId::Int(n as i64)
    }
}

impl From<u32> for RawId {
    fn from(n: u32) -> Self {
        RawId::Int(n as i64)
    }
}

impl From<&str> for RawId {
    fn from(s: &str) -> Self {
        RawId::Str(s.to_string())
    }
}

impl From<String> for RawId {
    fn from(s: String) -> Self {
        RawId::Str(s)
    }
}

/// The two entity kinds a trainset indexes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Item,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::User => write!(f, "user"),
            EntityKind::Item => write!(f, "item"),
        }
    }
}

/// Either side of the raw/inner id translation, used by info lookups
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityId {
    Raw(RawId),
    Inner(InnerId),
}

impl From<RawId> for EntityId {
    fn from(id: RawId) -> Self {
        EntityId::Raw(id)
    }
}

// =============================================================================
// Field values
// =============================================================================

/// A single cell of a tabular source
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Str(String),
    Null,
}

impl FieldValue {
    /// Numeric view of the cell, `None` for strings and nulls
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(n) => Some(*n as f64),
            FieldValue::Float(x) => Some(*x),
            FieldValue::Str(_) | FieldValue::Null => None,
        }
    }

    /// Interpret the cell as an entity id. Floats and nulls are not ids.
    pub fn to_raw_id(&self) -> Option<RawId> {
        match self {
            FieldValue::Int(n) => Some(RawId::Int(*n)),
            FieldValue::Str(s) => Some(RawId::Str(s.clone())),
            FieldValue::Float(_) | FieldValue::Null => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldValue::Int(_) | FieldValue::Float(_))
    }

    /// Search equality: numbers compare by value whatever their variant,
    /// text cells compare against the query's text form, and a text query
    /// against a numeric cell is parsed first.
    pub fn matches(&self, query: &FieldValue) -> bool {
        match (self, query) {
            (FieldValue::Null, FieldValue::Null) => true,
            (FieldValue::Null, _) | (_, FieldValue::Null) => false,
            (FieldValue::Str(cell), _) => *cell == query.to_string(),
            (_, FieldValue::Str(text)) => text.trim().parse::<f64>().ok() == self.as_f64(),
            _ => self.as_f64() == query.as_f64(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(n) => write!(f, "{}", n),
            FieldValue::Float(x) => write!(f, "{}", x),
            FieldValue::Str(s) => write!(f, "{}", s),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Int(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Int(n as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(x: f64) -> Self {
        FieldValue::Float(x)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<RawId> for FieldValue {
    fn from(id: RawId) -> Self {
        match id {
            RawId::Int(n) => FieldValue::Int(n),
            RawId::Str(s) => FieldValue::Str(s),
        }
    }
}

// =============================================================================
// Rating Type
// =============================================================================

/// One raw (user, item, rating) record, immutable once ingested
#[derive(Debug, Clone, PartialEq)]
pub struct RawRating {
    pub user: RawId,
    pub item: RawId,
    pub rating: f64,
    /// Accepted for completeness, unused by the index
    pub timestamp: Option<i64>,
}

impl RawRating {
    pub fn new(user: impl Into<RawId>, item: impl Into<RawId>, rating: f64) -> Self {
        Self {
            user: user.into(),
            item: item.into(),
            rating,
            timestamp: None,
        }
    }
}
