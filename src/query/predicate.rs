//! # Predicate AST
//!
//! Store-agnostic filter conditions over JSON documents, plus the
//! ordering rules used when sorting results.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use regex::{Regex, RegexBuilder};
use serde_json::Value;

use crate::store::ObjectId;

/// Field holding every document's identifier
pub const ID_FIELD: &str = "_id";

/// Upper bound on compiled pattern size
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// A compiled regular expression that remembers its source
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    case_insensitive: bool,
    regex: Regex,
}

impl Pattern {
    /// Compile `source` as a regular expression
    pub fn new(source: impl Into<String>, case_insensitive: bool) -> Result<Self, regex::Error> {
        let source = source.into();
        let regex = RegexBuilder::new(&source)
            .case_insensitive(case_insensitive)
            .size_limit(PATTERN_SIZE_LIMIT)
            .build()?;
        Ok(Self {
            source,
            case_insensitive,
            regex,
        })
    }

    /// Matches `text` anywhere, ignoring case. `text` is taken literally.
    pub fn contains(text: &str) -> Result<Self, regex::Error> {
        Self::new(regex::escape(text), true)
    }

    /// Matches values ending with `text`, case-sensitively. `text` is taken literally.
    pub fn ends_with(text: &str) -> Result<Self, regex::Error> {
        Self::new(format!("{}$", regex::escape(text)), false)
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.case_insensitive == other.case_insensitive
    }
}

/// A filter condition evaluated against one document
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Every document
    All,

    /// `_id` equals the given identifier
    IdEquals(ObjectId),

    /// Field is a string matching the pattern
    Matches { field: String, pattern: Pattern },

    /// Field is present and not null
    NotNull { field: String },

    /// Field is an array with at least `min` entries
    MinItems { field: String, min: usize },

    /// Field is a timestamp in `[start, end)`
    DateRange {
        field: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Any child matches
    Or(Vec<Predicate>),

    /// Every child matches
    And(Vec<Predicate>),
}

impl Predicate {
    pub fn matches_pattern(field: impl Into<String>, pattern: Pattern) -> Self {
        Self::Matches {
            field: field.into(),
            pattern,
        }
    }

    pub fn not_null(field: impl Into<String>) -> Self {
        Self::NotNull {
            field: field.into(),
        }
    }

    pub fn min_items(field: impl Into<String>, min: usize) -> Self {
        Self::MinItems {
            field: field.into(),
            min,
        }
    }

    /// Check if a document satisfies this predicate
    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Predicate::All => true,
            Predicate::IdEquals(id) => doc
                .get(ID_FIELD)
                .and_then(Value::as_str)
                .and_then(|raw| raw.parse::<ObjectId>().ok())
                .is_some_and(|found| found == *id),
            Predicate::Matches { field, pattern } => doc
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|s| pattern.is_match(s)),
            Predicate::NotNull { field } => doc.get(field).is_some_and(|v| !v.is_null()),
            Predicate::MinItems { field, min } => doc
                .get(field)
                .and_then(Value::as_array)
                .is_some_and(|items| items.len() >= *min),
            Predicate::DateRange { field, start, end } => doc
                .get(field)
                .and_then(Value::as_str)
                .and_then(parse_timestamp)
                .is_some_and(|t| t >= *start && t < *end),
            Predicate::Or(children) => children.iter().any(|p| p.matches(doc)),
            Predicate::And(children) => children.iter().all(|p| p.matches(doc)),
        }
    }
}

/// Parse an RFC 3339 timestamp, or a bare `YYYY-MM-DD` date taken as UTC midnight
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Sort order for query results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub ascending: bool,
}

impl SortSpec {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: true,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: false,
        }
    }

    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        let cmp = compare_json_values(a.get(&self.field), b.get(&self.field));
        if self.ascending {
            cmp
        } else {
            cmp.reverse()
        }
    }
}

/// Order two optional field values. Present values sort before missing ones;
/// strings that both parse as timestamps compare chronologically.
fn compare_json_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .unwrap_or(0.0)
            .partial_cmp(&b.as_f64().unwrap_or(0.0))
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => {
            match (parse_timestamp(a), parse_timestamp(b)) {
                (Some(ta), Some(tb)) => ta.cmp(&tb),
                _ => a.cmp(b),
            }
        }
        (Some(Value::Null), Some(Value::Null)) => Ordering::Equal,
        (Some(Value::Null), Some(_)) => Ordering::Greater,
        (Some(_), Some(Value::Null)) => Ordering::Less,
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}
