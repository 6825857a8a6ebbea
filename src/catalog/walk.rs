//! # Walk Records
//!
//! The typed read model ([`Walk`]) and the validated write inputs
//! ([`NewWalk`], [`WalkPatch`]). Write inputs are built from raw JSON
//! through one field table so creation and patching normalize values the
//! same way.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::query::{parse_timestamp, Update, ID_FIELD};
use crate::store::StoreError;

use super::errors::{CatalogError, CatalogResult};
use super::identifier::WalkId;

/// Document field names
pub mod fields {
    pub const NAME: &str = "name";
    pub const ADDRESS: &str = "address";
    pub const CATEGORY: &str = "category";
    pub const POSTAL_CODE: &str = "postal_code";
    pub const DISTRICT: &str = "district";
    pub const ROUTE: &str = "route";
    pub const KEYWORDS: &str = "keywords";
    pub const INTRO_TEXT: &str = "intro_text";
    pub const DESCRIPTION_TEXT: &str = "description_text";
    pub const SITE_URL: &str = "site_url";
    pub const PUBLICATION_DATE: &str = "publication_date";
    pub const IMAGE_URL: &str = "image_url";
    pub const IMAGE_COPYRIGHT: &str = "image_copyright";
    pub const IMAGE_CAPTION: &str = "image_caption";
    pub const ENTRY_DATE: &str = "entry_date";
    pub const CITY: &str = "city";
    pub const IMAGE_FILE: &str = "image_file";
    pub const GEO_SHAPE: &str = "geo_shape";
    pub const GEO_POINT: &str = "geo_point";
}

/// Fields that must be non-empty on every record
pub const REQUIRED_FIELDS: [&str; 3] = [fields::NAME, fields::ADDRESS, fields::CATEGORY];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    RequiredText,
    Text,
    Code,
    Keywords,
    Timestamp,
    Opaque,
}

const FIELD_TABLE: &[(&str, FieldKind)] = &[
    (fields::NAME, FieldKind::RequiredText),
    (fields::ADDRESS, FieldKind::RequiredText),
    (fields::CATEGORY, FieldKind::RequiredText),
    (fields::POSTAL_CODE, FieldKind::Code),
    (fields::DISTRICT, FieldKind::Code),
    (fields::ROUTE, FieldKind::Text),
    (fields::KEYWORDS, FieldKind::Keywords),
    (fields::INTRO_TEXT, FieldKind::Text),
    (fields::DESCRIPTION_TEXT, FieldKind::Text),
    (fields::SITE_URL, FieldKind::Text),
    (fields::PUBLICATION_DATE, FieldKind::Timestamp),
    (fields::IMAGE_URL, FieldKind::Text),
    (fields::IMAGE_COPYRIGHT, FieldKind::Text),
    (fields::IMAGE_CAPTION, FieldKind::Text),
    (fields::ENTRY_DATE, FieldKind::Text),
    (fields::CITY, FieldKind::Text),
    (fields::IMAGE_FILE, FieldKind::Text),
    (fields::GEO_SHAPE, FieldKind::Opaque),
    (fields::GEO_POINT, FieldKind::Opaque),
];

fn field_kind(name: &str) -> Option<FieldKind> {
    FIELD_TABLE
        .iter()
        .find(|(field, _)| *field == name)
        .map(|(_, kind)| *kind)
}

/// Check and normalize one submitted field value
fn normalize_field(name: &str, kind: FieldKind, value: Value) -> CatalogResult<Value> {
    match (kind, value) {
        (FieldKind::RequiredText, Value::String(s)) if !s.trim().is_empty() => Ok(Value::String(s)),
        (FieldKind::RequiredText, _) => Err(CatalogError::invalid_input(format!(
            "'{}' must be a non-empty string",
            name
        ))),

        (_, Value::Null) if kind == FieldKind::Keywords => Ok(Value::Array(Vec::new())),
        (_, Value::Null) => Ok(Value::Null),

        (FieldKind::Text, Value::String(s)) => Ok(Value::String(s)),
        (FieldKind::Code, Value::String(s)) => Ok(Value::String(s)),
        (FieldKind::Code, Value::Number(n)) if n.is_u64() => Ok(Value::String(n.to_string())),

        (FieldKind::Keywords, Value::Array(items)) if items.iter().all(Value::is_string) => {
            Ok(Value::Array(items))
        }

        (FieldKind::Timestamp, Value::String(s)) => parse_timestamp(&s)
            .map(|t| Value::String(t.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
            .ok_or_else(|| {
                CatalogError::invalid_input(format!("'{}' must be an RFC 3339 timestamp or YYYY-MM-DD date", name))
            }),

        (FieldKind::Opaque, other) => Ok(other),

        (FieldKind::Text, _) => Err(CatalogError::invalid_input(format!("'{}' must be a string", name))),
        (FieldKind::Code, _) => Err(CatalogError::invalid_input(format!(
            "'{}' must be a string or a non-negative integer",
            name
        ))),
        (FieldKind::Keywords, _) => Err(CatalogError::invalid_input(format!(
            "'{}' must be an array of strings",
            name
        ))),
        (FieldKind::Timestamp, _) => Err(CatalogError::invalid_input(format!(
            "'{}' must be a timestamp string",
            name
        ))),
    }
}

/// Validate a raw body into normalized known fields. Unknown fields are dropped.
fn normalize_body(body: Value) -> CatalogResult<Map<String, Value>> {
    let Value::Object(raw) = body else {
        return Err(CatalogError::invalid_input("body must be a JSON object"));
    };
    if raw.contains_key(ID_FIELD) {
        return Err(CatalogError::invalid_input("'_id' is assigned by the store and cannot be set"));
    }

    let mut normalized = Map::new();
    for (name, value) in raw {
        if let Some(kind) = field_kind(&name) {
            let value = normalize_field(&name, kind, value)?;
            normalized.insert(name, value);
        }
    }
    Ok(normalized)
}

/// A validated creation request
#[derive(Debug, Clone, PartialEq)]
pub struct NewWalk {
    document: Map<String, Value>,
}

impl NewWalk {
    /// Validate a creation body. `name`, `address` and `category` are required.
    pub fn from_json(body: Value) -> CatalogResult<Self> {
        if let Value::Object(raw) = &body {
            for required in REQUIRED_FIELDS {
                if raw.get(required).map_or(true, Value::is_null) {
                    return Err(CatalogError::invalid_input(format!(
                        "missing required field '{}'",
                        required
                    )));
                }
            }
        }

        let mut document = normalize_body(body)?;
        document
            .entry(fields::KEYWORDS.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        Ok(Self { document })
    }

    pub fn into_document(self) -> Value {
        Value::Object(self.document)
    }
}

/// A validated partial update. Only submitted known fields are touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalkPatch {
    set: Map<String, Value>,
}

impl WalkPatch {
    /// Validate a patch body. Submitted `null` clears optional fields;
    /// required fields cannot be cleared or blanked.
    pub fn from_json(body: Value) -> CatalogResult<Self> {
        Ok(Self {
            set: normalize_body(body)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.set.keys().map(String::as_str)
    }

    pub fn into_update(self) -> Update {
        Update::Set(self.set)
    }
}

/// A stored walk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Walk {
    #[serde(rename = "_id")]
    pub id: WalkId,
    pub name: String,
    pub address: String,
    pub category: String,
    #[serde(default, deserialize_with = "code_opt", skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, deserialize_with = "code_opt", skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,
    #[serde(default, deserialize_with = "timestamp_opt", skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_copyright: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_shape: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_point: Option<Value>,
}

impl Walk {
    /// Decode a stored document. A document that does not fit the model is
    /// a store-side fault, not a caller error.
    pub fn from_document(doc: Value) -> CatalogResult<Self> {
        serde_json::from_value(doc)
            .map_err(|e| CatalogError::Persistence(StoreError::invalid_document(e.to_string())))
    }
}

fn code_opt<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, found {}",
            other
        ))),
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn timestamp_opt<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", raw))),
    }
}
