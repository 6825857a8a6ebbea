//! Walk identifiers
//!
//! Raw identifiers from callers are parsed here before any store access.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::query::Predicate;
use crate::store::ObjectId;

use super::errors::{CatalogError, CatalogResult};

/// True only for identifiers in the store's native 24-hex-digit format
pub fn is_valid_identifier(raw: &str) -> bool {
    ObjectId::is_valid(raw)
}

/// A structurally valid walk identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalkId(ObjectId);

impl WalkId {
    /// Parse a caller-supplied identifier, normalizing to lowercase
    pub fn parse(raw: &str) -> CatalogResult<Self> {
        raw.parse::<ObjectId>()
            .map(Self)
            .map_err(|_| CatalogError::InvalidIdentifier(raw.to_string()))
    }

    /// Predicate selecting exactly this record
    pub fn predicate(&self) -> Predicate {
        Predicate::IdEquals(self.0)
    }
}

impl From<ObjectId> for WalkId {
    fn from(id: ObjectId) -> Self {
        Self(id)
    }
}

impl fmt::Display for WalkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
