//! # Update Operators
//!
//! Mutations a store applies to each matched document.

use serde_json::{Map, Value};

use crate::store::{StoreError, StoreResult};

use super::predicate::ID_FIELD;

#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Overwrite the listed fields, leaving all others untouched
    Set(Map<String, Value>),

    /// Append `value` to the array at `field` unless an equal entry exists.
    /// A missing or null field becomes a one-element array.
    AddToSet { field: String, value: Value },
}

impl Update {
    pub fn set_field(field: impl Into<String>, value: Value) -> Self {
        let mut fields = Map::new();
        fields.insert(field.into(), value);
        Self::Set(fields)
    }

    pub fn add_to_set(field: impl Into<String>, value: Value) -> Self {
        Self::AddToSet {
            field: field.into(),
            value,
        }
    }

    /// Apply to one document in place. Returns whether the document changed.
    pub fn apply(&self, doc: &mut Value) -> StoreResult<bool> {
        let obj = doc
            .as_object_mut()
            .ok_or_else(|| StoreError::invalid_document("stored document is not an object"))?;

        match self {
            Update::Set(fields) => {
                if fields.contains_key(ID_FIELD) {
                    return Err(StoreError::invalid_document("_id is immutable"));
                }
                let mut changed = false;
                for (key, value) in fields {
                    if obj.get(key) != Some(value) {
                        obj.insert(key.clone(), value.clone());
                        changed = true;
                    }
                }
                Ok(changed)
            }
            Update::AddToSet { field, value } => {
                if field == ID_FIELD {
                    return Err(StoreError::invalid_document("_id is immutable"));
                }
                match obj.get_mut(field) {
                    None | Some(Value::Null) => {
                        obj.insert(field.clone(), Value::Array(vec![value.clone()]));
                        Ok(true)
                    }
                    Some(Value::Array(items)) => {
                        if items.contains(value) {
                            Ok(false)
                        } else {
                            items.push(value.clone());
                            Ok(true)
                        }
                    }
                    Some(_) => Err(StoreError::invalid_document(format!(
                        "field '{}' is not an array",
                        field
                    ))),
                }
            }
        }
    }
}
