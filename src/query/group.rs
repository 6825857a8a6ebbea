//! # Grouping and Distinct Evaluation

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;

/// Expression producing a grouping key from a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyExpr {
    /// Field value, if a non-empty string or a number
    Field(String),

    /// Last `len` characters of a string field
    Suffix { field: String, len: usize },

    /// First expression that yields a key
    Coalesce(Vec<KeyExpr>),
}

impl KeyExpr {
    pub fn evaluate(&self, doc: &Value) -> Option<String> {
        match self {
            KeyExpr::Field(field) => match doc.get(field)? {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            },
            KeyExpr::Suffix { field, len } => {
                let s = doc.get(field)?.as_str()?;
                let count = s.chars().count();
                if count < *len || *len == 0 {
                    return None;
                }
                Some(s.chars().skip(count - len).collect())
            }
            KeyExpr::Coalesce(exprs) => exprs.iter().find_map(|e| e.evaluate(doc)),
        }
    }
}

/// Group documents by `key` and count each group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    pub key: KeyExpr,
}

/// One output row of a grouping
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub key: Option<String>,
    pub count: u64,
}

/// Count documents per key. Rows are ordered by key, the keyless group first.
pub fn group_count<'a>(docs: impl IntoIterator<Item = &'a Value>, spec: &GroupSpec) -> Vec<GroupCount> {
    let mut groups: BTreeMap<Option<String>, u64> = BTreeMap::new();
    for doc in docs {
        *groups.entry(spec.key.evaluate(doc)).or_insert(0) += 1;
    }
    groups
        .into_iter()
        .map(|(key, count)| GroupCount { key, count })
        .collect()
}

/// Unique non-null values of `field`, in first-seen order
pub fn distinct_values<'a>(docs: impl IntoIterator<Item = &'a Value>, field: &str) -> Vec<Value> {
    let mut seen = BTreeSet::new();
    let mut values = Vec::new();
    for value in docs.into_iter().filter_map(|doc| doc.get(field)) {
        if value.is_null() {
            continue;
        }
        if seen.insert(value.to_string()) {
            values.push(value.clone());
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn district_key() -> KeyExpr {
        KeyExpr::Coalesce(vec![
            KeyExpr::Field("district".to_string()),
            KeyExpr::Suffix {
                field: "postal_code".to_string(),
                len: 2,
            },
        ])
    }

    #[test]
    fn test_coalesce_prefers_first_expression() {
        let key = district_key();
        assert_eq!(key.evaluate(&json!({"district": "7e", "postal_code": "75007"})), Some("7e".into()));
        assert_eq!(key.evaluate(&json!({"district": "", "postal_code": "75007"})), Some("07".into()));
        assert_eq!(key.evaluate(&json!({"postal_code": "7"})), None);
        assert_eq!(key.evaluate(&json!({})), None);
    }

    #[test]
    fn test_group_count_orders_keys() {
        let docs = vec![
            json!({"postal_code": "75015"}),
            json!({"postal_code": "75008"}),
            json!({"postal_code": "69008"}),
            json!({}),
        ];
        let rows = group_count(&docs, &GroupSpec { key: district_key() });
        assert_eq!(
            rows,
            vec![
                GroupCount { key: None, count: 1 },
                GroupCount { key: Some("08".into()), count: 2 },
                GroupCount { key: Some("15".into()), count: 1 },
            ]
        );
    }

    #[test]
    fn test_distinct_values_each_once() {
        let docs = vec![
            json!({"category": "park"}),
            json!({"category": "park"}),
            json!({"category": "museum"}),
            json!({"category": null}),
        ];
        assert_eq!(distinct_values(&docs, "category"), vec![json!("park"), json!("museum")]);
    }
}
