//! # Aggregation Planner
//!
//! Grouping, distinct and count plans over the walk collection.

use crate::query::{GroupSpec, KeyExpr, Predicate};

use super::filter::DistrictCode;
use super::walk::fields;

/// Count walks per grouping key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPlan {
    pub spec: GroupSpec,
}

/// Unique values of one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistinctPlan {
    pub field: &'static str,
}

/// Number of walks matching a predicate
#[derive(Debug, Clone, PartialEq)]
pub struct CountPlan {
    pub predicate: Predicate,
}

pub struct AggregationPlanner;

impl AggregationPlanner {
    /// Group by district: the explicit `district` field when set, otherwise
    /// the last two characters of the postal code.
    pub fn group_count_by_district() -> GroupPlan {
        GroupPlan {
            spec: GroupSpec {
                key: KeyExpr::Coalesce(vec![
                    KeyExpr::Field(fields::DISTRICT.to_string()),
                    KeyExpr::Suffix {
                        field: fields::POSTAL_CODE.to_string(),
                        len: DistrictCode::LEN,
                    },
                ]),
            },
        }
    }

    pub fn distinct_categories() -> DistinctPlan {
        DistinctPlan {
            field: fields::CATEGORY,
        }
    }

    pub fn count_matching(predicate: Predicate) -> CountPlan {
        CountPlan { predicate }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::group::group_count;
    use serde_json::json;

    #[test]
    fn test_district_plan_prefers_explicit_district() {
        let plan = AggregationPlanner::group_count_by_district();
        let docs = vec![
            json!({"district": "8", "postal_code": "75008"}),
            json!({"postal_code": "75008"}),
            json!({"postal_code": "75015"}),
        ];
        let rows = group_count(&docs, &plan.spec);
        let keys: Vec<Option<&str>> = rows.iter().map(|r| r.key.as_deref()).collect();
        assert_eq!(keys, vec![Some("08"), Some("15"), Some("8")]);
    }

    #[test]
    fn test_distinct_categories_targets_category() {
        assert_eq!(AggregationPlanner::distinct_categories().field, "category");
    }

    #[test]
    fn test_count_plan_wraps_predicate() {
        let plan = AggregationPlanner::count_matching(Predicate::All);
        assert_eq!(plan.predicate, Predicate::All);
    }
}
