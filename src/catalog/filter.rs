//! # Filter Builder
//!
//! Turns named catalog queries and raw caller parameters into
//! [`Predicate`]s. Raw strings are parsed into typed values first; user
//! text is always escaped before it reaches a regular expression.

use chrono::{DateTime, NaiveDate, Utc};

use crate::query::{Pattern, Predicate, SortSpec};

use super::errors::{CatalogError, CatalogResult};
use super::walk::fields;

/// Keyword count at which a walk counts as keyword-rich
pub const MANY_KEYWORDS_THRESHOLD: usize = 6;

/// A two-digit administrative district code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistrictCode(String);

impl DistrictCode {
    pub const LEN: usize = 2;

    /// Accepts exactly two ASCII digits
    pub fn parse(raw: &str) -> CatalogResult<Self> {
        if raw.len() != Self::LEN || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CatalogError::invalid_parameter(format!(
                "district code must be exactly {} digits, got '{}'",
                Self::LEN,
                raw
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A calendar year with its half-open UTC bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicationYear {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl PublicationYear {
    pub fn new(year: i32) -> CatalogResult<Self> {
        let out_of_range =
            || CatalogError::invalid_parameter(format!("year {} is out of range", year));
        let start = year_start(year).ok_or_else(out_of_range)?;
        let end = year
            .checked_add(1)
            .and_then(year_start)
            .ok_or_else(out_of_range)?;
        Ok(Self { start, end })
    }

    /// Parse a decimal year such as `"2021"`
    pub fn parse(raw: &str) -> CatalogResult<Self> {
        let year = raw.trim().parse::<i32>().map_err(|_| {
            CatalogError::invalid_parameter(format!("year must be an integer, got '{}'", raw))
        })?;
        Self::new(year)
    }

    /// Jan 1 of the year, inclusive
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Jan 1 of the following year, exclusive
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

fn year_start(year: i32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn pattern_error(e: regex::Error) -> CatalogError {
    CatalogError::invalid_parameter(format!("search text cannot be matched: {}", e))
}

/// Builds predicates for each named catalog query
pub struct FilterBuilder;

impl FilterBuilder {
    /// `query` appears, ignoring case, in the name or the intro text.
    /// An empty query matches every walk.
    pub fn text_search(query: &str) -> CatalogResult<Predicate> {
        let pattern = Pattern::contains(query).map_err(pattern_error)?;
        Ok(Predicate::Or(vec![
            Predicate::matches_pattern(fields::NAME, pattern.clone()),
            Predicate::matches_pattern(fields::INTRO_TEXT, pattern),
        ]))
    }

    /// The walk has a site URL
    pub fn has_site() -> Predicate {
        Predicate::not_null(fields::SITE_URL)
    }

    /// The walk has at least six keywords
    pub fn many_keywords() -> Predicate {
        Predicate::min_items(fields::KEYWORDS, MANY_KEYWORDS_THRESHOLD)
    }

    /// Published within the calendar year
    pub fn published_in_year(year: &PublicationYear) -> Predicate {
        Predicate::DateRange {
            field: fields::PUBLICATION_DATE.to_string(),
            start: year.start(),
            end: year.end(),
        }
    }

    /// Results of [`Self::published_in_year`] are ordered by this
    pub fn publication_order() -> SortSpec {
        SortSpec::ascending(fields::PUBLICATION_DATE)
    }

    /// The postal code ends with the district code
    pub fn in_district(code: &DistrictCode) -> CatalogResult<Predicate> {
        let pattern = Pattern::ends_with(code.as_str()).map_err(pattern_error)?;
        Ok(Predicate::matches_pattern(fields::POSTAL_CODE, pattern))
    }

    /// The description contains `pattern`, ignoring case
    pub fn description_matches(pattern: &str) -> CatalogResult<Predicate> {
        let pattern = Pattern::contains(pattern).map_err(pattern_error)?;
        Ok(Predicate::matches_pattern(fields::DESCRIPTION_TEXT, pattern))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ErrorKind;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_district_code_parse() {
        assert_eq!(DistrictCode::parse("08").unwrap().as_str(), "08");
        for bad in ["8", "008", "ab", "7a", "", "٠٨"] {
            let err = DistrictCode::parse(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidParameter, "{bad}");
        }
    }

    #[test]
    fn test_publication_year_bounds() {
        let year = PublicationYear::parse("2021").unwrap();
        assert_eq!(year.start(), Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(year.end(), Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_publication_year_rejects_garbage() {
        for bad in ["twenty", "2021.5", "", "999999999"] {
            let err = PublicationYear::parse(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidParameter, "{bad}");
        }
    }

    #[test]
    fn test_text_search_matches_name_or_intro() {
        let p = FilterBuilder::text_search("Tour").unwrap();
        assert!(p.matches(&json!({"name": "Tour Eiffel"})));
        assert!(p.matches(&json!({"name": "X", "intro_text": "une longue tour"})));
        assert!(!p.matches(&json!({"name": "X", "description_text": "tour"})));
    }

    #[test]
    fn test_text_search_treats_metacharacters_literally() {
        let p = FilterBuilder::text_search("(.*)").unwrap();
        assert!(!p.matches(&json!({"name": "anything"})));
        assert!(p.matches(&json!({"name": "literal (.*) here"})));
    }

    #[test]
    fn test_empty_search_matches_everything() {
        let p = FilterBuilder::text_search("").unwrap();
        assert!(p.matches(&json!({"name": "A"})));
        let d = FilterBuilder::description_matches("").unwrap();
        assert!(d.matches(&json!({"description_text": ""})));
    }

    #[test]
    fn test_in_district_uses_suffix() {
        let p = FilterBuilder::in_district(&DistrictCode::parse("08").unwrap()).unwrap();
        assert!(p.matches(&json!({"postal_code": "75008"})));
        assert!(p.matches(&json!({"postal_code": "69008"})));
        assert!(!p.matches(&json!({"postal_code": "75015"})));
        assert!(!p.matches(&json!({})));
    }

    #[test]
    fn test_published_in_year_excludes_next_new_year() {
        let year = PublicationYear::new(2020).unwrap();
        let p = FilterBuilder::published_in_year(&year);
        assert!(p.matches(&json!({"publication_date": "2020-12-31T23:59:59Z"})));
        assert!(!p.matches(&json!({"publication_date": "2021-01-01T00:00:00Z"})));
        assert!(!p.matches(&json!({"publication_date": "2019-12-31T23:59:59Z"})));
    }

    #[test]
    fn test_many_keywords_threshold() {
        let p = FilterBuilder::many_keywords();
        assert!(!p.matches(&json!({"keywords": ["1", "2", "3", "4", "5"]})));
        assert!(p.matches(&json!({"keywords": ["1", "2", "3", "4", "5", "6"]})));
    }

    #[test]
    fn test_has_site() {
        let p = FilterBuilder::has_site();
        assert!(p.matches(&json!({"site_url": "https://paris.fr"})));
        assert!(!p.matches(&json!({"site_url": null})));
    }
}
