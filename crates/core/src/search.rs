//! Property search filters and pagination helpers.
//!
//! A search is a conjunction of optional predicates. Raw query values arrive
//! as strings (HTML forms send empty strings for untouched inputs), so
//! [`PropertyFilter::resolve`] trims, parses and range-checks them once and
//! hands the repository a typed [`ResolvedPropertyFilter`].

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::property::{status_for_listing_type, validate_status};

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default number of results per page.
pub const DEFAULT_SEARCH_LIMIT: i64 = 20;

/// Maximum number of results per page.
pub const MAX_SEARCH_LIMIT: i64 = 100;

/// Clamp a user-provided limit into `[1, max]`, falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Raw filter values as received in a query string or saved search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyFilter {
    pub q: Option<String>,
    pub property_type: Option<String>,
    pub listing_type: Option<String>,
    pub status: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_sqft: Option<String>,
    pub max_sqft: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub min_cap_rate: Option<String>,
    pub year_built: Option<String>,
    pub zoning: Option<String>,
    pub premium_only: Option<bool>,
    pub verified_only: Option<bool>,
}

/// Parsed and checked filter, ready for binding.
///
/// Text fields are already wrapped as `ILIKE` patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPropertyFilter {
    pub keyword: Option<String>,
    pub property_type: Option<String>,
    pub status: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_sqft: Option<i32>,
    pub max_sqft: Option<i32>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub min_cap_rate: Option<Decimal>,
    pub year_built: Option<i32>,
    pub zoning: Option<String>,
    pub premium_only: bool,
    pub verified_only: bool,
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_field<T: FromStr>(name: &str, v: &Option<String>) -> Result<Option<T>, CoreError> {
    match non_empty(v) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| CoreError::Validation(format!("Invalid value for {name}: '{raw}'"))),
    }
}

/// Escape `%`, `_` and `\` and wrap in `%...%` for a substring `ILIKE`.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

impl PropertyFilter {
    pub fn resolve(&self) -> Result<ResolvedPropertyFilter, CoreError> {
        let status = match (non_empty(&self.status), non_empty(&self.listing_type)) {
            (Some(s), _) => {
                validate_status(s)?;
                Some(s.to_string())
            }
            (None, Some(lt)) => Some(status_for_listing_type(lt)?.to_string()),
            (None, None) => None,
        };

        let min_price: Option<Decimal> = parse_field("min_price", &self.min_price)?;
        let max_price: Option<Decimal> = parse_field("max_price", &self.max_price)?;
        if let (Some(lo), Some(hi)) = (min_price, max_price) {
            if lo > hi {
                return Err(CoreError::Validation(
                    "min_price cannot exceed max_price".into(),
                ));
            }
        }

        let min_sqft: Option<i32> = parse_field("min_sqft", &self.min_sqft)?;
        let max_sqft: Option<i32> = parse_field("max_sqft", &self.max_sqft)?;
        if let (Some(lo), Some(hi)) = (min_sqft, max_sqft) {
            if lo > hi {
                return Err(CoreError::Validation(
                    "min_sqft cannot exceed max_sqft".into(),
                ));
            }
        }

        Ok(ResolvedPropertyFilter {
            keyword: non_empty(&self.q).map(like_pattern),
            property_type: non_empty(&self.property_type).map(like_pattern),
            status,
            min_price,
            max_price,
            min_sqft,
            max_sqft,
            city: non_empty(&self.city).map(like_pattern),
            state: non_empty(&self.state).map(like_pattern),
            zip_code: non_empty(&self.zip_code).map(like_pattern),
            min_cap_rate: parse_field("min_cap_rate", &self.min_cap_rate)?,
            year_built: parse_field("year_built", &self.year_built)?,
            zoning: non_empty(&self.zoning).map(like_pattern),
            premium_only: self.premium_only.unwrap_or(false),
            verified_only: self.verified_only.unwrap_or(false),
        })
    }

    /// `true` when no predicate is set.
    pub fn is_empty(&self) -> bool {
        *self == PropertyFilter::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_limit_uses_default_when_none() {
        assert_eq!(clamp_limit(None, 20, 100), 20);
    }

    #[test]
    fn clamp_limit_respects_bounds() {
        assert_eq!(clamp_limit(Some(500), 20, 100), 100);
        assert_eq!(clamp_limit(Some(0), 20, 100), 1);
        assert_eq!(clamp_offset(Some(-4)), 0);
    }

    #[test]
    fn empty_strings_are_ignored() {
        let f = PropertyFilter {
            min_price: Some("".into()),
            city: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(f.resolve().unwrap(), ResolvedPropertyFilter::default());
    }

    #[test]
    fn listing_type_maps_to_status() {
        let f = PropertyFilter {
            listing_type: Some("lease".into()),
            ..Default::default()
        };
        assert_eq!(f.resolve().unwrap().status.as_deref(), Some("for_lease"));
    }

    #[test]
    fn explicit_status_wins_over_listing_type() {
        let f = PropertyFilter {
            status: Some("sold".into()),
            listing_type: Some("sale".into()),
            ..Default::default()
        };
        assert_eq!(f.resolve().unwrap().status.as_deref(), Some("sold"));
    }

    #[test]
    fn inverted_ranges_rejected() {
        let f = PropertyFilter {
            min_price: Some("900000".into()),
            max_price: Some("100".into()),
            ..Default::default()
        };
        assert!(f.resolve().is_err());

        let f = PropertyFilter {
            min_sqft: Some("3000".into()),
            max_sqft: Some("1000".into()),
            ..Default::default()
        };
        assert!(f.resolve().is_err());
    }

    #[test]
    fn unparseable_number_names_the_field() {
        let f = PropertyFilter {
            year_built: Some("nineteen".into()),
            ..Default::default()
        };
        let msg = f.resolve().unwrap_err().to_string();
        assert!(msg.contains("year_built"));
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        let f = PropertyFilter {
            q: Some(" Kathmandu ".into()),
            ..Default::default()
        };
        assert_eq!(f.resolve().unwrap().keyword.as_deref(), Some("%Kathmandu%"));
    }
}
