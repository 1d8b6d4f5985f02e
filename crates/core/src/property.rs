//! Property listing constants and field validation.

use rust_decimal::Decimal;

use crate::error::CoreError;

pub const STATUS_FOR_SALE: &str = "for_sale";
pub const STATUS_FOR_LEASE: &str = "for_lease";
pub const STATUS_SOLD: &str = "sold";
pub const STATUS_LEASED: &str = "leased";

pub const VALID_PROPERTY_STATUSES: &[&str] =
    &[STATUS_FOR_SALE, STATUS_FOR_LEASE, STATUS_SOLD, STATUS_LEASED];

pub const DEFAULT_COUNTRY: &str = "Nepal";

/// Earliest accepted `year_built`.
pub const MIN_YEAR_BUILT: i32 = 1800;

/// Number of premium listings on the home page.
pub const HOME_FEATURED_COUNT: i64 = 6;

/// Number of latest listings on the home page.
pub const HOME_LATEST_COUNT: i64 = 8;

pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_PROPERTY_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid property status '{status}'. Must be one of: {}",
            VALID_PROPERTY_STATUSES.join(", ")
        )))
    }
}

/// Map the `listing_type` search shorthand to a status.
///
/// `sale` and `lease` are shorthands; full status names pass through.
pub fn status_for_listing_type(listing_type: &str) -> Result<&'static str, CoreError> {
    match listing_type {
        "sale" | STATUS_FOR_SALE => Ok(STATUS_FOR_SALE),
        "lease" | STATUS_FOR_LEASE => Ok(STATUS_FOR_LEASE),
        STATUS_SOLD => Ok(STATUS_SOLD),
        STATUS_LEASED => Ok(STATUS_LEASED),
        other => Err(CoreError::Validation(format!(
            "Invalid listing type '{other}'. Must be one of: sale, lease, {}",
            VALID_PROPERTY_STATUSES.join(", ")
        ))),
    }
}

/// Numeric fields checked on create and update.
#[derive(Debug, Default, Clone, Copy)]
pub struct ListingNumbers {
    pub price: Option<Decimal>,
    pub square_footage: Option<i32>,
    pub lot_size: Option<Decimal>,
    pub year_built: Option<i32>,
    pub cap_rate: Option<Decimal>,
}

/// Range checks for listing numbers. `current_year` bounds `year_built`.
pub fn validate_numbers(n: &ListingNumbers, current_year: i32) -> Result<(), CoreError> {
    if n.price.is_some_and(|p| p < Decimal::ZERO) {
        return Err(CoreError::Validation("Price cannot be negative".into()));
    }
    if n.square_footage.is_some_and(|s| s <= 0) {
        return Err(CoreError::Validation(
            "Square footage must be positive".into(),
        ));
    }
    if n.lot_size.is_some_and(|l| l < Decimal::ZERO) {
        return Err(CoreError::Validation("Lot size cannot be negative".into()));
    }
    if let Some(year) = n.year_built {
        if !(MIN_YEAR_BUILT..=current_year + 5).contains(&year) {
            return Err(CoreError::Validation(format!(
                "Year built must be between {MIN_YEAR_BUILT} and {}",
                current_year + 5
            )));
        }
    }
    if n.cap_rate
        .is_some_and(|c| c < Decimal::ZERO || c > Decimal::ONE_HUNDRED)
    {
        return Err(CoreError::Validation(
            "Cap rate must be between 0 and 100".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_type_shorthands() {
        assert_eq!(status_for_listing_type("sale").unwrap(), STATUS_FOR_SALE);
        assert_eq!(status_for_listing_type("lease").unwrap(), STATUS_FOR_LEASE);
        assert_eq!(status_for_listing_type("sold").unwrap(), STATUS_SOLD);
        assert!(status_for_listing_type("rent").is_err());
    }

    #[test]
    fn status_validation() {
        assert!(validate_status("leased").is_ok());
        assert!(validate_status("archived").is_err());
    }

    #[test]
    fn number_ranges() {
        let ok = ListingNumbers {
            price: Some(Decimal::from(1_500_000)),
            square_footage: Some(1200),
            lot_size: None,
            year_built: Some(1998),
            cap_rate: Some(Decimal::new(675, 2)),
        };
        assert!(validate_numbers(&ok, 2026).is_ok());

        let negative = ListingNumbers {
            price: Some(Decimal::from(-1)),
            ..ok
        };
        assert!(validate_numbers(&negative, 2026).is_err());

        let future = ListingNumbers {
            year_built: Some(2040),
            ..ok
        };
        assert!(validate_numbers(&future, 2026).is_err());

        let cap = ListingNumbers {
            cap_rate: Some(Decimal::from(120)),
            ..ok
        };
        assert!(validate_numbers(&cap, 2026).is_err());
    }
}
