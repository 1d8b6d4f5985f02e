//! Promo-code validity and discount arithmetic.
//!
//! Redemption (incrementing `times_used`) is the repository's job and only
//! happens after a successful payment; nothing here mutates state.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Money, Timestamp};

pub const MAX_CODE_LENGTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

pub const VALID_DISCOUNT_TYPES: &[&str] = &["percentage", "fixed"];

impl DiscountType {
    pub fn as_str(self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::Fixed => "fixed",
        }
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscountType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(DiscountType::Percentage),
            "fixed" => Ok(DiscountType::Fixed),
            other => Err(CoreError::Validation(format!(
                "Invalid discount type '{other}'. Must be one of: {}",
                VALID_DISCOUNT_TYPES.join(", ")
            ))),
        }
    }
}

/// The fields of a promo code that decide validity and price.
#[derive(Debug, Clone)]
pub struct PromoTerms {
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub valid_from: Timestamp,
    pub valid_until: Timestamp,
    pub max_uses: Option<i32>,
    pub times_used: i32,
    pub is_active: bool,
}

impl PromoTerms {
    /// Active, inside `[valid_from, valid_until]`, and below the usage cap.
    pub fn is_valid(&self, now: Timestamp) -> bool {
        self.is_active
            && self.valid_from <= now
            && now <= self.valid_until
            && self.max_uses.map_or(true, |cap| self.times_used < cap)
    }

    /// Discounted price, rounded to two decimal places and never negative.
    pub fn apply_discount(&self, amount: Money) -> Money {
        apply_discount(self.discount_type, self.discount_value, amount)
    }
}

pub fn apply_discount(discount_type: DiscountType, value: Decimal, amount: Money) -> Money {
    let discounted = match discount_type {
        DiscountType::Percentage => amount * (Decimal::ONE - value / Decimal::ONE_HUNDRED),
        DiscountType::Fixed => amount - value,
    };
    discounted.max(Decimal::ZERO).round_dp(2)
}

/// Normalize a user-entered code: trimmed and uppercased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Validate the fields of a new promo code.
pub fn validate_new_code(
    code: &str,
    discount_type: DiscountType,
    value: Decimal,
    valid_from: Timestamp,
    valid_until: Timestamp,
    max_uses: Option<i32>,
) -> Result<(), CoreError> {
    let code = code.trim();
    if code.is_empty() || code.len() > MAX_CODE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Promo code must be 1-{MAX_CODE_LENGTH} characters"
        )));
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(CoreError::Validation(
            "Promo code may only contain letters, digits, '-' and '_'".into(),
        ));
    }
    if value <= Decimal::ZERO {
        return Err(CoreError::Validation(
            "Discount value must be positive".into(),
        ));
    }
    if discount_type == DiscountType::Percentage && value > Decimal::ONE_HUNDRED {
        return Err(CoreError::Validation(
            "Percentage discount cannot exceed 100".into(),
        ));
    }
    if valid_from >= valid_until {
        return Err(CoreError::Validation(
            "valid_from must be before valid_until".into(),
        ));
    }
    if max_uses.is_some_and(|m| m < 1) {
        return Err(CoreError::Validation("max_uses must be at least 1".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn terms(discount_type: DiscountType, value: i64) -> PromoTerms {
        let now = Utc::now();
        PromoTerms {
            discount_type,
            discount_value: Decimal::from(value),
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(1),
            max_uses: None,
            times_used: 0,
            is_active: true,
        }
    }

    #[test]
    fn twenty_percent_of_five_hundred() {
        let t = terms(DiscountType::Percentage, 20);
        assert_eq!(t.apply_discount(Money::from(500)), Decimal::new(40000, 2));
    }

    #[test]
    fn fixed_one_fifty_off_five_hundred() {
        let t = terms(DiscountType::Fixed, 150);
        assert_eq!(t.apply_discount(Money::from(500)), Decimal::new(35000, 2));
    }

    #[test]
    fn fixed_discount_floors_at_zero() {
        let t = terms(DiscountType::Fixed, 150);
        assert_eq!(t.apply_discount(Money::from(100)), Decimal::ZERO);
    }

    #[test]
    fn percentage_rounds_to_cents() {
        let t = terms(DiscountType::Percentage, 33);
        assert_eq!(t.apply_discount(Money::from(2000)), Decimal::new(134000, 2));
        let t = PromoTerms {
            discount_value: Decimal::new(125, 1),
            ..t
        };
        assert_eq!(t.apply_discount(Decimal::new(9999, 2)), Decimal::new(8749, 2));
    }

    #[test]
    fn usage_cap_boundary() {
        let now = Utc::now();
        let mut t = terms(DiscountType::Fixed, 10);
        t.max_uses = Some(5);
        t.times_used = 4;
        assert!(t.is_valid(now));
        t.times_used = 5;
        assert!(!t.is_valid(now));
        t.times_used = 6;
        assert!(!t.is_valid(now));
    }

    #[test]
    fn window_and_active_flag() {
        let now = Utc::now();
        let mut t = terms(DiscountType::Fixed, 10);
        assert!(t.is_valid(now));
        assert!(!t.is_valid(now + Duration::days(2)));
        assert!(!t.is_valid(now - Duration::days(2)));
        t.is_active = false;
        assert!(!t.is_valid(now));
    }

    #[test]
    fn new_code_validation() {
        let now = Utc::now();
        let later = now + Duration::days(30);
        assert!(validate_new_code("SPRING20", DiscountType::Percentage, Decimal::from(20), now, later, Some(10)).is_ok());
        assert!(validate_new_code("", DiscountType::Fixed, Decimal::from(20), now, later, None).is_err());
        assert!(validate_new_code("WAY_TOO_LONG_PROMO_CODE", DiscountType::Fixed, Decimal::from(20), now, later, None).is_err());
        assert!(validate_new_code("HALF", DiscountType::Percentage, Decimal::from(150), now, later, None).is_err());
        assert!(validate_new_code("BACKWARDS", DiscountType::Fixed, Decimal::from(5), later, now, None).is_err());
        assert!(validate_new_code("ZERO", DiscountType::Fixed, Decimal::from(5), now, later, Some(0)).is_err());
    }

    #[test]
    fn normalize_uppercases() {
        assert_eq!(normalize_code("  spring20 "), "SPRING20");
    }
}
