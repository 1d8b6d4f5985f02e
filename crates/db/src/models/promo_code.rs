//! Promo code model and DTOs.

use std::str::FromStr;

use estate_core::error::CoreError;
use estate_core::promo::{DiscountType, PromoTerms};
use estate_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `promo_codes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PromoCode {
    pub id: DbId,
    pub code: String,
    pub discount_type: String,
    pub discount_value: Decimal,
    pub valid_from: Timestamp,
    pub valid_until: Timestamp,
    pub max_uses: Option<i32>,
    pub times_used: i32,
    pub is_active: bool,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PromoCode {
    pub fn terms(&self) -> Result<PromoTerms, CoreError> {
        Ok(PromoTerms {
            discount_type: DiscountType::from_str(&self.discount_type)?,
            discount_value: self.discount_value,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            max_uses: self.max_uses,
            times_used: self.times_used,
            is_active: self.is_active,
        })
    }
}

/// DTO for creating a promo code. `code` is stored normalized.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePromoCode {
    pub code: String,
    pub discount_type: String,
    pub discount_value: Decimal,
    pub valid_from: Timestamp,
    pub valid_until: Timestamp,
    pub max_uses: Option<i32>,
    pub created_by: Option<DbId>,
}

/// DTO for updating a promo code. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePromoCode {
    pub valid_until: Option<Timestamp>,
    pub max_uses: Option<i32>,
    pub is_active: Option<bool>,
}
