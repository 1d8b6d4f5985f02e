//! Property listing model and DTOs.

use estate_core::property::ListingNumbers;
use estate_core::types::{DbId, Money, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `properties` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Property {
    pub id: DbId,
    pub owner_id: DbId,
    pub title: String,
    pub description: String,
    pub property_type: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub price: Money,
    pub square_footage: Option<i32>,
    pub lot_size: Option<Decimal>,
    pub year_built: Option<i32>,
    pub zoning: Option<String>,
    pub status: String,
    pub cap_rate: Option<Decimal>,
    pub noi: Option<Money>,
    pub broker_name: Option<String>,
    pub broker_phone: Option<String>,
    pub broker_email: Option<String>,
    pub virtual_tour_url: Option<String>,
    pub is_premium: bool,
    pub is_verified: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a property. `owner_id` is set from the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProperty {
    pub owner_id: DbId,
    pub title: String,
    pub description: String,
    pub property_type: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: Option<String>,
    pub price: Money,
    pub square_footage: Option<i32>,
    pub lot_size: Option<Decimal>,
    pub year_built: Option<i32>,
    pub zoning: Option<String>,
    pub status: String,
    pub cap_rate: Option<Decimal>,
    pub noi: Option<Money>,
    pub broker_name: Option<String>,
    pub broker_phone: Option<String>,
    pub broker_email: Option<String>,
    pub virtual_tour_url: Option<String>,
}

impl CreateProperty {
    pub fn numbers(&self) -> ListingNumbers {
        ListingNumbers {
            price: Some(self.price),
            square_footage: self.square_footage,
            lot_size: self.lot_size,
            year_built: self.year_built,
            cap_rate: self.cap_rate,
        }
    }
}

/// DTO for updating a property. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProperty {
    pub title: Option<String>,
    pub description: Option<String>,
    pub property_type: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub price: Option<Money>,
    pub square_footage: Option<i32>,
    pub lot_size: Option<Decimal>,
    pub year_built: Option<i32>,
    pub zoning: Option<String>,
    pub status: Option<String>,
    pub cap_rate: Option<Decimal>,
    pub noi: Option<Money>,
    pub broker_name: Option<String>,
    pub broker_phone: Option<String>,
    pub broker_email: Option<String>,
    pub virtual_tour_url: Option<String>,
}

impl UpdateProperty {
    pub fn numbers(&self) -> ListingNumbers {
        ListingNumbers {
            price: self.price,
            square_footage: self.square_footage,
            lot_size: self.lot_size,
            year_built: self.year_built,
            cap_rate: self.cap_rate,
        }
    }
}

/// Flat row used by the admin CSV export.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PropertyExportRow {
    pub id: DbId,
    pub title: String,
    pub property_type: String,
    pub city: String,
    pub state: String,
    pub price: Money,
    pub status: String,
    pub is_premium: bool,
    pub is_verified: bool,
    pub owner_username: String,
    pub created_at: Timestamp,
}
