use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Prices are kept as NUMERIC(10,2)
pub const PRICE_SCALE: u32 = 2;

/// Largest price a NUMERIC(10,2) column holds: 99999999.99
pub fn max_price() -> Decimal {
    Decimal::new(9_999_999_999, PRICE_SCALE)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated fields for a product that does not exist yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
}

/// Validated subset of fields for a partial update.
///
/// `None` means "not supplied". `description` is doubly optional so that an
/// explicit `null` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.price.is_none() && self.stock.is_none()
    }

    /// Apply the supplied fields, leaving the rest untouched
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(price) = self.price {
            product.price = price.round_dp(PRICE_SCALE);
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
    }
}
