//! Database models - mapped from PostgreSQL tables

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted cash card row
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct DbCashCard {
    pub id: i64,
    pub amount: Decimal,
    pub owner: String,
}

/// Write model for `CashCardStore::save`.
///
/// `id: None` inserts a new row with a store-assigned id; `Some(id)`
/// overwrites the row with that id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveCashCard {
    pub id: Option<i64>,
    pub amount: Decimal,
    pub owner: String,
}

impl SaveCashCard {
    pub fn insert(amount: Decimal, owner: impl Into<String>) -> Self {
        Self {
            id: None,
            amount,
            owner: owner.into(),
        }
    }

    pub fn overwrite(id: i64, amount: Decimal, owner: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            amount,
            owner: owner.into(),
        }
    }
}

/// Offset/limit window for owner listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self { offset, limit }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { offset: 0, limit: 50 }
    }
}
