//! Cash card DTOs

use cashcard_db::DbCashCard;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Cash card as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CashCardResponse {
    /// Store-assigned identifier
    pub id: i64,
    /// Monetary amount
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 250.0)]
    pub amount: Decimal,
    /// Owning principal
    pub owner: String,
}

impl From<DbCashCard> for CashCardResponse {
    fn from(card: DbCashCard) -> Self {
        Self {
            id: card.id,
            amount: card.amount,
            owner: card.owner,
        }
    }
}

/// Body for create and update.
///
/// `id` and `owner` are accepted so clients may post back a record they
/// read, but both are ignored: ids come from the store and the owner is
/// always the authenticated caller.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CashCardRequest {
    /// Ignored
    #[serde(default)]
    pub id: Option<i64>,
    /// Monetary amount
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 250.0)]
    pub amount: Decimal,
    /// Ignored
    #[serde(default)]
    pub owner: Option<String>,
}
