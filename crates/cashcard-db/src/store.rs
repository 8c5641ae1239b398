//! Record store abstraction
//!
//! Handlers depend on [`CashCardStore`] only; the PostgreSQL repository and
//! the in-memory store are interchangeable behind it.

use async_trait::async_trait;

use crate::{DbCashCard, DbResult, PageRequest, SaveCashCard};

/// Keyed storage for cash cards.
///
/// Owner-scoped lookups match a row only when both the id and the owner
/// match; a row owned by someone else is reported exactly like a missing one.
#[async_trait]
pub trait CashCardStore: Send + Sync {
    /// `SELECT ... WHERE id = ? AND owner = ?`
    async fn find_by_id_and_owner(&self, id: i64, owner: &str) -> DbResult<Option<DbCashCard>>;

    async fn exists_by_id_and_owner(&self, id: i64, owner: &str) -> DbResult<bool>;

    /// One page of the owner's cards, ordered by amount then id.
    async fn find_by_owner(&self, owner: &str, page: PageRequest) -> DbResult<Vec<DbCashCard>>;

    /// One page of every card in the store, ordered by amount then id.
    async fn find_all(&self, page: PageRequest) -> DbResult<Vec<DbCashCard>>;

    /// Insert (`id: None`) or overwrite by id, returning the stored row.
    async fn save(&self, card: SaveCashCard) -> DbResult<DbCashCard>;

    /// Unscoped delete. Callers must check ownership first.
    async fn delete_by_id(&self, id: i64) -> DbResult<()>;

    /// Cheap connectivity check used by the readiness endpoint.
    async fn health_check(&self) -> DbResult<bool>;

    /// Backend name for logs and readiness output
    fn backend(&self) -> &'static str;
}
