//! In-memory cash card store
//!
//! Used for development mode and tests. Ids come from a monotonically
//! increasing counter and are never handed out twice, even after deletes.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{CashCardStore, DbCashCard, DbError, DbResult, PageRequest, SaveCashCard};

pub struct MemoryCashCardStore {
    cards: RwLock<BTreeMap<i64, DbCashCard>>,
    next_id: AtomicI64,
}

impl MemoryCashCardStore {
    pub fn new() -> Self {
        Self {
            cards: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Create a store pre-populated with rows, keeping their ids.
    pub fn with_cards(cards: impl IntoIterator<Item = DbCashCard>) -> Self {
        let store = Self::new();
        {
            let mut map = store.cards.write();
            for card in cards {
                store.next_id.fetch_max(card.id + 1, Ordering::SeqCst);
                map.insert(card.id, card);
            }
        }
        store
    }

    pub fn len(&self) -> usize {
        self.cards.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.read().is_empty()
    }

    /// Snapshot of every row, ordered by id.
    pub fn snapshot(&self) -> Vec<DbCashCard> {
        self.cards.read().values().cloned().collect()
    }
}

impl Default for MemoryCashCardStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CashCardStore for MemoryCashCardStore {
    async fn find_by_id_and_owner(&self, id: i64, owner: &str) -> DbResult<Option<DbCashCard>> {
        Ok(self
            .cards
            .read()
            .get(&id)
            .filter(|card| card.owner == owner)
            .cloned())
    }

    async fn exists_by_id_and_owner(&self, id: i64, owner: &str) -> DbResult<bool> {
        Ok(self
            .cards
            .read()
            .get(&id)
            .is_some_and(|card| card.owner == owner))
    }

    async fn find_by_owner(&self, owner: &str, page: PageRequest) -> DbResult<Vec<DbCashCard>> {
        let owned = self
            .cards
            .read()
            .values()
            .filter(|card| card.owner == owner)
            .cloned()
            .collect();

        paged(owned, page)
    }

    async fn find_all(&self, page: PageRequest) -> DbResult<Vec<DbCashCard>> {
        paged(self.snapshot(), page)
    }

    async fn save(&self, card: SaveCashCard) -> DbResult<DbCashCard> {
        let id = match card.id {
            Some(id) => {
                self.next_id.fetch_max(id + 1, Ordering::SeqCst);
                id
            }
            None => self.next_id.fetch_add(1, Ordering::SeqCst),
        };

        let stored = DbCashCard {
            id,
            amount: card.amount,
            owner: card.owner,
        };
        self.cards.write().insert(id, stored.clone());

        Ok(stored)
    }

    async fn delete_by_id(&self, id: i64) -> DbResult<()> {
        self.cards.write().remove(&id);
        Ok(())
    }

    async fn health_check(&self) -> DbResult<bool> {
        Ok(true)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// Order by amount then id and cut out one page
fn paged(mut cards: Vec<DbCashCard>, page: PageRequest) -> DbResult<Vec<DbCashCard>> {
    if page.offset < 0 || page.limit < 0 {
        return Err(DbError::InvalidInput(format!(
            "offset {} / limit {} must not be negative",
            page.offset, page.limit
        )));
    }

    cards.sort_by(|a, b| a.amount.cmp(&b.amount).then(a.id.cmp(&b.id)));

    Ok(cards
        .into_iter()
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .collect())
}
