//! Cash card repository

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{CashCardStore, DbCashCard, DbError, DbResult, PageRequest, SaveCashCard};

/// PostgreSQL-backed cash card repository
#[derive(Clone)]
pub struct CashCardRepo {
    pool: PgPool,
}

impl CashCardRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CashCardStore for CashCardRepo {
    async fn find_by_id_and_owner(&self, id: i64, owner: &str) -> DbResult<Option<DbCashCard>> {
        let card = sqlx::query_as::<_, DbCashCard>(
            r#"
            SELECT id, amount, owner
            FROM cash_cards
            WHERE id = $1 AND owner = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(card)
    }

    async fn exists_by_id_and_owner(&self, id: i64, owner: &str) -> DbResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM cash_cards WHERE id = $1 AND owner = $2)",
        )
        .bind(id)
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn find_by_owner(&self, owner: &str, page: PageRequest) -> DbResult<Vec<DbCashCard>> {
        check_page(page)?;

        let cards = sqlx::query_as::<_, DbCashCard>(
            r#"
            SELECT id, amount, owner
            FROM cash_cards
            WHERE owner = $1
            ORDER BY amount ASC, id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(cards)
    }

    async fn find_all(&self, page: PageRequest) -> DbResult<Vec<DbCashCard>> {
        check_page(page)?;

        let cards = sqlx::query_as::<_, DbCashCard>(
            r#"
            SELECT id, amount, owner
            FROM cash_cards
            ORDER BY amount ASC, id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(cards)
    }

    async fn save(&self, card: SaveCashCard) -> DbResult<DbCashCard> {
        let stored = match card.id {
            None => {
                sqlx::query_as::<_, DbCashCard>(
                    r#"
                    INSERT INTO cash_cards (amount, owner)
                    VALUES ($1, $2)
                    RETURNING id, amount, owner
                    "#,
                )
                .bind(card.amount)
                .bind(&card.owner)
                .fetch_one(&self.pool)
                .await?
            }
            Some(id) => {
                sqlx::query_as::<_, DbCashCard>(
                    r#"
                    INSERT INTO cash_cards (id, amount, owner)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (id) DO UPDATE
                    SET amount = EXCLUDED.amount, owner = EXCLUDED.owner
                    RETURNING id, amount, owner
                    "#,
                )
                .bind(id)
                .bind(card.amount)
                .bind(&card.owner)
                .fetch_one(&self.pool)
                .await?
            }
        };

        Ok(stored)
    }

    async fn delete_by_id(&self, id: i64) -> DbResult<()> {
        sqlx::query("DELETE FROM cash_cards WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn health_check(&self) -> DbResult<bool> {
        Ok(sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

fn check_page(page: PageRequest) -> DbResult<()> {
    if page.offset < 0 || page.limit < 0 {
        return Err(DbError::InvalidInput(format!(
            "offset {} / limit {} must not be negative",
            page.offset, page.limit
        )));
    }
    Ok(())
}
