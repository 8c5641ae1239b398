//! Cash Card Database Layer
//!
//! Persistence for cash card records behind the [`CashCardStore`] trait.
//!
//! # Backends
//!
//! - **PostgreSQL**: [`Database`] owns the connection pool and hands out
//!   [`CashCardRepo`] instances
//! - **Memory**: [`MemoryCashCardStore`] for development and tests
//!
//! Ownership checks are expressed as owner-scoped queries
//! (`find_by_id_and_owner`, `exists_by_id_and_owner`, `find_by_owner`);
//! `save` and `delete_by_id` are keyed by id alone.

pub mod config;
pub mod error;
pub mod memory;
pub mod models;
pub mod repos;
pub mod store;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

pub use config::DatabaseConfig;
pub use error::{DbError, DbResult};
pub use memory::MemoryCashCardStore;
pub use models::*;
pub use repos::*;
pub use store::CashCardStore;

/// PostgreSQL connection pool
pub struct Database {
    pub pg: PgPool,
}

impl Database {
    /// Connect to PostgreSQL
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        info!("Connecting to PostgreSQL: {}", config.postgres_url_masked());

        let pg = PgPoolOptions::new()
            .max_connections(config.pg_max_connections)
            .min_connections(config.pg_min_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.pg_acquire_timeout_secs))
            .connect(&config.postgres_url)
            .await
            .map_err(|e| DbError::Connection(format!("PostgreSQL: {}", e)))?;

        info!("Connected to PostgreSQL");

        Ok(Self { pg })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> DbResult<()> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&self.pg)
            .await
            .map_err(|e| DbError::Migration(e.to_string()))?;
        info!("Migrations complete");
        Ok(())
    }

    pub fn cash_card_repo(&self) -> CashCardRepo {
        CashCardRepo::new(self.pg.clone())
    }
}
