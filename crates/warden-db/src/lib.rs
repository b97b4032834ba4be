//! # Warden DB
//!
//! The [`UserStore`] capability the engine persists through, plus two
//! implementations:
//!
//! - [`PgUserStore`]: PostgreSQL via SQLx, with embedded migrations
//! - [`MemoryUserStore`]: process-local, for embedding and tests
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use warden_db::{PgUserStore, UserStore, init_db_pool, run_migrations};
//!
//! let pool = init_db_pool().await?;
//! run_migrations(&pool).await?;
//! let store: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool));
//! ```

pub mod memory;
pub mod postgres;
pub mod store;

use std::env;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;
pub use sqlx::PgPool;
pub use store::UserStore;

/// Connects to the database named by `DATABASE_URL`.
pub async fn init_db_pool() -> anyhow::Result<PgPool> {
    let database_url =
        env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations.
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
