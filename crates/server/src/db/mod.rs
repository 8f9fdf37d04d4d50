//! Database operations for the `shop` `PostgreSQL` schema.
//!
//! # Tables
//!
//! - `shop.user` - Accounts, roles, and billing addresses
//! - `shop.user_password` - Argon2 password hashes
//! - `shop.product` - Catalog with stock, featured, and clearance flags
//! - `shop.cart_item` - One row per (user, product) cart line
//! - `shop.coupon` - Single-user percentage discount codes
//! - `shop.order` / `shop.order_item` - Purchases with price-at-purchase snapshots
//! - `shop.warranty_claim` - Customer warranty claims
//! - `sessions` - Tower-sessions storage
//!
//! All queries use the runtime `query_as`/`FromRow` API so the workspace
//! builds without a live database.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p voltmart-cli -- migrate
//! ```

pub mod cart;
pub mod coupons;
pub mod orders;
pub mod products;
pub mod users;
pub mod warranty;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
