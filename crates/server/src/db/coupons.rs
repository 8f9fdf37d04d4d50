//! Coupon repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use voltmart_core::{CouponId, UserId};

use super::RepositoryError;
use crate::models::Coupon;

const COUPON_COLUMNS: &str =
    "id, code, discount_percentage, expiration_date, is_active, user_id, created_at";

/// Repository for coupon database operations.
pub struct CouponRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CouponRepository<'a> {
    /// Create a new coupon repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's current active coupon, if any.
    ///
    /// At most one active coupon per user is intended but not enforced by a
    /// constraint, so this takes the newest active row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn active_for_user(&self, user_id: UserId) -> Result<Option<Coupon>, RepositoryError> {
        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM shop.coupon \
             WHERE user_id = $1 AND is_active = TRUE \
             ORDER BY created_at DESC \
             LIMIT 1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(coupon)
    }

    /// Find an active coupon by (code, user).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_active(
        &self,
        code: &str,
        user_id: UserId,
    ) -> Result<Option<Coupon>, RepositoryError> {
        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM shop.coupon \
             WHERE code = $1 AND user_id = $2 AND is_active = TRUE"
        ))
        .bind(code)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(coupon)
    }

    /// Deactivate a coupon by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the coupon doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn deactivate(&self, id: CouponId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE shop.coupon SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Deactivate all coupons matching (code, user). Used by the payment
    /// confirmation paths, where the code arrives from provider metadata.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn deactivate_by_code(
        &self,
        code: &str,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE shop.coupon SET is_active = FALSE WHERE code = $1 AND user_id = $2")
            .bind(code)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Replace the user's coupons with a single new one (award flow): deletes
    /// every existing coupon for the user, then inserts the new code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the transaction fails.
    pub async fn replace_for_user(
        &self,
        user_id: UserId,
        code: &str,
        discount_percentage: i32,
        expiration_date: DateTime<Utc>,
    ) -> Result<Coupon, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM shop.coupon WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "INSERT INTO shop.coupon (code, discount_percentage, expiration_date, user_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COUPON_COLUMNS}"
        ))
        .bind(code)
        .bind(discount_percentage)
        .bind(expiration_date)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(coupon)
    }
}
