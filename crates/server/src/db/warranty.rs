//! Warranty claim repository.

use sqlx::PgPool;

use voltmart_core::{UserId, WarrantyClaimId, WarrantyStatus};

use super::RepositoryError;
use crate::models::WarrantyClaim;
use crate::models::warranty::WarrantyClaimWithUser;

const CLAIM_COLUMNS: &str =
    "id, user_id, product_name, reason, address, phone, image_url, status, created_at";

/// Fields for filing a warranty claim.
#[derive(Debug, Clone)]
pub struct NewWarrantyClaim {
    pub user_id: UserId,
    pub product_name: String,
    pub reason: String,
    pub address: String,
    pub phone: String,
    pub image_url: String,
}

/// Repository for warranty claim database operations.
pub struct WarrantyRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WarrantyRepository<'a> {
    /// Create a new warranty repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// File a new claim (status starts as pending).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, new: &NewWarrantyClaim) -> Result<WarrantyClaim, RepositoryError> {
        let claim = sqlx::query_as::<_, WarrantyClaim>(&format!(
            "INSERT INTO shop.warranty_claim \
                 (user_id, product_name, reason, address, phone, image_url) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {CLAIM_COLUMNS}"
        ))
        .bind(new.user_id)
        .bind(&new.product_name)
        .bind(&new.reason)
        .bind(&new.address)
        .bind(&new.phone)
        .bind(&new.image_url)
        .fetch_one(self.pool)
        .await?;

        Ok(claim)
    }

    /// All claims with the claimant's name and email, newest first (admin
    /// dashboard).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn all_with_user(&self) -> Result<Vec<WarrantyClaimWithUser>, RepositoryError> {
        let claims = sqlx::query_as::<_, WarrantyClaimWithUser>(
            "SELECT c.id, c.user_id, c.product_name, c.reason, c.address, c.phone, \
                    c.image_url, c.status, c.created_at, \
                    u.name AS user_name, u.email AS user_email \
             FROM shop.warranty_claim c \
             JOIN shop.user u ON u.id = c.user_id \
             ORDER BY c.created_at DESC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(claims)
    }

    /// Update a claim's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the claim doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_status(
        &self,
        id: WarrantyClaimId,
        status: WarrantyStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE shop.warranty_claim SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
