//! Warranty claim model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use voltmart_core::{UserId, WarrantyClaimId, WarrantyStatus};

/// A customer warranty claim.
///
/// `product_name` is free text rather than a product foreign key: customers
/// file claims for items that may no longer exist in the catalog.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WarrantyClaim {
    pub id: WarrantyClaimId,
    pub user_id: UserId,
    pub product_name: String,
    pub reason: String,
    pub address: String,
    pub phone: String,
    pub image_url: String,
    pub status: WarrantyStatus,
    pub created_at: DateTime<Utc>,
}

/// Claim row joined with the claimant for the admin dashboard.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WarrantyClaimWithUser {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub claim: WarrantyClaim,
    pub user_name: String,
    pub user_email: String,
}
