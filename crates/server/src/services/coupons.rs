//! Coupon validation and award logic.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use sqlx::PgPool;
use thiserror::Error;

use voltmart_core::{Money, UserId};

use crate::db::RepositoryError;
use crate::db::coupons::CouponRepository;
use crate::models::Coupon;

/// Discounted totals at or above this amount earn the shopper a new coupon.
pub const AWARD_THRESHOLD: Money = Money::from_cents(20000);

/// Discount percentage of awarded coupons.
pub const AWARD_DISCOUNT_PERCENTAGE: i32 = 10;

/// Awarded coupons stay valid this long.
const AWARD_VALIDITY_DAYS: i64 = 30;

/// Length of the random suffix on generated coupon codes.
const CODE_SUFFIX_LENGTH: usize = 6;

/// Errors from coupon validation.
#[derive(Debug, Error)]
pub enum CouponError {
    /// No active coupon with that code for this user.
    #[error("coupon not found")]
    NotFound,

    /// The coupon existed but its expiration date has passed. The coupon is
    /// deactivated as part of reporting this.
    #[error("coupon expired")]
    Expired,

    /// Database operation failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Coupon service.
pub struct CouponService<'a> {
    coupons: CouponRepository<'a>,
}

impl<'a> CouponService<'a> {
    /// Create a new coupon service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            coupons: CouponRepository::new(pool),
        }
    }

    /// The user's current active coupon, if any.
    ///
    /// # Errors
    ///
    /// Returns `CouponError::Repository` if the lookup fails.
    pub async fn current_for_user(&self, user_id: UserId) -> Result<Option<Coupon>, CouponError> {
        Ok(self.coupons.active_for_user(user_id).await?)
    }

    /// Validate a coupon code for a user.
    ///
    /// An expired coupon is deactivated on first sight, so validating the
    /// same code again reports "not found" rather than "expired".
    ///
    /// # Errors
    ///
    /// Returns `CouponError::NotFound` when no active coupon matches.
    /// Returns `CouponError::Expired` (after deactivating) when it has lapsed.
    pub async fn validate(&self, code: &str, user_id: UserId) -> Result<Coupon, CouponError> {
        let coupon = self
            .coupons
            .find_active(code, user_id)
            .await?
            .ok_or(CouponError::NotFound)?;

        if coupon.is_expired(Utc::now()) {
            self.coupons.deactivate(coupon.id).await?;
            return Err(CouponError::Expired);
        }

        Ok(coupon)
    }

    /// Look up the active coupon applied at checkout, without the expiry
    /// side effect (the checkout path just prices what's currently active).
    ///
    /// # Errors
    ///
    /// Returns `CouponError::Repository` if the lookup fails.
    pub async fn find_applied(
        &self,
        code: &str,
        user_id: UserId,
    ) -> Result<Option<Coupon>, CouponError> {
        Ok(self.coupons.find_active(code, user_id).await?)
    }

    /// Deactivate the coupon consumed by a confirmed payment.
    ///
    /// # Errors
    ///
    /// Returns `CouponError::Repository` if the update fails.
    pub async fn consume(&self, code: &str, user_id: UserId) -> Result<(), CouponError> {
        self.coupons.deactivate_by_code(code, user_id).await?;
        Ok(())
    }

    /// Award a fresh 10%-off coupon to a user whose discounted checkout total
    /// reached [`AWARD_THRESHOLD`]. Any previous coupons are removed; a user
    /// holds at most one coupon at a time.
    ///
    /// # Errors
    ///
    /// Returns `CouponError::Repository` if the replacement fails.
    pub async fn award(&self, user_id: UserId) -> Result<Coupon, CouponError> {
        let code = generate_coupon_code();
        let expires = award_expiry(Utc::now());

        let coupon = self
            .coupons
            .replace_for_user(user_id, &code, AWARD_DISCOUNT_PERCENTAGE, expires)
            .await?;

        Ok(coupon)
    }
}

/// Whether a discounted total qualifies for a coupon award.
#[must_use]
pub fn qualifies_for_award(discounted_total: Money) -> bool {
    discounted_total >= AWARD_THRESHOLD
}

/// Expiration date for a coupon awarded now.
#[must_use]
pub fn award_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(AWARD_VALIDITY_DAYS)
}

/// Generate a `GIFT`-prefixed coupon code with a random alphanumeric suffix.
#[must_use]
pub fn generate_coupon_code() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(CODE_SUFFIX_LENGTH)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect();

    format!("GIFT{suffix}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_coupon_code_format() {
        let code = generate_coupon_code();
        assert_eq!(code.len(), 4 + CODE_SUFFIX_LENGTH);
        assert!(code.starts_with("GIFT"));
        assert!(
            code.chars()
                .skip(4)
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_award_threshold_boundary() {
        // Exactly at the threshold qualifies; one cent under does not.
        assert!(qualifies_for_award(Money::from_cents(20000)));
        assert!(!qualifies_for_award(Money::from_cents(19999)));
        assert!(qualifies_for_award(Money::from_cents(20001)));
    }

    #[test]
    fn test_award_expiry_is_thirty_days_out() {
        let now = Utc::now();
        assert_eq!(award_expiry(now) - now, Duration::days(30));
    }
}
