//! Coupon model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use voltmart_core::{CouponId, UserId};

/// A single-user percentage discount code.
///
/// At most one active coupon per user is the intended invariant; awarding a
/// new coupon deletes the user's previous ones rather than relying on a
/// uniqueness constraint.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    pub discount_percentage: i32,
    pub expiration_date: DateTime<Utc>,
    pub is_active: bool,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    /// Whether the coupon's expiration date has passed.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration_date < now
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_is_expired() {
        let now = Utc::now();
        let coupon = Coupon {
            id: CouponId::new(1),
            code: "GIFT123ABC".to_owned(),
            discount_percentage: 10,
            expiration_date: now - Duration::days(1),
            is_active: true,
            user_id: UserId::new(1),
            created_at: now - Duration::days(31),
        };
        assert!(coupon.is_expired(now));
        assert!(!coupon.is_expired(now - Duration::days(2)));
    }
}
