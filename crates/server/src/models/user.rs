//! User model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;

use voltmart_core::{Email, UserId, UserRole};

/// A registered user.
///
/// The password hash lives in its own column and is only read by the auth
/// service; it is never part of this struct so it cannot leak into a response.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: UserRole,
    /// Free-form billing/shipping address snapshot. Expected to carry at
    /// least a `name` key when set.
    pub address: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the user has an address usable for checkout (present, with a
    /// non-empty `name` field).
    #[must_use]
    pub fn has_checkout_address(&self) -> bool {
        self.address
            .as_ref()
            .and_then(|a| a.get("name"))
            .and_then(JsonValue::as_str)
            .is_some_and(|name| !name.is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_with_address(address: Option<JsonValue>) -> User {
        User {
            id: UserId::new(1),
            name: "Test User".to_owned(),
            email: Email::parse("test@example.com").unwrap(),
            role: UserRole::Customer,
            address,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_has_checkout_address() {
        let user = user_with_address(Some(json!({"name": "Jane", "city": "Pune"})));
        assert!(user.has_checkout_address());
    }

    #[test]
    fn test_missing_address_rejected() {
        assert!(!user_with_address(None).has_checkout_address());
    }

    #[test]
    fn test_address_without_name_rejected() {
        let user = user_with_address(Some(json!({"city": "Pune"})));
        assert!(!user.has_checkout_address());

        let user = user_with_address(Some(json!({"name": ""})));
        assert!(!user.has_checkout_address());
    }
}
