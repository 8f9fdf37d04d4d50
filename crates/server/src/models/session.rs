//! Session models and keys.

use serde::{Deserialize, Serialize};

use voltmart_core::{UserId, UserRole};

/// Session storage keys.
pub mod session_keys {
    /// Key for the authenticated user.
    pub const CURRENT_USER: &str = "current_user";
}

/// The authenticated user as stored in the session cookie's server-side row.
///
/// Deliberately small: the full user row (address and all) is re-read from
/// the database when a handler needs it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl CurrentUser {
    /// Whether this user can access admin endpoints.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
