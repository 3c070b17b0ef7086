// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STAFF: &str = "staff";
pub const ROLE_NORMAL: &str = "normal";

/// Represents the 'users' table in the database.
///
/// Credentials live with the identity provider; only the fields the
/// academy and the sales desk read are kept here.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique username.
    pub username: String,

    pub name: String,

    /// User role: 'admin', 'staff' or 'normal'.
    pub role: String,

    pub is_active: bool,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    /// Admins and staff members, as opposed to regular academy students.
    pub fn is_staff(&self) -> bool {
        is_staff_role(&self.role)
    }
}

pub fn is_staff_role(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_STAFF
}
