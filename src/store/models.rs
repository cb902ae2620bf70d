use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

pub const ADMIN_ROLE: &str = "Admin";
pub const USER_ROLE: &str = "User";

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password_hash: String, // argon2 PHC string
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "hobby_level")]
pub enum HobbyLevel {
    Beginner,
    Intermediate,
    Expert,
}

#[derive(Debug, Clone, FromRow)]
pub struct Hobby {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub level: HobbyLevel,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: OffsetDateTime,
}

/// A role together with the user it is assigned to.
#[derive(Debug, Clone, FromRow)]
pub struct AssignedRole {
    pub user_id: i64,
    #[sqlx(flatten)]
    pub role: Role,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRole {
    pub id: i64,
    pub user_id: i64,
    pub role_id: i64,
    pub assigned_at: OffsetDateTime,
    pub assigned_by: Option<i64>,
}

/// Outcome of [`Store::remove_assignment`](super::Store::remove_assignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    Missing,
    /// Refused because it is the only remaining assignment of the role.
    LastHolder,
}

#[derive(Debug, Clone)]
pub struct NewHobby {
    pub name: String,
    pub level: HobbyLevel,
}

/// Everything written when a user is created: the row, its hobbies and its role
/// assignments go in as one unit.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub hobbies: Vec<NewHobby>,
    pub role_ids: Vec<i64>,
    pub assigned_by: Option<i64>,
}

/// Replacement profile for an existing user; `hobbies` replaces the full set.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub hobbies: Vec<NewHobby>,
}

#[derive(Debug, Clone)]
pub struct UserFilter {
    pub page: i64,
    pub size: i64,
    pub search: Option<String>,
}

impl UserFilter {
    /// Rows to skip; saturates instead of overflowing on absurd page numbers.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.size)
    }
}
