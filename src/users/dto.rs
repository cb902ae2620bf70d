use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::store::models::{Hobby, HobbyLevel, NewHobby, User, UserFilter};
use crate::validation::{
    check_email, check_full_name, check_hobby_names, check_password, check_positive_id,
    check_username, Validate, ValidationErrors,
};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct HobbyInput {
    pub name: String,
    pub level: HobbyLevel,
}

impl From<HobbyInput> for NewHobby {
    fn from(h: HobbyInput) -> Self {
        NewHobby {
            name: h.name.trim().to_string(),
            level: h.level,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub hobbies: Vec<HobbyInput>,
    /// Empty means the default "User" role.
    #[serde(default)]
    pub role_ids: Vec<i64>,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_username(&mut errors, &self.username);
        check_full_name(&mut errors, &self.full_name);
        check_email(&mut errors, &self.email);
        check_password(&mut errors, &self.password);
        check_hobby_names(&mut errors, self.hobbies.iter().map(|h| h.name.as_str()));
        for (i, id) in self.role_ids.iter().enumerate() {
            check_positive_id(&mut errors, &format!("roleIds[{i}]"), "Role ID", *id);
        }
        errors.into_result()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub username: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub hobbies: Vec<HobbyInput>,
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_username(&mut errors, &self.username);
        check_full_name(&mut errors, &self.full_name);
        check_email(&mut errors, &self.email);
        check_hobby_names(&mut errors, self.hobbies.iter().map(|h| h.name.as_str()));
        errors.into_result()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub search: Option<String>,
}

impl From<ListUsersQuery> for UserFilter {
    fn from(q: ListUsersQuery) -> Self {
        UserFilter {
            page: q.page.unwrap_or(1).max(1),
            size: q.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            search: q
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HobbyDto {
    pub id: i64,
    pub name: String,
    pub level: HobbyLevel,
}

impl From<Hobby> for HobbyDto {
    fn from(h: Hobby) -> Self {
        HobbyDto {
            id: h.id,
            name: h.name,
            level: h.level,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListItem {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub hobby_count: usize,
    pub hobbies: Vec<HobbyDto>,
    pub roles: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl UserListItem {
    pub fn new(user: User, hobbies: Vec<HobbyDto>, roles: Vec<String>) -> Self {
        UserListItem {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            hobby_count: hobbies.len(),
            hobbies,
            roles,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub hobbies: Vec<HobbyDto>,
}

impl UserDetail {
    pub fn new(user: User, hobbies: Vec<HobbyDto>) -> Self {
        UserDetail {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
            hobbies,
        }
    }
}
