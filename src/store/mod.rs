//! Persistence layer. Handlers and services talk to a [`Store`]; the Postgres
//! implementation backs the running service and the in-memory one backs tests.

use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
pub mod memory;
pub mod models;
pub mod postgres;
pub mod seed;

use models::{
    AssignedRole, Hobby, NewUser, Removal, Role, User, UserChanges, UserFilter, UserRole,
};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[source] sqlx::Error),
    #[error("conflict")]
    Conflict,
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(dbe) = &e {
            if dbe.is_unique_violation() {
                return RepoError::Conflict;
            }
        }
        RepoError::Db(e)
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

#[async_trait]
pub trait Store: Send + Sync {
    async fn get_user(&self, id: i64) -> RepoResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    async fn count_users(&self) -> RepoResult<i64>;
    /// One page of users ordered by full name, plus the total number of matches.
    async fn list_users(&self, filter: &UserFilter) -> RepoResult<(Vec<User>, i64)>;
    /// Inserts the user with its hobbies and role assignments in one transaction.
    async fn create_user(&self, new_user: NewUser) -> RepoResult<User>;
    /// Updates the profile and replaces the hobby set; `None` when the user is gone.
    async fn update_user(&self, id: i64, changes: UserChanges) -> RepoResult<Option<User>>;
    /// Deletes the user; hobbies and role assignments go with it.
    async fn delete_user(&self, id: i64) -> RepoResult<bool>;
    async fn hobbies_for_users(&self, user_ids: &[i64]) -> RepoResult<Vec<Hobby>>;

    async fn list_roles(&self) -> RepoResult<Vec<Role>>;
    async fn get_role(&self, id: i64) -> RepoResult<Option<Role>>;
    async fn find_role_by_name(&self, name: &str) -> RepoResult<Option<Role>>;
    async fn roles_for_users(&self, user_ids: &[i64]) -> RepoResult<Vec<AssignedRole>>;
    async fn find_assignment(&self, user_id: i64, role_id: i64) -> RepoResult<Option<UserRole>>;
    /// Fails with [`RepoError::Conflict`] when the pair is already assigned.
    async fn assign_role(
        &self,
        user_id: i64,
        role_id: i64,
        assigned_by: Option<i64>,
    ) -> RepoResult<UserRole>;
    /// Deletes an assignment. With `keep_last` the delete is refused when no other
    /// user holds the role; the check and the delete are one atomic step.
    async fn remove_assignment(&self, id: i64, keep_last: bool) -> RepoResult<Removal>;

    async fn roles_for_user(&self, user_id: i64) -> RepoResult<Vec<Role>> {
        let rows = self.roles_for_users(&[user_id]).await?;
        Ok(rows.into_iter().map(|r| r.role).collect())
    }
}
