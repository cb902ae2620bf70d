use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};
use tracing::{debug, info};

use super::models::{
    AssignedRole, Hobby, NewHobby, NewUser, Removal, Role, User, UserChanges, UserFilter,
    UserRole,
};
use super::{RepoResult, Store};

const USER_COLUMNS: &str =
    "id, username, full_name, email, password_hash, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run database migrations")?;
        info!("migrations applied");
        Ok(())
    }
}

fn search_pattern(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")))
}

async fn insert_hobbies_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i64,
    hobbies: &[NewHobby],
) -> RepoResult<()> {
    for hobby in hobbies {
        sqlx::query(
            r#"
            INSERT INTO hobbies (user_id, name, level)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(&hobby.name)
        .bind(hobby.level)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

#[async_trait]
impl Store for PgStore {
    async fn get_user(&self, id: i64) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn count_users(&self) -> RepoResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }

    async fn list_users(&self, filter: &UserFilter) -> RepoResult<(Vec<User>, i64)> {
        let pattern = search_pattern(filter.search.as_deref());

        let rows = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE $1::text IS NULL
               OR username ILIKE $1
               OR full_name ILIKE $1
               OR email ILIKE $1
            ORDER BY full_name, id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(pattern.as_deref())
        .bind(filter.size)
        .bind(filter.offset())
        .fetch_all(&self.db)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM users
            WHERE $1::text IS NULL
               OR username ILIKE $1
               OR full_name ILIKE $1
               OR email ILIKE $1
            "#,
        )
        .bind(pattern.as_deref())
        .fetch_one(&self.db)
        .await?;

        Ok((rows, total))
    }

    async fn create_user(&self, new_user: NewUser) -> RepoResult<User> {
        let mut tx = self.db.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, full_name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new_user.username)
        .bind(&new_user.full_name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .fetch_one(&mut *tx)
        .await?;

        insert_hobbies_tx(&mut tx, user.id, &new_user.hobbies).await?;

        for role_id in &new_user.role_ids {
            sqlx::query(
                r#"
                INSERT INTO user_roles (user_id, role_id, assigned_by)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(user.id)
            .bind(*role_id)
            .bind(new_user.assigned_by)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(user_id = user.id, "user row created");
        Ok(user)
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> RepoResult<Option<User>> {
        let mut tx = self.db.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = $2, full_name = $3, email = $4, updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&changes.username)
        .bind(&changes.full_name)
        .bind(&changes.email)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user) = user else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM hobbies WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_hobbies_tx(&mut tx, id, &changes.hobbies).await?;

        tx.commit().await?;
        Ok(Some(user))
    }

    async fn delete_user(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn hobbies_for_users(&self, user_ids: &[i64]) -> RepoResult<Vec<Hobby>> {
        let rows = sqlx::query_as::<_, Hobby>(
            r#"
            SELECT id, user_id, name, level, created_at
            FROM hobbies
            WHERE user_id = ANY($1)
            ORDER BY name
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn list_roles(&self) -> RepoResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, Role>(
            "SELECT id, name, description, created_at FROM roles ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn get_role(&self, id: i64) -> RepoResult<Option<Role>> {
        let row = sqlx::query_as::<_, Role>(
            "SELECT id, name, description, created_at FROM roles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn find_role_by_name(&self, name: &str) -> RepoResult<Option<Role>> {
        let row = sqlx::query_as::<_, Role>(
            "SELECT id, name, description, created_at FROM roles WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn roles_for_users(&self, user_ids: &[i64]) -> RepoResult<Vec<AssignedRole>> {
        let rows = sqlx::query_as::<_, AssignedRole>(
            r#"
            SELECT ur.user_id, r.id, r.name, r.description, r.created_at
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            WHERE ur.user_id = ANY($1)
            ORDER BY r.name
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_assignment(&self, user_id: i64, role_id: i64) -> RepoResult<Option<UserRole>> {
        let row = sqlx::query_as::<_, UserRole>(
            r#"
            SELECT id, user_id, role_id, assigned_at, assigned_by
            FROM user_roles
            WHERE user_id = $1 AND role_id = $2
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn assign_role(
        &self,
        user_id: i64,
        role_id: i64,
        assigned_by: Option<i64>,
    ) -> RepoResult<UserRole> {
        let row = sqlx::query_as::<_, UserRole>(
            r#"
            INSERT INTO user_roles (user_id, role_id, assigned_by)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, role_id, assigned_at, assigned_by
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .bind(assigned_by)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn remove_assignment(&self, id: i64, keep_last: bool) -> RepoResult<Removal> {
        let mut tx = self.db.begin().await?;

        if keep_last {
            let role_id =
                sqlx::query_scalar::<_, i64>("SELECT role_id FROM user_roles WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?;
            let Some(role_id) = role_id else {
                return Ok(Removal::Missing);
            };
            // Lock every holder in id order so concurrent removals queue up here.
            let holders = sqlx::query_scalar::<_, i64>(
                "SELECT id FROM user_roles WHERE role_id = $1 ORDER BY id FOR UPDATE",
            )
            .bind(role_id)
            .fetch_all(&mut *tx)
            .await?;
            if !holders.contains(&id) {
                return Ok(Removal::Missing);
            }
            if holders.len() <= 1 {
                return Ok(Removal::LastHolder);
            }
        }

        let result = sqlx::query("DELETE FROM user_roles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(Removal::Missing);
        }
        tx.commit().await?;
        Ok(Removal::Removed)
    }
}
