use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::models::{
    AssignedRole, Hobby, NewHobby, NewUser, Removal, Role, User, UserChanges, UserFilter, UserRole,
    ADMIN_ROLE, USER_ROLE,
};
use super::{RepoError, RepoResult, Store};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    hobbies: Vec<Hobby>,
    roles: Vec<Role>,
    user_roles: Vec<UserRole>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn push_hobbies(&mut self, user_id: i64, hobbies: &[NewHobby]) {
        let now = OffsetDateTime::now_utc();
        for h in hobbies {
            let id = self.next_id();
            self.hobbies.push(Hobby {
                id,
                user_id,
                name: h.name.clone(),
                level: h.level,
                created_at: now,
            });
        }
    }

    fn taken(&self, username: &str, email: &str, except: Option<i64>) -> bool {
        self.users
            .iter()
            .filter(|u| Some(u.id) != except)
            .any(|u| u.username == username || u.email == email)
    }
}

/// In-process store with the same constraints as the SQL schema: unique
/// usernames, emails and (user, role) pairs, and cascading user deletes.
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// A store holding only the seeded roles ("Admin" = 1, "User" = 2).
    pub fn new() -> Self {
        let mut tables = Tables::default();
        let now = OffsetDateTime::now_utc();
        for (name, description) in [
            (ADMIN_ROLE, "Administrator with full access to manage users and system settings"),
            (USER_ROLE, "Regular user who can manage their own profile and hobbies"),
        ] {
            let id = tables.next_id();
            tables.roles.push(Role {
                id,
                name: name.to_string(),
                description: Some(description.to_string()),
                created_at: now,
            });
        }
        Self {
            tables: RwLock::new(tables),
        }
    }
}

fn matches_search(user: &User, search: &str) -> bool {
    let needle = search.to_lowercase();
    [&user.username, &user.full_name, &user.email]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_user(&self, id: i64) -> RepoResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.email == email).cloned())
    }

    async fn count_users(&self) -> RepoResult<i64> {
        Ok(self.tables.read().await.users.len() as i64)
    }

    async fn list_users(&self, filter: &UserFilter) -> RepoResult<(Vec<User>, i64)> {
        let t = self.tables.read().await;
        let search = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let mut matched: Vec<User> = t
            .users
            .iter()
            .filter(|u| search.map_or(true, |s| matches_search(u, s)))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.full_name.cmp(&b.full_name).then(a.id.cmp(&b.id)));
        let total = matched.len() as i64;
        let page = matched
            .into_iter()
            .skip(filter.offset().max(0) as usize)
            .take(filter.size.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn create_user(&self, new_user: NewUser) -> RepoResult<User> {
        let mut t = self.tables.write().await;
        if t.taken(&new_user.username, &new_user.email, None) {
            return Err(RepoError::Conflict);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: t.next_id(),
            username: new_user.username,
            full_name: new_user.full_name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: now,
            updated_at: now,
        };
        t.users.push(user.clone());
        t.push_hobbies(user.id, &new_user.hobbies);
        for role_id in new_user.role_ids {
            let id = t.next_id();
            t.user_roles.push(UserRole {
                id,
                user_id: user.id,
                role_id,
                assigned_at: now,
                assigned_by: new_user.assigned_by,
            });
        }
        Ok(user)
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> RepoResult<Option<User>> {
        let mut t = self.tables.write().await;
        if t.taken(&changes.username, &changes.email, Some(id)) {
            return Err(RepoError::Conflict);
        }
        let Some(user) = t.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        user.username = changes.username;
        user.full_name = changes.full_name;
        user.email = changes.email;
        user.updated_at = OffsetDateTime::now_utc();
        let updated = user.clone();

        t.hobbies.retain(|h| h.user_id != id);
        t.push_hobbies(id, &changes.hobbies);
        Ok(Some(updated))
    }

    async fn delete_user(&self, id: i64) -> RepoResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.users.len();
        t.users.retain(|u| u.id != id);
        if t.users.len() == before {
            return Ok(false);
        }
        t.hobbies.retain(|h| h.user_id != id);
        t.user_roles.retain(|ur| ur.user_id != id);
        for ur in t.user_roles.iter_mut().filter(|ur| ur.assigned_by == Some(id)) {
            ur.assigned_by = None;
        }
        Ok(true)
    }

    async fn hobbies_for_users(&self, user_ids: &[i64]) -> RepoResult<Vec<Hobby>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Hobby> = t
            .hobbies
            .iter()
            .filter(|h| user_ids.contains(&h.user_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn list_roles(&self) -> RepoResult<Vec<Role>> {
        let mut roles = self.tables.read().await.roles.clone();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn get_role(&self, id: i64) -> RepoResult<Option<Role>> {
        let t = self.tables.read().await;
        Ok(t.roles.iter().find(|r| r.id == id).cloned())
    }

    async fn find_role_by_name(&self, name: &str) -> RepoResult<Option<Role>> {
        let t = self.tables.read().await;
        Ok(t.roles.iter().find(|r| r.name == name).cloned())
    }

    async fn roles_for_users(&self, user_ids: &[i64]) -> RepoResult<Vec<AssignedRole>> {
        let t = self.tables.read().await;
        let mut rows: Vec<AssignedRole> = t
            .user_roles
            .iter()
            .filter(|ur| user_ids.contains(&ur.user_id))
            .filter_map(|ur| {
                t.roles.iter().find(|r| r.id == ur.role_id).map(|r| AssignedRole {
                    user_id: ur.user_id,
                    role: r.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| a.role.name.cmp(&b.role.name));
        Ok(rows)
    }

    async fn find_assignment(&self, user_id: i64, role_id: i64) -> RepoResult<Option<UserRole>> {
        let t = self.tables.read().await;
        Ok(t.user_roles
            .iter()
            .find(|ur| ur.user_id == user_id && ur.role_id == role_id)
            .cloned())
    }

    async fn assign_role(
        &self,
        user_id: i64,
        role_id: i64,
        assigned_by: Option<i64>,
    ) -> RepoResult<UserRole> {
        let mut t = self.tables.write().await;
        if t.user_roles
            .iter()
            .any(|ur| ur.user_id == user_id && ur.role_id == role_id)
        {
            return Err(RepoError::Conflict);
        }
        let row = UserRole {
            id: t.next_id(),
            user_id,
            role_id,
            assigned_at: OffsetDateTime::now_utc(),
            assigned_by,
        };
        t.user_roles.push(row.clone());
        Ok(row)
    }

    async fn remove_assignment(&self, id: i64, keep_last: bool) -> RepoResult<Removal> {
        let mut t = self.tables.write().await;
        let Some(role_id) = t.user_roles.iter().find(|ur| ur.id == id).map(|ur| ur.role_id) else {
            return Ok(Removal::Missing);
        };
        if keep_last && t.user_roles.iter().filter(|ur| ur.role_id == role_id).count() <= 1 {
            return Ok(Removal::LastHolder);
        }
        t.user_roles.retain(|ur| ur.id != id);
        Ok(Removal::Removed)
    }
}
