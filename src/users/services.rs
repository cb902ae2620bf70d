use std::collections::{BTreeSet, HashMap};

use tracing::{info, warn};

use super::dto::{HobbyDto, HobbyInput, UpdateUserRequest, UserDetail, UserListItem};
use crate::{
    auth::password::hash_password,
    error::AppError,
    response::PaginationMeta,
    store::{
        models::{NewUser, User, UserChanges, UserFilter, USER_ROLE},
        RepoError, Store,
    },
    validation::ValidationErrors,
};

/// Input for account creation, shared by self-registration and admin creation.
pub struct NewAccount {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub hobbies: Vec<HobbyInput>,
    pub role_ids: Vec<i64>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn conflict_on_race(e: RepoError) -> AppError {
    match e {
        RepoError::Conflict => AppError::conflict("Username or email already exists"),
        other => other.into(),
    }
}

async fn ensure_unique(
    store: &dyn Store,
    username: &str,
    email: &str,
    except: Option<i64>,
) -> Result<(), AppError> {
    if let Some(u) = store.find_user_by_username(username).await? {
        if Some(u.id) != except {
            warn!(%username, "username already taken");
            return Err(AppError::conflict("Username already exists"));
        }
    }
    if let Some(u) = store.find_user_by_email(email).await? {
        if Some(u.id) != except {
            warn!(%email, "email already taken");
            return Err(AppError::conflict("Email already exists"));
        }
    }
    Ok(())
}

/// Explicit role ids must all exist; no ids means the default "User" role.
async fn resolve_roles(store: &dyn Store, role_ids: &[i64]) -> Result<Vec<i64>, AppError> {
    if role_ids.is_empty() {
        let role = store
            .find_role_by_name(USER_ROLE)
            .await?
            .ok_or_else(|| anyhow::anyhow!("default role {USER_ROLE} is missing"))?;
        return Ok(vec![role.id]);
    }

    let unique: BTreeSet<i64> = role_ids.iter().copied().collect();
    let mut errors = ValidationErrors::default();
    for id in &unique {
        if store.get_role(*id).await?.is_none() {
            errors.add("roleIds", format!("Role with ID {id} does not exist"));
        }
    }
    errors.into_result()?;
    Ok(unique.into_iter().collect())
}

pub async fn create_account(
    store: &dyn Store,
    account: NewAccount,
    assigned_by: Option<i64>,
) -> Result<User, AppError> {
    let username = account.username.trim().to_string();
    let email = normalize_email(&account.email);
    ensure_unique(store, &username, &email, None).await?;
    let role_ids = resolve_roles(store, &account.role_ids).await?;

    let user = store
        .create_user(NewUser {
            username,
            full_name: account.full_name.trim().to_string(),
            email,
            password_hash: hash_password(&account.password).await?,
            hobbies: account.hobbies.into_iter().map(Into::into).collect(),
            role_ids,
            assigned_by,
        })
        .await
        .map_err(conflict_on_race)?;
    info!(user_id = user.id, username = %user.username, "user created");
    Ok(user)
}

pub async fn role_names(store: &dyn Store, user_id: i64) -> Result<Vec<String>, AppError> {
    let roles = store.roles_for_user(user_id).await?;
    Ok(roles.into_iter().map(|r| r.name).collect())
}

pub async fn list_users(
    store: &dyn Store,
    filter: UserFilter,
) -> Result<(Vec<UserListItem>, PaginationMeta), AppError> {
    let (users, total) = store.list_users(&filter).await?;
    let ids: Vec<i64> = users.iter().map(|u| u.id).collect();

    let mut hobbies: HashMap<i64, Vec<HobbyDto>> = HashMap::new();
    for h in store.hobbies_for_users(&ids).await? {
        hobbies.entry(h.user_id).or_default().push(h.into());
    }
    let mut roles: HashMap<i64, Vec<String>> = HashMap::new();
    for r in store.roles_for_users(&ids).await? {
        roles.entry(r.user_id).or_default().push(r.role.name);
    }

    let items = users
        .into_iter()
        .map(|u| {
            let id = u.id;
            UserListItem::new(
                u,
                hobbies.remove(&id).unwrap_or_default(),
                roles.remove(&id).unwrap_or_default(),
            )
        })
        .collect();
    Ok((items, PaginationMeta::new(filter.page, filter.size, total)))
}

pub async fn get_user(store: &dyn Store, id: i64) -> Result<UserDetail, AppError> {
    let user = store.get_user(id).await?.ok_or(AppError::NotFound("User"))?;
    let hobbies = store
        .hobbies_for_users(&[id])
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(UserDetail::new(user, hobbies))
}

pub async fn update_user(
    store: &dyn Store,
    id: i64,
    req: UpdateUserRequest,
) -> Result<(), AppError> {
    if store.get_user(id).await?.is_none() {
        return Err(AppError::NotFound("User"));
    }
    let username = req.username.trim().to_string();
    let email = normalize_email(&req.email);
    ensure_unique(store, &username, &email, Some(id)).await?;

    let changes = UserChanges {
        username,
        full_name: req.full_name.trim().to_string(),
        email,
        hobbies: req.hobbies.into_iter().map(Into::into).collect(),
    };
    store
        .update_user(id, changes)
        .await
        .map_err(conflict_on_race)?
        .ok_or(AppError::NotFound("User"))?;
    info!(user_id = id, "user updated");
    Ok(())
}

pub async fn delete_user(store: &dyn Store, id: i64) -> Result<(), AppError> {
    if !store.delete_user(id).await? {
        return Err(AppError::NotFound("User"));
    }
    info!(user_id = id, "user deleted");
    Ok(())
}
