use tracing::{info, warn};

use super::dto::RoleDto;
use crate::{
    error::AppError,
    store::{
        models::{Removal, ADMIN_ROLE},
        RepoError, Store,
    },
};

pub async fn list_roles(store: &dyn Store) -> Result<Vec<RoleDto>, AppError> {
    let roles = store.list_roles().await?;
    Ok(roles.into_iter().map(Into::into).collect())
}

pub async fn roles_of_user(store: &dyn Store, user_id: i64) -> Result<Vec<RoleDto>, AppError> {
    let roles = store.roles_for_user(user_id).await?;
    Ok(roles.into_iter().map(Into::into).collect())
}

pub async fn assign(
    store: &dyn Store,
    user_id: i64,
    role_id: i64,
    assigned_by: i64,
) -> Result<(), AppError> {
    if store.get_user(user_id).await?.is_none() {
        return Err(AppError::NotFound("User"));
    }
    if store.get_role(role_id).await?.is_none() {
        return Err(AppError::NotFound("Role"));
    }
    if store.find_assignment(user_id, role_id).await?.is_some() {
        return Err(AppError::conflict("User already has this role"));
    }

    store
        .assign_role(user_id, role_id, Some(assigned_by))
        .await
        .map_err(|e| match e {
            RepoError::Conflict => AppError::conflict("User already has this role"),
            other => other.into(),
        })?;
    info!(user_id, role_id, assigned_by, "role assigned");
    Ok(())
}

/// Removes an assignment. The last remaining "Admin" assignment is kept.
pub async fn unassign(store: &dyn Store, user_id: i64, role_id: i64) -> Result<(), AppError> {
    let Some(assignment) = store.find_assignment(user_id, role_id).await? else {
        return Err(AppError::NotFound("Role assignment"));
    };

    let keep_last = store
        .get_role(role_id)
        .await?
        .is_some_and(|r| r.name == ADMIN_ROLE);
    match store.remove_assignment(assignment.id, keep_last).await? {
        Removal::Removed => {
            info!(user_id, role_id, "role unassigned");
            Ok(())
        }
        Removal::Missing => Err(AppError::NotFound("Role assignment")),
        Removal::LastHolder => {
            warn!(user_id, "refusing to remove the last admin");
            Err(AppError::bad_request("Cannot remove the last admin role"))
        }
    }
}
