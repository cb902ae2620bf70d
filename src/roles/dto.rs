use serde::{Deserialize, Serialize};

use crate::store::models::Role;
use crate::validation::{check_positive_id, Validate, ValidationErrors};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRoleRequest {
    pub user_id: i64,
    pub role_id: i64,
}

impl Validate for AssignRoleRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_positive_id(&mut errors, "userId", "User ID", self.user_id);
        check_positive_id(&mut errors, "roleId", "Role ID", self.role_id);
        errors.into_result()
    }
}

#[derive(Debug, Serialize)]
pub struct RoleDto {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl From<Role> for RoleDto {
    fn from(r: Role) -> Self {
        RoleDto {
            id: r.id,
            name: r.name,
            description: r.description,
        }
    }
}
