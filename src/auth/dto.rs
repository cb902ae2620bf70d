use serde::{Deserialize, Serialize};

use crate::users::HobbyInput;
use crate::validation::{
    check_email, check_full_name, check_hobby_names, check_password, check_username, Validate,
    ValidationErrors,
};

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.username.trim().is_empty() {
            errors.add("username", "Username is required");
        }
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        }
        errors.into_result()
    }
}

/// Request body for self-registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub hobbies: Vec<HobbyInput>,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_username(&mut errors, &self.username);
        check_full_name(&mut errors, &self.full_name);
        check_email(&mut errors, &self.email);
        check_password(&mut errors, &self.password);
        if self.confirm_password.is_empty() {
            errors.add("confirmPassword", "Confirm password is required");
        } else if self.confirm_password != self.password {
            errors.add("confirmPassword", "Passwords do not match");
        }
        check_hobby_names(&mut errors, self.hobbies.iter().map(|h| h.name.as_str()));
        errors.into_result()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: &'static str,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub roles: Vec<String>,
}

/// Register also returns the access token in the body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub token: String,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: MeUser,
}

#[derive(Debug, Serialize)]
pub struct MeUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_requires_matching_passwords() {
        let req: RegisterRequest = serde_json::from_value(serde_json::json!({
            "username": "budi",
            "fullName": "Budi",
            "email": "budi@example.com",
            "password": "secret1",
            "confirmPassword": "secret2"
        }))
        .unwrap();
        let errors = req.validate().unwrap_err();
        assert_eq!(errors.get("confirmPassword"), Some("Passwords do not match"));
        assert_eq!(errors.into_fields().len(), 1);
    }

    #[test]
    fn login_requires_both_fields() {
        let req = LoginRequest {
            username: " ".into(),
            password: String::new(),
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.get("username").is_some());
        assert!(errors.get("password").is_some());
    }
}
